//! Ordered tier catalog

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::TierConfig;
use crate::core::{Error, Result};
use crate::tier::Tier;

/// Tiers in upgrade order, indexed by name
#[derive(Debug, Default)]
pub struct TierCatalog {
    tiers: Vec<Arc<Tier>>,
    by_name: HashMap<String, usize>,
}

impl TierCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a tier definition and append it to the upgrade chain
    pub fn register(&mut self, config: TierConfig, default_reset_minutes: u32) -> Result<Arc<Tier>> {
        if config.name.trim().is_empty() {
            return Err(Error::config("tier name must not be empty"));
        }
        if config.template.trim().is_empty() {
            return Err(Error::config(format!("tier {} has no template", config.name)));
        }
        if !(0.0..=100.0).contains(&config.reset_percentage) {
            return Err(Error::config(format!(
                "tier {} reset_percentage {} outside 0-100",
                config.name, config.reset_percentage
            )));
        }
        if !(config.upgrade_cost.is_finite() && config.upgrade_cost >= 0.0) {
            return Err(Error::config(format!(
                "tier {} upgrade cost {} must be a finite, non-negative amount",
                config.name, config.upgrade_cost
            )));
        }
        if self.by_name.contains_key(&config.name) {
            return Err(Error::config(format!("tier {} registered twice", config.name)));
        }

        let order = self.tiers.len();
        let tier = Arc::new(Tier::from_config(config, default_reset_minutes, order));
        self.by_name.insert(tier.name.clone(), order);
        self.tiers.push(Arc::clone(&tier));
        log::debug!("Registered tier {} at position {}", tier.name, order);
        Ok(tier)
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<Arc<Tier>> {
        self.by_name.get(name).map(|i| Arc::clone(&self.tiers[*i]))
    }

    /// Like `get`, but an unknown name is a configuration error
    pub fn require(&self, name: &str) -> Result<Arc<Tier>> {
        self.get(name)
            .ok_or_else(|| Error::config(format!("unknown tier {}", name)))
    }

    /// Following tier, or `tier` itself when it is the last
    pub fn next(&self, tier: &Tier) -> Arc<Tier> {
        let i = (tier.order + 1).min(self.tiers.len().saturating_sub(1));
        self.tiers.get(i).cloned().unwrap_or_else(|| Arc::new(tier.clone()))
    }

    /// Preceding tier, or `tier` itself when it is the first
    pub fn previous(&self, tier: &Tier) -> Arc<Tier> {
        let i = tier.order.saturating_sub(1);
        self.tiers.get(i).cloned().unwrap_or_else(|| Arc::new(tier.clone()))
    }

    /// Lowest tier
    pub fn default_tier(&self) -> Option<Arc<Tier>> {
        self.tiers.first().cloned()
    }

    pub fn last(&self) -> Option<Arc<Tier>> {
        self.tiers.last().cloned()
    }

    pub fn is_last(&self, tier: &Tier) -> bool {
        tier.order + 1 >= self.tiers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tier>> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(name: &str) -> TierConfig {
        TierConfig {
            name: name.into(),
            template: format!("{}.json", name.to_lowercase()),
            ..Default::default()
        }
    }

    fn catalog() -> TierCatalog {
        let mut catalog = TierCatalog::new();
        for name in ["Stone", "Iron", "Diamond"] {
            catalog.register(tier(name), 5).expect("register");
        }
        catalog
    }

    #[test]
    fn test_ordering_is_contiguous() {
        let catalog = catalog();
        let orders: Vec<_> = catalog.iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(catalog.default_tier().expect("default").name, "Stone");
        assert_eq!(catalog.last().expect("last").name, "Diamond");
    }

    #[test]
    fn test_next_and_previous_clamp() {
        let catalog = catalog();
        let stone = catalog.require("Stone").expect("stone");
        let diamond = catalog.require("Diamond").expect("diamond");

        assert_eq!(catalog.next(&stone).name, "Iron");
        assert_eq!(catalog.next(&diamond).name, "Diamond");
        assert_eq!(catalog.previous(&stone).name, "Stone");
        assert_eq!(catalog.previous(&diamond).name, "Iron");
        assert!(catalog.is_last(&diamond));
        assert!(!catalog.is_last(&stone));
    }

    #[test]
    fn test_register_rejects_bad_threshold_and_duplicates() {
        let mut catalog = catalog();
        let bad = TierConfig { reset_percentage: 120.0, ..tier("Gold") };
        assert!(matches!(catalog.register(bad, 5), Err(Error::Config(_))));
        assert!(catalog.register(tier("Iron"), 5).is_err());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_register_rejects_unusable_costs() {
        let mut catalog = catalog();
        for cost in [-1.0, f64::NAN, f64::INFINITY] {
            let bad = TierConfig { upgrade_cost: cost, ..tier("Gold") };
            assert!(matches!(catalog.register(bad, 5), Err(Error::Config(_))));
        }
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = catalog();
        assert!(catalog.get("stone").is_none());
        assert!(matches!(catalog.require("Emerald"), Err(Error::Config(_))));
    }

    #[test]
    fn test_reset_minutes_fallback() {
        let mut catalog = TierCatalog::new();
        let own = catalog
            .register(TierConfig { reset_minutes: Some(2), ..tier("Fast") }, 5)
            .expect("register");
        let inherited = catalog.register(tier("Slow"), 5).expect("register");
        assert_eq!(own.reset_minutes, 2);
        assert_eq!(inherited.reset_minutes, 5);
    }
}
