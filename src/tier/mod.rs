//! Mine tiers and their ordered catalog

pub mod catalog;

pub use catalog::TierCatalog;

use std::collections::BTreeMap;

use crate::config::TierConfig;
use crate::world::MaterialWeights;

/// A registered tier. Immutable once in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub name: String,
    /// Template file, relative to the template directory
    pub template: String,
    pub reset_minutes: u32,
    /// Mined percentage (0-100) that triggers a reset
    pub reset_threshold: f64,
    /// Largest mining-region width on X/Z
    pub max_size: u32,
    pub upgrade_cost: f64,
    /// Refill weights; empty defers to the template's table
    pub materials: MaterialWeights,
    pub flags: BTreeMap<String, bool>,
    pub full_flags: BTreeMap<String, bool>,
    /// Position in the upgrade chain, assigned at registration
    pub order: usize,
}

impl Tier {
    pub(crate) fn from_config(config: TierConfig, default_reset_minutes: u32, order: usize) -> Self {
        Self {
            name: config.name,
            template: config.template,
            reset_minutes: config.reset_minutes.unwrap_or(default_reset_minutes),
            reset_threshold: config.reset_percentage,
            max_size: config.max_size,
            upgrade_cost: config.upgrade_cost,
            materials: config.materials,
            flags: config.flags,
            full_flags: config.full_flags,
            order,
        }
    }
}
