//! Weighted random material selection for refills

use std::collections::BTreeMap;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::core::{Error, Result};
use crate::world::material::Material;

/// Material → relative weight. Weights need not sum to 1.
pub type MaterialWeights = BTreeMap<Material, f64>;

/// Draws materials proportionally to their weights
#[derive(Clone, Debug)]
pub struct WeightedPattern {
    materials: Vec<Material>,
    index: WeightedIndex<f64>,
}

impl WeightedPattern {
    /// Build from a weight table. Non-positive weights are ignored.
    pub fn new(weights: &MaterialWeights) -> Result<Self> {
        let (materials, values): (Vec<Material>, Vec<f64>) = weights
            .iter()
            .filter(|(_, w)| w.is_finite() && **w > 0.0)
            .map(|(m, w)| (m.clone(), *w))
            .unzip();

        if materials.is_empty() {
            return Err(Error::config("material table has no positive weights"));
        }

        let index = WeightedIndex::new(&values)
            .map_err(|e| Error::config(format!("invalid material weights: {}", e)))?;

        Ok(Self { materials, index })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Material {
        self.materials[self.index.sample(rng)].clone()
    }

    /// Materials that can be drawn
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn table(entries: &[(&str, f64)]) -> MaterialWeights {
        entries.iter().map(|(m, w)| (Material::new(m), *w)).collect()
    }

    #[test]
    fn test_empty_table_is_config_error() {
        assert!(matches!(WeightedPattern::new(&MaterialWeights::new()), Err(Error::Config(_))));
        assert!(WeightedPattern::new(&table(&[("stone", 0.0)])).is_err());
    }

    #[test]
    fn test_single_material() {
        let pattern = WeightedPattern::new(&table(&[("stone", 1.0)])).expect("pattern");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(pattern.sample(&mut rng), Material::new("stone"));
        }
    }

    #[test]
    fn test_distribution_roughly_follows_weights() {
        let pattern =
            WeightedPattern::new(&table(&[("stone", 0.8), ("ore", 0.2)])).expect("pattern");
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 10_000;
        let ore = (0..draws)
            .filter(|_| pattern.sample(&mut rng) == Material::new("ore"))
            .count();
        let share = ore as f64 / draws as f64;
        assert!((0.17..0.23).contains(&share), "ore share {}", share);
    }
}
