//! Persistent state of one mine

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec3, PlayerId};
use crate::math::Region;
use crate::world::MaterialWeights;

/// Everything about a mine that survives a restart.
///
/// This is also the on-disk record (`mines/<owner>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineData {
    pub owner: PlayerId,
    /// Tier name, resolved against the catalog on load
    pub tier: String,
    /// Plot the template was stamped at
    pub location: IVec3,
    /// Region that is refilled on reset
    pub mining: Region,
    /// Whole plot, always contains `mining`
    pub full: Region,
    pub spawn: IVec3,
    pub open: bool,
    /// Sell tax percentage, 0-100
    pub tax: f64,
    pub max_players: u32,
    pub max_size: u32,
    /// Per-mine refill override; empty defers to the tier
    #[serde(default)]
    pub materials: MaterialWeights,
    #[serde(default)]
    pub banned: BTreeSet<PlayerId>,
    #[serde(default)]
    pub friends: BTreeSet<PlayerId>,
}

impl MineData {
    /// Width of the mining region on X/Z, whichever is larger
    pub fn mining_width(&self) -> u32 {
        let size = self.mining.size();
        size.x.max(size.z) as u32
    }

    /// Mining region nested inside the full region on every axis
    pub fn is_consistent(&self) -> bool {
        self.full.contains_region(&self.mining)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::world::Material;

    pub(crate) fn sample_data(owner: PlayerId) -> MineData {
        MineData {
            owner,
            tier: "Stone".into(),
            location: IVec3::new(0, 50, 0),
            mining: Region::new(IVec3::new(-12, 48, -6), IVec3::new(13, 48, 4)),
            full: Region::new(IVec3::new(-12, 47, -6), IVec3::new(14, 50, 5)),
            spawn: IVec3::new(0, 50, 1),
            open: false,
            tax: 5.0,
            max_players: 1,
            max_size: 100,
            materials: MaterialWeights::new(),
            banned: BTreeSet::new(),
            friends: BTreeSet::new(),
        }
    }

    #[test]
    fn test_json_shape() {
        let owner = PlayerId::new_v4();
        let mut data = sample_data(owner);
        data.materials.insert(Material::new("stone"), 1.0);
        data.banned.insert(PlayerId::new_v4());

        let json = serde_json::to_string(&data).expect("serialize");
        assert!(json.contains(&owner.to_string()));
        assert!(json.contains("\"mining\":{\"min\":[-12,48,-6],\"max\":[13,48,4]}"));
        let back: MineData = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, data);
    }

    #[test]
    fn test_width_and_consistency() {
        let data = sample_data(PlayerId::new_v4());
        assert_eq!(data.mining_width(), 26);
        assert!(data.is_consistent());
    }
}
