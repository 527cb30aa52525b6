//! Global site settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::Rotation;
use crate::world::Material;

/// Reserved materials that mark anchors inside a structure template
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelMarkers {
    /// Two of these bound the mining region
    pub corner: Material,
    /// Where players are relocated to
    pub spawn: Material,
    /// Optional auxiliary anchor (sell NPC position)
    pub npc: Material,
    /// Optional auxiliary anchor (quarry position)
    pub quarry: Material,
}

impl Default for SentinelMarkers {
    fn default() -> Self {
        Self {
            corner: Material::new("powered_rail"),
            spawn: Material::new("sponge"),
            npc: Material::new("white_wool"),
            quarry: Material::new("shulker_box"),
        }
    }
}

/// Site-wide configuration shared by every tier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root for persisted mines, pregenerated queue and cursor
    pub data_dir: PathBuf,
    /// Directory structure templates are resolved against
    pub template_dir: PathBuf,
    /// Height every plot origin is placed at
    pub y_level: i32,
    /// Distance between neighbouring plot origins on X and Z
    pub spacing: i32,
    /// Minimum gap kept between the mining region and the full region
    pub clearance: i32,
    /// Rotation applied to every stamped template
    pub rotation: Rotation,
    pub markers: SentinelMarkers,
    /// Material that stops expansion when found near the mining region
    pub blocking_material: Material,
    /// Upgrade instead of expanding when the blocking material is hit
    pub border_upgrade: bool,
    /// Let expansion also grow the mining region downward
    pub expand_vertically: bool,
    /// Wall rebuilt around the mining region after expansion
    pub wall_material: Option<Material>,
    /// Reset interval used by tiers that do not set their own
    pub default_reset_minutes: u32,
    /// Period of the depletion check
    pub percentage_check_ticks: u64,
    pub tax_enabled: bool,
    pub default_tax: f64,
    pub default_max_players: u32,
    /// Pregenerated plots the server keeps ready
    pub pregen_target: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            template_dir: PathBuf::from("templates"),
            y_level: 50,
            spacing: 150,
            clearance: 0,
            rotation: Rotation::None,
            markers: SentinelMarkers::default(),
            blocking_material: Material::new("obsidian"),
            border_upgrade: false,
            expand_vertically: false,
            wall_material: Some(Material::new("bedrock")),
            default_reset_minutes: 5,
            percentage_check_ticks: 20,
            tax_enabled: true,
            default_tax: 5.0,
            default_max_players: 1,
            pregen_target: 0,
        }
    }
}

impl Settings {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.spacing <= 0 {
            return Err(Error::config(format!("spacing must be positive, got {}", self.spacing)));
        }
        if self.clearance < 0 {
            return Err(Error::config(format!("clearance must not be negative, got {}", self.clearance)));
        }
        if self.percentage_check_ticks == 0 {
            return Err(Error::config("percentage_check_ticks must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.default_tax) {
            return Err(Error::config(format!("default_tax {} outside 0-100", self.default_tax)));
        }
        let m = &self.markers;
        let markers = [&m.corner, &m.spawn, &m.npc, &m.quarry];
        for (i, a) in markers.iter().enumerate() {
            if a.is_air() {
                return Err(Error::config("sentinel markers cannot be air"));
            }
            if markers[i + 1..].contains(a) {
                return Err(Error::config(format!("sentinel material {} used twice", a)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Settings::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn test_rejects_zero_spacing() {
        let settings = Settings { spacing: 0, ..Default::default() };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_markers() {
        let mut settings = Settings::default();
        settings.markers.npc = settings.markers.spawn.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "spacing": 200, "border_upgrade": true }"#).expect("parse");
        assert_eq!(settings.spacing, 200);
        assert!(settings.border_upgrade);
        assert_eq!(settings.y_level, 50);
        assert_eq!(settings.markers.spawn, Material::new("sponge"));
    }
}
