//! Configuration: site settings plus tier definitions.
//!
//! The whole document is one JSON file. Every field has a default so a
//! partial file is valid; tiers are registered in file order, which fixes
//! their upgrade order.

pub mod settings;

pub use settings::{SentinelMarkers, Settings};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::world::MaterialWeights;

/// Definition of one tier as written in the configuration file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub name: String,
    /// Template file, relative to `Settings::template_dir`
    pub template: String,
    /// Falls back to `Settings::default_reset_minutes`
    pub reset_minutes: Option<u32>,
    /// Depletion share (0-100) that triggers a reset
    pub reset_percentage: f64,
    /// Largest mining-region width on X/Z
    pub max_size: u32,
    pub upgrade_cost: f64,
    /// Refill weights; empty means use the template's table
    pub materials: MaterialWeights,
    /// Protection flags for the mining region (true = allow)
    pub flags: BTreeMap<String, bool>,
    /// Protection flags for the full region (true = allow)
    pub full_flags: BTreeMap<String, bool>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            template: String::new(),
            reset_minutes: None,
            reset_percentage: 50.0,
            max_size: 100,
            upgrade_cost: 0.0,
            materials: MaterialWeights::new(),
            flags: BTreeMap::new(),
            full_flags: BTreeMap::new(),
        }
    }
}

/// Top-level configuration document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinesConfig {
    pub settings: Settings,
    pub tiers: Vec<TierConfig>,
}

impl MinesConfig {
    /// Load from a JSON file and validate the settings
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: MinesConfig = serde_json::from_str(&json)?;
        config.settings.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON (used to seed a default config)
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}
