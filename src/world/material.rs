//! Voxel material identifiers

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of the empty voxel
pub const AIR_NAME: &str = "air";

/// Interned material name, case-insensitive (stored lowercase).
///
/// Cloning is a reference-count bump, so filling large regions does not
/// allocate per voxel.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Material(Arc<str>);

impl Material {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name.trim().to_ascii_lowercase()))
    }

    /// The empty voxel
    pub fn air() -> Self {
        Self(Arc::from(AIR_NAME))
    }

    pub fn is_air(&self) -> bool {
        &*self.0 == AIR_NAME
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Material {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<Material> for String {
    fn from(material: Material) -> Self {
        material.0.to_string()
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Material({})", self.0)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Material::new("STONE"), Material::new("stone"));
        assert_eq!(Material::from(" Diamond_Ore "), Material::new("diamond_ore"));
    }

    #[test]
    fn test_air() {
        assert!(Material::air().is_air());
        assert!(Material::new("AIR").is_air());
        assert!(!Material::new("stone").is_air());
    }

    #[test]
    fn test_serde_normalises() {
        let m: Material = serde_json::from_str("\"COBBLESTONE\"").expect("parse");
        assert_eq!(m.as_str(), "cobblestone");
        assert_eq!(serde_json::to_string(&m).expect("write"), "\"cobblestone\"");
    }
}
