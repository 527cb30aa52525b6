//! Structure template document format.
//!
//! A template is a JSON document; a file with the `lz4` extension holds
//! the same JSON compressed as an LZ4 size-prepended block.
//!
//! Voxels are stored as palette indices in x-fastest, then z, then y
//! order. `origin` is the grid cell that lands on the plot when the
//! template is stamped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;
use crate::core::{Error, Result};
use crate::world::{Material, MaterialWeights};

/// On-disk template document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Grid extent [x, y, z]
    pub size: [u32; 3],
    /// Grid cell of the paste origin
    pub origin: [i32; 3],
    pub palette: Vec<Material>,
    /// Palette indices, `size.x * size.y * size.z` entries
    pub blocks: Vec<u16>,
    /// Default refill weights
    #[serde(default)]
    pub materials: MaterialWeights,
}

impl TemplateFile {
    /// Empty (all-air) template of the given size
    pub fn new(size: [u32; 3], origin: [i32; 3]) -> Result<Self> {
        let mut file = Self {
            size,
            origin,
            palette: vec![Material::air()],
            blocks: Vec::new(),
            materials: MaterialWeights::new(),
        };
        let (_, len) = file.grid()?;
        file.blocks = vec![0; len];
        Ok(file)
    }

    /// Grid extent as signed coordinates
    pub fn extent(&self) -> Result<IVec3> {
        self.grid().map(|(extent, _)| extent)
    }

    /// Extent and cell count; every cell index must fit in an `i32`
    fn grid(&self) -> Result<(IVec3, usize)> {
        let too_large = || Error::config(format!("template size {:?} is too large", self.size));
        let [x, y, z] = self.size.map(i32::try_from);
        let extent = IVec3::new(
            x.map_err(|_| too_large())?,
            y.map_err(|_| too_large())?,
            z.map_err(|_| too_large())?,
        );
        let cells = extent
            .to_array()
            .into_iter()
            .try_fold(1i32, |acc, s| acc.checked_mul(s))
            .ok_or_else(too_large)?;
        Ok((extent, cells as usize))
    }

    /// Flat index of a grid cell
    fn index(&self, cell: IVec3) -> Option<usize> {
        let [sx, sy, sz] = self.extent().ok()?.to_array();
        if cell.cmplt(IVec3::ZERO).any() || cell.x >= sx || cell.y >= sy || cell.z >= sz {
            return None;
        }
        Some((cell.x + cell.z * sx + cell.y * sx * sz) as usize)
    }

    /// Set a grid cell, growing the palette as needed
    pub fn set(&mut self, cell: IVec3, material: Material) -> Result<()> {
        let index = self
            .index(cell)
            .ok_or_else(|| Error::config(format!("cell {} outside template", cell)))?;
        let entry = match self.palette.iter().position(|m| *m == material) {
            Some(i) => i,
            None => {
                self.palette.push(material);
                self.palette.len() - 1
            }
        };
        self.blocks[index] = u16::try_from(entry)
            .map_err(|_| Error::config("template palette exceeds 65535 entries"))?;
        Ok(())
    }

    /// Check block count and palette references
    pub fn validate(&self) -> Result<()> {
        let (_, expected) = self.grid()?;
        if self.blocks.len() != expected {
            return Err(Error::config(format!(
                "template has {} blocks, size {:?} needs {}",
                self.blocks.len(),
                self.size,
                expected
            )));
        }
        if let Some(bad) = self.blocks.iter().find(|b| **b as usize >= self.palette.len()) {
            return Err(Error::config(format!(
                "palette index {} out of range ({} entries)",
                bad,
                self.palette.len()
            )));
        }
        Ok(())
    }

    /// Iterate (grid cell, material) for every stored voxel.
    /// A document that fails `validate` yields nothing.
    pub fn cells(&self) -> impl Iterator<Item = (IVec3, &Material)> + '_ {
        let valid = self.validate().is_ok();
        let blocks: &[u16] = if valid { &self.blocks } else { &[] };
        let [sx, _, sz] = self.extent().unwrap_or(IVec3::ONE).to_array();
        blocks.iter().enumerate().map(move |(i, b)| {
            let i = i as i32;
            let cell = IVec3::new(i % sx, i / (sx * sz), (i / sx) % sz);
            (cell, &self.palette[*b as usize])
        })
    }

    pub fn origin(&self) -> IVec3 {
        IVec3::from_array(self.origin)
    }

    /// Read and validate a template file
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let json = if is_compressed(path) {
            lz4_flex::decompress_size_prepended(&bytes).map_err(|e| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("LZ4 decompression failed: {}", e),
                ))
            })?
        } else {
            bytes
        };
        let file: TemplateFile = serde_json::from_slice(&json)?;
        file.validate()?;
        Ok(file)
    }

    /// Write a template file, compressing when the extension is `lz4`
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;
        let bytes = if is_compressed(path) {
            lz4_flex::compress_prepend_size(&json)
        } else {
            json
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "lz4")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_cells() {
        let mut file = TemplateFile::new([3, 2, 4], [0, 0, 0]).expect("template");
        file.set(IVec3::new(2, 1, 3), Material::new("stone")).expect("set");
        let solid: Vec<_> = file.cells().filter(|(_, m)| !m.is_air()).collect();
        assert_eq!(solid.len(), 1);
        assert_eq!(solid[0].0, IVec3::new(2, 1, 3));
        assert!(file.set(IVec3::new(3, 0, 0), Material::new("stone")).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_index() {
        let mut file = TemplateFile::new([1, 1, 1], [0, 0, 0]).expect("template");
        file.blocks[0] = 9;
        assert!(matches!(file.validate(), Err(Error::Config(_))));
        file.blocks.push(0);
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_oversized_grid_is_config_error() {
        let json = r#"{"size":[4294967295,4294967295,4294967295],"origin":[0,0,0],"palette":["air"],"blocks":[0]}"#;
        let file: TemplateFile = serde_json::from_str(json).expect("parse");
        assert!(matches!(file.validate(), Err(Error::Config(_))));
        assert!(matches!(file.extent(), Err(Error::Config(_))));
        assert_eq!(file.cells().count(), 0);

        // Each axis fits in an i32 but the cell count does not
        assert!(matches!(TemplateFile::new([65536, 65536, 1], [0, 0, 0]), Err(Error::Config(_))));
    }

    #[test]
    fn test_plain_and_compressed_files() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let mut file = TemplateFile::new([2, 2, 2], [1, 0, 1]).expect("template");
        file.set(IVec3::ZERO, Material::new("sponge")).expect("set");

        for name in ["mine.json", "mine.json.lz4"] {
            let path = temp_dir.path().join(name);
            file.write(&path).expect("write");
            assert_eq!(TemplateFile::read(&path).expect("read"), file);
        }
    }

    #[test]
    fn test_garbage_lz4_is_transient() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("broken.lz4");
        std::fs::write(&path, [4u8, 0, 0, 0, 0xff]).expect("write");
        assert!(TemplateFile::read(&path).unwrap_err().is_transient());
    }
}
