//! Template indexer: extracts semantic anchors from a structure template.
//!
//! One pass over the template grid collects the pasteable payload and the
//! positions of the sentinel materials. Sentinels are anchors, not
//! geometry, so they are left out of the payload.

use std::path::{Path, PathBuf};

use crate::config::SentinelMarkers;
use crate::core::types::IVec3;
use crate::core::{Error, Result};
use crate::math::Region;
use crate::template::format::TemplateFile;
use crate::world::{Material, MaterialWeights};

/// Immutable, indexed structure template.
///
/// Every offset is relative to the template origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// File the template was indexed from
    pub source: PathBuf,
    /// Non-air, non-sentinel voxels
    pub blocks: Vec<(IVec3, Material)>,
    /// Footprint of the whole template grid
    pub bounds: Region,
    pub spawn: IVec3,
    /// Opposite corners of the mining region
    pub corners: [IVec3; 2],
    pub npc: Option<IVec3>,
    pub quarry: Option<IVec3>,
    /// Default refill table
    pub materials: MaterialWeights,
}

impl Template {
    /// Mining region relative to the origin
    pub fn mining_offsets(&self) -> Region {
        Region::new(self.corners[0], self.corners[1])
    }

    /// Number of voxels a paste writes
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Read and index a template file
pub fn index(path: &Path, markers: &SentinelMarkers) -> Result<Template> {
    let file = TemplateFile::read(path)?;
    let template = index_file(path, &file, markers)?;
    log::debug!(
        "Indexed template {}: {} blocks, spawn {}, corners {} / {}",
        path.display(),
        template.blocks.len(),
        template.spawn,
        template.corners[0],
        template.corners[1]
    );
    Ok(template)
}

/// Index an already-parsed template document
pub fn index_file(source: &Path, file: &TemplateFile, markers: &SentinelMarkers) -> Result<Template> {
    file.validate()?;
    let origin = file.origin();
    let mut blocks = Vec::new();
    let mut corners: Vec<IVec3> = Vec::with_capacity(2);
    let mut spawn = None;
    let mut npc = None;
    let mut quarry = None;

    for (cell, material) in file.cells() {
        if material.is_air() {
            continue;
        }
        let rel = cell - origin;
        if *material == markers.corner {
            if corners.len() < 2 {
                corners.push(rel);
            }
        } else if *material == markers.spawn {
            spawn.get_or_insert(rel);
        } else if *material == markers.npc {
            npc.get_or_insert(rel);
        } else if *material == markers.quarry {
            quarry.get_or_insert(rel);
        } else {
            blocks.push((rel, material.clone()));
        }
    }

    let spawn = spawn.ok_or_else(|| {
        Error::config(format!(
            "template {} has no spawn marker ({})",
            source.display(),
            markers.spawn
        ))
    })?;
    let corners: [IVec3; 2] = corners.try_into().map_err(|found: Vec<IVec3>| {
        Error::config(format!(
            "template {} needs two corner markers ({}), found {}",
            source.display(),
            markers.corner,
            found.len()
        ))
    })?;

    let bounds = Region::new(-origin, file.extent()? - IVec3::ONE - origin);

    Ok(Template {
        source: source.to_path_buf(),
        blocks,
        bounds,
        spawn,
        corners,
        npc,
        quarry,
        materials: file.materials.clone(),
    })
}
