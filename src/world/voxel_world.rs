//! Sparse in-memory voxel world

use std::collections::HashMap;

use crate::core::types::IVec3;
use crate::math::{Placement, Region};
use crate::world::material::Material;

/// Sparse voxel store. Positions that are not present are air.
///
/// This is the authoritative world model; only the world-mutation
/// context (`WorldContext`) hands out mutable access to it.
pub struct VoxelWorld {
    voxels: HashMap<IVec3, Material>,
}

impl VoxelWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            voxels: HashMap::new(),
        }
    }

    /// Material at a position (air if unset)
    pub fn get(&self, pos: IVec3) -> Material {
        self.voxels.get(&pos).cloned().unwrap_or_else(Material::air)
    }

    pub fn is_air(&self, pos: IVec3) -> bool {
        !self.voxels.contains_key(&pos)
    }

    /// Set a voxel; setting air removes it
    pub fn set(&mut self, pos: IVec3, material: Material) {
        if material.is_air() {
            self.voxels.remove(&pos);
        } else {
            self.voxels.insert(pos, material);
        }
    }

    /// Fill a region, asking `pick` for each voxel's material.
    /// Returns the number of voxels written.
    pub fn fill_with(&mut self, region: Region, mut pick: impl FnMut(IVec3) -> Material) -> u64 {
        let mut written = 0;
        for pos in region.positions() {
            self.set(pos, pick(pos));
            written += 1;
        }
        written
    }

    /// Fill a region with a single material
    pub fn fill(&mut self, region: Region, material: &Material) -> u64 {
        self.fill_with(region, |_| material.clone())
    }

    /// Replace every voxel of a region with air
    pub fn clear(&mut self, region: Region) -> u64 {
        if region.volume() > self.voxels.len() as u64 {
            let before = self.voxels.len();
            self.voxels.retain(|pos, _| !region.contains(*pos));
            (before - self.voxels.len()) as u64
        } else {
            region.positions().filter(|p| self.voxels.remove(p).is_some()).count() as u64
        }
    }

    /// Number of non-air voxels inside a region
    pub fn count_solid(&self, region: Region) -> u64 {
        // Walk whichever side is smaller: the region or the stored voxels.
        if region.volume() > self.voxels.len() as u64 {
            self.voxels.keys().filter(|p| region.contains(**p)).count() as u64
        } else {
            region.positions().filter(|p| self.voxels.contains_key(p)).count() as u64
        }
    }

    /// First position yielded by `positions` that holds `material`
    pub fn find_material(
        &self,
        positions: impl IntoIterator<Item = IVec3>,
        material: &Material,
    ) -> Option<IVec3> {
        positions
            .into_iter()
            .find(|p| self.voxels.get(p).is_some_and(|m| m == material))
    }

    /// Paste template-relative voxels through a placement.
    /// Air in the source is skipped, so existing terrain shows through.
    pub fn paste<'a>(
        &mut self,
        placement: &Placement,
        blocks: impl IntoIterator<Item = &'a (IVec3, Material)>,
    ) -> u64 {
        let mut written = 0;
        for (offset, material) in blocks {
            if material.is_air() {
                continue;
            }
            self.voxels.insert(placement.apply(*offset), material.clone());
            written += 1;
        }
        written
    }

    /// Total number of stored (non-air) voxels
    pub fn solid_count(&self) -> usize {
        self.voxels.len()
    }
}

impl Default for VoxelWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(n: i32) -> Region {
        Region::new(IVec3::ZERO, IVec3::splat(n - 1))
    }

    #[test]
    fn test_new_world_is_air() {
        let world = VoxelWorld::new();
        assert!(world.get(IVec3::new(5, 5, 5)).is_air());
        assert_eq!(world.solid_count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut world = VoxelWorld::new();
        world.set(IVec3::ONE, Material::new("stone"));
        assert_eq!(world.get(IVec3::ONE), Material::new("stone"));
        world.set(IVec3::ONE, Material::air());
        assert!(world.is_air(IVec3::ONE));
    }

    #[test]
    fn test_fill_and_count() {
        let mut world = VoxelWorld::new();
        let region = cube(4);
        assert_eq!(world.fill(region, &Material::new("stone")), 64);
        assert_eq!(world.count_solid(region), 64);
        // Larger query region takes the map-walk path
        assert_eq!(world.count_solid(region.grown(10)), 64);
    }

    #[test]
    fn test_clear_both_paths() {
        let mut world = VoxelWorld::new();
        world.fill(cube(4), &Material::new("stone"));
        assert_eq!(world.clear(Region::new(IVec3::ZERO, IVec3::new(3, 0, 3))), 16);
        assert_eq!(world.solid_count(), 48);
        assert_eq!(world.clear(cube(4).grown(5)), 48);
        assert_eq!(world.solid_count(), 0);
    }

    #[test]
    fn test_find_material() {
        let mut world = VoxelWorld::new();
        let obsidian = Material::new("obsidian");
        world.set(IVec3::new(2, 0, 0), obsidian.clone());
        let hit = world.find_material(cube(3).positions(), &obsidian);
        assert_eq!(hit, Some(IVec3::new(2, 0, 0)));
        assert_eq!(world.find_material(cube(2).positions(), &obsidian), None);
    }

    #[test]
    fn test_paste_skips_air() {
        let mut world = VoxelWorld::new();
        world.set(IVec3::new(10, 0, 0), Material::new("dirt"));
        let blocks = vec![
            (IVec3::ZERO, Material::new("sponge")),
            (IVec3::new(1, 0, 0), Material::air()),
        ];
        let written = world.paste(&Placement::at(IVec3::new(9, 0, 0)), &blocks);
        assert_eq!(written, 1);
        assert_eq!(world.get(IVec3::new(9, 0, 0)), Material::new("sponge"));
        assert_eq!(world.get(IVec3::new(10, 0, 0)), Material::new("dirt"));
    }
}
