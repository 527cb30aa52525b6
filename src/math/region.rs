//! Integer axis-aligned cuboid regions

use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;

/// Inclusive integer cuboid defined by min and max corners.
///
/// Always normalised: `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub min: IVec3,
    pub max: IVec3,
}

impl Region {
    /// Create region from two arbitrary corners
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Single-voxel region
    pub fn point(p: IVec3) -> Self {
        Self { min: p, max: p }
    }

    /// Extent in voxels along each axis (max - min + 1)
    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    /// Number of voxels, saturating at `u64::MAX`
    pub fn volume(&self) -> u64 {
        let s = self.size();
        (s.x as u64)
            .saturating_mul(s.y as u64)
            .saturating_mul(s.z as u64)
    }

    /// Check if point is inside region (inclusive)
    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Check if `other` lies entirely inside this region
    pub fn contains_region(&self, other: &Region) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Check if two regions share at least one voxel
    pub fn intersects(&self, other: &Region) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Grow every face outward by `amount` voxels
    pub fn grown(&self, amount: i32) -> Region {
        self.grown_sides(IVec3::splat(amount), IVec3::splat(amount))
    }

    /// Grow the min corner by `neg` and the max corner by `pos`
    pub fn grown_sides(&self, neg: IVec3, pos: IVec3) -> Region {
        Region {
            min: self.min - neg,
            max: self.max + pos,
        }
    }

    /// Smallest region containing both
    pub fn union(&self, other: &Region) -> Region {
        Region {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Shift both corners
    pub fn translated(&self, offset: IVec3) -> Region {
        Region {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Iterate every voxel position, x fastest, then z, then y
    pub fn positions(&self) -> impl Iterator<Item = IVec3> + use<> {
        let Region { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }

    /// Iterate positions of this region that are not inside `inner`
    pub fn shell(&self, inner: Region) -> impl Iterator<Item = IVec3> + use<> {
        self.positions().filter(move |p| !inner.contains(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalises_corners() {
        let r = Region::new(IVec3::new(13, -2, -6), IVec3::new(-12, -2, 4));
        assert_eq!(r.min, IVec3::new(-12, -2, -6));
        assert_eq!(r.max, IVec3::new(13, -2, 4));
        assert_eq!(r.size(), IVec3::new(26, 1, 11));
        assert_eq!(r.volume(), 26 * 11);
    }

    #[test]
    fn test_contains() {
        let r = Region::new(IVec3::ZERO, IVec3::splat(3));
        assert!(r.contains(IVec3::ZERO));
        assert!(r.contains(IVec3::splat(3)));
        assert!(!r.contains(IVec3::new(4, 0, 0)));
        assert!(r.contains_region(&Region::new(IVec3::ONE, IVec3::splat(2))));
        assert!(!r.contains_region(&r.grown(1)));
    }

    #[test]
    fn test_intersects() {
        let a = Region::new(IVec3::ZERO, IVec3::splat(2));
        let b = Region::new(IVec3::splat(2), IVec3::splat(4));
        let c = Region::new(IVec3::splat(3), IVec3::splat(4));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_positions_cover_volume() {
        let r = Region::new(IVec3::new(-1, 0, -1), IVec3::new(1, 1, 1));
        let all: Vec<_> = r.positions().collect();
        assert_eq!(all.len() as u64, r.volume());
        assert_eq!(all[0], IVec3::new(-1, 0, -1));
        assert_eq!(all[1], IVec3::new(0, 0, -1));
    }

    #[test]
    fn test_shell_excludes_inner() {
        let inner = Region::new(IVec3::ZERO, IVec3::splat(2));
        let outer = inner.grown(1);
        let shell: Vec<_> = outer.shell(inner).collect();
        assert_eq!(shell.len() as u64, outer.volume() - inner.volume());
        assert!(shell.iter().all(|p| !inner.contains(*p)));
    }

    #[test]
    fn test_grown_sides() {
        let r = Region::new(IVec3::ZERO, IVec3::splat(2));
        let g = r.grown_sides(IVec3::new(1, 0, 1), IVec3::new(1, 0, 1));
        assert_eq!(g.min, IVec3::new(-1, 0, -1));
        assert_eq!(g.max, IVec3::new(3, 2, 3));
    }
}
