//! Placement transform for stamping templates into the world

use serde::{Deserialize, Serialize};

use crate::core::types::IVec3;
use crate::math::region::Region;

/// Quarter-turn rotation about the vertical (Y) axis, clockwise seen from above
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Rotate a relative offset
    pub fn apply(self, v: IVec3) -> IVec3 {
        match self {
            Rotation::None => v,
            Rotation::Cw90 => IVec3::new(-v.z, v.y, v.x),
            Rotation::Cw180 => IVec3::new(-v.x, v.y, -v.z),
            Rotation::Cw270 => IVec3::new(v.z, v.y, -v.x),
        }
    }
}

/// Maps template-relative offsets to absolute world positions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// World position the template origin lands on (the plot)
    pub origin: IVec3,
    pub rotation: Rotation,
}

impl Placement {
    pub fn new(origin: IVec3, rotation: Rotation) -> Self {
        Self { origin, rotation }
    }

    /// Identity rotation at `origin`
    pub fn at(origin: IVec3) -> Self {
        Self::new(origin, Rotation::None)
    }

    /// Absolute position of a template-relative offset
    pub fn apply(&self, offset: IVec3) -> IVec3 {
        self.origin + self.rotation.apply(offset)
    }

    /// Absolute region spanned by two template-relative corners
    pub fn apply_region(&self, relative: Region) -> Region {
        Region::new(self.apply(relative.min), self.apply(relative.max))
    }
}
