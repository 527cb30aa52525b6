//! Absolute plot geometry derived from a template and a placement

use crate::core::types::IVec3;
use crate::math::{Placement, Region};
use crate::template::Template;

/// Rails anchors sit one voxel past their corner along +Z
const RAIL_SHIFT: IVec3 = IVec3::new(0, 0, 1);

/// Where everything of one stamped template ends up in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotLayout {
    pub plot: IVec3,
    pub spawn: IVec3,
    pub mining: Region,
    /// Template footprint, grown to keep `clearance` around `mining`
    pub full: Region,
    pub lower_rails: IVec3,
    pub upper_rails: IVec3,
    pub npc: Option<IVec3>,
    pub quarry: Option<IVec3>,
}

impl PlotLayout {
    pub fn compute(template: &Template, placement: Placement, clearance: i32) -> Self {
        let mining = placement.apply_region(template.mining_offsets());
        let footprint = placement.apply_region(template.bounds);
        Self {
            plot: placement.origin,
            spawn: placement.apply(template.spawn),
            mining,
            full: footprint.union(&mining.grown(clearance)),
            lower_rails: placement.apply(template.corners[1] + RAIL_SHIFT),
            upper_rails: placement.apply(template.corners[0] + RAIL_SHIFT),
            npc: template.npc.map(|o| placement.apply(o)),
            quarry: template.quarry.map(|o| placement.apply(o)),
        }
    }
}
