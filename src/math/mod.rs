//! Integer geometry for plots and regions

pub mod region;
pub mod transform;

pub use region::Region;
pub use transform::{Placement, Rotation};
