//! World model and the single world-mutation context

pub mod material;
pub mod pattern;
pub mod voxel_world;
pub mod scheduler;
pub mod context;

pub use material::Material;
pub use pattern::{MaterialWeights, WeightedPattern};
pub use voxel_world::VoxelWorld;
pub use scheduler::{Scheduler, TaskHandle, Tick};
pub use context::{TickReport, WorldContext, WorldJob};
