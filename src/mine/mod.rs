//! Mine instances and their lifecycle
//!
//! A [`Mine`] is created by the [`factory`], lives in the
//! [`MineRegistry`] under its owner, runs two repeating checks on the
//! world context and is persisted as [`MineData`].

pub mod data;
pub mod outcome;
pub mod instance;
pub mod tasks;
pub mod lifecycle;
pub mod factory;
pub mod registry;

pub use data::MineData;
pub use instance::{Mine, full_region_name, mining_region_name};
pub use outcome::{DeleteOutcome, ExpandOutcome, ResetOutcome, UpgradeOutcome};
pub use registry::MineRegistry;
pub use tasks::MineTasks;
