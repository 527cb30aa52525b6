//! Plotmine - private, resettable voxel mine plots
//!
//! Each player owns a mine stamped from a structure template at a plot
//! issued by a spiral allocator. Mines refill on a timer or once dug out,
//! can expand and upgrade through an ordered tier catalog, and persist
//! across restarts. Everything is wired through [`context::MineContext`].

pub mod core;
pub mod math;
pub mod world;
pub mod config;
pub mod template;
pub mod tier;
pub mod placement;
pub mod services;
pub mod storage;
pub mod mine;
pub mod context;

pub use context::MineContext;
