//! Core type aliases and re-exports

pub use glam::{IVec2, IVec3};

/// Standard Result type for the engine
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Stable player identity (owner, banned player, friend).
pub type PlayerId = uuid::Uuid;

/// Server ticks per second of the world-mutation context.
pub const TICKS_PER_SECOND: u64 = 20;

/// Convert whole minutes to scheduler ticks.
pub fn minutes_to_ticks(minutes: u32) -> u64 {
    minutes as u64 * 60 * TICKS_PER_SECOND
}
