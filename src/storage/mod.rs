//! Persistence of mines, the pregenerated queue and the allocator cursor

pub mod atomic;
pub mod store;

pub use atomic::atomic_write;
pub use store::MineStore;
