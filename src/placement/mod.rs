//! Plot placement: allocation, layout and pregeneration

pub mod allocator;
pub mod layout;
pub mod pregen;

pub use allocator::{PlotAllocator, spiral_next};
pub use layout::PlotLayout;
pub use pregen::{PregenMine, PregenQueue, generate};
