//! Spatial allocator: issues plot origins along a square spiral.
//!
//! Plots live on an XZ grid `spacing` apart at a fixed height. The cursor
//! is the grid cell of the next plot; it moves outward ring by ring and
//! never revisits a cell, so every issued plot is unique.

use std::sync::{Arc, Mutex};

use crate::core::types::{IVec2, IVec3};
use crate::core::Result;
use crate::storage::MineStore;

/// Grid cell following `cell` on the spiral
pub fn spiral_next(cell: IVec2) -> IVec2 {
    let IVec2 { x, y: z } = cell;
    let r = x.abs().max(z.abs());
    if x == r && z == -r {
        // Bottom-right corner: step out into the next ring
        IVec2::new(x + 1, z)
    } else if x == r && z < r {
        IVec2::new(x, z + 1)
    } else if z == r && x > -r {
        IVec2::new(x - 1, z)
    } else if x == -r && z > -r {
        IVec2::new(x, z - 1)
    } else {
        IVec2::new(x + 1, z)
    }
}

/// Hands out plot origins, persisting the cursor before each one
pub struct PlotAllocator {
    spacing: i32,
    y_level: i32,
    cursor: Mutex<IVec2>,
    store: Option<Arc<MineStore>>,
}

impl PlotAllocator {
    /// In-memory allocator starting at `start`
    pub fn new(spacing: i32, y_level: i32, start: IVec2) -> Self {
        Self {
            spacing,
            y_level,
            cursor: Mutex::new(start),
            store: None,
        }
    }

    /// Allocator resuming from the store's saved cursor
    pub fn open(spacing: i32, y_level: i32, store: Arc<MineStore>) -> Result<Self> {
        let start = store.load_cursor()?.unwrap_or(IVec2::ZERO);
        log::info!("Plot allocator resuming at grid cell {}", start);
        Ok(Self {
            spacing,
            y_level,
            cursor: Mutex::new(start),
            store: Some(store),
        })
    }

    fn plot_at(&self, cell: IVec2) -> IVec3 {
        IVec3::new(cell.x * self.spacing, self.y_level, cell.y * self.spacing)
    }

    /// Issue the next plot.
    ///
    /// The advanced cursor is saved first; if that fails nothing is
    /// issued and the cursor stays put.
    pub fn next_plot(&self) -> Result<IVec3> {
        let mut cursor = self.cursor.lock().unwrap();
        let issued = *cursor;
        let next = spiral_next(issued);
        if let Some(store) = &self.store {
            store.save_cursor(next)?;
        }
        *cursor = next;
        Ok(self.plot_at(issued))
    }

    /// Plot the next call to `next_plot` would issue
    pub fn peek(&self) -> IVec3 {
        self.plot_at(*self.cursor.lock().unwrap())
    }

    pub fn cursor(&self) -> IVec2 {
        *self.cursor.lock().unwrap()
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }
}
