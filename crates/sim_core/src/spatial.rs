//! Grid geometry: intersection coordinates, bounds and distance metrics.
//!
//! The city is a square lattice of `grid_size × grid_size` intersections.
//! Every position is an integer intersection; vehicles move one block at a time.

use serde::{Deserialize, Serialize};

/// Default number of intersections along each axis.
pub const DEFAULT_GRID_SIZE: i32 = 20;

/// An intersection on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Signed per-axis offset from `self` to `other`.
    pub fn delta_to(self, other: GridPos) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn euclidean_distance(self, other: GridPos) -> f64 {
        let (dx, dy) = self.delta_to(other);
        f64::from(dx).hypot(f64::from(dy))
    }

    /// Max of the per-axis distances; used for the carpool detour threshold.
    pub fn chebyshev_distance(self, other: GridPos) -> u32 {
        let (dx, dy) = self.delta_to(other);
        dx.unsigned_abs().max(dy.unsigned_abs())
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Square grid bounds `[0, size)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    size: i32,
}

impl GridBounds {
    pub fn new(size: i32) -> Self {
        debug_assert!(size > 0, "grid size must be positive");
        Self { size }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        (0..self.size).contains(&pos.x) && (0..self.size).contains(&pos.y)
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}
