//! Circular obstacle region

use serde::{Deserialize, Serialize};

/// What an obstacle does to the particles streamed into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstaclePolicy {
    /// Every flag is moved into its opposite slot (elastic bounce-back)
    BounceBack,
    /// Every flag is cleared (absorbing wall)
    Absorbing,
}

/// Fixed circular region in global grid coordinates
///
/// A cell `(row, col)` is inside when
/// `(row - center_row)² + (col - center_column)² <= radius²`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center_row: usize,
    pub center_column: usize,
    /// Radius in cell units
    pub radius: usize,
    pub policy: ObstaclePolicy,
}

impl Obstacle {
    #[must_use]
    pub fn new(center_row: usize, center_column: usize, radius: usize, policy: ObstaclePolicy) -> Self {
        Self {
            center_row,
            center_column,
            radius,
            policy,
        }
    }

    /// Whether global cell `(row, col)` lies inside the obstacle
    #[inline]
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        let dr = row as i64 - self.center_row as i64;
        let dc = col as i64 - self.center_column as i64;
        let r = self.radius as i64;
        dr * dr + dc * dc <= r * r
    }

    /// Whether the obstacle sits strictly inside an `rows`×`columns` grid
    ///
    /// Edge conditions and the obstacle are applied independently, which is only
    /// sound when their cells never overlap.
    #[must_use]
    pub fn fits_within(&self, rows: usize, columns: usize) -> bool {
        self.center_row > self.radius
            && self.center_column > self.radius
            && self.center_row + self.radius < rows.saturating_sub(1)
            && self.center_column + self.radius < columns.saturating_sub(1)
    }
}
