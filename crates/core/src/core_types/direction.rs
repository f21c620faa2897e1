//! Hexagonal lattice directions and the three collision axes
//!
//! The lattice is stored as a rectangular grid where each row is sheared half a
//! cell against its neighbour, so the six hexagonal neighbours of `(row, col)`
//! are reached by the fixed `(row, col)` offsets below. Direction `d` and
//! direction `d + 3` always point in opposite senses.

use serde::{Deserialize, Serialize};

/// Number of velocity directions per cell
pub const DIRECTIONS: usize = 6;

/// One of the six FHP velocity directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// `(0, +1)`
    East = 0,
    /// `(-1, +1)`
    NorthEast = 1,
    /// `(-1, 0)`
    NorthWest = 2,
    /// `(0, -1)`
    West = 3,
    /// `(+1, -1)`
    SouthWest = 4,
    /// `(+1, 0)`
    SouthEast = 5,
}

impl Direction {
    /// All directions in index order
    pub const ALL: [Direction; DIRECTIONS] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Look up a direction by its index (taken modulo 6)
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % DIRECTIONS]
    }

    /// Index of this direction in a node's flag vector
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Grid offset `(d_row, d_col)` of the neighbour this direction points at
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::East => (0, 1),
            Self::NorthEast => (-1, 1),
            Self::NorthWest => (-1, 0),
            Self::West => (0, -1),
            Self::SouthWest => (1, -1),
            Self::SouthEast => (1, 0),
        }
    }

    /// The direction rotated by 180°
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// The collision axis this direction belongs to
    #[must_use]
    pub const fn axis(self) -> Axis {
        Axis::ALL[self.index() % 3]
    }

    /// Physical unit vector `(x, y)` with y pointing up (towards row 0)
    #[must_use]
    pub fn unit_vector(self) -> (f64, f64) {
        let angle = std::f64::consts::FRAC_PI_3 * self.index() as f64;
        (angle.cos(), angle.sin())
    }
}

/// A pair of opposite directions
///
/// - `A` = {East, West}
/// - `B` = {NorthEast, SouthWest}
/// - `C` = {NorthWest, SouthEast}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    A,
    B,
    C,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::A, Axis::B, Axis::C];

    /// The two directions of this axis, lower index first
    #[inline]
    #[must_use]
    pub const fn directions(self) -> [Direction; 2] {
        match self {
            Self::A => [Direction::East, Direction::West],
            Self::B => [Direction::NorthEast, Direction::SouthWest],
            Self::C => [Direction::NorthWest, Direction::SouthEast],
        }
    }

    /// The other two axes in cyclic order (a 60° rotation either way)
    #[inline]
    #[must_use]
    pub const fn others(self) -> [Axis; 2] {
        match self {
            Self::A => [Axis::B, Axis::C],
            Self::B => [Axis::A, Axis::C],
            Self::C => [Axis::A, Axis::B],
        }
    }
}
