//! Macroscopic moments of the occupation field
//!
//! Density is the number of occupied flags in a cell. Velocity is the sum of
//! the hexagonal unit vectors of the occupied directions, with
//! `e_d = (cos 60°·d, sin 60°·d)`.

use crate::core_types::{Direction, Node};
use crate::grid::Lattice;
use std::fmt::Write as _;

/// Density and velocity of one cell
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub density: usize,
    pub velocity: (f64, f64),
}

impl Moments {
    #[must_use]
    pub fn of(node: &Node) -> Self {
        let velocity = Direction::ALL
            .into_iter()
            .filter(|&d| node.get(d))
            .map(Direction::unit_vector)
            .fold((0.0, 0.0), |(x, y), (ux, uy)| (x + ux, y + uy));
        Self {
            density: node.occupied(),
            velocity,
        }
    }

    /// One line of the macroscopic dump for global cell `(row, col)`
    #[must_use]
    pub fn line(&self, row: usize, col: usize) -> String {
        format!(
            "({row},{col}): Density={}, Velocity=({:.6},{:.6})",
            self.density, self.velocity.0, self.velocity.1
        )
    }
}

/// Moments of every cell, row-major
#[must_use]
pub fn moments(lattice: &Lattice) -> Vec<Moments> {
    lattice.as_slice().iter().map(Moments::of).collect()
}

/// The whole block rendered as macroscopic lines in global coordinates
#[must_use]
pub fn render(lattice: &Lattice) -> String {
    let mut out = String::with_capacity(lattice.as_slice().len() * 48);
    for row in 0..lattice.rows() {
        for col in 0..lattice.columns() {
            let line = Moments::of(lattice.get(row, col)).line(row, lattice.global_column(col));
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

/// Net momentum of the block
#[must_use]
pub fn total_momentum(lattice: &Lattice) -> (f64, f64) {
    lattice
        .as_slice()
        .iter()
        .map(|node| Moments::of(node).velocity)
        .fold((0.0, 0.0), |(x, y), (vx, vy)| (x + vx, y + vy))
}
