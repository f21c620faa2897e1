//! Lattice storage and static geometry

pub mod lattice;
pub mod obstacle;

pub use lattice::Lattice;
pub use obstacle::{Obstacle, ObstaclePolicy};
