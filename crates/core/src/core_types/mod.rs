//! Leaf data types shared by every stage of the automaton

pub mod direction;
pub mod node;

pub use direction::{Axis, Direction, DIRECTIONS};
pub use node::Node;
