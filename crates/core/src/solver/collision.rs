//! FHP-I collision rules
//!
//! Collisions are purely local: each cell's six flags are redistributed without
//! changing how many are set. The rule is chosen by the occupied count `k`:
//!
//! | k          | rule                                                            |
//! |------------|-----------------------------------------------------------------|
//! | 0, 1, 5, 6 | unchanged                                                       |
//! | 2          | head-on pair rotates 60° either way (one random bit)            |
//! | 3          | head-on pair + spectator: pair moves to the axis not touching   |
//! |            | the spectator (four fixed patterns, deterministic)              |
//! | 4          | the empty axis fills, one of the other two empties (one bit)   |
//!
//! Any configuration not listed is left unchanged, including two particles that
//! are not head-on and the symmetric triples {0,2,4} and {1,3,5}.

use super::entropy::{cell_rng, BitSource, Stream};
use crate::core_types::{Axis, Direction, Node};
use crate::grid::{Lattice, Obstacle};
use rayon::prelude::*;

/// The four three-particle patterns: head-on axis plus spectator direction
const TRIPLE_PATTERNS: [(Axis, Direction); 4] = [
    (Axis::A, Direction::NorthEast),
    (Axis::B, Direction::NorthWest),
    (Axis::C, Direction::West),
    (Axis::A, Direction::SouthEast),
];

/// The unique axis satisfying `predicate`, if exactly one does
fn single_axis(node: &Node, predicate: impl Fn(&Node, Axis) -> bool) -> Option<Axis> {
    let mut matching = Axis::ALL.into_iter().filter(|&axis| predicate(node, axis));
    let first = matching.next()?;
    matching.next().is_none().then_some(first)
}

/// Apply the collision rule to one node in place
///
/// Draws exactly one bit from `bits` when a random choice is made (head-on
/// pairs and the four-particle case) and none otherwise. Pinned nodes are
/// never passed here by the lattice pass, but the rule itself ignores the pin.
///
/// Returns `true` if the flags changed.
pub fn collide<B: BitSource + ?Sized>(node: &mut Node, bits: &mut B) -> bool {
    let before = *node;
    match node.occupied() {
        2 => {
            if let Some(axis) = single_axis(node, Node::is_head_on) {
                let target = axis.others()[usize::from(bits.next_bit())];
                node.fill_axis(axis, false);
                node.fill_axis(target, true);
            }
        }
        3 => {
            let matched = TRIPLE_PATTERNS
                .iter()
                .find(|&&(axis, spectator)| node.is_head_on(axis) && node.get(spectator));
            if let Some(&(axis, spectator)) = matched {
                let [first, second] = axis.others();
                let target = if first == spectator.axis() { second } else { first };
                node.fill_axis(axis, false);
                node.fill_axis(target, true);
            }
        }
        4 => {
            if let Some(empty) = single_axis(node, Node::is_axis_empty) {
                let cleared = empty.others()[usize::from(bits.next_bit())];
                node.fill_axis(empty, true);
                node.fill_axis(cleared, false);
            }
        }
        _ => {}
    }
    *node != before
}

/// Applies collisions over a lattice block
///
/// Every cell draws from its own generator keyed by the global coordinates and
/// the step, so the outcome does not depend on the worker count or on the
/// order rayon visits the rows in.
#[derive(Debug, Clone, Copy)]
pub struct CollisionEngine {
    seed: u64,
}

impl CollisionEngine {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Collide every unpinned cell outside `obstacle`
    ///
    /// Returns the number of cells whose flags changed.
    pub fn apply(&self, lattice: &mut Lattice, step: u64, obstacle: Option<&Obstacle>) -> usize {
        let columns = lattice.columns();
        let offset = lattice.column_offset();
        let seed = self.seed;

        lattice
            .as_mut_slice()
            .par_chunks_mut(columns)
            .enumerate()
            .map(|(row, cells)| {
                let mut changed = 0;
                for (col, node) in cells.iter_mut().enumerate() {
                    let global_col = offset + col;
                    if node.pinned || obstacle.is_some_and(|o| o.contains(row, global_col)) {
                        continue;
                    }
                    if node.occupied() < 2 || node.occupied() > 4 {
                        continue;
                    }
                    let mut rng = cell_rng(seed, Stream::Collision, step, row, global_col);
                    if collide(node, &mut rng) {
                        changed += 1;
                    }
                }
                changed
            })
            .sum()
    }
}
