//! Ballistic propagation
//!
//! Streaming moves every occupied flag one cell along its direction. It reads
//! the current lattice and writes a separate destination lattice, so no cell
//! ever observes a partially updated neighbour. The caller swaps the two
//! buffers afterwards.
//!
//! The pass is written as a pull: destination flag `d` of cell `(i, j)` is the
//! source flag `d` of cell `(i, j) - offset(d)`. Rows wrap modulo M. A source
//! column just outside the block comes from the [`Halo`], which holds the
//! neighbour workers' boundary columns (or, for a lone worker on a ring, its
//! own opposite edge).

use crate::core_types::{Direction, Node};
use crate::grid::Lattice;
use crate::partition::EdgeColumns;
use rayon::prelude::*;

/// Read-only ghost columns bordering a lattice block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halo {
    left: Vec<Node>,
    right: Vec<Node>,
}

impl Halo {
    /// Nothing beyond either seam
    #[must_use]
    pub fn vacuum(rows: usize) -> Self {
        Self {
            left: vec![Node::VACUUM; rows],
            right: vec![Node::VACUUM; rows],
        }
    }

    /// Ghosts received from an exchange; missing sides are vacuum
    ///
    /// # Panics
    ///
    /// Panics if a received column does not have `rows` entries
    #[must_use]
    pub fn from_exchange(rows: usize, incoming: EdgeColumns) -> Self {
        let left = incoming.left.unwrap_or_else(|| vec![Node::VACUUM; rows]);
        let right = incoming.right.unwrap_or_else(|| vec![Node::VACUUM; rows]);
        assert!(
            left.len() == rows && right.len() == rows,
            "Ghost column length mismatch"
        );
        Self { left, right }
    }

    /// Ghosts that close a block covering the whole grid into a torus
    #[must_use]
    pub fn wrapped(lattice: &Lattice) -> Self {
        Self {
            left: lattice.column(lattice.columns() - 1),
            right: lattice.column(0),
        }
    }

    #[must_use]
    pub fn left(&self) -> &[Node] {
        &self.left
    }

    #[must_use]
    pub fn right(&self) -> &[Node] {
        &self.right
    }
}

/// The source node a destination cell pulls direction `d` from
#[inline(always)]
fn upstream<'a>(
    src: &'a Lattice,
    halo: &'a Halo,
    row: usize,
    col: usize,
    d: Direction,
) -> &'a Node {
    let rows = src.rows() as isize;
    let (dr, dc) = d.offset();
    let src_row = (row as isize - dr).rem_euclid(rows) as usize;
    let src_col = col as isize - dc;
    if src_col < 0 {
        &halo.left[src_row]
    } else if src_col as usize >= src.columns() {
        &halo.right[src_row]
    } else {
        src.get(src_row, src_col as usize)
    }
}

/// Stream `src` into `dst`
///
/// `dst` must have the same shape as `src`; its previous contents are
/// overwritten. Pinned cells keep their own vector, emit nothing and absorb
/// nothing.
///
/// # Panics
///
/// Panics if the shapes differ or the halo has the wrong number of rows
pub fn stream(src: &Lattice, dst: &mut Lattice, halo: &Halo) {
    assert!(
        src.rows() == dst.rows() && src.columns() == dst.columns(),
        "Streaming buffers differ in shape"
    );
    assert!(
        halo.left.len() == src.rows() && halo.right.len() == src.rows(),
        "Ghost column length mismatch"
    );
    let columns = src.columns();

    dst.as_mut_slice()
        .par_chunks_mut(columns)
        .enumerate()
        .for_each(|(row, cells)| {
            for (col, out) in cells.iter_mut().enumerate() {
                let here = src.get(row, col);
                if here.pinned {
                    *out = *here;
                    continue;
                }
                let mut node = Node::VACUUM;
                for d in Direction::ALL {
                    let from = upstream(src, halo, row, col, d);
                    node.set(d, !from.pinned && from.get(d));
                }
                *out = node;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{split, Partition};
    use Direction::{East, NorthEast, SouthWest, West};

    fn stream_torus(lattice: &Lattice) -> Lattice {
        let mut next = lattice.clone();
        stream(lattice, &mut next, &Halo::wrapped(lattice));
        next
    }

    #[test]
    fn test_single_particle_moves_east() {
        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.insert(2, 2, East);
        let next = stream_torus(&lattice);
        assert!(next.get(2, 3).get(East));
        assert!(!next.get(2, 2).get(East));
        assert_eq!(next.mass(), 1);
    }

    #[test]
    fn test_column_wraparound() {
        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.insert(2, 4, East);
        let next = stream_torus(&lattice);
        assert!(next.get(2, 0).get(East));
        assert_eq!(next.mass(), 1);
    }

    #[test]
    fn test_row_wraparound() {
        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.insert(0, 1, NorthEast);
        lattice.insert(4, 1, SouthWest);
        let next = stream_torus(&lattice);
        assert!(next.get(4, 2).get(NorthEast));
        assert!(next.get(0, 0).get(SouthWest));
    }

    #[test]
    fn test_every_direction_lands_on_its_offset() {
        for d in Direction::ALL {
            let mut lattice = Lattice::new(5, 5).unwrap();
            lattice.insert(2, 2, d);
            let next = stream_torus(&lattice);
            let (dr, dc) = d.offset();
            let row = (2 + dr) as usize;
            let col = (2 + dc) as usize;
            assert!(next.get(row, col).get(d), "{d:?} did not reach ({row}, {col})");
            assert_eq!(next.mass(), 1);
        }
    }

    #[test]
    fn test_open_edge_drops_outgoing_particles() {
        let mut lattice = Lattice::new(3, 3).unwrap();
        lattice.insert(1, 2, East);
        lattice.insert(1, 0, West);
        let mut next = lattice.clone();
        stream(&lattice, &mut next, &Halo::vacuum(3));
        assert_eq!(next.mass(), 0);
    }

    #[test]
    fn test_pinned_cells_neither_emit_nor_absorb() {
        let mut lattice = Lattice::new(3, 4).unwrap();
        lattice.get_mut(1, 1).pinned = true;
        lattice.insert(1, 1, East);
        lattice.insert(1, 0, East); // heads into the pinned cell
        let next = stream_torus(&lattice);

        assert_eq!(next.get(1, 1), lattice.get(1, 1));
        assert!(!next.get(1, 2).get(East));
        assert_eq!(next.mass(), 1);
    }

    #[test]
    fn test_partitioned_stream_matches_whole_grid() {
        let mut whole = Lattice::new(4, 6).unwrap();
        for (i, d) in Direction::ALL.into_iter().enumerate() {
            whole.insert(i % 4, i, d);
            whole.insert((i + 1) % 4, 5 - i, d.opposite());
        }
        let expected = stream_torus(&whole);

        let parts: Vec<Partition> = split(6, 2).unwrap();
        let blocks: Vec<Lattice> = parts
            .iter()
            .map(|p| {
                let mut block = Lattice::for_partition(4, p).unwrap();
                for col in 0..block.columns() {
                    block.set_column(col, &whole.column(block.global_column(col)));
                }
                block
            })
            .collect();

        // Ring neighbours: block 0's left ghost is block 1's last column, etc.
        let halos = [
            Halo::from_exchange(
                4,
                EdgeColumns::new(Some(blocks[1].column(2)), Some(blocks[1].column(0))),
            ),
            Halo::from_exchange(
                4,
                EdgeColumns::new(Some(blocks[0].column(2)), Some(blocks[0].column(0))),
            ),
        ];

        let mut result = Lattice::new(4, 6).unwrap();
        for (block, halo) in blocks.iter().zip(&halos) {
            let mut next = block.clone();
            stream(block, &mut next, halo);
            result.paste(&next);
        }
        assert_eq!(result, expected);
        assert_eq!(result.mass(), whole.mass());
    }
}
