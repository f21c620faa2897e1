//! Lattice storage
//!
//! A `Lattice` is one worker's block of the global M×N grid: every row, and the
//! contiguous column range `[column_offset, column_offset + columns)`. A serial
//! run is simply the block that covers all N columns.

use crate::core_types::{Direction, Node};
use crate::error::{FhpError, Result};
use crate::partition::Partition;

/// Owned, contiguous row-major block of nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    /// Nodes in row-major order (row * columns + col)
    nodes: Vec<Node>,
    /// Number of rows (M, never partitioned)
    rows: usize,
    /// Number of locally owned columns
    columns: usize,
    /// Global index of local column 0
    column_offset: usize,
    /// Global column count (N)
    global_columns: usize,
}

impl Lattice {
    /// Allocate an all-vacuum lattice covering the whole grid
    ///
    /// # Errors
    ///
    /// Returns `FhpError::Allocation` if storage cannot be reserved and
    /// `FhpError::InvalidConfig` for a zero dimension.
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        Self::allocate(rows, columns, 0, columns)
    }

    /// Allocate the block owned by `partition`
    ///
    /// # Errors
    ///
    /// Same as [`Lattice::new`].
    pub fn for_partition(rows: usize, partition: &Partition) -> Result<Self> {
        Self::allocate(
            rows,
            partition.width(),
            partition.start_column,
            partition.global_columns,
        )
    }

    fn allocate(
        rows: usize,
        columns: usize,
        column_offset: usize,
        global_columns: usize,
    ) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(FhpError::InvalidConfig(format!(
                "lattice dimensions must be positive, got {rows}x{columns}"
            )));
        }
        let cells = rows
            .checked_mul(columns)
            .ok_or(FhpError::Allocation { cells: usize::MAX })?;

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(cells)
            .map_err(|_| FhpError::Allocation { cells })?;
        nodes.resize(cells, Node::VACUUM);

        Ok(Self {
            nodes,
            rows,
            columns,
            column_offset,
            global_columns,
        })
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Locally owned column count
    #[inline]
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    #[must_use]
    pub fn column_offset(&self) -> usize {
        self.column_offset
    }

    #[inline]
    #[must_use]
    pub fn global_columns(&self) -> usize {
        self.global_columns
    }

    /// Global column index of local column `col`
    #[inline]
    #[must_use]
    pub fn global_column(&self, col: usize) -> usize {
        self.column_offset + col
    }

    /// Local index of global column `global`, if this block owns it
    #[must_use]
    pub fn local_column(&self, global: usize) -> Option<usize> {
        global
            .checked_sub(self.column_offset)
            .filter(|&local| local < self.columns)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.columns,
            "Coordinates out of bounds"
        );
        row * self.columns + col
    }

    /// Node at local `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> &Node {
        &self.nodes[self.index(row, col)]
    }

    /// Mutable node at local `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut Node {
        let idx = self.index(row, col);
        &mut self.nodes[idx]
    }

    /// Place a single particle at local `(row, col)`
    pub fn insert(&mut self, row: usize, col: usize, direction: Direction) {
        self.get_mut(row, col).set(direction, true);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    pub fn as_mut_slice(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Rows as mutable slices, for row-parallel passes
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, Node> {
        self.nodes.chunks_exact_mut(self.columns)
    }

    /// Copy of local column `col`, one node per row
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<Node> {
        (0..self.rows).map(|row| *self.get(row, col)).collect()
    }

    /// Overwrite local column `col`
    ///
    /// # Panics
    ///
    /// Panics if `nodes` does not have exactly one entry per row
    pub fn set_column(&mut self, col: usize, nodes: &[Node]) {
        assert_eq!(nodes.len(), self.rows, "Column length mismatch");
        for (row, node) in nodes.iter().enumerate() {
            *self.get_mut(row, col) = *node;
        }
    }

    /// Clear every flag, keeping pins
    pub fn clear(&mut self) {
        for node in &mut self.nodes {
            node.flags = Node::VACUUM.flags;
        }
    }

    /// Total occupied-direction count over the block
    #[must_use]
    pub fn mass(&self) -> usize {
        self.nodes.iter().map(Node::occupied).sum()
    }

    /// Copy a partition block into this (global) lattice at its column offset
    ///
    /// # Panics
    ///
    /// Panics if the block does not fit
    pub fn paste(&mut self, block: &Lattice) {
        assert_eq!(block.rows, self.rows, "Row count mismatch");
        for col in 0..block.columns {
            let target = self
                .local_column(block.global_column(col))
                .expect("Block column outside target lattice");
            for row in 0..self.rows {
                *self.get_mut(row, target) = *block.get(row, col);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_creation() {
        let lattice = Lattice::new(4, 6).unwrap();
        assert_eq!(lattice.rows(), 4);
        assert_eq!(lattice.columns(), 6);
        assert_eq!(lattice.as_slice().len(), 24);
        assert_eq!(lattice.mass(), 0);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            Lattice::new(0, 5),
            Err(FhpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_row_major_indexing() {
        let mut lattice = Lattice::new(3, 5).unwrap();
        lattice.insert(2, 1, Direction::West);
        assert!(lattice.get(2, 1).get(Direction::West));
        assert!(lattice.as_slice()[2 * 5 + 1].get(Direction::West));
        assert_eq!(lattice.mass(), 1);
    }

    #[test]
    fn test_partition_block_offsets() {
        let partition = Partition::new(1, 2, 10).unwrap();
        let block = Lattice::for_partition(3, &partition).unwrap();
        assert_eq!(block.columns(), 5);
        assert_eq!(block.global_column(0), 5);
        assert_eq!(block.local_column(7), Some(2));
        assert_eq!(block.local_column(4), None);
        assert_eq!(block.local_column(10), None);
    }

    #[test]
    fn test_column_round_trip_and_paste() {
        let partition = Partition::new(1, 2, 4).unwrap();
        let mut block = Lattice::for_partition(2, &partition).unwrap();
        block.insert(1, 0, Direction::East);

        let column = block.column(0);
        assert_eq!(column.len(), 2);
        block.set_column(1, &column);
        assert!(block.get(1, 1).get(Direction::East));

        let mut global = Lattice::new(2, 4).unwrap();
        global.paste(&block);
        assert!(global.get(1, 2).get(Direction::East));
        assert!(global.get(1, 3).get(Direction::East));
        assert_eq!(global.mass(), 2);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_lattice_bounds_check() {
        let lattice = Lattice::new(3, 3).unwrap();
        let _ = lattice.get(3, 0);
    }
}
