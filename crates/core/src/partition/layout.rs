//! Column-axis domain decomposition

use crate::error::{FhpError, Result};

/// The contiguous column range one worker owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    /// This worker's rank (0-based, left to right)
    pub rank: usize,
    /// Total number of workers
    pub workers: usize,
    /// First owned global column
    pub start_column: usize,
    /// One past the last owned global column
    pub end_column: usize,
    /// Global column count (N)
    pub global_columns: usize,
}

impl Partition {
    /// Layout for `rank` out of `workers` over `columns` global columns
    ///
    /// # Errors
    ///
    /// Returns `FhpError::IndivisibleColumns` if the columns do not split evenly
    /// and `FhpError::InvalidConfig` for zero workers or an out-of-range rank.
    pub fn new(rank: usize, workers: usize, columns: usize) -> Result<Self> {
        validate(columns, workers)?;
        if rank >= workers {
            return Err(FhpError::InvalidConfig(format!(
                "rank {rank} out of range for {workers} workers"
            )));
        }
        let width = columns / workers;
        Ok(Self {
            rank,
            workers,
            start_column: rank * width,
            end_column: (rank + 1) * width,
            global_columns: columns,
        })
    }

    /// A single partition covering the whole grid
    #[must_use]
    pub fn whole(columns: usize) -> Self {
        Self {
            rank: 0,
            workers: 1,
            start_column: 0,
            end_column: columns,
            global_columns: columns,
        }
    }

    /// Owned column count
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.end_column - self.start_column
    }

    /// Owns global column 0
    #[inline]
    #[must_use]
    pub fn is_left_edge(&self) -> bool {
        self.start_column == 0
    }

    /// Owns global column N−1
    #[inline]
    #[must_use]
    pub fn is_right_edge(&self) -> bool {
        self.end_column == self.global_columns
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, column: usize) -> bool {
        (self.start_column..self.end_column).contains(&column)
    }

    /// Rank of the left neighbour on a ring of `workers`
    #[must_use]
    pub fn left_rank(&self) -> usize {
        (self.rank + self.workers - 1) % self.workers
    }

    /// Rank of the right neighbour on a ring of `workers`
    #[must_use]
    pub fn right_rank(&self) -> usize {
        (self.rank + 1) % self.workers
    }
}

/// Check once, before any step, that `columns` split evenly over `workers`
///
/// # Errors
///
/// Returns a configuration error describing the mismatch.
pub fn validate(columns: usize, workers: usize) -> Result<()> {
    if workers == 0 {
        return Err(FhpError::InvalidConfig(
            "worker count must be at least 1".to_string(),
        ));
    }
    if columns == 0 || columns % workers != 0 {
        return Err(FhpError::IndivisibleColumns { columns, workers });
    }
    Ok(())
}

/// All partitions of `columns` over `workers`, in rank order
///
/// # Errors
///
/// Same as [`validate`].
pub fn split(columns: usize, workers: usize) -> Result<Vec<Partition>> {
    validate(columns, workers)?;
    (0..workers)
        .map(|rank| Partition::new(rank, workers, columns))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let parts = split(100, 4).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].start_column, 0);
        assert_eq!(parts[0].end_column, 25);
        assert_eq!(parts[3].start_column, 75);
        assert_eq!(parts[3].end_column, 100);
        assert!(parts[0].is_left_edge() && !parts[0].is_right_edge());
        assert!(parts[3].is_right_edge() && !parts[3].is_left_edge());
        assert!(parts.iter().all(|p| p.width() == 25));
    }

    #[test]
    fn test_indivisible_columns_rejected() {
        let err = split(10, 3).unwrap_err();
        assert!(matches!(
            err,
            FhpError::IndivisibleColumns {
                columns: 10,
                workers: 3
            }
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(validate(10, 0), Err(FhpError::InvalidConfig(_))));
    }

    #[test]
    fn test_ring_neighbours() {
        let p = Partition::new(0, 3, 9).unwrap();
        assert_eq!(p.left_rank(), 2);
        assert_eq!(p.right_rank(), 1);

        let solo = Partition::whole(9);
        assert_eq!(solo.left_rank(), 0);
        assert_eq!(solo.right_rank(), 0);
        assert!(solo.is_left_edge() && solo.is_right_edge());
        assert!(solo.contains(8) && !solo.contains(9));
    }
}
