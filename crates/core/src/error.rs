//! Error types for the lattice-gas core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, FhpError>;

/// Which neighbour of a worker a column travels to or from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Errors that can occur while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum FhpError {
    /// Column axis cannot be split evenly
    #[error("Grid columns ({columns}) must be divisible by the number of workers ({workers})")]
    IndivisibleColumns { columns: usize, workers: usize },

    /// Any other invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Grid storage could not be reserved
    #[error("Failed to allocate lattice storage for {cells} cells")]
    Allocation { cells: usize },

    /// A neighbour did not deliver its boundary column in time
    #[error("Worker {rank}: {side} halo exchange timed out after {waited_ms} ms")]
    HaloTimeout {
        rank: usize,
        side: Side,
        waited_ms: u64,
    },

    /// A neighbour's channel closed mid-run
    #[error("Worker {rank}: {side} neighbour disconnected")]
    HaloDisconnected { rank: usize, side: Side },

    /// Exchanged column has the wrong number of rows
    #[error("Worker {rank}: received {got} rows from {side} neighbour, expected {expected}")]
    HaloShape {
        rank: usize,
        side: Side,
        got: usize,
        expected: usize,
    },

    /// A worker thread panicked
    #[error("Worker {rank} panicked")]
    WorkerPanicked { rank: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FhpError {
    /// Whether the run must stop on this error
    ///
    /// Only snapshot I/O is recoverable; the driver reports it and moves on.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FhpError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FhpError::IndivisibleColumns {
            columns: 10,
            workers: 3,
        };
        assert_eq!(
            err.to_string(),
            "Grid columns (10) must be divisible by the number of workers (3)"
        );

        let err = FhpError::HaloTimeout {
            rank: 2,
            side: Side::Left,
            waited_ms: 500,
        };
        assert_eq!(
            err.to_string(),
            "Worker 2: left halo exchange timed out after 500 ms"
        );
    }

    #[test]
    fn test_only_io_is_recoverable() {
        let io = FhpError::from(std::io::Error::other("disk full"));
        assert!(!io.is_fatal());
        assert!(FhpError::Allocation { cells: 1 }.is_fatal());
        assert!(FhpError::WorkerPanicked { rank: 0 }.is_fatal());
    }
}
