//! FHP Lattice-Gas Core Library
//!
//! A two-dimensional FHP-I lattice-gas cellular automaton on a hexagonal grid.
//! Every cell carries six occupation flags, one per hexagonal direction, and
//! each step runs:
//!
//! 1. **Collision**: particles inside a cell are redistributed by the FHP-I
//!    rules, conserving their number
//! 2. **Halo exchange**: partitions trade their boundary columns
//! 3. **Streaming**: every particle moves one cell along its direction
//! 4. **Boundaries**: slip walls, Dirichlet or periodic edges and an optional
//!    obstacle overwrite the cells they own
//!
//! The grid can be split by columns over several worker threads; a run gives
//! the same result for any worker count.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fhp_core::{run, SimulationConfig, SnapshotOptions};
//!
//! let config = SimulationConfig {
//!     workers: 4,
//!     ..SimulationConfig::channel_flow()
//! };
//! let summary = run(&config, 100, &SnapshotOptions::every("output", 10)).unwrap();
//! println!("occupied after 100 steps: {}", summary.lattice.mass());
//! ```

// Leaf data
pub mod core_types;
pub mod error;

// Storage and decomposition
pub mod grid;
pub mod partition;

// Update rules and orchestration
pub mod simulation;
pub mod solver;

pub use core_types::{Axis, Direction, Node, DIRECTIONS};
pub use error::{FhpError, Result, Side};
pub use grid::{Lattice, Obstacle, ObstaclePolicy};
pub use partition::{ChannelHalo, EdgeColumns, HaloExchange, Partition, Topology};
pub use simulation::{
    run, run_partitioned, run_serial, BoundaryConfig, ColumnBoundary, ObstacleConfig, RunSummary,
    SimulationConfig, SnapshotOptions, Worker,
};
pub use solver::{
    BoundaryCondition, BoundaryConditionSet, CollisionEngine, DirichletProfile, Halo,
};
