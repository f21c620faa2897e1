//! Running the automaton
//!
//! - `config`: everything a run needs, validated once at startup
//! - `worker`: one partition's block and its per-step orchestration
//! - `runner`: serial and multi-threaded fixed-length drivers
//! - `snapshot`: plain-text occupation and macroscopic dumps

pub mod config;
pub mod runner;
pub mod snapshot;
pub mod worker;

pub use config::{BoundaryConfig, ColumnBoundary, ObstacleConfig, SimulationConfig};
pub use runner::{run, run_partitioned, run_serial, RunSummary};
pub use snapshot::SnapshotOptions;
pub use worker::Worker;
