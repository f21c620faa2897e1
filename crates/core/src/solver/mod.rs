//! Per-step update rules of the automaton
//!
//! One step is `collision → exchange → streaming → boundary`:
//!
//! - `collision` redistributes flags inside each cell (`CollisionEngine`)
//! - `streaming` moves every flag one cell along its direction, reading ghost
//!   columns from a [`Halo`] at partition seams
//! - `boundary` overwrites edge and obstacle cells (`BoundaryConditionSet`)
//!
//! `entropy` supplies the random bits, `macroscopic` derives density and
//! velocity, and `profiler` times the phases.

pub mod boundary;
pub mod collision;
pub mod entropy;
pub mod macroscopic;
pub mod profiler;
pub mod streaming;

// Re-exports
pub use boundary::{BoundaryCondition, BoundaryConditionSet, DirichletProfile};
pub use collision::{collide, CollisionEngine};
pub use entropy::{cell_rng, BitSource, ScriptedBits, Stream};
pub use macroscopic::Moments;
pub use profiler::{Phase, PhaseTimings, ProfilerScope};
pub use streaming::{stream, Halo};
