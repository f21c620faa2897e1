//! One partition's share of the run
//!
//! A `Worker` owns its block of the lattice plus a scratch buffer of the same
//! shape, and advances both through
//! `collision → exchange → streaming → boundary` once per [`Worker::step`].
//! Streaming writes into the scratch buffer and the two are swapped
//! afterwards, so the block is never read while half-updated.

use super::config::SimulationConfig;
use crate::core_types::Direction;
use crate::error::Result;
use crate::grid::{Lattice, Obstacle};
use crate::partition::{EdgeColumns, HaloExchange, Partition};
use crate::solver::{
    cell_rng, stream, BoundaryConditionSet, CollisionEngine, Halo, Phase, PhaseTimings, Stream,
};
use rand::Rng;
use tracing::debug;

pub struct Worker {
    partition: Partition,
    lattice: Lattice,
    scratch: Lattice,
    collision: CollisionEngine,
    boundaries: BoundaryConditionSet,
    obstacle: Option<Obstacle>,
    halo: Box<dyn HaloExchange>,
    timings: PhaseTimings,
    /// Steps completed so far
    step: u64,
}

impl Worker {
    /// Allocate and seed the block owned by `partition`
    ///
    /// Cells on pinned edges and inside the obstacle start empty; every other
    /// flag is occupied with the configured fill probability, drawn from a
    /// generator keyed by the cell's global coordinates.
    ///
    /// # Errors
    ///
    /// Returns `FhpError::Allocation` if either buffer cannot be reserved.
    pub fn new(
        config: &SimulationConfig,
        partition: Partition,
        halo: Box<dyn HaloExchange>,
    ) -> Result<Self> {
        let mut lattice = Lattice::for_partition(config.rows, &partition)?;
        let scratch = Lattice::for_partition(config.rows, &partition)?;
        let obstacle = config.obstacle();

        if config.boundary.pins_edges() {
            for global in [0, config.columns - 1] {
                if let Some(col) = lattice.local_column(global) {
                    for row in 0..config.rows {
                        lattice.get_mut(row, col).pinned = true;
                    }
                }
            }
        }

        for row in 0..lattice.rows() {
            for col in 0..lattice.columns() {
                let global = lattice.global_column(col);
                if obstacle.is_some_and(|o| o.contains(row, global)) {
                    continue;
                }
                let node = lattice.get_mut(row, col);
                if node.pinned {
                    continue;
                }
                let mut rng = cell_rng(config.seed, Stream::Initial, 0, row, global);
                for d in Direction::ALL {
                    node.set(d, rng.random_bool(config.fill_probability));
                }
            }
        }

        debug!(
            "Worker {}: columns {}..{}, initial occupied={}",
            partition.rank,
            partition.start_column,
            partition.end_column,
            lattice.mass()
        );

        Ok(Self {
            partition,
            lattice,
            scratch,
            collision: CollisionEngine::new(config.seed),
            boundaries: config.pipeline(),
            obstacle,
            halo,
            timings: PhaseTimings::new(),
            step: 0,
        })
    }

    /// Advance the block by one step
    ///
    /// # Errors
    ///
    /// Returns a halo error if a neighbour fails to deliver its column. The
    /// block is left in an unspecified state and the run should stop.
    pub fn step(&mut self) -> Result<()> {
        let step = self.step;
        let obstacle = self.obstacle;

        let changed = self.timings.time(Phase::Collision, || {
            self.collision
                .apply(&mut self.lattice, step, obstacle.as_ref())
        });

        let last = self.lattice.columns() - 1;
        let outgoing = EdgeColumns::new(
            Some(self.lattice.column(0)),
            Some(self.lattice.column(last)),
        );
        let incoming = self
            .timings
            .time(Phase::Exchange, || self.halo.exchange(outgoing))?;
        let halo = Halo::from_exchange(self.lattice.rows(), incoming);

        self.timings.time(Phase::Streaming, || {
            stream(&self.lattice, &mut self.scratch, &halo);
        });
        std::mem::swap(&mut self.lattice, &mut self.scratch);

        self.timings.time(Phase::Boundary, || {
            self.boundaries.apply(&mut self.lattice, self.halo.as_mut())
        })?;

        self.step += 1;
        debug!(
            "Worker {}: step {} done, collisions={}, occupied={}",
            self.partition.rank,
            self.step,
            changed,
            self.lattice.mass()
        );
        Ok(())
    }

    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    #[must_use]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Direct access to the block, for seeding hand-built states
    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    #[must_use]
    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }

    #[must_use]
    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.obstacle.as_ref()
    }

    /// Steps completed so far
    #[must_use]
    pub fn steps_done(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn mass(&self) -> usize {
        self.lattice.mass()
    }

    #[must_use]
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }
}
