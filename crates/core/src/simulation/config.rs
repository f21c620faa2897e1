//! Run configuration
//!
//! Everything a run needs is fixed up front in `SimulationConfig` and checked
//! once by [`SimulationConfig::validate`] before any worker starts.

use crate::error::{FhpError, Result};
use crate::grid::{Obstacle, ObstaclePolicy};
use crate::partition::{self, Topology};
use crate::solver::{BoundaryCondition, BoundaryConditionSet, DirichletProfile};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the short edges (columns 0 and N−1) are closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnBoundary {
    Dirichlet(DirichletProfile),
    Periodic,
}

impl Default for ColumnBoundary {
    fn default() -> Self {
        ColumnBoundary::Dirichlet(DirichletProfile::default())
    }
}

/// Edge conditions of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Specular walls on rows 0 and M−1
    pub slip_walls: bool,
    pub columns: ColumnBoundary,
    /// Pin columns 0 and N−1 so they skip collision and hold their vector
    /// through streaming (Dirichlet only)
    pub pin_dirichlet_edges: bool,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            slip_walls: true,
            columns: ColumnBoundary::default(),
            pin_dirichlet_edges: false,
        }
    }
}

impl BoundaryConfig {
    /// Ordered boundary pipeline for these edges plus an optional obstacle
    ///
    /// Order: slip, then the column condition, then the obstacle.
    #[must_use]
    pub fn pipeline(&self, obstacle: Option<Obstacle>) -> BoundaryConditionSet {
        let mut set = BoundaryConditionSet::new();
        if self.slip_walls {
            set = set.with(BoundaryCondition::Slip);
        }
        set = match self.columns {
            ColumnBoundary::Dirichlet(profile) => set.with(BoundaryCondition::Dirichlet(profile)),
            ColumnBoundary::Periodic => set.with(BoundaryCondition::Periodic),
        };
        if let Some(obstacle) = obstacle {
            set = set.with(BoundaryCondition::Obstacle(obstacle));
        }
        set
    }

    /// Column topology the halo exchange has to provide
    #[must_use]
    pub fn topology(&self) -> Topology {
        match self.columns {
            ColumnBoundary::Periodic => Topology::Ring,
            ColumnBoundary::Dirichlet(_) => Topology::Open,
        }
    }

    /// Whether the global edge columns are pinned at allocation
    #[must_use]
    pub fn pins_edges(&self) -> bool {
        self.pin_dirichlet_edges && matches!(self.columns, ColumnBoundary::Dirichlet(_))
    }
}

/// Circular obstacle placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub center_row: usize,
    pub center_column: usize,
    pub radius: usize,
    pub policy: ObstaclePolicy,
}

impl From<ObstacleConfig> for Obstacle {
    fn from(config: ObstacleConfig) -> Self {
        Obstacle::new(
            config.center_row,
            config.center_column,
            config.radius,
            config.policy,
        )
    }
}

/// Complete description of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid rows (M)
    pub rows: usize,
    /// Grid columns (N)
    pub columns: usize,
    /// Physical size of one cell; only reported
    pub lattice_spacing: f64,
    /// Column partitions, one worker thread each
    pub workers: usize,
    /// Seed for the initial state and every collision bit
    pub seed: u64,
    /// Probability each flag starts occupied
    pub fill_probability: f64,
    pub boundary: BoundaryConfig,
    pub obstacle: Option<ObstacleConfig>,
    /// Bound on a single halo receive, in milliseconds
    pub exchange_timeout_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            columns: 64,
            lattice_spacing: 1.0,
            workers: 1,
            seed: 0,
            fill_probability: 0.5,
            boundary: BoundaryConfig::default(),
            obstacle: None,
            exchange_timeout_ms: 10_000,
        }
    }
}

impl SimulationConfig {
    /// The 30×10 channel at spacing 0.1: slip walls, Dirichlet inflow and
    /// outflow, and a small absorbing obstacle near the inlet
    #[must_use]
    pub fn channel_flow() -> Self {
        Self {
            rows: 300,
            columns: 100,
            lattice_spacing: 0.1,
            obstacle: Some(ObstacleConfig {
                center_row: 8,
                center_column: 4,
                radius: 1,
                policy: ObstaclePolicy::Absorbing,
            }),
            ..Self::default()
        }
    }

    /// A torus with no walls and no obstacle
    #[must_use]
    pub fn periodic_box(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            boundary: BoundaryConfig {
                slip_walls: false,
                columns: ColumnBoundary::Periodic,
                pin_dirichlet_edges: false,
            },
            ..Self::default()
        }
    }

    /// Check every value once, before any allocation
    ///
    /// # Errors
    ///
    /// Returns `FhpError::IndivisibleColumns` when the columns do not split
    /// evenly over the workers and `FhpError::InvalidConfig` for anything else.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(FhpError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.rows, self.columns
            )));
        }
        partition::validate(self.columns, self.workers)?;
        if !(0.0..=1.0).contains(&self.fill_probability) {
            return Err(FhpError::InvalidConfig(format!(
                "fill probability {} is outside [0, 1]",
                self.fill_probability
            )));
        }
        if !(self.lattice_spacing > 0.0 && self.lattice_spacing.is_finite()) {
            return Err(FhpError::InvalidConfig(format!(
                "lattice spacing {} must be positive",
                self.lattice_spacing
            )));
        }
        if self.exchange_timeout_ms == 0 {
            return Err(FhpError::InvalidConfig(
                "exchange timeout must be non-zero".to_string(),
            ));
        }
        if let Some(obstacle) = self.obstacle() {
            if !obstacle.fits_within(self.rows, self.columns) {
                return Err(FhpError::InvalidConfig(format!(
                    "obstacle at ({}, {}) with radius {} touches the edge of a {}x{} grid",
                    obstacle.center_row,
                    obstacle.center_column,
                    obstacle.radius,
                    self.rows,
                    self.columns
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn obstacle(&self) -> Option<Obstacle> {
        self.obstacle.map(Obstacle::from)
    }

    #[must_use]
    pub fn pipeline(&self) -> BoundaryConditionSet {
        self.boundary.pipeline(self.obstacle())
    }

    #[must_use]
    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_millis(self.exchange_timeout_ms)
    }
}
