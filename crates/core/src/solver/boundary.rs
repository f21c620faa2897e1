//! Boundary and obstacle corrections
//!
//! A `BoundaryConditionSet` is an ordered pipeline run once per step after
//! streaming. Each member overwrites whatever streaming deposited in the cells
//! it owns:
//!
//! - `Slip` on the long edges (rows 0 and M−1)
//! - `Dirichlet` or `Periodic` on the short edges (columns 0 and N−1)
//! - `Obstacle` inside a circular region
//!
//! Members only touch cells of the local block, so every worker runs the same
//! pipeline over its own columns. The periodic member is the one that needs the
//! opposite edge, which it fetches through the halo exchange when the two
//! edges live on different workers.

use crate::core_types::{Direction, Node};
use crate::error::Result;
use crate::grid::{Lattice, Obstacle, ObstaclePolicy};
use crate::partition::{EdgeColumns, HaloExchange, Topology};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Directions forced at the two short edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirichletProfile {
    /// Set at column 0; its opposite is cleared
    pub left: Direction,
    /// Set at column N−1; its opposite is cleared
    pub right: Direction,
}

impl Default for DirichletProfile {
    fn default() -> Self {
        Self {
            left: Direction::East,
            right: Direction::West,
        }
    }
}

/// One member of the boundary pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Specular reflection on rows 0 and M−1: the axis-C flags swap
    Slip,
    /// Fixed occupation on columns 0 and N−1
    Dirichlet(DirichletProfile),
    /// Columns 0 and N−1 trade their occupation vectors
    Periodic,
    /// Terminal state inside a circular region
    Obstacle(Obstacle),
}

impl BoundaryCondition {
    /// Apply this member to the local block
    ///
    /// # Errors
    ///
    /// Only `Periodic` can fail, when the halo exchange with the opposite edge
    /// fails.
    pub fn apply(&self, lattice: &mut Lattice, halo: &mut dyn HaloExchange) -> Result<()> {
        match *self {
            Self::Slip => {
                apply_slip(lattice);
                Ok(())
            }
            Self::Dirichlet(profile) => {
                apply_dirichlet(lattice, profile);
                Ok(())
            }
            Self::Periodic => apply_periodic(lattice, halo),
            Self::Obstacle(obstacle) => {
                apply_obstacle(lattice, &obstacle);
                Ok(())
            }
        }
    }
}

/// Swap the axis-C pair in every cell of the first and last row
pub fn apply_slip(lattice: &mut Lattice) {
    let last = lattice.rows() - 1;
    for row in [0, last] {
        for col in 0..lattice.columns() {
            let node = lattice.get_mut(row, col);
            let up = node.get(Direction::NorthWest);
            let down = node.get(Direction::SouthEast);
            node.set(Direction::NorthWest, down);
            node.set(Direction::SouthEast, up);
        }
        if last == 0 {
            break;
        }
    }
}

/// Force the Dirichlet profile on whichever short edges this block owns
pub fn apply_dirichlet(lattice: &mut Lattice, profile: DirichletProfile) {
    let edges = [
        (0, profile.left),
        (lattice.global_columns() - 1, profile.right),
    ];
    for (global, direction) in edges {
        let Some(col) = lattice.local_column(global) else {
            continue;
        };
        for row in 0..lattice.rows() {
            let node = lattice.get_mut(row, col);
            node.set(direction, true);
            node.set(direction.opposite(), false);
        }
    }
}

/// Trade the flags of column 0 and column N−1
///
/// Pins stay with their cells; only the occupation vectors move.
///
/// # Errors
///
/// Returns the halo error if the opposite edge lives on another worker and the
/// exchange fails.
pub fn apply_periodic(lattice: &mut Lattice, halo: &mut dyn HaloExchange) -> Result<()> {
    let last = lattice.global_columns() - 1;
    let left_col = lattice.local_column(0);
    let right_col = lattice.local_column(last);

    let (incoming_left, incoming_right) = match (left_col, right_col) {
        (Some(l), Some(r)) => (Some(lattice.column(r)), Some(lattice.column(l))),
        (None, None) => return Ok(()),
        (l, r) => {
            let outgoing = EdgeColumns::new(
                l.map(|col| lattice.column(col)),
                r.map(|col| lattice.column(col)),
            );
            let incoming = halo.exchange(outgoing)?;
            (incoming.left, incoming.right)
        }
    };

    if let (Some(col), Some(column)) = (left_col, incoming_left) {
        copy_flags(lattice, col, &column);
    }
    if let (Some(col), Some(column)) = (right_col, incoming_right) {
        copy_flags(lattice, col, &column);
    }
    Ok(())
}

fn copy_flags(lattice: &mut Lattice, col: usize, column: &[Node]) {
    for (row, source) in column.iter().enumerate() {
        lattice.get_mut(row, col).flags = source.flags;
    }
}

/// Force the obstacle's terminal state on every local cell inside it
///
/// Returns the number of cells touched.
pub fn apply_obstacle(lattice: &mut Lattice, obstacle: &Obstacle) -> usize {
    let mut touched = 0;
    for row in 0..lattice.rows() {
        for col in 0..lattice.columns() {
            if !obstacle.contains(row, lattice.global_column(col)) {
                continue;
            }
            let node = lattice.get_mut(row, col);
            node.flags = match obstacle.policy {
                ObstaclePolicy::BounceBack => node.reversed().flags,
                ObstaclePolicy::Absorbing => Node::VACUUM.flags,
            };
            touched += 1;
        }
    }
    touched
}

/// Ordered pipeline of boundary members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConditionSet {
    members: Vec<BoundaryCondition>,
}

impl BoundaryConditionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member; members run in insertion order
    #[must_use]
    pub fn with(mut self, member: BoundaryCondition) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn members(&self) -> &[BoundaryCondition] {
        &self.members
    }

    /// The obstacle, if the pipeline has one
    #[must_use]
    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.members.iter().find_map(|m| match m {
            BoundaryCondition::Obstacle(obstacle) => Some(obstacle),
            _ => None,
        })
    }

    /// Whether the short edges wrap around
    #[must_use]
    pub fn is_periodic(&self) -> bool {
        self.members.contains(&BoundaryCondition::Periodic)
    }

    /// Column topology the halo exchange must provide for this pipeline
    #[must_use]
    pub fn topology(&self) -> Topology {
        if self.is_periodic() {
            Topology::Ring
        } else {
            Topology::Open
        }
    }

    /// Run every member in order over the local block
    ///
    /// # Errors
    ///
    /// Propagates the first member failure.
    pub fn apply(&self, lattice: &mut Lattice, halo: &mut dyn HaloExchange) -> Result<()> {
        for member in &self.members {
            member.apply(lattice, halo)?;
            trace!(rank = halo.rank(), ?member, "boundary member applied");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{split, ChannelHalo, Partition};
    use std::thread;
    use std::time::Duration;
    use Direction::{East, NorthEast, NorthWest, SouthEast, SouthWest, West};

    fn solo_halo(topology: Topology) -> ChannelHalo {
        ChannelHalo::solo(topology, Duration::from_secs(1))
    }

    #[test]
    fn test_slip_reflects_axis_c_on_long_edges() {
        let mut lattice = Lattice::new(4, 3).unwrap();
        lattice.insert(0, 1, NorthWest);
        lattice.insert(3, 2, SouthEast);
        lattice.insert(1, 1, NorthWest); // interior row, untouched

        apply_slip(&mut lattice);

        assert!(lattice.get(0, 1).get(SouthEast) && !lattice.get(0, 1).get(NorthWest));
        assert!(lattice.get(3, 2).get(NorthWest) && !lattice.get(3, 2).get(SouthEast));
        assert!(lattice.get(1, 1).get(NorthWest));
        assert_eq!(lattice.mass(), 3);
    }

    #[test]
    fn test_dirichlet_forces_edges_and_is_idempotent() {
        let mut lattice = Lattice::new(3, 5).unwrap();
        lattice.insert(1, 0, West);
        lattice.insert(2, 4, East);
        lattice.insert(1, 2, West);

        apply_dirichlet(&mut lattice, DirichletProfile::default());
        let once = lattice.clone();
        apply_dirichlet(&mut lattice, DirichletProfile::default());
        assert_eq!(lattice, once);

        for row in 0..3 {
            assert!(lattice.get(row, 0).get(East) && !lattice.get(row, 0).get(West));
            assert!(lattice.get(row, 4).get(West) && !lattice.get(row, 4).get(East));
        }
        assert!(lattice.get(1, 2).get(West));
    }

    #[test]
    fn test_dirichlet_only_touches_owned_edges() {
        let middle = Partition::new(1, 3, 9).unwrap();
        let mut block = Lattice::for_partition(2, &middle).unwrap();
        apply_dirichlet(&mut block, DirichletProfile::default());
        assert_eq!(block.mass(), 0);
    }

    #[test]
    fn test_periodic_swaps_edge_columns_locally() {
        let mut lattice = Lattice::new(2, 4).unwrap();
        lattice.insert(0, 0, NorthEast);
        lattice.insert(1, 3, SouthWest);
        lattice.get_mut(1, 3).pinned = true;
        let mut halo = solo_halo(Topology::Ring);

        apply_periodic(&mut lattice, &mut halo).unwrap();

        assert_eq!(lattice.get(0, 3).flags, Node::with_directions(&[NorthEast]).flags);
        assert_eq!(lattice.get(1, 0).flags, Node::with_directions(&[SouthWest]).flags);
        assert_eq!(*lattice.get(0, 0), Node::VACUUM);
        assert!(lattice.get(1, 3).pinned, "pins stay in place");
        assert_eq!(lattice.mass(), 2);
    }

    #[test]
    fn test_periodic_swaps_across_workers() {
        let partitions = split(6, 3).unwrap();
        let halos = ChannelHalo::mesh(&partitions, Topology::Ring, Duration::from_secs(5));

        let blocks: Vec<Lattice> = thread::scope(|s| {
            let handles: Vec<_> = partitions
                .iter()
                .zip(halos)
                .map(|(partition, mut halo)| {
                    s.spawn(move || {
                        let mut block = Lattice::for_partition(1, partition).unwrap();
                        if partition.is_left_edge() {
                            block.insert(0, 0, East);
                        }
                        if partition.is_right_edge() {
                            block.insert(0, 1, West);
                        }
                        apply_periodic(&mut block, &mut halo).unwrap();
                        block
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(blocks[0].get(0, 0).flags, Node::with_directions(&[West]).flags);
        assert_eq!(blocks[2].get(0, 1).flags, Node::with_directions(&[East]).flags);
        assert_eq!(blocks[1].mass(), 0);
    }

    #[test]
    fn test_obstacle_policies() {
        let obstacle = Obstacle::new(2, 2, 1, ObstaclePolicy::BounceBack);
        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.insert(2, 3, East);
        lattice.insert(1, 2, SouthWest);
        lattice.insert(0, 0, East);

        let touched = apply_obstacle(&mut lattice, &obstacle);
        assert_eq!(touched, 5);
        assert_eq!(lattice.get(2, 3).flags, Node::with_directions(&[West]).flags);
        assert_eq!(lattice.get(1, 2).flags, Node::with_directions(&[NorthEast]).flags);
        assert!(lattice.get(0, 0).get(East));

        let absorbing = Obstacle {
            policy: ObstaclePolicy::Absorbing,
            ..obstacle
        };
        apply_obstacle(&mut lattice, &absorbing);
        assert_eq!(lattice.mass(), 1);
    }

    #[test]
    fn test_pipeline_runs_in_order() {
        let obstacle = Obstacle::new(2, 2, 0, ObstaclePolicy::Absorbing);
        let set = BoundaryConditionSet::new()
            .with(BoundaryCondition::Slip)
            .with(BoundaryCondition::Dirichlet(DirichletProfile::default()))
            .with(BoundaryCondition::Obstacle(obstacle));
        assert_eq!(set.obstacle(), Some(&obstacle));
        assert_eq!(set.topology(), Topology::Open);

        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.insert(2, 2, East);
        lattice.insert(0, 0, NorthWest);
        let mut halo = solo_halo(Topology::Open);
        set.apply(&mut lattice, &mut halo).unwrap();

        assert_eq!(*lattice.get(2, 2), Node::VACUUM);
        assert!(lattice.get(0, 0).get(SouthEast));
        assert!(lattice.get(0, 0).get(East));
    }

    #[test]
    fn test_periodic_pipeline_needs_ring() {
        let set = BoundaryConditionSet::new().with(BoundaryCondition::Periodic);
        assert!(set.is_periodic());
        assert_eq!(set.topology(), Topology::Ring);
    }
}
