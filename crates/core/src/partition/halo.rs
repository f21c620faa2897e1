//! Halo exchange between column partitions
//!
//! This module defines the `HaloExchange` capability the worker uses to trade
//! boundary columns with its neighbours, and `ChannelHalo`, an in-process
//! transport built on crossbeam channels where every worker runs on its own
//! thread.
//!
//! # Deadlock freedom
//!
//! Each worker has one inbox per side and each inbox has exactly one producer
//! (the neighbour on that side). An exchange sends every outgoing column first
//! (channels are unbounded, so sending never blocks) and only then receives.
//! Two adjacent workers therefore can never wait on each other in a cycle.

use super::Partition;
use crate::core_types::Node;
use crate::error::{FhpError, Result, Side};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// One full column of node state, one entry per row
pub type Column = Vec<Node>;

/// A column per side; `None` means "nothing on this side"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeColumns {
    pub left: Option<Column>,
    pub right: Option<Column>,
}

impl EdgeColumns {
    #[must_use]
    pub fn new(left: Option<Column>, right: Option<Column>) -> Self {
        Self { left, right }
    }

    /// Only `column` on `side`
    #[must_use]
    pub fn one(side: Side, column: Column) -> Self {
        match side {
            Side::Left => Self::new(Some(column), None),
            Side::Right => Self::new(None, Some(column)),
        }
    }

    #[must_use]
    pub fn take(&mut self, side: Side) -> Option<Column> {
        match side {
            Side::Left => self.left.take(),
            Side::Right => self.right.take(),
        }
    }
}

/// How the column axis closes at the global left and right edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Worker 0 and worker k−1 are neighbours (a lone worker neighbours itself)
    Ring,
    /// Edge workers have no neighbour beyond the global edge
    Open,
}

/// Transport-agnostic boundary column exchange
///
/// Implementations deliver each outgoing column to the neighbour on that side
/// and return the column that neighbour sent towards this worker in the same
/// round. Both directions are handled by one call so an implementation can
/// order them safely.
pub trait HaloExchange: Send {
    /// This worker's rank
    fn rank(&self) -> usize;

    /// Whether there is a neighbour on `side`
    fn has_neighbour(&self, side: Side) -> bool;

    /// Exchange columns with the neighbours on every side present in `outgoing`
    ///
    /// Sides without a neighbour are skipped and come back as `None`. Returns
    /// once every requested column has arrived, establishing that the
    /// neighbours' columns are complete before the caller reads them.
    ///
    /// # Errors
    ///
    /// Returns `FhpError::HaloTimeout` if a neighbour stalls past the bound,
    /// `FhpError::HaloDisconnected` if it has gone away, and
    /// `FhpError::HaloShape` if the received column has the wrong length.
    fn exchange(&mut self, outgoing: EdgeColumns) -> Result<EdgeColumns>;

    /// Exchange one column with the neighbour on `side`
    ///
    /// Returns `Ok(None)` if there is no neighbour on that side.
    ///
    /// # Errors
    ///
    /// Same as [`HaloExchange::exchange`].
    fn exchange_with(&mut self, side: Side, column: Column) -> Result<Option<Column>> {
        let mut incoming = self.exchange(EdgeColumns::one(side, column))?;
        Ok(incoming.take(side))
    }
}

/// Halo exchange over in-process crossbeam channels
pub struct ChannelHalo {
    rank: usize,
    /// Feeds the left neighbour's `from_right` inbox
    to_left: Option<Sender<Column>>,
    /// Feeds the right neighbour's `from_left` inbox
    to_right: Option<Sender<Column>>,
    from_left: Receiver<Column>,
    from_right: Receiver<Column>,
    timeout: Duration,
}

impl ChannelHalo {
    /// Wire up one endpoint per partition
    ///
    /// The returned endpoints are in rank order and are meant to be moved onto
    /// their workers' threads.
    #[must_use]
    pub fn mesh(partitions: &[Partition], topology: Topology, timeout: Duration) -> Vec<Self> {
        let workers = partitions.len();
        let (left_tx, left_rx): (Vec<_>, Vec<_>) =
            (0..workers).map(|_| unbounded::<Column>()).unzip();
        let (right_tx, right_rx): (Vec<_>, Vec<_>) =
            (0..workers).map(|_| unbounded::<Column>()).unzip();

        partitions
            .iter()
            .zip(left_rx.into_iter().zip(right_rx))
            .map(|(partition, (from_left, from_right))| {
                let has_left = topology == Topology::Ring || !partition.is_left_edge();
                let has_right = topology == Topology::Ring || !partition.is_right_edge();
                Self {
                    rank: partition.rank,
                    to_left: has_left.then(|| right_tx[partition.left_rank()].clone()),
                    to_right: has_right.then(|| left_tx[partition.right_rank()].clone()),
                    from_left,
                    from_right,
                    timeout,
                }
            })
            .collect()
    }

    /// Endpoint for a single worker covering the whole grid
    ///
    /// On a ring it is its own neighbour on both sides.
    #[must_use]
    pub fn solo(topology: Topology, timeout: Duration) -> Self {
        let (left_tx, from_left) = unbounded::<Column>();
        let (right_tx, from_right) = unbounded::<Column>();
        let ring = topology == Topology::Ring;
        Self {
            rank: 0,
            to_left: ring.then_some(right_tx),
            to_right: ring.then_some(left_tx),
            from_left,
            from_right,
            timeout,
        }
    }

    fn sender(&self, side: Side) -> Option<&Sender<Column>> {
        match side {
            Side::Left => self.to_left.as_ref(),
            Side::Right => self.to_right.as_ref(),
        }
    }

    fn receive(&self, side: Side, expected: usize) -> Result<Column> {
        let inbox = match side {
            Side::Left => &self.from_left,
            Side::Right => &self.from_right,
        };
        let column = inbox.recv_timeout(self.timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => FhpError::HaloTimeout {
                rank: self.rank,
                side,
                waited_ms: self.timeout.as_millis() as u64,
            },
            RecvTimeoutError::Disconnected => FhpError::HaloDisconnected {
                rank: self.rank,
                side,
            },
        })?;
        if column.len() != expected {
            return Err(FhpError::HaloShape {
                rank: self.rank,
                side,
                got: column.len(),
                expected,
            });
        }
        Ok(column)
    }
}

impl HaloExchange for ChannelHalo {
    fn rank(&self) -> usize {
        self.rank
    }

    fn has_neighbour(&self, side: Side) -> bool {
        self.sender(side).is_some()
    }

    fn exchange(&mut self, mut outgoing: EdgeColumns) -> Result<EdgeColumns> {
        let mut pending = Vec::with_capacity(2);

        // Send both sides before waiting on either
        for side in [Side::Left, Side::Right] {
            let Some(column) = outgoing.take(side) else {
                continue;
            };
            let Some(tx) = self.sender(side) else {
                continue;
            };
            let rows = column.len();
            tx.send(column).map_err(|_| FhpError::HaloDisconnected {
                rank: self.rank,
                side,
            })?;
            pending.push((side, rows));
        }

        let mut incoming = EdgeColumns::default();
        for (side, rows) in pending {
            let column = self.receive(side, rows)?;
            match side {
                Side::Left => incoming.left = Some(column),
                Side::Right => incoming.right = Some(column),
            }
        }
        Ok(incoming)
    }
}
