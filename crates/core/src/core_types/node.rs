//! Per-cell occupation state

use super::direction::{Axis, Direction, DIRECTIONS};

/// One lattice cell: six occupation flags plus the Dirichlet pin
///
/// A node is created once when the lattice is allocated and lives for the whole
/// run. Only the flags (and, at allocation, the pin) ever change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Node {
    /// Occupation flag per direction, indexed by `Direction::index`
    pub flags: [bool; DIRECTIONS],
    /// Dirichlet-forced cell: skipped by collision, copied through by streaming
    pub pinned: bool,
}

impl Node {
    /// Empty, unpinned node
    pub const VACUUM: Node = Node {
        flags: [false; DIRECTIONS],
        pinned: false,
    };

    /// Node with the given flags and no pin
    #[must_use]
    pub const fn from_flags(flags: [bool; DIRECTIONS]) -> Self {
        Self {
            flags,
            pinned: false,
        }
    }

    /// Node with exactly the listed directions occupied
    #[must_use]
    pub fn with_directions(directions: &[Direction]) -> Self {
        let mut node = Self::VACUUM;
        for &d in directions {
            node.set(d, true);
        }
        node
    }

    #[inline]
    #[must_use]
    pub fn get(&self, direction: Direction) -> bool {
        self.flags[direction.index()]
    }

    #[inline]
    pub fn set(&mut self, direction: Direction, occupied: bool) {
        self.flags[direction.index()] = occupied;
    }

    /// Number of occupied directions (0..=6)
    #[inline]
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// True if both directions of `axis` are occupied
    #[inline]
    #[must_use]
    pub fn is_head_on(&self, axis: Axis) -> bool {
        let [a, b] = axis.directions();
        self.get(a) && self.get(b)
    }

    /// True if neither direction of `axis` is occupied
    #[inline]
    #[must_use]
    pub fn is_axis_empty(&self, axis: Axis) -> bool {
        let [a, b] = axis.directions();
        !self.get(a) && !self.get(b)
    }

    /// Set or clear both directions of `axis`
    #[inline]
    pub fn fill_axis(&mut self, axis: Axis, occupied: bool) {
        for d in axis.directions() {
            self.set(d, occupied);
        }
    }

    /// Every flag moved into its opposite slot (bounce-back)
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut out = *self;
        for d in Direction::ALL {
            out.set(d.opposite(), self.get(d));
        }
        out
    }

    /// Flags formatted as `f0 f1 f2 f3 f4 f5`
    #[must_use]
    pub fn flag_string(&self) -> String {
        self.flags
            .iter()
            .map(|&f| if f { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
