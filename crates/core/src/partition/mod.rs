//! Spatial domain decomposition across workers
//!
//! The column axis is split into equal contiguous ranges, one per worker.
//! Before each streaming phase neighbouring workers trade their outermost
//! columns through a [`HaloExchange`] so streaming can read across the seam.

pub mod halo;
pub mod layout;

pub use halo::{ChannelHalo, Column, EdgeColumns, HaloExchange, Topology};
pub use layout::{split, validate, Partition};
