//! Plain-text lattice snapshots
//!
//! Two files per snapshot step, both one line per cell in global coordinates:
//!
//! - `config_t<step>[_rank<r>].txt`: `(row,col): f0 f1 f2 f3 f4 f5`, or
//!   `(row,col): Obstacle` for cells inside the obstacle
//! - `macroscopic_t<step>[_rank<r>].txt`:
//!   `(row,col): Density=<d>, Velocity=(<vx>,<vy>)`
//!
//! The rank suffix is present only for partitioned runs.

use crate::error::Result;
use crate::grid::{Lattice, Obstacle};
use crate::solver::macroscopic;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Which steps get written, and where
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Output directory; `None` disables snapshots
    pub directory: Option<PathBuf>,
    /// Write every `interval` steps (step 0 included); 0 disables snapshots
    pub interval: u64,
    /// Also write the macroscopic file
    pub macroscopic: bool,
}

impl SnapshotOptions {
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Occupation and macroscopic files every `interval` steps into `directory`
    #[must_use]
    pub fn every(directory: impl Into<PathBuf>, interval: u64) -> Self {
        Self {
            directory: Some(directory.into()),
            interval,
            macroscopic: true,
        }
    }

    /// Whether `step` gets a snapshot
    #[must_use]
    pub fn is_due(&self, step: u64) -> bool {
        self.directory.is_some() && self.interval > 0 && step % self.interval == 0
    }
}

fn suffix(step: u64, rank: Option<usize>) -> String {
    match rank {
        Some(rank) => format!("t{step}_rank{rank}.txt"),
        None => format!("t{step}.txt"),
    }
}

#[must_use]
pub fn snapshot_file_name(step: u64, rank: Option<usize>) -> String {
    format!("config_{}", suffix(step, rank))
}

#[must_use]
pub fn macroscopic_file_name(step: u64, rank: Option<usize>) -> String {
    format!("macroscopic_{}", suffix(step, rank))
}

/// Occupation lines for every cell of the block
pub fn write_occupation<W: Write>(
    out: &mut W,
    lattice: &Lattice,
    obstacle: Option<&Obstacle>,
) -> std::io::Result<()> {
    for row in 0..lattice.rows() {
        for col in 0..lattice.columns() {
            let global = lattice.global_column(col);
            if obstacle.is_some_and(|o| o.contains(row, global)) {
                writeln!(out, "({row},{global}): Obstacle")?;
            } else {
                writeln!(out, "({row},{global}): {}", lattice.get(row, col).flag_string())?;
            }
        }
    }
    Ok(())
}

fn create(directory: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    fs::create_dir_all(directory)?;
    let path = directory.join(name);
    let file = File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

/// Write the occupation snapshot of a block
///
/// # Errors
///
/// Returns `FhpError::Io` if the directory or file cannot be written.
pub fn write_snapshot(
    directory: &Path,
    step: u64,
    rank: Option<usize>,
    lattice: &Lattice,
    obstacle: Option<&Obstacle>,
) -> Result<PathBuf> {
    let (path, mut out) = create(directory, &snapshot_file_name(step, rank))?;
    write_occupation(&mut out, lattice, obstacle)?;
    out.flush()?;
    Ok(path)
}

/// Write the macroscopic moments of a block
///
/// # Errors
///
/// Returns `FhpError::Io` if the directory or file cannot be written.
pub fn write_macroscopic(
    directory: &Path,
    step: u64,
    rank: Option<usize>,
    lattice: &Lattice,
) -> Result<PathBuf> {
    let (path, mut out) = create(directory, &macroscopic_file_name(step, rank))?;
    out.write_all(macroscopic::render(lattice).as_bytes())?;
    out.flush()?;
    Ok(path)
}
