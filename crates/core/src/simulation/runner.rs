//! Fixed-length run drivers
//!
//! `run_serial` steps a single block covering the whole grid on the calling
//! thread. `run_partitioned` splits the columns, gives every partition its own
//! OS thread and `Worker`, and wires the workers together with a
//! [`ChannelHalo`] mesh. Both validate the configuration before allocating
//! anything and both produce the same `RunSummary` for the same seed.

use super::config::SimulationConfig;
use super::snapshot::{self, SnapshotOptions};
use super::worker::Worker;
use crate::error::{FhpError, Result};
use crate::grid::Lattice;
use crate::partition::{self, ChannelHalo, Partition};
use crate::solver::{Phase, PhaseTimings};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// What a finished run hands back
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The whole grid after the last step
    pub lattice: Lattice,
    /// Total occupied count after each step, index 0 being the initial state
    pub mass: Vec<usize>,
    /// Phase times summed over every worker
    pub timings: PhaseTimings,
    /// Every snapshot file written
    pub snapshots: Vec<PathBuf>,
}

impl RunSummary {
    /// Whether the occupied count never changed
    #[must_use]
    pub fn mass_conserved(&self) -> bool {
        self.mass.windows(2).all(|w| w[0] == w[1])
    }
}

/// One worker's share of the summary
struct WorkerOutcome {
    lattice: Lattice,
    mass: Vec<usize>,
    timings: PhaseTimings,
    snapshots: Vec<PathBuf>,
}

/// Run with the configured worker count
///
/// # Errors
///
/// See [`run_serial`] and [`run_partitioned`].
pub fn run(
    config: &SimulationConfig,
    steps: u64,
    snapshots: &SnapshotOptions,
) -> Result<RunSummary> {
    if config.workers == 1 {
        run_serial(config, steps, snapshots)
    } else {
        run_partitioned(config, steps, snapshots)
    }
}

/// Run the whole grid on the calling thread
///
/// The configured worker count only has to be valid; it is not used.
///
/// # Errors
///
/// Returns a configuration error before allocation, or `FhpError::Allocation`.
pub fn run_serial(
    config: &SimulationConfig,
    steps: u64,
    snapshots: &SnapshotOptions,
) -> Result<RunSummary> {
    config.validate()?;
    log_start(config, steps, 1);
    let started = Instant::now();

    let halo = ChannelHalo::solo(config.boundary.topology(), config.exchange_timeout());
    let mut worker = Worker::new(config, Partition::whole(config.columns), Box::new(halo))?;
    let (mass, files) = drive(&mut worker, steps, snapshots, None)?;

    let summary = RunSummary {
        timings: *worker.timings(),
        lattice: worker.into_lattice(),
        mass,
        snapshots: files,
    };
    log_finish(&summary, started);
    Ok(summary)
}

/// Run one worker thread per column partition
///
/// # Errors
///
/// Returns a configuration error before any thread starts. Once running, the
/// first fatal worker error is returned; a worker that panicked is reported as
/// `FhpError::WorkerPanicked`.
pub fn run_partitioned(
    config: &SimulationConfig,
    steps: u64,
    snapshots: &SnapshotOptions,
) -> Result<RunSummary> {
    config.validate()?;
    let partitions = partition::split(config.columns, config.workers)?;
    log_start(config, steps, partitions.len());
    let started = Instant::now();

    let halos = ChannelHalo::mesh(
        &partitions,
        config.boundary.topology(),
        config.exchange_timeout(),
    );

    let results: Vec<Result<WorkerOutcome>> = thread::scope(|s| {
        let handles: Vec<_> = partitions
            .iter()
            .zip(halos)
            .map(|(&partition, halo)| {
                s.spawn(move || -> Result<WorkerOutcome> {
                    let mut worker = Worker::new(config, partition, Box::new(halo))?;
                    let (mass, files) = drive(&mut worker, steps, snapshots, Some(partition.rank))?;
                    Ok(WorkerOutcome {
                        timings: *worker.timings(),
                        lattice: worker.into_lattice(),
                        mass,
                        snapshots: files,
                    })
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(FhpError::WorkerPanicked { rank }))
            })
            .collect()
    });

    let outcomes = first_failure(results)?;

    let mut lattice = Lattice::new(config.rows, config.columns)?;
    let mut mass = vec![0; steps as usize + 1];
    let mut timings = PhaseTimings::new();
    let mut files = Vec::new();
    for outcome in outcomes {
        lattice.paste(&outcome.lattice);
        for (total, local) in mass.iter_mut().zip(&outcome.mass) {
            *total += local;
        }
        timings.merge(&outcome.timings);
        files.extend(outcome.snapshots);
    }

    let summary = RunSummary {
        lattice,
        mass,
        timings,
        snapshots: files,
    };
    log_finish(&summary, started);
    Ok(summary)
}

/// Collect every outcome, or the error that most likely caused the others
///
/// A worker that fails drops its channels, so its neighbours then report
/// `HaloDisconnected`; those are only returned when nothing else failed.
fn first_failure(results: Vec<Result<WorkerOutcome>>) -> Result<Vec<WorkerOutcome>> {
    let mut outcomes = Vec::with_capacity(results.len());
    let mut cause: Option<FhpError> = None;
    for result in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                let secondary = matches!(err, FhpError::HaloDisconnected { .. });
                match &cause {
                    None => cause = Some(err),
                    Some(FhpError::HaloDisconnected { .. }) if !secondary => cause = Some(err),
                    Some(_) => {}
                }
            }
        }
    }
    match cause {
        Some(err) => Err(err),
        None => Ok(outcomes),
    }
}

/// Step `worker` to the end, returning the mass history and snapshot files
fn drive(
    worker: &mut Worker,
    steps: u64,
    options: &SnapshotOptions,
    rank: Option<usize>,
) -> Result<(Vec<usize>, Vec<PathBuf>)> {
    let mut mass = Vec::with_capacity(steps as usize + 1);
    let mut files = Vec::new();

    mass.push(worker.mass());
    take_snapshot(worker, 0, options, rank, &mut files);
    for step in 1..=steps {
        worker.step()?;
        mass.push(worker.mass());
        take_snapshot(worker, step, options, rank, &mut files);
    }

    Ok((mass, files))
}

/// Write the snapshot for `step` if one is due; failures are logged, not fatal
fn take_snapshot(
    worker: &Worker,
    step: u64,
    options: &SnapshotOptions,
    rank: Option<usize>,
    files: &mut Vec<PathBuf>,
) {
    if !options.is_due(step) {
        return;
    }
    let Some(directory) = options.directory.as_deref() else {
        return;
    };

    match snapshot::write_snapshot(directory, step, rank, worker.lattice(), worker.obstacle()) {
        Ok(path) => files.push(path),
        Err(e) => warn!("Failed to write snapshot for step {}: {}", step, e),
    }
    if options.macroscopic {
        match snapshot::write_macroscopic(directory, step, rank, worker.lattice()) {
            Ok(path) => files.push(path),
            Err(e) => warn!("Failed to write macroscopic output for step {}: {}", step, e),
        }
    }
}

fn log_start(config: &SimulationConfig, steps: u64, workers: usize) {
    info!(
        "Starting FHP run: {}x{} grid (spacing {}), {} steps, {} worker(s), seed {}",
        config.rows, config.columns, config.lattice_spacing, steps, workers, config.seed
    );
    info!(
        "Boundaries: {:?}, obstacle: {:?}",
        config.pipeline().members(),
        config.obstacle
    );
}

fn log_finish(summary: &RunSummary, started: Instant) {
    let timings = Phase::ALL
        .iter()
        .map(|&phase| {
            format!(
                "{}={:.1}ms",
                phase.name(),
                summary.timings.total(phase).as_secs_f64() * 1000.0
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    info!(
        "Run finished in {:.2}s: occupied {} -> {}, {} snapshot file(s), {}",
        started.elapsed().as_secs_f64(),
        summary.mass.first().copied().unwrap_or(0),
        summary.mass.last().copied().unwrap_or(0),
        summary.snapshots.len(),
        timings
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_preferred_over_disconnects() {
        let results = vec![
            Err(FhpError::HaloDisconnected {
                rank: 0,
                side: crate::error::Side::Right,
            }),
            Err(FhpError::HaloTimeout {
                rank: 1,
                side: crate::error::Side::Left,
                waited_ms: 5,
            }),
        ];
        let err = first_failure(results).err().unwrap();
        assert!(matches!(err, FhpError::HaloTimeout { rank: 1, .. }));
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let config = SimulationConfig {
            columns: 10,
            workers: 4,
            ..SimulationConfig::default()
        };
        let err = run(&config, 5, &SnapshotOptions::disabled()).unwrap_err();
        assert!(matches!(err, FhpError::IndivisibleColumns { .. }));
    }

    #[test]
    fn test_serial_summary_records_every_step() {
        let config = SimulationConfig::periodic_box(6, 6);
        let summary = run_serial(&config, 4, &SnapshotOptions::disabled()).unwrap();
        assert_eq!(summary.mass.len(), 5);
        assert!(summary.mass_conserved());
        assert_eq!(summary.lattice.mass(), summary.mass[4]);
        assert!(summary.snapshots.is_empty());
    }
}
