//! Snapshot files written during a run

use approx::assert_relative_eq;
use fhp_core::{
    run_partitioned, run_serial, ObstacleConfig, ObstaclePolicy, SimulationConfig,
    SnapshotOptions,
};
use std::fs;

fn small_channel() -> SimulationConfig {
    SimulationConfig {
        rows: 10,
        columns: 8,
        seed: 5,
        obstacle: Some(ObstacleConfig {
            center_row: 4,
            center_column: 3,
            radius: 1,
            policy: ObstaclePolicy::Absorbing,
        }),
        ..SimulationConfig::default()
    }
}

#[test]
fn test_serial_snapshots_on_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let options = SnapshotOptions::every(dir.path(), 5);
    let summary = run_serial(&small_channel(), 10, &options).unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "config_t0.txt",
            "config_t10.txt",
            "config_t5.txt",
            "macroscopic_t0.txt",
            "macroscopic_t10.txt",
            "macroscopic_t5.txt",
        ]
    );
    assert_eq!(summary.snapshots.len(), 6);

    let text = fs::read_to_string(dir.path().join("config_t10.txt")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 80);
    assert_eq!(lines[4 * 8 + 3], "(4,3): Obstacle");

    // Column 0 carries the inlet profile after every step
    let inlet = lines[8];
    assert!(inlet.starts_with("(1,0): 1 "), "unexpected inlet line {inlet}");
    let flags: Vec<&str> = inlet["(1,0): ".len()..].split(' ').collect();
    assert_eq!(flags.len(), 6);
    assert_eq!(flags[3], "0");
}

#[test]
fn test_macroscopic_file_matches_final_lattice() {
    let dir = tempfile::tempdir().unwrap();
    let options = SnapshotOptions::every(dir.path(), 3);
    let summary = run_serial(&small_channel(), 3, &options).unwrap();

    let text = fs::read_to_string(dir.path().join("macroscopic_t3.txt")).unwrap();
    let mut density = 0;
    let mut momentum_x = 0.0;
    for line in text.lines() {
        let (_, rest) = line.split_once(": Density=").unwrap();
        let (d, velocity) = rest.split_once(", Velocity=(").unwrap();
        let (vx, _) = velocity.trim_end_matches(')').split_once(',').unwrap();
        density += d.parse::<usize>().unwrap();
        momentum_x += vx.parse::<f64>().unwrap();
    }
    assert_eq!(density, summary.lattice.mass());
    assert_eq!(density, summary.mass[3]);

    let expected_x: f64 = summary
        .lattice
        .as_slice()
        .iter()
        .map(|node| fhp_core::solver::Moments::of(node).velocity.0)
        .sum();
    assert_relative_eq!(momentum_x, expected_x, epsilon = 1e-3);
}

#[test]
fn test_partitioned_snapshots_carry_rank_and_global_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimulationConfig {
        workers: 2,
        ..small_channel()
    };
    let options = SnapshotOptions {
        macroscopic: false,
        ..SnapshotOptions::every(dir.path(), 4)
    };
    run_partitioned(&config, 4, &options).unwrap();

    for step in [0, 4] {
        for rank in 0..2 {
            let path = dir.path().join(format!("config_t{step}_rank{rank}.txt"));
            let text = fs::read_to_string(&path).unwrap();
            assert_eq!(text.lines().count(), 10 * 4);
            let first = text.lines().next().unwrap();
            assert!(first.starts_with(&format!("(0,{}): ", rank * 4)), "{first}");
        }
    }
    assert!(!dir.path().join("macroscopic_t0_rank0.txt").exists());
}

#[test]
fn test_unwritable_directory_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    fs::write(&blocker, "occupied").unwrap();

    let options = SnapshotOptions::every(&blocker, 2);
    let summary = run_serial(&small_channel(), 6, &options).unwrap();
    assert_eq!(summary.mass.len(), 7);
    assert!(summary.snapshots.is_empty());
}
