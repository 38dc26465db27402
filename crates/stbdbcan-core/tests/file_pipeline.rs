//! File-level tests: CSV inputs on disk through to the three result files.

use std::fs;
use std::path::{Path, PathBuf};

use stbdbcan_core::{
    config::RunConfig,
    error::InputError,
    io::{load_dataset, load_distances, write_results, ResultPaths, CLUSTER_COLUMN},
    Pipeline, StError,
};
use tempfile::TempDir;

/// Ten readings from two co-located sensors; the last one is a flow spike.
fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let dataset = dir.join("traffic.csv");
    let mut rows = String::from("id,timestamp,flow,speed,lane\n");
    for i in 0..10 {
        let sensor = if i % 2 == 0 { "A1" } else { "A2" };
        let flow = if i == 9 { 900.0 } else { 9.0 };
        rows.push_str(&format!(
            "{},2024-02-01 06:00:00,{},60,{}\n",
            sensor,
            flow,
            i % 3
        ));
    }
    fs::write(&dataset, rows).unwrap();

    let distances = dir.join("distances.csv");
    fs::write(&distances, "id1,id2,dist\nA1,A2,0\n").unwrap();
    (dataset, distances)
}

fn config() -> RunConfig {
    let mut config = RunConfig::default();
    config.input.behavioral = vec!["flow".into(), "speed".into()];
    config.stbof.min_pts = 3;
    config.stbof.k = 3;
    config.stbdbcan.min_pts = 3;
    config.stbdbcan.min_pts_cluster = 3;
    config.output.emit_scores = true;
    config
}

#[test]
fn files_in_results_out() {
    let dir = TempDir::new().unwrap();
    let (dataset_path, distances_path) = write_inputs(dir.path());
    let cfg = config();

    let table = load_distances(&distances_path).unwrap();
    let loaded = load_dataset(&dataset_path, &cfg.input).unwrap();
    let outcome = Pipeline::new(cfg.clone())
        .unwrap()
        .run(&loaded.dataset, &table)
        .unwrap();

    let paths = ResultPaths::for_dataset(&dataset_path, None);
    write_results(&paths, &loaded.raw, &outcome, cfg.output.emit_scores).unwrap();

    assert_eq!(paths.csv, dir.path().join("traffic_results.csv"));
    let csv = fs::read_to_string(&paths.csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    println!("STATE AFTER: results csv\n{}", csv);

    assert_eq!(lines[0], format!("id,timestamp,flow,speed,lane,{},stbof", CLUSTER_COLUMN));
    assert_eq!(lines.len(), 11);
    // Raw, unscaled values are written back
    assert!(lines[1].starts_with("A1,2024-02-01 06:00:00,9,60,0,0,"));
    assert!(lines[10].starts_with("A2,2024-02-01 06:00:00,900,60,0,-1,"));

    let report = fs::read_to_string(&paths.report).unwrap();
    assert!(report.contains("Number of clusters = 1"));
    assert!(report.contains("Noise: 1"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(json["clustering"]["n_clusters"], 1);
    assert_eq!(json["validation"]["noise_count"], 1);
    assert_eq!(json["validation"]["accepted"], true);
    assert_eq!(json["points"], 10);

    println!("[PASS] files_in_results_out");
}

#[test]
fn output_directory_override() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (dataset_path, _) = write_inputs(dir.path());

    let paths = ResultPaths::for_dataset(&dataset_path, Some(out.path()));
    assert_eq!(paths.json, out.path().join("traffic_results.json"));
}

#[test]
fn absent_temporal_entity_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (dataset_path, distances_path) = write_inputs(dir.path());
    let mut cfg = config();
    cfg.input.temporal_entity = Some("B7".into());

    let table = load_distances(&distances_path).unwrap();
    let loaded = load_dataset(&dataset_path, &cfg.input).unwrap();
    let err = Pipeline::new(cfg)
        .unwrap()
        .run(&loaded.dataset, &table)
        .unwrap_err();

    assert!(matches!(err, StError::Input(InputError::UnknownEntity { .. })));
    let paths = ResultPaths::for_dataset(&dataset_path, None);
    assert!(!paths.csv.exists());
    assert!(!paths.report.exists());
    assert!(!paths.json.exists());
    println!("[PASS] absent_temporal_entity_writes_nothing - {}", err);
}

#[test]
fn temporal_run_writes_only_that_entity() {
    let dir = TempDir::new().unwrap();
    let (dataset_path, distances_path) = write_inputs(dir.path());
    let mut cfg = config();
    cfg.input.temporal_entity = Some("A1".into());
    cfg.stbof.min_pts = 2;
    cfg.stbof.k = 2;
    cfg.stbdbcan.min_pts = 2;
    cfg.stbdbcan.min_pts_cluster = 2;
    cfg.output.emit_scores = false;

    let table = load_distances(&distances_path).unwrap();
    let loaded = load_dataset(&dataset_path, &cfg.input).unwrap();
    let outcome = Pipeline::new(cfg).unwrap().run(&loaded.dataset, &table).unwrap();
    let paths = ResultPaths::for_dataset(&dataset_path, None);
    write_results(&paths, &loaded.raw, &outcome, false).unwrap();

    let csv = fs::read_to_string(&paths.csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,timestamp,flow,speed,lane,clusterID");
    assert_eq!(lines.len(), 6);
    assert!(lines[1..].iter().all(|l| l.starts_with("A1,")));
}

#[test]
fn malformed_distance_file_is_input_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("d.csv");
    fs::write(&path, "id1,id2,dist\nA2,A1,3\n").unwrap();

    let err: StError = load_distances(&path).unwrap_err().into();
    assert!(err.is_input_error());
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("id1 < id2"));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_distances(Path::new("/nonexistent/distances.csv")).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }));
}
