//! Tests for configuration module.

use std::collections::HashMap;
use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::*;
use crate::types::{EntityId, RunMode};

fn valid() -> RunConfig {
    let mut config = RunConfig::default();
    config.input.behavioral = vec!["flow".into(), "speed".into()];
    config
}

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// =========================================================================
// DEFAULTS
// =========================================================================

#[test]
fn test_run_config_defaults() {
    let config = RunConfig::default();
    assert_eq!(config.stbof.min_pts, 10);
    assert_eq!(config.stbof.k, 5);
    assert_eq!(config.stbdbcan.pct, 0.5);
    assert_eq!(config.stbdbcan.min_noise_percentage, 1.0);
    assert_eq!(config.weights.spatial, 1.0);
    assert_eq!(config.weights.temporal, 1.0);
    assert_eq!(config.input.id_column, "id");
    assert_eq!(config.input.timestamp_column, "timestamp");
    assert!(config.input.normalize);
    assert!(!config.output.emit_scores);
    assert_eq!(config.input.mode(), RunMode::SpatioTemporal);
}

// =========================================================================
// TOML
// =========================================================================

#[test]
fn test_partial_toml_fills_defaults() {
    let config = RunConfig::from_toml_str(
        r#"
        [stbdbcan]
        pct = 0.2

        [input]
        behavioral = ["flow"]
        temporal_entity = "17"
        "#,
    )
    .unwrap();

    assert_eq!(config.stbdbcan.pct, 0.2);
    assert_eq!(config.stbdbcan.min_pts, 10);
    assert_eq!(config.stbof.k, 5);
    assert_eq!(
        config.input.mode(),
        RunMode::Temporal {
            entity: EntityId::from(17)
        }
    );
    assert!(config.validate().is_ok());
    println!("[PASS] test_partial_toml_fills_defaults");
}

#[test]
fn test_toml_roundtrip_preserves_values() {
    let mut config = valid();
    config.weights.behavioral = Some(vec![1.0, 3.0]);
    config.stbof.min_pts = 20;
    config.output.emit_scores = true;

    let text = config.to_toml_string().unwrap();
    let parsed = RunConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[stbof]\nmin_pts = 15\nk = 4\n\n[input]\nbehavioral = [\"a\"]").unwrap();

    let config = RunConfig::from_file(file.path()).unwrap();
    assert_eq!(config.stbof.min_pts, 15);
    assert_eq!(config.stbof.k, 4);
}

#[test]
fn test_from_file_missing() {
    let err = RunConfig::from_file("/nonexistent/stbdbcan.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    println!("[PASS] test_from_file_missing - error: {}", err);
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = RunConfig::from_toml_str("[stbof\nmin_pts = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = RunConfig::from_toml_str("[stbof]\nmin_pts = \"ten\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

// =========================================================================
// VALIDATION
// =========================================================================

#[test]
fn test_validate_names_section() {
    let mut config = valid();
    config.stbof.k = 50;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { section: "stbof", .. }));
    assert!(err.to_string().starts_with("[stbof]"));

    let mut config = valid();
    config.stbdbcan.pct = 1.5;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            section: "stbdbcan",
            ..
        })
    ));

    let config = RunConfig::default();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { section: "input", .. })
    ));
}

#[test]
fn test_validate_weights() {
    let mut config = valid();
    config.weights.behavioral = Some(vec![1.0]);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { section: "weights", .. }));

    let mut config = valid();
    config.weights.temporal = -0.5;
    assert!(config.validate().is_err());

    let mut config = valid();
    config.weights.behavioral = Some(vec![1.0, f64::NAN]);
    let msg = config.validate().unwrap_err().to_string();
    assert!(msg.contains("behavioral[1]"), "got {}", msg);
}

#[test]
fn test_validate_input_columns() {
    let mut config = valid();
    config.input.behavioral.push("flow".into());
    assert!(config.validate().unwrap_err().to_string().contains("twice"));

    let mut config = valid();
    config.input.behavioral.push("timestamp".into());
    assert!(config.validate().is_err());
}

#[test]
fn test_bind_weights() {
    let config = valid();
    let weights = config.weights.bind(2);
    assert_eq!(weights.behavioral, vec![1.0, 1.0]);

    let mut config = valid();
    config.weights.behavioral = Some(vec![0.5, 2.0]);
    config.weights.spatial = 0.1;
    let weights = config.weights.bind(2);
    assert_eq!(weights.behavioral, vec![0.5, 2.0]);
    assert_eq!(weights.spatial, 0.1);
}

// =========================================================================
// OVERRIDES
// =========================================================================

#[test]
fn test_overrides_from_lookup() {
    let config = valid().with_overrides_from(lookup_from(&[
        ("STBDBCAN_MIN_PTS", "4"),
        ("STBDBCAN_PCT", "0.25"),
        ("STBDBCAN_STBOF_K", "3"),
        ("STBDBCAN_TEMPORAL_ENTITY", "S9"),
        ("STBDBCAN_NORMALIZE", "false"),
    ]));

    assert_eq!(config.stbdbcan.min_pts, 4);
    assert_eq!(config.stbdbcan.pct, 0.25);
    assert_eq!(config.stbof.k, 3);
    assert_eq!(config.input.temporal_entity.as_deref(), Some("S9"));
    assert!(!config.input.normalize);
}

#[test]
fn test_unparsable_override_is_ignored() {
    let config = valid().with_overrides_from(lookup_from(&[("STBDBCAN_MIN_PTS", "many")]));
    assert_eq!(config.stbdbcan.min_pts, 10);
}

#[test]
#[serial]
fn test_env_overrides() {
    std::env::set_var("STBDBCAN_MIN_PTS_CLUSTER", "7");
    let config = valid().with_env_overrides();
    std::env::remove_var("STBDBCAN_MIN_PTS_CLUSTER");

    assert_eq!(config.stbdbcan.min_pts_cluster, 7);
    println!("[PASS] test_env_overrides - min_pts_cluster from env");
}
