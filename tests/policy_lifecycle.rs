//! End-to-end tests for the policy lifecycle
//!
//! These tests exercise the full loop the binary drives: simulate, flush the
//! experience log, train a versioned model, and serve it back through the
//! policy provider in a fresh simulation.

use std::path::PathBuf;

use kokoro::agent::PolicyProvider;
use kokoro::config::SimConfig;
use kokoro::simulation::Simulation;
use kokoro::training::{self, dashboard, versioning, TrainOptions};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kokoro_lifecycle_{}_{}", tag, std::process::id()));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Log -> Train -> Version -> Serve
// ============================================================================

#[test]
fn test_full_lifecycle_from_simulation_to_learned_policy() {
    let dir = temp_dir("full");
    let log_path = dir.join("agent_log.json");
    let models_dir = dir.join("models");

    // Phase 1: rule-based run produces the experience log
    let mut sim = Simulation::new(SimConfig::default(), PolicyProvider::rule_based(), 7);
    sim.run(2000);
    assert!(!sim.log.is_empty());
    sim.log.flush(&log_path).unwrap();

    // Phase 2: the trainer turns it into version 1
    let report = training::train(&log_path, &models_dir, &TrainOptions::default()).unwrap();
    assert_eq!(report.version, 1);
    assert_eq!(versioning::latest_version(&models_dir), Some(1));
    assert!(versioning::version_dir(&models_dir, 1).join("model.json").exists());
    assert!(versioning::version_dir(&models_dir, 1).join("config.json").exists());
    assert!(versioning::version_dir(&models_dir, 1).join("report.txt").exists());

    // Phase 3: a fresh simulation picks up the learned policy and runs
    let provider = PolicyProvider::from_models_dir(&models_dir);
    assert_eq!(provider.name(), "learned (v1)");
    let mut learned_sim = Simulation::new(SimConfig::default(), provider, 8);
    learned_sim.run(500);
    assert_eq!(learned_sim.tick, 500);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_retraining_never_touches_existing_versions() {
    let dir = temp_dir("immutable");
    let log_path = dir.join("agent_log.json");
    let models_dir = dir.join("models");

    let mut sim = Simulation::new(SimConfig::default(), PolicyProvider::rule_based(), 21);
    sim.run(1500);
    sim.log.flush(&log_path).unwrap();

    let options = TrainOptions::default();
    training::train(&log_path, &models_dir, &options).unwrap();
    let v1_model =
        std::fs::read_to_string(versioning::version_dir(&models_dir, 1).join("model.json")).unwrap();

    let second = training::train(&log_path, &models_dir, &options).unwrap();
    assert_eq!(second.version, 2);

    // v1's artifact is byte-identical after the second run
    let v1_after =
        std::fs::read_to_string(versioning::version_dir(&models_dir, 1).join("model.json")).unwrap();
    assert_eq!(v1_model, v1_after);

    // Identical log and seed: the two versions hold the same tree
    let v2_model =
        std::fs::read_to_string(versioning::version_dir(&models_dir, 2).join("model.json")).unwrap();
    assert_eq!(v1_model, v2_model);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_dashboard_regenerates_over_the_version_history() {
    let dir = temp_dir("dashboard");
    let log_path = dir.join("agent_log.json");
    let models_dir = dir.join("models");
    let plots_dir = dir.join("plots");
    let page = dir.join("dashboard.html");

    let mut sim = Simulation::new(SimConfig::default(), PolicyProvider::rule_based(), 3);
    sim.run(1500);
    sim.log.flush(&log_path).unwrap();

    for expected in 1..=2u32 {
        let report = training::train(&log_path, &models_dir, &TrainOptions::default()).unwrap();
        assert_eq!(report.version, expected);
        let records = kokoro::experience::load_records(&log_path).unwrap();
        dashboard::write_version_charts(
            &plots_dir,
            report.version,
            &records,
            &report.feature_importances,
        )
        .unwrap();
        dashboard::write_dashboard(&models_dir, &plots_dir, &page).unwrap();
    }

    let html = std::fs::read_to_string(&page).unwrap();
    assert!(html.contains("v1"));
    assert!(html.contains("v2"));
    assert!(plots_dir.join("learning_curve.svg").exists());
    assert!(plots_dir.join("v1").join("reward_histogram.svg").exists());
    assert!(plots_dir.join("v2").join("action_histogram.svg").exists());

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Degraded-mode behavior
// ============================================================================

#[test]
fn test_corrupt_model_degrades_to_rule_based() {
    let dir = temp_dir("corrupt");
    let models_dir = dir.join("models");
    std::fs::create_dir_all(models_dir.join("v3")).unwrap();
    std::fs::write(models_dir.join("v3").join("model.json"), "{ not json").unwrap();

    // The provider degrades instead of crashing, and the simulation runs
    let provider = PolicyProvider::from_models_dir(&models_dir);
    assert_eq!(provider.name(), "rule-based");

    let mut sim = Simulation::new(SimConfig::default(), provider, 5);
    sim.run(100);
    assert_eq!(sim.tick, 100);

    std::fs::remove_dir_all(&dir).ok();
}
