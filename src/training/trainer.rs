//! Offline trainer
//!
//! Turns a flushed experience log into the next model version: load, split,
//! fit, evaluate, persist. Reproducible by construction: the same log and
//! seed produce the same split, the same tree, and the same score.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::experience;

use super::dataset::{Dataset, FEATURE_NAMES};
use super::metrics::{classification_report, evaluate, Evaluation};
use super::tree::DecisionTree;
use super::versioning::{self, ModelConfig};

/// Trainer failure modes. All of these abort the trainer invocation only;
/// a running simulation is never affected.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("experience log not found at {0:?}")]
    MissingLog(PathBuf),
    #[error("failed to load experience log: {0:#}")]
    UnreadableLog(anyhow::Error),
    #[error("not enough records to train on: {found} (need at least {needed})")]
    TooFewRecords { found: usize, needed: usize },
    #[error("failed to persist model version: {0:#}")]
    Persist(anyhow::Error),
}

/// Knobs for one training run
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Seed for the train/test shuffle
    pub seed: u64,
    /// Held-out fraction
    pub test_split: f32,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Refuse to train on fewer records than this
    pub min_records: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            test_split: 0.2,
            max_depth: 5,
            min_records: 20,
        }
    }
}

/// What a training run produced
#[derive(Debug)]
pub struct TrainReport {
    pub version: u32,
    pub f1_macro: f32,
    pub trained_on: usize,
    pub test_count: usize,
    pub evaluation: Evaluation,
    pub report_text: String,
    pub feature_importances: Vec<f32>,
}

/// Train a classifier on the flushed log and persist it as the next version
pub fn train(
    log_path: &Path,
    models_dir: &Path,
    options: &TrainOptions,
) -> Result<TrainReport, TrainError> {
    if !log_path.exists() {
        return Err(TrainError::MissingLog(log_path.to_path_buf()));
    }
    let records = experience::load_records(log_path).map_err(TrainError::UnreadableLog)?;
    if records.len() < options.min_records {
        return Err(TrainError::TooFewRecords {
            found: records.len(),
            needed: options.min_records,
        });
    }

    let dataset = Dataset::from_records(&records);
    let (train_set, test_set) = dataset.split(options.test_split, options.seed);
    log::info!(
        "Training on {} records, evaluating on {}",
        train_set.len(),
        test_set.len()
    );

    let tree = DecisionTree::fit(&train_set.features, &train_set.labels, options.max_depth);

    let predicted: Vec<String> = test_set
        .features
        .iter()
        .map(|row| tree.predict(row).to_string())
        .collect();
    let evaluation = evaluate(&test_set.labels, &predicted);
    let report_text = classification_report(&evaluation);

    let config = ModelConfig {
        model_type: "decision_tree".to_string(),
        max_depth: options.max_depth,
        test_split: options.test_split,
        trained_on: train_set.len(),
        features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        timestamp: chrono::Local::now().to_rfc3339(),
        f1_macro: evaluation.f1_macro,
        feature_importances: tree.feature_importances.clone(),
    };

    let version =
        versioning::persist(models_dir, &tree, &config, &report_text).map_err(TrainError::Persist)?;
    log::info!(
        "Trained model v{version}: f1_macro {:.3} over {} held-out records",
        evaluation.f1_macro,
        evaluation.total
    );

    Ok(TrainReport {
        version,
        f1_macro: evaluation.f1_macro,
        trained_on: train_set.len(),
        test_count: test_set.len(),
        evaluation,
        report_text,
        feature_importances: tree.feature_importances,
    })
}
