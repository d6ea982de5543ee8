//! Model versioning
//!
//! Trained models live under `models/v<N>/`, one immutable directory per
//! version holding the serialized tree, a metadata record, and the
//! human-readable classification report. Version discovery is a directory
//! scan: the latest model is the highest `N` present. Versions are never
//! overwritten.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::tree::DecisionTree;

/// Serialized classifier artifact
pub const MODEL_FILE: &str = "model.json";
/// Metadata record
pub const CONFIG_FILE: &str = "config.json";
/// Plain-text classification report
pub const REPORT_FILE: &str = "report.txt";

/// Metadata persisted alongside each model version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_type: String,
    pub max_depth: usize,
    pub test_split: f32,
    /// Number of training rows
    pub trained_on: usize,
    /// Feature names in the order the model consumes them
    pub features: Vec<String>,
    pub timestamp: String,
    pub f1_macro: f32,
    pub feature_importances: Vec<f32>,
}

/// All version numbers under `models_dir`, sorted ascending.
/// Non-directories and names that are not `v<integer>` are ignored.
pub fn list_versions(models_dir: &Path) -> Vec<u32> {
    let mut versions = Vec::new();
    let entries = match std::fs::read_dir(models_dir) {
        Ok(entries) => entries,
        Err(_) => return versions,
    };
    for entry in entries.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(|s| s.strip_prefix('v')) {
            if let Ok(version) = number.parse::<u32>() {
                versions.push(version);
            }
        }
    }
    versions.sort_unstable();
    versions
}

/// Highest existing version, if any
pub fn latest_version(models_dir: &Path) -> Option<u32> {
    list_versions(models_dir).into_iter().max()
}

/// Directory for a specific version
pub fn version_dir(models_dir: &Path, version: u32) -> PathBuf {
    models_dir.join(format!("v{version}"))
}

/// Persist a freshly trained model under the next version number.
/// Returns the version that was written.
pub fn persist(
    models_dir: &Path,
    tree: &DecisionTree,
    config: &ModelConfig,
    report: &str,
) -> Result<u32> {
    let version = latest_version(models_dir).map_or(1, |latest| latest + 1);
    let dir = version_dir(models_dir, version);
    if dir.exists() {
        bail!("version directory {:?} already exists", dir);
    }
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create version directory {:?}", dir))?;

    let model = serde_json::to_string_pretty(tree).context("Failed to serialize model")?;
    std::fs::write(dir.join(MODEL_FILE), model)
        .with_context(|| format!("Failed to write {MODEL_FILE}"))?;

    let metadata =
        serde_json::to_string_pretty(config).context("Failed to serialize model config")?;
    std::fs::write(dir.join(CONFIG_FILE), metadata)
        .with_context(|| format!("Failed to write {CONFIG_FILE}"))?;

    std::fs::write(dir.join(REPORT_FILE), report)
        .with_context(|| format!("Failed to write {REPORT_FILE}"))?;

    log::info!("Persisted model v{version} to {:?}", dir);
    Ok(version)
}

/// Load the highest-numbered model. `Ok(None)` when no version exists.
pub fn load_latest(models_dir: &Path) -> Result<Option<(u32, DecisionTree)>> {
    let Some(version) = latest_version(models_dir) else {
        return Ok(None);
    };
    let path = version_dir(models_dir, version).join(MODEL_FILE);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read model artifact {:?}", path))?;
    let tree = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse model artifact {:?}", path))?;
    Ok(Some((version, tree)))
}

/// Load the metadata record for one version
pub fn load_config(models_dir: &Path, version: u32) -> Result<ModelConfig> {
    let path = version_dir(models_dir, version).join(CONFIG_FILE);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read model config {:?}", path))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse model config {:?}", path))?;
    Ok(config)
}
