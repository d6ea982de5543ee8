//! Offline training pipeline
//!
//! This module turns flushed experience logs into versioned policy models:
//! - Dataset preparation with a seeded, reproducible train/test split
//! - A depth-bounded decision-tree classifier
//! - Precision/recall/F1 evaluation on the held-out partition
//! - Immutable `models/v<N>` version directories
//! - Static dashboard generation from the version history

pub mod dashboard;
pub mod dataset;
pub mod metrics;
pub mod trainer;
pub mod tree;
pub mod versioning;

pub use dataset::{Dataset, FEATURE_NAMES};
pub use metrics::{classification_report, evaluate, ClassMetrics, Evaluation};
pub use trainer::{train, TrainError, TrainOptions, TrainReport};
pub use tree::DecisionTree;
pub use versioning::ModelConfig;
