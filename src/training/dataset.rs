//! Dataset preparation
//!
//! Turns flushed experience records into a labeled feature matrix and splits
//! it into train/test partitions with a seeded shuffle, so the same log and
//! seed always produce the same partitions.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::experience::ExperienceRecord;

use super::tree::NUM_FEATURES;

/// Feature names in the order the model consumes them
pub const FEATURE_NAMES: [&str; NUM_FEATURES] =
    ["hunger", "energy", "health", "stimulation", "fear_level"];

/// A labeled feature matrix
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<[f32; NUM_FEATURES]>,
    pub labels: Vec<String>,
}

impl Dataset {
    /// Build the dataset from experience records, one row per record
    pub fn from_records(records: &[ExperienceRecord]) -> Self {
        let mut features = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            features.push([
                record.state.hunger,
                record.state.energy,
                record.state.health,
                record.state.stimulation,
                record.state.fear_level,
            ]);
            labels.push(record.action.as_str().to_string());
        }
        Self { features, labels }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Split into (train, test) with a deterministic seeded shuffle.
    ///
    /// `test_split` is the held-out fraction; at least one row stays on each
    /// side whenever the dataset holds two or more rows.
    pub fn split(&self, test_split: f32, seed: u64) -> (Dataset, Dataset) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let mut test_size = (self.len() as f32 * test_split).round() as usize;
        if self.len() >= 2 {
            test_size = test_size.clamp(1, self.len() - 1);
        }

        let (test_indices, train_indices) = indices.split_at(test_size);
        (self.subset(train_indices), self.subset(test_indices))
    }

    fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}
