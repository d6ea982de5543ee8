//! Experience logging
//!
//! An append-only in-memory log of per-tick experience records plus the
//! emotion transitions observed along the way. Nothing is written to disk
//! until an explicit flush; the persisted form is one JSON array preserving
//! insertion order, which is exactly what the offline trainer consumes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::agent::{Action, AgentState, Emotion};

/// The five drive scalars as they stood when a record was appended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub hunger: f32,
    pub energy: f32,
    pub health: f32,
    pub stimulation: f32,
    pub fear_level: f32,
}

impl From<&AgentState> for StateSnapshot {
    fn from(state: &AgentState) -> Self {
        Self {
            hunger: state.hunger,
            energy: state.energy,
            health: state.health,
            stimulation: state.stimulation,
            fear_level: state.fear_level,
        }
    }
}

/// One (state, emotion, action, reward) tuple, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub tick: u64,
    pub state: StateSnapshot,
    pub emotion: Emotion,
    pub action: Action,
    pub reward: f32,
}

/// An observed change of emotion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionTransition {
    pub tick: u64,
    pub from: Emotion,
    pub to: Emotion,
}

/// In-memory log for one simulation run
#[derive(Debug, Default)]
pub struct ExperienceLog {
    records: Vec<ExperienceRecord>,
    transitions: Vec<EmotionTransition>,
}

impl ExperienceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append this tick's record
    pub fn record(&mut self, tick: u64, state: &AgentState, reward: f32) {
        self.records.push(ExperienceRecord {
            tick,
            state: state.into(),
            emotion: state.emotion,
            action: state.action,
            reward,
        });
    }

    /// Append an emotion transition
    pub fn record_transition(&mut self, tick: u64, from: Emotion, to: Emotion) {
        self.transitions.push(EmotionTransition { tick, from, to });
    }

    pub fn records(&self) -> &[ExperienceRecord] {
        &self.records
    }

    pub fn transitions(&self) -> &[EmotionTransition] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Write the record sequence to `path` as one pretty JSON array
    pub fn flush(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
        }
        let serialized = serde_json::to_string_pretty(&self.records)
            .context("Failed to serialize experience log")?;
        std::fs::write(path, serialized)
            .with_context(|| format!("Failed to write experience log {:?}", path))?;
        log::info!("Flushed {} experience records to {:?}", self.records.len(), path);
        Ok(())
    }
}

/// Read a previously flushed record sequence
pub fn load_records(path: &Path) -> Result<Vec<ExperienceRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read experience log {:?}", path))?;
    let records = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse experience log {:?}", path))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AgentState {
        AgentState {
            hunger: 80.0,
            energy: 50.0,
            stimulation: 40.0,
            fear_level: 0.0,
            health: 90.0,
            emotion: Emotion::Hungry,
            action: Action::SeekFood,
        }
    }

    #[test]
    fn test_records_preserve_insertion_order() {
        let mut log = ExperienceLog::new();
        let state = sample_state();
        for tick in 0..10 {
            log.record(tick, &state, 0.0);
        }
        let ticks: Vec<u64> = log.records().iter().map(|r| r.tick).collect();
        assert_eq!(ticks, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn test_record_captures_labels() {
        let mut log = ExperienceLog::new();
        log.record(3, &sample_state(), 1.5);

        let record = &log.records()[0];
        assert_eq!(record.emotion, Emotion::Hungry);
        assert_eq!(record.action, Action::SeekFood);
        assert_eq!(record.reward, 1.5);
        assert_eq!(record.state.hunger, 80.0);
    }

    #[test]
    fn test_json_round_trip_uses_stable_labels() {
        let mut log = ExperienceLog::new();
        log.record(0, &sample_state(), -0.5);

        let serialized = serde_json::to_string_pretty(log.records()).unwrap();
        assert!(serialized.contains("\"Hungry\""));
        assert!(serialized.contains("\"seek_food\""));

        let restored: Vec<ExperienceRecord> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].action, Action::SeekFood);
        assert_eq!(restored[0].reward, -0.5);
    }

    #[test]
    fn test_flush_and_load_round_trip() {
        let mut log = ExperienceLog::new();
        let state = sample_state();
        for tick in 0..5 {
            log.record(tick, &state, tick as f32);
        }

        let path = std::env::temp_dir().join(format!("kokoro_log_test_{}.json", std::process::id()));
        log.flush(&path).unwrap();

        let restored = load_records(&path).unwrap();
        assert_eq!(restored.len(), 5);
        assert_eq!(restored[4].reward, 4.0);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let path = Path::new("definitely/not/here.json");
        assert!(load_records(path).is_err());
    }
}
