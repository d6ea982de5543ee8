//! Emotion classification
//!
//! A pure priority cascade from the agent's drives to one discrete emotion
//! label. The only external input is the novelty flag carried in the tick
//! context; the function itself holds no randomness and no state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::state::AgentState;
use super::TickContext;

/// The closed set of emotion labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Dead,
    Fearful,
    Hungry,
    Exhausted,
    Bored,
    Curious,
    Idle,
}

impl Emotion {
    /// Active emotions drain energy; the rest let it recover
    pub fn is_active(&self) -> bool {
        matches!(self, Emotion::Hungry | Emotion::Fearful | Emotion::Curious)
    }

    /// Label as stored in the experience log
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Dead => "Dead",
            Emotion::Fearful => "Fearful",
            Emotion::Hungry => "Hungry",
            Emotion::Exhausted => "Exhausted",
            Emotion::Bored => "Bored",
            Emotion::Curious => "Curious",
            Emotion::Idle => "Idle",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dead" => Ok(Emotion::Dead),
            "Fearful" => Ok(Emotion::Fearful),
            "Hungry" => Ok(Emotion::Hungry),
            "Exhausted" => Ok(Emotion::Exhausted),
            "Bored" => Ok(Emotion::Bored),
            "Curious" => Ok(Emotion::Curious),
            "Idle" => Ok(Emotion::Idle),
            other => Err(format!("unknown emotion label: {other}")),
        }
    }
}

/// Classify the agent's emotion from its drives.
///
/// Fixed priority order, first match wins. Must be re-evaluated from the
/// full state every tick, never patched incrementally.
pub fn evaluate_emotion(state: &AgentState, ctx: &TickContext) -> Emotion {
    if state.health <= 0.0 {
        return Emotion::Dead;
    }
    if state.fear_level > 60.0 {
        return Emotion::Fearful;
    }
    if state.hunger > 70.0 {
        return Emotion::Hungry;
    }
    if state.energy < 20.0 {
        return Emotion::Exhausted;
    }
    if state.stimulation < 20.0 {
        return Emotion::Bored;
    }
    if ctx.novelty_trigger {
        return Emotion::Curious;
    }
    Emotion::Idle
}
