//! Action selection
//!
//! Two interchangeable strategies behind one `Policy` trait: the rule-based
//! cascade (always available) and a learned decision tree loaded from the
//! highest-numbered model version. A missing or corrupt model artifact is
//! never fatal; the provider logs the failure and serves the rule-based
//! strategy instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::SimConfig;
use crate::training::tree::DecisionTree;
use crate::training::versioning;

use super::state::AgentState;
use super::TickContext;

/// The closed set of action labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Flee,
    SeekFood,
    Rest,
    Wander,
    Idle,
    DoNothing,
}

impl Action {
    /// Label as stored in the experience log and predicted by the model
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Flee => "flee",
            Action::SeekFood => "seek_food",
            Action::Rest => "rest",
            Action::Wander => "wander",
            Action::Idle => "idle",
            Action::DoNothing => "do_nothing",
        }
    }

    /// Speed multiplier applied to the agent's base speed
    pub fn speed_factor(&self, config: &SimConfig) -> f32 {
        match self {
            Action::Flee => config.flee_speed_factor,
            Action::SeekFood => config.seek_speed_factor,
            Action::Wander => config.wander_speed_factor,
            Action::Idle => config.idle_speed_factor,
            Action::Rest => config.rest_speed_factor,
            Action::DoNothing => 0.0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flee" => Ok(Action::Flee),
            "seek_food" => Ok(Action::SeekFood),
            "rest" => Ok(Action::Rest),
            "wander" => Ok(Action::Wander),
            "idle" => Ok(Action::Idle),
            "do_nothing" => Ok(Action::DoNothing),
            other => Err(format!("unknown action label: {other}")),
        }
    }
}

/// An action-selection strategy
pub trait Policy {
    /// Map the current state and tick context to one action
    fn select_action(&self, state: &AgentState, ctx: &TickContext) -> Action;

    /// Strategy name for logging and the run summary
    fn name(&self) -> String;
}

/// Deterministic rule cascade; the fallback strategy that is always available
pub struct RuleBasedPolicy;

impl RuleBasedPolicy {
    /// The decision table itself. Order matters, first match wins.
    pub fn decide(state: &AgentState, ctx: &TickContext) -> Action {
        if state.health <= 0.0 {
            return Action::DoNothing;
        }
        if state.fear_level > 60.0 && ctx.predators_nearby {
            return Action::Flee;
        }
        if state.hunger > 70.0 && ctx.prey_visible {
            return Action::SeekFood;
        }
        if state.energy < 20.0 {
            return Action::Rest;
        }
        if ctx.novelty_trigger {
            return Action::Wander;
        }
        Action::Idle
    }
}

impl Policy for RuleBasedPolicy {
    fn select_action(&self, state: &AgentState, ctx: &TickContext) -> Action {
        Self::decide(state, ctx)
    }

    fn name(&self) -> String {
        "rule-based".to_string()
    }
}

/// A decision tree trained offline, keyed by its version number.
///
/// The tree consumes the five drives in fixed order (hunger, energy, health,
/// stimulation, fear_level) and predicts an action label. A prediction
/// outside the closed action set falls back to the rule-based answer for
/// that tick.
pub struct LearnedPolicy {
    tree: DecisionTree,
    version: u32,
}

impl LearnedPolicy {
    /// Load the highest-numbered model version under `models_dir`.
    /// Returns `Ok(None)` when no version exists at all.
    pub fn load_latest(models_dir: &Path) -> anyhow::Result<Option<Self>> {
        match versioning::load_latest(models_dir)? {
            Some((version, tree)) => Ok(Some(Self { tree, version })),
            None => Ok(None),
        }
    }

    /// The model version this policy serves
    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Policy for LearnedPolicy {
    fn select_action(&self, state: &AgentState, ctx: &TickContext) -> Action {
        let features = [
            state.hunger,
            state.energy,
            state.health,
            state.stimulation,
            state.fear_level,
        ];
        let label = self.tree.predict(&features);
        match label.parse::<Action>() {
            Ok(action) => action,
            Err(_) => {
                log::debug!("model v{} predicted unknown label {label:?}", self.version);
                RuleBasedPolicy::decide(state, ctx)
            }
        }
    }

    fn name(&self) -> String {
        format!("learned (v{})", self.version)
    }
}

/// The policy object handed to the agent loop, constructed once at startup
pub struct PolicyProvider {
    inner: Box<dyn Policy>,
}

impl PolicyProvider {
    /// Always-available rule-based provider
    pub fn rule_based() -> Self {
        Self {
            inner: Box::new(RuleBasedPolicy),
        }
    }

    /// Load the latest learned model, degrading to rule-based on any failure
    pub fn from_models_dir(models_dir: &Path) -> Self {
        match LearnedPolicy::load_latest(models_dir) {
            Ok(Some(policy)) => {
                log::info!("Loaded policy model v{}", policy.version());
                Self {
                    inner: Box::new(policy),
                }
            }
            Ok(None) => {
                log::info!(
                    "No model versions under {:?}, using rule-based policy",
                    models_dir
                );
                Self::rule_based()
            }
            Err(err) => {
                log::warn!(
                    "Failed to load policy model from {:?}: {err:#}; using rule-based policy",
                    models_dir
                );
                Self::rule_based()
            }
        }
    }

    /// Select this tick's action
    pub fn select_action(&self, state: &AgentState, ctx: &TickContext) -> Action {
        self.inner.select_action(state, ctx)
    }

    /// Name of the active strategy
    pub fn name(&self) -> String {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(hunger: f32, energy: f32, health: f32, stimulation: f32, fear: f32) -> AgentState {
        AgentState {
            hunger,
            energy,
            stimulation,
            fear_level: fear,
            health,
            ..AgentState::default()
        }
    }

    #[test]
    fn test_dead_agent_does_nothing() {
        let s = state(100.0, 0.0, 0.0, 0.0, 100.0);
        let ctx = TickContext {
            predators_nearby: true,
            prey_visible: true,
            novelty_trigger: true,
        };
        assert_eq!(RuleBasedPolicy::decide(&s, &ctx), Action::DoNothing);
    }

    #[test]
    fn test_flee_requires_both_fear_and_predators() {
        let s = state(0.0, 100.0, 100.0, 50.0, 61.0);
        let near = TickContext {
            predators_nearby: true,
            ..TickContext::default()
        };
        assert_eq!(RuleBasedPolicy::decide(&s, &near), Action::Flee);

        // Fear alone is not enough
        assert_eq!(
            RuleBasedPolicy::decide(&s, &TickContext::default()),
            Action::Idle
        );

        // fear_level exactly 60 does not trigger the flee rule
        let s = state(0.0, 100.0, 100.0, 50.0, 60.0);
        assert_eq!(RuleBasedPolicy::decide(&s, &near), Action::Idle);
    }

    #[test]
    fn test_seek_food_requires_visible_prey() {
        let s = state(71.0, 100.0, 100.0, 50.0, 0.0);
        let visible = TickContext {
            prey_visible: true,
            ..TickContext::default()
        };
        assert_eq!(RuleBasedPolicy::decide(&s, &visible), Action::SeekFood);
        assert_eq!(
            RuleBasedPolicy::decide(&s, &TickContext::default()),
            Action::Idle
        );
    }

    #[test]
    fn test_low_energy_rests() {
        let s = state(0.0, 19.0, 100.0, 50.0, 0.0);
        assert_eq!(
            RuleBasedPolicy::decide(&s, &TickContext::default()),
            Action::Rest
        );
    }

    #[test]
    fn test_novelty_wanders() {
        let s = state(0.0, 100.0, 100.0, 50.0, 0.0);
        let novel = TickContext {
            novelty_trigger: true,
            ..TickContext::default()
        };
        assert_eq!(RuleBasedPolicy::decide(&s, &novel), Action::Wander);
    }

    #[test]
    fn test_flee_outranks_seek_food() {
        let s = state(90.0, 100.0, 100.0, 50.0, 90.0);
        let ctx = TickContext {
            predators_nearby: true,
            prey_visible: true,
            novelty_trigger: false,
        };
        assert_eq!(RuleBasedPolicy::decide(&s, &ctx), Action::Flee);
    }

    #[test]
    fn test_provider_falls_back_without_models() {
        let missing = Path::new("does/not/exist");
        let provider = PolicyProvider::from_models_dir(missing);
        assert_eq!(provider.name(), "rule-based");

        let s = state(80.0, 50.0, 50.0, 50.0, 0.0);
        let ctx = TickContext {
            prey_visible: true,
            ..TickContext::default()
        };
        assert_eq!(provider.select_action(&s, &ctx), Action::SeekFood);
    }

    #[test]
    fn test_action_label_round_trip() {
        for action in [
            Action::Flee,
            Action::SeekFood,
            Action::Rest,
            Action::Wander,
            Action::Idle,
            Action::DoNothing,
        ] {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("sprint".parse::<Action>().is_err());
    }

    #[test]
    fn test_do_nothing_has_zero_speed() {
        let config = SimConfig::default();
        assert_eq!(Action::DoNothing.speed_factor(&config), 0.0);
        assert!(Action::Flee.speed_factor(&config) > Action::Rest.speed_factor(&config));
    }
}
