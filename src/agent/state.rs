//! Agent internal state
//!
//! Five bounded drives plus the current emotion and action. Every mutator
//! clamps to [0, 100]; nothing outside that range is ever stored.

use serde::{Deserialize, Serialize};

use super::emotion::Emotion;
use super::policy::Action;
use crate::config::SimConfig;

/// Upper bound shared by every drive scalar
pub const DRIVE_MAX: f32 = 100.0;

/// The agent's internal drives, mutated once per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// 0 = full, 100 = starving
    pub hunger: f32,
    /// Drains under active emotions, recovers otherwise
    pub energy: f32,
    /// Decays passively, boosted by eating
    pub stimulation: f32,
    /// Saturates near predators, cools off otherwise
    pub fear_level: f32,
    /// 0 is terminal
    pub health: f32,
    /// Current emotion label
    pub emotion: Emotion,
    /// Current action label
    pub action: Action,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            hunger: 0.0,
            energy: 100.0,
            stimulation: 50.0,
            fear_level: 0.0,
            health: 100.0,
            emotion: Emotion::Idle,
            action: Action::Idle,
        }
    }
}

impl AgentState {
    /// Whether the terminal state has been reached
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Apply the per-tick decay/regen pass: hunger rises, energy drains or
    /// recovers depending on whether the current emotion is active, and
    /// stimulation decays. Everything is clamped.
    pub fn apply_decay(&mut self, config: &SimConfig) {
        self.hunger = (self.hunger + config.hunger_rate).clamp(0.0, DRIVE_MAX);

        if self.emotion.is_active() {
            self.energy -= config.energy_drain;
        } else {
            self.energy += config.energy_regen;
        }
        self.energy = self.energy.clamp(0.0, DRIVE_MAX);

        self.stimulation = (self.stimulation - config.stimulation_decay).clamp(0.0, DRIVE_MAX);
    }

    /// Apply the health penalties for saturated hunger and depleted energy
    pub fn apply_condition_damage(&mut self, config: &SimConfig) {
        if self.hunger >= DRIVE_MAX {
            self.health -= config.starvation_damage;
        }
        if self.energy <= 0.0 {
            self.health -= config.exhaustion_damage;
        }
        self.health = self.health.clamp(0.0, DRIVE_MAX);
    }

    /// Saturate fear in response to a nearby predator
    pub fn trigger_fear(&mut self) {
        self.fear_level = DRIVE_MAX;
    }

    /// Cool fear by the per-tick step, never below zero
    pub fn cool_fear(&mut self, config: &SimConfig) {
        self.fear_level = (self.fear_level - config.fear_decay).max(0.0);
    }

    /// Apply the effects of eating one prey
    pub fn eat(&mut self, config: &SimConfig) {
        self.hunger = (self.hunger - config.eat_hunger_restore).clamp(0.0, DRIVE_MAX);
        self.stimulation = (self.stimulation + config.eat_stimulation_boost).clamp(0.0, DRIVE_MAX);
        self.energy = (self.energy + config.eat_energy_boost).clamp(0.0, DRIVE_MAX);
    }

    /// Take damage, clamped at zero
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, DRIVE_MAX);
    }

    /// Force the terminal state
    pub fn mark_dead(&mut self) {
        self.health = 0.0;
        self.emotion = Emotion::Dead;
        self.action = Action::DoNothing;
    }

    /// True when every bounded scalar sits inside [0, 100]
    pub fn in_bounds(&self) -> bool {
        let ok = |v: f32| (0.0..=DRIVE_MAX).contains(&v);
        ok(self.hunger) && ok(self.energy) && ok(self.stimulation) && ok(self.fear_level) && ok(self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_in_bounds() {
        let state = AgentState::default();
        assert!(state.in_bounds());
        assert!(!state.is_dead());
        assert_eq!(state.emotion, Emotion::Idle);
    }

    #[test]
    fn test_decay_raises_hunger_and_clamps() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.hunger = 99.99;
        for _ in 0..10 {
            state.apply_decay(&config);
        }
        assert_eq!(state.hunger, DRIVE_MAX);
        assert!(state.in_bounds());
    }

    #[test]
    fn test_active_emotion_drains_energy() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.emotion = Emotion::Fearful;
        state.apply_decay(&config);
        assert_eq!(state.energy, 100.0 - config.energy_drain);
    }

    #[test]
    fn test_passive_emotion_regenerates_energy() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.emotion = Emotion::Idle;
        state.energy = 50.0;
        state.apply_decay(&config);
        assert_eq!(state.energy, 50.0 + config.energy_regen);
    }

    #[test]
    fn test_saturated_hunger_damages_health() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.hunger = DRIVE_MAX;
        state.apply_condition_damage(&config);
        assert_eq!(state.health, 100.0 - config.starvation_damage);
    }

    #[test]
    fn test_depleted_energy_damages_health() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.energy = 0.0;
        state.apply_condition_damage(&config);
        assert_eq!(state.health, 100.0 - config.exhaustion_damage);
    }

    #[test]
    fn test_both_penalties_stack() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.hunger = DRIVE_MAX;
        state.energy = 0.0;
        state.apply_condition_damage(&config);
        assert_eq!(
            state.health,
            100.0 - config.starvation_damage - config.exhaustion_damage
        );
    }

    #[test]
    fn test_fear_cools_to_zero_and_stops() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.fear_level = 1.5;
        state.cool_fear(&config);
        state.cool_fear(&config);
        assert_eq!(state.fear_level, 0.0);
        state.cool_fear(&config);
        assert_eq!(state.fear_level, 0.0);
    }

    #[test]
    fn test_eating_adjusts_drives() {
        let config = SimConfig::default();
        let mut state = AgentState::default();
        state.hunger = 80.0;
        state.energy = 50.0;
        state.stimulation = 95.0;
        state.eat(&config);
        assert_eq!(state.hunger, 60.0);
        assert_eq!(state.energy, 60.0);
        assert_eq!(state.stimulation, DRIVE_MAX);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut state = AgentState::default();
        state.take_damage(500.0);
        assert_eq!(state.health, 0.0);
        assert!(state.is_dead());
    }
}
