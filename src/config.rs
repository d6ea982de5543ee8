//! Simulation configuration
//!
//! All tunable constants for the arena, the entity populations, and the
//! agent's internal drives live here. A config can be loaded from a RON
//! file or used with its defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena width in world units
    pub arena_width: f32,
    /// Arena height in world units
    pub arena_height: f32,

    /// Number of prey spawned at startup
    pub initial_prey: usize,
    /// Number of predators spawned at startup
    pub initial_predators: usize,

    /// Agent collision radius
    pub agent_radius: f32,
    /// Agent base movement speed (units per tick, before action multiplier)
    pub agent_speed: f32,

    /// Prey collision radius
    pub prey_radius: f32,
    /// Prey movement speed (units per tick)
    pub prey_speed: f32,
    /// Hard cap on the prey population for breeding
    pub prey_cap: usize,
    /// Minimum ticks between breed attempts
    pub prey_breed_min_ticks: u32,
    /// Maximum ticks between breed attempts
    pub prey_breed_max_ticks: u32,
    /// Offspring spawn within this offset of the parent (per axis)
    pub prey_spawn_jitter: f32,
    /// Per-tick chance of an ambient prey spawn
    pub prey_spawn_chance: f64,
    /// Ambient spawning stops at this population
    pub prey_spawn_cap: usize,

    /// Predator collision radius
    pub predator_radius: f32,
    /// Predator movement speed (units per tick)
    pub predator_speed: f32,
    /// Per-tick chance a targetless predator re-orients
    pub predator_turn_chance: f64,

    /// Hunger gained per tick
    pub hunger_rate: f32,
    /// Health lost per tick while hunger is saturated
    pub starvation_damage: f32,
    /// Health lost per tick while energy is depleted
    pub exhaustion_damage: f32,
    /// Energy drained per tick under active emotions
    pub energy_drain: f32,
    /// Energy recovered per tick otherwise
    pub energy_regen: f32,
    /// Stimulation lost per tick
    pub stimulation_decay: f32,
    /// Fear shed per tick when no predator is near
    pub fear_decay: f32,
    /// Predators within this distance saturate fear
    pub fear_radius: f32,
    /// Health lost per tick while any predator overlaps the agent
    pub predator_contact_damage: f32,

    /// The agent only eats when hunger is at least this
    pub eat_hunger_threshold: f32,
    /// Hunger restored by eating one prey
    pub eat_hunger_restore: f32,
    /// Stimulation gained by eating one prey
    pub eat_stimulation_boost: f32,
    /// Energy gained by eating one prey
    pub eat_energy_boost: f32,
    /// Reward bonus for a tick in which the agent ate
    pub eat_reward_bonus: f32,

    /// Per-tick chance of the novelty trigger firing
    pub novelty_chance: f64,
    /// Per-tick chance a wandering agent re-orients
    pub wander_turn_chance: f64,
    /// Per-tick chance an idle/resting agent drifts to a new heading
    pub idle_turn_chance: f64,

    /// Prey within this distance of any predator is not "safe" to pursue
    pub safe_prey_radius: f32,

    /// Speed multiplier while fleeing
    pub flee_speed_factor: f32,
    /// Speed multiplier while seeking food
    pub seek_speed_factor: f32,
    /// Speed multiplier while wandering
    pub wander_speed_factor: f32,
    /// Speed multiplier while idling
    pub idle_speed_factor: f32,
    /// Speed multiplier while resting
    pub rest_speed_factor: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: 1280.0,
            arena_height: 720.0,

            initial_prey: 20,
            initial_predators: 3,

            agent_radius: 12.0,
            agent_speed: 2.0,

            prey_radius: 6.0,
            prey_speed: 1.5,
            prey_cap: 100,
            prey_breed_min_ticks: 300,
            prey_breed_max_ticks: 600,
            prey_spawn_jitter: 15.0,
            prey_spawn_chance: 0.01,
            prey_spawn_cap: 50,

            predator_radius: 10.0,
            predator_speed: 2.0,
            predator_turn_chance: 0.02,

            hunger_rate: 0.1,
            starvation_damage: 0.1,
            exhaustion_damage: 0.1,
            energy_drain: 0.2,
            energy_regen: 0.1,
            stimulation_decay: 0.05,
            fear_decay: 1.0,
            fear_radius: 100.0,
            predator_contact_damage: 0.5,

            eat_hunger_threshold: 50.0,
            eat_hunger_restore: 20.0,
            eat_stimulation_boost: 10.0,
            eat_energy_boost: 10.0,
            eat_reward_bonus: 2.0,

            novelty_chance: 0.005,
            wander_turn_chance: 0.05,
            idle_turn_chance: 0.01,

            safe_prey_radius: 80.0,

            flee_speed_factor: 1.5,
            seek_speed_factor: 1.2,
            wander_speed_factor: 1.0,
            idle_speed_factor: 0.6,
            rest_speed_factor: 0.2,
        }
    }
}

impl SimConfig {
    /// Load a config from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = ron::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Save a config to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = ron::ser::to_string_pretty(self, Default::default())
            .context("Failed to serialize config")?;
        std::fs::write(path, serialized)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }

    /// Arena bounds as a vector
    pub fn arena_bounds(&self) -> glam::Vec2 {
        glam::Vec2::new(self.arena_width, self.arena_height)
    }
}
