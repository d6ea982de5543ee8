//! # Kokoro - Emotion-Driven Artificial Life
//!
//! A 2D artificial-life simulation: one agent with internal drives roams a
//! bounded arena of breeding prey and hunting predators. Every tick the
//! agent's emotion and action are derived from its drive state, and the
//! (state, action, reward) history feeds an offline trainer that produces
//! versioned decision-tree policies served back to the simulation.

pub mod agent;
pub mod config;
pub mod entity;
pub mod experience;
pub mod simulation;
pub mod training;

/// Common imports for internal use
pub mod prelude {
    pub use crate::agent::{Action, Agent, AgentState, Emotion, PolicyProvider};
    pub use crate::config::SimConfig;
    pub use crate::entity::{Predator, Prey};
    pub use crate::experience::ExperienceLog;
    pub use crate::simulation::Simulation;
    pub use glam::Vec2;
}
