//! Predator entity
//!
//! Predators chase prey, but only prey they are the closest predator to.
//! This keeps a pack of predators from piling onto the same target: a prey
//! "belongs" to whichever predator is strictly nearest, and every other
//! predator must pick from its own exclusive set or wander.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

use super::{bounce_off_walls, random_direction, random_position, Prey};

/// A predator entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predator {
    pub position: Vec2,
    pub direction: Vec2,
    pub radius: f32,
    pub speed: f32,
}

impl Predator {
    /// Spawn a predator at a random position in the arena
    pub fn spawn(rng: &mut impl Rng, config: &SimConfig) -> Self {
        Self {
            position: random_position(rng, config.predator_radius, config.arena_bounds()),
            direction: random_direction(rng),
            radius: config.predator_radius,
            speed: config.predator_speed,
        }
    }

    /// Advance one tick: steer toward the exclusive target if one exists,
    /// otherwise occasionally wander, then move and bounce.
    pub fn update(&mut self, target: Option<Vec2>, rng: &mut impl Rng, config: &SimConfig) {
        match target {
            Some(prey_pos) => {
                let to_prey = prey_pos - self.position;
                if to_prey.length_squared() > 0.0 {
                    self.direction = to_prey.normalize();
                }
            }
            None => {
                if rng.random_bool(config.predator_turn_chance) {
                    self.direction = random_direction(rng);
                }
            }
        }

        self.position += self.direction * self.speed;
        bounce_off_walls(
            &mut self.position,
            &mut self.direction,
            self.radius,
            config.arena_bounds(),
        );
    }
}

/// Assign each predator its pursuit target for this tick.
///
/// A prey belongs to the predator strictly closest to it (ties go to the
/// first predator in iteration order). Each predator then picks the nearest
/// prey from its own set, so no two predators ever pursue the same prey when
/// one of them is strictly closer. Returns one prey index per predator.
pub fn assign_targets(predators: &[Predator], prey: &[Prey]) -> Vec<Option<usize>> {
    let mut targets: Vec<Option<usize>> = vec![None; predators.len()];
    if predators.is_empty() || prey.is_empty() {
        return targets;
    }

    // Best (distance, prey index) seen so far per predator
    let mut best: Vec<Option<(f32, usize)>> = vec![None; predators.len()];

    for (prey_idx, p) in prey.iter().enumerate() {
        let mut owner = 0;
        let mut owner_dist = predators[0].position.distance_squared(p.position);
        for (pred_idx, predator) in predators.iter().enumerate().skip(1) {
            let dist = predator.position.distance_squared(p.position);
            if dist < owner_dist {
                owner = pred_idx;
                owner_dist = dist;
            }
        }

        match best[owner] {
            Some((dist, _)) if dist <= owner_dist => {}
            _ => best[owner] = Some((owner_dist, prey_idx)),
        }
    }

    for (pred_idx, slot) in best.iter().enumerate() {
        targets[pred_idx] = slot.map(|(_, prey_idx)| prey_idx);
    }
    targets
}
