//! Prey entity
//!
//! Prey drift at constant speed, bounce off the arena walls, and breed on a
//! randomized countdown while the population is below the cap.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

use super::{bounce_off_walls, random_direction, random_position};

/// A prey entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prey {
    pub position: Vec2,
    pub direction: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Ticks until the next breed attempt
    pub breed_timer: u32,
}

impl Prey {
    /// Spawn a prey at a random position in the arena
    pub fn spawn(rng: &mut impl Rng, config: &SimConfig) -> Self {
        let position = random_position(rng, config.prey_radius, config.arena_bounds());
        Self::at(position, rng, config)
    }

    /// Spawn a prey at a specific position
    pub fn at(position: Vec2, rng: &mut impl Rng, config: &SimConfig) -> Self {
        Self {
            position,
            direction: random_direction(rng),
            radius: config.prey_radius,
            speed: config.prey_speed,
            breed_timer: rng.random_range(config.prey_breed_min_ticks..=config.prey_breed_max_ticks),
        }
    }

    /// Advance one tick: move, bounce, and count down to breeding.
    ///
    /// `population` is the live prey count including offspring already queued
    /// this tick; an offspring is returned only while it is below the cap.
    /// The caller appends it after the iteration finishes.
    pub fn update(
        &mut self,
        population: usize,
        rng: &mut impl Rng,
        config: &SimConfig,
    ) -> Option<Prey> {
        self.position += self.direction * self.speed;
        bounce_off_walls(
            &mut self.position,
            &mut self.direction,
            self.radius,
            config.arena_bounds(),
        );

        self.breed_timer = self.breed_timer.saturating_sub(1);
        if self.breed_timer == 0 {
            self.breed_timer =
                rng.random_range(config.prey_breed_min_ticks..=config.prey_breed_max_ticks);
            if population < config.prey_cap {
                return Some(self.spawn_child(rng, config));
            }
        }
        None
    }

    /// Spawn an offspring near this prey, clamped into the arena
    fn spawn_child(&self, rng: &mut impl Rng, config: &SimConfig) -> Prey {
        let jitter = config.prey_spawn_jitter;
        let bounds = config.arena_bounds();
        let position = Vec2::new(
            (self.position.x + rng.random_range(-jitter..=jitter))
                .clamp(config.prey_radius, bounds.x - config.prey_radius),
            (self.position.y + rng.random_range(-jitter..=jitter))
                .clamp(config.prey_radius, bounds.y - config.prey_radius),
        );
        Prey::at(position, rng, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn test_rng() -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(42)
    }

    #[test]
    fn test_prey_spawns_in_bounds() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        for _ in 0..50 {
            let prey = Prey::spawn(&mut rng, &config);
            assert!(prey.position.x >= prey.radius);
            assert!(prey.position.x <= config.arena_width - prey.radius);
            assert!(prey.position.y >= prey.radius);
            assert!(prey.position.y <= config.arena_height - prey.radius);
        }
    }

    #[test]
    fn test_breed_timer_in_configured_range() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        for _ in 0..50 {
            let prey = Prey::spawn(&mut rng, &config);
            assert!(prey.breed_timer >= config.prey_breed_min_ticks);
            assert!(prey.breed_timer <= config.prey_breed_max_ticks);
        }
    }

    #[test]
    fn test_prey_breeds_when_timer_expires() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut prey = Prey::spawn(&mut rng, &config);
        prey.breed_timer = 1;

        let child = prey.update(10, &mut rng, &config);
        assert!(child.is_some());

        // Timer resets to a fresh countdown
        assert!(prey.breed_timer >= config.prey_breed_min_ticks);

        // Offspring lands near the parent, inside the arena
        let child = child.unwrap();
        assert!((child.position.x - prey.position.x).abs() <= config.prey_spawn_jitter + 1e-3);
        assert!((child.position.y - prey.position.y).abs() <= config.prey_spawn_jitter + 1e-3);
        assert!(child.position.x >= child.radius);
        assert!(child.position.y >= child.radius);
    }

    #[test]
    fn test_prey_does_not_breed_at_cap() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut prey = Prey::spawn(&mut rng, &config);
        prey.breed_timer = 1;

        let child = prey.update(config.prey_cap, &mut rng, &config);
        assert!(child.is_none());
        // The countdown still resets, so the next attempt waits a full cycle
        assert!(prey.breed_timer >= config.prey_breed_min_ticks);
    }

    #[test]
    fn test_prey_stays_in_bounds_over_many_ticks() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut prey = Prey::spawn(&mut rng, &config);
        for _ in 0..2000 {
            prey.update(0, &mut rng, &config);
            assert!(prey.position.x >= prey.radius - 1e-3);
            assert!(prey.position.x <= config.arena_width - prey.radius + 1e-3);
            assert!(prey.position.y >= prey.radius - 1e-3);
            assert!(prey.position.y <= config.arena_height - prey.radius + 1e-3);
        }
    }
}
