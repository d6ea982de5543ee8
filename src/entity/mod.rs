//! Arena entities and shared kinematics
//!
//! Prey and predators move independently of the agent; both share the same
//! wall-bounce behavior against the arena edges.

pub mod predator;
pub mod prey;

pub use predator::Predator;
pub use prey::Prey;

use glam::Vec2;
use rand::Rng;

/// Reflect the direction and clamp the position when an entity crosses an
/// arena edge. The crossed axis component of `direction` is negated and the
/// position is pulled back inside `bounds` minus `radius`.
pub fn bounce_off_walls(position: &mut Vec2, direction: &mut Vec2, radius: f32, bounds: Vec2) {
    if position.x <= radius {
        position.x = radius;
        direction.x = -direction.x;
    } else if position.x >= bounds.x - radius {
        position.x = bounds.x - radius;
        direction.x = -direction.x;
    }

    if position.y <= radius {
        position.y = radius;
        direction.y = -direction.y;
    } else if position.y >= bounds.y - radius {
        position.y = bounds.y - radius;
        direction.y = -direction.y;
    }
}

/// Random unit-length heading
pub fn random_direction(rng: &mut impl Rng) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Random position inside the arena, keeping `radius` clear of every edge
pub fn random_position(rng: &mut impl Rng, radius: f32, bounds: Vec2) -> Vec2 {
    Vec2::new(
        rng.random_range(radius..bounds.x - radius),
        rng.random_range(radius..bounds.y - radius),
    )
}
