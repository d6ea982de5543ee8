//! The agent and its per-tick decision loop
//!
//! Each tick runs the same pipeline: drive decay, condition damage, the
//! terminal-state check, predator proximity, emotion classification, action
//! selection, movement, and interaction resolution. The loop never mutates
//! the prey list itself; it reports the index of an eaten prey and the
//! simulation driver applies the removal.

pub mod emotion;
pub mod policy;
pub mod state;

pub use emotion::{evaluate_emotion, Emotion};
pub use policy::{Action, LearnedPolicy, Policy, PolicyProvider, RuleBasedPolicy};
pub use state::AgentState;

use glam::Vec2;
use rand::Rng;

use crate::config::SimConfig;
use crate::entity::{bounce_off_walls, random_direction, Predator, Prey};
use crate::experience::ExperienceLog;

/// Per-tick environmental context fed to the emotion and policy evaluators
#[derive(Debug, Clone, Copy, Default)]
pub struct TickContext {
    /// Low-probability novelty flag, rolled once per tick
    pub novelty_trigger: bool,
    /// Any predator within the fear radius this tick
    pub predators_nearby: bool,
    /// Any live prey in the arena
    pub prey_visible: bool,
}

/// What happened during one agent tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickOutcome {
    /// Index of the prey eaten this tick, if any; the driver removes it
    pub eaten_prey: Option<usize>,
}

/// The simulated agent
pub struct Agent {
    pub position: Vec2,
    pub direction: Vec2,
    pub radius: f32,
    /// Base movement speed before the action multiplier
    pub base_speed: f32,
    /// Effective speed this tick
    pub speed: f32,
    pub state: AgentState,
}

impl Agent {
    /// Spawn the agent at the arena center with a random heading
    pub fn new(rng: &mut impl Rng, config: &SimConfig) -> Self {
        Self {
            position: config.arena_bounds() * 0.5,
            direction: random_direction(rng),
            radius: config.agent_radius,
            base_speed: config.agent_speed,
            speed: config.agent_speed,
            state: AgentState::default(),
        }
    }

    /// Run one tick of the decision loop.
    ///
    /// Reads the prey and predator positions as they stand after this tick's
    /// entity updates; appends one experience record (and any emotion
    /// transition) to `log` while alive.
    pub fn update(
        &mut self,
        tick: u64,
        prey: &[Prey],
        predators: &[Predator],
        policy: &PolicyProvider,
        log: &mut ExperienceLog,
        rng: &mut impl Rng,
        config: &SimConfig,
    ) -> TickOutcome {
        // Dead is absorbing: no decay, no movement, no log growth
        if self.state.is_dead() {
            self.die(tick, log);
            return TickOutcome::default();
        }

        let health_before = self.state.health;
        let energy_before = self.state.energy;

        // 1-2. Drive decay/regen, then hunger/energy health penalties
        self.state.apply_decay(config);
        self.state.apply_condition_damage(config);

        // 3. Terminal check: the rest of the tick is skipped
        if self.state.is_dead() {
            self.die(tick, log);
            return TickOutcome::default();
        }

        // 4. Predator proximity saturates fear
        let predators_nearby = predators
            .iter()
            .any(|p| self.position.distance(p.position) < config.fear_radius);
        if predators_nearby {
            self.state.trigger_fear();
        }

        let ctx = TickContext {
            novelty_trigger: rng.random_bool(config.novelty_chance),
            predators_nearby,
            prey_visible: !prey.is_empty(),
        };

        // 5. Emotion, with transition tracking
        let previous = self.state.emotion;
        let emotion = evaluate_emotion(&self.state, &ctx);
        if emotion != previous {
            log.record_transition(tick, previous, emotion);
            log::info!("tick {tick}: the agent feels {}", emotion.as_str().to_lowercase());
        }
        self.state.emotion = emotion;

        // 6. Action
        let action = policy.select_action(&self.state, &ctx);
        self.state.action = action;

        // 7. Movement: speed from the action, steering per its rule
        self.speed = self.base_speed * action.speed_factor(config);
        self.steer(action, prey, predators, rng, config);
        self.position += self.direction * self.speed;
        bounce_off_walls(
            &mut self.position,
            &mut self.direction,
            self.radius,
            config.arena_bounds(),
        );

        // 8. Interactions: eat at most one prey, take contact damage
        let mut eaten = None;
        if self.state.hunger >= config.eat_hunger_threshold {
            for (index, p) in prey.iter().enumerate() {
                if self.position.distance(p.position) < self.radius + p.radius {
                    self.state.eat(config);
                    eaten = Some(index);
                    break;
                }
            }
        }
        if predators
            .iter()
            .any(|p| self.position.distance(p.position) < self.radius + p.radius)
        {
            self.state.take_damage(config.predator_contact_damage);
        }

        // 9. Fear cooldown
        self.state.cool_fear(config);

        // 10. Reward over the whole tick, then the per-tick record
        let mut reward = 0.0;
        if self.state.health > health_before {
            reward += 1.0;
        } else if self.state.health < health_before {
            reward -= 1.0;
        }
        if self.state.energy < energy_before {
            reward -= 0.5;
        }
        if eaten.is_some() {
            reward += config.eat_reward_bonus;
        }
        log.record(tick, &self.state, reward);

        TickOutcome { eaten_prey: eaten }
    }

    /// Enter (or remain in) the terminal state
    fn die(&mut self, tick: u64, log: &mut ExperienceLog) {
        let previous = self.state.emotion;
        self.state.mark_dead();
        self.speed = 0.0;
        if previous != Emotion::Dead {
            log.record_transition(tick, previous, Emotion::Dead);
            log::info!("tick {tick}: the agent died");
        }
    }

    /// Pick this tick's heading for the selected action
    fn steer(
        &mut self,
        action: Action,
        prey: &[Prey],
        predators: &[Predator],
        rng: &mut impl Rng,
        config: &SimConfig,
    ) {
        match action {
            Action::SeekFood => {
                if let Some(target) = nearest_safe_prey(self.position, prey, predators, config) {
                    let to_prey = target - self.position;
                    if to_prey.length_squared() > 0.0 {
                        self.direction = to_prey.normalize();
                    }
                }
            }
            Action::Flee => {
                let nearest = predators.iter().min_by(|a, b| {
                    self.position
                        .distance_squared(a.position)
                        .total_cmp(&self.position.distance_squared(b.position))
                });
                if let Some(predator) = nearest {
                    let away = self.position - predator.position;
                    if away.length_squared() > 0.0 {
                        self.direction = away.normalize();
                    }
                }
            }
            Action::Wander => {
                if rng.random_bool(config.wander_turn_chance) {
                    self.direction = random_direction(rng);
                }
            }
            Action::Idle | Action::Rest => {
                if rng.random_bool(config.idle_turn_chance) {
                    self.direction = random_direction(rng);
                }
            }
            Action::DoNothing => {}
        }
    }
}

/// Position of the nearest safe prey: prey outside the safety radius of
/// every predator. Falls back to the nearest prey when none are safe, and
/// `None` when the arena holds no prey at all (direction stays unchanged).
pub fn nearest_safe_prey(
    from: Vec2,
    prey: &[Prey],
    predators: &[Predator],
    config: &SimConfig,
) -> Option<Vec2> {
    let is_safe = |p: &Prey| {
        predators
            .iter()
            .all(|pred| pred.position.distance(p.position) >= config.safe_prey_radius)
    };

    // Safe prey sort ahead of unsafe prey, nearest first within each group
    prey.iter()
        .min_by(|a, b| {
            let key_a = (!is_safe(a), from.distance_squared(a.position));
            let key_b = (!is_safe(b), from.distance_squared(b.position));
            key_a.0.cmp(&key_b.0).then(key_a.1.total_cmp(&key_b.1))
        })
        .map(|p| p.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn test_rng() -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(42)
    }

    fn prey_at(x: f32, y: f32, config: &SimConfig) -> Prey {
        Prey::at(Vec2::new(x, y), &mut test_rng(), config)
    }

    fn predator_at(x: f32, y: f32, config: &SimConfig) -> Predator {
        Predator {
            position: Vec2::new(x, y),
            direction: Vec2::new(1.0, 0.0),
            radius: config.predator_radius,
            speed: config.predator_speed,
        }
    }

    #[test]
    fn test_hungry_agent_seeks_nearest_safe_prey() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);
        agent.state.hunger = 80.0;
        agent.state.energy = 50.0;
        agent.state.health = 50.0;
        agent.state.stimulation = 50.0;
        agent.state.fear_level = 0.0;

        let prey = vec![
            prey_at(agent.position.x + 200.0, agent.position.y, &config),
            prey_at(agent.position.x - 400.0, agent.position.y, &config),
        ];
        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();

        agent.update(0, &prey, &[], &policy, &mut log, &mut rng, &config);

        assert_eq!(agent.state.emotion, Emotion::Hungry);
        assert_eq!(agent.state.action, Action::SeekFood);
        assert_eq!(
            agent.speed,
            agent.base_speed * Action::SeekFood.speed_factor(&config)
        );
        // Heading points at the nearer prey (to the right)
        assert!(agent.direction.x > 0.99);
        assert_eq!(log.records().len(), 1);
    }

    #[test]
    fn test_dead_agent_tick_is_a_no_op() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);
        agent.state.health = 0.0;

        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();
        let position_before = agent.position;

        for tick in 0..5 {
            agent.update(tick, &[], &[], &policy, &mut log, &mut rng, &config);
            assert_eq!(agent.state.emotion, Emotion::Dead);
            assert_eq!(agent.speed, 0.0);
            assert_eq!(agent.position, position_before);
        }
        // One transition into Dead, no experience records at all
        assert!(log.records().is_empty());
        assert_eq!(log.transitions().len(), 1);
    }

    #[test]
    fn test_predator_proximity_saturates_fear() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);

        let predators = vec![predator_at(
            agent.position.x + config.fear_radius - 1.0,
            agent.position.y,
            &config,
        )];
        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();

        agent.update(0, &[], &predators, &policy, &mut log, &mut rng, &config);

        // Saturated at step 4, cooled once at step 10
        assert_eq!(agent.state.fear_level, 100.0 - config.fear_decay);
        assert_eq!(agent.state.emotion, Emotion::Fearful);
        assert_eq!(agent.state.action, Action::Flee);
        // Fleeing away from the predator on the right
        assert!(agent.direction.x < 0.0);
    }

    #[test]
    fn test_agent_eats_only_when_hungry_enough() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);
        agent.state.hunger = config.eat_hunger_threshold - 1.0;

        let prey = vec![prey_at(agent.position.x, agent.position.y, &config)];
        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();

        let outcome = agent.update(0, &prey, &[], &policy, &mut log, &mut rng, &config);
        assert_eq!(outcome.eaten_prey, None);
    }

    #[test]
    fn test_agent_eats_one_prey_on_contact() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);
        agent.state.hunger = 80.0;

        // Two overlapping prey; only one may be consumed
        let prey = vec![
            prey_at(agent.position.x, agent.position.y, &config),
            prey_at(agent.position.x + 1.0, agent.position.y, &config),
        ];
        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();

        let hunger_before = agent.state.hunger;
        let outcome = agent.update(0, &prey, &[], &policy, &mut log, &mut rng, &config);

        assert!(outcome.eaten_prey.is_some());
        assert!(agent.state.hunger < hunger_before);
        // Eat bonus lands on this tick's record
        let record = &log.records()[0];
        assert!(record.reward >= config.eat_reward_bonus - 1.0);
    }

    #[test]
    fn test_overlapping_predator_damages_once_per_tick() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);

        // Two predators both overlapping; damage applies once
        let predators = vec![
            predator_at(agent.position.x + 1.0, agent.position.y, &config),
            predator_at(agent.position.x - 1.0, agent.position.y, &config),
        ];
        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();

        agent.update(0, &[], &predators, &policy, &mut log, &mut rng, &config);
        // Movement may carry the agent slightly, but both predators started
        // overlapped; exactly one damage application is expected
        assert!(agent.state.health >= 100.0 - 2.0 * config.predator_contact_damage);
        assert!(agent.state.health < 100.0);
    }

    #[test]
    fn test_drives_stay_bounded_over_long_run() {
        let config = SimConfig::default();
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);

        let prey = vec![prey_at(100.0, 100.0, &config)];
        let predators = vec![predator_at(1000.0, 600.0, &config)];
        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();

        for tick in 0..5000 {
            agent.update(tick, &prey, &predators, &policy, &mut log, &mut rng, &config);
            assert!(agent.state.in_bounds(), "drives escaped [0,100] at tick {tick}");
        }
    }

    #[test]
    fn test_nearest_safe_prey_prefers_safe() {
        let config = SimConfig::default();
        let from = Vec2::new(0.0, 0.0);

        // Near prey is guarded by a predator, far prey is safe
        let near = prey_at(50.0, 0.0, &config);
        let far = prey_at(300.0, 0.0, &config);
        let guard = predator_at(60.0, 0.0, &config);

        let target = nearest_safe_prey(from, &[near.clone(), far.clone()], &[guard], &config);
        assert_eq!(target, Some(far.position));

        // With no safe prey anywhere, fall back to the nearest
        let guard_far = predator_at(290.0, 0.0, &config);
        let guard_near = predator_at(60.0, 0.0, &config);
        let target = nearest_safe_prey(from, &[near, far], &[guard_near, guard_far], &config);
        assert_eq!(target, Some(Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_no_prey_leaves_direction_unchanged() {
        let mut config = SimConfig::default();
        // Rule out the stochastic re-orientations for this check
        config.novelty_chance = 0.0;
        config.idle_turn_chance = 0.0;
        let mut rng = test_rng();
        let mut agent = Agent::new(&mut rng, &config);
        agent.state.hunger = 80.0;
        let heading_before = agent.direction;

        let policy = PolicyProvider::rule_based();
        let mut log = ExperienceLog::new();
        agent.update(0, &[], &[], &policy, &mut log, &mut rng, &config);

        // No prey visible: the hunger rule cannot fire and nothing retargets
        assert_ne!(agent.state.action, Action::SeekFood);
        assert_eq!(agent.direction, heading_before);
    }
}
