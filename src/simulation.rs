//! Simulation driver
//!
//! Owns the populations, the agent, the experience log, and one seeded RNG.
//! Each tick advances prey, predators, and the agent in that order; every
//! sub-step reads whatever the previous sub-step produced. List edits are
//! collected during iteration and applied afterwards, and a prey can be
//! consumed by at most one entity per tick.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::agent::{Agent, PolicyProvider};
use crate::config::SimConfig;
use crate::entity::{predator::assign_targets, Predator, Prey};
use crate::experience::ExperienceLog;

/// One full simulation run
pub struct Simulation {
    pub config: SimConfig,
    pub agent: Agent,
    pub prey: Vec<Prey>,
    pub predators: Vec<Predator>,
    pub log: ExperienceLog,
    pub tick: u64,
    policy: PolicyProvider,
    rng: Xoshiro256StarStar,
}

impl Simulation {
    /// Build a simulation with freshly spawned populations
    pub fn new(config: SimConfig, policy: PolicyProvider, seed: u64) -> Self {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let agent = Agent::new(&mut rng, &config);
        let prey = (0..config.initial_prey)
            .map(|_| Prey::spawn(&mut rng, &config))
            .collect();
        let predators = (0..config.initial_predators)
            .map(|_| Predator::spawn(&mut rng, &config))
            .collect();

        Self {
            config,
            agent,
            prey,
            predators,
            log: ExperienceLog::new(),
            tick: 0,
            policy,
            rng,
        }
    }

    /// Name of the active policy strategy
    pub fn policy_name(&self) -> String {
        self.policy.name()
    }

    /// Whether the agent is still alive
    pub fn agent_alive(&self) -> bool {
        !self.agent.state.is_dead()
    }

    /// Advance the whole arena by one tick
    pub fn step(&mut self) {
        // Prey kinematics and breeding: offspring are queued during the
        // iteration and appended afterwards, capped by the live population
        let mut births: Vec<Prey> = Vec::new();
        let population = self.prey.len();
        for prey in &mut self.prey {
            if let Some(child) = prey.update(population + births.len(), &mut self.rng, &self.config)
            {
                births.push(child);
            }
        }
        self.prey.extend(births);

        // Predators steer at their exclusive targets, then move
        let targets = assign_targets(&self.predators, &self.prey);
        for (predator, target) in self.predators.iter_mut().zip(&targets) {
            let target_pos = target.map(|index| self.prey[index].position);
            predator.update(target_pos, &mut self.rng, &self.config);
        }

        // Predators eat on contact. Consumption is collected first so each
        // prey is removed exactly once no matter how many predators touch it
        let mut consumed = vec![false; self.prey.len()];
        for predator in &self.predators {
            for (index, prey) in self.prey.iter().enumerate() {
                if !consumed[index]
                    && predator.position.distance(prey.position) < predator.radius + prey.radius
                {
                    consumed[index] = true;
                }
            }
        }
        let mut index = 0;
        self.prey.retain(|_| {
            let keep = !consumed[index];
            index += 1;
            keep
        });

        // The agent perceives the surviving prey; its own meal is removed after
        let outcome = self.agent.update(
            self.tick,
            &self.prey,
            &self.predators,
            &self.policy,
            &mut self.log,
            &mut self.rng,
            &self.config,
        );
        if let Some(eaten) = outcome.eaten_prey {
            self.prey.remove(eaten);
        }

        // Ambient trickle spawn keeps the arena from emptying out
        if self.prey.len() < self.config.prey_spawn_cap
            && self.rng.random_bool(self.config.prey_spawn_chance)
        {
            self.prey.push(Prey::spawn(&mut self.rng, &self.config));
        }

        self.tick += 1;
    }

    /// Run for a fixed number of ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }
}
