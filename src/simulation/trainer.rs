//! Episode-driven neuroevolution trainer.
//!
//! The trainer owns the population and the agents of the current episode.
//! The host calls [`Trainer::tick`] once per frame; when the episode timer
//! runs out the whole generation is evaluated, selected and mutated before
//! the next episode is spawned, all within that same tick.

use std::sync::Arc;

use ndarray::Array1;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use super::agent::Agent;
use super::brain::NeuralNetwork;
use super::error::Result;
use super::events::{EventQueue, SimulationEvent};
use super::locatable::Locatable;
use super::params::TrainerParams;
use super::population::{Population, survivor_count};
use super::stats::{FitnessHistory, GenerationStats};

/// Brains read a 2D displacement.
pub const INPUT_COUNT: usize = 2;
/// Brains produce a 2D direction.
pub const OUTPUT_COUNT: usize = 2;

/// Where the trainer is in its cycle.
///
/// `Spawning`, `Evaluating` and `Evolving` only last for the duration of the
/// tick that enters them; between ticks the trainer is `Idle` (before the
/// first episode) or `Stepping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerPhase {
    /// No episode has been started yet.
    Idle,
    /// Agents for a new episode are being created.
    Spawning,
    /// An episode is running.
    Stepping,
    /// The finished episode is being scored.
    Evaluating,
    /// The next generation is being built.
    Evolving,
}

/// Population-based trainer for steering brains.
pub struct Trainer<R: Rng> {
    params: TrainerParams,
    population: Population,
    agents: Vec<Agent>,
    timer: f32,
    generation: u32,
    phase: TrainerPhase,
    rng: R,
    history: FitnessHistory,
    champion: Option<Arc<NeuralNetwork>>,
    events: EventQueue,
}

impl<R: Rng> Trainer<R> {
    /// Creates a trainer with a random initial population.
    ///
    /// Parameters are validated here; nothing is spawned until the first
    /// episode starts.
    pub fn new(params: TrainerParams, mut rng: R) -> Result<Self> {
        params.validate()?;

        let population = Population::new_random(
            params.population_size,
            INPUT_COUNT,
            params.hidden_count,
            OUTPUT_COUNT,
            &mut rng,
        )?;

        info!(
            population = params.population_size,
            survivors = survivor_count(params.population_size),
            episode_time = params.episode_time,
            "trainer initialized"
        );

        Ok(Self {
            history: FitnessHistory::new(params.history_size),
            params,
            population,
            agents: Vec::new(),
            timer: 0.0,
            generation: 0,
            phase: TrainerPhase::Idle,
            rng,
            champion: None,
            events: EventQueue::new(),
        })
    }

    /// Discards any live agents and spawns one fresh agent per brain.
    pub fn start_episode(&mut self) {
        self.phase = TrainerPhase::Spawning;
        self.timer = 0.0;

        if !self.agents.is_empty() {
            self.events.push(SimulationEvent::AgentsDespawned {
                count: self.agents.len(),
            });
            self.agents.clear();
        }

        let extent = self.params.spawn_extent;
        for (id, brain) in self.population.members().iter().enumerate() {
            let pos = Array1::from_vec(vec![
                self.rng.random_range(-extent..=extent),
                self.rng.random_range(-extent..=extent),
            ]);

            // Every brain in the population was built with the steering topology.
            let agent = match Agent::new(id, pos, Arc::clone(brain), self.params.agent_speed) {
                Ok(agent) => agent,
                Err(e) => panic!("population holds a non-steering brain: {e}"),
            };

            self.events.push(SimulationEvent::AgentSpawned {
                id,
                pos: agent.pos.clone(),
            });
            self.agents.push(agent);
        }

        debug!(
            generation = self.generation,
            agents = self.agents.len(),
            "episode started"
        );
        self.phase = TrainerPhase::Stepping;
    }

    /// Advances the trainer by one frame.
    ///
    /// Starts the first episode if none is running, steps every agent toward
    /// `target`, and evolves the population once `episode_time` has elapsed.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is negative or not finite.
    pub fn tick(&mut self, dt: f32, target: &impl Locatable) {
        assert!(
            dt.is_finite() && dt >= 0.0,
            "tick requires a finite, non-negative dt, got {dt}"
        );

        if self.phase == TrainerPhase::Idle {
            self.start_episode();
        }

        self.timer += dt;

        // Agents are independent and brains are read-only during the episode.
        let target_pos = target.pos().clone();
        self.agents
            .par_iter_mut()
            .for_each(|agent| agent.step(&target_pos, dt));

        if self.timer >= self.params.episode_time {
            let fitness = self.evaluate();
            self.evolve(&fitness);
            self.start_episode();
        }
    }

    /// Scores every live agent, in population order.
    fn evaluate(&mut self) -> Vec<f32> {
        self.phase = TrainerPhase::Evaluating;
        assert_eq!(
            self.agents.len(),
            self.population.len(),
            "every brain must have exactly one agent at evaluation"
        );

        let fitness: Vec<f32> = self.agents.iter().map(Agent::fitness).collect();
        trace!(generation = self.generation, ?fitness, "episode scored");
        fitness
    }

    fn evolve(&mut self, fitness: &[f32]) {
        self.phase = TrainerPhase::Evolving;

        let stats = GenerationStats::from_fitness(self.generation, fitness);
        let ranking =
            self.population
                .evolve(fitness, self.params.mutation_range, &mut self.rng);
        assert_eq!(
            self.population.len(),
            self.params.population_size,
            "population size drifted during evolution"
        );

        self.champion = self.population.get(0).cloned();

        info!(
            generation = stats.generation,
            best = stats.best,
            mean = stats.mean,
            worst = stats.worst,
            unscored = stats.unscored,
            best_slot = ranking[0],
            "generation evolved"
        );

        self.history.record(stats.clone());
        self.events.push(SimulationEvent::GenerationEvolved(stats));
        self.generation += 1;
    }

    /// Current phase of the cycle.
    pub fn phase(&self) -> TrainerPhase {
        self.phase
    }

    /// Number of generations evolved so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Seconds elapsed in the current episode.
    pub fn episode_timer(&self) -> f32 {
        self.timer
    }

    /// Brains of the current generation.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Agents of the current episode.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Best brain of the last evaluated generation.
    pub fn champion(&self) -> Option<&Arc<NeuralNetwork>> {
        self.champion.as_ref()
    }

    /// Summaries of recently evaluated generations.
    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    /// Parameters the trainer was built with.
    pub fn params(&self) -> &TrainerParams {
        &self.params
    }

    /// Drains the events produced since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain()
    }
}
