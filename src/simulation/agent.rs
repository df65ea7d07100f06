//! Training agents: one brain steering one body toward a target.

use std::sync::Arc;

use ndarray::Array1;

use super::brain::NeuralNetwork;
use super::error::{Result, SteerError};
use super::geometric_utils::{distance, normalize_or_zero};
use super::locatable::Locatable;

/// Fitness assigned to an agent that never stepped.
pub const UNSCORED_FITNESS: f32 = f32::NEG_INFINITY;

/// An agent living for exactly one episode.
///
/// The brain is shared with the population and never mutated here; the agent
/// only accumulates statistics about how close it stayed to the target.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Population slot of the agent's brain.
    pub id: usize,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Movement speed in units per second.
    pub speed: f32,
    brain: Arc<NeuralNetwork>,
    total_distance: f32,
    steps: u32,
}

impl Agent {
    /// Creates an agent bound to `brain`.
    ///
    /// The brain must map a 2D displacement to a 2D direction.
    pub fn new(id: usize, pos: Array1<f32>, brain: Arc<NeuralNetwork>, speed: f32) -> Result<Self> {
        check_steering_topology(&brain)?;
        Ok(Self {
            id,
            pos,
            speed,
            brain,
            total_distance: 0.0,
            steps: 0,
        })
    }

    /// Runs one step: reads the displacement to `target`, moves along the
    /// brain's output, and records the distance measured before moving.
    pub fn step(&mut self, target: &Array1<f32>, dt: f32) {
        let displacement = target - &self.pos;
        let distance_this_step = distance(target, &self.pos);
        let direction = steering_direction(&self.brain, &displacement);

        self.pos += &(direction * (self.speed * dt));

        self.total_distance += distance_this_step;
        self.steps += 1;
    }

    /// Fitness for the episode: the negated mean distance to the target.
    ///
    /// An agent that never stepped, or whose distances stopped being finite
    /// (a NaN or infinite target), gets [`UNSCORED_FITNESS`] and ranks last.
    pub fn fitness(&self) -> f32 {
        if self.steps == 0 {
            return UNSCORED_FITNESS;
        }
        let fitness = -(self.total_distance / self.steps as f32);
        if fitness.is_finite() { fitness } else { UNSCORED_FITNESS }
    }

    /// Sum of per-step distances to the target.
    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    /// Number of steps taken this episode.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// The brain driving this agent.
    pub fn brain(&self) -> &Arc<NeuralNetwork> {
        &self.brain
    }
}

impl Locatable for Agent {
    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.pos
    }
}

/// Feeds a displacement through `brain` and returns the unit direction to
/// move in, or the zero vector if the brain produced no direction.
///
/// The brain must have two inputs and two outputs.
pub fn steering_direction(brain: &NeuralNetwork, displacement: &Array1<f32>) -> Array1<f32> {
    let output = brain.evaluate(displacement.view());
    normalize_or_zero(&output)
}

pub(crate) fn check_steering_topology(brain: &NeuralNetwork) -> Result<()> {
    if brain.input_count() != 2 || brain.output_count() != 2 {
        return Err(SteerError::InvalidConfig(format!(
            "steering brains need 2 inputs and 2 outputs, got {} and {}",
            brain.input_count(),
            brain.output_count()
        )));
    }
    Ok(())
}
