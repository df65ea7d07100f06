//! Deploys a single trained brain to steer an arbitrary body.

use std::sync::Arc;

use super::agent::{check_steering_topology, steering_direction};
use super::brain::NeuralNetwork;
use super::error::{Result, SteerError};
use super::locatable::Locatable;

/// Steers any [`Locatable`] toward a target with a fixed brain.
///
/// Unlike a training [`super::agent::Agent`], a chaser keeps no statistics
/// and lives for as long as the host wants it to.
#[derive(Debug, Clone)]
pub struct Chaser {
    brain: Arc<NeuralNetwork>,
    speed: f32,
}

impl Chaser {
    /// Creates a chaser; `brain` must have two inputs and two outputs.
    pub fn new(brain: Arc<NeuralNetwork>, speed: f32) -> Result<Self> {
        check_steering_topology(&brain)?;
        if !(speed.is_finite() && speed >= 0.0) {
            return Err(SteerError::InvalidConfig(format!(
                "chaser speed must be non-negative, got {speed}"
            )));
        }
        Ok(Self { brain, speed })
    }

    /// Moves `body` one frame toward `target`.
    pub fn step(&self, body: &mut impl Locatable, target: &impl Locatable, dt: f32) {
        let displacement = target.pos() - body.pos();
        let direction = steering_direction(&self.brain, &displacement);
        body.move_by(&(direction * (self.speed * dt)));
    }

    /// The brain in use.
    pub fn brain(&self) -> &Arc<NeuralNetwork> {
        &self.brain
    }

    /// Movement speed in units per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }
}
