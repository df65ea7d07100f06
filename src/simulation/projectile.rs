//! Projectiles fired by NPC attacks.
//!
//! The core only creates and integrates them; collision and rendering belong
//! to the host, which receives new projectiles through the event queue.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::locatable::Locatable;

/// A projectile travelling in a straight line until it exceeds its range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Current position in 2D space.
    pub pos: Array1<f32>,
    /// Velocity vector (direction and speed).
    pub velocity: Array1<f32>,
    /// Total distance traveled so far.
    pub distance_traveled: f32,
    /// Maximum distance before expiring.
    pub max_range: f32,
}

impl Projectile {
    /// Creates a new projectile.
    ///
    /// # Arguments
    ///
    /// * `pos` - Starting position
    /// * `direction` - Unit firing direction
    /// * `speed` - Projectile speed
    /// * `max_range` - Maximum travel distance before expiring
    pub fn new(pos: Array1<f32>, direction: &Array1<f32>, speed: f32, max_range: f32) -> Self {
        Self {
            pos,
            velocity: direction * speed,
            distance_traveled: 0.0,
            max_range,
        }
    }

    /// Updates projectile position based on velocity and time delta.
    pub fn update(&mut self, dt: f32) {
        let displacement = &self.velocity * dt;
        let distance = displacement.mapv(|x| x.powi(2)).sum().sqrt();

        self.pos += &displacement;
        self.distance_traveled += distance;
    }

    /// Checks if the projectile has exceeded its maximum range.
    pub fn is_expired(&self) -> bool {
        self.distance_traveled >= self.max_range
    }
}

impl Locatable for Projectile {
    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.pos
    }
}
