//! Capability traits for things that occupy a position in the world.
//!
//! The host owns the actual scene objects. The core only needs to read a
//! position and issue a move, so anything implementing [`Locatable`] can be
//! steered by an [`crate::simulation::agent::Agent`], a
//! [`crate::simulation::chaser::Chaser`] or serve as a target.

use ndarray::Array1;

/// Trait for entities with a 2D position that can be moved.
pub trait Locatable {
    /// Returns a reference to the entity's position.
    fn pos(&self) -> &Array1<f32>;

    /// Returns a mutable reference to the entity's position.
    fn pos_mut(&mut self) -> &mut Array1<f32>;

    /// Moves the entity by `delta`.
    fn move_by(&mut self, delta: &Array1<f32>) {
        *self.pos_mut() += delta;
    }
}

/// A bare position is the simplest possible target.
impl Locatable for Array1<f32> {
    fn pos(&self) -> &Array1<f32> {
        self
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        self
    }
}
