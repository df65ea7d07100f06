//! # Steer - Decision-Making for Autonomous Characters
//!
//! Two tick-driven subsystems for game agents, driven by a host loop the
//! crate does not own:
//!
//! - A behavior tree engine with resumable sequences and selectors, plus a
//!   stateless decision tree, used to build an NPC that patrols, chases,
//!   shoots and gives up.
//! - A neuroevolution trainer that evolves small feedforward networks to
//!   steer agents toward a target through timed episodes, elitist selection
//!   and mutation.
//!
//! Physics, rendering and input stay with the host. The core reads and moves
//! positions through [`simulation::locatable::Locatable`] and draws from an
//! injected random generator. Anything that should appear in the scene is reported through
//! [`simulation::events::EventQueue`].
//!
//! ## Core Modules
//!
//! - [`simulation::behavior`] - Behavior tree nodes and evaluation
//! - [`simulation::npc`] - Tree-driven NPC controller
//! - [`simulation::brain`] - Feedforward network
//! - [`simulation::trainer`] - Episode loop and evolution
//! - [`simulation::population`] - Selection and mutation

/// Core decision-making logic and data structures.
pub mod simulation {
    /// Training agents steered by a brain.
    pub mod agent;
    /// Behavior tree nodes and tick evaluation.
    pub mod behavior;
    /// Feedforward network used as an agent brain.
    pub mod brain;
    /// Steering a body with a single trained brain.
    pub mod chaser;
    /// Stateless decision trees.
    pub mod decision;
    /// Error types.
    pub mod error;
    /// Events handed back to the host.
    pub mod events;
    /// Geometric utility functions for distances and steering.
    pub mod geometric_utils;
    /// Capability traits for positioned entities.
    ///
    /// The [`locatable::Locatable`] trait is implemented by everything the
    /// core moves or aims at (agents, NPCs, projectiles, bare positions).
    pub mod locatable;
    /// Tree-driven NPC controller.
    pub mod npc;
    /// Trainer and NPC parameters.
    pub mod params;
    /// Fixed-size populations with elitist selection.
    pub mod population;
    /// Projectiles fired by NPC attacks.
    pub mod projectile;
    /// Per-generation fitness statistics.
    pub mod stats;
    /// Neuroevolution trainer.
    pub mod trainer;
}
