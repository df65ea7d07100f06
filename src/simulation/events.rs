//! Events the core hands back to the host.
//!
//! The core never creates scene objects itself. Anything that needs a
//! transient actor on the host side (a spawned agent, a fired projectile) is
//! pushed onto an [`EventQueue`] and drained by the host after the tick.

use ndarray::Array1;

use super::projectile::Projectile;
use super::stats::GenerationStats;

/// Events describing state changes the host may want to mirror.
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// A training agent was spawned for the new episode.
    AgentSpawned {
        /// Population slot the agent's brain belongs to.
        id: usize,
        /// Spawn position.
        pos: Array1<f32>,
    },
    /// All agents of the finished episode were discarded.
    AgentsDespawned {
        /// Number of agents removed.
        count: usize,
    },
    /// An NPC fired a projectile.
    ProjectileFired(Projectile),
    /// An NPC gave up chasing and started idling.
    TargetLost {
        /// Position where the NPC stopped.
        pos: Array1<f32>,
    },
    /// A generation was evaluated and replaced by the next one.
    GenerationEvolved(GenerationStats),
}

/// Queue for collecting events during a tick.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending events, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, SimulationEvent> {
        self.events.iter()
    }
}
