use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{Result, SteerError};

/// Parameters controlling the neuroevolution trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerParams {
    /// Number of brains in every generation.
    pub population_size: usize,
    /// Length of one episode in seconds.
    pub episode_time: f32,
    /// Half-width of the uniform perturbation added to each weight on mutation.
    pub mutation_range: f32,
    /// Agent movement speed in units per second.
    pub agent_speed: f32,
    /// Agents spawn uniformly in `[-spawn_extent, spawn_extent]` on both axes.
    pub spawn_extent: f32,
    /// Hidden units per brain. Brains always take 2 inputs and produce 2 outputs.
    pub hidden_count: usize,
    /// Number of generation summaries kept in the fitness history.
    pub history_size: usize,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            episode_time: 5.0,
            mutation_range: 0.2,
            agent_speed: 3.0,
            spawn_extent: 5.0,
            hidden_count: 4,
            history_size: 100,
        }
    }
}

impl TrainerParams {
    /// Checks every parameter, failing on the first one out of range.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(invalid("population_size must be positive"));
        }
        if !(self.episode_time.is_finite() && self.episode_time > 0.0) {
            return Err(invalid(format!(
                "episode_time must be positive, got {}",
                self.episode_time
            )));
        }
        if !(self.mutation_range.is_finite() && self.mutation_range >= 0.0) {
            return Err(invalid(format!(
                "mutation_range must be non-negative, got {}",
                self.mutation_range
            )));
        }
        if !(self.agent_speed.is_finite() && self.agent_speed >= 0.0) {
            return Err(invalid(format!(
                "agent_speed must be non-negative, got {}",
                self.agent_speed
            )));
        }
        if !(self.spawn_extent.is_finite() && self.spawn_extent >= 0.0) {
            return Err(invalid(format!(
                "spawn_extent must be non-negative, got {}",
                self.spawn_extent
            )));
        }
        if self.hidden_count == 0 {
            return Err(invalid("hidden_count must be positive"));
        }
        Ok(())
    }
}

/// Parameters for a tree-driven NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcParams {
    /// Fire projectiles when the target is at most this far away.
    pub attack_range: f32,
    /// Chase the target when it is at most this far away.
    pub vision_range: f32,
    /// Movement speed while chasing.
    pub chase_speed: f32,
    /// Movement speed while patrolling.
    pub patrol_speed: f32,
    /// Distance along the x axis between the two patrol waypoints.
    pub patrol_distance: f32,
    /// A waypoint counts as reached within this distance.
    pub arrive_tolerance: f32,
    /// Projectile travel speed.
    pub projectile_speed: f32,
    /// Maximum projectile travel distance.
    pub projectile_range: f32,
    /// Seconds spent winding up before a shot leaves.
    pub attack_windup: f32,
    /// Seconds between two shots.
    pub attack_cooldown: f32,
    /// Seconds spent standing still after losing the target.
    pub idle_duration: f32,
}

impl Default for NpcParams {
    fn default() -> Self {
        Self {
            attack_range: 5.0,
            vision_range: 7.0,
            chase_speed: 3.0,
            patrol_speed: 2.0,
            patrol_distance: 3.0,
            arrive_tolerance: 0.05,
            projectile_speed: 10.0,
            projectile_range: 20.0,
            attack_windup: 0.0,
            attack_cooldown: 2.0,
            idle_duration: 2.0,
        }
    }
}

impl NpcParams {
    /// Checks every parameter, failing on the first one out of range.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("attack_range", self.attack_range),
            ("vision_range", self.vision_range),
            ("chase_speed", self.chase_speed),
            ("patrol_speed", self.patrol_speed),
            ("patrol_distance", self.patrol_distance),
            ("arrive_tolerance", self.arrive_tolerance),
            ("projectile_speed", self.projectile_speed),
            ("projectile_range", self.projectile_range),
            ("attack_windup", self.attack_windup),
            ("attack_cooldown", self.attack_cooldown),
            ("idle_duration", self.idle_duration),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} must be non-negative, got {value}")));
            }
        }
        Ok(())
    }
}

/// All tunable parameters, as stored in a parameter file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Trainer parameters.
    pub trainer: TrainerParams,
    /// NPC controller parameters.
    pub npc: NpcParams,
}

impl Params {
    /// Loads and validates parameters from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.trainer.validate()?;
        params.npc.validate()?;
        Ok(params)
    }

    /// Writes parameters to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SteerError {
    SteerError::InvalidConfig(message.into())
}
