use std::sync::Arc;

use clap::Parser;
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};

use steer::simulation::chaser::Chaser;
use steer::simulation::events::SimulationEvent;
use steer::simulation::npc::{self, Npc};
use steer::simulation::params::Params;
use steer::simulation::projectile::Projectile;
use steer::simulation::trainer::Trainer;

/// Headless host loop: trains steering brains against a moving target while
/// an NPC patrols and hunts the same target.
#[derive(Debug, Parser)]
#[command(name = "steer", version, about)]
struct Args {
    /// JSON parameter file; defaults are used when omitted.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Number of generations to train.
    #[arg(long, default_value_t = 20)]
    generations: u32,
    /// Seed for the trainer's random generator.
    #[arg(long)]
    seed: Option<u64>,
    /// Fixed timestep in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0, value_parser = parse_timestep)]
    dt: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let params = match &args.config {
        Some(path) => Params::load_from_file(path)?,
        None => Params::default(),
    };

    let rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let mut trainer = Trainer::new(params.trainer.clone(), rng)?;
    let mut guard = Npc::with_behavior_tree(
        params.npc.clone(),
        Array1::from_vec(vec![-8.0, 0.0]),
        Arc::new(npc::behavior_tree()),
    )?;

    info!(generations = args.generations, dt = args.dt, "starting training");

    let mut time = 0.0f32;
    let mut fired = 0usize;
    let mut in_flight: Vec<Projectile> = Vec::new();
    while trainer.generation() < args.generations {
        time += args.dt;
        let target = scripted_target(time);

        trainer.tick(args.dt, &target);
        for event in trainer.drain_events() {
            if let SimulationEvent::GenerationEvolved(stats) = event {
                info!(
                    generation = stats.generation,
                    best = stats.best,
                    mean = stats.mean,
                    "generation finished"
                );
            }
        }

        guard.tick(args.dt, Some(&target));
        for event in guard.drain_events() {
            if let SimulationEvent::ProjectileFired(projectile) = event {
                fired += 1;
                in_flight.push(projectile);
            }
        }
        for projectile in &mut in_flight {
            projectile.update(args.dt);
        }
        in_flight.retain(|projectile| !projectile.is_expired());
    }

    info!(fired, in_flight = in_flight.len(), "guard finished");

    let Some(champion) = trainer.champion() else {
        warn!("no generation was evaluated");
        return Ok(());
    };

    // Replay the champion for one episode against the same target path.
    let chaser = Chaser::new(Arc::clone(champion), params.trainer.agent_speed)?;
    let mut body = Array1::from_vec(vec![params.trainer.spawn_extent, params.trainer.spawn_extent]);
    let mut total_distance = 0.0;
    let steps = (params.trainer.episode_time / args.dt).ceil() as usize;
    for step in 0..steps {
        let target = scripted_target(time + step as f32 * args.dt);
        chaser.step(&mut body, &target, args.dt);
        total_distance += steer::simulation::geometric_utils::distance(&body, &target);
    }
    info!(
        mean_distance = total_distance / steps.max(1) as f32,
        best_ever = ?trainer.history().best_ever(),
        "champion replay finished"
    );

    Ok(())
}

/// Target moving on a slow circle around the origin.
fn scripted_target(time: f32) -> Array1<f32> {
    let angle = time * 0.5;
    Array1::from_vec(vec![angle.cos() * 4.0, angle.sin() * 4.0])
}

/// Accepts only finite, positive timesteps; a zero step would never end an
/// episode.
fn parse_timestep(value: &str) -> Result<f32, String> {
    let dt: f32 = value
        .parse()
        .map_err(|e| format!("`{value}` is not a number: {e}"))?;
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(format!("timestep must be finite and positive, got {dt}"))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
