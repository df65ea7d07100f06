#![allow(missing_docs)]

use std::sync::Arc;

use ndarray::Array1;
use steer::simulation::behavior::Status;
use steer::simulation::events::SimulationEvent;
use steer::simulation::locatable::Locatable;
use steer::simulation::npc::{self, Activity, AttackPhase, Npc};
use steer::simulation::params::NpcParams;

const DT: f32 = 0.1;

fn at(x: f32, y: f32) -> Array1<f32> {
    Array1::from_vec(vec![x, y])
}

fn tree_npc(params: NpcParams) -> Npc {
    Npc::with_behavior_tree(params, at(0.0, 0.0), Arc::new(npc::behavior_tree())).unwrap()
}

fn projectiles(npc: &mut Npc) -> usize {
    npc.drain_events()
        .filter(|e| matches!(e, SimulationEvent::ProjectileFired(_)))
        .count()
}

#[test]
fn test_patrol_without_target() {
    let mut npc = tree_npc(NpcParams::default());

    // Falling through attack, chase and idle takes three frames.
    for _ in 0..3 {
        assert_eq!(npc.tick(DT, None), Status::Running);
    }
    assert_eq!(npc.tick(DT, None), Status::Success);
    assert_eq!(npc.tree_state().unwrap().root_cursor(), 0);
    assert_eq!(npc.context().activity(), Activity::Patrolling);

    // Movement covers the time spent falling through as well.
    assert!((npc.pos()[0] - 0.8).abs() < 1e-4);
    assert!(npc.pos()[1].abs() < 1e-6);
}

#[test]
fn test_patrol_turns_around_at_waypoint() {
    let mut npc = tree_npc(NpcParams::default());

    // Four frames per patrol step, 0.8 units each; the end waypoint is at x = 3.
    for _ in 0..16 {
        npc.tick(DT, None);
    }
    assert!((npc.pos()[0] - 3.0).abs() < 1e-4);

    for _ in 0..4 {
        npc.tick(DT, None);
    }
    assert!((npc.pos()[0] - 2.2).abs() < 1e-3);
}

#[test]
fn test_attack_fires_and_cools_down() {
    let mut npc = tree_npc(NpcParams::default());
    let target = at(3.0, 0.0);

    assert_eq!(npc.tick(DT, Some(&target)), Status::Success);
    assert_eq!(npc.context().activity(), Activity::Attacking);

    let events: Vec<SimulationEvent> = npc.drain_events().collect();
    assert_eq!(events.len(), 1);
    let SimulationEvent::ProjectileFired(projectile) = &events[0] else {
        panic!("expected a projectile, got {:?}", events[0]);
    };
    assert!((projectile.velocity[0] - 10.0).abs() < 1e-5);
    assert!(projectile.velocity[1].abs() < 1e-5);
    assert!((npc.context().cooldown() - 1.9).abs() < 1e-5);

    // Within the two second cooldown the NPC chases instead of firing.
    for _ in 0..10 {
        npc.tick(DT, Some(&target));
    }
    assert_eq!(projectiles(&mut npc), 0);
    assert!(npc.pos()[0] > 0.0);
    assert!(npc.context().is_chasing());
}

#[test]
fn test_attack_winds_up_before_firing() {
    let params = NpcParams {
        attack_windup: 0.25,
        ..NpcParams::default()
    };
    let mut npc = tree_npc(params);
    let target = at(3.0, 0.0);

    // The first frame counts: 0.1s and 0.2s are still short of 0.25s.
    for _ in 0..2 {
        assert_eq!(npc.tick(DT, Some(&target)), Status::Running);
        assert!(matches!(
            npc.context().attack_phase(),
            AttackPhase::WindingUp { .. }
        ));
    }
    assert_eq!(projectiles(&mut npc), 0);

    assert_eq!(npc.tick(DT, Some(&target)), Status::Success);
    assert_eq!(projectiles(&mut npc), 1);
    assert_eq!(npc.context().attack_phase(), AttackPhase::Ready);
}

#[test]
fn test_windup_shorter_than_a_frame_fires_immediately() {
    let params = NpcParams {
        attack_windup: 0.05,
        ..NpcParams::default()
    };
    let mut npc = tree_npc(params);

    assert_eq!(npc.tick(DT, Some(&at(3.0, 0.0))), Status::Success);
    assert_eq!(projectiles(&mut npc), 1);
}

#[test]
fn test_windup_with_uneven_timestep() {
    let params = NpcParams {
        attack_windup: 0.25,
        ..NpcParams::default()
    };
    let mut npc = tree_npc(params);
    let target = at(3.0, 0.0);
    let dt = 0.07;

    for _ in 0..3 {
        assert_eq!(npc.tick(dt, Some(&target)), Status::Running);
    }
    let AttackPhase::WindingUp { elapsed } = npc.context().attack_phase() else {
        panic!("expected a wind-up in progress");
    };
    assert!((elapsed - 0.21).abs() < 1e-5);
    assert_eq!(projectiles(&mut npc), 0);

    // 0.28s after the fourth frame.
    assert_eq!(npc.tick(dt, Some(&target)), Status::Success);
    assert_eq!(projectiles(&mut npc), 1);
}

#[test]
fn test_fired_projectile_expires_at_range() {
    let mut npc = tree_npc(NpcParams::default());
    npc.tick(DT, Some(&at(3.0, 0.0)));

    let mut projectile = npc
        .drain_events()
        .find_map(|e| match e {
            SimulationEvent::ProjectileFired(p) => Some(p),
            _ => None,
        })
        .unwrap();

    // Speed 10 and range 20: three half-second steps stay in range.
    for _ in 0..3 {
        projectile.update(0.5);
        assert!(!projectile.is_expired());
    }
    assert!((projectile.pos()[0] - 15.0).abs() < 1e-4);

    projectile.update(0.5);
    assert!(projectile.is_expired());
    assert!((projectile.distance_traveled - 20.0).abs() < 1e-4);
}

#[test]
fn test_chase_moves_toward_visible_target() {
    let mut npc = tree_npc(NpcParams::default());
    let target = at(0.0, 6.0);

    assert_eq!(npc.tick(DT, Some(&target)), Status::Running);
    assert_eq!(npc.tick(DT, Some(&target)), Status::Success);

    assert_eq!(npc.context().activity(), Activity::Chasing);
    assert!(npc.context().is_chasing());
    // 0.2s of chasing at speed 3.
    assert!((npc.pos()[1] - 0.6).abs() < 1e-4);
    assert!(npc.pos()[0].abs() < 1e-6);
}

#[test]
fn test_losing_target_idles_then_patrols() {
    let mut npc = tree_npc(NpcParams::default());
    let target = at(6.0, 0.0);

    npc.tick(DT, Some(&target));
    npc.tick(DT, Some(&target));
    assert!(npc.context().is_chasing());
    npc.drain_events().for_each(drop);

    // Two frames to fall through attack and chase, then the idle branch starts.
    npc.tick(DT, None);
    npc.tick(DT, None);
    assert_eq!(npc.tick(DT, None), Status::Running);
    assert_eq!(npc.context().activity(), Activity::Idling);
    assert!(!npc.context().is_chasing());

    let lost = npc
        .drain_events()
        .filter(|e| matches!(e, SimulationEvent::TargetLost { .. }))
        .count();
    assert_eq!(lost, 1);

    // Standing still while idling, even if the target shows up again.
    let idle_pos = npc.pos().clone();
    for _ in 0..10 {
        assert_eq!(npc.tick(DT, Some(&target)), Status::Running);
    }
    assert_eq!(npc.pos(), &idle_pos);

    for _ in 0..40 {
        npc.tick(DT, None);
    }
    assert_eq!(npc.context().activity(), Activity::Patrolling);
    assert!(npc.context().idle_remaining() <= 0.0);
}

#[test]
fn test_npcs_share_one_tree() {
    let tree = Arc::new(npc::behavior_tree());
    let mut near = Npc::with_behavior_tree(NpcParams::default(), at(0.0, 0.0), Arc::clone(&tree)).unwrap();
    let mut far = Npc::with_behavior_tree(NpcParams::default(), at(100.0, 0.0), tree).unwrap();
    let target = at(2.0, 0.0);

    assert_eq!(near.tick(DT, Some(&target)), Status::Success);
    assert_eq!(far.tick(DT, Some(&target)), Status::Running);

    assert_eq!(near.tree_state().unwrap().root_cursor(), 0);
    assert_eq!(far.tree_state().unwrap().root_cursor(), 1);
    assert_eq!(projectiles(&mut near), 1);
    assert_eq!(projectiles(&mut far), 0);
}

#[test]
fn test_decision_tree_policy() {
    let tree = Arc::new(npc::decision_tree());

    let mut shooter = Npc::with_decision_tree(NpcParams::default(), at(0.0, 0.0), Arc::clone(&tree)).unwrap();
    shooter.tick(DT, Some(&at(3.0, 0.0)));
    assert_eq!(projectiles(&mut shooter), 1);
    assert!(shooter.tree_state().is_none());

    let mut chaser = Npc::with_decision_tree(NpcParams::default(), at(0.0, 0.0), Arc::clone(&tree)).unwrap();
    chaser.tick(DT, Some(&at(6.0, 0.0)));
    assert_eq!(chaser.context().activity(), Activity::Chasing);
    assert!((chaser.pos()[0] - 0.3).abs() < 1e-4);

    // Without a target the decision tree patrols every frame.
    let mut walker = Npc::with_decision_tree(NpcParams::default(), at(0.0, 0.0), tree).unwrap();
    walker.tick(DT, None);
    assert_eq!(walker.context().activity(), Activity::Patrolling);
    assert!((walker.pos()[0] - 0.2).abs() < 1e-4);
}

#[test]
fn test_decision_tree_names_chosen_leaf() {
    let tree = npc::decision_tree();
    let mut ctx = npc::NpcContext::new(NpcParams::default(), at(0.0, 0.0));

    assert_eq!(tree.decide(&mut ctx), "patrol");
    ctx.target = Some(at(0.0, 6.0));
    assert_eq!(tree.decide(&mut ctx), "chase");
    ctx.target = Some(ctx.pos.clone());
    assert_eq!(tree.decide(&mut ctx), "attack");
    assert_eq!(tree.name(), "target in attack range");
}

#[test]
fn test_invalid_npc_params_are_rejected() {
    let params = NpcParams {
        chase_speed: -1.0,
        ..NpcParams::default()
    };
    assert!(Npc::with_behavior_tree(params, at(0.0, 0.0), Arc::new(npc::behavior_tree())).is_err());
}

#[test]
fn test_decision_cooldown_does_not_bank_time() {
    let tree = Arc::new(npc::decision_tree());
    let mut npc = Npc::with_decision_tree(NpcParams::default(), at(0.0, 0.0), tree).unwrap();
    let close = at(3.0, 0.0);

    npc.tick(DT, Some(&close));
    assert_eq!(projectiles(&mut npc), 1);

    // Attack keeps being chosen and failing while the cooldown runs.
    for _ in 0..15 {
        npc.tick(DT, Some(&close));
    }
    assert_eq!(projectiles(&mut npc), 0);
    assert!(npc.context().cooldown() > 0.0);
    assert!(npc.pos()[0].abs() < 1e-6);

    // One frame of chasing covers one frame of distance.
    npc.tick(DT, Some(&at(6.5, 0.0)));
    assert_eq!(npc.context().activity(), Activity::Chasing);
    assert!((npc.pos()[0] - 0.3).abs() < 1e-4);

    for _ in 0..10 {
        npc.tick(DT, Some(&close));
    }
    assert_eq!(projectiles(&mut npc), 1);
    assert!((npc.pos()[0] - 0.3).abs() < 1e-4);
}

#[test]
fn test_abandoned_windup_starts_over() {
    let params = NpcParams {
        attack_windup: 0.25,
        ..NpcParams::default()
    };
    let tree = Arc::new(npc::decision_tree());
    let mut npc = Npc::with_decision_tree(params, at(0.0, 0.0), tree).unwrap();

    npc.tick(DT, Some(&at(3.0, 0.0)));
    assert!(matches!(
        npc.context().attack_phase(),
        AttackPhase::WindingUp { .. }
    ));

    // Target steps out of attack range; the NPC chases instead.
    npc.tick(DT, Some(&at(6.0, 0.0)));
    assert_eq!(npc.context().activity(), Activity::Chasing);
    assert_eq!(npc.context().attack_phase(), AttackPhase::Ready);

    npc.tick(DT, Some(&at(3.0, 0.0)));
    let AttackPhase::WindingUp { elapsed } = npc.context().attack_phase() else {
        panic!("expected a fresh wind-up");
    };
    assert!((elapsed - 0.1).abs() < 1e-5);
    assert_eq!(projectiles(&mut npc), 0);
}
