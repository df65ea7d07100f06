//! Tree-driven NPC controller.
//!
//! An NPC patrols between two waypoints, chases a target that comes into
//! view, shoots at it when close enough, and stands idle for a while after
//! losing it. The behaviour can be driven either by the priority behavior
//! tree from [`behavior_tree`] or by the stateless policy from
//! [`decision_tree`]; both operate on the same [`NpcContext`].
//!
//! Tree definitions hold no per-actor data, so one `Arc`'d tree is shared by
//! every NPC using it.
//!
//! Composites may spend a few frames falling through to a lower priority
//! branch. Actions therefore consume all time accumulated since the last
//! action ran, rather than the current frame's `dt`, so movement speed does not
//! depend on the tree's cadence. An action that fails leaves the time for the
//! next one.

use std::sync::Arc;

use ndarray::Array1;
use tracing::{debug, trace};

use super::behavior::{BehaviorTree, Node, Status, TreeState};
use super::decision::Decision;
use super::error::Result;
use super::events::{EventQueue, SimulationEvent};
use super::geometric_utils::{distance, move_towards, normalize_or_zero};
use super::locatable::Locatable;
use super::params::NpcParams;
use super::projectile::Projectile;

/// Progress of the attack state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPhase {
    /// Ready to start a new attack.
    Ready,
    /// Committed to an attack that has not fired yet.
    WindingUp {
        /// Seconds spent winding up so far.
        elapsed: f32,
    },
}

/// What the NPC did on its most recent action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Walking between waypoints.
    Patrolling,
    /// Moving toward the target.
    Chasing,
    /// Winding up or firing.
    Attacking,
    /// Standing still after losing the target.
    Idling,
}

/// Per-NPC state read and written by tree actions.
#[derive(Debug, Clone)]
pub struct NpcContext {
    /// Tuning parameters.
    pub params: NpcParams,
    /// Position in 2D space.
    pub pos: Array1<f32>,
    /// Target position for this frame, if a target exists.
    pub target: Option<Array1<f32>>,
    unspent_time: f32,
    patrol_start: Array1<f32>,
    patrol_end: Array1<f32>,
    heading_to_end: bool,
    attack: AttackPhase,
    cooldown: f32,
    chasing: bool,
    idle_remaining: f32,
    activity: Activity,
    events: EventQueue,
}

impl NpcContext {
    /// Creates a context at `start`, patrolling toward `start + (patrol_distance, 0)`.
    pub fn new(params: NpcParams, start: Array1<f32>) -> Self {
        let patrol_end = &start + &Array1::from_vec(vec![params.patrol_distance, 0.0]);
        Self {
            params,
            pos: start.clone(),
            target: None,
            unspent_time: 0.0,
            patrol_start: start,
            patrol_end,
            heading_to_end: true,
            attack: AttackPhase::Ready,
            cooldown: 0.0,
            chasing: false,
            idle_remaining: 0.0,
            activity: Activity::Patrolling,
            events: EventQueue::new(),
        }
    }

    /// Whether a target exists and is at most `range` away.
    pub fn target_within(&self, range: f32) -> bool {
        self.target
            .as_ref()
            .is_some_and(|target| distance(&self.pos, target) <= range)
    }

    /// Whether the NPC was chasing and has not finished idling since.
    pub fn has_lost_target(&self) -> bool {
        self.chasing || self.idle_remaining > 0.0
    }

    /// Seconds until the next shot is allowed.
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Attack state machine.
    pub fn attack_phase(&self) -> AttackPhase {
        self.attack
    }

    /// Whether the NPC is currently chasing.
    pub fn is_chasing(&self) -> bool {
        self.chasing
    }

    /// Seconds of idling left.
    pub fn idle_remaining(&self) -> f32 {
        self.idle_remaining
    }

    /// Most recent activity.
    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// Patrol waypoints as `(start, end)`.
    pub fn patrol_waypoints(&self) -> (&Array1<f32>, &Array1<f32>) {
        (&self.patrol_start, &self.patrol_end)
    }

    /// Events produced by actions and not yet drained.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    fn spend_time(&mut self) -> f32 {
        std::mem::take(&mut self.unspent_time)
    }
}

impl Locatable for NpcContext {
    fn pos(&self) -> &Array1<f32> {
        &self.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.pos
    }
}

/// Winds up, fires one projectile at the target, then starts the cooldown.
///
/// Fails without a target or while cooling down; `Running` while winding up.
/// The frame that starts the wind-up counts toward it. Any other action
/// abandons a wind-up in progress.
pub fn attack(ctx: &mut NpcContext) -> Status {
    let Some(target) = ctx.target.clone() else {
        ctx.attack = AttackPhase::Ready;
        return Status::Failure;
    };
    if ctx.cooldown > 0.0 {
        return Status::Failure;
    }
    let dt = ctx.spend_time();
    ctx.activity = Activity::Attacking;

    let elapsed = match ctx.attack {
        AttackPhase::Ready => dt,
        AttackPhase::WindingUp { elapsed } => elapsed + dt,
    };
    if elapsed < ctx.params.attack_windup {
        ctx.attack = AttackPhase::WindingUp { elapsed };
        return Status::Running;
    }

    let direction = normalize_or_zero(&(&target - &ctx.pos));
    let projectile = Projectile::new(
        ctx.pos.clone(),
        &direction,
        ctx.params.projectile_speed,
        ctx.params.projectile_range,
    );
    trace!(pos = ?ctx.pos, ?direction, "projectile fired");
    ctx.events.push(SimulationEvent::ProjectileFired(projectile));

    ctx.cooldown = ctx.params.attack_cooldown;
    ctx.attack = AttackPhase::Ready;
    Status::Success
}

/// Moves toward the target at chase speed. Fails without a target.
pub fn chase(ctx: &mut NpcContext) -> Status {
    let Some(target) = ctx.target.clone() else {
        return Status::Failure;
    };
    let dt = ctx.spend_time();

    ctx.pos = move_towards(&ctx.pos, &target, ctx.params.chase_speed * dt);
    ctx.attack = AttackPhase::Ready;
    ctx.chasing = true;
    ctx.idle_remaining = 0.0;
    ctx.activity = Activity::Chasing;
    Status::Success
}

/// Drops the chase and stands still for `idle_duration`.
///
/// `Running` until the idle time has passed.
pub fn lose_target(ctx: &mut NpcContext) -> Status {
    let dt = ctx.spend_time();
    ctx.attack = AttackPhase::Ready;
    if ctx.chasing {
        ctx.chasing = false;
        ctx.idle_remaining = ctx.params.idle_duration;
        ctx.events.push(SimulationEvent::TargetLost {
            pos: ctx.pos.clone(),
        });
    }
    ctx.activity = Activity::Idling;

    ctx.idle_remaining -= dt;
    if ctx.idle_remaining > 0.0 {
        Status::Running
    } else {
        ctx.idle_remaining = 0.0;
        Status::Success
    }
}

/// Walks toward the current waypoint, turning around once it is reached.
pub fn patrol(ctx: &mut NpcContext) -> Status {
    let dt = ctx.spend_time();
    ctx.attack = AttackPhase::Ready;
    let waypoint = if ctx.heading_to_end {
        &ctx.patrol_end
    } else {
        &ctx.patrol_start
    };

    let next = move_towards(&ctx.pos, waypoint, ctx.params.patrol_speed * dt);
    let arrived = distance(&next, waypoint) <= ctx.params.arrive_tolerance;
    ctx.pos = next;
    if arrived {
        ctx.heading_to_end = !ctx.heading_to_end;
    }
    ctx.activity = Activity::Patrolling;
    Status::Success
}

/// Priority tree: attack, then chase, then idle after losing the target,
/// then patrol.
pub fn behavior_tree() -> BehaviorTree<NpcContext> {
    BehaviorTree::new(Node::selector(vec![
        Node::sequence(vec![
            Node::condition("target in attack range", |ctx: &NpcContext| {
                ctx.target_within(ctx.params.attack_range)
            }),
            Node::action("attack", attack),
        ]),
        Node::sequence(vec![
            Node::condition("target in vision range", |ctx: &NpcContext| {
                ctx.target_within(ctx.params.vision_range)
            }),
            Node::action("chase", chase),
        ]),
        Node::sequence(vec![
            Node::condition("lost target", NpcContext::has_lost_target),
            Node::action("idle", lose_target),
        ]),
        Node::action("patrol", patrol),
    ]))
}

/// Stateless policy: attack if in attack range, else chase if in vision
/// range, else patrol.
pub fn decision_tree() -> Decision<NpcContext> {
    Decision::branch(
        "target in attack range",
        |ctx: &NpcContext| ctx.target_within(ctx.params.attack_range),
        Decision::leaf("attack", |ctx: &mut NpcContext| {
            attack(ctx);
        }),
        Decision::branch(
            "target in vision range",
            |ctx: &NpcContext| ctx.target_within(ctx.params.vision_range),
            Decision::leaf("chase", |ctx: &mut NpcContext| {
                chase(ctx);
            }),
            Decision::leaf("patrol", |ctx: &mut NpcContext| {
                patrol(ctx);
            }),
        ),
    )
}

/// How an NPC chooses its actions.
pub enum Policy {
    /// A shared behavior tree plus this NPC's cursors.
    Behavior {
        /// Shared tree definition.
        tree: Arc<BehaviorTree<NpcContext>>,
        /// Cursors owned by this NPC.
        state: TreeState,
    },
    /// A shared decision tree.
    Decision(Arc<Decision<NpcContext>>),
}

/// An NPC: its context plus the policy that drives it.
pub struct Npc {
    ctx: NpcContext,
    policy: Policy,
}

impl Npc {
    /// Creates an NPC at `start` driven by a behavior tree.
    pub fn with_behavior_tree(
        params: NpcParams,
        start: Array1<f32>,
        tree: Arc<BehaviorTree<NpcContext>>,
    ) -> Result<Self> {
        params.validate()?;
        let state = tree.new_state();
        Ok(Self {
            ctx: NpcContext::new(params, start),
            policy: Policy::Behavior { tree, state },
        })
    }

    /// Creates an NPC at `start` driven by a decision tree.
    pub fn with_decision_tree(
        params: NpcParams,
        start: Array1<f32>,
        tree: Arc<Decision<NpcContext>>,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            ctx: NpcContext::new(params, start),
            policy: Policy::Decision(tree),
        })
    }

    /// Runs the policy once for this frame.
    ///
    /// `target` is resolved by the host; `None` means there is nothing to
    /// chase. Decision trees always report `Success`.
    pub fn tick(&mut self, dt: f32, target: Option<&dyn Locatable>) -> Status {
        self.ctx.unspent_time += dt;
        self.ctx.target = target.map(|t| t.pos().clone());
        let before = self.ctx.activity;

        let status = match &mut self.policy {
            Policy::Behavior { tree, state } => tree.tick(&mut self.ctx, state),
            Policy::Decision(tree) => {
                let leaf = tree.decide(&mut self.ctx);
                // Exactly one leaf runs per frame; time it did not use is dropped.
                self.ctx.spend_time();
                trace!(leaf, "decision taken");
                Status::Success
            }
        };

        if self.ctx.cooldown > 0.0 {
            self.ctx.cooldown = (self.ctx.cooldown - dt).max(0.0);
        }

        if self.ctx.activity != before {
            debug!(from = ?before, to = ?self.ctx.activity, pos = ?self.ctx.pos, "npc activity changed");
        }
        status
    }

    /// The NPC's state.
    pub fn context(&self) -> &NpcContext {
        &self.ctx
    }

    /// Cursors of the behavior tree, if this NPC uses one.
    pub fn tree_state(&self) -> Option<&TreeState> {
        match &self.policy {
            Policy::Behavior { state, .. } => Some(state),
            Policy::Decision(_) => None,
        }
    }

    /// Drains the events produced since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.ctx.events.drain()
    }
}

impl Locatable for Npc {
    fn pos(&self) -> &Array1<f32> {
        &self.ctx.pos
    }

    fn pos_mut(&mut self) -> &mut Array1<f32> {
        &mut self.ctx.pos
    }
}
