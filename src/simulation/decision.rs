//! Stateless binary decision trees.
//!
//! Each tick walks from the root to exactly one leaf, choosing a branch per
//! condition, and runs that leaf's action. Nothing carries over between
//! ticks, which makes these trees a simpler alternative to
//! [`super::behavior::BehaviorTree`] for purely reactive policies.

use super::behavior::ConditionFn;

/// Operation run by a decision leaf.
pub type DecisionFn<C> = Box<dyn Fn(&mut C) + Send + Sync>;

/// A node of a decision tree over context `C`.
pub enum Decision<C> {
    /// Picks `if_true` or `if_false` depending on `condition`.
    Branch {
        /// Name used in logs.
        name: String,
        /// Predicate deciding which side to take.
        condition: ConditionFn<C>,
        /// Taken when the predicate holds.
        if_true: Box<Decision<C>>,
        /// Taken otherwise.
        if_false: Box<Decision<C>>,
    },
    /// Runs an action.
    Leaf {
        /// Name used in logs.
        name: String,
        /// The wrapped operation.
        action: DecisionFn<C>,
    },
}

impl<C> Decision<C> {
    /// Creates a branch node.
    pub fn branch(
        name: impl Into<String>,
        condition: impl Fn(&C) -> bool + Send + Sync + 'static,
        if_true: Decision<C>,
        if_false: Decision<C>,
    ) -> Self {
        Decision::Branch {
            name: name.into(),
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    /// Creates a leaf node.
    pub fn leaf(name: impl Into<String>, action: impl Fn(&mut C) + Send + Sync + 'static) -> Self {
        Decision::Leaf {
            name: name.into(),
            action: Box::new(action),
        }
    }

    /// Walks the tree, runs the chosen leaf and returns its name.
    pub fn decide(&self, ctx: &mut C) -> &str {
        let mut node = self;
        loop {
            match node {
                Decision::Branch {
                    condition,
                    if_true,
                    if_false,
                    ..
                } => {
                    node = if condition(&*ctx) { &**if_true } else { &**if_false };
                }
                Decision::Leaf { name, action } => {
                    action(ctx);
                    return name;
                }
            }
        }
    }

    /// Name of this node.
    pub fn name(&self) -> &str {
        match self {
            Decision::Branch { name, .. } | Decision::Leaf { name, .. } => name,
        }
    }
}
