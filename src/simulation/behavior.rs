//! Tick-driven behavior tree.
//!
//! A tree is built once from four node kinds and then ticked every frame.
//! The tree itself is immutable: the per-instance cursors that let a
//! composite resume a `Running` child live in a separate [`TreeState`], and
//! the actor's own data is passed in as a context. One `BehaviorTree` can
//! therefore be shared (for example behind an `Arc`) by any number of actors.
//!
//! | Node kind     | Result                                                            |
//! |---------------|-------------------------------------------------------------------|
//! | Action        | Whatever the wrapped operation returns; may run for many ticks.   |
//! | Condition     | `Success` if the predicate holds, otherwise `Failure`.            |
//! | Sequence      | Children in order; fails on the first failure.                    |
//! | Selector      | Children in order; succeeds on the first success.                 |
//!
//! A composite evaluates at most one non-guard child per tick. When that child
//! lets it move on, the composite advances its cursor and reports `Running`;
//! the next child is evaluated on the next tick. Passing a guard condition in
//! a sequence hands over to the next child in the same tick, so a
//! `[condition, action]` pair acts as one step. Any terminal result resets
//! the cursor to the first child.

/// Result of ticking a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The node completed successfully.
    Success,
    /// The node failed.
    Failure,
    /// The node is mid-operation; tick it again next frame.
    Running,
}

/// Operation wrapped by an action node.
pub type ActionFn<C> = Box<dyn Fn(&mut C) -> Status + Send + Sync>;
/// Predicate wrapped by a condition node.
pub type ConditionFn<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// A node in a behavior tree over context `C`.
pub enum Node<C> {
    /// Runs an operation with side effects.
    Action {
        /// Name used in logs.
        name: String,
        /// The wrapped operation.
        action: ActionFn<C>,
    },
    /// Checks a pure predicate. Never returns `Running`.
    Condition {
        /// Name used in logs.
        name: String,
        /// The wrapped predicate.
        predicate: ConditionFn<C>,
    },
    /// Succeeds once every child has succeeded.
    Sequence(Composite<C>),
    /// Succeeds as soon as one child succeeds.
    Selector(Composite<C>),
}

/// Children of a sequence or selector.
pub struct Composite<C> {
    slot: usize,
    children: Vec<Node<C>>,
}

impl<C> Composite<C> {
    /// Child nodes in evaluation order.
    pub fn children(&self) -> &[Node<C>] {
        &self.children
    }
}

impl<C> Node<C> {
    /// Creates an action node.
    pub fn action(
        name: impl Into<String>,
        action: impl Fn(&mut C) -> Status + Send + Sync + 'static,
    ) -> Self {
        Node::Action {
            name: name.into(),
            action: Box::new(action),
        }
    }

    /// Creates a condition node.
    pub fn condition(
        name: impl Into<String>,
        predicate: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) -> Self {
        Node::Condition {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Creates a sequence over `children`.
    pub fn sequence(children: Vec<Node<C>>) -> Self {
        Node::Sequence(Composite { slot: 0, children })
    }

    /// Creates a selector over `children`.
    pub fn selector(children: Vec<Node<C>>) -> Self {
        Node::Selector(Composite { slot: 0, children })
    }

    /// Name of a leaf node. Composites have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Action { name, .. } | Node::Condition { name, .. } => Some(name),
            Node::Sequence(_) | Node::Selector(_) => None,
        }
    }

    fn execute(&self, ctx: &mut C, cursors: &mut [usize]) -> Status {
        match self {
            Node::Action { action, .. } => action(ctx),
            Node::Condition { predicate, .. } => {
                if predicate(&*ctx) {
                    Status::Success
                } else {
                    Status::Failure
                }
            }
            Node::Sequence(composite) => composite.run(ctx, cursors, Status::Success),
            Node::Selector(composite) => composite.run(ctx, cursors, Status::Failure),
        }
    }

    /// Assigns cursor slots in pre-order, so the root composite owns slot 0.
    fn assign_slots(&mut self, next: &mut usize) {
        if let Node::Sequence(composite) | Node::Selector(composite) = self {
            composite.slot = *next;
            *next += 1;
            for child in &mut composite.children {
                child.assign_slots(next);
            }
        }
    }
}

impl<C> Composite<C> {
    /// Shared evaluation for both composites.
    ///
    /// `advance_on` is the child result that moves the cursor forward:
    /// `Success` for a sequence, `Failure` for a selector. It is also the
    /// result once every child has produced it, and the result of an empty
    /// composite. The opposite terminal result is returned immediately.
    fn run(&self, ctx: &mut C, cursors: &mut [usize], advance_on: Status) -> Status {
        if self.children.is_empty() {
            return advance_on;
        }

        loop {
            let cursor = cursors[self.slot];
            assert!(
                cursor < self.children.len(),
                "composite cursor {cursor} out of range for {} children",
                self.children.len()
            );

            let child = &self.children[cursor];
            match child.execute(ctx, cursors) {
                Status::Running => return Status::Running,
                status if status == advance_on => {
                    if cursor + 1 == self.children.len() {
                        cursors[self.slot] = 0;
                        return advance_on;
                    }
                    cursors[self.slot] = cursor + 1;

                    let passed_guard =
                        advance_on == Status::Success && matches!(child, Node::Condition { .. });
                    if !passed_guard {
                        return Status::Running;
                    }
                }
                status => {
                    cursors[self.slot] = 0;
                    return status;
                }
            }
        }
    }
}

/// Per-instance cursor storage for one [`BehaviorTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeState {
    cursors: Vec<usize>,
}

impl TreeState {
    /// Cursor of every composite, in pre-order. Index 0 is the root.
    pub fn cursors(&self) -> &[usize] {
        &self.cursors
    }

    /// Cursor of the root composite, or 0 when the root is a leaf.
    pub fn root_cursor(&self) -> usize {
        self.cursors.first().copied().unwrap_or(0)
    }

    /// Rewinds every composite to its first child.
    pub fn reset(&mut self) {
        self.cursors.fill(0);
    }
}

/// An immutable behavior tree over context `C`.
pub struct BehaviorTree<C> {
    root: Node<C>,
    composites: usize,
}

impl<C> BehaviorTree<C> {
    /// Finalizes a tree rooted at `root`.
    pub fn new(mut root: Node<C>) -> Self {
        let mut composites = 0;
        root.assign_slots(&mut composites);
        Self { root, composites }
    }

    /// Creates fresh cursor storage for one actor running this tree.
    pub fn new_state(&self) -> TreeState {
        TreeState {
            cursors: vec![0; self.composites],
        }
    }

    /// Ticks the tree once.
    ///
    /// Must be called at most once per frame per actor, with the state
    /// obtained from this tree's [`BehaviorTree::new_state`].
    ///
    /// # Panics
    ///
    /// Panics if `state` belongs to a tree with a different shape.
    pub fn tick(&self, ctx: &mut C, state: &mut TreeState) -> Status {
        assert_eq!(
            state.cursors.len(),
            self.composites,
            "tree state does not belong to this tree"
        );
        self.root.execute(ctx, &mut state.cursors)
    }

    /// Root node.
    pub fn root(&self) -> &Node<C> {
        &self.root
    }

    /// Number of sequences and selectors in the tree.
    pub fn composite_count(&self) -> usize {
        self.composites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Context recording which leaves ran.
    #[derive(Default)]
    struct Trace {
        calls: Vec<&'static str>,
    }

    fn leaf(name: &'static str, status: Status) -> Node<Trace> {
        Node::action(name, move |ctx: &mut Trace| {
            ctx.calls.push(name);
            status
        })
    }

    #[test]
    fn condition_maps_predicate_to_status() {
        let yes = BehaviorTree::new(Node::condition("yes", |_: &Trace| true));
        let no = BehaviorTree::new(Node::condition("no", |_: &Trace| false));
        let mut ctx = Trace::default();

        assert_eq!(yes.tick(&mut ctx, &mut yes.new_state()), Status::Success);
        assert_eq!(no.tick(&mut ctx, &mut no.new_state()), Status::Failure);
    }

    #[test]
    fn empty_composites() {
        let sequence = BehaviorTree::<Trace>::new(Node::sequence(vec![]));
        let selector = BehaviorTree::<Trace>::new(Node::selector(vec![]));
        let mut ctx = Trace::default();

        assert_eq!(sequence.tick(&mut ctx, &mut sequence.new_state()), Status::Success);
        assert_eq!(selector.tick(&mut ctx, &mut selector.new_state()), Status::Failure);
    }

    #[test]
    fn sequence_advances_one_action_per_tick() {
        let tree = BehaviorTree::new(Node::sequence(vec![
            leaf("a", Status::Success),
            leaf("b", Status::Success),
        ]));
        let mut state = tree.new_state();
        let mut ctx = Trace::default();

        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Running);
        assert_eq!(state.root_cursor(), 1);
        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Success);
        assert_eq!(state.root_cursor(), 0);
        assert_eq!(ctx.calls, vec!["a", "b"]);
    }

    #[test]
    fn sequence_resumes_running_child() {
        let tree = BehaviorTree::new(Node::sequence(vec![
            leaf("a", Status::Success),
            leaf("b", Status::Running),
        ]));
        let mut state = tree.new_state();
        let mut ctx = Trace::default();

        for _ in 0..4 {
            tree.tick(&mut ctx, &mut state);
        }
        assert_eq!(state.root_cursor(), 1);
        assert_eq!(ctx.calls, vec!["a", "b", "b", "b"]);
    }

    #[test]
    fn selector_failure_resets_cursor() {
        let tree = BehaviorTree::new(Node::selector(vec![
            leaf("a", Status::Failure),
            leaf("b", Status::Failure),
        ]));
        let mut state = tree.new_state();
        let mut ctx = Trace::default();

        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Running);
        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Failure);
        assert_eq!(state.root_cursor(), 0);
        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Running);
        assert_eq!(ctx.calls, vec!["a", "b", "a"]);
    }

    #[test]
    fn nested_composites_get_distinct_slots() {
        let tree = BehaviorTree::new(Node::selector(vec![
            Node::sequence(vec![leaf("a", Status::Success), leaf("b", Status::Running)]),
            Node::sequence(vec![leaf("c", Status::Success)]),
        ]));
        let mut state = tree.new_state();
        let mut ctx = Trace::default();

        assert_eq!(tree.composite_count(), 3);
        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Running);
        assert_eq!(tree.tick(&mut ctx, &mut state), Status::Running);
        assert_eq!(state.cursors(), &[0, 1, 0]);
    }

    #[test]
    fn leaf_names() {
        let node = leaf("patrol", Status::Success);
        assert_eq!(node.name(), Some("patrol"));
        assert_eq!(Node::<Trace>::sequence(vec![]).name(), None);
    }

    #[test]
    #[should_panic(expected = "does not belong to this tree")]
    fn foreign_state_is_rejected() {
        let one = BehaviorTree::<Trace>::new(Node::sequence(vec![]));
        let other = BehaviorTree::<Trace>::new(Node::selector(vec![Node::sequence(vec![])]));
        let mut state = one.new_state();
        other.tick(&mut Trace::default(), &mut state);
    }
}
