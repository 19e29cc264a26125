//! Testing utilities for convtree workspace
//!
//! Shared fixtures, scenario builders, invariant assertions and proptest
//! strategies.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use convtree_core::{Direction, MessageTree, NodeId, Role, SequentialIds};
use proptest::prelude::*;

/// Deterministic id source starting at 1
pub fn ids() -> SequentialIds {
    SequentialIds::new()
}

/// Shorthand for the n-th id minted by [`ids`]
pub fn nth_id(n: u128) -> NodeId {
    NodeId::from_u128(n)
}

/// User greeting with two assistant alternatives
///
/// `r1` ("Hi") -> `a1` ("Hello"), `a2` ("Hi there!"); `a2` selected.
#[derive(Debug, Clone)]
pub struct ForkedGreeting {
    pub tree: MessageTree,
    pub r1: NodeId,
    pub a1: NodeId,
    pub a2: NodeId,
}

pub fn forked_greeting() -> ForkedGreeting {
    let ids = ids();
    let root = MessageTree::new()
        .add_node(&ids, Role::User, "Hi", None, None)
        .unwrap();
    let r1 = root.node_id;
    let first = root
        .tree
        .add_node(&ids, Role::Assistant, "Hello", Some(r1), None)
        .unwrap();
    let second = first
        .tree
        .add_node(&ids, Role::Assistant, "Hi there!", Some(r1), None)
        .unwrap();

    ForkedGreeting {
        tree: second.tree,
        r1,
        a1: first.node_id,
        a2: second.node_id,
    }
}

/// Linear chain A -> B -> C where C has children `[D, E]`
#[derive(Debug, Clone)]
pub struct ForkedChain {
    pub tree: MessageTree,
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub d: NodeId,
    pub e: NodeId,
}

pub fn forked_chain() -> ForkedChain {
    let ids = ids();
    let mut tree = MessageTree::new();
    let mut parent = None;
    let mut chain = Vec::new();
    for (role, text) in [(Role::User, "A"), (Role::Assistant, "B"), (Role::User, "C")] {
        let added = tree.add_node(&ids, role, text, parent, None).unwrap();
        tree = added.tree;
        parent = Some(added.node_id);
        chain.push(added.node_id);
    }
    let d = tree
        .add_node(&ids, Role::Assistant, "D", parent, None)
        .unwrap();
    let e = d
        .tree
        .add_node(&ids, Role::Assistant, "E", parent, None)
        .unwrap();

    ForkedChain {
        tree: e.tree,
        a: chain[0],
        b: chain[1],
        c: chain[2],
        d: d.node_id,
        e: e.node_id,
    }
}

/// Build a linear user/assistant conversation of `turns` messages
pub fn linear_conversation(turns: usize) -> (MessageTree, Vec<NodeId>) {
    let ids = ids();
    let mut tree = MessageTree::new();
    let mut path = Vec::with_capacity(turns);
    for turn in 0..turns {
        let role = if turn % 2 == 0 { Role::User } else { Role::Assistant };
        let added = tree
            .add_node(&ids, role, format!("message {turn}"), path.last().copied(), None)
            .unwrap();
        tree = added.tree;
        path.push(added.node_id);
    }
    (tree, path)
}

/// Panic with the violation if `tree` is structurally inconsistent
pub fn assert_tree_consistent(tree: &MessageTree) {
    if let Err(err) = tree.validate() {
        panic!("inconsistent tree: {err}\n{tree:#?}");
    }
}

/// Random operation against a growing tree
///
/// `pick` values select an existing node by index modulo the node count.
#[derive(Debug, Clone)]
pub enum TreeOp {
    AddRoot { role: Role },
    AddChild { pick: usize, role: Role },
    Update { pick: usize, text: String },
    Append { pick: usize, text: String },
    Navigate { pick: usize, direction: Direction },
    Select { pick: usize },
}

pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant)]
}

pub fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Previous), Just(Direction::Next)]
}

pub fn op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        1 => role_strategy().prop_map(|role| TreeOp::AddRoot { role }),
        5 => (any::<usize>(), role_strategy())
            .prop_map(|(pick, role)| TreeOp::AddChild { pick, role }),
        2 => (any::<usize>(), "[a-z ]{0,12}")
            .prop_map(|(pick, text)| TreeOp::Update { pick, text }),
        2 => (any::<usize>(), "[a-z ]{0,6}")
            .prop_map(|(pick, text)| TreeOp::Append { pick, text }),
        3 => (any::<usize>(), direction_strategy())
            .prop_map(|(pick, direction)| TreeOp::Navigate { pick, direction }),
        1 => any::<usize>().prop_map(|pick| TreeOp::Select { pick }),
    ]
}

/// Apply `ops` in order starting from an empty tree
///
/// Returns every intermediate tree, the final one last.
pub fn apply_ops(ops: &[TreeOp]) -> Vec<MessageTree> {
    let ids = ids();
    let mut known: Vec<NodeId> = Vec::new();
    let mut history = vec![MessageTree::new()];
    let mut tree = MessageTree::new();

    for op in ops {
        let pick = |n: usize| (!known.is_empty()).then(|| known[n % known.len()]);
        tree = match op {
            TreeOp::AddRoot { role } => {
                let added = tree.add_node(&ids, *role, "root", None, None).unwrap();
                known.push(added.node_id);
                added.tree
            }
            TreeOp::AddChild { pick: n, role } => match pick(*n) {
                Some(parent) => {
                    let added = tree
                        .add_node(&ids, *role, "child", Some(parent), None)
                        .unwrap();
                    known.push(added.node_id);
                    added.tree
                }
                None => tree,
            },
            TreeOp::Update { pick: n, text } => match pick(*n) {
                Some(id) => tree.update_node_content(id, text.clone(), None).tree,
                None => tree,
            },
            TreeOp::Append { pick: n, text } => match pick(*n) {
                Some(id) => tree.append_node_content(id, text).tree,
                None => tree,
            },
            TreeOp::Navigate { pick: n, direction } => match pick(*n) {
                Some(id) => tree.navigate_sibling(id, *direction).tree,
                None => tree,
            },
            TreeOp::Select { pick: n } => match pick(*n) {
                Some(id) => tree.select_node(id).tree,
                None => tree,
            },
        };
        history.push(tree.clone());
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_consistent() {
        assert_tree_consistent(&forked_greeting().tree);
        assert_tree_consistent(&forked_chain().tree);
        assert_tree_consistent(&linear_conversation(6).0);
    }

    #[test]
    fn fixture_ids_are_sequential() {
        let g = forked_greeting();
        assert_eq!((g.r1, g.a1, g.a2), (nth_id(1), nth_id(2), nth_id(3)));
    }
}
