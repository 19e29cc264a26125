//! The message tree aggregate and its mutation API
//!
//! [`MessageTree`] is an immutable value: every mutation returns a new tree
//! and leaves the receiver untouched. Clones are O(1) and unrelated subtrees
//! are shared between versions, so a session can keep replacing its single
//! live tree after each call without copying the conversation.

use crate::config::TreeConfig;
use crate::error::Result;
use crate::id::{IdGenerator, NodeId};
use crate::navigation::{self, Direction};
use crate::node::{Attachment, Attachments, Role, TreeNode};
use crate::sibling::{self, SiblingInfo};
use crate::store::NodeStore;
use im::Vector;

/// Whether a mutation produced a different tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// The returned tree differs from the input
    Applied,
    /// The returned tree is equal to the input (unknown id, no sibling, ...)
    Unchanged,
}

impl Change {
    /// True for [`Change::Applied`]
    #[inline]
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// New tree value plus a [`Change`] signal
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Mutation {
    /// Resulting tree
    pub tree: MessageTree,
    /// Whether `tree` differs from the input
    pub change: Change,
}

impl Mutation {
    #[inline]
    fn applied(tree: MessageTree) -> Self {
        Self {
            tree,
            change: Change::Applied,
        }
    }

    #[inline]
    fn unchanged(tree: MessageTree) -> Self {
        Self {
            tree,
            change: Change::Unchanged,
        }
    }

    /// True when the tree changed
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.change.is_applied()
    }

    /// Drop the signal, keep the tree
    #[inline]
    #[must_use]
    pub fn into_tree(self) -> MessageTree {
        self.tree
    }
}

/// Result of [`MessageTree::add_node`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct AddedNode {
    /// Tree containing the new node
    pub tree: MessageTree,
    /// Identity of the new node
    pub node_id: NodeId,
}

/// Branching conversation: node store, root forks, and the selected path
///
/// # Invariants
/// - Child and parent links always agree
/// - Roots are exactly the parentless nodes
/// - The selected path is empty or a root-first chain of parent/child links
///
/// All three are maintained by every mutation; see
/// [`validate`](Self::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTree {
    store: NodeStore,
    selected_path: Vector<NodeId>,
    config: TreeConfig,
}

impl MessageTree {
    /// Empty tree with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tree with explicit configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Underlying node store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Number of nodes ever created
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True for a tree without nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Point lookup
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.store.get(id)
    }

    /// Whether `id` names a node of this tree
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.store.contains(id)
    }

    /// Conversation-starting nodes, oldest first
    #[must_use]
    pub fn root_ids(&self) -> Vec<NodeId> {
        self.store.root_ids().collect()
    }

    /// Children of `id`, oldest first
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.store.children_of(id)
    }

    /// Parent of `id`
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.store.parent_of(id)
    }

    /// Currently rendered root-to-leaf chain
    #[inline]
    #[must_use]
    pub fn selected_path(&self) -> &Vector<NodeId> {
        &self.selected_path
    }

    /// Last node of the selected path
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<NodeId> {
        self.selected_path.last().copied()
    }

    /// Add a message under `parent` (or as a new root)
    ///
    /// The id comes from `ids`. With
    /// [`TreeConfig::select_new_nodes`] the selected path follows the new
    /// node when `parent` is on it (or when the node is a new root).
    ///
    /// # Errors
    /// - [`TreeError::UnknownParent`](crate::TreeError::UnknownParent) if
    ///   `parent` is not in the tree
    /// - [`TreeError::DuplicateId`](crate::TreeError::DuplicateId) if the
    ///   generator repeats an id
    pub fn add_node<G: IdGenerator + ?Sized>(
        &self,
        ids: &G,
        role: Role,
        content: impl Into<String>,
        parent: Option<NodeId>,
        attachments: Option<Vec<Attachment>>,
    ) -> Result<AddedNode> {
        let node_id = ids.next_id();
        let store = self.store.create(
            node_id,
            role,
            content.into(),
            parent,
            attachments.map(Attachments::from),
        )?;

        let selected_path = if self.config.select_new_nodes {
            self.path_after_insert(parent, node_id)
        } else {
            self.selected_path.clone()
        };

        tracing::debug!(
            node = %node_id,
            parent = ?parent,
            %role,
            "added node"
        );

        Ok(AddedNode {
            tree: Self {
                store,
                selected_path,
                config: self.config,
            },
            node_id,
        })
    }

    fn path_after_insert(&self, parent: Option<NodeId>, node_id: NodeId) -> Vector<NodeId> {
        let Some(parent) = parent else {
            return im::vector![node_id];
        };
        match self.selected_path.iter().position(|&id| id == parent) {
            Some(position) => {
                let mut path = self.selected_path.take(position + 1);
                path.push_back(node_id);
                path
            }
            None => self.selected_path.clone(),
        }
    }

    /// Replace the content (and optionally the attachments) of `id`
    ///
    /// `attachments = None` keeps the current attachments. Unknown ids and
    /// writes that change nothing return the input tree with
    /// [`Change::Unchanged`].
    pub fn update_node_content(
        &self,
        id: NodeId,
        content: impl Into<String>,
        attachments: Option<Vec<Attachment>>,
    ) -> Mutation {
        let Some(node) = self.store.get(id) else {
            tracing::trace!(node = %id, "update ignored: unknown node");
            return Mutation::unchanged(self.clone());
        };

        let content = content.into();
        let attachments = attachments.map(Attachments::from);
        let same_attachments = attachments
            .as_ref()
            .map_or(true, |new| node.attachments.as_ref() == Some(new));
        if node.content == content && same_attachments {
            return Mutation::unchanged(self.clone());
        }

        match self.store.update_content(id, content, attachments) {
            Some(store) => {
                tracing::trace!(node = %id, "updated node content");
                Mutation::applied(Self {
                    store,
                    selected_path: self.selected_path.clone(),
                    config: self.config,
                })
            }
            None => Mutation::unchanged(self.clone()),
        }
    }

    /// Append `chunk` to the content of `id` (streaming)
    pub fn append_node_content(&self, id: NodeId, chunk: &str) -> Mutation {
        match self.store.get(id) {
            Some(node) if !chunk.is_empty() => {
                let mut content = String::with_capacity(node.content.len() + chunk.len());
                content.push_str(&node.content);
                content.push_str(chunk);
                self.update_node_content(id, content, None)
            }
            _ => Mutation::unchanged(self.clone()),
        }
    }

    /// Position of `id` among its siblings
    #[inline]
    #[must_use]
    pub fn sibling_info(&self, id: NodeId) -> SiblingInfo {
        sibling::sibling_info(&self.store, id)
    }

    /// Sibling `offset` positions away from `id`
    #[inline]
    #[must_use]
    pub fn sibling_at_offset(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        navigation::sibling_at_offset(&self.store, id, offset)
    }

    /// Root-to-leaf path through `id`, descending by the oldest child
    #[inline]
    #[must_use]
    pub fn recompute_path(&self, id: NodeId) -> Vector<NodeId> {
        navigation::recompute_path(&self.store, id)
    }

    /// Select the adjacent alternative of `id`
    ///
    /// Only the selected path changes. Without a sibling in `direction` the
    /// input tree is returned with [`Change::Unchanged`].
    pub fn navigate_sibling(&self, id: NodeId, direction: Direction) -> Mutation {
        let Some(sibling) = self.sibling_at_offset(id, direction.offset()) else {
            return Mutation::unchanged(self.clone());
        };

        tracing::debug!(from = %id, to = %sibling, ?direction, "navigated to sibling");
        self.with_path(self.recompute_path(sibling))
    }

    /// Select the path through `id` (checkout)
    pub fn select_node(&self, id: NodeId) -> Mutation {
        if !self.contains(id) {
            return Mutation::unchanged(self.clone());
        }
        self.with_path(self.recompute_path(id))
    }

    fn with_path(&self, selected_path: Vector<NodeId>) -> Mutation {
        if selected_path == self.selected_path {
            return Mutation::unchanged(self.clone());
        }
        Mutation::applied(Self {
            store: self.store.clone(),
            selected_path,
            config: self.config,
        })
    }

    /// Replace the selected path without checking it against the store
    ///
    /// For restoring a selection held outside the tree. A stale path is
    /// reported by [`flatten`](Self::flatten) and [`validate`](Self::validate).
    #[must_use]
    pub fn with_selected_path_unchecked(&self, path: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            store: self.store.clone(),
            selected_path: path.into_iter().collect(),
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;
    use im::vector;

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    #[test]
    fn add_node_extends_selected_tail() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new();
        let r = tree.add_node(&ids, Role::User, "Hi", None, None).unwrap();
        let a = r
            .tree
            .add_node(&ids, Role::Assistant, "Hello", Some(r.node_id), None)
            .unwrap();

        assert_eq!(a.tree.selected_path(), &vector![id(1), id(2)]);
        assert_eq!(a.tree.leaf(), Some(id(2)));
        assert!(tree.is_empty());
    }

    #[test]
    fn add_node_forks_selection_onto_new_sibling() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "Hi", None, None)
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "Hello", Some(id(1)), None))
            .and_then(|a| a.tree.add_node(&ids, Role::User, "More", Some(id(2)), None))
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "Hi there!", Some(id(1)), None))
            .unwrap()
            .tree;

        assert_eq!(tree.selected_path(), &vector![id(1), id(4)]);
        assert_eq!(tree.children(id(1)), vec![id(2), id(4)]);
    }

    #[test]
    fn add_node_off_path_keeps_selection() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "Hi", None, None)
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "A", Some(id(1)), None))
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "B", Some(id(1)), None))
            .unwrap()
            .tree;
        // path is [1, 3]; node 2 is off-path
        let added = tree
            .add_node(&ids, Role::User, "follow-up on A", Some(id(2)), None)
            .unwrap();
        assert_eq!(added.tree.selected_path(), &vector![id(1), id(3)]);
    }

    #[test]
    fn new_root_is_selected() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "first", None, None)
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "reply", Some(id(1)), None))
            .and_then(|a| a.tree.add_node(&ids, Role::User, "second start", None, None))
            .unwrap()
            .tree;
        assert_eq!(tree.selected_path(), &vector![id(3)]);
        assert_eq!(tree.root_ids(), vec![id(1), id(3)]);
    }

    #[test]
    fn manual_selection_leaves_path_alone() {
        let ids = SequentialIds::new();
        let tree = MessageTree::with_config(TreeConfig::new().with_select_new_nodes(false))
            .add_node(&ids, Role::User, "Hi", None, None)
            .unwrap()
            .tree;
        assert!(tree.selected_path().is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn add_node_unknown_parent_fails() {
        let ids = SequentialIds::new();
        let err = MessageTree::new()
            .add_node(&ids, Role::User, "orphan", Some(id(50)), None)
            .unwrap_err();
        assert_eq!(err, crate::TreeError::UnknownParent(id(50)));
    }

    #[test]
    fn update_same_content_is_unchanged() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "Hi", None, None)
            .unwrap()
            .tree;
        let m = tree.update_node_content(id(1), "Hi", None);
        assert_eq!(m.change, Change::Unchanged);
        assert_eq!(m.tree, tree);
    }

    #[test]
    fn update_replaces_attachments_when_given() {
        let ids = SequentialIds::new();
        let att = Attachment::file("f1", "application/pdf", "paper.pdf", "blob:1");
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "see file", None, None)
            .unwrap()
            .tree;
        let m = tree.update_node_content(id(1), "see file", Some(vec![att.clone()]));
        assert!(m.is_applied());
        assert_eq!(
            m.tree.node(id(1)).and_then(TreeNode::attachments),
            Some(&vector![att])
        );
    }

    #[test]
    fn append_streams_chunks() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::Assistant, "", None, None)
            .unwrap()
            .tree;
        let tree = tree.append_node_content(id(1), "Hel").into_tree();
        let tree = tree.append_node_content(id(1), "lo").into_tree();
        assert_eq!(tree.node(id(1)).map(TreeNode::content), Some("Hello"));

        let m = tree.append_node_content(id(1), "");
        assert_eq!(m.change, Change::Unchanged);
        let m = tree.append_node_content(id(9), "x");
        assert_eq!(m.change, Change::Unchanged);
    }

    #[test]
    fn select_node_checks_out_branch() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "Hi", None, None)
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "A", Some(id(1)), None))
            .and_then(|a| a.tree.add_node(&ids, Role::Assistant, "B", Some(id(1)), None))
            .unwrap()
            .tree;

        let m = tree.select_node(id(2));
        assert!(m.is_applied());
        assert_eq!(m.tree.selected_path(), &vector![id(1), id(2)]);

        let again = m.tree.select_node(id(2));
        assert_eq!(again.change, Change::Unchanged);
        assert_eq!(tree.select_node(id(99)).change, Change::Unchanged);
    }

    #[test]
    fn navigate_without_sibling_is_unchanged() {
        let ids = SequentialIds::new();
        let tree = MessageTree::new()
            .add_node(&ids, Role::User, "Hi", None, None)
            .unwrap()
            .tree;
        let m = tree.navigate_sibling(id(1), Direction::Next);
        assert_eq!(m.change, Change::Unchanged);
        assert_eq!(m.tree, tree);
    }

    #[test]
    fn unchecked_path_is_stored_verbatim() {
        let tree = MessageTree::new().with_selected_path_unchecked([id(5), id(6)]);
        assert_eq!(tree.selected_path(), &vector![id(5), id(6)]);
    }
}
