//! Node store
//!
//! Append-only arena of [`TreeNode`]s addressed by stable `Slot` handles,
//! with an identity index on top. Every collection is an `im` persistent
//! structure, so "copying" a store is O(1) and a write only replaces the
//! touched node, its parent entry, and the index path leading to them.

use crate::error::{Result, TreeError};
use crate::id::NodeId;
use crate::node::{Attachments, Role, TreeNode};
use im::{HashMap, Vector};

/// Arena handle of a node
///
/// Slots are assigned in creation order and never reused, so a parent's
/// slot is always lower than any of its children's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Slot(pub(crate) usize);

impl Slot {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Copy-on-write arena of message nodes
///
/// Nodes are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStore {
    arena: Vector<TreeNode>,
    index: HashMap<NodeId, Slot>,
    roots: Vector<Slot>,
}

impl NodeStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when no node was ever created
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Whether `id` names a node in this store
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Point lookup by identity
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.slot_of(id).and_then(|slot| self.node_at(slot))
    }

    /// All nodes in creation order
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.arena.iter()
    }

    /// Root identities in creation order
    pub fn root_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().filter_map(|&slot| self.id_at(slot))
    }

    /// Parent identity of `id` (`None` for roots and unknown ids)
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent?;
        self.id_at(parent)
    }

    /// Child identities of `id` in creation order (empty for unknown ids)
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&slot| self.id_at(slot))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Insert a fresh node under `parent` (or as a new root)
    ///
    /// Returns the new store; `self` is left untouched.
    ///
    /// # Errors
    /// - [`TreeError::DuplicateId`] if `id` is already taken
    /// - [`TreeError::UnknownParent`] if `parent` is not in the store
    pub fn create(
        &self,
        id: NodeId,
        role: Role,
        content: String,
        parent: Option<NodeId>,
        attachments: Option<Attachments>,
    ) -> Result<Self> {
        if self.contains(id) {
            return Err(TreeError::DuplicateId(id));
        }

        let parent_slot = match parent {
            Some(parent_id) => Some(
                self.slot_of(parent_id)
                    .ok_or(TreeError::UnknownParent(parent_id))?,
            ),
            None => None,
        };

        let slot = Slot(self.arena.len());
        let mut next = self.clone();
        next.arena
            .push_back(TreeNode::new(id, role, content, parent_slot, attachments));
        next.index.insert(id, slot);

        match parent_slot {
            Some(parent_slot) => {
                if let Some(parent_node) = next.arena.get_mut(parent_slot.index()) {
                    parent_node.children.push_back(slot);
                }
            }
            None => next.roots.push_back(slot),
        }

        Ok(next)
    }

    /// Replace the mutable fields of `id`
    ///
    /// `attachments = None` keeps the current attachments. Returns `None`
    /// when `id` is unknown.
    #[must_use]
    pub fn update_content(
        &self,
        id: NodeId,
        content: String,
        attachments: Option<Attachments>,
    ) -> Option<Self> {
        let slot = self.slot_of(id)?;
        let mut next = self.clone();
        let node = next.arena.get_mut(slot.index())?;
        node.content = content;
        if attachments.is_some() {
            node.attachments = attachments;
        }
        Some(next)
    }

    #[inline]
    pub(crate) fn slot_of(&self, id: NodeId) -> Option<Slot> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub(crate) fn node_at(&self, slot: Slot) -> Option<&TreeNode> {
        self.arena.get(slot.index())
    }

    #[inline]
    pub(crate) fn id_at(&self, slot: Slot) -> Option<NodeId> {
        self.node_at(slot).map(TreeNode::id)
    }

    #[inline]
    pub(crate) fn root_slots(&self) -> &Vector<Slot> {
        &self.roots
    }

    /// Sibling sequence `slot` belongs to: the root list for roots, the
    /// parent's child list otherwise
    pub(crate) fn siblings_of(&self, slot: Slot) -> Option<&Vector<Slot>> {
        let node = self.node_at(slot)?;
        match node.parent {
            None => Some(&self.roots),
            Some(parent) => self.node_at(parent).map(|p| &p.children),
        }
    }
}
