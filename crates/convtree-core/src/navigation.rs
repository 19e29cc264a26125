//! Path navigation
//!
//! Sibling stepping and selected-path reconstruction.
//!
//! # Descent rule
//!
//! After jumping to a node, the visible transcript must continue somewhere
//! below it. [`DESCENT_POLICY`] decides which child is followed at each
//! level; it is part of the observable contract, since it determines what
//! the user sees after every fork navigation.

use crate::id::NodeId;
use crate::store::{NodeStore, Slot};
use im::Vector;
use serde::{Deserialize, Serialize};

/// Which child the path follows when descending past a fork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescentPolicy {
    /// Always the first (oldest) child
    OldestChild,
}

impl DescentPolicy {
    /// Child to follow out of `children` (creation-ordered)
    #[inline]
    pub(crate) fn pick(self, children: &Vector<Slot>) -> Option<Slot> {
        match self {
            Self::OldestChild => children.front().copied(),
        }
    }
}

/// Descent rule used by [`recompute_path`]
pub const DESCENT_POLICY: DescentPolicy = DescentPolicy::OldestChild;

/// Step direction between sibling alternatives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards older alternatives (offset -1)
    Previous,
    /// Towards newer alternatives (offset +1)
    Next,
}

impl Direction {
    /// Relative sibling offset
    #[inline]
    #[must_use]
    pub const fn offset(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Sibling `offset` positions away from `id`
///
/// `None` when `id` is unknown or the target falls outside the sibling
/// sequence (e.g. "next" on the newest alternative).
#[must_use]
pub fn sibling_at_offset(store: &NodeStore, id: NodeId, offset: isize) -> Option<NodeId> {
    let slot = store.slot_of(id)?;
    let siblings = store.siblings_of(slot)?;
    let position = siblings.iter().position(|&s| s == slot)?;

    let target = position.checked_add_signed(offset)?;
    siblings.get(target).and_then(|&s| store.id_at(s))
}

/// Root-to-leaf path through `id`
///
/// Ancestors of `id` come first (root-first), then the path continues
/// downward following [`DESCENT_POLICY`] until a leaf. Unknown ids yield an
/// empty path.
#[must_use]
pub fn recompute_path(store: &NodeStore, id: NodeId) -> Vector<NodeId> {
    let Some(start) = store.slot_of(id) else {
        return Vector::new();
    };

    // Parent slots are strictly lower than child slots, so both walks terminate.
    let mut path = Vector::new();
    let mut cursor = Some(start);
    while let Some(slot) = cursor {
        let Some(node) = store.node_at(slot) else {
            break;
        };
        path.push_front(node.id());
        cursor = node.parent;
    }

    let mut cursor = store.node_at(start);
    while let Some(node) = cursor {
        let Some(next) = DESCENT_POLICY.pick(&node.children) else {
            break;
        };
        cursor = store.node_at(next);
        if let Some(child) = cursor {
            path.push_back(child.id());
        }
    }

    tracing::trace!(from = %id, len = path.len(), "recomputed selected path");
    path
}
