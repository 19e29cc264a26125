//! Sibling resolution
//!
//! Siblings are nodes sharing a parent; roots are siblings of each other.

use crate::id::NodeId;
use crate::store::NodeStore;
use serde::{Deserialize, Serialize};

/// Position of a node among its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiblingInfo {
    /// 0-based position in the sibling sequence
    pub index: usize,
    /// Length of the sibling sequence (always >= 1)
    pub count: usize,
}

impl SiblingInfo {
    /// Value reported for ids the store cannot resolve: a lone node
    pub const DETACHED: Self = Self { index: 0, count: 1 };

    /// True when alternatives exist at this position
    #[inline]
    #[must_use]
    pub fn has_alternatives(&self) -> bool {
        self.count > 1
    }

    /// True when a previous alternative exists
    #[inline]
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    /// True when a next alternative exists
    #[inline]
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.count
    }
}

impl Default for SiblingInfo {
    fn default() -> Self {
        Self::DETACHED
    }
}

/// Ordinal position and sibling count of `id`
///
/// Unknown ids resolve to [`SiblingInfo::DETACHED`] so a renderer holding a
/// stale reference never fails.
#[must_use]
pub fn sibling_info(store: &NodeStore, id: NodeId) -> SiblingInfo {
    let Some(slot) = store.slot_of(id) else {
        return SiblingInfo::DETACHED;
    };
    let Some(siblings) = store.siblings_of(slot) else {
        return SiblingInfo::DETACHED;
    };

    SiblingInfo {
        index: siblings.iter().position(|&s| s == slot).unwrap_or(0),
        count: siblings.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Role;

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn forked_store() -> NodeStore {
        NodeStore::new()
            .create(id(1), Role::User, "Hi".into(), None, None)
            .and_then(|s| s.create(id(2), Role::Assistant, "Hello".into(), Some(id(1)), None))
            .and_then(|s| s.create(id(3), Role::Assistant, "Hi there!".into(), Some(id(1)), None))
            .and_then(|s| s.create(id(4), Role::User, "Other start".into(), None, None))
            .unwrap()
    }

    #[test]
    fn child_siblings_come_from_parent() {
        let store = forked_store();
        assert_eq!(sibling_info(&store, id(2)), SiblingInfo { index: 0, count: 2 });
        assert_eq!(sibling_info(&store, id(3)), SiblingInfo { index: 1, count: 2 });
    }

    #[test]
    fn root_siblings_are_roots() {
        let store = forked_store();
        assert_eq!(sibling_info(&store, id(1)), SiblingInfo { index: 0, count: 2 });
        assert_eq!(sibling_info(&store, id(4)), SiblingInfo { index: 1, count: 2 });
    }

    #[test]
    fn unknown_id_is_detached() {
        let store = forked_store();
        assert_eq!(sibling_info(&store, id(99)), SiblingInfo::DETACHED);
        assert_eq!(SiblingInfo::default(), SiblingInfo { index: 0, count: 1 });
    }

    #[test]
    fn navigation_hints() {
        let first = SiblingInfo { index: 0, count: 2 };
        let last = SiblingInfo { index: 1, count: 2 };
        assert!(first.has_alternatives());
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert!(!SiblingInfo::DETACHED.has_alternatives());
    }
}
