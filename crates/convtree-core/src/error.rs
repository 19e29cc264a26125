//! Error types for the message tree
//!
//! Lookups, navigation and content updates never fail: unknown ids degrade
//! to neutral values. Errors are reserved for requests that would corrupt
//! the tree and for detected inconsistencies.

use crate::id::NodeId;
use std::fmt::{self, Display, Formatter};

/// Result alias for tree operations
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Tree errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// New node references a parent the store does not contain
    #[error("parent node {0} does not exist")]
    UnknownParent(NodeId),

    /// Id generator returned an identity that is already in use
    #[error("node id {0} is already in use")]
    DuplicateId(NodeId),

    /// Selected path names a node the store does not contain
    #[error("selected path is out of sync: node {id} at position {position} is missing")]
    PathOutOfSync {
        /// Missing identity
        id: NodeId,
        /// Index of the identity within the selected path
        position: usize,
    },

    /// Structural check failed
    #[error("tree invariant violated ({invariant}): {detail}")]
    InvariantViolation {
        /// Which structural rule broke
        invariant: Invariant,
        /// Human-readable description of the offending nodes
        detail: String,
    },
}

impl TreeError {
    /// True for errors that indicate a corrupted tree value rather than a
    /// rejected request
    #[inline]
    #[must_use]
    pub fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            Self::PathOutOfSync { .. } | Self::InvariantViolation { .. }
        )
    }

    pub(crate) fn violation(invariant: Invariant, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            invariant,
            detail: detail.into(),
        }
    }
}

/// Structural rules checked by [`MessageTree::validate`](crate::MessageTree::validate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// Identity index and arena agree on every node
    IndexConsistent,
    /// Every child records its owner as parent
    ChildBacklink,
    /// No child appears twice in one child list
    UniqueChildren,
    /// Root list holds exactly the parentless nodes, once each
    RootsParentless,
    /// Selected path starts at a root and follows child links
    PathContiguous,
}

impl Display for Invariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IndexConsistent => "index-consistent",
            Self::ChildBacklink => "child-backlink",
            Self::UniqueChildren => "unique-children",
            Self::RootsParentless => "roots-parentless",
            Self::PathContiguous => "path-contiguous",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_classification() {
        let missing = TreeError::PathOutOfSync {
            id: NodeId::from_u128(1),
            position: 0,
        };
        assert!(missing.is_consistency_error());
        assert!(!TreeError::UnknownParent(NodeId::from_u128(1)).is_consistency_error());
        assert!(TreeError::violation(Invariant::ChildBacklink, "x").is_consistency_error());
    }

    #[test]
    fn error_messages_name_the_node() {
        let id = NodeId::from_u128(7);
        let msg = TreeError::UnknownParent(id).to_string();
        assert!(msg.contains(&id.to_string()));

        let msg = TreeError::violation(Invariant::PathContiguous, "gap at 2").to_string();
        assert_eq!(msg, "tree invariant violated (path-contiguous): gap at 2");
    }
}
