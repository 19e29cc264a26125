//! Error types for chat sessions

use convtree_core::{NodeId, Role, TreeError};

/// Result alias for session operations
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Underlying tree rejected the operation or is inconsistent
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Operation targets a node the session does not know
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// Operation requires a message of a different author
    #[error("node {id} is a {actual} message, expected {expected}")]
    RoleMismatch {
        /// Target node
        id: NodeId,
        /// Role the operation needs
        expected: Role,
        /// Role the node has
        actual: Role,
    },

    /// Message text exceeds the configured limit
    #[error("message of {size} bytes exceeds limit of {limit} bytes")]
    ContentTooLarge {
        /// Size the message would have
        size: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Empty user message while the config forbids them
    #[error("empty user message")]
    EmptyMessage,

    /// Assistant reply requested without a user message at the tail
    #[error("no user message to reply to")]
    NothingToReplyTo,
}

impl SessionError {
    /// True when the caller sent a bad request; false for tree corruption
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Tree(err) => !err.is_consistency_error(),
            Self::NodeNotFound(_)
            | Self::RoleMismatch { .. }
            | Self::ContentTooLarge { .. }
            | Self::EmptyMessage
            | Self::NothingToReplyTo => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_errors_convert() {
        let id = NodeId::from_u128(3);
        let err: SessionError = TreeError::UnknownParent(id).into();
        assert!(matches!(err, SessionError::Tree(TreeError::UnknownParent(_))));
        assert!(err.is_user_error());
    }

    #[test]
    fn consistency_errors_are_not_user_errors() {
        let err = SessionError::from(TreeError::PathOutOfSync {
            id: NodeId::from_u128(1),
            position: 0,
        });
        assert!(!err.is_user_error());
    }

    #[test]
    fn role_mismatch_message() {
        let err = SessionError::RoleMismatch {
            id: NodeId::from_u128(1),
            expected: Role::Assistant,
            actual: Role::User,
        };
        assert!(err.to_string().contains("is a user message, expected assistant"));
    }
}
