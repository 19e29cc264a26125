//! Path projection
//!
//! Turns the selected path into the linear, render-ready transcript.

use crate::error::{Result, TreeError};
use crate::id::NodeId;
use crate::node::{Attachments, Role, TreeNode};
use crate::sibling::SiblingInfo;
use crate::tree::MessageTree;
use serde::{Deserialize, Serialize};

/// Render-ready view of one message on the selected path
///
/// Derived on demand; never stored in the tree. `sibling_index` and
/// `sibling_count` drive the "previous/next alternative" controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Node identity
    pub id: NodeId,
    /// Author
    pub role: Role,
    /// Message text (may contain markdown)
    pub content: String,
    /// 0-based position among alternatives
    pub sibling_index: usize,
    /// Number of alternatives at this position
    pub sibling_count: usize,
    /// Attachments, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Attachments>,
    #[serde(skip)]
    placeholder: bool,
}

impl ChatMessage {
    fn from_node(node: &TreeNode, siblings: SiblingInfo) -> Self {
        Self {
            id: node.id(),
            role: node.role(),
            content: node.content().to_string(),
            sibling_index: siblings.index,
            sibling_count: siblings.count,
            attachments: node.attachments().cloned(),
            placeholder: false,
        }
    }

    fn placeholder(id: NodeId) -> Self {
        Self {
            id,
            role: Role::User,
            content: String::new(),
            sibling_index: SiblingInfo::DETACHED.index,
            sibling_count: SiblingInfo::DETACHED.count,
            attachments: None,
            placeholder: true,
        }
    }

    /// Sibling metadata as a pair
    #[inline]
    #[must_use]
    pub fn siblings(&self) -> SiblingInfo {
        SiblingInfo {
            index: self.sibling_index,
            count: self.sibling_count,
        }
    }

    /// True for stand-ins produced by [`flatten_lossy`] for missing nodes
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Project the selected path into chat messages
///
/// # Errors
/// [`TreeError::PathOutOfSync`] for the first path entry missing from the
/// store.
pub fn flatten(tree: &MessageTree) -> Result<Vec<ChatMessage>> {
    tree.selected_path()
        .iter()
        .enumerate()
        .map(|(position, &id)| {
            tree.node(id)
                .map(|node| ChatMessage::from_node(node, tree.sibling_info(id)))
                .ok_or(TreeError::PathOutOfSync { id, position })
        })
        .collect()
}

/// Project the selected path, substituting placeholders for missing nodes
///
/// Missing entries become empty user messages with default sibling info
/// (see [`ChatMessage::is_placeholder`]) and are logged at `warn`.
#[must_use]
pub fn flatten_lossy(tree: &MessageTree) -> Vec<ChatMessage> {
    tree.selected_path()
        .iter()
        .enumerate()
        .map(|(position, &id)| match tree.node(id) {
            Some(node) => ChatMessage::from_node(node, tree.sibling_info(id)),
            None => {
                tracing::warn!(node = %id, position, "selected path references a missing node");
                ChatMessage::placeholder(id)
            }
        })
        .collect()
}

impl MessageTree {
    /// See [`flatten`]
    ///
    /// # Errors
    /// [`TreeError::PathOutOfSync`] if the selected path is stale.
    #[inline]
    pub fn flatten(&self) -> Result<Vec<ChatMessage>> {
        flatten(self)
    }

    /// See [`flatten_lossy`]
    #[inline]
    #[must_use]
    pub fn flatten_lossy(&self) -> Vec<ChatMessage> {
        flatten_lossy(self)
    }
}
