//! Message nodes
//!
//! [`TreeNode`] is a single message inside a [`MessageTree`](crate::MessageTree).
//! Structural links (parent, children) are arena handles owned by the store;
//! resolve them through the tree rather than the node.

use crate::id::NodeId;
use crate::store::Slot;
use im::Vector;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human turn
    User,
    /// Model turn
    Assistant,
}

impl Role {
    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of attached payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Inline-renderable image
    Image,
    /// Any other file (PDF, text, ...)
    File,
}

/// Opaque binary reference attached to a message
///
/// The tree never inspects the payload; `data_url` is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment identifier (assigned by the uploader)
    pub id: String,
    /// Payload kind
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// MIME type of the payload
    pub mime_type: String,
    /// Display name
    pub name: String,
    /// Payload reference (data URL or external handle)
    pub data_url: String,
}

impl Attachment {
    /// Create an attachment record
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: AttachmentKind,
        mime_type: impl Into<String>,
        name: impl Into<String>,
        data_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            mime_type: mime_type.into(),
            name: name.into(),
            data_url: data_url.into(),
        }
    }

    /// Image attachment shorthand
    #[must_use]
    pub fn image(
        id: impl Into<String>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
        data_url: impl Into<String>,
    ) -> Self {
        Self::new(id, AttachmentKind::Image, mime_type, name, data_url)
    }

    /// Generic file attachment shorthand
    #[must_use]
    pub fn file(
        id: impl Into<String>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
        data_url: impl Into<String>,
    ) -> Self {
        Self::new(id, AttachmentKind::File, mime_type, name, data_url)
    }
}

/// Attachment list shared between tree versions
pub type Attachments = Vector<Attachment>;

/// A single message in the tree
///
/// # Invariants
/// - `id` never changes after creation
/// - `parent` slot is always lower than the node's own slot
/// - `children` is in creation order, without duplicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub(crate) id: NodeId,
    pub(crate) role: Role,
    pub(crate) content: String,
    pub(crate) parent: Option<Slot>,
    pub(crate) children: Vector<Slot>,
    pub(crate) attachments: Option<Attachments>,
}

impl TreeNode {
    pub(crate) fn new(
        id: NodeId,
        role: Role,
        content: String,
        parent: Option<Slot>,
        attachments: Option<Attachments>,
    ) -> Self {
        Self {
            id,
            role,
            content,
            parent,
            children: Vector::new(),
            attachments,
        }
    }

    /// Node identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Message author
    #[inline]
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current message text
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Attachments, if any were ever set
    #[inline]
    #[must_use]
    pub fn attachments(&self) -> Option<&Attachments> {
        self.attachments.as_ref()
    }

    /// True for conversation-starting nodes
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True when no alternative or follow-up hangs below this node
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children (alternatives at the next turn)
    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
