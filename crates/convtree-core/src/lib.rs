//! convtree Core
//!
//! Branching conversation trees: every turn may hold several alternative
//! messages (regenerations, edits), and exactly one root-to-leaf path is
//! selected for display.
//!
//! # Core Concepts
//!
//! - [`MessageTree`]: immutable, copy-on-write aggregate of nodes, roots and
//!   the selected path
//! - [`NodeStore`]: append-only arena of [`TreeNode`]s indexed by [`NodeId`]
//! - [`IdGenerator`]: injected source of node identities
//! - [`SiblingInfo`]: a node's position among its alternatives
//! - [`ChatMessage`]: render-ready projection of the selected path
//!
//! # Example
//!
//! ```rust
//! use convtree_core::{Direction, MessageTree, Role, SequentialIds};
//!
//! let ids = SequentialIds::new();
//! let tree = MessageTree::new();
//!
//! let hi = tree.add_node(&ids, Role::User, "Hi", None, None)?;
//! let first = hi.tree.add_node(&ids, Role::Assistant, "Hello", Some(hi.node_id), None)?;
//! let second = first.tree.add_node(&ids, Role::Assistant, "Hi there!", Some(hi.node_id), None)?;
//!
//! let tree = second.tree;
//! assert_eq!(tree.sibling_info(second.node_id).index, 1);
//!
//! let back = tree.navigate_sibling(second.node_id, Direction::Previous).tree;
//! assert_eq!(back.leaf(), Some(first.node_id));
//!
//! let transcript = back.flatten()?;
//! assert_eq!(transcript[1].content, "Hello");
//! assert_eq!(transcript[1].sibling_count, 2);
//! # Ok::<(), convtree_core::TreeError>(())
//! ```

#![warn(unreachable_pub)]

// Core modules
mod config;
mod error;
mod id;
mod invariants;
mod node;
mod sibling;
mod store;
mod tree;

pub mod navigation;
pub mod projection;

// Re-exports
pub use config::TreeConfig;
pub use error::{Invariant, Result, TreeError};
pub use id::{IdGenerator, NodeId, SequentialIds, UuidGenerator};
pub use navigation::{DescentPolicy, Direction, DESCENT_POLICY};
pub use node::{Attachment, AttachmentKind, Attachments, Role, TreeNode};
pub use projection::{flatten, flatten_lossy, ChatMessage};
pub use sibling::{sibling_info, SiblingInfo};
pub use store::NodeStore;
pub use tree::{AddedNode, Change, MessageTree, Mutation};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with message trees
    pub use crate::{
        Attachment, ChatMessage, Direction, IdGenerator, MessageTree, NodeId, Role, SiblingInfo,
        TreeConfig, TreeError, UuidGenerator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
