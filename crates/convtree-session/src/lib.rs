//! convtree Session - conversation controller
//!
//! Owns one live [`MessageTree`](convtree_core::MessageTree) per
//! conversation and maps chat actions onto tree mutations:
//! - Sending user messages and opening assistant replies
//! - Streaming assistant text chunk by chunk
//! - Regenerating replies and editing user messages as forks
//! - Switching between alternatives
//!
//! # Example
//!
//! ```rust
//! use convtree_session::{ChatSession, SessionConfig};
//! use convtree_core::Direction;
//!
//! # fn main() -> Result<(), convtree_session::SessionError> {
//! let mut session = ChatSession::new(SessionConfig::new());
//!
//! session.send_user_message("Hi", None)?;
//! let first = session.begin_assistant_reply()?;
//! session.append_chunk(first, "Hello")?;
//!
//! let second = session.regenerate(first)?;
//! session.append_chunk(second, "Hi there!")?;
//!
//! let messages = session.messages()?;
//! assert_eq!(messages[1].content, "Hi there!");
//! assert_eq!((messages[1].sibling_index, messages[1].sibling_count), (1, 2));
//!
//! session.navigate(second, Direction::Previous);
//! assert_eq!(session.messages()?[1].content, "Hello");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use config::{SessionConfig, DEFAULT_MAX_MESSAGE_BYTES};
pub use error::{Result, SessionError};
pub use session::ChatSession;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a chat session
    pub use crate::{ChatSession, SessionConfig, SessionError};
    pub use convtree_core::{Attachment, ChatMessage, Direction, NodeId, Role};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
