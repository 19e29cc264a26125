//! Session configuration

use convtree_core::TreeConfig;
use serde::{Deserialize, Serialize};

/// Default per-message size limit (1 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Chat session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Configuration of the owned tree
    pub tree: TreeConfig,
    /// Maximum message size in bytes, checked on every write
    pub max_message_bytes: usize,
    /// Whether empty user messages are accepted
    pub allow_empty_user_messages: bool,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With tree configuration
    #[inline]
    #[must_use]
    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// With message size limit
    #[inline]
    #[must_use]
    pub fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    /// With empty user messages allowed or rejected
    #[inline]
    #[must_use]
    pub fn with_empty_user_messages(mut self, allowed: bool) -> Self {
        self.allow_empty_user_messages = allowed;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            allow_empty_user_messages: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SessionConfig::new()
            .with_max_message_bytes(16)
            .with_empty_user_messages(true);
        assert_eq!(config.max_message_bytes, 16);
        assert!(config.allow_empty_user_messages);
        assert!(config.tree.select_new_nodes);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"max_message_bytes": 2048}"#).unwrap();
        assert_eq!(config.max_message_bytes, 2048);
        assert!(!config.allow_empty_user_messages);
        assert_eq!(config.tree, TreeConfig::default());
    }
}
