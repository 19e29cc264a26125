//! Tree configuration

use serde::{Deserialize, Serialize};

/// Behavior switches for a [`MessageTree`](crate::MessageTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Move the selected path onto nodes added under it
    ///
    /// When set, adding a child of the path's tail extends the path, adding
    /// a child of an earlier path node forks the path onto the new node, and
    /// adding a root selects that root. Nodes added under unselected
    /// branches never move the selection.
    pub select_new_nodes: bool,
}

impl TreeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With new-node selection on or off
    #[inline]
    #[must_use]
    pub fn with_select_new_nodes(mut self, enabled: bool) -> Self {
        self.select_new_nodes = enabled;
        self
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            select_new_nodes: true,
        }
    }
}
