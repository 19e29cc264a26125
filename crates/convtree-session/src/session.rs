//! Chat session
//!
//! [`ChatSession`] owns exactly one live [`MessageTree`] and swaps in the
//! new value after every mutation. It translates chat-level actions (send,
//! stream, regenerate, edit, switch alternative) into tree mutations.

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use convtree_core::{
    AddedNode, Attachment, Change, ChatMessage, Direction, IdGenerator, MessageTree, Mutation,
    NodeId, Role, TreeNode, UuidGenerator,
};
use std::sync::Arc;

/// A conversation with branching history
///
/// Methods take `&mut self`, so updates to one session (including streamed
/// chunks) are serialized by construction.
#[derive(Debug, Clone)]
pub struct ChatSession {
    tree: MessageTree,
    config: SessionConfig,
    ids: Arc<dyn IdGenerator>,
}

impl ChatSession {
    /// New empty session minting random ids
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_id_generator(config, Arc::new(UuidGenerator))
    }

    /// New empty session with an explicit id source
    #[must_use]
    pub fn with_id_generator(config: SessionConfig, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            tree: MessageTree::with_config(config.tree),
            config,
            ids,
        }
    }

    /// Resume from an existing tree
    ///
    /// # Errors
    /// [`SessionError::Tree`] if `tree` fails validation.
    pub fn from_tree(
        tree: MessageTree,
        config: SessionConfig,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        tree.validate()?;
        Ok(Self { tree, config, ids })
    }

    /// Current tree value
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &MessageTree {
        &self.tree
    }

    /// Give up the session, keep the tree
    #[inline]
    #[must_use]
    pub fn into_tree(self) -> MessageTree {
        self.tree
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Last message of the visible transcript
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<NodeId> {
        self.tree.leaf()
    }

    /// Start over with an empty tree
    pub fn reset(&mut self) {
        tracing::info!(dropped = self.tree.len(), "session reset");
        self.tree = MessageTree::with_config(self.config.tree);
    }

    /// Visible transcript
    ///
    /// # Errors
    /// [`SessionError::Tree`] if the selected path is out of sync with the
    /// node store.
    pub fn messages(&self) -> Result<Vec<ChatMessage>> {
        Ok(self.tree.flatten()?)
    }

    /// Append a user message to the visible transcript
    ///
    /// # Errors
    /// - [`SessionError::EmptyMessage`] for blank text without attachments,
    ///   unless allowed by config
    /// - [`SessionError::ContentTooLarge`] over the size limit
    pub fn send_user_message(
        &mut self,
        content: impl Into<String>,
        attachments: Option<Vec<Attachment>>,
    ) -> Result<NodeId> {
        let content = content.into();
        self.check_size(content.len())?;

        let has_attachments = attachments.as_ref().is_some_and(|a| !a.is_empty());
        if content.trim().is_empty() && !has_attachments && !self.config.allow_empty_user_messages {
            return Err(SessionError::EmptyMessage);
        }

        let parent = self.tree.leaf();
        let added = self
            .tree
            .add_node(&*self.ids, Role::User, content, parent, attachments)?;
        let id = self.adopt(added);

        tracing::info!(node = %id, "user message sent");
        Ok(id)
    }

    /// Open an empty assistant message under the trailing user message
    ///
    /// The transport then streams into it with [`append_chunk`](Self::append_chunk).
    ///
    /// # Errors
    /// [`SessionError::NothingToReplyTo`] unless the transcript ends with a
    /// user message.
    pub fn begin_assistant_reply(&mut self) -> Result<NodeId> {
        let tail = self
            .leaf()
            .and_then(|id| self.tree.node(id))
            .filter(|node| node.role() == Role::User)
            .map(TreeNode::id)
            .ok_or(SessionError::NothingToReplyTo)?;

        let added = self
            .tree
            .add_node(&*self.ids, Role::Assistant, "", Some(tail), None)?;
        let id = self.adopt(added);

        tracing::debug!(node = %id, parent = %tail, "assistant reply opened");
        Ok(id)
    }

    /// Append a streamed chunk to `id`
    ///
    /// Unknown ids are ignored ([`Change::Unchanged`]); an aborted stream
    /// simply stops calling this and keeps the partial text.
    ///
    /// # Errors
    /// [`SessionError::ContentTooLarge`] if the chunk would exceed the limit.
    pub fn append_chunk(&mut self, id: NodeId, chunk: &str) -> Result<Change> {
        let Some(node) = self.tree.node(id) else {
            return Ok(Change::Unchanged);
        };
        self.check_size(node.content().len() + chunk.len())?;

        let mutation = self.tree.append_node_content(id, chunk);
        Ok(self.commit(mutation))
    }

    /// Replace the text (and optionally the attachments) of `id`
    ///
    /// # Errors
    /// [`SessionError::ContentTooLarge`] over the size limit.
    pub fn replace_content(
        &mut self,
        id: NodeId,
        content: impl Into<String>,
        attachments: Option<Vec<Attachment>>,
    ) -> Result<Change> {
        let content = content.into();
        self.check_size(content.len())?;

        let mutation = self.tree.update_node_content(id, content, attachments);
        Ok(self.commit(mutation))
    }

    /// Fork a fresh, empty alternative to assistant message `id`
    ///
    /// The new alternative is appended after the existing ones and selected.
    ///
    /// # Errors
    /// - [`SessionError::NodeNotFound`] for unknown ids
    /// - [`SessionError::RoleMismatch`] if `id` is not an assistant message
    pub fn regenerate(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.expect_role(id, Role::Assistant)?;
        let parent = self.tree.parent(node.id());

        let added = self
            .tree
            .add_node(&*self.ids, Role::Assistant, "", parent, None)?;
        let new_id = self.adopt(added);

        tracing::info!(node = %new_id, replaces = %id, "regenerating reply");
        Ok(new_id)
    }

    /// Fork an edited copy of user message `id`
    ///
    /// The original stays reachable as a sibling. `attachments = None`
    /// carries over the original's attachments.
    ///
    /// # Errors
    /// - [`SessionError::NodeNotFound`] for unknown ids
    /// - [`SessionError::RoleMismatch`] if `id` is not a user message
    /// - [`SessionError::ContentTooLarge`] over the size limit
    pub fn edit_user_message(
        &mut self,
        id: NodeId,
        content: impl Into<String>,
        attachments: Option<Vec<Attachment>>,
    ) -> Result<NodeId> {
        let content = content.into();
        self.check_size(content.len())?;

        let node = self.expect_role(id, Role::User)?;
        let attachments = attachments
            .or_else(|| node.attachments().map(|atts| atts.iter().cloned().collect()));
        let parent = self.tree.parent(node.id());

        let added = self
            .tree
            .add_node(&*self.ids, Role::User, content, parent, attachments)?;
        let new_id = self.adopt(added);

        tracing::info!(node = %new_id, edits = %id, "user message edited");
        Ok(new_id)
    }

    /// Show the adjacent alternative of `id`
    pub fn navigate(&mut self, id: NodeId, direction: Direction) -> Change {
        let mutation = self.tree.navigate_sibling(id, direction);
        self.commit(mutation)
    }

    /// Show the branch through `id`
    pub fn select(&mut self, id: NodeId) -> Change {
        let mutation = self.tree.select_node(id);
        self.commit(mutation)
    }

    fn adopt(&mut self, added: AddedNode) -> NodeId {
        let AddedNode { tree, node_id } = added;
        let selected = tree.select_node(node_id);
        self.tree = selected.tree;
        node_id
    }

    fn commit(&mut self, mutation: Mutation) -> Change {
        let Mutation { tree, change } = mutation;
        if change.is_applied() {
            self.tree = tree;
        }
        change
    }

    fn expect_role(&self, id: NodeId, expected: Role) -> Result<&TreeNode> {
        let node = self.tree.node(id).ok_or(SessionError::NodeNotFound(id))?;
        if node.role() == expected {
            Ok(node)
        } else {
            Err(SessionError::RoleMismatch {
                id,
                expected,
                actual: node.role(),
            })
        }
    }

    fn check_size(&self, size: usize) -> Result<()> {
        let limit = self.config.max_message_bytes;
        if size > limit {
            tracing::warn!(size, limit, "message rejected: too large");
            return Err(SessionError::ContentTooLarge { size, limit });
        }
        Ok(())
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convtree_core::SequentialIds;

    fn session() -> ChatSession {
        ChatSession::with_id_generator(SessionConfig::new(), Arc::new(SequentialIds::new()))
    }

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    #[test]
    fn send_then_reply_builds_linear_transcript() {
        let mut s = session();
        let user = s.send_user_message("Hi", None).unwrap();
        let reply = s.begin_assistant_reply().unwrap();
        s.append_chunk(reply, "Hel").unwrap();
        s.append_chunk(reply, "lo").unwrap();

        let messages = s.messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, user);
        assert_eq!(messages[1].content, "Hello");
    }

    #[test]
    fn reply_requires_trailing_user_message() {
        let mut s = session();
        assert_eq!(s.begin_assistant_reply(), Err(SessionError::NothingToReplyTo));

        s.send_user_message("Hi", None).unwrap();
        s.begin_assistant_reply().unwrap();
        assert_eq!(s.begin_assistant_reply(), Err(SessionError::NothingToReplyTo));
    }

    #[test]
    fn empty_user_message_rejected_by_default() {
        let mut s = session();
        assert_eq!(s.send_user_message("   ", None), Err(SessionError::EmptyMessage));

        let att = Attachment::image("i", "image/png", "x.png", "data:");
        assert!(s.send_user_message("", Some(vec![att])).is_ok());
    }

    #[test]
    fn size_limit_applies_to_streamed_content() {
        let mut s = ChatSession::with_id_generator(
            SessionConfig::new().with_max_message_bytes(5),
            Arc::new(SequentialIds::new()),
        );
        s.send_user_message("Hi", None).unwrap();
        let reply = s.begin_assistant_reply().unwrap();
        s.append_chunk(reply, "abc").unwrap();

        let err = s.append_chunk(reply, "def").unwrap_err();
        assert_eq!(err, SessionError::ContentTooLarge { size: 6, limit: 5 });
        assert_eq!(s.tree().node(reply).map(TreeNode::content), Some("abc"));
    }

    #[test]
    fn chunk_for_unknown_node_is_ignored() {
        let mut s = session();
        assert_eq!(s.append_chunk(id(77), "x"), Ok(Change::Unchanged));
    }

    #[test]
    fn regenerate_checks_role() {
        let mut s = session();
        let user = s.send_user_message("Hi", None).unwrap();
        assert!(matches!(
            s.regenerate(user),
            Err(SessionError::RoleMismatch { expected: Role::Assistant, .. })
        ));
        assert_eq!(s.regenerate(id(99)), Err(SessionError::NodeNotFound(id(99))));
    }

    #[test]
    fn reset_clears_tree_but_keeps_config() {
        let mut s = session();
        s.send_user_message("Hi", None).unwrap();
        s.reset();
        assert!(s.tree().is_empty());
        assert_eq!(s.leaf(), None);
        assert_eq!(s.config().max_message_bytes, SessionConfig::default().max_message_bytes);
    }
}
