//! Node identities and id generation
//!
//! Provides [`NodeId`], the opaque identity of a message node, and the
//! [`IdGenerator`] capability that mints them. Trees never create ids on
//! their own: callers inject a generator so tests can run deterministically
//! and concurrent sessions can share a collision-resistant source.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Opaque, globally unique node identity
///
/// Immutable once assigned. Displayed as a hyphenated UUID.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Wrap an existing UUID
    #[inline]
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Build an id from a raw 128-bit value
    ///
    /// Mostly useful for fixtures that need predictable ids.
    #[inline]
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Underlying UUID
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Last 8 hex characters, for log lines
    ///
    /// Taken from the low end so counter-backed ids stay distinguishable.
    #[must_use]
    pub fn short(&self) -> String {
        let mut buf = Uuid::encode_buffer();
        let simple = self.0.simple().encode_lower(&mut buf);
        simple[simple.len() - 8..].to_string()
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Source of fresh node identities
///
/// # Contract
/// - Every call returns an id never returned before by this generator
/// - Ids from independent generators must not collide in practice
pub trait IdGenerator: Send + Sync + Debug {
    /// Mint a fresh identity
    fn next_id(&self) -> NodeId;
}

/// Random (v4) UUID generator
///
/// The default for production sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    #[inline]
    fn next_id(&self) -> NodeId {
        NodeId(Uuid::new_v4())
    }
}

/// Deterministic counter-backed generator
///
/// Yields `from_u128(start)`, `from_u128(start + 1)`, ... Only unique within
/// one generator, so keep it to tests and single-session tooling.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Counter starting at 1
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Counter starting at `start`
    #[inline]
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Id the next call to [`IdGenerator::next_id`] will return
    #[must_use]
    pub fn peek(&self) -> NodeId {
        NodeId::from_u128(u128::from(self.next.load(Ordering::Relaxed)))
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> NodeId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        NodeId::from_u128(u128::from(n))
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn next_id(&self) -> NodeId {
        (**self).next_id()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for std::sync::Arc<G> {
    fn next_id(&self) -> NodeId {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_generator_yields_distinct_ids() {
        let ids = UuidGenerator;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn sequential_ids_are_predictable() {
        let ids = SequentialIds::new();
        assert_eq!(ids.peek(), NodeId::from_u128(1));
        assert_eq!(ids.next_id(), NodeId::from_u128(1));
        assert_eq!(ids.next_id(), NodeId::from_u128(2));
        assert_eq!(ids.peek(), NodeId::from_u128(3));
    }

    #[test]
    fn sequential_ids_custom_start() {
        let ids = SequentialIds::starting_at(100);
        assert_eq!(ids.next_id(), NodeId::from_u128(100));
    }

    #[test]
    fn node_id_display_roundtrips_through_from_str() {
        let id = UuidGenerator.next_id();
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn node_id_from_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<NodeId>().is_err());
    }

    #[test]
    fn node_id_short_is_low_eight_chars() {
        let id = NodeId::from_u128(0xdead_beef);
        assert_eq!(id.short().len(), 8);
        assert_eq!(id.short(), "deadbeef");
        assert_ne!(NodeId::from_u128(1).short(), NodeId::from_u128(2).short());
    }

    #[test]
    fn node_id_debug_distinguishes_sequential_ids() {
        let first = format!("{:?}", NodeId::from_u128(1));
        let second = format!("{:?}", NodeId::from_u128(2));
        assert_ne!(first, second);
        assert_eq!(first, "NodeId(00000000-0000-0000-0000-000000000001)");
    }

    #[test]
    fn generator_through_reference_and_arc() {
        let ids = std::sync::Arc::new(SequentialIds::new());
        let by_ref = &*ids;
        assert_eq!(by_ref.next_id(), NodeId::from_u128(1));
        assert_eq!(ids.next_id(), NodeId::from_u128(2));
    }
}
