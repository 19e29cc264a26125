//! Structural validation
//!
//! Mutations keep the tree consistent by construction; [`MessageTree::validate`]
//! re-checks it from scratch for tests and for trees whose selected path was
//! restored from outside.

use crate::error::{Invariant, Result, TreeError};
use crate::store::Slot;
use crate::tree::MessageTree;
use std::collections::HashSet;

impl MessageTree {
    /// Check every structural invariant
    ///
    /// # Errors
    /// [`TreeError::InvariantViolation`] describing the first broken rule.
    pub fn validate(&self) -> Result<()> {
        self.check_links()?;
        self.check_roots()?;
        self.check_path()
    }

    fn check_links(&self) -> Result<()> {
        let store = self.store();
        for (position, node) in store.iter().enumerate() {
            let slot = Slot(position);
            if store.slot_of(node.id()) != Some(slot) {
                return Err(TreeError::violation(
                    Invariant::IndexConsistent,
                    format!("node {} is not indexed at slot {position}", node.id()),
                ));
            }

            let mut seen = HashSet::with_capacity(node.children.len());
            for &child in &node.children {
                if !seen.insert(child) {
                    return Err(TreeError::violation(
                        Invariant::UniqueChildren,
                        format!("node {} lists child slot {} twice", node.id(), child.index()),
                    ));
                }
                match store.node_at(child) {
                    Some(child_node) if child_node.parent == Some(slot) => {}
                    Some(child_node) => {
                        return Err(TreeError::violation(
                            Invariant::ChildBacklink,
                            format!(
                                "child {} of {} records a different parent",
                                child_node.id(),
                                node.id()
                            ),
                        ));
                    }
                    None => {
                        return Err(TreeError::violation(
                            Invariant::ChildBacklink,
                            format!("node {} lists missing child slot {}", node.id(), child.index()),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_roots(&self) -> Result<()> {
        let store = self.store();
        let mut seen = HashSet::new();
        for &slot in store.root_slots() {
            if !seen.insert(slot) {
                return Err(TreeError::violation(
                    Invariant::RootsParentless,
                    format!("root slot {} listed twice", slot.index()),
                ));
            }
            match store.node_at(slot) {
                Some(node) if node.is_root() => {}
                Some(node) => {
                    return Err(TreeError::violation(
                        Invariant::RootsParentless,
                        format!("root {} has a parent", node.id()),
                    ));
                }
                None => {
                    return Err(TreeError::violation(
                        Invariant::RootsParentless,
                        format!("root slot {} is empty", slot.index()),
                    ));
                }
            }
        }

        let parentless = store.iter().filter(|node| node.is_root()).count();
        if parentless != seen.len() {
            return Err(TreeError::violation(
                Invariant::RootsParentless,
                format!("{parentless} parentless nodes but {} roots", seen.len()),
            ));
        }
        Ok(())
    }

    fn check_path(&self) -> Result<()> {
        let path = self.selected_path();
        let Some(&first) = path.front() else {
            return Ok(());
        };

        if self.node(first).map_or(true, |node| !node.is_root()) {
            return Err(TreeError::violation(
                Invariant::PathContiguous,
                format!("path starts at {first}, which is not a root"),
            ));
        }

        for (position, (&parent, &child)) in path.iter().zip(path.iter().skip(1)).enumerate() {
            if self.parent(child) != Some(parent) {
                return Err(TreeError::violation(
                    Invariant::PathContiguous,
                    format!(
                        "{child} at position {} is not a child of {parent}",
                        position + 1
                    ),
                ));
            }
        }
        Ok(())
    }
}
