//! Secondary index for reserved structural slots.
//!
//! Two-region containers own two fixed-identity column slots. Their ids are
//! derived from the container id once, at creation, and tracked here so that
//! renames and deletions update slot identity in one place instead of
//! recomputing id strings at every call site.

use std::collections::HashMap;

use crate::node::NodeId;

/// Suffix of the left column slot id.
pub const LEFT_SLOT_SUFFIX: &str = "-left-column";

/// Suffix of the right column slot id.
pub const RIGHT_SLOT_SUFFIX: &str = "-right-column";

/// The two reserved slots of a two-region container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPair {
    /// Left column slot id.
    pub left: NodeId,
    /// Right column slot id.
    pub right: NodeId,
}

impl SlotPair {
    /// Derive the slot ids for a container id.
    #[must_use]
    pub fn derive(container: &NodeId) -> Self {
        Self {
            left: NodeId::new(format!("{}{LEFT_SLOT_SUFFIX}", container.as_str())),
            right: NodeId::new(format!("{}{RIGHT_SLOT_SUFFIX}", container.as_str())),
        }
    }

    /// Both slot ids, left first.
    #[must_use]
    pub fn ids(&self) -> [&NodeId; 2] {
        [&self.left, &self.right]
    }
}

/// Index from container id to its reserved slot ids, with a reverse index
/// from slot id to owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotIndex {
    by_container: HashMap<NodeId, SlotPair>,
    owner_of: HashMap<NodeId, NodeId>,
}

impl SlotIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the slots of a container, replacing any previous entry.
    pub fn insert(&mut self, container: NodeId, slots: SlotPair) {
        if let Some(previous) = self.by_container.remove(&container) {
            for id in previous.ids() {
                self.owner_of.remove(id);
            }
        }
        self.owner_of.insert(slots.left.clone(), container.clone());
        self.owner_of.insert(slots.right.clone(), container.clone());
        self.by_container.insert(container, slots);
    }

    /// The slots of a container, if indexed.
    #[must_use]
    pub fn slots_of(&self, container: &NodeId) -> Option<&SlotPair> {
        self.by_container.get(container)
    }

    /// The container owning a slot id, if any.
    #[must_use]
    pub fn owner_of(&self, slot: &NodeId) -> Option<&NodeId> {
        self.owner_of.get(slot)
    }

    /// Whether the id is a reserved slot.
    #[must_use]
    pub fn is_slot(&self, id: &NodeId) -> bool {
        self.owner_of.contains_key(id)
    }

    /// Drop a container's slots from the index, returning them.
    pub fn remove(&mut self, container: &NodeId) -> Option<SlotPair> {
        let slots = self.by_container.remove(container)?;
        for id in slots.ids() {
            self.owner_of.remove(id);
        }
        Some(slots)
    }

    /// Number of indexed containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_container.len()
    }

    /// Whether the index tracks no containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_container.is_empty()
    }
}
