//! Editing operations: atomic structural mutations with explicit outcomes.
//!
//! Every user gesture is one [`Mutation`]. All legality checks run before any
//! state is touched, so a rejected mutation leaves the document exactly as it
//! was — there is no partial-mutation state to observe or roll back.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::node::{validate_node_id, Document, Node, NodeId};
use crate::registry::TypeRegistry;
use crate::slots::{SlotIndex, SlotPair};

/// Why a mutation was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A composition rule said no.
    #[error("composition rule violation: {0}")]
    RuleViolation(String),

    /// The move would make a node its own descendant.
    #[error("move would create a cycle at {0}")]
    WouldCycle(String),

    /// The edit would duplicate an existing node id or a reserved slot id.
    #[error("id collision: {0}")]
    IdCollision(String),

    /// A referenced node does not exist.
    #[error("node not found: {0}")]
    MissingNode(String),

    /// The target cannot own children.
    #[error("node {0} is not a canvas")]
    NotACanvas(String),

    /// An id failed validation.
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// Result of applying a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The document was changed.
    Applied,
    /// The document was left untouched.
    Rejected(RejectReason),
}

impl MutationOutcome {
    /// Whether the mutation changed the document.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A single user gesture against the document.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Insert a freshly created node under a parent. The node must arrive
    /// childless; a two-region type gets its column slots created here.
    InsertNode {
        /// The node to insert.
        node: Node,
        /// Canvas node receiving it.
        parent: NodeId,
        /// Position among the parent's children; append when `None`.
        index: Option<usize>,
    },
    /// Delete a node and its whole subtree.
    DeleteNode {
        /// Root of the subtree to delete.
        id: NodeId,
    },
    /// Relocate a node to a new parent — the drag gesture.
    MoveNode {
        /// Node being dragged.
        id: NodeId,
        /// Canvas node receiving it.
        new_parent: NodeId,
        /// Position among the new parent's children; append when `None`.
        index: Option<usize>,
    },
    /// Set one prop on a node.
    SetProp {
        /// Node to update.
        id: NodeId,
        /// Prop name.
        key: String,
        /// New value.
        value: Value,
    },
    /// Rename a node, keeping any reserved slot identities in step.
    RenameNode {
        /// Current id.
        id: NodeId,
        /// New id.
        new_id: NodeId,
    },
}

/// One editing session: the exclusive owner of a document and the slot index
/// kept in step with it.
pub struct EditSession<'r> {
    document: Document,
    slots: SlotIndex,
    registry: &'r TypeRegistry,
}

impl<'r> EditSession<'r> {
    /// Open a session over a document, rebuilding the slot index from the
    /// registry's reserved-slot types.
    #[must_use]
    pub fn new(document: Document, registry: &'r TypeRegistry) -> Self {
        let mut slots = SlotIndex::new();
        for node in document.nodes() {
            let Some(descriptor) = registry.resolve(&node.type_name) else {
                continue;
            };
            if descriptor.reserved_slots.is_none() {
                continue;
            }
            let pair = match (node.children.first(), node.children.get(1)) {
                (Some(left), Some(right)) => SlotPair {
                    left: left.clone(),
                    right: right.clone(),
                },
                _ => SlotPair::derive(&node.id),
            };
            slots.insert(node.id.clone(), pair);
        }
        Self {
            document,
            slots,
            registry,
        }
    }

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The slot index kept in step with the document.
    #[must_use]
    pub fn slots(&self) -> &SlotIndex {
        &self.slots
    }

    /// Close the session, handing the document back.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Apply one mutation. Checks run first; on rejection the document is
    /// untouched.
    pub fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        let outcome = match mutation {
            Mutation::InsertNode {
                node,
                parent,
                index,
            } => self.insert_node(node, &parent, index),
            Mutation::DeleteNode { id } => self.delete_node(&id),
            Mutation::MoveNode {
                id,
                new_parent,
                index,
            } => self.move_node(&id, &new_parent, index),
            Mutation::SetProp { id, key, value } => self.set_prop(&id, key, value),
            Mutation::RenameNode { id, new_id } => self.rename_node(&id, &new_id),
        };
        if let MutationOutcome::Rejected(reason) = &outcome {
            debug!(%reason, "mutation rejected");
        }
        outcome
    }

    fn insert_node(
        &mut self,
        mut node: Node,
        parent: &NodeId,
        index: Option<usize>,
    ) -> MutationOutcome {
        if let Err(err) = validate_node_id(&node.id) {
            return MutationOutcome::Rejected(RejectReason::InvalidId(err.to_string()));
        }
        if !node.children.is_empty() {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(
                "inserted nodes start childless".to_string(),
            ));
        }
        if self.document.contains(&node.id) {
            return MutationOutcome::Rejected(RejectReason::IdCollision(node.id.to_string()));
        }
        let Some(target) = self.document.get(parent) else {
            return MutationOutcome::Rejected(RejectReason::MissingNode(parent.to_string()));
        };
        if !target.is_canvas {
            return MutationOutcome::Rejected(RejectReason::NotACanvas(parent.to_string()));
        }
        let target_rules = self.registry.rules_for(&target.type_name);
        if !target_rules.can_drop(target) || !target_rules.can_move_in(&[&node], target) {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(format!(
                "{parent} does not accept {}",
                node.type_name
            )));
        }
        let reserved = self
            .registry
            .resolve(&node.type_name)
            .and_then(|d| d.reserved_slots.clone());
        if reserved.is_some() {
            let pair = SlotPair::derive(&node.id);
            if self.document.contains(&pair.left) || self.document.contains(&pair.right) {
                return MutationOutcome::Rejected(RejectReason::IdCollision(
                    pair.left.to_string(),
                ));
            }
        }

        let id = node.id.clone();
        node.parent = Some(parent.clone());
        if let Some(reserved) = reserved {
            let pair = SlotPair::derive(&id);
            node.is_canvas = true;
            node.children = vec![pair.left.clone(), pair.right.clone()];
            for slot_id in pair.ids() {
                let mut slot = Node::canvas(slot_id.clone(), reserved.slot_type.clone());
                slot.parent = Some(id.clone());
                self.document.insert_node(slot);
            }
            self.slots.insert(id.clone(), pair);
        }
        self.document.insert_node(node);
        if let Some(target) = self.document.get_mut(parent) {
            let at = index
                .unwrap_or(target.children.len())
                .min(target.children.len());
            target.children.insert(at, id);
        }
        MutationOutcome::Applied
    }

    fn delete_node(&mut self, id: &NodeId) -> MutationOutcome {
        if !self.document.contains(id) {
            return MutationOutcome::Rejected(RejectReason::MissingNode(id.to_string()));
        }
        if id == self.document.root() {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(
                "the root node cannot be deleted".to_string(),
            ));
        }
        if self.slots.is_slot(id) {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(
                "reserved slots are deleted with their container".to_string(),
            ));
        }

        let parent = self.document.get(id).and_then(|n| n.parent.clone());
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.document.get_mut(&parent_id) {
                parent_node.children.retain(|c| c != id);
            }
        }
        for removed in self.document.remove_subtree(id) {
            self.slots.remove(&removed);
        }
        MutationOutcome::Applied
    }

    fn move_node(
        &mut self,
        id: &NodeId,
        new_parent: &NodeId,
        index: Option<usize>,
    ) -> MutationOutcome {
        let Some(node) = self.document.get(id) else {
            return MutationOutcome::Rejected(RejectReason::MissingNode(id.to_string()));
        };
        let Some(target) = self.document.get(new_parent) else {
            return MutationOutcome::Rejected(RejectReason::MissingNode(new_parent.to_string()));
        };
        if id == self.document.root() {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(
                "the root node cannot be moved".to_string(),
            ));
        }
        if id == new_parent || self.document.is_ancestor(id, new_parent) {
            return MutationOutcome::Rejected(RejectReason::WouldCycle(id.to_string()));
        }
        if !target.is_canvas {
            return MutationOutcome::Rejected(RejectReason::NotACanvas(new_parent.to_string()));
        }
        if self.slots.is_slot(id) {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(
                "reserved slots stay with their container".to_string(),
            ));
        }
        let node_rules = self.registry.rules_for(&node.type_name);
        if !node_rules.can_drag(node) || !node_rules.can_move_out(node) {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(format!(
                "{id} may not leave its parent"
            )));
        }
        let target_rules = self.registry.rules_for(&target.type_name);
        if !target_rules.can_drop(target) || !target_rules.can_move_in(&[node], target) {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(format!(
                "{new_parent} does not accept {}",
                node.type_name
            )));
        }

        let old_parent = node.parent.clone();
        if let Some(old_parent_id) = &old_parent {
            if let Some(old_parent_node) = self.document.get_mut(old_parent_id) {
                old_parent_node.children.retain(|c| c != id);
            }
        }
        if let Some(target) = self.document.get_mut(new_parent) {
            let at = index
                .unwrap_or(target.children.len())
                .min(target.children.len());
            target.children.insert(at, id.clone());
        }
        if let Some(node) = self.document.get_mut(id) {
            node.parent = Some(new_parent.clone());
        }
        MutationOutcome::Applied
    }

    fn set_prop(&mut self, id: &NodeId, key: String, value: Value) -> MutationOutcome {
        let Some(node) = self.document.get_mut(id) else {
            return MutationOutcome::Rejected(RejectReason::MissingNode(id.to_string()));
        };
        node.props.insert(key, value);
        MutationOutcome::Applied
    }

    fn rename_node(&mut self, id: &NodeId, new_id: &NodeId) -> MutationOutcome {
        if !self.document.contains(id) {
            return MutationOutcome::Rejected(RejectReason::MissingNode(id.to_string()));
        }
        if let Err(err) = validate_node_id(new_id) {
            return MutationOutcome::Rejected(RejectReason::InvalidId(err.to_string()));
        }
        if new_id == id {
            return MutationOutcome::Applied;
        }
        if self.document.contains(new_id) {
            return MutationOutcome::Rejected(RejectReason::IdCollision(new_id.to_string()));
        }
        if self.slots.is_slot(id) {
            return MutationOutcome::Rejected(RejectReason::RuleViolation(
                "reserved slots are renamed with their container".to_string(),
            ));
        }
        let old_slots = self.slots.slots_of(id).cloned();
        if old_slots.is_some() {
            let new_pair = SlotPair::derive(new_id);
            if self.document.contains(&new_pair.left) || self.document.contains(&new_pair.right) {
                return MutationOutcome::Rejected(RejectReason::IdCollision(
                    new_pair.left.to_string(),
                ));
            }
        }

        self.rekey(id, new_id);
        if let Some(old_pair) = old_slots {
            let new_pair = SlotPair::derive(new_id);
            self.rekey(&old_pair.left, &new_pair.left);
            self.rekey(&old_pair.right, &new_pair.right);
            self.slots.remove(id);
            self.slots.insert(new_id.clone(), new_pair);
        }
        MutationOutcome::Applied
    }

    /// Re-key one node, fixing its parent's child entry and its children's
    /// back-references. Slot bookkeeping is the caller's job.
    fn rekey(&mut self, old: &NodeId, new: &NodeId) {
        let Some(mut node) = self.document.take(old) else {
            return;
        };
        node.id = new.clone();
        let child_ids = node.children.clone();
        let parent_id = node.parent.clone();
        self.document.insert_node(node);
        for child in &child_ids {
            if let Some(child_node) = self.document.get_mut(child) {
                child_node.parent = Some(new.clone());
            }
        }
        if let Some(parent_id) = parent_id {
            if let Some(parent_node) = self.document.get_mut(&parent_id) {
                for child in &mut parent_node.children {
                    if *child == *old {
                        *child = new.clone();
                    }
                }
            }
        }
        if self.document.root() == old {
            self.document.set_root(new.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry::{BlockContext, BlockRender, CapabilityDescriptor};
    use crate::rules::{ContainerRules, RegionSlotRules, TwoRegionRules};
    use crate::output::RenderNode;

    struct NullRender;

    impl BlockRender for NullRender {
        fn render(&self, _ctx: &BlockContext<'_>, children: Vec<RenderNode>) -> RenderNode {
            RenderNode::Fragment(children)
        }
    }

    fn test_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(
            "Container",
            CapabilityDescriptor::canvas(Arc::new(NullRender), Arc::new(ContainerRules)),
        );
        registry.register(
            "Columns",
            CapabilityDescriptor::canvas(Arc::new(NullRender), Arc::new(TwoRegionRules))
                .with_reserved_slots("Column"),
        );
        registry.register(
            "Column",
            CapabilityDescriptor::canvas(Arc::new(NullRender), Arc::new(RegionSlotRules)),
        );
        registry.register(
            "Heading",
            CapabilityDescriptor::leaf(Arc::new(NullRender)),
        );
        registry
    }

    fn base_document() -> Document {
        let mut doc = Document::new(Node::canvas(NodeId::new("root"), "Container"));
        doc.add_child(
            &NodeId::new("root"),
            Node::new(NodeId::new("h1"), "Heading").with_prop("text", "Hello"),
        )
        .expect("should attach");
        doc
    }

    fn canonical(session: &EditSession<'_>) -> String {
        session
            .document()
            .to_canonical_json()
            .expect("should serialize")
    }

    #[test]
    fn test_insert_under_container() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        let outcome = session.apply(Mutation::InsertNode {
            node: Node::new(NodeId::new("h2"), "Heading"),
            parent: NodeId::new("root"),
            index: Some(0),
        });
        assert!(outcome.is_applied());
        let root = session.document().get(&NodeId::new("root")).expect("root");
        assert_eq!(root.children, vec![NodeId::new("h2"), NodeId::new("h1")]);
    }

    #[test]
    fn test_insert_into_leaf_rejected() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        let before = canonical(&session);
        let outcome = session.apply(Mutation::InsertNode {
            node: Node::new(NodeId::new("h2"), "Heading"),
            parent: NodeId::new("h1"),
            index: None,
        });
        assert_eq!(
            outcome,
            MutationOutcome::Rejected(RejectReason::NotACanvas("h1".to_string()))
        );
        assert_eq!(before, canonical(&session));
    }

    #[test]
    fn test_insert_two_region_creates_slots() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        let outcome = session.apply(Mutation::InsertNode {
            node: Node::new(NodeId::new("cols"), "Columns"),
            parent: NodeId::new("root"),
            index: None,
        });
        assert!(outcome.is_applied());
        let cols = session.document().get(&NodeId::new("cols")).expect("cols");
        assert_eq!(
            cols.children,
            vec![
                NodeId::new("cols-left-column"),
                NodeId::new("cols-right-column")
            ]
        );
        let left = session
            .document()
            .get(&NodeId::new("cols-left-column"))
            .expect("left slot");
        assert_eq!(left.type_name, "Column");
        assert!(left.is_canvas);
        assert!(session.slots().is_slot(&NodeId::new("cols-right-column")));
        assert!(session.document().validate().is_empty());
    }

    #[test]
    fn test_drop_directly_on_two_region_rejected_unchanged() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        assert!(session
            .apply(Mutation::InsertNode {
                node: Node::new(NodeId::new("cols"), "Columns"),
                parent: NodeId::new("root"),
                index: None,
            })
            .is_applied());

        let before = canonical(&session);
        let outcome = session.apply(Mutation::MoveNode {
            id: NodeId::new("h1"),
            new_parent: NodeId::new("cols"),
            index: None,
        });
        assert!(matches!(
            outcome,
            MutationOutcome::Rejected(RejectReason::RuleViolation(_))
        ));
        assert_eq!(before, canonical(&session));

        // The named slot, by contrast, accepts the same node.
        let outcome = session.apply(Mutation::MoveNode {
            id: NodeId::new("h1"),
            new_parent: NodeId::new("cols-left-column"),
            index: None,
        });
        assert!(outcome.is_applied());
        assert!(session.document().validate().is_empty());
    }

    #[test]
    fn test_move_into_own_descendant_rejected() {
        let registry = test_registry();
        let mut doc = base_document();
        doc.add_child(
            &NodeId::new("root"),
            Node::canvas(NodeId::new("outer"), "Container"),
        )
        .expect("should attach");
        doc.add_child(
            &NodeId::new("outer"),
            Node::canvas(NodeId::new("inner"), "Container"),
        )
        .expect("should attach");
        let mut session = EditSession::new(doc, &registry);
        let before = canonical(&session);
        let outcome = session.apply(Mutation::MoveNode {
            id: NodeId::new("outer"),
            new_parent: NodeId::new("inner"),
            index: None,
        });
        assert_eq!(
            outcome,
            MutationOutcome::Rejected(RejectReason::WouldCycle("outer".to_string()))
        );
        assert_eq!(before, canonical(&session));
    }

    #[test]
    fn test_slot_cannot_move_out_or_be_deleted() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        assert!(session
            .apply(Mutation::InsertNode {
                node: Node::new(NodeId::new("cols"), "Columns"),
                parent: NodeId::new("root"),
                index: None,
            })
            .is_applied());

        let before = canonical(&session);
        let moved = session.apply(Mutation::MoveNode {
            id: NodeId::new("cols-left-column"),
            new_parent: NodeId::new("root"),
            index: None,
        });
        assert!(!moved.is_applied());
        let deleted = session.apply(Mutation::DeleteNode {
            id: NodeId::new("cols-left-column"),
        });
        assert!(!deleted.is_applied());
        assert_eq!(before, canonical(&session));
    }

    #[test]
    fn test_delete_container_takes_slots_along() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        assert!(session
            .apply(Mutation::InsertNode {
                node: Node::new(NodeId::new("cols"), "Columns"),
                parent: NodeId::new("root"),
                index: None,
            })
            .is_applied());
        assert!(session
            .apply(Mutation::DeleteNode {
                id: NodeId::new("cols"),
            })
            .is_applied());
        assert!(!session.document().contains(&NodeId::new("cols-left-column")));
        assert!(session.slots().is_empty());
        assert!(session.document().validate().is_empty());
    }

    #[test]
    fn test_rename_container_renames_slots_atomically() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        assert!(session
            .apply(Mutation::InsertNode {
                node: Node::new(NodeId::new("cols"), "Columns"),
                parent: NodeId::new("root"),
                index: None,
            })
            .is_applied());
        assert!(session
            .apply(Mutation::MoveNode {
                id: NodeId::new("h1"),
                new_parent: NodeId::new("cols-left-column"),
                index: None,
            })
            .is_applied());

        assert!(session
            .apply(Mutation::RenameNode {
                id: NodeId::new("cols"),
                new_id: NodeId::new("hero-cols"),
            })
            .is_applied());

        let doc = session.document();
        assert!(!doc.contains(&NodeId::new("cols")));
        assert!(!doc.contains(&NodeId::new("cols-left-column")));
        let left = doc
            .get(&NodeId::new("hero-cols-left-column"))
            .expect("renamed slot");
        assert_eq!(left.children, vec![NodeId::new("h1")]);
        assert_eq!(
            session.slots().owner_of(&NodeId::new("hero-cols-left-column")),
            Some(&NodeId::new("hero-cols"))
        );
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_set_prop_on_missing_node_rejected() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        let outcome = session.apply(Mutation::SetProp {
            id: NodeId::new("ghost"),
            key: "text".to_string(),
            value: "x".into(),
        });
        assert!(!outcome.is_applied());
    }

    #[test]
    fn test_reorder_within_same_parent() {
        let registry = test_registry();
        let mut session = EditSession::new(base_document(), &registry);
        assert!(session
            .apply(Mutation::InsertNode {
                node: Node::new(NodeId::new("h2"), "Heading"),
                parent: NodeId::new("root"),
                index: None,
            })
            .is_applied());
        assert!(session
            .apply(Mutation::MoveNode {
                id: NodeId::new("h2"),
                new_parent: NodeId::new("root"),
                index: Some(0),
            })
            .is_applied());
        let root = session.document().get(&NodeId::new("root")).expect("root");
        assert_eq!(root.children, vec![NodeId::new("h2"), NodeId::new("h1")]);
        assert!(session.document().validate().is_empty());
    }
}
