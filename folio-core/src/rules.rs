//! Composition rules governing drag-and-drop legality.
//!
//! Rules are consulted during interactive editing only; static rendering
//! never asks them anything.

use crate::node::Node;

/// Per-type predicates checked before a structural edit commits.
///
/// The default implementations are the ordinary content-block policy:
/// draggable, never a drop target, free to leave its parent.
pub trait CompositionRules: Send + Sync {
    /// Whether the node itself may be picked up and relocated.
    fn can_drag(&self, node: &Node) -> bool {
        let _ = node;
        true
    }

    /// Whether other nodes may be dropped directly inside this node.
    fn can_drop(&self, node: &Node) -> bool {
        let _ = node;
        false
    }

    /// Whether this specific set of incoming nodes is acceptable as children.
    fn can_move_in(&self, incoming: &[&Node], node: &Node) -> bool {
        let _ = (incoming, node);
        false
    }

    /// Whether the node may leave its current parent for another.
    fn can_move_out(&self, node: &Node) -> bool {
        let _ = node;
        true
    }
}

/// Ordinary content blocks: draggable leaves that reject all incoming nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentBlockRules;

impl CompositionRules for ContentBlockRules {}

/// Generic containers: accept any drop, unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerRules;

impl CompositionRules for ContainerRules {
    fn can_drop(&self, _node: &Node) -> bool {
        true
    }

    fn can_move_in(&self, _incoming: &[&Node], _node: &Node) -> bool {
        true
    }
}

/// The two-region layout container.
///
/// Content never lands on the container itself; drops must target one of its
/// named column slots. The container as a whole stays draggable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoRegionRules;

impl CompositionRules for TwoRegionRules {
    fn can_drop(&self, _node: &Node) -> bool {
        false
    }

    fn can_move_in(&self, _incoming: &[&Node], _node: &Node) -> bool {
        false
    }
}

/// A reserved column slot: accepts anything, but never leaves its container
/// and is never picked up on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionSlotRules;

impl CompositionRules for RegionSlotRules {
    fn can_drag(&self, _node: &Node) -> bool {
        false
    }

    fn can_drop(&self, _node: &Node) -> bool {
        true
    }

    fn can_move_in(&self, _incoming: &[&Node], _node: &Node) -> bool {
        true
    }

    fn can_move_out(&self, _node: &Node) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    fn heading() -> Node {
        Node::new(NodeId::new("h1"), "Heading")
    }

    fn container() -> Node {
        Node::canvas(NodeId::new("c1"), "Container")
    }

    #[test]
    fn test_content_block_policy() {
        let rules = ContentBlockRules;
        let node = heading();
        assert!(rules.can_drag(&node));
        assert!(!rules.can_drop(&node));
        assert!(!rules.can_move_in(&[&container()], &node));
        assert!(rules.can_move_out(&node));
    }

    #[test]
    fn test_container_accepts_anything() {
        let rules = ContainerRules;
        let node = container();
        assert!(rules.can_drop(&node));
        assert!(rules.can_move_in(&[&heading()], &node));
    }

    #[test]
    fn test_two_region_rejects_direct_drops() {
        let rules = TwoRegionRules;
        let node = container();
        assert!(rules.can_drag(&node));
        assert!(!rules.can_drop(&node));
        assert!(!rules.can_move_in(&[&heading()], &node));
    }

    #[test]
    fn test_slot_is_anchored_but_open() {
        let rules = RegionSlotRules;
        let node = container();
        assert!(!rules.can_drag(&node));
        assert!(!rules.can_move_out(&node));
        assert!(rules.can_drop(&node));
        assert!(rules.can_move_in(&[&heading()], &node));
    }
}
