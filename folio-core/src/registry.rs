//! Type registry mapping block type names to capability descriptors.
//!
//! The registry is an explicit value built once per rendering session and
//! threaded through render and editing calls, so an editor view and a public
//! view can run side by side with different capability sets.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::{ContextField, EventContext};
use crate::output::RenderNode;
use crate::rules::{CompositionRules, ContentBlockRules};
use crate::width::Breakpoint;

/// Everything a block's render contract sees for one node.
pub struct BlockContext<'a> {
    /// Id of the node being rendered.
    pub node_id: &'a str,
    /// Effective props: type defaults overridden by the node's own props,
    /// with context bindings already applied.
    pub props: &'a Map<String, Value>,
    /// Event data bound to the page.
    pub event: &'a EventContext,
    /// Breakpoint the page is being rendered for.
    pub breakpoint: Breakpoint,
}

impl BlockContext<'_> {
    /// Look up an effective prop as a string slice, treating empty as absent.
    #[must_use]
    pub fn text_prop(&self, key: &str) -> Option<&str> {
        self.props
            .get(key)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Look up an effective prop as an integer.
    #[must_use]
    pub fn int_prop(&self, key: &str) -> Option<i64> {
        self.props.get(key).and_then(Value::as_i64)
    }
}

/// Render contract for a block type.
///
/// Children arrive already rendered, in sequence order; the implementation
/// decides where (and whether) they are inserted.
pub trait BlockRender: Send + Sync {
    /// Produce the output for one node.
    fn render(&self, ctx: &BlockContext<'_>, children: Vec<RenderNode>) -> RenderNode;
}

/// How a prop is filled from event data when the node leaves it unset.
#[derive(Debug, Clone)]
pub struct PropBinding {
    /// Prop to fill.
    pub prop: String,
    /// Context field the value comes from.
    pub source: ContextField,
    /// Literal fallback when the context has no value either.
    pub fallback: Option<String>,
    /// Render nothing at all when no value is available — for blocks whose
    /// entire purpose is displaying the bound value.
    pub omit_when_absent: bool,
}

impl PropBinding {
    /// Bind `prop` to a context field with an optional literal fallback.
    #[must_use]
    pub fn new(prop: impl Into<String>, source: ContextField) -> Self {
        Self {
            prop: prop.into(),
            source,
            fallback: None,
            omit_when_absent: false,
        }
    }

    /// Set the literal fallback, builder-style.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Omit the whole block when no value is available, builder-style.
    #[must_use]
    pub fn omit_when_absent(mut self) -> Self {
        self.omit_when_absent = true;
        self
    }
}

/// Widget kinds for settings-panel fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// Free text input.
    Text,
    /// Numeric input.
    Number,
    /// Color picker.
    Color,
    /// On/off switch.
    Toggle,
    /// Fixed-choice dropdown.
    Select,
}

/// One editable field in a block's settings panel.
#[derive(Debug, Clone)]
pub struct SettingsField {
    /// Prop the field edits.
    pub prop: String,
    /// Human-readable label.
    pub label: String,
    /// Widget kind.
    pub kind: SettingKind,
}

impl SettingsField {
    /// Describe one settings field.
    #[must_use]
    pub fn new(prop: impl Into<String>, label: impl Into<String>, kind: SettingKind) -> Self {
        Self {
            prop: prop.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Marks a type whose children are two fixed-identity column slots rather
/// than an arbitrary sequence.
#[derive(Debug, Clone)]
pub struct ReservedSlots {
    /// Type name of the generated slot nodes.
    pub slot_type: String,
}

/// The resolved definition of a block type.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    /// Props applied wherever the node does not override them.
    pub default_props: Map<String, Value>,
    /// Whether nodes of this type may own children.
    pub is_canvas: bool,
    /// Render contract.
    pub render: Arc<dyn BlockRender>,
    /// Drag-and-drop rules.
    pub rules: Arc<dyn CompositionRules>,
    /// Context bindings for data-bound props.
    pub bindings: Vec<PropBinding>,
    /// Settings panel contract.
    pub settings: Vec<SettingsField>,
    /// Present when this type owns reserved column slots.
    pub reserved_slots: Option<ReservedSlots>,
}

impl CapabilityDescriptor {
    /// Descriptor for a plain leaf block.
    #[must_use]
    pub fn leaf(render: Arc<dyn BlockRender>) -> Self {
        Self {
            default_props: Map::new(),
            is_canvas: false,
            render,
            rules: Arc::new(ContentBlockRules),
            bindings: Vec::new(),
            settings: Vec::new(),
            reserved_slots: None,
        }
    }

    /// Descriptor for a canvas block with the given rules.
    #[must_use]
    pub fn canvas(render: Arc<dyn BlockRender>, rules: Arc<dyn CompositionRules>) -> Self {
        Self {
            default_props: Map::new(),
            is_canvas: true,
            render,
            rules,
            bindings: Vec::new(),
            settings: Vec::new(),
            reserved_slots: None,
        }
    }

    /// Override the composition rules, builder-style.
    #[must_use]
    pub fn with_rules(mut self, rules: Arc<dyn CompositionRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Add one default prop, builder-style.
    #[must_use]
    pub fn with_default_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_props.insert(key.into(), value.into());
        self
    }

    /// Add one context binding, builder-style.
    #[must_use]
    pub fn with_binding(mut self, binding: PropBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Add one settings field, builder-style.
    #[must_use]
    pub fn with_setting(mut self, field: SettingsField) -> Self {
        self.settings.push(field);
        self
    }

    /// Mark this type as owning reserved column slots, builder-style.
    #[must_use]
    pub fn with_reserved_slots(mut self, slot_type: impl Into<String>) -> Self {
        self.reserved_slots = Some(ReservedSlots {
            slot_type: slot_type.into(),
        });
        self
    }
}

/// Registry of block types for one rendering session.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, CapabilityDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under a type name, replacing any previous entry.
    pub fn register(&mut self, type_name: impl Into<String>, descriptor: CapabilityDescriptor) {
        self.entries.insert(type_name.into(), descriptor);
    }

    /// Pure lookup of a type's capability descriptor.
    #[must_use]
    pub fn resolve(&self, type_name: &str) -> Option<&CapabilityDescriptor> {
        self.entries.get(type_name)
    }

    /// Whether a type is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Composition rules for a type.
    ///
    /// Unregistered types fall back to the content-block policy, so a node
    /// with a stale type name behaves as an inert leaf during editing.
    #[must_use]
    pub fn rules_for(&self, type_name: &str) -> Arc<dyn CompositionRules> {
        self.entries
            .get(type_name)
            .map_or_else(|| Arc::new(ContentBlockRules) as Arc<dyn CompositionRules>, |d| {
                Arc::clone(&d.rules)
            })
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over registered type names, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeId};

    struct NullRender;

    impl BlockRender for NullRender {
        fn render(&self, _ctx: &BlockContext<'_>, children: Vec<RenderNode>) -> RenderNode {
            RenderNode::Fragment(children)
        }
    }

    #[test]
    fn test_resolve_registered_type() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "Heading",
            CapabilityDescriptor::leaf(Arc::new(NullRender)).with_default_prop("level", 2),
        );
        let descriptor = registry.resolve("Heading").expect("should resolve");
        assert!(!descriptor.is_canvas);
        assert_eq!(descriptor.default_props.get("level"), Some(&2.into()));
    }

    #[test]
    fn test_resolve_unknown_type_is_none() {
        let registry = TypeRegistry::new();
        assert!(registry.resolve("Carousel").is_none());
    }

    #[test]
    fn test_rules_for_unknown_type_is_inert_leaf() {
        let registry = TypeRegistry::new();
        let rules = registry.rules_for("Carousel");
        let node = Node::new(NodeId::new("n1"), "Carousel");
        assert!(!rules.can_drop(&node));
        assert!(rules.can_drag(&node));
    }

    #[test]
    fn test_register_replaces_previous_entry() {
        let mut registry = TypeRegistry::new();
        registry.register("Heading", CapabilityDescriptor::leaf(Arc::new(NullRender)));
        registry.register(
            "Heading",
            CapabilityDescriptor::leaf(Arc::new(NullRender)).with_default_prop("level", 3),
        );
        assert_eq!(registry.len(), 1);
        let descriptor = registry.resolve("Heading").expect("should resolve");
        assert_eq!(descriptor.default_props.get("level"), Some(&3.into()));
    }
}
