//! The canonical render walk: document in, output tree out.
//!
//! One synchronous depth-first pass per render call. The walk is total: any
//! input — `None`, an empty document, unknown types, dangling child ids,
//! pathological nesting — produces *some* output, never an error.

use serde_json::{Map, Value};
use tracing::warn;

use folio_core::{
    BlockContext, Breakpoint, CapabilityDescriptor, Document, EventContext, Node, NodeId,
    RenderNode, TypeRegistry, WidthSpec,
};

/// Nesting depth rendered by default. Deep enough for any real page, small
/// enough that a corrupted recursive payload cannot exhaust the stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for one render session.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Breakpoint widths resolve against.
    pub breakpoint: Breakpoint,
    /// Depth bound protecting the recursive walk.
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            breakpoint: Breakpoint::Desktop,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One render pass over a document.
///
/// Holds the registry, the event data, and the config for the duration of
/// the walk; building one per render keeps concurrent sessions (editor view,
/// public view) fully independent.
pub struct RenderSession<'a> {
    registry: &'a TypeRegistry,
    context: &'a EventContext,
    config: RenderConfig,
}

impl<'a> RenderSession<'a> {
    /// Create a session with the default configuration.
    #[must_use]
    pub fn new(registry: &'a TypeRegistry, context: &'a EventContext) -> Self {
        Self {
            registry,
            context,
            config: RenderConfig::default(),
        }
    }

    /// Override the configuration, builder-style.
    #[must_use]
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Render a document. Total over any input, including `None`.
    #[must_use]
    pub fn render(&self, document: Option<&Document>) -> RenderNode {
        match document {
            Some(doc) if !doc.is_empty() => self.render_node(doc, doc.root(), 0),
            _ => RenderNode::empty_page(),
        }
    }

    fn render_node(&self, doc: &Document, id: &NodeId, depth: usize) -> RenderNode {
        if depth > self.config.max_depth {
            warn!(%id, max_depth = self.config.max_depth, "depth cap reached; dropping subtree");
            return RenderNode::empty();
        }
        let Some(node) = doc.get(id) else {
            warn!(%id, "skipping dangling child reference");
            return RenderNode::empty();
        };
        let Some(descriptor) = self.registry.resolve(&node.type_name) else {
            warn!(type_name = %node.type_name, "type not in registry; rendering placeholder");
            return RenderNode::placeholder(node.id.as_str(), &node.type_name, node.text_prop("text"));
        };

        // Children render only for canvas nodes; stray entries on a leaf are
        // ignored rather than trusted.
        let children: Vec<RenderNode> = if node.is_canvas {
            node.children
                .iter()
                .map(|child| self.render_node(doc, child, depth + 1))
                .collect()
        } else {
            Vec::new()
        };

        let props = self.effective_props(descriptor, node);
        if omitted(descriptor, &props) {
            return RenderNode::empty();
        }
        let ctx = BlockContext {
            node_id: node.id.as_str(),
            props: &props,
            event: self.context,
            breakpoint: self.config.breakpoint,
        };
        descriptor.render.render(&ctx, children)
    }

    /// Effective props: type defaults, overridden key-by-key by the node's
    /// own props, then context bindings filling whatever is still absent.
    /// A `width` prop is resolved to its concrete breakpoint value here so
    /// blocks only ever see one token.
    fn effective_props(&self, descriptor: &CapabilityDescriptor, node: &Node) -> Map<String, Value> {
        let mut props = descriptor.default_props.clone();
        for (key, value) in &node.props {
            props.insert(key.clone(), value.clone());
        }
        for binding in &descriptor.bindings {
            if value_present(props.get(&binding.prop)) {
                continue;
            }
            if let Some(value) = self.context.field(binding.source) {
                props.insert(binding.prop.clone(), Value::String(value.to_string()));
            } else if let Some(fallback) = &binding.fallback {
                props.insert(binding.prop.clone(), Value::String(fallback.clone()));
            }
        }
        if let Some(width) = props.get("width").and_then(WidthSpec::from_prop) {
            let resolved = width.resolve(self.config.breakpoint);
            props.insert("width".to_string(), Value::String(resolved));
        }
        props
    }

}

/// Whether an omit-when-absent binding is still unfilled, in which case the
/// whole block renders nothing.
fn omitted(descriptor: &CapabilityDescriptor, props: &Map<String, Value>) -> bool {
    descriptor
        .bindings
        .iter()
        .any(|binding| binding.omit_when_absent && !value_present(props.get(&binding.prop)))
}

/// A prop counts as present when it is set, non-null, and not an empty string.
fn value_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
