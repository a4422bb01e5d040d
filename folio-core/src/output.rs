//! Platform-agnostic render output.
//!
//! This is what the renderer produces: a small tree that can be serialized
//! to HTML, diffed by a preview surface, or inspected in tests, with no
//! dependency on how it will be displayed.

use serde::{Deserialize, Serialize};

/// A rendered fragment of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderNode {
    /// An element with a tag, attributes, and children.
    Element(RenderElement),
    /// A text run.
    Text(String),
    /// A sequence of nodes with no wrapper of its own.
    Fragment(Vec<RenderNode>),
}

/// A rendered element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderElement {
    /// Output tag name.
    pub tag: String,
    /// Id of the document node this element was rendered from, for editor
    /// selection mapping. Empty for synthetic elements.
    pub source_id: String,
    /// Attribute name/value pairs in output order.
    pub attributes: Vec<(String, String)>,
    /// Class names in output order.
    pub classes: Vec<String>,
    /// Child output nodes.
    pub children: Vec<RenderNode>,
}

impl RenderElement {
    /// Create an element with no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            source_id: source_id.into(),
            attributes: Vec::new(),
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute, builder-style.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a class name, builder-style.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Replace the children, builder-style.
    #[must_use]
    pub fn with_children(mut self, children: Vec<RenderNode>) -> Self {
        self.children = children;
        self
    }

    /// Append one child, builder-style.
    #[must_use]
    pub fn with_child(mut self, child: RenderNode) -> Self {
        self.children.push(child);
        self
    }
}

impl RenderNode {
    /// A text node.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// An empty fragment: renders to nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Fragment(Vec::new())
    }

    /// The explicit empty-page state shown when no document could be read.
    #[must_use]
    pub fn empty_page() -> Self {
        Self::Element(
            RenderElement::new("div", "")
                .with_class("page-empty")
                .with_child(Self::text("This page has no content yet.")),
        )
    }

    /// Diagnostic placeholder for a type missing from the registry.
    ///
    /// Shows the unresolved type name plus any literal text the node carried,
    /// so a page with one bad block still reads sensibly.
    #[must_use]
    pub fn placeholder(source_id: &str, type_name: &str, text: Option<&str>) -> Self {
        let mut element = RenderElement::new("div", source_id)
            .with_class("block-unavailable")
            .with_child(Self::text(format!(
                "Block type \"{type_name}\" is not available."
            )));
        if let Some(text) = text {
            element = element.with_child(Self::text(text));
        }
        Self::Element(element)
    }

    /// All text content, depth-first.
    #[must_use]
    pub fn text_content(&self) -> String {
        fn collect(node: &RenderNode, out: &mut String) {
            match node {
                RenderNode::Text(text) => out.push_str(text),
                RenderNode::Element(element) => {
                    for child in &element.children {
                        collect(child, out);
                    }
                }
                RenderNode::Fragment(children) => {
                    for child in children {
                        collect(child, out);
                    }
                }
            }
        }
        let mut out = String::new();
        collect(self, &mut out);
        out
    }
}
