//! HTML string output for render trees.
//!
//! Serialization is deterministic: attribute order is the order the blocks
//! emitted, classes join with single spaces, and text/attribute values are
//! escaped. Elements rendered from a document node carry a `data-node`
//! attribute so an editor surface can map output back to the tree.

use folio_core::{RenderElement, RenderNode};

/// Elements that never take a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize a render tree to an HTML string.
#[must_use]
pub fn render_to_string(node: &RenderNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &RenderNode) {
    match node {
        RenderNode::Text(text) => push_escaped_text(out, text),
        RenderNode::Fragment(children) => {
            for child in children {
                write_node(out, child);
            }
        }
        RenderNode::Element(element) => write_element(out, element),
    }
}

fn write_element(out: &mut String, element: &RenderElement) {
    out.push('<');
    out.push_str(&element.tag);
    if !element.classes.is_empty() {
        out.push_str(" class=\"");
        for (i, class) in element.classes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            push_escaped_attr(out, class);
        }
        out.push('"');
    }
    if !element.source_id.is_empty() {
        out.push_str(" data-node=\"");
        push_escaped_attr(out, &element.source_id);
        out.push('"');
    }
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_escaped_attr(out, value);
        out.push('"');
    }
    out.push('>');
    if VOID_TAGS.contains(&element.tag.as_str()) {
        return;
    }
    for child in &element.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
