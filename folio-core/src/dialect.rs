//! Reading the serialized page dialects into the canonical document.
//!
//! Three shapes are accepted for compatibility with every generation of saved
//! page: the canonical direct-tree map, the wrapped `{rootNodeId, nodes}`
//! envelope, and the legacy block array that predates typed nodes. Detection
//! is an ordered list of pure detector functions; the first one that
//! recognizes the payload wins. Writing is not symmetric — saves always emit
//! the canonical direct-tree form via
//! [`Document::to_canonical_json`](crate::Document::to_canonical_json).
//!
//! The legacy array is upgraded into a canonical document once, here, so the
//! renderer only ever sees one representation.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::node::{Document, Node, NodeId, ROOT_KEY};

/// Root node id assigned when upgrading payloads that carry none.
const UPGRADED_ROOT_ID: &str = "root";

/// Wire shape of one canonical node-map entry.
#[derive(Debug, Clone, Default, Deserialize)]
struct CanonicalNode {
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    props: Map<String, Value>,
    #[serde(rename = "isCanvas", default)]
    is_canvas: bool,
    #[serde(default)]
    children: Vec<String>,
}

/// Parse any accepted dialect from text.
///
/// The input gets exactly one JSON decode; anything that is not valid JSON,
/// or that no detector recognizes, yields `None`. The caller renders the
/// explicit empty-page state in that case — a bad payload is never a crash.
#[must_use]
pub fn parse(input: &str) -> Option<Document> {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => parse_value(&value),
        Err(err) => {
            debug!(error = %err, "rejecting malformed page payload");
            None
        }
    }
}

/// Parse an already-decoded value.
///
/// Detectors run in priority order: direct tree, wrapped, legacy array.
#[must_use]
pub fn parse_value(value: &Value) -> Option<Document> {
    const DETECTORS: &[fn(&Value) -> Option<Document>] =
        &[detect_direct_tree, detect_wrapped, detect_legacy_array];
    DETECTORS.iter().find_map(|detect| detect(value))
}

/// Direct-tree dialect: an object with a `ROOT` key.
///
/// `ROOT` holds either the root node id (the shape the write side emits) or
/// the root node object itself (older saves, where `ROOT` *is* the root
/// node). Both are accepted; in the latter case the root node is re-keyed to
/// an ordinary id so the canonical write side stays collision-free.
fn detect_direct_tree(value: &Value) -> Option<Document> {
    let entries = value.as_object()?;
    match entries.get(ROOT_KEY)? {
        Value::String(root_id) => {
            let root_id = NodeId::new(root_id.clone());
            build_from_node_map(entries, &root_id, Some(ROOT_KEY))
        }
        Value::Object(_) => {
            let root_id = fresh_root_id(entries);
            let mut doc = build_from_node_map(entries, &NodeId::new(ROOT_KEY), None)?;
            rekey_root(&mut doc, &root_id);
            Some(doc)
        }
        _ => None,
    }
}

/// Wrapped dialect: `{ "rootNodeId": ..., "nodes": { direct-tree map } }`.
fn detect_wrapped(value: &Value) -> Option<Document> {
    let envelope = value.as_object()?;
    let root_id = envelope.get("rootNodeId")?.as_str()?;
    let nodes = envelope.get("nodes")?.as_object()?;
    build_from_node_map(nodes, &NodeId::new(root_id), Some(ROOT_KEY))
}

/// Build a document from a node map, wiring parent back-references.
///
/// Entries that do not decode as nodes are skipped with a debug log rather
/// than failing the whole payload; `skip_key` names a non-node bookkeeping
/// entry (the root reference) to pass over silently.
fn build_from_node_map(
    entries: &Map<String, Value>,
    root_id: &NodeId,
    skip_key: Option<&str>,
) -> Option<Document> {
    let mut nodes: HashMap<NodeId, Node> = HashMap::new();
    for (key, entry) in entries {
        if skip_key == Some(key.as_str()) {
            continue;
        }
        let wire: CanonicalNode = match serde_json::from_value(entry.clone()) {
            Ok(wire) => wire,
            Err(err) => {
                debug!(node = %key, error = %err, "skipping undecodable node entry");
                continue;
            }
        };
        let id = NodeId::new(key.clone());
        nodes.insert(
            id.clone(),
            Node {
                id,
                type_name: wire.type_name,
                props: wire.props,
                is_canvas: wire.is_canvas,
                children: wire.children.into_iter().map(NodeId::new).collect(),
                parent: None,
            },
        );
    }
    let links: Vec<(NodeId, NodeId)> = nodes
        .values()
        .flat_map(|node| {
            node.children
                .iter()
                .map(|child| (child.clone(), node.id.clone()))
        })
        .collect();
    for (child, parent) in links {
        if let Some(child_node) = nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
    }
    Document::from_parts(root_id.clone(), nodes)
}

/// Pick a root id that does not collide with any existing map key.
fn fresh_root_id(entries: &Map<String, Value>) -> NodeId {
    if !entries.contains_key(UPGRADED_ROOT_ID) {
        return NodeId::new(UPGRADED_ROOT_ID);
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{UPGRADED_ROOT_ID}-{counter}");
        if !entries.contains_key(&candidate) {
            return NodeId::new(candidate);
        }
        counter += 1;
    }
}

/// Re-key the root node after parsing an old-style payload whose root node
/// sat under the reserved `ROOT` key.
fn rekey_root(doc: &mut Document, new_id: &NodeId) {
    let old_id = NodeId::new(ROOT_KEY);
    let Some(mut root) = doc.take(&old_id) else {
        return;
    };
    root.id = new_id.clone();
    let child_ids = root.children.clone();
    doc.insert_node(root);
    for child in &child_ids {
        if let Some(child_node) = doc.get_mut(child) {
            child_node.parent = Some(new_id.clone());
        }
    }
    doc.set_root(new_id.clone());
}

// ---------------------------------------------------------------------------
// Legacy array dialect
// ---------------------------------------------------------------------------

/// The closed set of legacy block kinds, after alias normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKind {
    /// Generic container (`container` and `section`).
    Container,
    /// Heading text.
    Heading,
    /// Body text (`text` and `paragraph`).
    Paragraph,
    /// Call-to-action button.
    Button,
    /// Static image.
    Image,
    /// Hero banner bound to the event summary.
    Hero,
    /// Event name, bound.
    EventTitle,
    /// Event description, bound.
    EventDescription,
    /// Event logo, bound.
    EventLogo,
    /// Session list (`agenda` and `sessions`).
    Agenda,
    /// Speaker list (`speakers` and `intervenants`).
    Speakers,
}

impl LegacyKind {
    /// Parse a legacy kind string, accepting historical aliases.
    #[must_use]
    pub fn from_kind(kind: &str) -> Option<Self> {
        let kind = match kind {
            "container" | "section" => Self::Container,
            "heading" => Self::Heading,
            "text" | "paragraph" => Self::Paragraph,
            "button" => Self::Button,
            "image" => Self::Image,
            "hero" => Self::Hero,
            "event-title" => Self::EventTitle,
            "event-description" => Self::EventDescription,
            "event-logo" => Self::EventLogo,
            "agenda" | "sessions" => Self::Agenda,
            "speakers" | "intervenants" => Self::Speakers,
            _ => return None,
        };
        Some(kind)
    }

    /// The canonical type name this kind upgrades to.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Heading => "Heading",
            Self::Paragraph => "Paragraph",
            Self::Button => "Button",
            Self::Image => "Image",
            Self::Hero => "Hero",
            Self::EventTitle => "EventTitle",
            Self::EventDescription => "EventDescription",
            Self::EventLogo => "EventLogo",
            Self::Agenda => "Agenda",
            Self::Speakers => "Speakers",
        }
    }

    /// Whether this kind owns nested blocks.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Container)
    }
}

/// Validated props for the heading kind.
#[derive(Debug, Clone, Deserialize)]
struct HeadingProps {
    #[serde(default)]
    text: String,
    #[serde(default = "default_heading_level")]
    level: u8,
}

impl Default for HeadingProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            level: default_heading_level(),
        }
    }
}

fn default_heading_level() -> u8 {
    2
}

/// Validated props for plain text kinds.
#[derive(Debug, Clone, Default, Deserialize)]
struct TextProps {
    #[serde(default)]
    text: String,
}

/// Validated props for the button kind.
#[derive(Debug, Clone, Default, Deserialize)]
struct ButtonProps {
    #[serde(default, alias = "text")]
    label: String,
    #[serde(default, alias = "url")]
    href: String,
}

/// Validated props for the image kind.
#[derive(Debug, Clone, Default, Deserialize)]
struct ImageProps {
    #[serde(default)]
    src: String,
    #[serde(default)]
    alt: String,
}

/// Validated props for the hero kind. Absent values defer to event data.
#[derive(Debug, Clone, Default, Deserialize)]
struct HeroProps {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
}

/// Validated props for bound scalar kinds: an optional explicit override.
#[derive(Debug, Clone, Default, Deserialize)]
struct BoundTextProps {
    #[serde(default)]
    text: Option<String>,
}

/// Validated props for the event-logo kind.
#[derive(Debug, Clone, Default, Deserialize)]
struct LogoProps {
    #[serde(default)]
    src: Option<String>,
}

/// Decode typed props leniently: a garbled record falls back to defaults
/// instead of failing the block.
fn decode_props<T: Default + for<'de> Deserialize<'de>>(kind: &str, raw: &Map<String, Value>) -> T {
    match serde_json::from_value(Value::Object(raw.clone())) {
        Ok(props) => props,
        Err(err) => {
            debug!(kind, error = %err, "garbled legacy props; using defaults");
            T::default()
        }
    }
}

fn insert_text(props: &mut Map<String, Value>, key: &str, value: String) {
    props.insert(key.to_string(), Value::String(value));
}

fn insert_opt(props: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        props.insert(key.to_string(), Value::String(value));
    }
}

/// Upgrade one kind's raw props into canonical props.
fn upgraded_props(kind: LegacyKind, raw: &Map<String, Value>) -> Map<String, Value> {
    let kind_name = kind.type_name();
    let mut props = Map::new();
    match kind {
        LegacyKind::Container | LegacyKind::Agenda | LegacyKind::Speakers => {
            // Layout options pass through untouched.
            props = raw.clone();
        }
        LegacyKind::Heading => {
            let decoded: HeadingProps = decode_props(kind_name, raw);
            insert_text(&mut props, "text", decoded.text);
            props.insert("level".to_string(), Value::from(decoded.level.clamp(1, 6)));
        }
        LegacyKind::Paragraph => {
            let decoded: TextProps = decode_props(kind_name, raw);
            insert_text(&mut props, "text", decoded.text);
        }
        LegacyKind::Button => {
            let decoded: ButtonProps = decode_props(kind_name, raw);
            insert_text(&mut props, "label", decoded.label);
            insert_text(&mut props, "href", decoded.href);
        }
        LegacyKind::Image => {
            let decoded: ImageProps = decode_props(kind_name, raw);
            insert_text(&mut props, "src", decoded.src);
            insert_text(&mut props, "alt", decoded.alt);
        }
        LegacyKind::Hero => {
            let decoded: HeroProps = decode_props(kind_name, raw);
            insert_opt(&mut props, "title", decoded.title);
            insert_opt(&mut props, "subtitle", decoded.subtitle);
        }
        LegacyKind::EventTitle | LegacyKind::EventDescription => {
            let decoded: BoundTextProps = decode_props(kind_name, raw);
            insert_opt(&mut props, "text", decoded.text);
        }
        LegacyKind::EventLogo => {
            let decoded: LogoProps = decode_props(kind_name, raw);
            insert_opt(&mut props, "src", decoded.src);
        }
    }
    props
}

/// Sequential id generator for blocks that arrive without one.
struct LegacyIdGenerator {
    counter: usize,
}

impl LegacyIdGenerator {
    fn new() -> Self {
        Self { counter: 0 }
    }

    fn next_id(&mut self, doc: &Document) -> NodeId {
        loop {
            self.counter += 1;
            let candidate = NodeId::new(format!("block-{}", self.counter));
            if !doc.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// Pick the id for a legacy block: its own, when present and free, else the
/// next generated one.
fn legacy_block_id(block: &Map<String, Value>, doc: &Document, ids: &mut LegacyIdGenerator) -> NodeId {
    if let Some(own) = block.get("id").and_then(Value::as_str) {
        let own = NodeId::new(own);
        if crate::node::validate_node_id(&own).is_ok() && !doc.contains(&own) {
            return own;
        }
    }
    ids.next_id(doc)
}

/// Legacy array dialect: an ordered sequence of untyped block records.
///
/// Upgraded once, here, into a canonical document under a synthetic root
/// container, so the renderer has exactly one algorithm.
fn detect_legacy_array(value: &Value) -> Option<Document> {
    let blocks = value.as_array()?;
    let looks_like_blocks = blocks
        .iter()
        .all(|b| b.get("type").is_some_and(Value::is_string));
    if !looks_like_blocks {
        return None;
    }
    let root_id = NodeId::new(UPGRADED_ROOT_ID);
    let mut doc = Document::new(Node::canvas(root_id.clone(), "Container"));
    let mut ids = LegacyIdGenerator::new();
    for block in blocks {
        upgrade_block(block, &root_id, &mut doc, &mut ids);
    }
    Some(doc)
}

/// Upgrade one legacy block (and, for containers, its nested blocks).
fn upgrade_block(
    block: &Value,
    parent: &NodeId,
    doc: &mut Document,
    ids: &mut LegacyIdGenerator,
) {
    let Some(record) = block.as_object() else {
        debug!("skipping non-object legacy block");
        return;
    };
    let Some(kind_str) = record.get("type").and_then(Value::as_str) else {
        debug!("skipping legacy block without a type");
        return;
    };
    let raw_props = record
        .get("props")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let id = legacy_block_id(record, doc, ids);

    let node = match LegacyKind::from_kind(kind_str) {
        Some(kind) => {
            let mut node = if kind.is_container() {
                Node::canvas(id.clone(), kind.type_name())
            } else {
                Node::new(id.clone(), kind.type_name())
            };
            node.props = upgraded_props(kind, &raw_props);
            node
        }
        None => {
            debug!(kind = kind_str, "unknown legacy kind; carrying through as-is");
            Node::new(id.clone(), kind_str).with_props(raw_props)
        }
    };

    let is_container = node.is_canvas;
    if doc.add_child(parent, node).is_err() {
        return;
    }
    if let Some(children) = record.get("children").and_then(Value::as_array) {
        if is_container {
            for child in children {
                upgrade_block(child, &id, doc, ids);
            }
        } else if !children.is_empty() {
            debug!(kind = kind_str, "ignoring children of a leaf legacy block");
        }
    }
}
