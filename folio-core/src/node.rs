//! Page nodes and the document tree that owns them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CoreResult, DocumentError, DocumentViolation};

/// Maximum length for node ids.
pub const MAX_NODE_ID_LEN: usize = 64;

/// Reserved key carrying the root reference in the canonical serialized form.
pub const ROOT_KEY: &str = "ROOT";

/// Unique identifier for a node within a document.
///
/// Ids arriving through serialized input are arbitrary strings; ids for nodes
/// created in an editing session are minted with [`NodeId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing id without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh id for a node created interactively.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Check if a character is valid for node ids (alphanumeric, hyphen, or underscore).
fn is_valid_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Validate a node id for use in a document.
///
/// Valid ids are 1-64 characters of alphanumerics, hyphens, and underscores.
/// The literal `ROOT` is reserved for the canonical root reference and is
/// rejected as an ordinary node id.
///
/// # Errors
///
/// Returns [`DocumentError::InvalidNodeId`] describing the first problem found.
pub fn validate_node_id(id: &NodeId) -> CoreResult<()> {
    let raw = id.as_str();
    if raw.is_empty() {
        return Err(DocumentError::InvalidNodeId("empty id".to_string()));
    }
    if raw.len() > MAX_NODE_ID_LEN {
        return Err(DocumentError::InvalidNodeId(format!(
            "{raw}: longer than {MAX_NODE_ID_LEN} chars"
        )));
    }
    if raw == ROOT_KEY {
        return Err(DocumentError::InvalidNodeId(format!(
            "{ROOT_KEY} is reserved for the root reference"
        )));
    }
    if !raw.chars().all(is_valid_id_char) {
        return Err(DocumentError::InvalidNodeId(format!(
            "{raw}: contains invalid characters"
        )));
    }
    Ok(())
}

/// One addressable element of a page's structural tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier within the document.
    pub id: NodeId,
    /// Type name, resolved against the registry at render time.
    pub type_name: String,
    /// Type-specific properties, merged over the type's defaults at render time.
    pub props: Map<String, Value>,
    /// Whether this node is a container that may own children.
    pub is_canvas: bool,
    /// Child node ids in rendering order.
    pub children: Vec<NodeId>,
    /// Back-reference to the owning parent. `None` only for the root.
    pub parent: Option<NodeId>,
}

impl Node {
    /// Create a leaf node of the given type.
    #[must_use]
    pub fn new(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            props: Map::new(),
            is_canvas: false,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Create a canvas node of the given type.
    #[must_use]
    pub fn canvas(id: NodeId, type_name: impl Into<String>) -> Self {
        let mut node = Self::new(id, type_name);
        node.is_canvas = true;
        node
    }

    /// Set a prop, builder-style.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Replace the whole prop map, builder-style.
    #[must_use]
    pub fn with_props(mut self, props: Map<String, Value>) -> Self {
        self.props = props;
        self
    }

    /// Look up a prop value.
    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Look up a prop as a string slice.
    #[must_use]
    pub fn text_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

/// One page: a root reference plus exclusive ownership of every node
/// reachable from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

impl Document {
    /// Create a document owning a single root node.
    #[must_use]
    pub fn new(root_node: Node) -> Self {
        let root = root_node.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), root_node);
        Self { root, nodes }
    }

    /// Assemble a document from a pre-built node map.
    ///
    /// Returns `None` if the root reference is missing from the map.
    pub(crate) fn from_parts(root: NodeId, nodes: HashMap<NodeId, Node>) -> Option<Self> {
        if nodes.contains_key(&root) {
            Some(Self { root, nodes })
        } else {
            None
        }
    }

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by id.
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Insert a node into the map without wiring any parent/child links.
    ///
    /// This is a raw building block for adapters and editing operations;
    /// it performs no invariant checks. Use [`Document::validate`] to audit
    /// the result.
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn take(&mut self, id: &NodeId) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Attach a node as the last child of `parent`, wiring both directions.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] if the parent is missing.
    pub fn add_child(&mut self, parent: &NodeId, mut node: Node) -> CoreResult<()> {
        if !self.nodes.contains_key(parent) {
            return Err(DocumentError::NodeNotFound(parent.to_string()));
        }
        node.parent = Some(parent.clone());
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(())
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    ///
    /// Tolerates corrupted parent chains: a cycle terminates the walk instead
    /// of hanging it.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut current = self.nodes.get(id).and_then(|n| n.parent.as_ref());
        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            if !seen.insert(parent_id) {
                return false;
            }
            current = self.nodes.get(parent_id).and_then(|n| n.parent.as_ref());
        }
        false
    }

    /// Collect the ids of a subtree, depth-first, starting at `id`.
    ///
    /// Each node is visited once even if the child graph is corrupted.
    #[must_use]
    pub fn collect_subtree(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                for child in node.children.iter().rev() {
                    stack.push(child.clone());
                }
            }
            out.push(current);
        }
        out
    }

    /// Remove a subtree from the node map, returning the removed ids.
    ///
    /// The caller is responsible for detaching the subtree root from its
    /// parent's child list first.
    pub fn remove_subtree(&mut self, id: &NodeId) -> Vec<NodeId> {
        let ids = self.collect_subtree(id);
        for removed in &ids {
            self.nodes.remove(removed);
        }
        ids
    }

    /// Audit the structural invariants and report every violation found.
    #[must_use]
    pub fn validate(&self) -> Vec<DocumentViolation> {
        let mut violations = Vec::new();
        if !self.nodes.contains_key(&self.root) {
            violations.push(DocumentViolation::MissingRoot(self.root.to_string()));
            return violations;
        }
        let mut seen: HashSet<NodeId> = HashSet::new();
        seen.insert(self.root.clone());
        let mut stack = vec![self.root.clone()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.is_canvas && !node.children.is_empty() {
                violations.push(DocumentViolation::LeafWithChildren(id.to_string()));
            }
            for child_id in &node.children {
                match self.nodes.get(child_id) {
                    None => violations.push(DocumentViolation::DanglingChild {
                        parent: id.to_string(),
                        child: child_id.to_string(),
                    }),
                    Some(child) => {
                        if child.parent.as_ref() != Some(&id) {
                            violations.push(DocumentViolation::ParentMismatch {
                                parent: id.to_string(),
                                child: child_id.to_string(),
                            });
                        }
                        if seen.insert(child_id.clone()) {
                            stack.push(child_id.clone());
                        } else {
                            violations.push(DocumentViolation::SharedNode(child_id.to_string()));
                        }
                    }
                }
            }
        }
        for id in self.nodes.keys() {
            if !seen.contains(id) {
                violations.push(DocumentViolation::Unreachable(id.to_string()));
            }
        }
        violations
    }

    /// Serialize to the canonical direct-tree form.
    ///
    /// The output carries a `ROOT` key holding the root node id, followed by
    /// one entry per node. Entries are keyed by id and sorted, so the same
    /// document always serializes to the same bytes.
    #[must_use]
    pub fn to_canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            ROOT_KEY.to_string(),
            Value::String(self.root.to_string()),
        );
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for id in ids {
            if let Some(node) = self.nodes.get(id) {
                let mut entry = Map::new();
                entry.insert("type".to_string(), Value::String(node.type_name.clone()));
                entry.insert("props".to_string(), Value::Object(node.props.clone()));
                entry.insert("isCanvas".to_string(), Value::Bool(node.is_canvas));
                entry.insert(
                    "children".to_string(),
                    Value::Array(
                        node.children
                            .iter()
                            .map(|c| Value::String(c.to_string()))
                            .collect(),
                    ),
                );
                map.insert(id.to_string(), Value::Object(entry));
            }
        }
        Value::Object(map)
    }

    /// Serialize to the canonical direct-tree JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialization`] if JSON encoding fails.
    pub fn to_canonical_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.to_canonical_value())?)
    }
}
