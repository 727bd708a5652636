//! The node map: every node of one schema document, keyed by id.
//!
//! Storage is an insertion-ordered table of nodes addressed by small integer ids. The
//! pointer ⇄ id index is never stored; call [`NodeMap::pointer_table`] when one is needed.
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::node::{IdGenerator, Node, NodeId, Reference};
use crate::pointer::{self, PointerTable, Step};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "Vec<Node>", try_from = "Vec<Node>")]
pub struct NodeMap {
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) ids: IdGenerator,
}

impl NodeMap {
    /// Forward conversion; see [`crate::ingest`].
    pub fn from_schema(document: &Value) -> Result<Self> {
        crate::ingest::build_node_map(document)
    }

    /// Inverse conversion; see [`crate::emit`].
    pub fn to_schema(&self) -> Value {
        crate::emit::build_document(self)
    }

    /// Adopt externally built nodes (e.g. a saved map). Invariants are checked.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self> {
        let mut table = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            let id = node.node_id;
            if table.insert(id, node).is_some() {
                return Err(SchemaError::CorruptedMap(format!("node id {id} appears twice")));
            }
        }
        let ids = IdGenerator::after(table.keys());
        let map = NodeMap { nodes: table, ids };
        map.validate()?;
        Ok(map)
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn get(&self, id: NodeId) -> Option<&Node> { self.nodes.get(&id) }

    pub fn contains(&self, id: NodeId) -> bool { self.nodes.contains_key(&id) }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> { self.nodes.values() }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.values().find(|node| node.is_root())
    }

    pub fn find(&self, pointer: &str) -> Option<&Node> {
        self.nodes.values().find(|node| node.pointer == pointer)
    }

    pub fn pointer_table(&self) -> PointerTable {
        PointerTable::from_nodes(self.nodes.values())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.nodes.get(child))
    }

    /// Pointer a `$ref` should carry for this node's reference.
    pub fn reference_pointer(&self, node: &Node) -> Option<String> {
        match node.reference()? {
            Reference::Pointer(raw) => Some(raw.clone()),
            Reference::Node(target) => self.nodes.get(target).map(|t| t.pointer.clone()),
        }
    }

    // ————————————————————————————————————————————————————————————————————————
    // REQUIRED PROPS
    // ————————————————————————————————————————————————————————————————————————

    /// Names of required property children, in child order; `None` rather than empty.
    pub fn required_props(&self, id: NodeId) -> Option<Vec<String>> {
        let names: Vec<String> = self
            .children(id)
            .filter(|child| child.is_required)
            .filter_map(|child| property_name(child))
            .collect();
        if names.is_empty() { None } else { Some(names) }
    }

    /// The `required` keyword to emit for `id`.
    ///
    /// The source list keeps its order; names that still match a required property or match no
    /// property at all are retained, and newly required properties are appended. An explicit
    /// empty source list stays `[]`; no source list and nothing required means no keyword.
    pub fn required_keyword(&self, id: NodeId) -> Option<Vec<String>> {
        let node = self.nodes.get(&id)?;
        let computed = self.required_props(id).unwrap_or_default();
        let Some(declared) = &node.declared_required else {
            return if computed.is_empty() { None } else { Some(computed) };
        };
        let properties: HashSet<String> = self.children(id).filter_map(property_name).collect();
        let mut out: Vec<String> = declared
            .iter()
            .filter(|name| !properties.contains(*name) || computed.contains(*name))
            .cloned()
            .collect();
        for name in computed {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Some(out)
    }

    // ————————————————————————————————————————————————————————————————————————
    // INVARIANTS
    // ————————————————————————————————————————————————————————————————————————

    /// Check the structural invariants; the first violation is reported as `CorruptedMap`.
    pub fn validate(&self) -> Result<()> {
        let corrupted = |msg: String| Err(SchemaError::CorruptedMap(msg));

        let roots = self.nodes.values().filter(|node| node.is_root()).count();
        if roots != 1 {
            return corrupted(format!("expected exactly one root node, found {roots}"));
        }

        let table = self.pointer_table();
        if table.len() != self.nodes.len() {
            return corrupted("pointers are not unique".to_string());
        }

        for (id, node) in &self.nodes {
            if *id != node.node_id {
                return corrupted(format!("node {} is stored under id {id}", node.node_id));
            }
            if let Some(parent_pointer) = pointer::parent(&node.pointer)? {
                let Some(parent) = table.id_of(&parent_pointer).and_then(|p| self.nodes.get(&p)) else {
                    return corrupted(format!("`{}` has no parent node", node.pointer));
                };
                if !parent.children.contains(id) {
                    return corrupted(format!("`{}` is not listed by its parent", node.pointer));
                }
            }
            let mut seen = HashSet::new();
            for child_id in &node.children {
                if !seen.insert(child_id) {
                    return corrupted(format!("`{}` lists child {child_id} twice", node.pointer));
                }
                let Some(child) = self.nodes.get(child_id) else {
                    return corrupted(format!("`{}` lists missing child {child_id}", node.pointer));
                };
                if pointer::parent(&child.pointer)?.as_deref() != Some(node.pointer.as_str()) {
                    return corrupted(format!("`{}` is not a child of `{}`", child.pointer, node.pointer));
                }
            }
            if let Some(Reference::Node(target)) = node.reference() {
                if !self.nodes.contains_key(target) {
                    return corrupted(format!("`{}` references missing node {target}", node.pointer));
                }
            }
        }
        Ok(())
    }
}

/// Property name of a child addressed by `properties/<name>`.
pub(crate) fn property_name(child: &Node) -> Option<String> {
    match pointer::last_step(&child.pointer).ok()?? {
        Step::Property(name) => Some(name),
        _ => None,
    }
}

impl From<NodeMap> for Vec<Node> {
    fn from(map: NodeMap) -> Self {
        map.nodes.into_values().collect()
    }
}

impl TryFrom<Vec<Node>> for NodeMap {
    type Error = SchemaError;

    fn try_from(nodes: Vec<Node>) -> Result<Self> {
        NodeMap::from_nodes(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NodeMap {
        NodeMap::from_schema(&json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "integer"},
                "c": {"$ref": "#/$defs/d"}
            },
            "required": ["b", "a"],
            "$defs": {"d": {"type": "boolean"}}
        }))
        .unwrap()
    }

    #[test]
    fn required_props_follow_child_order() {
        let map = sample();
        let root = map.root().unwrap().node_id;
        assert_eq!(map.required_props(root), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(map.required_keyword(root), Some(vec!["b".to_string(), "a".to_string()]));

        let a = map.find("#/properties/a").unwrap().node_id;
        assert_eq!(map.required_props(a), None);
    }

    #[test]
    fn lookup_table_is_idempotent() {
        let map = sample();
        let first = map.pointer_table();
        let second = map.pointer_table();
        assert_eq!(first, second);
        assert_eq!(first.len(), map.len());
        let d = first.id_of("#/$defs/d").unwrap();
        assert_eq!(first.pointer_of(d), Some("#/$defs/d"));
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let map = sample();
        let text = serde_json::to_string(&map).unwrap();
        let back: NodeMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back.len(), map.len());
        assert_eq!(back.to_schema(), map.to_schema());

        let mut nodes: Vec<Node> = map.into();
        nodes.retain(|node| node.pointer != "#/$defs/d");
        assert!(matches!(NodeMap::from_nodes(nodes), Err(SchemaError::CorruptedMap(_))));
    }

    #[test]
    fn validate_flags_orphans() {
        let mut map = sample();
        let a = map.find("#/properties/a").unwrap().node_id;
        map.nodes.get_mut(&a).unwrap().pointer = "#/properties/zzz/properties/a".into();
        assert!(matches!(map.validate(), Err(SchemaError::CorruptedMap(_))));
    }
}
