//! Schema conversion engine: JSON Schema documents ⇄ editable, pointer-addressed node maps.
//!
//! ```text
//! document ──build_node_map──▶ NodeMap ──(remove | rename | insert | create_child)*──▶ NodeMap
//!    ▲                                                                                   │
//!    └────────────────────────────────────build_document─────────────────────────────────┘
//! ```
//!
//! The `NodeMap` methods edit in place and leave the map untouched on error. The free
//! functions below are the copy-on-write flavour: they never modify their input.
pub mod emit;
pub mod error;
pub mod fragment;
pub mod ingest;
pub mod mutate;
pub mod node;
pub mod node_map;
pub mod path_de;
pub mod pointer;

use serde_json::Value;

pub use emit::build_document;
pub use error::{Result, SchemaError};
pub use ingest::build_node_map;
pub use node::{CombinationKind, FieldType, GenericKeywords, Node, NodeId, NodeKind, ObjectKind, Reference};
pub use node_map::NodeMap;
pub use pointer::PointerTable;

/// `map` without the subtree at `pointer`.
pub fn remove(map: &NodeMap, pointer: &str) -> Result<NodeMap> {
    let mut next = map.clone();
    next.remove(pointer)?;
    Ok(next)
}

/// `map` with `old_pointer` renamed to `new_pointer`.
pub fn rename(map: &NodeMap, old_pointer: &str, new_pointer: &str) -> Result<NodeMap> {
    let mut next = map.clone();
    next.rename(old_pointer, new_pointer)?;
    Ok(next)
}

/// `map` with `node` attached.
pub fn insert(map: &NodeMap, node: Node) -> Result<NodeMap> {
    let mut next = map.clone();
    next.insert(node)?;
    Ok(next)
}

/// Doc → map → doc in one go.
pub fn round_trip(document: &Value) -> Result<Value> {
    Ok(build_document(&build_node_map(document)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn functional_edits_leave_the_input_alone() {
        let map = build_node_map(&json!({"properties": {"a": {"properties": {"b": {}}}}})).unwrap();
        let renamed = rename(&map, "#/properties/a", "#/properties/z").unwrap();
        assert!(map.find("#/properties/a").is_some());
        assert!(renamed.find("#/properties/z/properties/b").is_some());

        let removed = remove(&renamed, "#/properties/z").unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(renamed.len(), 3);

        assert!(matches!(rename(&map, "#/properties/a", "#/properties/a"), Err(SchemaError::StructuralViolation(_))));
    }

    #[test]
    fn functional_insert() {
        let mut map = build_node_map(&json!({"type": "object"})).unwrap();
        let root = map.root().unwrap().node_id;
        let child = map.create_child(root, "x", true).unwrap();
        let next = insert(&map, child).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(build_document(&next), json!({"type": "object", "$defs": {"x": {}}}));
    }

    #[test]
    fn round_trip_identity() {
        let doc = json!({"type": ["string", "null"], "title": "maybe", "x-note": 1});
        assert_eq!(round_trip(&doc).unwrap(), doc);
    }
}
