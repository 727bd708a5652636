//! Document → node map.
//!
//! One recursive descent builds every node with its raw `$ref` text, then a second pass
//! resolves references against the pointer table and lets untyped references inherit the type
//! of what they point to.
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::fragment::{self, field_type::read_type, Fragment};
use crate::node::{FieldType, IdGenerator, Node, NodeId, NodeKind, Reference};
use crate::node_map::NodeMap;
use crate::pointer::{self, Step};

pub fn build_node_map(document: &Value) -> Result<NodeMap> {
    let Some(root) = document.as_object() else {
        return Err(SchemaError::UnsupportedFragment {
            pointer: pointer::ROOT.to_string(),
            reason: "the root schema must be a JSON object".to_string(),
        });
    };

    let mut ingest = Ingest::default();
    ingest.visit(root, pointer::ROOT.to_string(), false)?;
    let Ingest { mut nodes, ids } = ingest;

    resolve_references(&mut nodes);
    debug!(nodes = nodes.len(), "built node map");
    Ok(NodeMap { nodes, ids })
}

#[derive(Default)]
struct Ingest {
    nodes: IndexMap<NodeId, Node>,
    ids: IdGenerator,
}

impl Ingest {
    /// Parents are inserted before their children, so the table is in pre-order.
    fn visit(&mut self, fragment: &Fragment, pointer: String, is_required: bool) -> Result<NodeId> {
        let kind = fragment::classify(fragment);
        let type_info = read_type(fragment, &kind);
        trace!(%pointer, kind = ?kind.object_kind(), field_type = ?type_info.field_type, "visit");

        let mut node = self.ids.create_node(pointer)?;
        node.kind = kind;
        node.field_type = type_info.field_type;
        node.implicit_type = type_info.implicit_type;
        node.is_nillable = type_info.is_nillable;
        node.is_required = is_required;
        node.custom = fragment::extract_custom(fragment, &type_info);
        node.restrictions = fragment::extract_restrictions(fragment);
        node.generic = fragment::extract_generic(fragment);
        node.declared_required = fragment::required_names(fragment);

        let id = node.node_id;
        let parent_pointer = node.pointer.clone();
        self.nodes.insert(id, node);

        let required = fragment::required_names(fragment).unwrap_or_default();
        let mut children = Vec::new();

        for combinator in fragment::present_combinators(fragment) {
            for (index, member) in fragment::members(fragment, combinator).into_iter().flatten().enumerate() {
                if let Some(member) = member.as_object() {
                    let step = Step::Member(combinator, index);
                    children.push(self.visit(member, pointer::append(&parent_pointer, &step), false)?);
                }
            }
        }
        if let Some(items) = fragment::items(fragment) {
            children.push(self.visit(items, pointer::append(&parent_pointer, &Step::Items), false)?);
        }
        let definitions: [(&str, fn(String) -> Step); 2] = [
            (fragment::keywords::DEFS, Step::Definition as fn(String) -> Step),
            (fragment::keywords::DEFINITIONS, Step::LegacyDefinition as fn(String) -> Step),
        ];
        for (keyword, make_step) in definitions {
            for (name, sub) in fragment::schema_map(fragment, keyword).into_iter().flatten() {
                if let Some(sub) = sub.as_object() {
                    let step = make_step(name.clone());
                    children.push(self.visit(sub, pointer::append(&parent_pointer, &step), false)?);
                }
            }
        }
        for (name, sub) in fragment::schema_map(fragment, fragment::keywords::PROPERTIES).into_iter().flatten() {
            if let Some(sub) = sub.as_object() {
                let step = Step::Property(name.clone());
                let is_required = required.contains(name);
                children.push(self.visit(sub, pointer::append(&parent_pointer, &step), is_required)?);
            }
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        Ok(id)
    }
}

/// Swap `$ref` text for node ids where the target is in the map, then fill in missing types.
fn resolve_references(nodes: &mut IndexMap<NodeId, Node>) {
    let table = pointer::PointerTable::from_nodes(nodes.values());
    for node in nodes.values_mut() {
        let resolved = match &node.kind {
            NodeKind::Reference(Reference::Pointer(raw)) => {
                let target = table.id_of(raw);
                if target.is_none() {
                    trace!(pointer = %node.pointer, target = %raw, "reference left unresolved");
                }
                target
            }
            _ => None,
        };
        if let Some(target) = resolved {
            node.kind = NodeKind::Reference(Reference::Node(target));
        }
    }

    let inherited: Vec<(NodeId, FieldType)> = nodes
        .values()
        .filter(|node| node.field_type.is_none())
        .filter_map(|node| referenced_type(nodes, node).map(|ty| (node.node_id, ty)))
        .collect();
    for (id, ty) in inherited {
        if let Some(node) = nodes.get_mut(&id) {
            node.field_type = Some(ty);
        }
    }
}

/// Follow resolved references until something typed turns up. Cycles end after one lap.
fn referenced_type(nodes: &IndexMap<NodeId, Node>, start: &Node) -> Option<FieldType> {
    let mut current = start;
    for _ in 0..nodes.len() {
        let Some(Reference::Node(target)) = current.reference() else { return None };
        current = nodes.get(target)?;
        if current.field_type.is_some() {
            return current.field_type;
        }
    }
    None
}
