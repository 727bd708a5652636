//! Node map → document.
//!
//! Nodes are written in lexicographic pointer order. A pointer sorts before every pointer it is a
//! prefix of, so each parent fragment is in place before its descendants are slotted into it,
//! and one flat pass rebuilds arbitrarily deep nesting. Combinator slots that sort early
//! (`anyOf/10` before `anyOf/2`) are padded and filled in later. Sorting scrambles sibling
//! names, so a last pass puts each `properties`/`$defs` object back in child order.
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::fragment::{self, keywords, Fragment};
use crate::node::{Node, NodeKind};
use crate::node_map::{property_name, NodeMap};
use crate::pointer::{self, Step};

pub fn build_document(map: &NodeMap) -> Value {
    let mut document = Value::Object(Map::new());

    let mut order: Vec<&Node> = map.nodes().collect();
    order.sort_by(|a, b| a.pointer.cmp(&b.pointer));

    for node in order {
        let steps = match pointer::parse(&node.pointer) {
            Ok(steps) => steps,
            Err(error) => {
                warn!(%error, "skipping node with unparseable pointer");
                continue;
            }
        };
        write_at(&mut document, &steps, Value::Object(node_fragment(map, node)));
    }
    for node in map.nodes() {
        restore_member_order(map, node, &mut document);
    }

    debug!(nodes = map.len(), "rebuilt document");
    document
}

/// One node's own keywords. Custom keys go in first so structural keys win on collisions.
fn node_fragment(map: &NodeMap, node: &Node) -> Fragment {
    let mut out = node.custom.clone();

    if let NodeKind::Combination(kind) = node.kind {
        out.insert(kind.keyword().to_string(), Value::Array(Vec::new()));
    }
    if let Some(target) = map.reference_pointer(node) {
        out.insert(keywords::REF.to_string(), Value::String(target));
    }
    if let Some(ty) = fragment::type_to_fragment(node) {
        out.insert(keywords::TYPE.to_string(), ty);
    }
    fragment::write_generic(&node.generic, &mut out);
    fragment::write_restrictions(&node.restrictions, &mut out);

    if map.children(node.node_id).any(|child| property_name(child).is_some()) {
        out.entry(keywords::PROPERTIES)
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(required) = map.required_keyword(node.node_id) {
        out.insert(keywords::REQUIRED.to_string(), json!(required));
    }
    out
}

/// Opaque entries first, as read, then named children in `children` order.
fn restore_member_order(map: &NodeMap, node: &Node, document: &mut Value) {
    let named: Vec<Step> = map
        .children(node.node_id)
        .filter_map(|child| pointer::last_step(&child.pointer).ok().flatten())
        .filter(|step| step.name().is_some())
        .collect();
    if named.len() < 2 {
        return;
    }
    let Ok(steps) = pointer::parse(&node.pointer) else { return };
    let Some(fragment) = find_mut(document, &steps) else { return };

    for keyword in [keywords::PROPERTIES, keywords::DEFS, keywords::DEFINITIONS] {
        let names: Vec<String> = named
            .iter()
            .filter(|step| step.keyword() == keyword)
            .filter_map(|step| step.name().map(str::to_string))
            .collect();
        let Some(Value::Object(members)) = fragment.get_mut(keyword) else { continue };
        if names.len() < 2 {
            continue;
        }
        let mut sorted = std::mem::take(members);
        let opaque: Vec<String> = sorted.keys().filter(|key| !names.contains(*key)).cloned().collect();
        for key in opaque.iter().chain(&names) {
            if let Some(value) = sorted.remove(key) {
                members.insert(key.clone(), value);
            }
        }
    }
}

/// Existing slot at `steps`, without creating anything.
fn find_mut<'a>(document: &'a mut Value, steps: &[Step]) -> Option<&'a mut Value> {
    let mut slot = document;
    for step in steps {
        slot = match step {
            Step::Property(name) | Step::Definition(name) | Step::LegacyDefinition(name) => {
                slot.get_mut(step.keyword())?.get_mut(name.as_str())?
            }
            Step::Items => slot.get_mut(keywords::ITEMS)?,
            Step::Member(kind, index) => slot.get_mut(kind.keyword())?.get_mut(*index)?,
        };
    }
    Some(slot)
}

fn write_at(document: &mut Value, steps: &[Step], value: Value) {
    let mut slot = document;
    for step in steps {
        slot = child_slot(slot, step);
    }
    *slot = value;
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// The slot `step` addresses inside `fragment`, creating containers on the way.
fn child_slot<'a>(fragment: &'a mut Value, step: &Step) -> &'a mut Value {
    let container = object_mut(fragment);
    match step {
        Step::Property(name) | Step::Definition(name) | Step::LegacyDefinition(name) => {
            let members = container
                .entry(step.keyword())
                .or_insert_with(|| Value::Object(Map::new()));
            object_mut(members).entry(name.clone()).or_insert(Value::Null)
        }
        Step::Items => container.entry(keywords::ITEMS).or_insert(Value::Null),
        Step::Member(kind, index) => {
            let members = container
                .entry(kind.keyword())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !members.is_array() {
                *members = Value::Array(Vec::new());
            }
            let Value::Array(members) = members else {
                unreachable!("value was just replaced by an array")
            };
            if members.len() <= *index {
                members.resize(index + 1, Value::Null);
            }
            &mut members[*index]
        }
    }
}
