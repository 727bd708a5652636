//! Structural edits on a node map.
//!
//! Every operation checks all of its preconditions before touching the map: either the edit is
//! applied completely or an error comes back and the map is exactly as it was.
use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::node::{CombinationKind, FieldType, Node, NodeId, NodeKind, Reference};
use crate::node_map::NodeMap;
use crate::pointer::{self, Step};

impl NodeMap {
    /// Delete the node at `pointer` and everything below it. Returns the removed nodes.
    pub fn remove(&mut self, target: &str) -> Result<Vec<Node>> {
        let table = self.pointer_table();
        let target = canonical(target)?;
        let Some(id) = table.id_of(&target) else {
            return Err(SchemaError::NotFound(target));
        };
        let Some(parent_pointer) = pointer::parent(&target)? else {
            return Err(SchemaError::StructuralViolation("the root node cannot be removed".to_string()));
        };
        let Some(parent_id) = table.id_of(&parent_pointer) else {
            return Err(SchemaError::CorruptedMap(format!("`{target}` has no parent node")));
        };

        let doomed: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| pointer::is_within(&node.pointer, &target))
            .map(|node| node.node_id)
            .collect();
        let doomed_set: HashSet<NodeId> = doomed.iter().copied().collect();
        let referrers: Vec<String> = self
            .nodes
            .values()
            .filter(|node| !doomed_set.contains(&node.node_id))
            .filter(|node| matches!(node.reference(), Some(Reference::Node(t)) if doomed_set.contains(t)))
            .map(|node| node.pointer.clone())
            .collect();
        if !referrers.is_empty() {
            return Err(SchemaError::StillReferenced { pointer: target, referrers });
        }

        let last = pointer::last_step(&target)?;
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.children.retain(|child| *child != id);
            if let Some(Step::Property(name)) = &last {
                forget_required(&mut parent.declared_required, name);
            }
        }
        let removed: Vec<Node> = doomed
            .iter()
            .filter_map(|id| self.nodes.shift_remove(id))
            .collect();

        if let Some(Step::Member(kind, index)) = last {
            self.close_member_gap(parent_id, &parent_pointer, kind, index);
        }

        debug!(pointer = %target, removed = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// Change one segment of `old` (and the pointers of all its descendants) to `new`.
    ///
    /// Either the name changes or the `properties`/`$defs`/`definitions` keyword does, never both.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Err(SchemaError::StructuralViolation(format!("`{old}` is renamed to itself")));
        }
        let old_steps = pointer::parse(old)?;
        let new_steps = pointer::parse(new)?;
        let old_segments = pointer::split_segments(old)?;
        let new_segments = pointer::split_segments(new)?;
        if old_segments.len() != new_segments.len() || old_steps.len() != new_steps.len() {
            return Err(SchemaError::StructuralViolation(format!(
                "`{old}` and `{new}` have a different number of segments"
            )));
        }
        let differing = old_segments.iter().zip(&new_segments).filter(|(a, b)| a != b).count();
        if differing != 1 {
            return Err(SchemaError::StructuralViolation(format!(
                "exactly one segment may change between `{old}` and `{new}`, found {differing}"
            )));
        }

        let (old_last, old_parent) = old_steps
            .split_last()
            .ok_or_else(|| SchemaError::StructuralViolation("the root node cannot be renamed".to_string()))?;
        let (new_last, new_parent) = new_steps
            .split_last()
            .ok_or_else(|| SchemaError::StructuralViolation("the root node cannot be renamed".to_string()))?;
        if old_parent != new_parent {
            return Err(SchemaError::StructuralViolation(format!(
                "`{old}` → `{new}` moves the node to another parent; remove and insert instead"
            )));
        }
        let (Some(old_name), Some(new_name)) = (old_last.name(), new_last.name()) else {
            return Err(SchemaError::StructuralViolation(
                "only property and definition names can be renamed".to_string(),
            ));
        };

        let old = pointer::from_steps(&old_steps);
        let new = pointer::from_steps(&new_steps);
        let table = self.pointer_table();
        let Some(id) = table.id_of(&old) else {
            return Err(SchemaError::NotFound(old));
        };
        if table.contains(&new) {
            return Err(SchemaError::AlreadyExists(new));
        }
        let parent_id = table.id_of(&pointer::from_steps(old_parent));
        if let Some(parent_id) = parent_id {
            self.check_free_slot(parent_id, new_last, &new)?;
        }

        let moved = self.repoint(&old, &new);

        let stays_property = matches!(new_last, Step::Property(_));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.is_required &= stays_property;
        }
        if let (Step::Property(_), Some(parent)) = (old_last, parent_id.and_then(|p| self.nodes.get_mut(&p))) {
            if !stays_property {
                forget_required(&mut parent.declared_required, old_name);
            } else if let Some(declared) = parent.declared_required.as_mut() {
                for name in declared.iter_mut().filter(|n| n.as_str() == old_name) {
                    *name = new_name.to_string();
                }
            }
        }

        debug!(%old, %new, moved, "renamed");
        Ok(())
    }

    /// Attach a leaf node under the node one step above its pointer.
    pub fn insert(&mut self, node: Node) -> Result<NodeId> {
        let table = self.pointer_table();
        let at = canonical(&node.pointer)?;
        if table.contains(&at) {
            return Err(SchemaError::AlreadyExists(at));
        }
        if self.nodes.contains_key(&node.node_id) {
            return Err(SchemaError::StructuralViolation(format!("node id {} is already in use", node.node_id)));
        }
        if !node.children.is_empty() {
            return Err(SchemaError::StructuralViolation("only leaf nodes can be inserted".to_string()));
        }
        if let Some(Reference::Node(target)) = node.reference() {
            if !self.nodes.contains_key(target) {
                return Err(SchemaError::NotFound(format!("reference target {target}")));
            }
        }
        let parent_id = match pointer::parent(&at)? {
            Some(parent_pointer) => match table.id_of(&parent_pointer) {
                Some(parent_id) => Some(parent_id),
                None => return Err(SchemaError::NotFound(parent_pointer)),
            },
            None => None,
        };
        if let (Some(parent_id), Some(step)) = (parent_id, pointer::last_step(&at)?) {
            self.check_free_slot(parent_id, &step, &at)?;
        }

        let id = node.node_id;
        self.ids.reserve(id);
        if let Some(parent) = parent_id.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        self.nodes.insert(id, Node { pointer: at, ..node });
        debug!(node = %id, "inserted");
        Ok(id)
    }

    /// Build (but do not attach) a new child for `parent_id`, ready for [`NodeMap::insert`].
    pub fn create_child(&mut self, parent_id: NodeId, display_name: &str, is_definition: bool) -> Result<Node> {
        let parent = self
            .nodes
            .get(&parent_id)
            .ok_or_else(|| SchemaError::NotFound(format!("node {parent_id}")))?;
        let kind = parent.object_kind();
        let field_type = parent.field_type;

        let step = match (&parent.kind, field_type) {
            (NodeKind::Array, _) => {
                return Err(SchemaError::illegal_parent(kind, field_type, "arrays do not hold named children"));
            }
            (NodeKind::Reference(_), ty) if ty != Some(FieldType::Object) => {
                return Err(SchemaError::illegal_parent(
                    kind,
                    field_type,
                    "cannot create a property under a non-object reference",
                ));
            }
            (NodeKind::Combination(combinator), _) => {
                let combinator = *combinator;
                Step::Member(combinator, self.member_count(parent_id, combinator))
            }
            (NodeKind::Field, Some(FieldType::Object)) if is_definition => {
                let legacy = self.children(parent_id).any(|child| {
                    matches!(pointer::last_step(&child.pointer), Ok(Some(Step::LegacyDefinition(_))))
                });
                if legacy {
                    Step::LegacyDefinition(display_name.to_string())
                } else {
                    Step::Definition(display_name.to_string())
                }
            }
            (NodeKind::Field, Some(FieldType::Object)) => Step::Property(display_name.to_string()),
            (NodeKind::Field, _) => {
                return Err(SchemaError::illegal_parent(kind, field_type, "cannot add a child to a scalar field"));
            }
            (NodeKind::Reference(_), _) => {
                return Err(SchemaError::illegal_parent(kind, field_type, "invalid parent"));
            }
        };

        let parent_pointer = parent.pointer.clone();
        self.ids.create_child_node(&parent_pointer, &step)
    }

    // ————————————————————————————————————————————————————————————————————————
    // HELPERS
    // ————————————————————————————————————————————————————————————————————————

    fn member_count(&self, parent_id: NodeId, kind: CombinationKind) -> usize {
        self.children(parent_id)
            .filter(|child| matches!(pointer::last_step(&child.pointer), Ok(Some(Step::Member(k, _))) if k == kind))
            .count()
    }

    /// `step` under `parent_id` neither leaves a gap in a combinator nor lands on opaque data
    /// that emission would overwrite.
    fn check_free_slot(&self, parent_id: NodeId, step: &Step, at: &str) -> Result<()> {
        let Some(parent) = self.nodes.get(&parent_id) else { return Ok(()) };
        let opaque = parent.custom.get(step.keyword());
        match step {
            Step::Member(kind, index) => {
                if opaque.is_some() {
                    return Err(SchemaError::StructuralViolation(format!(
                        "`{}` of `{}` is opaque data", kind.keyword(), parent.pointer
                    )));
                }
                let count = self.member_count(parent_id, *kind);
                if *index != count {
                    return Err(SchemaError::StructuralViolation(format!(
                        "`{at}` would leave a gap; the next `{}` member is {count}", kind.keyword()
                    )));
                }
            }
            Step::Items => {
                if opaque.is_some() {
                    return Err(SchemaError::StructuralViolation(format!(
                        "`items` of `{}` is opaque data", parent.pointer
                    )));
                }
            }
            Step::Property(name) | Step::Definition(name) | Step::LegacyDefinition(name) => match opaque {
                None => {}
                Some(Value::Object(entries)) if entries.contains_key(name.as_str()) => {
                    return Err(SchemaError::AlreadyExists(at.to_string()));
                }
                Some(Value::Object(_)) => {}
                Some(_) => {
                    return Err(SchemaError::StructuralViolation(format!(
                        "`{}` of `{}` is not an object", step.keyword(), parent.pointer
                    )));
                }
            },
        }
        Ok(())
    }

    /// Rewrite every pointer within `old` to sit within `new`. Returns how many changed.
    fn repoint(&mut self, old: &str, new: &str) -> usize {
        let mut moved = 0;
        for node in self.nodes.values_mut() {
            if let Some(next) = pointer::replace_prefix(&node.pointer, old, new) {
                node.pointer = next;
                moved += 1;
            }
        }
        moved
    }

    /// Shift members after a removed `kind/index` down by one so indexes stay dense.
    fn close_member_gap(&mut self, parent_id: NodeId, parent_pointer: &str, kind: CombinationKind, index: usize) {
        let mut later: Vec<usize> = self
            .children(parent_id)
            .filter_map(|child| match pointer::last_step(&child.pointer) {
                Ok(Some(Step::Member(k, i))) if k == kind && i > index => Some(i),
                _ => None,
            })
            .collect();
        later.sort_unstable();
        for i in later {
            let old = pointer::append(parent_pointer, &Step::Member(kind, i));
            let new = pointer::append(parent_pointer, &Step::Member(kind, i - 1));
            self.repoint(&old, &new);
        }
    }
}

/// Drop `name` from a declared `required` list. A list emptied by the edit is forgotten, so the
/// keyword is not re-emitted as `[]`.
fn forget_required(declared: &mut Option<Vec<String>>, name: &str) {
    let emptied = match declared.as_mut() {
        Some(names) => {
            let before = names.len();
            names.retain(|n| n != name);
            before > 0 && names.is_empty()
        }
        None => false,
    };
    if emptied {
        *declared = None;
    }
}

fn canonical(raw: &str) -> Result<String> {
    Ok(pointer::from_steps(&pointer::parse(raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ObjectKind;
    use serde_json::{json, Value};

    fn map_of(doc: Value) -> NodeMap {
        NodeMap::from_schema(&doc).unwrap()
    }

    fn pointers(map: &NodeMap) -> Vec<String> {
        let mut out: Vec<String> = map.nodes().map(|n| n.pointer.clone()).collect();
        out.sort();
        out
    }

    #[test]
    fn remove_cascades_to_descendants() {
        let mut map = map_of(json!({
            "properties": {
                "a": {"properties": {"x": {}, "y": {}}},
                "b": {}
            }
        }));
        let a = map.find("#/properties/a").unwrap().node_id;
        let removed = map.remove("#/properties/a").unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(pointers(&map), vec!["#", "#/properties/b"]);
        assert!(!map.root().unwrap().children.contains(&a));
        map.validate().unwrap();
    }

    #[test]
    fn remove_rejects_missing_root_and_referenced() {
        let mut map = map_of(json!({
            "properties": {"a": {"$ref": "#/$defs/d"}},
            "$defs": {"d": {"type": "string"}}
        }));
        assert!(matches!(map.remove("#/properties/zz"), Err(SchemaError::NotFound(_))));
        assert!(matches!(map.remove("#"), Err(SchemaError::StructuralViolation(_))));
        let before = map.to_schema();
        match map.remove("#/$defs/d") {
            Err(SchemaError::StillReferenced { referrers, .. }) => assert_eq!(referrers, vec!["#/properties/a"]),
            other => panic!("expected StillReferenced, got {other:?}"),
        }
        assert_eq!(map.to_schema(), before);

        map.remove("#/properties/a").unwrap();
        map.remove("#/$defs/d").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_member_keeps_indexes_dense() {
        let mut map = map_of(json!({"anyOf": [{"const": 0}, {"const": 1}, {"properties": {"p": {"const": 2}}}]}));
        map.remove("#/anyOf/0").unwrap();
        map.validate().unwrap();
        assert_eq!(map.to_schema(), json!({"anyOf": [{"const": 1}, {"properties": {"p": {"const": 2}}}]}));
    }

    #[test]
    fn remove_drops_required_name() {
        let mut map = map_of(json!({"properties": {"a": {}, "b": {}}, "required": ["a", "b"]}));
        map.remove("#/properties/a").unwrap();
        assert_eq!(map.to_schema(), json!({"properties": {"b": {}}, "required": ["b"]}));
    }

    #[test]
    fn rename_moves_descendants() {
        let mut map = map_of(json!({
            "properties": {"a": {"properties": {"nested": {"type": "string"}}}},
            "required": ["a"]
        }));
        let id = map.find("#/properties/a").unwrap().node_id;
        map.rename("#/properties/a", "#/properties/b").unwrap();
        assert_eq!(map.find("#/properties/b").unwrap().node_id, id);
        assert!(map.find("#/properties/b/properties/nested").is_some());
        assert!(map.find("#/properties/a").is_none());
        map.validate().unwrap();
        assert_eq!(map.to_schema(), json!({
            "properties": {"b": {"properties": {"nested": {"type": "string"}}}},
            "required": ["b"]
        }));
    }

    #[test]
    fn rename_keeps_references_pointing_at_the_node() {
        let mut map = map_of(json!({
            "properties": {"a": {"$ref": "#/$defs/old"}},
            "$defs": {"old": {"type": "integer"}}
        }));
        map.rename("#/$defs/old", "#/$defs/new").unwrap();
        assert_eq!(map.to_schema(), json!({
            "properties": {"a": {"$ref": "#/$defs/new"}},
            "$defs": {"new": {"type": "integer"}}
        }));
    }

    #[test]
    fn rename_property_to_definition_clears_required() {
        let mut map = map_of(json!({"properties": {"a": {}, "b": {}}, "required": ["a"]}));
        map.rename("#/properties/a", "#/$defs/a").unwrap();
        assert!(!map.find("#/$defs/a").unwrap().is_required);
        assert_eq!(map.to_schema(), json!({"properties": {"b": {}}, "$defs": {"a": {}}}));

        let mut declared_empty = map_of(json!({"properties": {"a": {}}, "required": []}));
        declared_empty.rename("#/properties/a", "#/$defs/a").unwrap();
        assert_eq!(declared_empty.to_schema(), json!({"$defs": {"a": {}}, "required": []}));
    }

    #[test]
    fn rename_changes_either_keyword_or_name() {
        let mut map = map_of(json!({"properties": {"a": {}}, "required": ["a"]}));
        let before = map.to_schema();
        let both = map.rename("#/properties/a", "#/$defs/b");
        assert!(matches!(both, Err(SchemaError::StructuralViolation(_))));
        let shape = map.rename("#/properties/a", "#/items");
        assert!(matches!(shape, Err(SchemaError::StructuralViolation(_))));
        assert_eq!(map.to_schema(), before);
    }

    #[test]
    fn rename_onto_opaque_name_is_rejected() {
        let mut map = map_of(json!({"properties": {"x": {}}, "$defs": {"x": true}}));
        let clash = map.rename("#/properties/x", "#/$defs/x");
        assert!(matches!(clash, Err(SchemaError::AlreadyExists(_))));
        assert!(map.find("#/properties/x").is_some());
    }

    #[test]
    fn remove_reports_node_without_parent() {
        let mut map = map_of(json!({"properties": {"a": {"properties": {"x": {}}}}}));
        let a = map.find("#/properties/a").unwrap().node_id;
        if let Some(node) = map.nodes.get_mut(&a) {
            node.pointer = "#/properties/elsewhere".to_string();
        }
        let before = pointers(&map);
        assert!(matches!(map.remove("#/properties/a/properties/x"), Err(SchemaError::CorruptedMap(_))));
        assert_eq!(pointers(&map), before);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn remove_last_required_name_drops_keyword() {
        let mut map = map_of(json!({"properties": {"a": {}, "b": {}}, "required": ["a"]}));
        map.remove("#/properties/a").unwrap();
        assert_eq!(map.to_schema(), json!({"properties": {"b": {}}}));
    }

    #[test]
    fn rename_rejections_leave_map_untouched() {
        let mut map = map_of(json!({
            "properties": {
                "a": {"properties": {"x": {}}},
                "b": {"properties": {"x": {}}},
                "c": {"anyOf": [{}]}
            }
        }));
        let before = pointers(&map);
        let same = map.rename("#/properties/a", "#/properties/a");
        assert!(matches!(same, Err(SchemaError::StructuralViolation(_))));
        let depth = map.rename("#/properties/a", "#/properties/a/properties/z");
        assert!(matches!(depth, Err(SchemaError::StructuralViolation(_))));
        let two = map.rename("#/properties/a/properties/x", "#/properties/q/properties/y");
        assert!(matches!(two, Err(SchemaError::StructuralViolation(_))));
        let mv = map.rename("#/properties/a/properties/x", "#/properties/c/properties/x");
        assert!(matches!(mv, Err(SchemaError::StructuralViolation(_))));
        let taken = map.rename("#/properties/a", "#/properties/b");
        assert!(matches!(taken, Err(SchemaError::AlreadyExists(_))));
        let missing = map.rename("#/properties/nope", "#/properties/zzz");
        assert!(matches!(missing, Err(SchemaError::NotFound(_))));
        let member = map.rename("#/properties/c/anyOf/0", "#/properties/c/anyOf/3");
        assert!(matches!(member, Err(SchemaError::StructuralViolation(_))));
        assert_eq!(pointers(&map), before);
    }

    #[test]
    fn create_child_kind_rules() {
        let mut map = map_of(json!({
            "type": "object",
            "properties": {
                "list": {"type": "array", "items": {}},
                "name": {"type": "string"},
                "ref_scalar": {"$ref": "#/$defs/s"},
                "ref_object": {"$ref": "#/$defs/o"},
                "choice": {"oneOf": [{}, {}]}
            },
            "$defs": {"s": {"type": "string"}, "o": {"type": "object"}}
        }));
        let id = |map: &NodeMap, p: &str| map.find(p).unwrap().node_id;

        let list = id(&map, "#/properties/list");
        match map.create_child(list, "x", false) {
            Err(SchemaError::IllegalParent { kind, .. }) => assert_eq!(kind, ObjectKind::Array),
            other => panic!("expected IllegalParent, got {other:?}"),
        }
        let name = id(&map, "#/properties/name");
        assert!(matches!(map.create_child(name, "x", false), Err(SchemaError::IllegalParent { .. })));
        let ref_scalar = id(&map, "#/properties/ref_scalar");
        assert!(matches!(map.create_child(ref_scalar, "x", false), Err(SchemaError::IllegalParent { .. })));
        let ref_object = id(&map, "#/properties/ref_object");
        assert!(matches!(map.create_child(ref_object, "x", false), Err(SchemaError::IllegalParent { .. })));

        let choice = id(&map, "#/properties/choice");
        let member = map.create_child(choice, "ignored", false).unwrap();
        assert_eq!(member.pointer, "#/properties/choice/oneOf/2");

        let root = map.root().unwrap().node_id;
        let prop = map.create_child(root, "email", false).unwrap();
        assert_eq!(prop.pointer, "#/properties/email");
        let def = map.create_child(root, "shared", true).unwrap();
        assert_eq!(def.pointer, "#/$defs/shared");
        assert_eq!(map.len(), 11, "create_child must not attach");
    }

    #[test]
    fn insert_attaches_created_children() {
        let mut map = map_of(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        let root = map.root().unwrap().node_id;
        let mut child = map.create_child(root, "b", false).unwrap();
        child.field_type = Some(FieldType::Integer);
        child.implicit_type = false;
        child.is_required = true;
        let id = map.insert(child).unwrap();
        assert!(map.root().unwrap().children.contains(&id));
        map.validate().unwrap();
        assert_eq!(map.to_schema(), json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "integer"}},
            "required": ["b"]
        }));
    }

    #[test]
    fn insert_rejects_occupied_and_orphaned() {
        let mut map = map_of(json!({"type": "object", "properties": {"a": {}}}));
        let root = map.root().unwrap().node_id;
        let dup = map.create_child(root, "a", false).unwrap();
        assert!(matches!(map.insert(dup), Err(SchemaError::AlreadyExists(_))));

        let mut ids = crate::node::IdGenerator::after([NodeId(1000)].iter());
        let orphan = ids.create_node("#/properties/missing/properties/x".into());
        assert!(matches!(map.insert(orphan.unwrap()), Err(SchemaError::NotFound(_))));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn insert_rejects_member_gaps_and_opaque_slots() {
        let mut map = map_of(json!({
            "anyOf": [{}, {}],
            "properties": {"p": {"type": "array", "items": false}, "q": {"$defs": 3}}
        }));
        let mut ids = crate::node::IdGenerator::after([NodeId(100)].iter());
        let gap = ids.create_node("#/anyOf/5".into()).unwrap();
        assert!(matches!(map.insert(gap), Err(SchemaError::StructuralViolation(_))));
        let items = ids.create_node("#/properties/p/items".into()).unwrap();
        assert!(matches!(map.insert(items), Err(SchemaError::StructuralViolation(_))));
        let def = ids.create_node("#/properties/q/$defs/d".into()).unwrap();
        assert!(matches!(map.insert(def), Err(SchemaError::StructuralViolation(_))));
        assert_eq!(map.len(), 5);

        let next = ids.create_node("#/anyOf/2".into()).unwrap();
        map.insert(next).unwrap();
        map.validate().unwrap();
        assert_eq!(map.to_schema()["anyOf"], json!([{}, {}, {}]));
    }

    #[test]
    fn insert_accepts_largest_id_and_then_stops_allocating() {
        let mut map = map_of(json!({"type": "object"}));
        let mut node = Node::new(NodeId(u32::MAX), "#/properties/last".into());
        node.field_type = Some(FieldType::String);
        node.implicit_type = false;
        map.insert(node).unwrap();
        assert_eq!(map.to_schema(), json!({"type": "object", "properties": {"last": {"type": "string"}}}));
        let root = map.root().unwrap().node_id;
        assert!(matches!(map.create_child(root, "more", false), Err(SchemaError::StructuralViolation(_))));
    }

    #[test]
    fn edits_preserve_invariants() {
        let mut map = map_of(json!({
            "type": "object",
            "properties": {"a": {"anyOf": [{"type": "string"}, {"type": "null"}]}, "b": {"type": "object"}},
            "$defs": {"c": {"type": "object", "properties": {"d": {}}}}
        }));
        let a = map.find("#/properties/a").unwrap().node_id;
        let member = map.create_child(a, "", false).unwrap();
        map.insert(member).unwrap();
        map.rename("#/$defs/c", "#/$defs/e").unwrap();
        let b = map.find("#/properties/b").unwrap().node_id;
        let field = map.create_child(b, "f", false).unwrap();
        map.insert(field).unwrap();
        map.remove("#/properties/a/anyOf/1").unwrap();
        map.validate().unwrap();
        assert_eq!(map.to_schema(), json!({
            "type": "object",
            "properties": {
                "a": {"anyOf": [{"type": "string"}, {}]},
                "b": {"type": "object", "properties": {"f": {}}}
            },
            "$defs": {"e": {"type": "object", "properties": {"d": {}}}}
        }));
    }
}
