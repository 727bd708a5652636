//! `type` keyword ⇄ (`field_type`, `implicit_type`, `is_nillable`).
//!
//! Forward and inverse rules are paired: whatever the forward pass records, the inverse must
//! re-emit byte-for-byte. When a `type` value has no exact inverse (`["null","string"]`,
//! `["string","integer"]`, `"any"`, ...) the raw value is kept verbatim in the custom bag instead.
use serde_json::{json, Value};

use super::{keywords, Fragment};
use crate::node::{FieldType, Node, NodeKind, ObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub field_type: Option<FieldType>,
    pub implicit_type: bool,
    pub is_nillable: bool,
    /// Raw `type` must be carried in the custom bag.
    pub verbatim: bool,
}

fn scalar_type(fragment: &Fragment) -> Option<FieldType> {
    fragment
        .get(keywords::TYPE)?
        .as_str()
        .and_then(FieldType::from_type_name)
}

/// Non-null member of a two-element `type` list.
fn pair_member(fragment: &Fragment) -> Option<FieldType> {
    let names = fragment.get(keywords::TYPE)?.as_array()?;
    if names.len() != 2 {
        return None;
    }
    names
        .iter()
        .filter_map(Value::as_str)
        .find(|name| *name != keywords::NULL_TYPE)
        .and_then(FieldType::from_type_name)
}

fn is_nullable_pair(raw: &Value) -> bool {
    let Some(names) = raw.as_array() else { return false };
    names.len() == 2
        && names.iter().any(|name| name == keywords::NULL_TYPE)
        && names.iter().any(|name| name.is_string() && name != keywords::NULL_TYPE)
}

/// Editable type for a fragment of the given kind. `None` is a legitimate outcome.
pub fn type_from_fragment(fragment: &Fragment, kind: &NodeKind) -> Option<FieldType> {
    if fragment.get(keywords::PROPERTIES).is_some_and(Value::is_object) {
        return Some(FieldType::Object);
    }
    let scalar = scalar_type(fragment);
    match kind {
        NodeKind::Field | NodeKind::Reference(_) if scalar.is_some() => return scalar,
        NodeKind::Combination(combinator) => {
            return Some(scalar.or_else(|| pair_member(fragment)).unwrap_or((*combinator).into()));
        }
        NodeKind::Array => return Some(FieldType::Array),
        _ => {}
    }
    pair_member(fragment)
}

/// Forward rule plus the round-trip guard.
pub fn read_type(fragment: &Fragment, kind: &NodeKind) -> TypeInfo {
    let field_type = type_from_fragment(fragment, kind);
    let Some(raw) = fragment.get(keywords::TYPE) else {
        return TypeInfo { field_type, implicit_type: true, is_nillable: false, verbatim: false };
    };
    let is_nillable = is_nullable_pair(raw);
    if emit_type(kind.object_kind(), field_type, is_nillable).as_ref() == Some(raw) {
        TypeInfo { field_type, implicit_type: false, is_nillable, verbatim: false }
    } else {
        TypeInfo { field_type, implicit_type: true, is_nillable: false, verbatim: true }
    }
}

/// The `type` value an explicitly typed node of this shape writes.
pub fn emit_type(kind: ObjectKind, field_type: Option<FieldType>, is_nillable: bool) -> Option<Value> {
    let ty = match kind {
        ObjectKind::Array => FieldType::Array,
        ObjectKind::Field | ObjectKind::Reference | ObjectKind::Combination => {
            field_type.filter(|ty| !ty.is_combinator())?
        }
    };
    if is_nillable && ty != FieldType::Null {
        Some(json!([ty.as_str(), keywords::NULL_TYPE]))
    } else {
        Some(json!(ty.as_str()))
    }
}

pub fn type_to_fragment(node: &Node) -> Option<Value> {
    if node.implicit_type {
        return None;
    }
    emit_type(node.object_kind(), node.field_type, node.is_nillable)
}
