//! Reading and writing single schema fragments.
//!
//! A fragment is one JSON object in the schema tree. Only keywords whose value has the shape the
//! engine understands are treated as structural; anything else (`"items": false`, an empty
//! `properties` map, a non-string `$ref`) stays opaque and rides along in the custom bag.
pub mod custom;
pub mod field_type;
pub mod generic;
pub mod restrictions;

use serde_json::{Map, Value};

use crate::node::{CombinationKind, NodeKind, ObjectKind, Reference};

pub use custom::{extract_custom, is_known_keyword};
pub use field_type::{type_from_fragment, type_to_fragment, TypeInfo};
pub use generic::{extract_generic, write_generic};
pub use restrictions::{extract_restrictions, write_restrictions};

pub type Fragment = Map<String, Value>;

pub mod keywords {
    pub const REF: &str = "$ref";
    pub const ALL_OF: &str = "allOf";
    pub const ANY_OF: &str = "anyOf";
    pub const ONE_OF: &str = "oneOf";
    pub const DEFS: &str = "$defs";
    pub const DEFINITIONS: &str = "definitions";
    pub const ITEMS: &str = "items";
    pub const PROPERTIES: &str = "properties";
    pub const REQUIRED: &str = "required";
    pub const TYPE: &str = "type";

    pub const NULL_TYPE: &str = "null";
    pub const ARRAY_TYPE: &str = "array";

    pub const STRUCTURAL: [&str; 10] = [
        REF, ALL_OF, ANY_OF, ONE_OF, DEFS, DEFINITIONS, ITEMS, PROPERTIES, REQUIRED, TYPE,
    ];
}

// ————————————————————————————————————————————————————————————————————————————
// STRUCTURAL SHAPES
// ————————————————————————————————————————————————————————————————————————————

/// `key` is present with a shape the builder will turn into nodes or node state.
///
/// `type` is handled by [`field_type`] and never counts here.
pub fn is_structural(fragment: &Fragment, key: &str) -> bool {
    let Some(value) = fragment.get(key) else { return false };
    match key {
        keywords::REF => value.is_string(),
        keywords::ALL_OF | keywords::ANY_OF | keywords::ONE_OF => value
            .as_array()
            .is_some_and(|members| !members.is_empty() && members.iter().all(Value::is_object)),
        keywords::DEFS | keywords::DEFINITIONS | keywords::PROPERTIES => value
            .as_object()
            .is_some_and(|map| !map.is_empty() && map.values().all(Value::is_object)),
        keywords::ITEMS => value.is_object(),
        keywords::REQUIRED => value
            .as_array()
            .is_some_and(|names| names.iter().all(Value::is_string)),
        _ => false,
    }
}

/// A sub-schema map (`properties`, `$defs`, `definitions`) when structural.
pub fn schema_map<'a>(fragment: &'a Fragment, key: &str) -> Option<&'a Fragment> {
    if is_structural(fragment, key) {
        fragment.get(key).and_then(Value::as_object)
    } else {
        None
    }
}

/// Members of `kind`'s combinator array when structural.
pub fn members(fragment: &Fragment, kind: CombinationKind) -> Option<&Vec<Value>> {
    if is_structural(fragment, kind.keyword()) {
        fragment.get(kind.keyword()).and_then(Value::as_array)
    } else {
        None
    }
}

pub fn items(fragment: &Fragment) -> Option<&Fragment> {
    fragment.get(keywords::ITEMS).and_then(Value::as_object)
}

pub fn required_names(fragment: &Fragment) -> Option<Vec<String>> {
    if !is_structural(fragment, keywords::REQUIRED) {
        return None;
    }
    fragment.get(keywords::REQUIRED).and_then(Value::as_array).map(|names| {
        names.iter().filter_map(Value::as_str).map(str::to_string).collect()
    })
}

pub fn reference(fragment: &Fragment) -> Option<&str> {
    if is_structural(fragment, keywords::REF) {
        fragment.get(keywords::REF).and_then(Value::as_str)
    } else {
        None
    }
}

/// Every combinator with structural members, in priority order.
pub fn present_combinators(fragment: &Fragment) -> impl Iterator<Item = CombinationKind> + '_ {
    CombinationKind::ALL
        .into_iter()
        .filter(move |kind| is_structural(fragment, kind.keyword()))
}

// ————————————————————————————————————————————————————————————————————————————
// KIND CLASSIFIER
// ————————————————————————————————————————————————————————————————————————————

/// `type` is `"array"` or a list of at most two entries containing `"array"`.
fn declares_array(fragment: &Fragment) -> bool {
    match fragment.get(keywords::TYPE) {
        Some(Value::String(name)) => name == keywords::ARRAY_TYPE,
        Some(Value::Array(names)) => {
            names.len() <= 2 && names.iter().any(|name| name == keywords::ARRAY_TYPE)
        }
        _ => false,
    }
}

pub fn object_kind(fragment: &Fragment) -> ObjectKind {
    classify(fragment).object_kind()
}

/// Reference beats Combination beats Array beats Field.
pub fn classify(fragment: &Fragment) -> NodeKind {
    if let Some(target) = reference(fragment) {
        return NodeKind::Reference(Reference::Pointer(target.to_string()));
    }
    if let Some(kind) = present_combinators(fragment).next() {
        return NodeKind::Combination(kind);
    }
    if declares_array(fragment) {
        return NodeKind::Array;
    }
    NodeKind::Field
}
