// Whitelisted validation keywords carried as an opaque bag.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use super::Fragment;

pub const RESTRICTION_KEYWORDS: [&str; 20] = [
    // strings
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "formatMinimum",
    "formatMaximum",
    "formatExclusiveMinimum",
    "formatExclusiveMaximum",
    // numbers
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    // arrays
    "minItems",
    "maxItems",
    "uniqueItems",
    "minContains",
    "maxContains",
    // objects
    "minProperties",
    "maxProperties",
];

static RESTRICTIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| RESTRICTION_KEYWORDS.into_iter().collect());

pub fn is_restriction(key: &str) -> bool {
    RESTRICTIONS.contains(key)
}

pub fn extract_restrictions(fragment: &Fragment) -> Map<String, Value> {
    RESTRICTION_KEYWORDS
        .iter()
        .filter_map(|key| fragment.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

/// Only whitelisted keys are written back.
pub fn write_restrictions(restrictions: &Map<String, Value>, out: &mut Fragment) {
    for (key, value) in restrictions {
        if is_restriction(key) {
            out.insert(key.clone(), value.clone());
        }
    }
}
