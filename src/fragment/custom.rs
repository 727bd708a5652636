//! Opaque passthrough of everything the engine does not model.
use serde_json::{Map, Value};

use super::field_type::TypeInfo;
use super::generic::is_generic;
use super::restrictions::is_restriction;
use super::{is_structural, keywords, Fragment};

/// Keys owned by the restriction or generic handlers.
pub fn is_known_keyword(key: &str) -> bool {
    is_restriction(key) || is_generic(key)
}

/// Everything the builder will not rebuild from node state.
pub fn extract_custom(fragment: &Fragment, type_info: &TypeInfo) -> Map<String, Value> {
    fragment
        .iter()
        .filter(|(key, _)| {
            let key = key.as_str();
            if key == keywords::TYPE {
                return type_info.verbatim;
            }
            if keywords::STRUCTURAL.contains(&key) {
                return !is_structural(fragment, key);
            }
            !is_known_keyword(key)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{classify, field_type::read_type};
    use serde_json::json;

    fn custom_of(v: Value) -> Value {
        let f = v.as_object().cloned().unwrap();
        let t = read_type(&f, &classify(&f));
        Value::Object(extract_custom(&f, &t))
    }

    #[test]
    fn keeps_unknown_keys_only() {
        let v = json!({
            "type": "object",
            "title": "t",
            "maxLength": 3,
            "properties": {"a": {}},
            "required": ["a"],
            "additionalProperties": false,
            "x-order": [2, 1]
        });
        assert_eq!(custom_of(v), json!({"additionalProperties": false, "x-order": [2, 1]}));
    }

    #[test]
    fn unmodelled_shapes_stay_custom() {
        let v = json!({"items": true, "properties": {}, "type": ["null", "string"]});
        assert_eq!(custom_of(v.clone()), v);
    }
}
