use serde_json::Value;

use super::Fragment;
use crate::node::GenericKeywords;

pub const GENERIC_KEYWORDS: [&str; 5] = ["title", "description", "enum", "default", "const"];

pub fn is_generic(key: &str) -> bool {
    GENERIC_KEYWORDS.contains(&key)
}

pub fn extract_generic(fragment: &Fragment) -> GenericKeywords {
    let take = |key: &str| fragment.get(key).cloned();
    GenericKeywords {
        title: take("title"),
        description: take("description"),
        enum_values: take("enum"),
        default: take("default"),
        const_value: take("const"),
    }
}

pub fn write_generic(generic: &GenericKeywords, out: &mut Fragment) {
    let fields: [(&str, &Option<Value>); 5] = [
        ("title", &generic.title),
        ("description", &generic.description),
        ("enum", &generic.enum_values),
        ("default", &generic.default),
        ("const", &generic.const_value),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            out.insert(key.to_string(), value.clone());
        }
    }
}
