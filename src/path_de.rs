use serde::de::DeserializeOwned;

use crate::error::SchemaError;
use crate::node_map::NodeMap;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| SchemaError::Deserialize {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Load a node map saved with `serde_json`; invariants are re-checked on the way in.
pub fn node_map_from_str(src: &str) -> Result<NodeMap, SchemaError> {
    from_str_with_path::<NodeMap>(src)
}
