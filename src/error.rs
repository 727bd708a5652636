//! Error taxonomy for conversion and editing.
//!
//! Everything except [`SchemaError::CorruptedMap`] is an ordinary rejection the caller can
//! surface to a user. `CorruptedMap` means the node map was already broken before the call.
use thiserror::Error;

use crate::node::{FieldType, ObjectKind};

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The edit would break the tree shape (multi-level rename, move, root removal, ...).
    #[error("structural violation: {0}")]
    StructuralViolation(String),

    #[error("no node at pointer `{0}`")]
    NotFound(String),

    #[error("a node already exists at `{0}`")]
    AlreadyExists(String),

    #[error("cannot create a child under {kind:?} node of type {field_type}: {reason}")]
    IllegalParent {
        kind: ObjectKind,
        field_type: FieldTypeLabel,
        reason: &'static str,
    },

    #[error("`{pointer}` is still referenced by {referrers:?}")]
    StillReferenced {
        pointer: String,
        referrers: Vec<String>,
    },

    #[error("invalid pointer `{pointer}`: {reason}")]
    InvalidPointer { pointer: String, reason: String },

    /// A structural keyword held something that is not a schema object.
    #[error("unsupported fragment at `{pointer}`: {reason}")]
    UnsupportedFragment { pointer: String, reason: String },

    #[error("corrupted node map: {0}")]
    CorruptedMap(String),

    #[error("failed to decode node map at JSON path {path}: {message}")]
    Deserialize { path: String, message: String },
}

impl SchemaError {
    pub(crate) fn invalid_pointer(pointer: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidPointer {
            pointer: pointer.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal_parent(
        kind: ObjectKind,
        field_type: Option<FieldType>,
        reason: &'static str,
    ) -> Self {
        SchemaError::IllegalParent {
            kind,
            field_type: FieldTypeLabel(field_type),
            reason,
        }
    }
}

/// Display helper so an undefined field type reads as `undefined` in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTypeLabel(pub Option<FieldType>);

impl std::fmt::Display for FieldTypeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(ty) => f.write_str(ty.as_str()),
            None => f.write_str("undefined"),
        }
    }
}
