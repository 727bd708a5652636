// Node records for the editable representation. No serde_json::Value walking here.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::pointer::{self, Step};

// ————————————————————————————————————————————————————————————————————————————
// IDS
// ————————————————————————————————————————————————————————————————————————————

/// Opaque node handle, unique within one node map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Monotonic id source owned by a node map.
///
/// The counter is wider than [`NodeId`] so resuming after `u32::MAX` cannot wrap; running out
/// only surfaces when an id is actually drawn.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self { Self::default() }

    /// Resume numbering after the largest id already in use.
    pub fn after<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let next = ids.into_iter().map(|id| u64::from(id.0) + 1).max().unwrap_or(0);
        Self { next }
    }

    pub fn next_id(&mut self) -> Result<NodeId> {
        let id = u32::try_from(self.next)
            .map_err(|_| SchemaError::StructuralViolation("node ids are exhausted".to_string()))?;
        self.next += 1;
        Ok(NodeId(id))
    }

    /// Make sure `id` is never handed out again.
    pub fn reserve(&mut self, id: NodeId) {
        self.next = self.next.max(u64::from(id.0) + 1);
    }

    /// Node factory: a blank Field node with a fresh id at `pointer`.
    pub fn create_node(&mut self, pointer: String) -> Result<Node> {
        Ok(Node::new(self.next_id()?, pointer))
    }

    /// Node factory for a child one step below `parent_pointer`.
    pub fn create_child_node(&mut self, parent_pointer: &str, step: &Step) -> Result<Node> {
        self.create_node(pointer::append(parent_pointer, step))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// KINDS & TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinationKind {
    #[serde(rename = "allOf")]
    AllOf,
    #[serde(rename = "anyOf")]
    AnyOf,
    #[serde(rename = "oneOf")]
    OneOf,
}

impl CombinationKind {
    /// Fixed priority order used when a fragment carries several combinators.
    pub const ALL: [CombinationKind; 3] = [
        CombinationKind::AllOf,
        CombinationKind::AnyOf,
        CombinationKind::OneOf,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            CombinationKind::AllOf => "allOf",
            CombinationKind::AnyOf => "anyOf",
            CombinationKind::OneOf => "oneOf",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        CombinationKind::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

/// Editable type tag. Combination nodes without an explicit type carry their combinator here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "allOf")]
    AllOf,
    #[serde(rename = "anyOf")]
    AnyOf,
    #[serde(rename = "oneOf")]
    OneOf,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Object => "object",
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Null => "null",
            FieldType::AllOf => "allOf",
            FieldType::AnyOf => "anyOf",
            FieldType::OneOf => "oneOf",
        }
    }

    /// Parse a `type` keyword value. Combinator names are not schema types and never parse.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "object" => Some(FieldType::Object),
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            "null" => Some(FieldType::Null),
            _ => None,
        }
    }

    pub fn is_combinator(self) -> bool {
        matches!(self, FieldType::AllOf | FieldType::AnyOf | FieldType::OneOf)
    }
}

impl From<CombinationKind> for FieldType {
    fn from(kind: CombinationKind) -> Self {
        match kind {
            CombinationKind::AllOf => FieldType::AllOf,
            CombinationKind::AnyOf => FieldType::AnyOf,
            CombinationKind::OneOf => FieldType::OneOf,
        }
    }
}

/// Target of a `$ref`: raw pointer text until resolved against the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    Pointer(String),
    Node(NodeId),
}

/// Payload-free projection of [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Field,
    Array,
    Reference,
    Combination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object_kind", content = "target")]
pub enum NodeKind {
    Field,
    Array,
    Reference(Reference),
    Combination(CombinationKind),
}

impl NodeKind {
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            NodeKind::Field => ObjectKind::Field,
            NodeKind::Array => ObjectKind::Array,
            NodeKind::Reference(_) => ObjectKind::Reference,
            NodeKind::Combination(_) => ObjectKind::Combination,
        }
    }
}

/// title / description / enum / default / const, copied through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericKeywords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

// ————————————————————————————————————————————————————————————————————————————
// NODE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: NodeId,
    pub pointer: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub field_type: Option<FieldType>,
    /// Source carried no `type`; output must not invent one.
    pub implicit_type: bool,
    /// Source type was `[T, "null"]`.
    pub is_nillable: bool,
    pub is_required: bool,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub custom: Map<String, Value>,
    #[serde(default)]
    pub restrictions: Map<String, Value>,
    #[serde(default)]
    pub generic: GenericKeywords,
    /// The fragment's own `required` list, in source order; `None` when it had none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_required: Option<Vec<String>>,
}

impl Node {
    pub fn new(node_id: NodeId, pointer: String) -> Self {
        Self {
            node_id,
            pointer,
            kind: NodeKind::Field,
            field_type: None,
            implicit_type: true,
            is_nillable: false,
            is_required: false,
            children: Vec::new(),
            custom: Map::new(),
            restrictions: Map::new(),
            generic: GenericKeywords::default(),
            declared_required: None,
        }
    }

    pub fn object_kind(&self) -> ObjectKind { self.kind.object_kind() }

    pub fn reference(&self) -> Option<&Reference> {
        match &self.kind {
            NodeKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool { self.pointer == pointer::ROOT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_monotonic_and_resumable() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id().unwrap(), NodeId(0));
        assert_eq!(ids.next_id().unwrap(), NodeId(1));

        let used = [NodeId(4), NodeId(2)];
        let mut resumed = IdGenerator::after(used.iter());
        assert_eq!(resumed.next_id().unwrap(), NodeId(5));
    }

    #[test]
    fn largest_id_exhausts_without_wrapping() {
        let mut ids = IdGenerator::after([NodeId(u32::MAX - 1)].iter());
        assert_eq!(ids.next_id().unwrap(), NodeId(u32::MAX));
        assert!(matches!(ids.next_id(), Err(SchemaError::StructuralViolation(_))));

        let mut reserved = IdGenerator::new();
        reserved.reserve(NodeId(u32::MAX));
        assert!(reserved.next_id().is_err());
        let mut resumed = IdGenerator::after([NodeId(u32::MAX)].iter());
        assert!(resumed.next_id().is_err());
    }

    #[test]
    fn factory_builds_child_pointer() {
        let mut ids = IdGenerator::new();
        let node = ids.create_child_node("#", &Step::Property("a/b".into())).unwrap();
        assert_eq!(node.pointer, "#/properties/a~1b");
        assert_eq!(node.object_kind(), ObjectKind::Field);
        assert!(node.implicit_type);
    }

    #[test]
    fn combinator_names_are_not_type_names() {
        assert_eq!(FieldType::from_type_name("string"), Some(FieldType::String));
        assert_eq!(FieldType::from_type_name("anyOf"), None);
        assert_eq!(FieldType::from(CombinationKind::OneOf).as_str(), "oneOf");
        assert!(FieldType::AllOf.is_combinator());
    }

    #[test]
    fn node_serializes_kind_inline() {
        let mut node = Node::new(NodeId(3), "#/properties/x".into());
        node.kind = NodeKind::Reference(Reference::Pointer("#/$defs/y".into()));
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["object_kind"], "Reference");
        assert_eq!(v["target"]["pointer"], "#/$defs/y");
        let back: Node = serde_json::from_value(v).unwrap();
        assert_eq!(back, node);
    }
}
