//! Node addressing.
//!
//! A node pointer is a JSON Pointer fragment rooted at `#`. Each node below the root adds one
//! addressing [`Step`]: `/properties/<name>`, `/$defs/<name>`, `/definitions/<name>`, `/items`
//! or `/<combinator>/<index>`. Names are escaped per RFC 6901 so a node's pointer is exactly the
//! `$ref` text that addresses it.
use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::fragment::keywords;
use crate::node::{CombinationKind, Node, NodeId};

pub const ROOT: &str = "#";

// ————————————————————————————————————————————————————————————————————————————
// ESCAPING
// ————————————————————————————————————————————————————————————————————————————

pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// `~1` is decoded before `~0` so `~01` stays `~1`.
pub fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Raw decoded segments after the `#`. `#` itself has none.
pub fn split_segments(pointer: &str) -> Result<Vec<String>> {
    let rest = pointer
        .strip_prefix(ROOT)
        .ok_or_else(|| SchemaError::invalid_pointer(pointer, "must start with `#`"))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let rest = rest
        .strip_prefix('/')
        .ok_or_else(|| SchemaError::invalid_pointer(pointer, "expected `/` after `#`"))?;
    Ok(rest.split('/').map(|s| unescape_segment(s).into_owned()).collect())
}

// ————————————————————————————————————————————————————————————————————————————
// STEPS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Property(String),
    /// `$defs/<name>`
    Definition(String),
    /// legacy `definitions/<name>`
    LegacyDefinition(String),
    Items,
    Member(CombinationKind, usize),
}

impl Step {
    /// The raw pointer segments this step contributes.
    pub fn segments(&self) -> Vec<Cow<'_, str>> {
        match self {
            Step::Property(name) => vec![Cow::Borrowed(keywords::PROPERTIES), escape_segment(name)],
            Step::Definition(name) => vec![Cow::Borrowed(keywords::DEFS), escape_segment(name)],
            Step::LegacyDefinition(name) => {
                vec![Cow::Borrowed(keywords::DEFINITIONS), escape_segment(name)]
            }
            Step::Items => vec![Cow::Borrowed(keywords::ITEMS)],
            Step::Member(kind, index) => {
                vec![Cow::Borrowed(kind.keyword()), Cow::Owned(index.to_string())]
            }
        }
    }

    /// The schema keyword this step descends through.
    pub fn keyword(&self) -> &'static str {
        match self {
            Step::Property(_) => keywords::PROPERTIES,
            Step::Definition(_) => keywords::DEFS,
            Step::LegacyDefinition(_) => keywords::DEFINITIONS,
            Step::Items => keywords::ITEMS,
            Step::Member(kind, _) => kind.keyword(),
        }
    }

    /// Property/definition name, if this step is named.
    pub fn name(&self) -> Option<&str> {
        match self {
            Step::Property(name) | Step::Definition(name) | Step::LegacyDefinition(name) => {
                Some(name)
            }
            Step::Items | Step::Member(..) => None,
        }
    }
}

pub fn append(parent: &str, step: &Step) -> String {
    let mut out = parent.to_string();
    for segment in step.segments() {
        out.push('/');
        out.push_str(&segment);
    }
    out
}

pub fn from_steps(steps: &[Step]) -> String {
    steps.iter().fold(ROOT.to_string(), |acc, step| append(&acc, step))
}

pub fn parse(pointer: &str) -> Result<Vec<Step>> {
    let segments = split_segments(pointer)?;
    let mut steps = Vec::new();
    let mut it = segments.into_iter();
    while let Some(keyword) = it.next() {
        let step = match keyword.as_str() {
            keywords::ITEMS => Step::Items,
            keywords::PROPERTIES | keywords::DEFS | keywords::DEFINITIONS => {
                let name = it.next().ok_or_else(|| {
                    SchemaError::invalid_pointer(pointer, format!("`{keyword}` needs a name"))
                })?;
                match keyword.as_str() {
                    keywords::PROPERTIES => Step::Property(name),
                    keywords::DEFS => Step::Definition(name),
                    _ => Step::LegacyDefinition(name),
                }
            }
            other => match CombinationKind::from_keyword(other) {
                Some(kind) => {
                    let index = it
                        .next()
                        .ok_or_else(|| {
                            SchemaError::invalid_pointer(pointer, format!("`{other}` needs an index"))
                        })?
                        .parse::<usize>()
                        .map_err(|_| {
                            SchemaError::invalid_pointer(pointer, format!("`{other}` index is not a number"))
                        })?;
                    Step::Member(kind, index)
                }
                None => {
                    return Err(SchemaError::invalid_pointer(
                        pointer,
                        format!("unknown addressing keyword `{other}`"),
                    ));
                }
            },
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Pointer of the node one step up; `None` for the root.
pub fn parent(pointer: &str) -> Result<Option<String>> {
    let steps = parse(pointer)?;
    match steps.split_last() {
        None => Ok(None),
        Some((_, init)) => Ok(Some(from_steps(init))),
    }
}

pub fn last_step(pointer: &str) -> Result<Option<Step>> {
    Ok(parse(pointer)?.pop())
}

/// `pointer` is `ancestor` or lies below it. Segment-aware: `#/properties/ab` is not under `#/properties/a`.
pub fn is_within(pointer: &str, ancestor: &str) -> bool {
    match pointer.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Swap the `old` prefix for `new`; `None` when `pointer` is not within `old`.
pub fn replace_prefix(pointer: &str, old: &str, new: &str) -> Option<String> {
    if !is_within(pointer, old) {
        return None;
    }
    Some(format!("{new}{}", &pointer[old.len()..]))
}

// ————————————————————————————————————————————————————————————————————————————
// LOOKUP TABLE
// ————————————————————————————————————————————————————————————————————————————

/// Disposable pointer ⇄ id index. Rebuild after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTable {
    by_pointer: HashMap<String, NodeId>,
    by_id: HashMap<NodeId, String>,
}

impl PointerTable {
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut table = PointerTable::default();
        for node in nodes {
            table.by_pointer.insert(node.pointer.clone(), node.node_id);
            table.by_id.insert(node.node_id, node.pointer.clone());
        }
        table
    }

    pub fn id_of(&self, pointer: &str) -> Option<NodeId> {
        self.by_pointer.get(pointer).copied()
    }

    pub fn pointer_of(&self, id: NodeId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn contains(&self, pointer: &str) -> bool {
        self.by_pointer.contains_key(pointer)
    }

    pub fn len(&self) -> usize { self.by_pointer.len() }

    pub fn is_empty(&self) -> bool { self.by_pointer.is_empty() }
}
