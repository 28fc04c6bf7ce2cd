//! Decoder for the graph store's tagged literals
//!
//! Apache AGE renders every result column as a literal whose text form carries a
//! type marker after the payload:
//!
//! ```text
//! {"id": 844424930131969, "label": "Skill", "properties": {"name": "SQL"}}::vertex
//! {"id": 1125899906842625, "label": "CONTAINS", "start_id": 1, "end_id": 2, "properties": {}}::edge
//! 3.50::numeric
//! "plain string"
//! ```
//!
//! [`parse_literal`] is the lenient entry point: it never fails and hands back
//! [`AgtypeValue::Unparsed`] with the original text when a tagged payload is
//! malformed. [`Vertex::into_node`] is the strict step that turns a vertex into a
//! taxonomy node.

use serde::Deserialize;

use crate::error::{Error, Result};

use super::node::{GraphNode, NodeLabel, Properties, PropertyValue};

/// Type marker carried by a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgtypeTag {
    Vertex,
    Edge,
    Path,
    Numeric,
}

impl AgtypeTag {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vertex" => Some(Self::Vertex),
            "edge" => Some(Self::Edge),
            "path" => Some(Self::Path),
            "numeric" => Some(Self::Numeric),
            _ => None,
        }
    }
}

/// A decoded vertex payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vertex {
    pub id: i64,
    pub label: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Vertex {
    /// Convert into a taxonomy node, rejecting labels outside the taxonomy
    pub fn into_node(self) -> Result<GraphNode> {
        let label = NodeLabel::parse(&self.label).ok_or_else(|| {
            Error::decode(
                format!("vertex {}", self.id),
                format!("unknown label '{}'", self.label),
            )
        })?;
        let properties: Properties = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
            .collect();
        Ok(GraphNode {
            id: self.id,
            label,
            properties,
        })
    }
}

/// A decoded edge payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Edge {
    pub id: i64,
    pub label: String,
    pub start_id: i64,
    pub end_id: i64,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Result of decoding one literal
#[derive(Debug, Clone, PartialEq)]
pub enum AgtypeValue {
    Vertex(Vertex),
    Edge(Edge),
    /// A path or untagged JSON value, kept as JSON
    Json(serde_json::Value),
    /// A bare scalar recovered by best-effort coercion
    Scalar(PropertyValue),
    /// A tagged payload that failed structural validation, passed through as-is
    Unparsed(String),
}

impl AgtypeValue {
    /// Graph id of a vertex or edge
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Vertex(v) => Some(v.id),
            Self::Edge(e) => Some(e.id),
            Self::Json(serde_json::Value::Object(map)) => {
                map.get("id").and_then(serde_json::Value::as_i64)
            }
            _ => None,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed(_))
    }
}

/// Split a literal into its payload and type marker
pub fn split_tag(raw: &str) -> (&str, Option<AgtypeTag>) {
    let trimmed = raw.trim();
    match trimmed.rsplit_once("::") {
        Some((payload, tag)) => match AgtypeTag::parse(tag.trim()) {
            Some(tag) => (payload.trim_end(), Some(tag)),
            None => (trimmed, None),
        },
        None => (trimmed, None),
    }
}

/// Decode a literal without ever failing
pub fn parse_literal(raw: &str) -> AgtypeValue {
    let (payload, tag) = split_tag(raw);
    match tag {
        Some(AgtypeTag::Vertex) => serde_json::from_str::<Vertex>(payload)
            .map(AgtypeValue::Vertex)
            .unwrap_or_else(|_| AgtypeValue::Unparsed(raw.to_string())),
        Some(AgtypeTag::Edge) => serde_json::from_str::<Edge>(payload)
            .map(AgtypeValue::Edge)
            .unwrap_or_else(|_| AgtypeValue::Unparsed(raw.to_string())),
        Some(AgtypeTag::Path) => serde_json::from_str::<serde_json::Value>(payload)
            .map(AgtypeValue::Json)
            .unwrap_or_else(|_| AgtypeValue::Unparsed(raw.to_string())),
        Some(AgtypeTag::Numeric) => AgtypeValue::Scalar(PropertyValue::coerce_str(payload)),
        None => match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(value) => parse_value(&value),
            Err(_) => AgtypeValue::Scalar(PropertyValue::coerce_str(payload)),
        },
    }
}

/// Decode a value that may already be structured
///
/// Strings are treated as literals. Objects shaped like a vertex or edge are
/// promoted to one; anything else stays JSON.
pub fn parse_value(value: &serde_json::Value) -> AgtypeValue {
    match value {
        serde_json::Value::String(s) => match split_tag(s) {
            (_, Some(_)) => parse_literal(s),
            (_, None) => AgtypeValue::Json(value.clone()),
        },
        serde_json::Value::Object(map) if map.contains_key("start_id") => {
            serde_json::from_value::<Edge>(value.clone())
                .map(AgtypeValue::Edge)
                .unwrap_or_else(|_| AgtypeValue::Json(value.clone()))
        }
        serde_json::Value::Object(map) if map.contains_key("label") => {
            serde_json::from_value::<Vertex>(value.clone())
                .map(AgtypeValue::Vertex)
                .unwrap_or_else(|_| AgtypeValue::Json(value.clone()))
        }
        other => AgtypeValue::Json(other.clone()),
    }
}
