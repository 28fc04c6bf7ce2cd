//! Taxonomy node and edge records
//!
//! Nodes and edges are decoded from the graph store's vertex and edge literals.
//! Every node of a profession taxonomy is one of three labels, linked top-down by
//! `CONTAINS` edges: Profession → Category → Skill.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label of a taxonomy node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    /// Root of one profession's taxonomy
    Profession,
    /// Grouping node, traversed but never scored as a skill
    Category,
    /// Leaf competency with a required proficiency (`value`)
    Skill,
}

impl NodeLabel {
    /// Get the string representation (as stored in the graph)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profession => "Profession",
            Self::Category => "Category",
            Self::Skill => "Skill",
        }
    }

    /// Parse from the graph label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Profession" => Some(Self::Profession),
            "Category" => Some(Self::Category),
            "Skill" => Some(Self::Skill),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    /// Convert a JSON value into a scalar property
    ///
    /// Nested objects and arrays are kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Best-effort coercion of a textual scalar
    ///
    /// Text that spells a number becomes a number and surrounding quotes are
    /// stripped. Used for literals that did not arrive as well-formed JSON.
    pub fn coerce_str(s: &str) -> Self {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        let unquoted = strip_quotes(trimmed, '"')
            .or_else(|| strip_quotes(trimmed, '\''))
            .unwrap_or(s);
        Self::Text(unquoted.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as a display name (numbers are valid names too)
    pub fn to_name(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null => None,
        }
    }
}

fn strip_quotes(s: &str, quote: char) -> Option<&str> {
    if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Property map of a node
pub type Properties = BTreeMap<String, PropertyValue>;

/// A taxonomy node as stored in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Graph-internal vertex id
    pub id: i64,
    pub label: NodeLabel,
    pub properties: Properties,
}

impl GraphNode {
    pub fn new(id: i64, label: NodeLabel) -> Self {
        Self {
            id,
            label,
            properties: Properties::new(),
        }
    }

    /// Set a property
    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Display name of the node, if it has one
    pub fn name(&self) -> Option<String> {
        self.properties.get("name").and_then(PropertyValue::to_name)
    }

    /// Relational skill id (Skill nodes only)
    pub fn skill_id(&self) -> Option<i64> {
        self.properties.get("skill_id").and_then(PropertyValue::as_i64)
    }

    /// Required proficiency threshold; 0 when absent or non-numeric
    pub fn required_value(&self) -> i64 {
        self.properties
            .get("value")
            .and_then(|v| match v {
                PropertyValue::Float(f) => Some(f.round() as i64),
                other => other.as_i64(),
            })
            .unwrap_or(0)
    }

    pub fn profession_id(&self) -> Option<i64> {
        self.properties
            .get("profession_id")
            .and_then(PropertyValue::as_i64)
    }

    pub fn is_skill(&self) -> bool {
        self.label == NodeLabel::Skill
    }
}

/// Relationship type between taxonomy nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    #[serde(rename = "CONTAINS")]
    Contains,
}

impl EdgeType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
        }
    }
}

/// A parent → child link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: i64,
    pub to: i64,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl GraphEdge {
    pub fn contains(from: i64, to: i64) -> Self {
        Self {
            from,
            to,
            edge_type: EdgeType::Contains,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_parse() {
        assert_eq!(NodeLabel::parse("Skill"), Some(NodeLabel::Skill));
        assert_eq!(NodeLabel::parse("Profession"), Some(NodeLabel::Profession));
        assert_eq!(NodeLabel::parse("skill"), None);
        assert_eq!(NodeLabel::Category.to_string(), "Category");
    }

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(PropertyValue::coerce_str("12"), PropertyValue::Int(12));
        assert_eq!(PropertyValue::coerce_str(" 2.5 "), PropertyValue::Float(2.5));
        assert_eq!(
            PropertyValue::coerce_str("\"Rust\""),
            PropertyValue::Text("Rust".to_string())
        );
        assert_eq!(
            PropertyValue::coerce_str("'SQL'"),
            PropertyValue::Text("SQL".to_string())
        );
    }

    #[test]
    fn test_from_json_keeps_strings_verbatim() {
        assert_eq!(
            PropertyValue::from_json(&json!("007")),
            PropertyValue::Text("007".to_string())
        );
        assert_eq!(PropertyValue::from_json(&json!(3)), PropertyValue::Int(3));
        assert_eq!(PropertyValue::from_json(&json!(1.5)), PropertyValue::Float(1.5));
        assert_eq!(PropertyValue::from_json(&json!(null)), PropertyValue::Null);
    }

    #[test]
    fn test_nan_text_stays_text() {
        assert_eq!(
            PropertyValue::coerce_str("NaN"),
            PropertyValue::Text("NaN".to_string())
        );
    }

    #[test]
    fn test_node_accessors() {
        let node = GraphNode::new(7, NodeLabel::Skill)
            .with_property("name", PropertyValue::Text("SQL".into()))
            .with_property("skill_id", PropertyValue::Int(3))
            .with_property("value", PropertyValue::Int(10))
            .with_property("profession_id", PropertyValue::Int(1));

        assert_eq!(node.name().as_deref(), Some("SQL"));
        assert_eq!(node.skill_id(), Some(3));
        assert_eq!(node.required_value(), 10);
        assert_eq!(node.profession_id(), Some(1));
        assert!(node.is_skill());
    }

    #[test]
    fn test_missing_value_defaults_to_zero() {
        let node = GraphNode::new(1, NodeLabel::Category)
            .with_property("name", PropertyValue::Text("Databases".into()));
        assert_eq!(node.required_value(), 0);
        assert_eq!(node.skill_id(), None);
    }

    #[test]
    fn test_edge_serializes_type() {
        let edge = GraphEdge::contains(1, 2);
        let value = serde_json::to_value(edge).unwrap();
        assert_eq!(value, json!({"from": 1, "to": 2, "type": "CONTAINS"}));
    }
}
