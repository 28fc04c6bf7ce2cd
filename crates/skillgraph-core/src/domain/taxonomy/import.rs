//! Taxonomy import planning
//!
//! Turns a nested JSON taxonomy document into the nodes and `CONTAINS` links to
//! create in the graph. The document maps profession names to their contents:
//!
//! ```json
//! { "Backend Engineer": {
//!     "programming_languages": { "Python": { "count": 8, "Django": { "count": 5 } } },
//!     "SQL": { "count": 10 } } }
//! ```
//!
//! An object with a `count` key is a Skill requiring that proficiency; its other
//! object-valued keys are nested under it. An object without `count` is a
//! Category. Scalars other than `count` are ignored.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::node::NodeLabel;

/// Reference to a node by label and name within one profession
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub name: String,
}

impl NodeRef {
    fn new(label: NodeLabel, name: &str) -> Self {
        Self {
            label,
            name: name.to_string(),
        }
    }
}

/// A node to create below the profession root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "label")]
pub enum PlannedNode {
    Category { name: String },
    Skill { name: String, count: i64 },
}

impl PlannedNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Category { name } | Self::Skill { name, .. } => name,
        }
    }

    pub fn label(&self) -> NodeLabel {
        match self {
            Self::Category { .. } => NodeLabel::Category,
            Self::Skill { .. } => NodeLabel::Skill,
        }
    }

    fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.label(), self.name())
    }
}

/// A `CONTAINS` link between two planned nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlannedLink {
    pub from: NodeRef,
    pub to: NodeRef,
}

/// Everything to create for one profession
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionPlan {
    pub name: String,
    pub nodes: Vec<PlannedNode>,
    pub links: Vec<PlannedLink>,
}

impl ProfessionPlan {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeRef {
        NodeRef::new(NodeLabel::Profession, &self.name)
    }

    pub fn skills(&self) -> impl Iterator<Item = (&str, i64)> {
        self.nodes.iter().filter_map(|n| match n {
            PlannedNode::Skill { name, count } => Some((name.as_str(), *count)),
            PlannedNode::Category { .. } => None,
        })
    }

    fn add_node(&mut self, node: PlannedNode) {
        if self.nodes.iter().any(|n| n.node_ref() == node.node_ref()) {
            debug!(profession = %self.name, name = node.name(), "Node already planned");
            return;
        }
        self.nodes.push(node);
    }

    fn add_link(&mut self, from: NodeRef, to: NodeRef) {
        let link = PlannedLink { from, to };
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }
}

/// What one profession import wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedProfession {
    pub name: String,
    pub profession_id: i64,
    pub nodes: usize,
    pub links: usize,
}

/// Plan for a whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportPlan {
    pub professions: Vec<ProfessionPlan>,
}

impl ImportPlan {
    pub fn node_count(&self) -> usize {
        self.professions.iter().map(|p| p.nodes.len() + 1).sum()
    }

    pub fn link_count(&self) -> usize {
        self.professions.iter().map(|p| p.links.len()).sum()
    }
}

/// Parse and plan a JSON document
pub fn plan_import_str(document: &str) -> Result<ImportPlan> {
    let value: serde_json::Value = serde_json::from_str(document)?;
    plan_import(&value)
}

/// Plan the nodes and links described by a taxonomy document
pub fn plan_import(document: &serde_json::Value) -> Result<ImportPlan> {
    let serde_json::Value::Object(professions) = document else {
        return Err(Error::InvalidInput(
            "taxonomy document must be an object of professions".to_string(),
        ));
    };

    let mut plan = ImportPlan::default();
    for (profession_name, contents) in professions {
        validate_name(profession_name)?;
        let serde_json::Value::Object(contents) = contents else {
            warn!(profession = %profession_name, "Profession contents are not an object, skipping");
            continue;
        };
        let mut profession = ProfessionPlan::new(profession_name);
        let root = profession.root();
        plan_children(&mut profession, &root, contents)?;
        plan.professions.push(profession);
    }
    Ok(plan)
}

fn plan_children(
    profession: &mut ProfessionPlan,
    parent: &NodeRef,
    contents: &serde_json::Map<String, serde_json::Value>,
) -> Result<()> {
    for (key, value) in contents {
        let serde_json::Value::Object(child) = value else {
            continue;
        };
        validate_name(key)?;
        let node = match child.get("count") {
            Some(count) => PlannedNode::Skill {
                name: key.clone(),
                count: parse_count(key, count)?,
            },
            None => PlannedNode::Category { name: key.clone() },
        };
        let node_ref = node.node_ref();
        profession.add_node(node);
        profession.add_link(parent.clone(), node_ref.clone());
        plan_children(profession, &node_ref, child)?;
    }
    Ok(())
}

fn parse_count(name: &str, value: &serde_json::Value) -> Result<i64> {
    let count = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    count.ok_or_else(|| {
        Error::InvalidInput(format!("skill '{}' has a non-numeric count: {}", name, value))
    })
}

/// Names are embedded in dollar-quoted Cypher
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("taxonomy names must not be empty".to_string()));
    }
    if name.contains("$$") || name.contains('\0') {
        return Err(Error::InvalidInput(format!(
            "taxonomy name '{}' contains a forbidden sequence",
            name.escape_debug()
        )));
    }
    Ok(())
}
