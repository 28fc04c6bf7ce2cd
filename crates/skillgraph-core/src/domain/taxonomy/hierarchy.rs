//! Nested coverage tree rendering
//!
//! Renders each Profession root of a [`TaxonomyGraph`] as a nested entry where
//! every node carries its required value, the user's proficiency (looked up by
//! node *name*), and the resulting coverage percent:
//!
//! ```json
//! { "Backend Engineer": { "count": 0, "user_proficiency": 0, "percent": 0.0,
//!     "Databases": { "count": 0, "user_proficiency": 0, "percent": 0.0,
//!         "SQL": { "count": 10, "user_proficiency": 7, "percent": 70.0 } } } }
//! ```

use std::collections::{HashMap, HashSet};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use crate::error::Result;

use super::coverage::coverage_percent;
use super::graph::TaxonomyGraph;

/// Keys every entry emits before its children
pub const RESERVED_KEYS: [&str; 3] = ["count", "user_proficiency", "percent"];

/// One node of the coverage tree
#[derive(Debug, Clone, Default)]
pub struct HierarchyEntry {
    pub count: i64,
    pub user_proficiency: i64,
    pub percent: f64,
    children: Vec<(String, HierarchyEntry)>,
}

impl HierarchyEntry {
    pub fn new(count: i64, user_proficiency: i64) -> Self {
        Self {
            count,
            user_proficiency,
            percent: coverage_percent(user_proficiency, count),
            children: Vec::new(),
        }
    }

    /// Insert a child; a later child with the same name replaces the earlier one in place
    pub fn insert_child(&mut self, name: String, entry: HierarchyEntry) {
        match self.children.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = entry,
            None => self.children.push((name, entry)),
        }
    }

    pub fn child(&self, name: &str) -> Option<&HierarchyEntry> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &HierarchyEntry)> {
        self.children.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Nesting depth in edges (a leaf is 0)
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|(_, c)| 1 + c.depth())
            .max()
            .unwrap_or(0)
    }
}

/// Children compare as a set: ordering follows store result order and is not significant
impl PartialEq for HierarchyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self.user_proficiency == other.user_proficiency
            && self.percent == other.percent
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .all(|(name, entry)| other.child(name) == Some(entry))
    }
}

impl Serialize for HierarchyEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.children.len()))?;
        map.serialize_entry("count", &self.count)?;
        map.serialize_entry("user_proficiency", &self.user_proficiency)?;
        map.serialize_entry("percent", &self.percent)?;
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}

/// Profession name → coverage tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageTree {
    professions: Vec<(String, HierarchyEntry)>,
}

impl CoverageTree {
    pub fn get(&self, profession: &str) -> Option<&HierarchyEntry> {
        self.professions
            .iter()
            .find(|(n, _)| n == profession)
            .map(|(_, e)| e)
    }

    pub fn professions(&self) -> impl Iterator<Item = (&str, &HierarchyEntry)> {
        self.professions.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.professions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.professions.is_empty()
    }

    fn insert(&mut self, name: String, entry: HierarchyEntry) {
        match self.professions.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = entry,
            None => self.professions.push((name, entry)),
        }
    }
}

impl Serialize for CoverageTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.professions.len()))?;
        for (name, entry) in &self.professions {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// Renders coverage trees from a taxonomy snapshot and a name-keyed proficiency map
pub struct HierarchyBuilder<'a> {
    graph: &'a TaxonomyGraph,
    proficiency_by_name: &'a HashMap<String, i64>,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(graph: &'a TaxonomyGraph, proficiency_by_name: &'a HashMap<String, i64>) -> Self {
        Self {
            graph,
            proficiency_by_name,
        }
    }

    /// Render the subtree rooted at `node_id`
    ///
    /// Unknown ids render as an empty entry. A cycle reachable from `node_id`
    /// fails with [`crate::Error::CycleDetected`].
    pub fn build_hierarchy(&self, node_id: i64) -> Result<HierarchyEntry> {
        let mut path = HashSet::new();
        self.build_from(node_id, &mut path)
    }

    fn build_from(&self, node_id: i64, path: &mut HashSet<i64>) -> Result<HierarchyEntry> {
        let Some(node) = self.graph.node(node_id) else {
            return Ok(HierarchyEntry::default());
        };
        let name = TaxonomyGraph::display_name(node);
        let user_proficiency = self.proficiency_by_name.get(&name).copied().unwrap_or(0);
        let mut entry = HierarchyEntry::new(node.required_value(), user_proficiency);

        path.insert(node_id);
        for child in self.graph.resolve_children(node_id, path)? {
            let child_name = TaxonomyGraph::display_name(child);
            if RESERVED_KEYS.contains(&child_name.as_str()) {
                warn!(
                    parent = node_id,
                    child = child.id,
                    name = %child_name,
                    "Child name collides with a reserved key, skipping"
                );
                continue;
            }
            let child_entry = self.build_from(child.id, path)?;
            entry.insert_child(child_name, child_entry);
        }
        path.remove(&node_id);

        Ok(entry)
    }

    /// Render every Profession root, keyed by profession name
    pub fn export(&self) -> Result<CoverageTree> {
        let mut tree = CoverageTree::default();
        for root in self.graph.roots() {
            let name = TaxonomyGraph::display_name(root);
            let entry = self.build_hierarchy(root.id)?;
            debug!(profession = %name, depth = entry.depth(), "Rendered profession tree");
            tree.insert(name, entry);
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::taxonomy::node::{GraphEdge, GraphNode, NodeLabel, PropertyValue};
    use crate::error::Error;
    use serde_json::json;

    fn node(id: i64, label: NodeLabel, name: &str) -> GraphNode {
        GraphNode::new(id, label)
            .with_property("name", PropertyValue::Text(name.into()))
            .with_property("profession_id", PropertyValue::Int(1))
    }

    fn skill(id: i64, name: &str, value: i64) -> GraphNode {
        node(id, NodeLabel::Skill, name).with_property("value", PropertyValue::Int(value))
    }

    fn backend_graph(sql_value: i64) -> TaxonomyGraph {
        TaxonomyGraph::new(
            vec![
                node(1, NodeLabel::Profession, "Backend Engineer"),
                node(2, NodeLabel::Category, "Databases"),
                skill(3, "SQL", sql_value),
                skill(4, "Docker", 5),
            ],
            &[
                GraphEdge::contains(1, 2),
                GraphEdge::contains(2, 3),
                GraphEdge::contains(1, 4),
            ],
        )
    }

    fn progress(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries.iter().map(|(n, p)| (n.to_string(), *p)).collect()
    }

    #[test]
    fn test_skill_entry_percent() {
        let graph = backend_graph(10);
        let user = progress(&[("SQL", 7)]);
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();

        let sql = tree
            .get("Backend Engineer")
            .and_then(|p| p.child("Databases"))
            .and_then(|c| c.child("SQL"))
            .unwrap();
        assert_eq!(
            serde_json::to_value(sql).unwrap(),
            json!({"count": 10, "user_proficiency": 7, "percent": 70.0})
        );
    }

    #[test]
    fn test_zero_value_gives_zero_percent() {
        let graph = backend_graph(0);
        let user = progress(&[("SQL", 7)]);
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        let sql = tree
            .get("Backend Engineer")
            .unwrap()
            .child("Databases")
            .unwrap()
            .child("SQL")
            .unwrap();
        assert_eq!(sql.percent, 0.0);
        assert_eq!(sql.user_proficiency, 7);
    }

    #[test]
    fn test_percent_is_capped() {
        let graph = backend_graph(10);
        let user = progress(&[("SQL", 15)]);
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        let sql = tree
            .get("Backend Engineer")
            .unwrap()
            .child("Databases")
            .unwrap()
            .child("SQL")
            .unwrap();
        assert_eq!(sql.percent, 100.0);
    }

    #[test]
    fn test_grouping_nodes_have_zero_count() {
        let graph = backend_graph(10);
        let user = HashMap::new();
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        let root = tree.get("Backend Engineer").unwrap();
        assert_eq!(root.count, 0);
        assert_eq!(root.percent, 0.0);
        assert_eq!(root.child("Docker").unwrap().count, 5);
    }

    #[test]
    fn test_serialized_shape() {
        let graph = backend_graph(10);
        let user = HashMap::new();
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "Backend Engineer": {
                    "count": 0, "user_proficiency": 0, "percent": 0.0,
                    "Databases": {
                        "count": 0, "user_proficiency": 0, "percent": 0.0,
                        "SQL": {"count": 10, "user_proficiency": 0, "percent": 0.0}
                    },
                    "Docker": {"count": 5, "user_proficiency": 0, "percent": 0.0}
                }
            })
        );
    }

    #[test]
    fn test_depth_matches_longest_chain() {
        let graph = backend_graph(10);
        let user = HashMap::new();
        let entry = HierarchyBuilder::new(&graph, &user).build_hierarchy(1).unwrap();
        assert_eq!(entry.depth(), graph.longest_chain(1).unwrap());
        assert_eq!(entry.depth(), 2);
    }

    #[test]
    fn test_rebuild_is_structurally_equal_regardless_of_edge_order() {
        let nodes = vec![
            node(1, NodeLabel::Profession, "Backend Engineer"),
            skill(3, "SQL", 10),
            skill(4, "Docker", 5),
        ];
        let a = TaxonomyGraph::new(
            nodes.clone(),
            &[GraphEdge::contains(1, 3), GraphEdge::contains(1, 4)],
        );
        let b = TaxonomyGraph::new(nodes, &[GraphEdge::contains(1, 4), GraphEdge::contains(1, 3)]);
        let user = progress(&[("SQL", 3)]);
        let first = HierarchyBuilder::new(&a, &user).export().unwrap();
        let second = HierarchyBuilder::new(&b, &user).export().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, HierarchyBuilder::new(&a, &user).export().unwrap());
    }

    #[test]
    fn test_cycle_fails_instead_of_overflowing() {
        let graph = TaxonomyGraph::new(
            vec![
                node(1, NodeLabel::Profession, "P"),
                node(2, NodeLabel::Category, "A"),
                node(3, NodeLabel::Category, "B"),
            ],
            &[
                GraphEdge::contains(1, 2),
                GraphEdge::contains(2, 3),
                GraphEdge::contains(3, 2),
            ],
        );
        let user = HashMap::new();
        let result = HierarchyBuilder::new(&graph, &user).export();
        assert!(matches!(result, Err(Error::CycleDetected(2))));
    }

    #[test]
    fn test_diamond_renders_under_each_parent() {
        let graph = TaxonomyGraph::new(
            vec![
                node(1, NodeLabel::Profession, "P"),
                node(2, NodeLabel::Category, "A"),
                node(3, NodeLabel::Category, "B"),
                skill(4, "Git", 4),
            ],
            &[
                GraphEdge::contains(1, 2),
                GraphEdge::contains(1, 3),
                GraphEdge::contains(2, 4),
                GraphEdge::contains(3, 4),
            ],
        );
        let user = progress(&[("Git", 2)]);
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        let root = tree.get("P").unwrap();
        assert_eq!(root.child("A").unwrap().child("Git").unwrap().percent, 50.0);
        assert_eq!(root.child("B").unwrap().child("Git").unwrap().percent, 50.0);
    }

    #[test]
    fn test_reserved_child_name_is_skipped() {
        let graph = TaxonomyGraph::new(
            vec![node(1, NodeLabel::Profession, "P"), skill(2, "count", 3)],
            &[GraphEdge::contains(1, 2)],
        );
        let user = HashMap::new();
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        let root = tree.get("P").unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.count, 0);
    }

    #[test]
    fn test_empty_graph_exports_empty_tree() {
        let graph = TaxonomyGraph::default();
        let user = HashMap::new();
        let tree = HierarchyBuilder::new(&graph, &user).export().unwrap();
        assert!(tree.is_empty());
        assert_eq!(serde_json::to_value(&tree).unwrap(), json!({}));
    }
}
