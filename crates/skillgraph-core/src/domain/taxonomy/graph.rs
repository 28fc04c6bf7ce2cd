//! In-memory taxonomy graph
//!
//! Holds the nodes of one profession snapshot together with the parent → children
//! adjacency derived from its `CONTAINS` edges. Nodes and children keep the order
//! in which the store returned them.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::{Error, Result};

use super::node::{GraphEdge, GraphNode, NodeLabel};

/// Nodes plus adjacency for one profession snapshot
#[derive(Debug, Clone, Default)]
pub struct TaxonomyGraph {
    nodes: HashMap<i64, GraphNode>,
    order: Vec<i64>,
    children: HashMap<i64, Vec<i64>>,
}

impl TaxonomyGraph {
    /// Build the graph; an edge `{from, to}` appends `to` to the children of `from`
    pub fn new(nodes: Vec<GraphNode>, edges: &[GraphEdge]) -> Self {
        let mut graph = Self::default();
        for node in nodes {
            if !graph.nodes.contains_key(&node.id) {
                graph.order.push(node.id);
            }
            graph.nodes.insert(node.id, node);
        }
        for edge in edges {
            graph.children.entry(edge.from).or_default().push(edge.to);
        }
        graph
    }

    pub fn node(&self, id: i64) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Child ids of a node in edge arrival order
    pub fn children(&self, id: i64) -> &[i64] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes in arrival order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Profession roots in arrival order
    pub fn roots(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes().filter(|n| n.label == NodeLabel::Profession)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Key under which a node appears in rendered output
    pub fn display_name(node: &GraphNode) -> String {
        node.name()
            .unwrap_or_else(|| format!("{}_{}", node.label, node.id))
    }

    /// Resolve the children of `id` that are present in the snapshot
    ///
    /// Edges pointing at nodes missing from the snapshot (e.g. rows that failed to
    /// decode) are skipped with a warning. A child already on `path` is a cycle.
    pub(crate) fn resolve_children<'a>(
        &'a self,
        id: i64,
        path: &HashSet<i64>,
    ) -> Result<Vec<&'a GraphNode>> {
        let mut resolved = Vec::with_capacity(self.children(id).len());
        for child_id in self.children(id) {
            if path.contains(child_id) {
                return Err(Error::CycleDetected(*child_id));
            }
            match self.nodes.get(child_id) {
                Some(child) => resolved.push(child),
                None => {
                    warn!(parent = id, child = child_id, "Edge points at unknown node, skipping")
                }
            }
        }
        Ok(resolved)
    }

    /// Longest `CONTAINS` chain (in edges) below `id`
    pub fn longest_chain(&self, id: i64) -> Result<usize> {
        let mut path = HashSet::new();
        self.longest_chain_from(id, &mut path)
    }

    fn longest_chain_from(&self, id: i64, path: &mut HashSet<i64>) -> Result<usize> {
        path.insert(id);
        let mut longest = 0;
        for child in self.resolve_children(id, path)? {
            longest = longest.max(1 + self.longest_chain_from(child.id, path)?);
        }
        path.remove(&id);
        Ok(longest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::taxonomy::node::PropertyValue;

    fn named(id: i64, label: NodeLabel, name: &str) -> GraphNode {
        GraphNode::new(id, label).with_property("name", PropertyValue::Text(name.into()))
    }

    #[test]
    fn test_children_follow_edge_order() {
        let graph = TaxonomyGraph::new(
            vec![
                named(1, NodeLabel::Profession, "Backend Engineer"),
                named(2, NodeLabel::Skill, "SQL"),
                named(3, NodeLabel::Skill, "Docker"),
            ],
            &[GraphEdge::contains(1, 3), GraphEdge::contains(1, 2)],
        );
        assert_eq!(graph.children(1), &[3, 2]);
        assert!(graph.children(2).is_empty());
        assert_eq!(graph.roots().count(), 1);
    }

    #[test]
    fn test_duplicate_node_keeps_first_position() {
        let graph = TaxonomyGraph::new(
            vec![
                named(1, NodeLabel::Profession, "A"),
                named(2, NodeLabel::Profession, "B"),
                named(1, NodeLabel::Profession, "A2"),
            ],
            &[],
        );
        let names: Vec<_> = graph.nodes().filter_map(GraphNode::name).collect();
        assert_eq!(names, vec!["A2", "B"]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_longest_chain() {
        let graph = TaxonomyGraph::new(
            vec![
                named(1, NodeLabel::Profession, "P"),
                named(2, NodeLabel::Category, "C"),
                named(3, NodeLabel::Skill, "S1"),
                named(4, NodeLabel::Skill, "S2"),
            ],
            &[
                GraphEdge::contains(1, 2),
                GraphEdge::contains(2, 3),
                GraphEdge::contains(1, 4),
            ],
        );
        assert_eq!(graph.longest_chain(1).unwrap(), 2);
        assert_eq!(graph.longest_chain(4).unwrap(), 0);
    }

    #[test]
    fn test_cycle_is_reported() {
        let graph = TaxonomyGraph::new(
            vec![named(1, NodeLabel::Profession, "P"), named(2, NodeLabel::Category, "C")],
            &[GraphEdge::contains(1, 2), GraphEdge::contains(2, 1)],
        );
        assert!(matches!(graph.longest_chain(1), Err(Error::CycleDetected(1))));
    }

    #[test]
    fn test_display_name_fallback() {
        let node = GraphNode::new(9, NodeLabel::Skill);
        assert_eq!(TaxonomyGraph::display_name(&node), "Skill_9");
    }
}
