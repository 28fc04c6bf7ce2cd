//! Flattens the Skill nodes reachable from a root

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::graph::TaxonomyGraph;

/// A Skill node lifted out of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedSkill {
    /// Graph vertex id
    pub id: i64,
    pub name: String,
    /// Relational skill id; `None` when the node carries no `skill_id`
    pub skill_id: Option<i64>,
    /// Required proficiency (`value` on the node)
    pub count: i64,
}

/// Walks the taxonomy and emits Skill nodes only
///
/// Profession and Category nodes are traversed through. Skill nodes are emitted
/// and their children traversed too, since a skill may nest sub-skills. A node
/// reachable through several parents is emitted once.
pub struct SkillCollector<'a> {
    graph: &'a TaxonomyGraph,
}

impl<'a> SkillCollector<'a> {
    pub fn new(graph: &'a TaxonomyGraph) -> Self {
        Self { graph }
    }

    /// Skills reachable from one node, in traversal order
    pub fn collect_skill_nodes(&self, node_id: i64) -> Result<Vec<CollectedSkill>> {
        let mut out = Vec::new();
        let mut emitted = HashSet::new();
        self.walk(node_id, &mut HashSet::new(), &mut emitted, &mut out)?;
        Ok(out)
    }

    /// Skills reachable from every Profession root, each emitted once
    pub fn collect_all(&self) -> Result<Vec<CollectedSkill>> {
        let mut out = Vec::new();
        let mut emitted = HashSet::new();
        for root in self.graph.roots() {
            self.walk(root.id, &mut HashSet::new(), &mut emitted, &mut out)?;
        }
        Ok(out)
    }

    fn walk(
        &self,
        node_id: i64,
        path: &mut HashSet<i64>,
        emitted: &mut HashSet<i64>,
        out: &mut Vec<CollectedSkill>,
    ) -> Result<()> {
        let Some(node) = self.graph.node(node_id) else {
            return Ok(());
        };
        if node.is_skill() && emitted.insert(node.id) {
            out.push(CollectedSkill {
                id: node.id,
                name: TaxonomyGraph::display_name(node),
                skill_id: node.skill_id(),
                count: node.required_value(),
            });
        }

        path.insert(node_id);
        for child in self.graph.resolve_children(node_id, path)? {
            self.walk(child.id, path, emitted, out)?;
        }
        path.remove(&node_id);
        Ok(())
    }
}
