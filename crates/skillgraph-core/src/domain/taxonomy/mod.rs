//! Profession skill taxonomy
//!
//! A profession's competency taxonomy lives in the graph store as a property
//! graph: one `Profession` root, `Category` grouping nodes, and `Skill` nodes
//! carrying a required proficiency, linked by `CONTAINS` edges.
//!
//! ## Pipeline
//!
//! ```text
//! graph rows ──agtype──▶ GraphNode / GraphEdge ──▶ TaxonomyGraph
//!                                                    ├─▶ HierarchyBuilder ─▶ CoverageTree
//!                                                    └─▶ SkillCollector ──▶ Vec<CollectedSkill>
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skillgraph_core::domain::taxonomy::{HierarchyBuilder, TaxonomyGraph};
//!
//! let graph = TaxonomyGraph::new(nodes.items, &edges.items);
//! let tree = HierarchyBuilder::new(&graph, &proficiency_by_name).export()?;
//! println!("{}", serde_json::to_string_pretty(&tree)?);
//! ```

pub mod agtype;
mod collector;
mod coverage;
mod graph;
mod hierarchy;
mod import;
mod node;
mod repository;

pub use agtype::{AgtypeTag, AgtypeValue, Edge, Vertex, parse_literal, parse_value};
pub use collector::{CollectedSkill, SkillCollector};
pub use coverage::coverage_percent;
pub use graph::TaxonomyGraph;
pub use hierarchy::{CoverageTree, HierarchyBuilder, HierarchyEntry, RESERVED_KEYS};
pub use import::{
    AppliedProfession, ImportPlan, NodeRef, PlannedLink, PlannedNode, ProfessionPlan, plan_import,
    plan_import_str,
};
pub use node::{EdgeType, GraphEdge, GraphNode, NodeLabel, Properties, PropertyValue};
pub use repository::{
    DegradedRow, FetchOutcome, InMemoryTaxonomySource, TaxonomySource, TaxonomyWriter,
    decode_edge_rows, decode_node_rows,
};
