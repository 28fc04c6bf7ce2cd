//! Source trait for profession taxonomies
//!
//! The trait abstracts over the graph backend (Apache AGE, in-memory fixtures).
//! Row decoding is shared here so every backend degrades malformed rows the same way.

use async_trait::async_trait;
use tracing::warn;

use crate::error::{Error, Result};

use super::agtype::{AgtypeValue, parse_literal};
use super::import::{AppliedProfession, ProfessionPlan};
use super::node::{GraphEdge, GraphNode};

/// A result row that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedRow {
    pub raw: String,
    pub reason: String,
}

/// Decoded items of one query plus the rows that were skipped
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    pub degraded: Vec<DegradedRow>,
}

impl<T> Default for FetchOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            degraded: Vec::new(),
        }
    }
}

impl<T> FetchOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    fn degrade(
        &mut self,
        raw: impl Into<String>,
        reason: impl Into<String>,
        strict: bool,
    ) -> Result<()> {
        let row = DegradedRow {
            raw: raw.into(),
            reason: reason.into(),
        };
        if strict {
            return Err(Error::decode(row.raw, row.reason));
        }
        warn!(raw = %row.raw, reason = %row.reason, "Skipping undecodable row");
        self.degraded.push(row);
        Ok(())
    }
}

/// Source of profession taxonomy nodes and edges
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    /// All nodes whose `profession_id` equals the argument
    async fn fetch_nodes(&self, profession_id: i64) -> Result<FetchOutcome<GraphNode>>;

    /// All `CONTAINS` edges whose endpoints both belong to the profession
    async fn fetch_edges(&self, profession_id: i64) -> Result<FetchOutcome<GraphEdge>>;
}

/// Destination for imported taxonomies
#[async_trait]
pub trait TaxonomyWriter: Send + Sync {
    /// Create the graph if needed; returns whether it was created
    async fn ensure_graph(&self) -> Result<bool>;

    /// Write one profession with its nodes and links
    async fn apply_profession(&self, plan: &ProfessionPlan) -> Result<AppliedProfession>;
}

/// Decode node rows (one vertex literal each)
///
/// Rows that are not taxonomy vertices, or that belong to another profession,
/// are degraded. With `strict` the first degraded row is an error.
pub fn decode_node_rows<I>(
    rows: I,
    profession_id: i64,
    strict: bool,
) -> Result<FetchOutcome<GraphNode>>
where
    I: IntoIterator<Item = String>,
{
    let mut outcome = FetchOutcome::default();
    for raw in rows {
        let vertex = match parse_literal(&raw) {
            AgtypeValue::Vertex(vertex) => vertex,
            AgtypeValue::Unparsed(_) => {
                outcome.degrade(raw, "malformed vertex payload", strict)?;
                continue;
            }
            _ => {
                outcome.degrade(raw, "not a vertex literal", strict)?;
                continue;
            }
        };
        match vertex.into_node() {
            Ok(node) if node.profession_id() == Some(profession_id) => outcome.items.push(node),
            Ok(node) => {
                let reason = format!(
                    "profession_id {:?} does not match requested {}",
                    node.profession_id(),
                    profession_id
                );
                outcome.degrade(raw, reason, strict)?;
            }
            Err(err) => outcome.degrade(raw, err.to_string(), strict)?,
        }
    }
    Ok(outcome)
}

/// Decode edge rows of `(start vertex, edge, end vertex)` literals
///
/// Only the endpoint ids are needed; the middle column is not inspected.
pub fn decode_edge_rows<I>(rows: I, strict: bool) -> Result<FetchOutcome<GraphEdge>>
where
    I: IntoIterator<Item = (String, String, String)>,
{
    let mut outcome = FetchOutcome::default();
    for (start, _edge, end) in rows {
        match (parse_literal(&start).id(), parse_literal(&end).id()) {
            (Some(from), Some(to)) => outcome.items.push(GraphEdge::contains(from, to)),
            (None, _) => outcome.degrade(start, "edge start has no vertex id", strict)?,
            (_, None) => outcome.degrade(end, "edge end has no vertex id", strict)?,
        }
    }
    Ok(outcome)
}

/// Taxonomy source over fixed literal rows, as the graph store would return them
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaxonomySource {
    node_rows: Vec<String>,
    edge_rows: Vec<(String, String, String)>,
    strict: bool,
}

impl InMemoryTaxonomySource {
    pub fn new(node_rows: Vec<String>, edge_rows: Vec<(String, String, String)>) -> Self {
        Self {
            node_rows,
            edge_rows,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[async_trait]
impl TaxonomySource for InMemoryTaxonomySource {
    async fn fetch_nodes(&self, profession_id: i64) -> Result<FetchOutcome<GraphNode>> {
        decode_node_rows(self.node_rows.iter().cloned(), profession_id, self.strict)
    }

    async fn fetch_edges(&self, profession_id: i64) -> Result<FetchOutcome<GraphEdge>> {
        let nodes = self.fetch_nodes(profession_id).await?;
        let scoped: std::collections::HashSet<i64> = nodes.items.iter().map(|n| n.id).collect();
        let mut outcome = decode_edge_rows(self.edge_rows.iter().cloned(), self.strict)?;
        outcome
            .items
            .retain(|e| scoped.contains(&e.from) && scoped.contains(&e.to));
        Ok(outcome)
    }
}
