//! Apache AGE implementation of the TaxonomySource
//!
//! Queries run through `cypher()` on a pooled PostgreSQL connection. Every
//! statement is bounded by the configured query timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::config::{GraphConfig, validate_graph_name};
use crate::domain::taxonomy::{
    AppliedProfession, FetchOutcome, GraphEdge, GraphNode, PlannedNode, ProfessionPlan,
    TaxonomySource, TaxonomyWriter, decode_edge_rows, decode_node_rows,
};
use crate::error::{Error, Result};
use crate::storage::{Database, DatabaseConfig, timed};

use super::cypher;

/// Graph store client over PostgreSQL + Apache AGE
#[derive(Debug, Clone)]
pub struct AgeGraphClient {
    db: Database,
    graph_name: String,
    query_timeout: Duration,
    strict: bool,
}

impl AgeGraphClient {
    /// Open a pooled connection to the graph store
    pub async fn connect(config: &GraphConfig, url: &str) -> Result<Self> {
        validate_graph_name(&config.graph_name).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let db = Database::connect(DatabaseConfig::from_graph_config(config, url)).await?;
        Self::from_database(db, config)
    }

    /// Use an existing pool; its connections must have AGE loaded
    pub fn from_database(db: Database, config: &GraphConfig) -> Result<Self> {
        validate_graph_name(&config.graph_name).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Self {
            db,
            graph_name: config.graph_name.clone(),
            query_timeout: config.query_timeout(),
            strict: config.strict_decoding,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Release the pool; idempotent
    pub async fn close(&self) {
        self.db.close().await;
    }

    async fn timed<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        timed(self.query_timeout, fut).await
    }

    /// Whether the configured graph exists in `ag_catalog.ag_graph`
    pub async fn graph_exists(&self) -> Result<bool> {
        let count: i64 = self
            .timed(
                sqlx::query_scalar("SELECT count(*) FROM ag_catalog.ag_graph WHERE name = $1")
                    .bind(&self.graph_name)
                    .fetch_one(self.db.pool()),
            )
            .await?;
        Ok(count > 0)
    }

    /// Look a name up in `professions` or `skills`, inserting it when missing
    async fn get_or_create_id(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        table: &'static str,
        name: &str,
    ) -> Result<i64> {
        let select = format!("SELECT id::bigint FROM {table} WHERE name = $1");
        let existing: Option<i64> = self
            .timed(sqlx::query_scalar(&select).bind(name).fetch_optional(&mut **tx))
            .await?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let insert = format!("INSERT INTO {table} (name) VALUES ($1) RETURNING id::bigint");
        let id: i64 = self
            .timed(sqlx::query_scalar(&insert).bind(name).fetch_one(&mut **tx))
            .await?;
        debug!(table, name, id, "Created relational row");
        Ok(id)
    }

    async fn run_cypher(&self, tx: &mut Transaction<'static, Postgres>, body: &str) -> Result<()> {
        let sql = cypher::execute(&self.graph_name, body);
        debug!(query = %body, "Executing cypher");
        self.timed(sqlx::query(&sql).execute(&mut **tx)).await?;
        Ok(())
    }
}

#[async_trait]
impl TaxonomyWriter for AgeGraphClient {
    async fn ensure_graph(&self) -> Result<bool> {
        if self.graph_exists().await? {
            debug!(graph = %self.graph_name, "Graph already exists");
            return Ok(false);
        }
        self.timed(
            sqlx::query("SELECT ag_catalog.create_graph($1::name)")
                .bind(&self.graph_name)
                .execute(self.db.pool()),
        )
        .await?;
        info!(graph = %self.graph_name, "Created graph");
        Ok(true)
    }

    /// Runs in a single transaction
    async fn apply_profession(&self, plan: &ProfessionPlan) -> Result<AppliedProfession> {
        let mut tx = self.timed(self.db.pool().begin()).await?;

        let profession_id = self
            .get_or_create_id(&mut tx, "professions", &plan.name)
            .await?;
        self.run_cypher(&mut tx, &cypher::merge_profession(profession_id, &plan.name))
            .await?;

        for node in &plan.nodes {
            let body = match node {
                PlannedNode::Category { name } => cypher::merge_category(profession_id, name),
                PlannedNode::Skill { name, count } => {
                    let skill_id = self.get_or_create_id(&mut tx, "skills", name).await?;
                    cypher::merge_skill(profession_id, skill_id, name, *count)
                }
            };
            self.run_cypher(&mut tx, &body).await?;
        }

        for link in &plan.links {
            let body = cypher::merge_contains(
                profession_id,
                (link.from.label, link.from.name.as_str()),
                (link.to.label, link.to.name.as_str()),
            );
            self.run_cypher(&mut tx, &body).await?;
        }

        self.timed(tx.commit()).await?;
        info!(
            profession = %plan.name,
            profession_id,
            nodes = plan.nodes.len() + 1,
            links = plan.links.len(),
            "Imported profession"
        );
        Ok(AppliedProfession {
            name: plan.name.clone(),
            profession_id,
            nodes: plan.nodes.len() + 1,
            links: plan.links.len(),
        })
    }
}

#[async_trait]
impl TaxonomySource for AgeGraphClient {
    async fn fetch_nodes(&self, profession_id: i64) -> Result<FetchOutcome<GraphNode>> {
        let sql = cypher::select(
            &self.graph_name,
            &cypher::nodes_of_profession(profession_id),
            &["n"],
        );
        debug!(profession_id, "Fetching taxonomy nodes");
        let rows: Vec<String> = self
            .timed(sqlx::query_scalar(&sql).fetch_all(self.db.pool()))
            .await?;
        debug!(profession_id, rows = rows.len(), "Fetched node rows");
        decode_node_rows(rows, profession_id, self.strict)
    }

    async fn fetch_edges(&self, profession_id: i64) -> Result<FetchOutcome<GraphEdge>> {
        let sql = cypher::select(
            &self.graph_name,
            &cypher::contains_edges_of_profession(profession_id),
            &["a", "r", "b"],
        );
        debug!(profession_id, "Fetching CONTAINS edges");
        let rows: Vec<(String, String, String)> = self
            .timed(sqlx::query_as(&sql).fetch_all(self.db.pool()))
            .await?;
        debug!(profession_id, rows = rows.len(), "Fetched edge rows");
        decode_edge_rows(rows, self.strict)
    }
}
