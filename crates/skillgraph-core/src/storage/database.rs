//! PostgreSQL connection pool with Apache AGE session setup
//!
//! Every pooled connection runs `LOAD 'age'` and puts `ag_catalog` on its
//! search path before first use, so callers can issue `cypher()` queries directly.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{GraphConfig, redact_url};
use crate::error::{Error, Result};

/// Default maximum connections in the pool
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a connection
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Session statements run on every new connection
const AGE_SESSION_SETUP: [&str; 2] = [
    "LOAD 'age'",
    r#"SET search_path = ag_catalog, "$user", public"#,
];

/// Run a query, failing with [`Error::QueryTimeout`] once `timeout` elapses
pub async fn timed<T, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(Error::from_sqlx),
        Err(_) => Err(Error::QueryTimeout(timeout.as_secs())),
    }
}

/// Database configuration options
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// How long to wait when establishing or acquiring a connection
    pub connect_timeout: Duration,
    /// Whether to load the AGE extension on each connection
    pub load_age: bool,
}

impl DatabaseConfig {
    /// Create a new database config for the given URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            load_age: true,
        }
    }

    /// Build from the graph settings and a resolved URL
    pub fn from_graph_config(graph: &GraphConfig, url: impl Into<String>) -> Self {
        Self::with_url(url)
            .max_connections(graph.max_connections)
            .connect_timeout(graph.connect_timeout())
    }

    /// Set the maximum number of connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Skip the AGE session setup (plain relational access)
    pub fn without_age(mut self) -> Self {
        self.load_age = false;
        self
    }
}

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with the given configuration
    ///
    /// Failure is reported as [`Error::StoreUnavailable`] and is not retried.
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        let load_age = config.load_age;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if load_age {
                        for statement in AGE_SESSION_SETUP {
                            (&mut *conn).execute(statement).await?;
                        }
                    }
                    Ok(())
                })
            })
            .connect(&config.url)
            .await
            .map_err(Error::StoreUnavailable)?;

        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Connected to graph store"
        );
        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if database is healthy
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::StoreUnavailable)?;
        Ok(())
    }

    /// Close the connection pool; safe to call more than once
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            debug!("Closing graph store pool");
            self.pool.close().await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DatabaseConfig::with_url("postgres://localhost/skills")
            .max_connections(0)
            .connect_timeout(Duration::from_secs(2))
            .without_age();
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert!(!config.load_age);
    }

    #[test]
    fn test_from_graph_config() {
        let graph = GraphConfig {
            max_connections: 9,
            connect_timeout_secs: 3,
            ..GraphConfig::default()
        };
        let config = DatabaseConfig::from_graph_config(&graph, "postgres://db/x");
        assert_eq!(config.max_connections, 9);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(config.load_age);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_query_times_out() {
        let stalled = std::future::pending::<std::result::Result<(), sqlx::Error>>();
        let err = timed(Duration::from_secs(30), stalled).await.unwrap_err();
        assert!(matches!(err, Error::QueryTimeout(30)));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_timed_maps_query_errors() {
        let failing = async { Err::<(), _>(sqlx::Error::RowNotFound) };
        let err = timed(Duration::from_secs(1), failing).await.unwrap_err();
        assert_eq!(err.code(), "E101");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        let config = DatabaseConfig::with_url("postgres://nobody:pw@127.0.0.1:1/none")
            .connect_timeout(Duration::from_millis(500));
        let err = Database::connect(config).await.unwrap_err();
        assert_eq!(err.code(), "E100");
        assert!(err.is_unavailable());
    }
}
