//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::progress::UnknownStatusPolicy;

/// Environment variables consulted for the database URL, in order
pub const DATABASE_URL_VARS: [&str; 2] = ["SKILLGRAPH_DATABASE_URL", "DATABASE_URL"];

/// Skillgraph configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Only accepted from the environment; a value in the file fails validation
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    pub graph_name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub strict_decoding: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub unknown_status: UnknownStatusPolicy,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            graph_name: "professions_graph".to_string(),
            max_connections: 5,
            connect_timeout_secs: 10,
            query_timeout_secs: 30,
            strict_decoding: false,
        }
    }
}

impl GraphConfig {
    pub fn resolved_database_url(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(DATABASE_URL_VARS
            .iter()
            .find_map(|var| env::var(var).ok().filter(|v| !v.trim().is_empty())))
    }

    /// Like [`Self::resolved_database_url`] but missing is an error
    pub fn require_database_url(&self) -> anyhow::Result<String> {
        self.resolved_database_url()?.ok_or_else(|| {
            anyhow!("Database URL not set. Export SKILLGRAPH_DATABASE_URL or DATABASE_URL.")
        })
    }

    pub fn redacted_database_url(&self) -> anyhow::Result<Option<String>> {
        self.resolved_database_url()
            .map(|opt| opt.map(|url| redact_url(&url)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.database_url.is_some() {
            return Err(anyhow!(
                "Database URLs must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.enforce_env_only()?;
        validate_graph_name(&self.graph_name)?;
        if self.max_connections == 0 {
            return Err(anyhow!("graph.max_connections must be at least 1"));
        }
        if self.query_timeout_secs == 0 {
            return Err(anyhow!("graph.query_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

/// Graph names are interpolated into `cypher()` calls, so only plain identifiers pass
pub fn validate_graph_name(name: &str) -> anyhow::Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') || name.len() > 63 {
        return Err(anyhow!(
            "Invalid graph name: {}. Use letters, digits and underscores, starting with a letter.",
            name
        ));
    }
    Ok(())
}

/// Hide the password of a connection URL
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "***".to_string();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _password)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SKILLGRAPH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("skillgraph")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.graph.validate()
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "graph.graph_name" => Ok(self.graph.graph_name.clone()),
            "graph.max_connections" => Ok(self.graph.max_connections.to_string()),
            "graph.connect_timeout_secs" => Ok(self.graph.connect_timeout_secs.to_string()),
            "graph.query_timeout_secs" => Ok(self.graph.query_timeout_secs.to_string()),
            "graph.strict_decoding" => Ok(self.graph.strict_decoding.to_string()),

            "progress.unknown_status" => Ok(self.progress.unknown_status.as_str().to_string()),

            // Shown redacted
            "graph.database_url" | "database_url" => match self.graph.redacted_database_url()? {
                Some(redacted) => Ok(redacted),
                None => Ok(
                    "(not set - use SKILLGRAPH_DATABASE_URL or DATABASE_URL env var)".to_string(),
                ),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `skillgraph config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "graph.graph_name" => {
                validate_graph_name(value)?;
                self.graph.graph_name = value.to_string();
            }
            "graph.max_connections" => {
                let max: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
                if max == 0 {
                    return Err(anyhow!("max_connections must be at least 1"));
                }
                self.graph.max_connections = max;
            }
            "graph.connect_timeout_secs" => {
                self.graph.connect_timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid connect_timeout_secs value: {}", value))?;
            }
            "graph.query_timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid query_timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("query_timeout_secs must be at least 1"));
                }
                self.graph.query_timeout_secs = secs;
            }
            "graph.strict_decoding" => {
                self.graph.strict_decoding = value
                    .parse()
                    .with_context(|| {
                        format!("Invalid strict_decoding value: {} (use true or false)", value)
                    })?;
            }

            "progress.unknown_status" => {
                self.progress.unknown_status = UnknownStatusPolicy::parse(value).ok_or_else(|| {
                    anyhow!("Invalid unknown_status policy: {}. Valid options: drop, error", value)
                })?;
            }

            "graph.database_url" | "database_url" => {
                return Err(anyhow!(
                    "Database URLs cannot be stored in configuration. \
                     Set the SKILLGRAPH_DATABASE_URL or DATABASE_URL environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `skillgraph config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "graph.database_url",
            "graph.graph_name",
            "graph.max_connections",
            "graph.connect_timeout_secs",
            "graph.query_timeout_secs",
            "graph.strict_decoding",
            "progress.unknown_status",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
