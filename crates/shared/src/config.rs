//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Workflow configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Workflow engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// How many days in the past a request may still start.
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: u32,
    /// Vacation days granted when a balance year is first touched.
    #[serde(default = "default_annual_days")]
    pub default_annual_days: u32,
    /// Per-store-call timeout in milliseconds. Zero disables the deadline.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_grace_period_days() -> u32 {
    3
}

fn default_annual_days() -> u32 {
    22
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            grace_period_days: default_grace_period_days(),
            default_annual_days: default_annual_days(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PERMIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_defaults() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.grace_period_days, 3);
        assert_eq!(cfg.default_annual_days, 22);
        assert_eq!(cfg.store_timeout_ms, 5_000);
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("PERMIO__DATABASE__URL", Some("postgres://localhost/permio")),
                ("PERMIO__WORKFLOW__GRACE_PERIOD_DAYS", Some("7")),
            ],
            || {
                let cfg = AppConfig::load().expect("config should load from env");
                assert_eq!(cfg.database.url, "postgres://localhost/permio");
                assert_eq!(cfg.database.max_connections, 10);
                assert_eq!(cfg.workflow.grace_period_days, 7);
                assert_eq!(cfg.workflow.default_annual_days, 22);
            },
        );
    }
}
