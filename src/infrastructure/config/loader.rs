use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_iters: {0}. Must be between 1 and 50")]
    InvalidMaxIters(u32),

    #[error("Invalid tool timeout: {0}. Must be positive")]
    InvalidToolTimeout(u64),

    #[error("Invalid max_findings: {0}. Must be at least 1")]
    InvalidMaxFindings(usize),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid model provider: {0}. Must be one of: http, mock")]
    InvalidProvider(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Workspaces root cannot be empty")]
    EmptyWorkspacesRoot,

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid max_upload_mb: {0}. Must be between 1 and 1024")]
    InvalidMaxUpload(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .fixpoint/config.yaml (project config)
    /// 3. .fixpoint/local.yaml (local overrides, optional)
    /// 4. Environment variables (FIXPOINT_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.fixpoint/) so multiple
    /// deployments on one machine stay independent.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".fixpoint/config.yaml"))
            .merge(Yaml::file(".fixpoint/local.yaml"))
            .merge(Env::prefixed("FIXPOINT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.workspaces.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyWorkspacesRoot);
        }

        if config.repair.max_iters == 0 || config.repair.max_iters > 50 {
            return Err(ConfigError::InvalidMaxIters(config.repair.max_iters));
        }
        if config.repair.tool_timeout_secs == 0 {
            return Err(ConfigError::InvalidToolTimeout(config.repair.tool_timeout_secs));
        }
        if config.repair.max_findings == 0 {
            return Err(ConfigError::InvalidMaxFindings(config.repair.max_findings));
        }

        match config.model.provider.as_str() {
            "http" | "mock" => {}
            other => return Err(ConfigError::InvalidProvider(other.to_string())),
        }
        if config.model.rate_limit_rps <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(config.model.rate_limit_rps));
        }
        if config.model.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.model.retry.max_retries));
        }
        if config.model.retry.initial_backoff_ms >= config.model.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.model.retry.initial_backoff_ms,
                config.model.retry.max_backoff_ms,
            ));
        }

        if config.server.max_upload_mb == 0 || config.server.max_upload_mb > 1024 {
            return Err(ConfigError::InvalidMaxUpload(config.server.max_upload_mb));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
        match config.logging.format.as_str() {
            "json" | "pretty" => {}
            other => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn zero_iteration_budget_is_rejected() {
        let mut config = Config::default();
        config.repair.max_iters = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxIters(0))
        ));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = Config::default();
        config.model.provider = "oracle".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidProvider(_))
        ));
    }

    #[test]
    fn inverted_backoff_is_rejected() {
        let mut config = Config::default();
        config.model.retry.initial_backoff_ms = 5_000;
        config.model.retry.max_backoff_ms = 1_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(5_000, 1_000))
        ));
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(
            &path,
            "repair:\n  max_iters: 7\npython:\n  interpreter: python3.12\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.repair.max_iters, 7);
        assert_eq!(config.python.interpreter, "python3.12");
        // Untouched sections keep defaults
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
