//! Application configuration model.
//!
//! Loaded hierarchically by `infrastructure::config::ConfigLoader`:
//! defaults, then `.fixpoint/config.yaml`, then `.fixpoint/local.yaml`,
//! then `FIXPOINT_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspaces: WorkspacesConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub python: PythonConfig,
    #[serde(default)]
    pub cpp: CppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workspace and artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspacesConfig {
    /// Root directory holding one subdirectory per job
    #[serde(default = "default_workspaces_root")]
    pub root: PathBuf,
    /// Where the eval harness writes its results
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Default for WorkspacesConfig {
    fn default() -> Self {
        Self {
            root: default_workspaces_root(),
            reports_dir: default_reports_dir(),
        }
    }
}

/// HTTP server settings for `fixpoint serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upload size cap in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

/// Repair-loop budgets and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Iteration budget per job
    #[serde(default = "default_max_iters")]
    pub max_iters: u32,
    /// Wall-clock cap for any external tool invocation, seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// Findings handed to the model per round
    #[serde(default = "default_max_findings")]
    pub max_findings: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            tool_timeout_secs: default_tool_timeout_secs(),
            max_findings: default_max_findings(),
        }
    }
}

/// Model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// "http" for the messages API, "mock" for offline/testing
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_id")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_rate_limit_rps")]
    pub rate_limit_rps: f64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model_id(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: None,
            request_timeout_secs: default_request_timeout_secs(),
            rate_limit_rps: default_rate_limit_rps(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry/backoff settings for transient model API failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Python analyzer/test-runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PythonConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Explicit test command; overrides pytest discovery when set
    #[serde(default)]
    pub test_command: Option<String>,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            test_command: None,
        }
    }
}

/// How the C++ runner treats Qt-dependent projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QtBehavior {
    /// Skip compilation when Qt usage is detected
    Auto,
    /// Always skip compilation
    Skip,
    /// Compile even when Qt is detected
    Force,
}

impl Default for QtBehavior {
    fn default() -> Self {
        Self::Auto
    }
}

/// C++ analyzer/test-runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CppConfig {
    #[serde(default)]
    pub qt_behavior: QtBehavior,
    #[serde(default = "default_compiler")]
    pub compiler: String,
}

impl Default for CppConfig {
    fn default() -> Self {
        Self {
            qt_behavior: QtBehavior::default(),
            compiler: default_compiler(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
    /// When set, also log to rotated files in this directory
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

fn default_workspaces_root() -> PathBuf {
    PathBuf::from(".fixpoint/workspaces")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from(".fixpoint/reports")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_mb() -> usize {
    64
}

fn default_max_iters() -> u32 {
    5
}

fn default_tool_timeout_secs() -> u64 {
    300
}

fn default_max_findings() -> usize {
    20
}

fn default_provider() -> String {
    "http".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model_id() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_api_key_env() -> String {
    "FIXPOINT_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_rate_limit_rps() -> f64 {
    2.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    2_000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_compiler() -> String {
    "g++".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.repair.max_iters, 5);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.provider, "http");
        assert_eq!(config.cpp.qt_behavior, QtBehavior::Auto);
    }

    #[test]
    fn yaml_overrides_nested_fields() {
        use figment::providers::{Format, Serialized, Yaml};
        use figment::Figment;

        let yaml = r"
repair:
  max_iters: 3
model:
  provider: mock
cpp:
  qt_behavior: skip
";
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
            .expect("YAML should parse");
        assert_eq!(config.repair.max_iters, 3);
        assert_eq!(config.model.provider, "mock");
        assert_eq!(config.cpp.qt_behavior, QtBehavior::Skip);
        // Untouched sections keep defaults
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.python.interpreter, "python3");
    }
}
