//! Configuration management for avrowire
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Configuration is loaded once at startup and passed by reference into
//! each component's constructor.

use crate::error::{AvrowireError, Result};
use crate::kafka::KafkaConfig;
use crate::registry::{SchemaRef, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for avrowire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Schema registry connection
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Schemas preloaded into the schema store at startup
    #[serde(default)]
    pub schemas: Vec<SchemaRef>,

    /// Kafka consumer group and producer settings
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Schema registry connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URLs of the registry cluster
    #[serde(default = "default_registry_urls")]
    pub urls: Vec<String>,

    /// Retries after the first attempt; negative means one per URL
    #[serde(default = "default_retries")]
    pub retries: i32,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_registry_urls() -> Vec<String> {
    vec!["http://localhost:8081".to_string()]
}

fn default_retries() -> i32 {
    -1
}

fn default_timeout_ms() -> u64 {
    2000
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            urls: default_registry_urls(),
            retries: default_retries(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Also append logs to this file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Parse a configuration file without applying overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AvrowireError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AvrowireError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Registry overrides
        if let Ok(urls) = std::env::var("AVROWIRE_REGISTRY_URLS") {
            let urls = split_list(&urls);
            if !urls.is_empty() {
                tracing::debug!(?urls, "Env override: AVROWIRE_REGISTRY_URLS");
                self.registry.urls = urls;
            }
        }

        if let Ok(retries) = std::env::var("AVROWIRE_REGISTRY_RETRIES") {
            match retries.parse::<i32>() {
                Ok(v) => {
                    self.registry.retries = v;
                    tracing::debug!(retries = v, "Env override: AVROWIRE_REGISTRY_RETRIES");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for AVROWIRE_REGISTRY_RETRIES: {}", retries);
                }
            }
        }

        // Kafka overrides populate the section when the file has none
        let brokers = std::env::var("AVROWIRE_KAFKA_BROKERS").ok();
        let group_id = std::env::var("AVROWIRE_KAFKA_GROUP_ID").ok();
        let topics = std::env::var("AVROWIRE_KAFKA_TOPICS").ok();

        if brokers.is_some() || group_id.is_some() || topics.is_some() {
            let kafka = self.kafka.get_or_insert_with(KafkaConfig::default);
            if let Some(brokers) = brokers {
                tracing::debug!(brokers = %brokers, "Env override: AVROWIRE_KAFKA_BROKERS");
                kafka.brokers = brokers;
            }
            if let Some(group_id) = group_id {
                tracing::debug!(group_id = %group_id, "Env override: AVROWIRE_KAFKA_GROUP_ID");
                kafka.group_id = group_id;
            }
            if let Some(topics) = topics {
                let topics = split_list(&topics);
                tracing::debug!(?topics, "Env override: AVROWIRE_KAFKA_TOPICS");
                kafka.topics = topics;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("AVROWIRE_LOG_LEVEL") {
            tracing::debug!(level = %level, "Env override: AVROWIRE_LOG_LEVEL");
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if !cli.registry_urls.is_empty() {
            self.registry.urls = cli.registry_urls.clone();
        }
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.registry.urls.is_empty() {
            return Err(AvrowireError::Config(
                "registry.urls must contain at least one URL".to_string(),
            )
            .into());
        }

        for raw in &self.registry.urls {
            url::Url::parse(raw).map_err(|e| {
                AvrowireError::Config(format!("Invalid registry URL '{}': {}", raw, e))
            })?;
        }

        if self.registry.timeout_ms == 0 {
            return Err(AvrowireError::Config(
                "registry.timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        for schema in &self.schemas {
            if schema.subject.trim().is_empty() {
                return Err(
                    AvrowireError::Config("schema subject cannot be empty".to_string()).into(),
                );
            }
            if schema.version == SchemaVersion::Number(0) {
                return Err(AvrowireError::Config(format!(
                    "schema version for '{}' must be 'latest' or at least 1",
                    schema.subject
                ))
                .into());
            }
        }

        if let Some(kafka) = &self.kafka {
            kafka
                .validate()
                .map_err(|e| AvrowireError::Config(e.to_string()))?;
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(AvrowireError::Config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: [&str; 6] = [
        "AVROWIRE_REGISTRY_URLS",
        "AVROWIRE_REGISTRY_RETRIES",
        "AVROWIRE_KAFKA_BROKERS",
        "AVROWIRE_KAFKA_GROUP_ID",
        "AVROWIRE_KAFKA_TOPICS",
        "AVROWIRE_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn cli() -> Cli {
        Cli {
            config: None,
            verbose: false,
            registry_urls: Vec::new(),
            command: Commands::Subjects,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.registry.urls, vec!["http://localhost:8081"]);
        assert_eq!(config.registry.retries, -1);
        assert_eq!(config.registry.timeout_ms, 2000);
        assert!(config.schemas.is_empty());
        assert!(config.kafka.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
registry:
  urls: ["http://sr1:8081", "http://sr2:8081"]
  retries: 3
schemas:
  - subject: orders-value
    version: latest
  - subject: payments-value
    version: 2
kafka:
  brokers: "kafka:9092"
  group_id: billing
  topics: [orders]
logging:
  level: debug
  json_format: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.registry.urls.len(), 2);
        assert_eq!(config.registry.retries, 3);
        assert_eq!(config.registry.timeout_ms, 2000);
        assert_eq!(config.schemas[1].version, SchemaVersion::Number(2));
        assert_eq!(config.kafka.as_ref().unwrap().group_id, "billing");
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_urls() {
        let mut config = Config::default();
        config.registry.urls.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = Config::default();
        config.registry.urls = vec!["not a url".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid registry URL"));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = Config::default();
        config.registry.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_version_zero() {
        let mut config = Config::default();
        config
            .schemas
            .push(SchemaRef::new("orders", SchemaVersion::Number(0)));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_subject() {
        let mut config = Config::default();
        config.schemas.push(SchemaRef::new(" ", SchemaVersion::Latest));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let config = Config::load("nonexistent.yaml", &cli()).unwrap();
        assert_eq!(config.registry.urls, vec!["http://localhost:8081"]);
    }

    #[test]
    #[serial]
    fn test_load_from_file_with_cli_overrides() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "registry:\n  urls: [\"http://file:8081\"]\nlogging:\n  level: warn"
        )
        .unwrap();

        let mut cli = cli();
        cli.verbose = true;
        cli.registry_urls = vec!["http://cli:8081".to_string()];

        let config = Config::load(file.path().to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.registry.urls, vec!["http://cli:8081"]);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "registry: [unclosed").unwrap();

        let err = Config::load(file.path().to_str().unwrap(), &cli()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AvrowireError>(),
            Some(AvrowireError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_apply_env_vars() {
        clear_env();
        std::env::set_var("AVROWIRE_REGISTRY_URLS", "http://a:8081, http://b:8081");
        std::env::set_var("AVROWIRE_REGISTRY_RETRIES", "5");
        std::env::set_var("AVROWIRE_KAFKA_BROKERS", "k:9092");
        std::env::set_var("AVROWIRE_KAFKA_TOPICS", "orders,refunds");
        std::env::set_var("AVROWIRE_LOG_LEVEL", "trace");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.registry.urls, vec!["http://a:8081", "http://b:8081"]);
        assert_eq!(config.registry.retries, 5);
        let kafka = config.kafka.unwrap();
        assert_eq!(kafka.brokers, "k:9092");
        assert_eq!(kafka.group_id, "avrowire");
        assert_eq!(kafka.topics, vec!["orders", "refunds"]);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_invalid_retries() {
        clear_env();
        std::env::set_var("AVROWIRE_REGISTRY_RETRIES", "many");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.registry.retries, -1);
        assert!(config.kafka.is_none());
    }
}
