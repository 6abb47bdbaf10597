//! Kafka connection configuration.
//!
//! Deserialized from the `kafka` section of the YAML configuration and
//! rendered into librdkafka key/value settings for consumers and producers.
//!
//! # Example
//!
//! ```rust
//! use avrowire::kafka::config::{InitialOffset, KafkaConfig};
//!
//! let config = KafkaConfig::new("localhost:9092", "billing", &["orders"])
//!     .with_offset(InitialOffset::Oldest);
//!
//! let settings = config.to_client_settings();
//! assert!(settings.contains(&("auto.offset.reset".to_string(), "earliest".to_string())));
//! ```

use serde::{Deserialize, Serialize};

use super::KafkaClientError;

/// Security protocol for Kafka connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityProtocol {
    /// No encryption or authentication.
    #[default]
    Plaintext,
    /// TLS encryption without SASL.
    Ssl,
    /// SASL authentication without TLS.
    SaslPlaintext,
    /// SASL authentication with TLS encryption.
    SaslSsl,
}

impl SecurityProtocol {
    /// Returns the librdkafka string for this protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Ssl => "SSL",
            Self::SaslPlaintext => "SASL_PLAINTEXT",
            Self::SaslSsl => "SASL_SSL",
        }
    }

    fn uses_sasl(&self) -> bool {
        matches!(self, Self::SaslPlaintext | Self::SaslSsl)
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaslMechanism {
    /// PLAIN mechanism (username/password in clear text).
    #[serde(rename = "PLAIN")]
    Plain,
    /// SCRAM-SHA-256 mechanism.
    #[default]
    #[serde(rename = "SCRAM-SHA-256")]
    ScramSha256,
    /// SCRAM-SHA-512 mechanism.
    #[serde(rename = "SCRAM-SHA-512")]
    ScramSha512,
}

impl SaslMechanism {
    /// Returns the librdkafka string for this mechanism.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::ScramSha512 => "SCRAM-SHA-512",
        }
    }
}

/// Where a consumer group without committed offsets starts reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialOffset {
    /// Only messages produced after the group joins.
    #[default]
    Newest,
    /// From the beginning of each partition.
    Oldest,
}

impl InitialOffset {
    /// Returns the `auto.offset.reset` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "latest",
            Self::Oldest => "earliest",
        }
    }
}

/// Partition assignment strategy for the consumer group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStrategy {
    /// Contiguous partition ranges per member.
    #[default]
    Range,
    /// Partitions dealt out one at a time.
    Roundrobin,
    /// Incremental rebalancing that keeps existing assignments.
    Sticky,
}

impl BalanceStrategy {
    /// Returns the `partition.assignment.strategy` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Roundrobin => "roundrobin",
            Self::Sticky => "cooperative-sticky",
        }
    }
}

/// Security settings for the Kafka connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaSecurityConfig {
    /// Security protocol
    #[serde(default)]
    pub protocol: SecurityProtocol,
    /// SASL mechanism, required for SASL protocols
    #[serde(default)]
    pub sasl_mechanism: Option<SaslMechanism>,
    /// SASL username
    #[serde(default)]
    pub sasl_username: Option<String>,
    /// SASL password
    #[serde(default)]
    pub sasl_password: Option<String>,
    /// Path to CA certificate for TLS
    #[serde(default)]
    pub ssl_ca_location: Option<String>,
}

/// Kafka consumer group and producer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap brokers
    #[serde(default = "default_brokers")]
    pub brokers: String,

    /// Consumer group id
    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Topics the consumer group subscribes to
    #[serde(default)]
    pub topics: Vec<String>,

    /// Starting position when the group has no committed offset
    #[serde(default)]
    pub offset: InitialOffset,

    /// Partition assignment strategy
    #[serde(default)]
    pub balance_strategy: BalanceStrategy,

    /// Consumer session timeout in milliseconds
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// Optional security settings
    #[serde(default)]
    pub security: Option<KafkaSecurityConfig>,
}

fn default_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_group_id() -> String {
    "avrowire".to_string()
}

fn default_session_timeout_ms() -> u64 {
    30_000
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            group_id: default_group_id(),
            topics: Vec::new(),
            offset: InitialOffset::default(),
            balance_strategy: BalanceStrategy::default(),
            session_timeout_ms: default_session_timeout_ms(),
            security: None,
        }
    }
}

impl KafkaConfig {
    /// Creates a configuration with defaults for everything but the essentials.
    pub fn new(brokers: &str, group_id: &str, topics: &[&str]) -> Self {
        Self {
            brokers: brokers.to_string(),
            group_id: group_id.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Sets the initial offset policy.
    pub fn with_offset(mut self, offset: InitialOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Configures SASL authentication over TLS.
    pub fn with_sasl(mut self, mechanism: SaslMechanism, username: &str, password: &str) -> Self {
        let security = self.security.get_or_insert_with(KafkaSecurityConfig::default);
        security.protocol = SecurityProtocol::SaslSsl;
        security.sasl_mechanism = Some(mechanism);
        security.sasl_username = Some(username.to_string());
        security.sasl_password = Some(password.to_string());
        self
    }

    /// Checks the settings needed to connect.
    ///
    /// # Errors
    ///
    /// Returns `KafkaClientError::Config` for empty brokers or group id, or a
    /// SASL protocol without complete credentials.
    pub fn validate(&self) -> Result<(), KafkaClientError> {
        if self.brokers.trim().is_empty() {
            return Err(KafkaClientError::Config(
                "kafka.brokers cannot be empty".to_string(),
            ));
        }
        if self.group_id.trim().is_empty() {
            return Err(KafkaClientError::Config(
                "kafka.group_id cannot be empty".to_string(),
            ));
        }
        if let Some(security) = &self.security {
            if security.protocol.uses_sasl()
                && (security.sasl_username.is_none() || security.sasl_password.is_none())
            {
                return Err(KafkaClientError::Config(format!(
                    "SASL username and password are required for {}",
                    security.protocol.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Renders consumer settings.
    ///
    /// Offsets are stored explicitly after each handled message and
    /// committed in the background.
    pub fn to_client_settings(&self) -> Vec<(String, String)> {
        let mut settings = vec![
            ("bootstrap.servers".to_string(), self.brokers.clone()),
            ("group.id".to_string(), self.group_id.clone()),
            (
                "auto.offset.reset".to_string(),
                self.offset.as_str().to_string(),
            ),
            (
                "partition.assignment.strategy".to_string(),
                self.balance_strategy.as_str().to_string(),
            ),
            ("enable.auto.commit".to_string(), "true".to_string()),
            ("enable.auto.offset.store".to_string(), "false".to_string()),
            (
                "session.timeout.ms".to_string(),
                self.session_timeout_ms.to_string(),
            ),
            (
                "client.id".to_string(),
                format!("avrowire-consumer-{}", self.group_id),
            ),
        ];
        self.push_security(&mut settings);
        settings
    }

    /// Renders producer settings.
    pub fn to_producer_settings(&self) -> Vec<(String, String)> {
        let mut settings = vec![
            ("bootstrap.servers".to_string(), self.brokers.clone()),
            ("acks".to_string(), "all".to_string()),
            ("message.send.max.retries".to_string(), "10".to_string()),
            ("retry.backoff.ms".to_string(), "1000".to_string()),
            ("message.max.bytes".to_string(), "10000000".to_string()),
            ("compression.type".to_string(), "none".to_string()),
            ("partitioner".to_string(), "murmur2_random".to_string()),
            ("client.id".to_string(), "avrowire-producer".to_string()),
        ];
        self.push_security(&mut settings);
        settings
    }

    fn push_security(&self, settings: &mut Vec<(String, String)>) {
        let Some(security) = &self.security else {
            return;
        };

        settings.push((
            "security.protocol".to_string(),
            security.protocol.as_str().to_string(),
        ));

        if security.protocol.uses_sasl() {
            let mechanism = security.sasl_mechanism.unwrap_or_default();
            settings.push(("sasl.mechanism".to_string(), mechanism.as_str().to_string()));
            if let Some(username) = &security.sasl_username {
                settings.push(("sasl.username".to_string(), username.clone()));
            }
            if let Some(password) = &security.sasl_password {
                settings.push(("sasl.password".to_string(), password.clone()));
            }
        }

        if let Some(ca) = &security.ssl_ca_location {
            settings.push(("ssl.ca.location".to_string(), ca.clone()));
        }
    }
}
