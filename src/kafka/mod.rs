//! Kafka consumer group and producer around the wire envelope.
//!
//! The broker protocol itself (group membership, rebalancing, delivery
//! retries) is left to `rdkafka`. This module supplies the pieces around it:
//!
//! - [`config`]: connection settings rendered for librdkafka
//! - [`decoder`]: turning raw records into keys and values
//! - [`handler`]: the application callback and its error policy
//! - [`consumer`]: the consume loop with pause/resume and shutdown
//! - [`producer`]: encoding and sending envelope-framed values
//! - [`signals`]: process signals mapped onto loop controls
//!
//! # Example
//!
//! ```rust,no_run
//! use avrowire::kafka::{
//!     ConsumerGroup, ControlCommand, DecodedMessage, KafkaConfig, MessageHandler, StringDecoder,
//! };
//! use tokio::sync::mpsc;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Print;
//!
//! #[async_trait::async_trait]
//! impl MessageHandler for Print {
//!     async fn handle(
//!         &self,
//!         message: DecodedMessage,
//!     ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!         println!("{}", message.value);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let group = ConsumerGroup::new(KafkaConfig::new("localhost:9092", "demo", &["orders"]))?;
//!     let (_control_tx, control_rx) = mpsc::channel::<ControlCommand>(8);
//!     group
//!         .run(&Print, &StringDecoder, CancellationToken::new(), control_rx)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod consumer;
pub mod decoder;
pub mod handler;
pub mod producer;
pub mod signals;

use thiserror::Error;

use crate::wire::WireError;

pub use config::KafkaConfig;
pub use consumer::ConsumerGroup;
pub use decoder::{AvroDecoder, DecodedMessage, MessageDecoder, RawMessage, StringDecoder};
pub use handler::MessageHandler;
pub use producer::Producer;

/// Errors from the consumer group and producer.
#[derive(Error, Debug)]
pub enum KafkaClientError {
    /// Error from the Kafka client library.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Envelope encode/decode failure.
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// Record could not be decoded into text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid connection settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Flow control requests for a running consumer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Stop fetching from all assigned partitions.
    Pause,
    /// Resume fetching from all assigned partitions.
    Resume,
    /// Pause when running, resume when paused.
    Toggle,
}
