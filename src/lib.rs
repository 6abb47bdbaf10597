//! avrowire - Avro messages framed with schema registry ids
//!
//! This library provides a Confluent-compatible schema registry client, an
//! in-memory schema store, the wire envelope codec, and Kafka consumer and
//! producer plumbing built on top of them.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `registry`: Registry transport, client, caching decorator and schema store
//! - `codec`: Avro schema compilation and binary/JSON conversion
//! - `wire`: `[0x00][u32 id][avro datum]` envelope encode and decode
//! - `kafka`: Consumer group, decoders, handlers, producer and signal control
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging setup
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use avrowire::registry::{CachedRegistryClient, SchemaRef, SchemaStore, SchemaVersion};
//! use avrowire::{Config, WireCodec};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let registry = CachedRegistryClient::from_config(&config.registry)?;
//!
//!     let refs = [SchemaRef::new("orders", SchemaVersion::Latest)];
//!     let store = SchemaStore::build(&registry, &refs).await?;
//!
//!     let wire = WireCodec::new(Arc::new(store));
//!     let envelope = wire.encode("orders", &serde_json::json!({"amount": 10}))?;
//!     println!("{}", wire.decode_to_string(&envelope)?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod kafka;
pub mod logging;
pub mod registry;
pub mod wire;

// Re-export commonly used types
pub use codec::AvroCodec;
pub use config::Config;
pub use error::{AvrowireError, Result};
pub use registry::{CachedRegistryClient, RegistryClient, SchemaRegistry, SchemaStore};
pub use wire::{WireCodec, WireError};
