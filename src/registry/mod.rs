//! Schema registry integration.
//!
//! This module talks to a Confluent-compatible schema registry and keeps
//! the results close at hand for producers and consumers.
//!
//! # Overview
//!
//! - [`transport`]: failover-aware HTTP calls across a registry cluster
//! - [`client`]: schema read/write operations on top of the transport
//! - [`cached`]: read-through memoization decorator over any registry
//! - [`store`]: immutable subject/id index preloaded at startup
//! - [`error`]: registry error taxonomy
//!
//! Both [`client::RegistryClient`] and [`cached::CachedRegistryClient`]
//! implement the [`SchemaRegistry`] capability trait, so the cache can be
//! dropped in wherever a plain client is accepted.
//!
//! # Example
//!
//! ```rust,no_run
//! use avrowire::registry::{
//!     CachedRegistryClient, RegistryClient, SchemaRef, SchemaStore, SchemaVersion,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::with_urls(&["http://localhost:8081".to_string()], -1)?;
//!     let registry = CachedRegistryClient::new(client);
//!
//!     let store = SchemaStore::build(
//!         &registry,
//!         &[SchemaRef::new("orders-value", SchemaVersion::Latest)],
//!     )
//!     .await?;
//!
//!     let detail = store.get_schema_by_subject("orders-value")?;
//!     println!("orders-value -> id {}", detail.id);
//!     Ok(())
//! }
//! ```

pub mod cached;
pub mod client;
pub mod error;
pub mod store;
pub mod transport;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::AvroCodec;

pub use cached::CachedRegistryClient;
pub use client::RegistryClient;
pub use error::{ClientError, RegistryError};
pub use store::SchemaStore;
pub use transport::RegistryTransport;

/// Version token the registry understands as "most recent version".
pub const LATEST_VERSION: &str = "latest";

/// A requested schema version: an explicit number or the latest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Whatever version is newest at resolution time.
    #[default]
    Latest,
    /// A specific registered version (1-based).
    Number(u32),
}

impl SchemaVersion {
    /// Returns true for the latest-version sentinel.
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST_VERSION),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(LATEST_VERSION) {
            return Ok(Self::Latest);
        }
        s.parse::<u32>()
            .map(Self::Number)
            .map_err(|_| format!("invalid schema version: {} (expected 'latest' or a number)", s))
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Latest => serializer.serialize_str(LATEST_VERSION),
            Self::Number(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::Number(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A (subject, version) pair to resolve against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    /// Registry subject name.
    pub subject: String,
    /// Requested version; defaults to the latest one.
    #[serde(default)]
    pub version: SchemaVersion,
}

impl SchemaRef {
    /// Creates a schema reference.
    pub fn new(subject: &str, version: SchemaVersion) -> Self {
        Self {
            subject: subject.to_string(),
            version,
        }
    }
}

/// A resolved schema: subject and version bound to a registry id and codec.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDetail {
    /// Subject the schema is registered under.
    pub subject: String,
    /// Version within the subject.
    pub version: u32,
    /// Raw schema text as returned by the registry.
    pub schema: String,
    /// Registry-assigned global schema id.
    pub id: u32,
    /// Compiled codec for the schema.
    pub codec: Arc<AvroCodec>,
}

/// Schema registry operations.
///
/// Implemented by the direct HTTP client and by the caching decorator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Fetches and compiles the schema registered under a global id.
    async fn get_schema(&self, id: u32) -> Result<Arc<AvroCodec>, ClientError>;

    /// Lists all subjects.
    async fn get_subjects(&self) -> Result<Vec<String>, ClientError>;

    /// Lists the versions registered under a subject.
    async fn get_versions(&self, subject: &str) -> Result<Vec<u32>, ClientError>;

    /// Resolves a specific version of a subject.
    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<SchemaDetail, ClientError>;

    /// Resolves the latest version of a subject.
    async fn get_latest_schema(&self, subject: &str) -> Result<SchemaDetail, ClientError>;

    /// Registers a schema under a subject and returns its global id.
    async fn create_subject(&self, subject: &str, codec: &AvroCodec) -> Result<u32, ClientError>;

    /// Returns the id of an identical schema already registered under a subject.
    async fn is_schema_registered(
        &self,
        subject: &str,
        codec: &AvroCodec,
    ) -> Result<u32, ClientError>;

    /// Deletes a subject and all its versions.
    async fn delete_subject(&self, subject: &str) -> Result<(), ClientError>;

    /// Deletes one version of a subject.
    async fn delete_version(&self, subject: &str, version: u32) -> Result<(), ClientError>;
}

#[async_trait]
impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Arc<R> {
    async fn get_schema(&self, id: u32) -> Result<Arc<AvroCodec>, ClientError> {
        (**self).get_schema(id).await
    }

    async fn get_subjects(&self) -> Result<Vec<String>, ClientError> {
        (**self).get_subjects().await
    }

    async fn get_versions(&self, subject: &str) -> Result<Vec<u32>, ClientError> {
        (**self).get_versions(subject).await
    }

    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<SchemaDetail, ClientError> {
        (**self).get_schema_by_version(subject, version).await
    }

    async fn get_latest_schema(&self, subject: &str) -> Result<SchemaDetail, ClientError> {
        (**self).get_latest_schema(subject).await
    }

    async fn create_subject(&self, subject: &str, codec: &AvroCodec) -> Result<u32, ClientError> {
        (**self).create_subject(subject, codec).await
    }

    async fn is_schema_registered(
        &self,
        subject: &str,
        codec: &AvroCodec,
    ) -> Result<u32, ClientError> {
        (**self).is_schema_registered(subject, codec).await
    }

    async fn delete_subject(&self, subject: &str) -> Result<(), ClientError> {
        (**self).delete_subject(subject).await
    }

    async fn delete_version(&self, subject: &str, version: u32) -> Result<(), ClientError> {
        (**self).delete_version(subject, version).await
    }
}
