//! Read-through memoization over any [`SchemaRegistry`].
//!
//! Two lookups are memoized: compiled codecs by schema id, and registry ids
//! by the canonical form of a schema being registered. Only successful
//! results are stored. Everything else passes straight to the wrapped
//! registry because its answer can change over time.
//!
//! Both maps sit behind one `RwLock`. Lookups take the shared lock; a miss
//! releases it, calls the wrapped registry without holding any lock, then
//! takes the exclusive lock to install the result. Concurrent misses for the
//! same key may each reach the registry and the last insert wins.

use async_trait::async_trait;
use metrics::increment_counter;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use super::client::RegistryClient;
use super::error::ClientError;
use super::{SchemaDetail, SchemaRegistry};
use crate::codec::AvroCodec;
use crate::config::RegistryConfig;

const CACHE_HITS: &str = "avrowire_schema_cache_hits_total";
const CACHE_MISSES: &str = "avrowire_schema_cache_misses_total";

#[derive(Debug, Default)]
struct CacheState {
    codecs: HashMap<u32, Arc<AvroCodec>>,
    ids: HashMap<String, u32>,
}

/// Caching decorator implementing [`SchemaRegistry`] on top of another registry.
///
/// # Examples
///
/// ```no_run
/// use avrowire::registry::{CachedRegistryClient, RegistryClient, SchemaRegistry};
///
/// # async fn run() -> Result<(), avrowire::registry::ClientError> {
/// let client = RegistryClient::with_urls(&["http://localhost:8081".to_string()], -1)?;
/// let cached = CachedRegistryClient::new(client);
///
/// let first = cached.get_schema(7).await?;
/// let second = cached.get_schema(7).await?; // served from memory
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CachedRegistryClient<R> {
    inner: R,
    state: RwLock<CacheState>,
}

impl<R: SchemaRegistry> CachedRegistryClient<R> {
    /// Wraps a registry with an empty cache.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Returns the wrapped registry.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of codecs memoized by schema id.
    pub fn cached_codecs(&self) -> usize {
        self.state.read().map(|s| s.codecs.len()).unwrap_or(0)
    }

    /// Number of registration ids memoized by canonical schema.
    pub fn cached_ids(&self) -> usize {
        self.state.read().map(|s| s.ids.len()).unwrap_or(0)
    }

    fn lookup_codec(&self, id: u32) -> Option<Arc<AvroCodec>> {
        let state = self.state.read().ok()?;
        state.codecs.get(&id).cloned()
    }

    fn lookup_id(&self, canonical: &str) -> Option<u32> {
        let state = self.state.read().ok()?;
        state.ids.get(canonical).copied()
    }
}

impl CachedRegistryClient<RegistryClient> {
    /// Builds a direct client from configuration and wraps it.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ClientError> {
        Ok(Self::new(RegistryClient::new(config)?))
    }
}

#[async_trait]
impl<R: SchemaRegistry> SchemaRegistry for CachedRegistryClient<R> {
    async fn get_schema(&self, id: u32) -> Result<Arc<AvroCodec>, ClientError> {
        if let Some(codec) = self.lookup_codec(id) {
            increment_counter!(CACHE_HITS, "cache" => "codec");
            debug!(id = id, "Schema cache hit");
            return Ok(codec);
        }

        increment_counter!(CACHE_MISSES, "cache" => "codec");
        debug!(id = id, "Schema cache miss");

        let codec = self.inner.get_schema(id).await?;

        if let Ok(mut state) = self.state.write() {
            state.codecs.insert(id, Arc::clone(&codec));
        } else {
            warn!(id = id, "Failed to acquire write lock on schema cache");
        }

        Ok(codec)
    }

    async fn get_subjects(&self) -> Result<Vec<String>, ClientError> {
        self.inner.get_subjects().await
    }

    async fn get_versions(&self, subject: &str) -> Result<Vec<u32>, ClientError> {
        self.inner.get_versions(subject).await
    }

    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<SchemaDetail, ClientError> {
        self.inner.get_schema_by_version(subject, version).await
    }

    async fn get_latest_schema(&self, subject: &str) -> Result<SchemaDetail, ClientError> {
        self.inner.get_latest_schema(subject).await
    }

    async fn create_subject(&self, subject: &str, codec: &AvroCodec) -> Result<u32, ClientError> {
        let canonical = codec.canonical_form();

        if let Some(id) = self.lookup_id(canonical) {
            increment_counter!(CACHE_HITS, "cache" => "id");
            debug!(subject = %subject, id = id, "Registration cache hit");
            return Ok(id);
        }

        increment_counter!(CACHE_MISSES, "cache" => "id");

        let id = self.inner.create_subject(subject, codec).await?;

        if let Ok(mut state) = self.state.write() {
            state.ids.insert(canonical.to_string(), id);
        } else {
            warn!(subject = %subject, "Failed to acquire write lock on schema cache");
        }

        Ok(id)
    }

    async fn is_schema_registered(
        &self,
        subject: &str,
        codec: &AvroCodec,
    ) -> Result<u32, ClientError> {
        self.inner.is_schema_registered(subject, codec).await
    }

    async fn delete_subject(&self, subject: &str) -> Result<(), ClientError> {
        self.inner.delete_subject(subject).await
    }

    async fn delete_version(&self, subject: &str, version: u32) -> Result<(), ClientError> {
        self.inner.delete_version(subject, version).await
    }
}
