//! Preloaded subject and id index.
//!
//! A [`SchemaStore`] is resolved once from a fixed list of
//! [`SchemaRef`]s and never changes afterwards. Lookups do not reach the
//! registry; anything not declared up front is reported as not found.

use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

use super::error::ClientError;
use super::{SchemaDetail, SchemaRef, SchemaRegistry, SchemaVersion};

#[derive(Debug, Default)]
struct StoreIndex {
    subjects: HashMap<String, u32>,
    details: HashMap<u32, SchemaDetail>,
}

/// Immutable snapshot of resolved schemas, indexed by subject and by id.
#[derive(Debug)]
pub struct SchemaStore {
    index: RwLock<StoreIndex>,
}

impl SchemaStore {
    /// Resolves every reference against the registry and indexes the results.
    ///
    /// `latest` references go through `get_latest_schema`, numbered ones
    /// through `get_schema_by_version`. Resolutions run concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure. No store is built in that case,
    /// even if other references resolved.
    pub async fn build<R>(registry: &R, refs: &[SchemaRef]) -> Result<Self, ClientError>
    where
        R: SchemaRegistry + ?Sized,
    {
        let details = try_join_all(refs.iter().map(|r| resolve(registry, r))).await?;

        let mut index = StoreIndex::default();
        for (schema_ref, detail) in refs.iter().zip(details) {
            debug!(
                subject = %schema_ref.subject,
                requested = %schema_ref.version,
                version = detail.version,
                id = detail.id,
                "Resolved schema for store"
            );
            // keyed by the configured name; the registry echoes it back unchanged
            index.subjects.insert(schema_ref.subject.clone(), detail.id);
            index.details.insert(detail.id, detail);
        }

        info!(
            subjects = index.subjects.len(),
            schemas = index.details.len(),
            "Schema store built"
        );

        Ok(Self {
            index: RwLock::new(index),
        })
    }

    /// Returns the detail registered under a schema id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the id was not part of the build.
    pub fn get_schema_by_id(&self, id: u32) -> Result<SchemaDetail, ClientError> {
        let index = self.read()?;
        index
            .details
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("schema id {} was not added", id)))
    }

    /// Returns the detail resolved for a subject.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the subject was not part of the build.
    pub fn get_schema_by_subject(&self, subject: &str) -> Result<SchemaDetail, ClientError> {
        let index = self.read()?;
        index
            .subjects
            .get(subject)
            .and_then(|id| index.details.get(id))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("schema {} was not added", subject)))
    }

    /// Number of indexed subjects.
    pub fn len(&self) -> usize {
        self.read().map(|index| index.subjects.len()).unwrap_or(0)
    }

    /// True when the store was built from an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexed subject names, sorted.
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self
            .read()
            .map(|index| index.subjects.keys().cloned().collect())
            .unwrap_or_default();
        subjects.sort();
        subjects
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreIndex>, ClientError> {
        self.index
            .read()
            .map_err(|_| ClientError::Poisoned("schema store index".to_string()))
    }
}

async fn resolve<R>(registry: &R, schema_ref: &SchemaRef) -> Result<SchemaDetail, ClientError>
where
    R: SchemaRegistry + ?Sized,
{
    match schema_ref.version {
        SchemaVersion::Latest => registry.get_latest_schema(&schema_ref.subject).await,
        SchemaVersion::Number(version) => {
            registry
                .get_schema_by_version(&schema_ref.subject, version)
                .await
        }
    }
}
