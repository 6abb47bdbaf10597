//! Direct schema registry client.
//!
//! Each operation is one transport call followed by a JSON decode and, for
//! schema reads, a compile through the Avro codec engine. Nothing is cached
//! here; wrap the client in [`super::CachedRegistryClient`] for that.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::error::ClientError;
use super::transport::{RegistryTransport, DEFAULT_TIMEOUT};
use super::{SchemaDetail, SchemaRegistry, LATEST_VERSION};
use crate::codec::AvroCodec;
use crate::config::RegistryConfig;

/// Request and response body carrying raw schema text.
#[derive(Debug, Serialize, Deserialize)]
struct SchemaPayload {
    schema: String,
}

/// Response from the subject version endpoint.
#[derive(Debug, Deserialize)]
struct SchemaVersionResponse {
    subject: String,
    version: u32,
    schema: String,
    id: u32,
}

/// Response carrying a schema id.
#[derive(Debug, Deserialize)]
struct IdResponse {
    id: u32,
}

/// Schema registry client issuing HTTP calls through [`RegistryTransport`].
#[derive(Debug, Clone)]
pub struct RegistryClient {
    transport: RegistryTransport,
}

impl RegistryClient {
    /// Creates a client from registry configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if no URL is configured.
    pub fn new(config: &RegistryConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let transport = RegistryTransport::new(&config.urls, config.retries, timeout)?;
        Ok(Self::with_transport(transport))
    }

    /// Creates a client for the given URLs with the default 2 second timeout.
    ///
    /// A negative `retries` means one retry per URL.
    pub fn with_urls(urls: &[String], retries: i32) -> Result<Self, ClientError> {
        let transport = RegistryTransport::new(urls, retries, DEFAULT_TIMEOUT)?;
        Ok(Self::with_transport(transport))
    }

    /// Creates a client on top of an existing transport.
    pub fn with_transport(transport: RegistryTransport) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &RegistryTransport {
        &self.transport
    }

    async fn resolve_version(
        &self,
        subject: &str,
        version: &str,
    ) -> Result<SchemaDetail, ClientError> {
        let path = format!("/subjects/{}/versions/{}", encode(subject), version);
        let body = self.transport.call(Method::GET, &path, None).await?;
        let response: SchemaVersionResponse = serde_json::from_slice(&body)?;
        let codec = AvroCodec::compile(&response.schema)?;

        debug!(
            subject = %response.subject,
            version = response.version,
            id = response.id,
            "Resolved schema version"
        );

        Ok(SchemaDetail {
            subject: response.subject,
            version: response.version,
            schema: response.schema,
            id: response.id,
            codec: Arc::new(codec),
        })
    }

    async fn post_schema(&self, path: &str, codec: &AvroCodec) -> Result<u32, ClientError> {
        let payload = serde_json::to_vec(&SchemaPayload {
            schema: codec.schema_text().to_string(),
        })?;
        let body = self.transport.call(Method::POST, path, Some(payload)).await?;
        let response: IdResponse = serde_json::from_slice(&body)?;
        Ok(response.id)
    }
}

#[async_trait]
impl SchemaRegistry for RegistryClient {
    async fn get_schema(&self, id: u32) -> Result<Arc<AvroCodec>, ClientError> {
        let body = self
            .transport
            .call(Method::GET, &format!("/schemas/ids/{}", id), None)
            .await?;
        let response: SchemaPayload = serde_json::from_slice(&body)?;
        let codec = AvroCodec::compile(&response.schema)?;
        debug!(id = id, "Fetched schema by id");
        Ok(Arc::new(codec))
    }

    async fn get_subjects(&self) -> Result<Vec<String>, ClientError> {
        let body = self.transport.call(Method::GET, "/subjects", None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_versions(&self, subject: &str) -> Result<Vec<u32>, ClientError> {
        let path = format!("/subjects/{}/versions", encode(subject));
        let body = self.transport.call(Method::GET, &path, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_schema_by_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<SchemaDetail, ClientError> {
        self.resolve_version(subject, &version.to_string()).await
    }

    async fn get_latest_schema(&self, subject: &str) -> Result<SchemaDetail, ClientError> {
        self.resolve_version(subject, LATEST_VERSION).await
    }

    async fn create_subject(&self, subject: &str, codec: &AvroCodec) -> Result<u32, ClientError> {
        let id = self
            .post_schema(&format!("/subjects/{}/versions", encode(subject)), codec)
            .await?;
        info!(subject = %subject, id = id, "Registered schema");
        Ok(id)
    }

    async fn is_schema_registered(
        &self,
        subject: &str,
        codec: &AvroCodec,
    ) -> Result<u32, ClientError> {
        self.post_schema(&format!("/subjects/{}", encode(subject)), codec)
            .await
    }

    async fn delete_subject(&self, subject: &str) -> Result<(), ClientError> {
        let path = format!("/subjects/{}", encode(subject));
        self.transport.call(Method::DELETE, &path, None).await?;
        info!(subject = %subject, "Deleted subject");
        Ok(())
    }

    async fn delete_version(&self, subject: &str, version: u32) -> Result<(), ClientError> {
        let path = format!("/subjects/{}/versions/{}", encode(subject), version);
        self.transport.call(Method::DELETE, &path, None).await?;
        info!(subject = %subject, version = version, "Deleted schema version");
        Ok(())
    }
}

/// Percent-encodes a subject as a single path segment.
fn encode(subject: &str) -> String {
    urlencoding::encode(subject).into_owned()
}
