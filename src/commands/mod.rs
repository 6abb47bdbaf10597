//! Command handlers for the CLI
//!
//! Each handler receives the loaded [`Config`] and builds the components it
//! needs from it:
//!
//! - [`registry`]: schema registry administration
//! - [`codec`]: envelope encode/decode against the preloaded schema store
//! - [`stream`]: Kafka consume and produce

pub mod codec;
pub mod registry;
pub mod stream;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::registry::{
    CachedRegistryClient, RegistryClient, SchemaRef, SchemaStore, SchemaVersion,
};
use crate::wire::WireCodec;

/// Builds the cached registry client described by the configuration.
pub fn build_registry(config: &Config) -> Result<CachedRegistryClient<RegistryClient>> {
    Ok(CachedRegistryClient::from_config(&config.registry)?)
}

/// Builds a wire codec over the configured schemas.
///
/// `extra_subject` is resolved at its latest version when it is not
/// already listed, so one-off commands work without editing the config.
pub async fn build_wire_codec(config: &Config, extra_subject: Option<&str>) -> Result<WireCodec> {
    let registry = build_registry(config)?;

    let mut refs = config.schemas.clone();
    if let Some(subject) = extra_subject {
        if !refs.iter().any(|r| r.subject == subject) {
            refs.push(SchemaRef::new(subject, SchemaVersion::Latest));
        }
    }

    let store = SchemaStore::build(&registry, &refs).await?;
    Ok(WireCodec::new(Arc::new(store)))
}
