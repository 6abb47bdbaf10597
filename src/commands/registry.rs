//! Schema registry administration commands

use prettytable::{row, Table};
use std::path::Path;

use super::build_registry;
use crate::codec::AvroCodec;
use crate::config::Config;
use crate::error::{AvrowireError, Result};
use crate::registry::{SchemaDetail, SchemaRegistry, SchemaVersion};

/// List all subjects
pub async fn list_subjects(config: &Config) -> Result<()> {
    let registry = build_registry(config)?;
    let subjects = registry.get_subjects().await?;

    if subjects.is_empty() {
        println!("No subjects registered");
        return Ok(());
    }
    for subject in subjects {
        println!("{}", subject);
    }
    Ok(())
}

/// List the versions registered under a subject
pub async fn list_versions(config: &Config, subject: &str) -> Result<()> {
    let registry = build_registry(config)?;
    let versions = registry.get_versions(subject).await?;

    let rendered: Vec<String> = versions.iter().map(u32::to_string).collect();
    println!("{}", rendered.join(" "));
    Ok(())
}

/// Print the schema registered under a global id
pub async fn show_schema(config: &Config, id: u32) -> Result<()> {
    let registry = build_registry(config)?;
    let codec = registry.get_schema(id).await?;
    println!("{}", codec.schema_text());
    Ok(())
}

/// Show one version of a subject
///
/// # Arguments
///
/// * `config` - Configuration containing registry settings
/// * `subject` - Subject name
/// * `version` - Version number or latest
///
/// # Examples
///
/// ```no_run
/// use avrowire::commands::registry::show_version;
/// use avrowire::config::Config;
/// use avrowire::registry::SchemaVersion;
///
/// # async fn example() -> anyhow::Result<()> {
/// show_version(&Config::default(), "orders-value", SchemaVersion::Latest).await?;
/// # Ok(())
/// # }
/// ```
pub async fn show_version(config: &Config, subject: &str, version: SchemaVersion) -> Result<()> {
    let registry = build_registry(config)?;
    let detail = match version {
        SchemaVersion::Latest => registry.get_latest_schema(subject).await?,
        SchemaVersion::Number(n) => registry.get_schema_by_version(subject, n).await?,
    };

    output_detail_table(&detail);
    println!("{}", detail.schema);
    Ok(())
}

/// Register the schema in `schema_file` under a subject
pub async fn register(config: &Config, subject: &str, schema_file: &Path) -> Result<()> {
    let codec = load_schema(schema_file)?;
    let registry = build_registry(config)?;

    let id = registry.create_subject(subject, &codec).await?;
    println!("Registered {} with schema id {}", subject, id);
    Ok(())
}

/// Report whether the schema in `schema_file` is registered under a subject
pub async fn check(config: &Config, subject: &str, schema_file: &Path) -> Result<()> {
    let codec = load_schema(schema_file)?;
    let registry = build_registry(config)?;

    match registry.is_schema_registered(subject, &codec).await {
        Ok(id) => {
            println!("Schema is registered under {} with id {}", subject, id);
            Ok(())
        }
        Err(e) if e.registry_error().is_some() => {
            tracing::debug!(error = %e, "Registration check reported by registry");
            println!("Schema is not registered under {}: {}", subject, e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a subject and all its versions
pub async fn delete_subject(config: &Config, subject: &str) -> Result<()> {
    let registry = build_registry(config)?;
    registry.delete_subject(subject).await?;
    println!("Deleted subject {}", subject);
    Ok(())
}

/// Delete one version of a subject
pub async fn delete_version(config: &Config, subject: &str, version: u32) -> Result<()> {
    let registry = build_registry(config)?;
    registry.delete_version(subject, version).await?;
    println!("Deleted version {} of {}", version, subject);
    Ok(())
}

fn load_schema(path: &Path) -> Result<AvroCodec> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AvrowireError::Input(format!("Failed to read schema file {}: {}", path.display(), e))
    })?;
    AvroCodec::compile(&text).map_err(|e| AvrowireError::Input(e.to_string()).into())
}

fn output_detail_table(detail: &SchemaDetail) {
    let mut table = Table::new();
    table.add_row(row!["Subject", "Version", "Schema ID"]);
    table.add_row(row![detail.subject, detail.version, detail.id]);
    table.printstd();
}
