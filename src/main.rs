//! avrowire - Avro messages framed with schema registry ids
//!
#![doc = "Main entry point for the avrowire CLI."]

use anyhow::Result;

use avrowire::cli::{Cli, Commands};
use avrowire::commands;
use avrowire::config::Config;
use avrowire::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::debug!(
        registry_urls = ?config.registry.urls,
        schemas = config.schemas.len(),
        "Configuration loaded"
    );

    // Execute command
    match cli.command {
        Commands::Subjects => commands::registry::list_subjects(&config).await,
        Commands::Versions { subject } => commands::registry::list_versions(&config, &subject).await,
        Commands::Schema { id } => commands::registry::show_schema(&config, id).await,
        Commands::Get { subject, version } => {
            commands::registry::show_version(&config, &subject, version).await
        }
        Commands::Register {
            subject,
            schema_file,
        } => commands::registry::register(&config, &subject, &schema_file).await,
        Commands::Check {
            subject,
            schema_file,
        } => commands::registry::check(&config, &subject, &schema_file).await,
        Commands::DeleteSubject { subject } => {
            tracing::warn!(subject = %subject, "Deleting subject");
            commands::registry::delete_subject(&config, &subject).await
        }
        Commands::DeleteVersion { subject, version } => {
            tracing::warn!(subject = %subject, version, "Deleting schema version");
            commands::registry::delete_version(&config, &subject, version).await
        }
        Commands::Encode {
            subject,
            json,
            base64,
        } => commands::codec::encode(&config, &subject, &json, base64).await,
        Commands::Decode { hex, base64 } => {
            commands::codec::decode(&config, hex.as_deref(), base64.as_deref()).await
        }
        Commands::Consume { raw } => {
            tracing::info!("Starting consumer");
            if raw {
                tracing::debug!("Decoding values as plain text");
            }
            commands::stream::consume(&config, raw).await
        }
        Commands::Produce {
            topic,
            subject,
            key,
            json,
        } => commands::stream::produce(&config, &topic, &subject, key.as_deref(), &json).await,
    }
}
