//! Command-line interface definition for avrowire
//!
//! This module defines the CLI structure using clap's derive API,
//! providing registry administration, envelope encode/decode, and
//! Kafka consume/produce commands.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::registry::SchemaVersion;

/// avrowire - Avro messages framed with schema registry ids
///
/// Inspect and manage a Confluent-compatible schema registry, encode and
/// decode wire envelopes, and move Avro messages through Kafka.
#[derive(Parser, Debug, Clone)]
#[command(name = "avrowire")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Schema registry URL (repeatable, replaces configured URLs)
    #[arg(long = "registry-url", value_name = "URL")]
    pub registry_urls: Vec<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for avrowire
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List all subjects
    Subjects,

    /// List the versions registered under a subject
    Versions {
        /// Subject name
        subject: String,
    },

    /// Print the schema registered under a global id
    Schema {
        /// Schema id
        id: u32,
    },

    /// Show one version of a subject
    Get {
        /// Subject name
        subject: String,

        /// Version number or "latest"
        #[arg(long, default_value = "latest")]
        version: SchemaVersion,
    },

    /// Register a schema under a subject
    Register {
        /// Subject name
        subject: String,

        /// File containing the Avro schema
        #[arg(short, long)]
        schema_file: PathBuf,
    },

    /// Check whether a schema is already registered under a subject
    Check {
        /// Subject name
        subject: String,

        /// File containing the Avro schema
        #[arg(short, long)]
        schema_file: PathBuf,
    },

    /// Delete a subject and all its versions
    DeleteSubject {
        /// Subject name
        subject: String,
    },

    /// Delete one version of a subject
    DeleteVersion {
        /// Subject name
        subject: String,

        /// Version number
        version: u32,
    },

    /// Encode a JSON value into a wire envelope (hex by default)
    Encode {
        /// Subject whose schema is used (must be listed under `schemas`)
        subject: String,

        /// JSON value to encode
        #[arg(short, long)]
        json: String,

        /// Print the envelope as base64 instead of hex
        #[arg(long)]
        base64: bool,
    },

    /// Decode a wire envelope into JSON
    #[command(group(ArgGroup::new("envelope").required(true).args(["hex", "base64"])))]
    Decode {
        /// Envelope bytes as hex
        #[arg(long)]
        hex: Option<String>,

        /// Envelope bytes as base64
        #[arg(long)]
        base64: Option<String>,
    },

    /// Consume Avro messages from the configured topics and print them
    Consume {
        /// Treat message values as plain UTF-8 instead of wire envelopes
        #[arg(long)]
        raw: bool,
    },

    /// Produce one Avro message
    Produce {
        /// Destination topic
        topic: String,

        /// Subject whose schema is used (must be listed under `schemas`)
        subject: String,

        /// Message key
        #[arg(short, long)]
        key: Option<String>,

        /// JSON value to encode
        #[arg(short, long)]
        json: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
