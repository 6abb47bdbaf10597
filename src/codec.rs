//! Avro codec engine adapter.
//!
//! Wraps a parsed `apache_avro` schema so the rest of the crate can treat a
//! compiled schema as an opaque encoder/decoder. Values cross the boundary as
//! `serde_json::Value`: encoding resolves JSON into the schema's native Avro
//! form before writing the binary datum, decoding reads the datum back into
//! native form and renders it as JSON.
//!
//! # Example
//!
//! ```
//! use avrowire::codec::AvroCodec;
//!
//! let codec = AvroCodec::compile(
//!     r#"{"type":"record","name":"Order","fields":[{"name":"amount","type":"int"}]}"#,
//! )
//! .unwrap();
//!
//! let bytes = codec.binary_encode(&serde_json::json!({"amount": 10})).unwrap();
//! assert_eq!(bytes, vec![0x14]);
//! assert_eq!(codec.binary_decode(&bytes).unwrap()["amount"], 10);
//! ```

use apache_avro::{from_avro_datum, to_avro_datum, types::Value as AvroValue, Schema};
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Errors produced by the Avro codec engine.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Schema text could not be compiled.
    #[error("Schema parse error: {0}")]
    Parse(String),

    /// Value could not be written as a binary datum.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Binary payload could not be read with the schema.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Value does not fit the schema, or a native value has no JSON form.
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// A compiled Avro schema able to encode and decode binary datums.
///
/// Codecs are immutable once compiled and are shared behind `Arc` by the
/// registry cache and the schema store.
#[derive(Clone)]
pub struct AvroCodec {
    schema: Schema,
    text: String,
    canonical: String,
}

impl AvroCodec {
    /// Compiles raw schema text into a codec.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Parse` if the text is not a valid Avro schema.
    pub fn compile(schema_text: &str) -> Result<Self, CodecError> {
        let schema =
            Schema::parse_str(schema_text).map_err(|e| CodecError::Parse(e.to_string()))?;
        let canonical = schema.canonical_form();

        Ok(Self {
            schema,
            text: schema_text.to_string(),
            canonical,
        })
    }

    /// Returns the schema text this codec was compiled from.
    pub fn schema_text(&self) -> &str {
        &self.text
    }

    /// Returns the Parsing Canonical Form of the schema.
    ///
    /// Two codecs compiled from texts that differ only in whitespace, field
    /// order of attributes or documentation share the same canonical form.
    pub fn canonical_form(&self) -> &str {
        &self.canonical
    }

    /// Returns the underlying parsed schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Converts a JSON value into the schema's native Avro representation.
    ///
    /// Missing record fields are filled from their declared defaults.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Conversion` if the value does not match the
    /// schema, including integers outside the range of the target type.
    pub fn native_from_json(&self, value: &JsonValue) -> Result<AvroValue, CodecError> {
        let native = AvroValue::from(value.clone())
            .resolve(&self.schema)
            .map_err(|e| CodecError::Conversion(e.to_string()))?;

        // resolution narrows long to int with a plain cast
        if let Ok(written) = JsonValue::try_from(native.clone()) {
            ensure_integers_kept(value, &written, "$")?;
        }
        Ok(native)
    }

    /// Renders a native Avro value as JSON.
    pub fn json_from_native(&self, value: AvroValue) -> Result<JsonValue, CodecError> {
        JsonValue::try_from(value).map_err(|e| CodecError::Conversion(e.to_string()))
    }

    /// Encodes a JSON value as an Avro binary datum (no container header).
    pub fn binary_encode(&self, value: &JsonValue) -> Result<Vec<u8>, CodecError> {
        let native = self.native_from_json(value)?;
        to_avro_datum(&self.schema, native).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decodes an Avro binary datum into JSON.
    pub fn binary_decode(&self, bytes: &[u8]) -> Result<JsonValue, CodecError> {
        let mut reader = bytes;
        let native = from_avro_datum(&self.schema, &mut reader, None)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        if !reader.is_empty() {
            trace!(
                trailing = reader.len(),
                read = bytes.len() - reader.len(),
                "Ignoring bytes after a complete datum"
            );
        }
        self.json_from_native(native)
    }

    /// Decodes an Avro binary datum into its textual JSON form.
    pub fn binary_to_text(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let value = self.binary_decode(bytes)?;
        serde_json::to_string(&value).map_err(|e| CodecError::Conversion(e.to_string()))
    }
}

/// Compares every integer in `input` with what resolution produced for it.
fn ensure_integers_kept(
    input: &JsonValue,
    written: &JsonValue,
    path: &str,
) -> Result<(), CodecError> {
    match (input, written) {
        (JsonValue::Number(given), JsonValue::Number(kept))
            if is_integer(given) && is_integer(kept) && given != kept =>
        {
            Err(CodecError::Conversion(format!(
                "integer {} at {} is out of range for the schema type",
                given, path
            )))
        }
        (JsonValue::Object(given), JsonValue::Object(kept)) => {
            for (key, value) in given {
                if let Some(resolved) = kept.get(key) {
                    ensure_integers_kept(value, resolved, &format!("{}.{}", path, key))?;
                }
            }
            Ok(())
        }
        (JsonValue::Array(given), JsonValue::Array(kept)) if given.len() == kept.len() => {
            for (i, (value, resolved)) in given.iter().zip(kept).enumerate() {
                ensure_integers_kept(value, resolved, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_integer(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64()
}

impl PartialEq for AvroCodec {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for AvroCodec {}

impl fmt::Debug for AvroCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvroCodec")
            .field("canonical", &self.canonical)
            .finish()
    }
}
