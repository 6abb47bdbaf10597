//! Self-describing message envelope.
//!
//! Every encoded message is laid out as:
//!
//! ```text
//! +--------+----------------------+---------------------+
//! | 0x00   | schema id (u32, BE)  | Avro binary datum   |
//! +--------+----------------------+---------------------+
//!   1 byte        4 bytes               remaining bytes
//! ```
//!
//! Schemas are looked up in a preloaded [`SchemaStore`], never fetched on
//! demand. The marker byte is written as zero and not checked when reading.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

use crate::codec::CodecError;
use crate::registry::{ClientError, SchemaStore};

/// Marker byte written at offset 0.
pub const MAGIC_BYTE: u8 = 0x00;

/// Marker byte plus schema id.
pub const HEADER_LEN: usize = 5;

/// Errors from framing or unframing a message.
#[derive(Error, Debug)]
pub enum WireError {
    /// Subject or id is not in the schema store.
    #[error("Schema lookup error: {0}")]
    Schema(#[from] ClientError),

    /// Value did not fit the schema, or the payload was malformed.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Value could not be turned into JSON before encoding.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Message is shorter than the envelope header.
    #[error("Message too short: {0} bytes, need at least 5")]
    MessageTooShort(usize),
}

/// Encoder and decoder for the wire envelope, backed by a schema store.
#[derive(Debug, Clone)]
pub struct WireCodec {
    store: Arc<SchemaStore>,
}

impl WireCodec {
    /// Creates a wire codec over a built schema store.
    pub fn new(store: Arc<SchemaStore>) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    /// Encodes a JSON value with the schema resolved for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `WireError::Schema` if the subject is not in the store and
    /// `WireError::Codec` if the value does not match the schema.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use avrowire::wire::WireCodec;
    /// # fn run(codec: &WireCodec) -> Result<(), avrowire::wire::WireError> {
    /// let bytes = codec.encode("orders", &serde_json::json!({"amount": 10}))?;
    /// assert_eq!(&bytes[..5], &[0x00, 0x00, 0x00, 0x00, 0x07]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn encode(&self, subject: &str, value: &JsonValue) -> Result<Vec<u8>, WireError> {
        let detail = self.store.get_schema_by_subject(subject)?;
        let payload = detail.codec.binary_encode(value)?;

        let mut message = Vec::with_capacity(HEADER_LEN + payload.len());
        message.push(MAGIC_BYTE);
        message.extend_from_slice(&detail.id.to_be_bytes());
        message.extend_from_slice(&payload);

        trace!(
            subject = %subject,
            id = detail.id,
            bytes = message.len(),
            "Encoded message"
        );
        Ok(message)
    }

    /// Encodes any serializable value by way of its JSON form.
    pub fn encode_value<T: Serialize>(&self, subject: &str, value: &T) -> Result<Vec<u8>, WireError> {
        let json = serde_json::to_value(value)?;
        self.encode(subject, &json)
    }

    /// Decodes an envelope back into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `WireError::MessageTooShort` for fewer than five bytes,
    /// `WireError::Schema` for an id missing from the store and
    /// `WireError::Codec` for a payload the schema cannot read.
    pub fn decode(&self, message: &[u8]) -> Result<JsonValue, WireError> {
        let id = schema_id(message)?;
        let detail = self.store.get_schema_by_id(id)?;
        let value = detail.codec.binary_decode(&message[HEADER_LEN..])?;
        trace!(id = id, subject = %detail.subject, "Decoded message");
        Ok(value)
    }

    /// Decodes an envelope into its JSON text.
    pub fn decode_to_string(&self, message: &[u8]) -> Result<String, WireError> {
        let value = self.decode(message)?;
        Ok(serde_json::to_string(&value)?)
    }
}

/// Reads the schema id from an envelope header.
pub fn schema_id(message: &[u8]) -> Result<u32, WireError> {
    if message.len() < HEADER_LEN {
        return Err(WireError::MessageTooShort(message.len()));
    }
    let mut id = [0u8; 4];
    id.copy_from_slice(&message[1..HEADER_LEN]);
    Ok(u32::from_be_bytes(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AvroCodec;
    use crate::registry::{MockSchemaRegistry, SchemaDetail, SchemaRef, SchemaVersion};
    use serde_json::json;

    const ORDER_SCHEMA: &str =
        r#"{"type":"record","name":"Order","fields":[{"name":"amount","type":"int"}]}"#;

    async fn orders_codec() -> WireCodec {
        let mut mock = MockSchemaRegistry::new();
        mock.expect_get_latest_schema().returning(|_| {
            Ok(SchemaDetail {
                subject: "orders".to_string(),
                version: 1,
                schema: ORDER_SCHEMA.to_string(),
                id: 7,
                codec: Arc::new(AvroCodec::compile(ORDER_SCHEMA).unwrap()),
            })
        });
        let store = SchemaStore::build(&mock, &[SchemaRef::new("orders", SchemaVersion::Latest)])
            .await
            .unwrap();
        WireCodec::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_encode_orders_envelope() {
        let codec = orders_codec().await;
        let bytes = codec.encode("orders", &json!({"amount": 10})).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x00, 0x07, 0x14]);
    }

    #[tokio::test]
    async fn test_decode_ignores_marker_byte() {
        let codec = orders_codec().await;
        let value = codec.decode(&[0xff, 0x00, 0x00, 0x00, 0x07, 0x14]).unwrap();
        assert_eq!(value, json!({"amount": 10}));
    }

    #[tokio::test]
    async fn test_encode_value_from_struct() {
        #[derive(Serialize)]
        struct Order {
            amount: i32,
        }

        let codec = orders_codec().await;
        let bytes = codec.encode_value("orders", &Order { amount: 10 }).unwrap();
        assert_eq!(codec.decode_to_string(&bytes).unwrap(), r#"{"amount":10}"#);
    }

    #[tokio::test]
    async fn test_unknown_subject_and_id() {
        let codec = orders_codec().await;

        let err = codec.encode("payments", &json!({"amount": 1})).unwrap_err();
        assert!(matches!(err, WireError::Schema(ref e) if e.is_not_found()));

        let err = codec.decode(&[0x00, 0x00, 0x00, 0x00, 0x08, 0x14]).unwrap_err();
        assert!(matches!(err, WireError::Schema(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let codec = orders_codec().await;
        let err = codec.decode(&[0x00, 0x00, 0x00, 0x00, 0x07]).unwrap_err();
        assert!(matches!(err, WireError::Codec(_)));
    }

    #[test]
    fn test_schema_id_header() {
        assert_eq!(schema_id(&[0, 0, 0, 1, 0]).unwrap(), 256);
        assert_eq!(schema_id(&[0, 0x12, 0x34, 0x56, 0x78, 0xaa]).unwrap(), 0x1234_5678);
        assert!(matches!(schema_id(&[0, 0, 0]), Err(WireError::MessageTooShort(3))));
    }
}
