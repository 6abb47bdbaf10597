//! Record decoders.
//!
//! A decoder turns a raw Kafka record into a text key and a text value.
//! [`StringDecoder`] reads both as UTF-8; [`AvroDecoder`] unframes the value
//! through the wire codec and renders it as JSON.

use rdkafka::message::Message;

use super::KafkaClientError;
use crate::wire::WireCodec;

/// Owned copy of the parts of a Kafka record the decoders need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    /// Source topic
    pub topic: String,
    /// Source partition
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Record key
    pub key: Option<Vec<u8>>,
    /// Record value
    pub payload: Option<Vec<u8>>,
    /// Record timestamp in milliseconds since the epoch
    pub timestamp: Option<i64>,
}

impl RawMessage {
    /// Copies a record received from rdkafka.
    pub fn from_message<M: Message>(message: &M) -> Self {
        Self {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().map(<[u8]>::to_vec),
            timestamp: message.timestamp().to_millis(),
        }
    }

    fn key_text(&self) -> Result<Option<String>, KafkaClientError> {
        self.key
            .as_deref()
            .map(|key| {
                std::str::from_utf8(key)
                    .map(str::to_string)
                    .map_err(|e| KafkaClientError::Decode(format!("key is not UTF-8: {}", e)))
            })
            .transpose()
    }
}

/// A record with its key and value decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Source topic
    pub topic: String,
    /// Source partition
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Record key, if any
    pub key: Option<String>,
    /// Decoded value
    pub value: String,
}

/// Decodes raw records for a [`super::MessageHandler`].
pub trait MessageDecoder: Send + Sync {
    /// Decodes one record.
    fn decode(&self, message: &RawMessage) -> Result<DecodedMessage, KafkaClientError>;
}

/// Reads key and value as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDecoder;

impl MessageDecoder for StringDecoder {
    fn decode(&self, message: &RawMessage) -> Result<DecodedMessage, KafkaClientError> {
        let value = match message.payload.as_deref() {
            Some(payload) => String::from_utf8_lossy(payload).into_owned(),
            None => String::new(),
        };
        Ok(DecodedMessage {
            topic: message.topic.clone(),
            partition: message.partition,
            offset: message.offset,
            key: message.key_text()?,
            value,
        })
    }
}

/// Reads the key as text and the value as a wire envelope rendered as JSON.
#[derive(Debug, Clone)]
pub struct AvroDecoder {
    wire: WireCodec,
}

impl AvroDecoder {
    /// Creates a decoder over a wire codec.
    pub fn new(wire: WireCodec) -> Self {
        Self { wire }
    }
}

impl MessageDecoder for AvroDecoder {
    fn decode(&self, message: &RawMessage) -> Result<DecodedMessage, KafkaClientError> {
        let payload = message.payload.as_deref().unwrap_or_default();
        let value = self.wire.decode_to_string(payload)?;
        Ok(DecodedMessage {
            topic: message.topic.clone(),
            partition: message.partition,
            offset: message.offset,
            key: message.key_text()?,
            value,
        })
    }
}
