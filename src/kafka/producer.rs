//! Producer sending wire-framed Avro values.

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, info};

use super::config::KafkaConfig;
use super::KafkaClientError;
use crate::wire::WireCodec;

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Kafka producer that frames values with the wire codec before sending.
pub struct Producer {
    producer: FutureProducer,
    wire: WireCodec,
}

impl Producer {
    /// Creates a producer.
    ///
    /// # Errors
    ///
    /// Returns `KafkaClientError::Config` for invalid settings and
    /// `KafkaClientError::Kafka` if librdkafka rejects the configuration.
    pub fn new(config: &KafkaConfig, wire: WireCodec) -> Result<Self, KafkaClientError> {
        config.validate()?;

        let mut client_config = ClientConfig::new();
        for (key, value) in config.to_producer_settings() {
            client_config.set(key, value);
        }
        let producer: FutureProducer = client_config.create()?;

        info!(brokers = %config.brokers, "Created producer");
        Ok(Self { producer, wire })
    }

    /// Encodes `value` with the schema resolved for `subject` and sends it.
    ///
    /// Returns the partition and offset the broker assigned.
    ///
    /// # Errors
    ///
    /// Returns `KafkaClientError::Wire` if encoding fails, in which case
    /// nothing is sent, and `KafkaClientError::Kafka` if delivery fails.
    pub async fn produce(
        &self,
        topic: &str,
        subject: &str,
        key: Option<&str>,
        value: &JsonValue,
    ) -> Result<(i32, i64), KafkaClientError> {
        let payload = self.wire.encode(subject, value)?;

        let mut record = FutureRecord::<str, [u8]>::to(topic).payload(payload.as_slice());
        if let Some(key) = key {
            record = record.key(key);
        }

        let (partition, offset) = self
            .producer
            .send(record, SEND_TIMEOUT)
            .await
            .map_err(|(e, _)| KafkaClientError::Kafka(e))?;

        debug!(
            topic = %topic,
            subject = %subject,
            partition = partition,
            offset = offset,
            bytes = payload.len(),
            "Message delivered"
        );
        Ok((partition, offset))
    }
}
