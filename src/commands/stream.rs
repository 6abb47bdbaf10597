//! Kafka consume and produce commands

use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::build_wire_codec;
use crate::config::Config;
use crate::error::{AvrowireError, Result};
use crate::kafka::{
    signals, AvroDecoder, ConsumerGroup, ControlCommand, DecodedMessage, KafkaConfig,
    MessageDecoder, MessageHandler, Producer, StringDecoder,
};

const CONTROL_CHANNEL_SIZE: usize = 8;

/// Prints each consumed message as one line on stdout.
pub struct PrintHandler;

impl PrintHandler {
    /// Formats a message as `topic/partition@offset key=<key> <value>`.
    pub fn format(message: &DecodedMessage) -> String {
        format!(
            "{}/{}@{} key={} {}",
            message.topic,
            message.partition,
            message.offset,
            message.key.as_deref().unwrap_or("-"),
            message.value
        )
    }
}

#[async_trait::async_trait]
impl MessageHandler for PrintHandler {
    async fn handle(
        &self,
        message: DecodedMessage,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("{}", Self::format(&message));
        Ok(())
    }
}

/// Consume from the configured topics until interrupted
///
/// Values are decoded as wire envelopes against the configured `schemas`
/// unless `raw` is set. `SIGUSR1` pauses and resumes consumption.
pub async fn consume(config: &Config, raw: bool) -> Result<()> {
    let kafka = kafka_config(config)?;

    let decoder: Box<dyn MessageDecoder> = if raw {
        Box::new(StringDecoder)
    } else {
        Box::new(AvroDecoder::new(build_wire_codec(config, None).await?))
    };

    let group = ConsumerGroup::new(kafka.clone())?;

    let shutdown = CancellationToken::new();
    let (control_tx, control_rx) = mpsc::channel::<ControlCommand>(CONTROL_CHANNEL_SIZE);
    let signal_task = tokio::spawn(signals::forward_signals(control_tx, shutdown.clone()));

    info!(topics = ?kafka.topics, group_id = %kafka.group_id, "Consuming");
    let result = group
        .run(&PrintHandler, decoder.as_ref(), shutdown.clone(), control_rx)
        .await;

    shutdown.cancel();
    let _ = signal_task.await;

    result?;
    Ok(())
}

/// Encode one JSON value for `subject` and send it to `topic`
pub async fn produce(
    config: &Config,
    topic: &str,
    subject: &str,
    key: Option<&str>,
    json: &str,
) -> Result<()> {
    let kafka = kafka_config(config)?;
    let value: JsonValue = serde_json::from_str(json)
        .map_err(|e| AvrowireError::Input(format!("Invalid JSON value: {}", e)))?;

    let wire = build_wire_codec(config, Some(subject)).await?;
    let producer = Producer::new(&kafka, wire)?;

    let (partition, offset) = producer.produce(topic, subject, key, &value).await?;
    println!("Produced to {}/{}@{}", topic, partition, offset);
    Ok(())
}

fn kafka_config(config: &Config) -> Result<KafkaConfig> {
    config.kafka.clone().ok_or_else(|| {
        AvrowireError::Config(
            "No kafka section configured (set kafka in the config file or AVROWIRE_KAFKA_BROKERS)"
                .to_string(),
        )
        .into()
    })
}
