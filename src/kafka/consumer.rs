//! Consumer group loop.
//!
//! [`ConsumerGroup::run`] receives records, decodes them, hands them to a
//! [`MessageHandler`] and stores the offset of every message that is marked
//! as consumed. Stored offsets are committed in the background and once
//! more on shutdown. Pause and resume requests arrive on a control channel;
//! shutdown is a [`CancellationToken`].

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::KafkaConfig;
use super::decoder::{MessageDecoder, RawMessage};
use super::handler::MessageHandler;
use super::{ControlCommand, KafkaClientError};

/// Kafka consumer group member.
pub struct ConsumerGroup {
    config: KafkaConfig,
    consumer: StreamConsumer,
}

impl ConsumerGroup {
    /// Creates a consumer group member from configuration.
    ///
    /// No connection is made until [`ConsumerGroup::run`] subscribes.
    ///
    /// # Errors
    ///
    /// Returns `KafkaClientError::Config` for invalid settings or an empty
    /// topic list, and `KafkaClientError::Kafka` if librdkafka rejects the
    /// configuration.
    pub fn new(config: KafkaConfig) -> Result<Self, KafkaClientError> {
        config.validate()?;
        if config.topics.is_empty() {
            return Err(KafkaClientError::Config(
                "kafka.topics cannot be empty for a consumer".to_string(),
            ));
        }

        info!(
            brokers = %config.brokers,
            group_id = %config.group_id,
            topics = ?config.topics,
            offset = config.offset.as_str(),
            "Creating consumer group"
        );

        let mut client_config = ClientConfig::new();
        for (key, value) in config.to_client_settings() {
            client_config.set(key, value);
        }
        let consumer: StreamConsumer = client_config.create()?;

        Ok(Self { config, consumer })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &KafkaConfig {
        &self.config
    }

    /// Consumes until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `KafkaClientError::Kafka` if the subscription fails. Receive
    /// errors inside the loop are logged and the loop continues.
    pub async fn run<H, D>(
        &self,
        handler: &H,
        decoder: &D,
        shutdown: CancellationToken,
        mut control: mpsc::Receiver<ControlCommand>,
    ) -> Result<(), KafkaClientError>
    where
        H: MessageHandler + ?Sized,
        D: MessageDecoder + ?Sized,
    {
        let topics: Vec<&str> = self.config.topics.iter().map(String::as_str).collect();
        self.consumer.subscribe(&topics)?;
        info!(topics = ?topics, "Consumer group subscribed");

        let mut paused = false;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Terminating consumer group: shutdown requested");
                    break;
                }
                Some(command) = control.recv() => {
                    paused = self.apply_control(command, paused);
                }
                received = self.consumer.recv() => match received {
                    Err(e) => warn!(error = %e, "Kafka receive error"),
                    Ok(message) => {
                        let raw = RawMessage::from_message(&message);
                        if process_message(handler, decoder, &raw).await {
                            if let Err(e) = self.consumer.store_offset_from_message(&message) {
                                warn!(
                                    error = %e,
                                    topic = %raw.topic,
                                    partition = raw.partition,
                                    offset = raw.offset,
                                    "Failed to store offset"
                                );
                            }
                        }
                    }
                },
            }
        }

        if let Err(e) = self.consumer.commit_consumer_state(CommitMode::Sync) {
            // nothing stored since the last background commit
            debug!(error = %e, "Final offset commit skipped");
        }
        self.consumer.unsubscribe();
        Ok(())
    }

    fn apply_control(&self, command: ControlCommand, paused: bool) -> bool {
        let pause = match command {
            ControlCommand::Pause => true,
            ControlCommand::Resume => false,
            ControlCommand::Toggle => !paused,
        };
        if pause == paused {
            return paused;
        }

        let result = self.consumer.assignment().and_then(|assignment| {
            if pause {
                self.consumer.pause(&assignment)
            } else {
                self.consumer.resume(&assignment)
            }
        });

        match result {
            Ok(()) => {
                info!(paused = pause, "Consumption flow changed");
                pause
            }
            Err(e) => {
                warn!(error = %e, "Failed to change consumption flow");
                paused
            }
        }
    }
}

/// Decodes and handles one record.
///
/// Returns whether the record should be marked as consumed. Decode
/// failures go to [`MessageHandler::on_error`] without calling the handler.
pub async fn process_message<H, D>(handler: &H, decoder: &D, message: &RawMessage) -> bool
where
    H: MessageHandler + ?Sized,
    D: MessageDecoder + ?Sized,
{
    debug!(
        topic = %message.topic,
        partition = message.partition,
        offset = message.offset,
        timestamp = ?message.timestamp,
        "Message claimed"
    );

    let decoded = match decoder.decode(message) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(
                error = %e,
                topic = %message.topic,
                offset = message.offset,
                "Unable to decode message"
            );
            return handler.on_error(&e);
        }
    };

    match handler.handle(decoded).await {
        Ok(()) => true,
        Err(e) => handler.on_error(e.as_ref()),
    }
}
