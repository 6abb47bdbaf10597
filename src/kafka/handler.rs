//! Application callback for consumed messages.

use tracing::error;

use super::DecodedMessage;

/// Handler trait for processing decoded messages.
///
/// # Example
///
/// ```rust
/// use avrowire::kafka::{DecodedMessage, MessageHandler};
///
/// struct MyHandler;
///
/// #[async_trait::async_trait]
/// impl MessageHandler for MyHandler {
///     async fn handle(
///         &self,
///         message: DecodedMessage,
///     ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         println!("{} @ {}: {}", message.topic, message.offset, message.value);
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    /// Processes one decoded message.
    ///
    /// Returning `Ok(())` marks the message as consumed. An `Err` is passed
    /// to [`MessageHandler::on_error`], which decides whether it is marked.
    async fn handle(
        &self,
        message: DecodedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Decides whether a message that failed decoding or handling is still
    /// marked as consumed.
    ///
    /// The default logs the error and marks the message, so one bad record
    /// does not stall its partition.
    fn on_error(&self, error: &(dyn std::error::Error + Send + Sync)) -> bool {
        error!(error = %error, "Unable to process message");
        true
    }
}
