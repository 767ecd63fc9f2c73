//! CustomEventLogger - Logs every `custom.event` this node receives.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::{EventEnvelope, HandlerError};
use crate::ports::EventHandler;

/// Demo consumer: announces receipt and prints the payload.
#[derive(Debug, Default)]
pub struct CustomEventLogger;

impl CustomEventLogger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventHandler for CustomEventLogger {
    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError> {
        info!(
            event_id = %event.event_id(),
            origin = %event.origin_service(),
            "Received the event!"
        );
        info!("-- Event Message: {}", event.payload());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CustomEventLogger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_never_fails() {
        let logger = CustomEventLogger::new();
        assert!(logger.handle(&EventEnvelope::test_fixture()).await.is_ok());
        assert_eq!(logger.name(), "CustomEventLogger");
    }
}
