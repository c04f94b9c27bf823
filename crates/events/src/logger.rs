//! Background subscriber that writes every [`TopicEvent`] to the log.
//!
//! Runs as a long-lived task and shuts down when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::TopicEvent;

pub struct EventLogger;

impl EventLogger {
    /// Run the logging loop until the channel closes. Returns the number of
    /// events logged.
    pub async fn run(mut receiver: broadcast::Receiver<TopicEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event_type = %event.event_type,
                        topic_id = %event.topic_id,
                        version = event.version,
                        payload = %event.payload,
                        "Topic event"
                    );
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
        logged
    }
}
