//! Notification dispatch.
//!
//! Pushes a resolved dispatch request to its chat target and, when a side
//! channel is configured, publishes a notification event carrying the
//! subject line only. Neither leg can fail the other.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::warn;

use crate::ingest::DispatchRequest;
use crate::messenger::Messenger;
use crate::metrics::{record_event_publish, record_push_delivery};
use mailcast_events::{EventBus, NotificationEvent};

/// Event-bus side channel for notification summaries.
pub struct SideChannel {
    pub bus: Arc<dyn EventBus>,
    pub topic: String,
}

/// What happened to one dispatch request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// The push to the chat target succeeded
    pub delivered: bool,
    /// The side-channel event went out
    pub event_published: bool,
}

/// Delivers dispatch requests to the chat platform and the side channel.
pub struct DispatchGateway {
    messenger: Arc<dyn Messenger>,
    side_channel: Option<SideChannel>,
}

impl DispatchGateway {
    pub fn new(messenger: Arc<dyn Messenger>, side_channel: Option<SideChannel>) -> Self {
        Self {
            messenger,
            side_channel,
        }
    }

    /// Dispatch one request.
    ///
    /// Infallible: a failed push or publish is logged and reflected in
    /// the result, never propagated. The side-channel event goes out
    /// even when the push failed.
    pub async fn dispatch(&self, request: &DispatchRequest) -> DispatchResult {
        let mut result = DispatchResult::default();

        let started = Instant::now();
        match self
            .messenger
            .send(&request.recipient.target_id, &request.message)
            .await
        {
            Ok(()) => {
                record_push_delivery(true, started.elapsed());
                result.delivered = true;
            }
            Err(e) => {
                warn!("push to {} failed: {}", request.recipient.target_id, e);
                record_push_delivery(false, started.elapsed());
            }
        }

        if let Some(side_channel) = &self.side_channel {
            // Subject only; the message body never leaves the push path.
            let event = NotificationEvent {
                subject: request.subject.clone(),
                timestamp: Utc::now().timestamp(),
            };
            match side_channel.bus.publish(&side_channel.topic, event).await {
                Ok(()) => {
                    record_event_publish(true);
                    result.event_published = true;
                }
                Err(e) => {
                    warn!("side-channel publish failed: {}", e);
                    record_event_publish(false);
                }
            }
        }

        result
    }
}
