//! Event bus abstraction for mailcast notification side-channels.
//!
//! This crate defines the EventBus trait that allows different
//! implementations for the dispatch side-channel:
//! - Memory (single process, tokio broadcast channels)
//! - MQTT / Redis (multi-process brokers)

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

/// Event published alongside a dispatched notification.
///
/// Deliberately lightweight: only the subject line crosses the
/// side-channel, never the message body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub subject: String,
    pub timestamp: i64,
}

/// Error type for event bus operations
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Stream of notification events
pub type EventStream = Pin<Box<dyn Stream<Item = NotificationEvent> + Send>>;

/// Event bus trait for publishing and subscribing to notification events.
///
/// Publishing is fire-and-forget from the dispatcher's point of view: a
/// failed publish is logged by the caller and never blocks delivery on
/// the primary channel.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a notification event to all subscribers of this topic.
    async fn publish(&self, topic: &str, event: NotificationEvent) -> Result<(), EventBusError>;

    /// Subscribe to notification events on a topic.
    ///
    /// Returns a stream that yields events as they occur.
    /// The stream will continue until dropped or the connection is closed.
    async fn subscribe(&self, topic: &str) -> Result<EventStream, EventBusError>;
}
