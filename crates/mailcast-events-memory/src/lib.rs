//! In-memory event bus implementation using tokio broadcast channels.
//!
//! This implementation is suitable for:
//! - Single server deployments
//! - Development and testing
//! - Simple deployments that don't require an external broker
//!
//! For multi-process deployments, use an MQTT or Redis event bus instead.

use async_trait::async_trait;
use dashmap::DashMap;
use mailcast_events::{EventBus, EventBusError, EventStream, NotificationEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const CHANNEL_CAPACITY: usize = 100;

/// In-memory event bus using tokio broadcast channels.
///
/// Events are only broadcast within a single process.
/// If you have multiple server replicas, they will NOT receive each other's events.
pub struct MemoryEventBus {
    channels: Arc<DashMap<String, broadcast::Sender<NotificationEvent>>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
        }
    }

    /// Get or create a broadcast channel for a topic
    fn get_or_create_channel(&self, topic: &str) -> broadcast::Sender<NotificationEvent> {
        self.channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, topic: &str, event: NotificationEvent) -> Result<(), EventBusError> {
        let tx = self.get_or_create_channel(topic);

        // Ignore error if no receivers (this is fine)
        let _ = tx.send(event);

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<EventStream, EventBusError> {
        let tx = self.get_or_create_channel(topic);
        let rx = tx.subscribe();

        // Convert BroadcastStream to our EventStream type
        // Filter out lagged errors (happens when receiver can't keep up)
        // Client fell behind, they should do a full resync
        let stream = BroadcastStream::new(rx).filter_map(|result| result.ok());

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn publish_and_subscribe() {
        let bus = MemoryEventBus::new();

        // Subscribe first
        let mut stream = bus.subscribe("mailcast/notify").await.unwrap();

        // Publish event
        let event = NotificationEvent {
            subject: "Hello".to_string(),
            timestamp: 12345,
        };
        bus.publish("mailcast/notify", event.clone()).await.unwrap();

        // Receive event
        let received = tokio::time::timeout(std::time::Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");

        assert_eq!(received.subject, "Hello");
        assert_eq!(received.timestamp, 12345);
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = MemoryEventBus::new();

        // Multiple subscribers
        let mut stream1 = bus.subscribe("mailcast/notify").await.unwrap();
        let mut stream2 = bus.subscribe("mailcast/notify").await.unwrap();

        // Publish event
        let event = NotificationEvent {
            subject: "Weekly report".to_string(),
            timestamp: 67890,
        };
        bus.publish("mailcast/notify", event).await.unwrap();

        // Both should receive
        let recv1 = stream1.next().await.unwrap();
        let recv2 = stream2.next().await.unwrap();

        assert_eq!(recv1.subject, "Weekly report");
        assert_eq!(recv2.subject, "Weekly report");
    }

    #[tokio::test]
    async fn publish_before_subscribe_is_lost() {
        let bus = MemoryEventBus::new();

        // Publish before subscribing
        let event = NotificationEvent {
            subject: "Old news".to_string(),
            timestamp: 99999,
        };
        bus.publish("mailcast/notify", event).await.unwrap();

        // Subscribe after - should not receive the old event
        let mut stream = bus.subscribe("mailcast/notify").await.unwrap();

        // Should timeout (no event)
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;

        assert!(
            result.is_err(),
            "Should not receive event published before subscription"
        );
    }

    #[tokio::test]
    async fn cross_topic_isolation() {
        let bus = MemoryEventBus::new();

        // Subscribe to topic a only
        let mut stream_a = bus.subscribe("mailcast/a").await.unwrap();

        // Publish to topic b (should NOT be received by stream_a)
        let event_b = NotificationEvent {
            subject: "For topic b".to_string(),
            timestamp: 11111,
        };
        bus.publish("mailcast/b", event_b).await.unwrap();

        // Publish to topic a (should be received)
        let event_a = NotificationEvent {
            subject: "For topic a".to_string(),
            timestamp: 22222,
        };
        bus.publish("mailcast/a", event_a).await.unwrap();

        // Should receive the topic-a event, not the topic-b one
        let received = tokio::time::timeout(std::time::Duration::from_millis(100), stream_a.next())
            .await
            .expect("timeout")
            .expect("stream ended");

        assert_eq!(received.subject, "For topic a");
    }

    #[test]
    fn memory_event_bus_default() {
        let bus = MemoryEventBus::default();
        // Default should create an empty bus
        assert!(bus.channels.is_empty());
    }

    #[tokio::test]
    async fn multiple_events_ordering() {
        let bus = MemoryEventBus::new();

        let mut stream = bus.subscribe("mailcast/notify").await.unwrap();

        // Publish multiple events
        for i in 1i64..=3 {
            let event = NotificationEvent {
                subject: format!("Subject {}", i),
                timestamp: i,
            };
            bus.publish("mailcast/notify", event).await.unwrap();
        }

        // Receive in order
        let recv1 = stream.next().await.unwrap();
        let recv2 = stream.next().await.unwrap();
        let recv3 = stream.next().await.unwrap();

        assert_eq!(recv1.subject, "Subject 1");
        assert_eq!(recv2.subject, "Subject 2");
        assert_eq!(recv3.subject, "Subject 3");
    }

    #[tokio::test]
    async fn subscribe_after_channel_exists() {
        let bus = MemoryEventBus::new();

        // First subscriber creates the channel
        let _stream1 = bus.subscribe("mailcast/notify").await.unwrap();

        // Second subscriber reuses existing channel
        let mut stream2 = bus.subscribe("mailcast/notify").await.unwrap();

        // Publish event
        let event = NotificationEvent {
            subject: "Reused channel".to_string(),
            timestamp: 1,
        };
        bus.publish("mailcast/notify", event).await.unwrap();

        // Second subscriber should receive it
        let received = tokio::time::timeout(std::time::Duration::from_millis(100), stream2.next())
            .await
            .expect("timeout")
            .expect("stream ended");

        assert_eq!(received.subject, "Reused channel");
    }
}
