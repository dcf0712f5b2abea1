use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use collector_config::TopologyConfig;
use collector_errors::{CollectorError, CollectorResult};
use tokio::sync::Mutex;
use tracing::debug;

use crate::message_queue::{MessagePublisher, OutboundMessage};
use crate::topology::topic_matches;

/// In-memory publisher for tests.
///
/// Applies topic routing against the declared bindings so tests can assert
/// what a queue would have received. Clones share state, which lets a test
/// keep a handle after the publisher has been moved into an emitter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    state: Arc<Mutex<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    /// queue name -> delivered messages
    queues: HashMap<String, Vec<OutboundMessage>>,
    /// (exchange, binding key, queue)
    bindings: Vec<(String, String, String)>,
    published: Vec<PublishedMessage>,
    /// Calls in order, e.g. `declare`, `publish`, `close`
    calls: Vec<&'static str>,
    closed: bool,
    fail_declare: bool,
    fail_publish: bool,
    fail_close: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub exchange: String,
    pub message: OutboundMessage,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_declare(&self) {
        self.state.lock().await.fail_declare = true;
    }

    pub async fn fail_publish(&self) {
        self.state.lock().await.fail_publish = true;
    }

    pub async fn fail_close(&self) {
        self.state.lock().await.fail_close = true;
    }

    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.state.lock().await.published.clone()
    }

    pub async fn queue_messages(&self, queue: &str) -> Vec<OutboundMessage> {
        self.state
            .lock()
            .await
            .queues
            .get(queue)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.state.lock().await.calls.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn declare_topology(&self, topology: &TopologyConfig) -> CollectorResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push("declare");
        if state.closed {
            return Err(CollectorError::message_queue("publisher already closed"));
        }
        if state.fail_declare {
            return Err(CollectorError::message_queue(format!(
                "declare of {} rejected",
                topology.exchange
            )));
        }

        state.queues.entry(topology.queue.clone()).or_default();
        let binding = (
            topology.exchange.clone(),
            topology.binding_key.clone(),
            topology.queue.clone(),
        );
        if !state.bindings.contains(&binding) {
            state.bindings.push(binding);
        }
        Ok(())
    }

    async fn publish(&self, exchange: &str, message: &OutboundMessage) -> CollectorResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push("publish");
        if state.closed {
            return Err(CollectorError::message_queue("publisher already closed"));
        }
        if state.fail_publish {
            return Err(CollectorError::message_queue(format!(
                "publish to {exchange} rejected"
            )));
        }

        let targets: Vec<String> = state
            .bindings
            .iter()
            .filter(|(ex, key, _)| ex == exchange && topic_matches(key, &message.routing_key))
            .map(|(_, _, queue)| queue.clone())
            .collect();

        for queue in targets {
            state.queues.entry(queue).or_default().push(message.clone());
        }

        state.published.push(PublishedMessage {
            exchange: exchange.to_string(),
            message: message.clone(),
        });
        debug!("In-memory publish to {} ({})", exchange, message.routing_key);
        Ok(())
    }

    async fn close(&self) -> CollectorResult<()> {
        let mut state = self.state.lock().await;
        state.calls.push("close");
        if state.fail_close {
            return Err(CollectorError::message_queue("close rejected"));
        }
        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_routes_by_binding() {
        let publisher = InMemoryPublisher::new();
        let topology = TopologyConfig::default();
        publisher.declare_topology(&topology).await.unwrap();

        let routed =
            OutboundMessage::json("crawler.youtube.research_keyword", &json!({})).unwrap();
        let unrouted = OutboundMessage::json("youtube.task", &json!({})).unwrap();
        publisher.publish(&topology.exchange, &routed).await.unwrap();
        publisher.publish(&topology.exchange, &unrouted).await.unwrap();

        let queued = publisher.queue_messages(&topology.queue).await;
        assert_eq!(queued, vec![routed]);
        assert_eq!(publisher.published().await.len(), 2);
    }

    #[tokio::test]
    async fn test_declare_is_idempotent() {
        let publisher = InMemoryPublisher::new();
        let topology = TopologyConfig::default();
        publisher.declare_topology(&topology).await.unwrap();
        publisher.declare_topology(&topology).await.unwrap();

        let message = OutboundMessage::json("crawler.tiktok.crawl_links", &json!({})).unwrap();
        publisher.publish(&topology.exchange, &message).await.unwrap();

        assert_eq!(publisher.queue_messages(&topology.queue).await.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_publisher_rejects_publish() {
        let publisher = InMemoryPublisher::new();
        publisher.close().await.unwrap();
        assert!(publisher.is_closed().await);

        let message = OutboundMessage::json("crawler.youtube.x", &json!({})).unwrap();
        assert!(publisher.publish("collector.inbound", &message).await.is_err());
    }
}
