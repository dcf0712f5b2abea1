//! Emits one crawl request: declare topology, publish, close.
//!
//! The emitter owns its publisher and consumes itself on `emit`, so the
//! connection is released on every path out of the operation.

use std::fmt;

use collector_config::{RabbitMqConfig, TopologyConfig};
use collector_domain::{CrawlRequest, TaskType};
use collector_errors::CollectorResult;
use tracing::{info, warn};

use crate::message_queue::{MessagePublisher, OutboundMessage, RabbitMqPublisher};
use crate::topology::topic_matches;

/// What was sent, for the confirmation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub job_id: String,
    pub task_type: TaskType,
    pub exchange: String,
    pub routing_key: String,
}

impl fmt::Display for PublishReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Published job_id={} task_type={} to {}",
            self.job_id, self.task_type, self.routing_key
        )
    }
}

pub struct TaskEmitter<P: MessagePublisher> {
    publisher: P,
    topology: TopologyConfig,
}

impl<P: MessagePublisher> TaskEmitter<P> {
    pub fn new(publisher: P, topology: TopologyConfig) -> Self {
        Self {
            publisher,
            topology,
        }
    }

    pub async fn emit(
        self,
        request: &CrawlRequest,
        routing_key: &str,
    ) -> CollectorResult<PublishReceipt> {
        let outcome = self.declare_and_publish(request, routing_key).await;
        let closed = self.publisher.close().await;

        match (outcome, closed) {
            (Ok(receipt), Ok(())) => Ok(receipt),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!("Closing publisher after failure also failed: {close_err}");
                Err(e)
            }
        }
    }

    async fn declare_and_publish(
        &self,
        request: &CrawlRequest,
        routing_key: &str,
    ) -> CollectorResult<PublishReceipt> {
        self.publisher.declare_topology(&self.topology).await?;

        if !topic_matches(&self.topology.binding_key, routing_key) {
            warn!(
                "Routing key {} does not match binding {}; {} will not receive this message",
                routing_key, self.topology.binding_key, self.topology.queue
            );
        }

        let message = OutboundMessage::json(routing_key, request)?;
        self.publisher
            .publish(&self.topology.exchange, &message)
            .await?;

        info!(
            job_id = %request.job_id,
            task_type = %request.task_type,
            routing_key = %routing_key,
            "Crawl request published"
        );

        Ok(PublishReceipt {
            job_id: request.job_id.clone(),
            task_type: request.task_type,
            exchange: self.topology.exchange.clone(),
            routing_key: routing_key.to_string(),
        })
    }
}

/// Connect to RabbitMQ and emit one request over a connection scoped to this call
pub async fn emit_crawl_request(
    config: &RabbitMqConfig,
    topology: TopologyConfig,
    request: &CrawlRequest,
    routing_key: &str,
) -> CollectorResult<PublishReceipt> {
    let publisher = RabbitMqPublisher::connect(config).await?;
    TaskEmitter::new(publisher, topology)
        .emit(request, routing_key)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory_queue::InMemoryPublisher;
    use chrono::Utc;
    use collector_domain::CrawlJobSpec;
    use collector_errors::CollectorError;

    fn default_request() -> (CrawlRequest, String) {
        let spec = CrawlJobSpec::default();
        let request = spec
            .build_request_at("job-0a1b2c3d".to_string(), Utc::now())
            .unwrap();
        (request, spec.routing_key())
    }

    #[tokio::test]
    async fn test_emit_declares_publishes_and_closes() {
        let publisher = InMemoryPublisher::new();
        let (request, routing_key) = default_request();

        let receipt = TaskEmitter::new(publisher.clone(), TopologyConfig::default())
            .emit(&request, &routing_key)
            .await
            .unwrap();

        assert_eq!(publisher.calls().await, vec!["declare", "publish", "close"]);
        assert!(publisher.is_closed().await);
        assert_eq!(
            receipt.to_string(),
            "Published job_id=job-0a1b2c3d task_type=research_keyword to crawler.youtube.research_keyword"
        );

        let queued = publisher.queue_messages("collector.inbound.queue").await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].routing_key, "crawler.youtube.research_keyword");
        assert_eq!(queued[0].content_type, "application/json");

        let body: serde_json::Value = serde_json::from_slice(&queued[0].body).unwrap();
        assert_eq!(body["task_type"], "research_keyword");
        assert_eq!(body["payload"]["time_range"], 7);
        assert_eq!(body["time_range"], 7);
    }

    #[tokio::test]
    async fn test_publish_failure_still_closes() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_publish().await;
        let (request, routing_key) = default_request();

        let result = TaskEmitter::new(publisher.clone(), TopologyConfig::default())
            .emit(&request, &routing_key)
            .await;

        assert!(matches!(result, Err(CollectorError::MessageQueue(_))));
        assert!(publisher.is_closed().await);
        assert!(publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_declare_failure_skips_publish_and_closes() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_declare().await;
        let (request, routing_key) = default_request();

        let result = TaskEmitter::new(publisher.clone(), TopologyConfig::default())
            .emit(&request, &routing_key)
            .await;

        assert!(result.is_err());
        assert_eq!(publisher.calls().await, vec!["declare", "close"]);
    }

    #[tokio::test]
    async fn test_close_failure_after_success_is_reported() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_close().await;
        let (request, routing_key) = default_request();

        let result = TaskEmitter::new(publisher.clone(), TopologyConfig::default())
            .emit(&request, &routing_key)
            .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Message queue error: close rejected"
        );
        assert_eq!(publisher.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_close_failure_keeps_original_error() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_publish().await;
        publisher.fail_close().await;
        let (request, routing_key) = default_request();

        let err = TaskEmitter::new(publisher, TopologyConfig::default())
            .emit(&request, &routing_key)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Message queue error: publish to collector.inbound rejected"
        );
    }

    #[tokio::test]
    async fn test_unbound_routing_key_is_published_but_not_queued() {
        let publisher = InMemoryPublisher::new();
        let (request, _) = default_request();

        TaskEmitter::new(publisher.clone(), TopologyConfig::default())
            .emit(&request, "youtube.task")
            .await
            .unwrap();

        assert_eq!(publisher.published().await.len(), 1);
        assert!(publisher
            .queue_messages("collector.inbound.queue")
            .await
            .is_empty());
    }
}
