pub mod emitter;
pub mod in_memory_queue;
pub mod message_queue;
pub mod topology;

pub use emitter::{emit_crawl_request, PublishReceipt, TaskEmitter};
pub use in_memory_queue::{InMemoryPublisher, PublishedMessage};
pub use message_queue::{
    MessagePublisher, OutboundMessage, RabbitMqPublisher, CONTENT_TYPE_JSON,
    DELIVERY_MODE_PERSISTENT,
};
pub use topology::topic_matches;
