pub mod logging;
pub mod message_queue;

pub use logging::{LogConfig, LogLevel, OutputFormat};
pub use message_queue::{RabbitMqConfig, TopologyConfig, DEFAULT_CONNECTION_TIMEOUT_SECONDS};
