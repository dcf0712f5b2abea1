pub mod env_file;
pub mod models;
pub mod resolver;
pub mod sources;
pub mod validation;

// Re-export commonly used types
pub use env_file::{load_env_file, parse_env_file, DEFAULT_ENV_FILE};
pub use models::{LogConfig, LogLevel, OutputFormat, RabbitMqConfig, TopologyConfig};
pub use resolver::{keys, resolve_rabbitmq_config, resolve_rabbitmq_url, ResolvedUrl};
pub use sources::{ConfigSource, ResolvedValue, SourceChain};
pub use validation::{ConfigValidator, ValidationUtils};
