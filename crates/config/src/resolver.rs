//! RabbitMQ connection resolution
//!
//! A ready-made `RABBITMQ_URL` from any source wins. Otherwise the URL is
//! composed from host, port, user, password and vhost, each resolved through
//! the same source chain.

use collector_errors::{CollectorError, CollectorResult};
use tracing::debug;

use crate::models::{RabbitMqConfig, DEFAULT_CONNECTION_TIMEOUT_SECONDS};
use crate::sources::SourceChain;
use crate::validation::ConfigValidator;

pub mod keys {
    pub const RABBITMQ_URL: &str = "RABBITMQ_URL";
    pub const RABBITMQ_HOST: &str = "RABBITMQ_HOST";
    pub const RABBITMQ_PORT: &str = "RABBITMQ_PORT";
    pub const RABBITMQ_USER: &str = "RABBITMQ_USER";
    pub const RABBITMQ_PASSWORD: &str = "RABBITMQ_PASSWORD";
    pub const RABBITMQ_VHOST: &str = "RABBITMQ_VHOST";
    pub const RABBITMQ_CONNECTION_TIMEOUT: &str = "RABBITMQ_CONNECTION_TIMEOUT";
}

/// Resolved connection URL and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: String,
    /// Source name for a ready-made URL, `composed` for one built from parts
    pub origin: String,
}

pub fn resolve_rabbitmq_url(chain: &SourceChain) -> CollectorResult<ResolvedUrl> {
    if let Some(resolved) = chain.lookup(keys::RABBITMQ_URL) {
        debug!("Using {} from {}", keys::RABBITMQ_URL, resolved.source);
        return Ok(ResolvedUrl {
            url: resolved.value,
            origin: resolved.source,
        });
    }

    let part = |key: &str| {
        chain.get(key).ok_or_else(|| {
            CollectorError::MissingConnection(format!(
                "{key} is not set in [{}]. Set RABBITMQ_URL (env or .env)",
                chain.describe()
            ))
        })
    };

    let host = part(keys::RABBITMQ_HOST)?;
    let port = part(keys::RABBITMQ_PORT)?;
    let user = part(keys::RABBITMQ_USER)?;
    let password = part(keys::RABBITMQ_PASSWORD)?;
    let vhost = part(keys::RABBITMQ_VHOST)?;

    // the URL already supplies the separator before the vhost
    let vhost = vhost.strip_prefix('/').unwrap_or(&vhost);

    Ok(ResolvedUrl {
        url: format!("amqp://{user}:{password}@{host}:{port}/{vhost}"),
        origin: "composed".to_string(),
    })
}

/// Resolve and validate the full connection configuration
pub fn resolve_rabbitmq_config(chain: &SourceChain) -> CollectorResult<RabbitMqConfig> {
    let resolved = resolve_rabbitmq_url(chain)?;

    let connection_timeout_seconds = match chain.lookup(keys::RABBITMQ_CONNECTION_TIMEOUT) {
        Some(timeout) => timeout.value.trim().parse::<u64>().map_err(|e| {
            CollectorError::Configuration(format!(
                "{} from {} must be a positive integer: {e}",
                keys::RABBITMQ_CONNECTION_TIMEOUT,
                timeout.source
            ))
        })?,
        None => DEFAULT_CONNECTION_TIMEOUT_SECONDS,
    };

    let config = RabbitMqConfig {
        url: resolved.url,
        connection_timeout_seconds,
    };
    config.validate()?;

    debug!(
        "Resolved RabbitMQ connection {} (origin: {})",
        config.masked_url(),
        resolved.origin
    );
    Ok(config)
}
