use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("RabbitMQ connection information not found: {0}")]
    MissingConnection(String),
    #[error("Invalid task parameters: {0}")]
    InvalidTaskParams(String),
    #[error("Message queue error: {0}")]
    MessageQueue(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

pub type CollectorResult<T> = Result<T, CollectorError>;

impl CollectorError {
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn invalid_params<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTaskParams(msg.into())
    }
    pub fn message_queue<S: Into<String>>(msg: S) -> Self {
        Self::MessageQueue(msg.into())
    }

    /// Configuration and parameter problems, raised before any network activity
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CollectorError::Configuration(_)
                | CollectorError::MissingConnection(_)
                | CollectorError::InvalidTaskParams(_)
        )
    }

    /// Process exit code for this failure. Configuration problems exit with 2,
    /// broker and runtime failures with 1.
    pub fn exit_code(&self) -> u8 {
        if self.is_configuration() {
            2
        } else {
            1
        }
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        CollectorError::Serialization(err.to_string())
    }
}
