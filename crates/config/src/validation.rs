use collector_errors::{CollectorError, CollectorResult};

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> CollectorResult<()>;
}

/// Common validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> CollectorResult<()> {
        if value.trim().is_empty() {
            return Err(CollectorError::Configuration(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that a timeout is reasonable
    pub fn validate_timeout_seconds(timeout_seconds: u64, field_name: &str) -> CollectorResult<()> {
        if timeout_seconds == 0 {
            return Err(CollectorError::Configuration(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if timeout_seconds > 3600 {
            return Err(CollectorError::Configuration(format!(
                "{field_name} must be less than or equal to 3600"
            )));
        }
        Ok(())
    }
}
