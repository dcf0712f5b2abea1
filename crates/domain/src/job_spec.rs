//! Description of the crawl job to emit.
//!
//! Everything that used to be a hardcoded constant of the publishing script
//! (platform, task type, payload, time range, routing key) lives here and is
//! passed explicitly into the publish operation.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use collector_errors::{CollectorError, CollectorResult};

use crate::entities::{CrawlRequest, TIME_RANGE_KEY};
use crate::value_objects::{generate_job_id, Platform, TaskType};

/// Prefix of every crawl routing key, matched by the inbound `crawler.#` binding
pub const ROUTING_KEY_PREFIX: &str = "crawler";
pub const DEFAULT_TIME_RANGE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct CrawlJobSpec {
    pub platform: Platform,
    pub task_type: TaskType,
    pub payload: Map<String, Value>,
    /// Time range in days, copied into the payload and the message top level
    pub time_range: Option<i64>,
    /// Overrides the derived `crawler.<platform>.<task_type>` key
    pub routing_key: Option<String>,
    pub attempt: Option<u32>,
    pub max_attempts: Option<u32>,
}

impl Default for CrawlJobSpec {
    fn default() -> Self {
        Self {
            platform: Platform::Youtube,
            task_type: TaskType::ResearchKeyword,
            payload: default_payload(),
            time_range: Some(DEFAULT_TIME_RANGE_DAYS),
            routing_key: None,
            attempt: None,
            max_attempts: None,
        }
    }
}

fn default_payload() -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("keyword".to_string(), json!("python"));
    payload
}

/// Parse a payload given as JSON text. Only objects are accepted.
pub fn parse_payload(raw: &str) -> CollectorResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CollectorError::invalid_params(format!("payload is not valid JSON: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(CollectorError::invalid_params(format!(
            "payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl CrawlJobSpec {
    pub fn routing_key(&self) -> String {
        match &self.routing_key {
            Some(key) => key.clone(),
            None => format!("{ROUTING_KEY_PREFIX}.{}.{}", self.platform, self.task_type),
        }
    }

    pub fn validate(&self) -> CollectorResult<()> {
        if let Some(key) = &self.routing_key {
            if key.trim().is_empty() {
                return Err(CollectorError::invalid_params("routing key cannot be empty"));
            }
        }

        if let Some(days) = self.time_range {
            if days <= 0 {
                return Err(CollectorError::invalid_params(format!(
                    "time range must be greater than 0, got {days}"
                )));
            }
        }

        if let Some(value) = self.payload.get(TIME_RANGE_KEY) {
            if !(value.is_i64() || value.is_u64()) {
                return Err(CollectorError::invalid_params(
                    "payload.time_range must be an integer",
                ));
            }
        }

        match self.task_type {
            TaskType::ResearchKeyword => self.check_string("keyword")?,
            TaskType::CrawlLinks => self.check_string_list("video_urls")?,
            TaskType::ResearchAndCrawl | TaskType::DryRunKeyword => {
                self.check_string_list("keywords")?
            }
        }

        match (self.attempt, self.max_attempts) {
            (Some(0), _) => Err(CollectorError::invalid_params("attempt must be greater than 0")),
            (_, Some(0)) => Err(CollectorError::invalid_params(
                "max_attempts must be greater than 0",
            )),
            (Some(attempt), Some(max)) if attempt > max => Err(CollectorError::invalid_params(
                format!("attempt {attempt} exceeds max_attempts {max}"),
            )),
            _ => Ok(()),
        }
    }

    /// Payload fields are optional; a present field must have the right shape
    fn check_string(&self, field: &str) -> CollectorResult<()> {
        match self.payload.get(field) {
            None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
            Some(other) => Err(CollectorError::invalid_params(format!(
                "payload.{field} must be a string for {}, got {}",
                self.task_type,
                json_kind(other)
            ))),
        }
    }

    fn check_string_list(&self, field: &str) -> CollectorResult<()> {
        match self.payload.get(field) {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
            Some(_) => Err(CollectorError::invalid_params(format!(
                "payload.{field} must be an array of strings for {}",
                self.task_type
            ))),
        }
    }

    /// Validate and build the request with a fresh job id, stamped now
    pub fn build_request(&self) -> CollectorResult<CrawlRequest> {
        self.build_request_at(generate_job_id(), Utc::now())
    }

    pub fn build_request_at(
        &self,
        job_id: String,
        emitted_at: DateTime<Utc>,
    ) -> CollectorResult<CrawlRequest> {
        self.validate()?;

        let request = CrawlRequest::new(
            job_id,
            self.task_type,
            self.payload.clone(),
            self.time_range,
            emitted_at,
        )
        .with_attempts(self.attempt, self.max_attempts);
        Ok(request)
    }
}
