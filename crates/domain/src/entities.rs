use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value_objects::TaskType;

/// Key used for the time range both inside the payload and at top level
pub const TIME_RANGE_KEY: &str = "time_range";

/// Inbound crawl request as consumed by the collector dispatcher.
///
/// Built once per invocation, serialized to JSON and discarded after sending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlRequest {
    pub job_id: String,
    pub task_type: TaskType,
    pub payload: Map<String, Value>,
    #[serde(with = "rfc3339_offset")]
    pub emitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl CrawlRequest {
    pub fn new(
        job_id: String,
        task_type: TaskType,
        mut payload: Map<String, Value>,
        time_range: Option<i64>,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        if let Some(days) = time_range {
            payload
                .entry(TIME_RANGE_KEY)
                .or_insert_with(|| Value::from(days));
        }

        Self {
            job_id,
            task_type,
            payload,
            emitted_at,
            time_range,
            attempt: None,
            max_attempts: None,
        }
    }

    pub fn with_attempts(mut self, attempt: Option<u32>, max_attempts: Option<u32>) -> Self {
        self.attempt = attempt;
        self.max_attempts = max_attempts;
        self
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// ISO-8601 with an explicit `+00:00` offset instead of `Z`. Microseconds are
/// printed only when non-zero.
mod rfc3339_offset {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        let precision = if value.timestamp_subsec_micros() == 0 {
            SecondsFormat::Secs
        } else {
            SecondsFormat::Micros
        };
        value.to_rfc3339_opts(precision, false)
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
