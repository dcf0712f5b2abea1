//! Minimal `KEY=VALUE` file loader.
//!
//! Only used to look up `RABBITMQ_*` settings that are not present in the
//! process environment. Values are never exported back into the environment.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use collector_errors::{CollectorError, CollectorResult};
use tracing::debug;

/// Path looked up relative to the working directory when none is given
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Parse env file content.
///
/// Blank lines, `#` comments and lines without `=` are skipped. The line is
/// split on the first `=`; surrounding double quotes and then single quotes
/// are stripped from the value.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let value = value.trim().trim_matches('"').trim_matches('\'');
        values.insert(key.to_string(), value.to_string());
    }

    values
}

/// Load and parse an env file. A missing file yields an empty map.
pub fn load_env_file(path: &Path) -> CollectorResult<HashMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let values = parse_env_file(&content);
            debug!(
                "Loaded {} entries from env file {}",
                values.len(),
                path.display()
            );
            Ok(values)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Env file {} not found, skipping", path.display());
            Ok(HashMap::new())
        }
        Err(e) => Err(CollectorError::Configuration(format!(
            "Failed to read env file {}: {}",
            path.display(),
            e
        ))),
    }
}
