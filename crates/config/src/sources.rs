//! Configuration source implementations
//!
//! Settings are looked up through an ordered list of named sources. The first
//! source holding a non-empty value for a key wins, so precedence is simply the
//! order of the list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use collector_errors::CollectorResult;

use crate::env_file::load_env_file;
use crate::resolver::keys;

/// Configuration source enum
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Live process environment
    Environment,

    /// Parsed `KEY=VALUE` file
    EnvFile {
        path: PathBuf,
        values: HashMap<String, String>,
    },

    /// In-memory values, used for built-in defaults
    Memory {
        name: String,
        data: HashMap<String, String>,
    },
}

impl ConfigSource {
    /// Load an env file source. A missing file becomes an empty source.
    pub fn env_file(path: impl AsRef<Path>) -> CollectorResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = load_env_file(&path)?;
        Ok(ConfigSource::EnvFile { path, values })
    }

    pub fn memory<I, K, V>(name: &str, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ConfigSource::Memory {
            name: name.to_string(),
            data: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Built-in connection defaults: a local broker with the guest account
    pub fn defaults() -> Self {
        Self::memory(
            "defaults",
            [
                (keys::RABBITMQ_HOST, "localhost"),
                (keys::RABBITMQ_PORT, "5672"),
                (keys::RABBITMQ_USER, "guest"),
                (keys::RABBITMQ_PASSWORD, "guest"),
                (keys::RABBITMQ_VHOST, "/"),
            ],
        )
    }

    pub fn name(&self) -> String {
        match self {
            ConfigSource::Environment => "process-env".to_string(),
            ConfigSource::EnvFile { path, .. } => format!("env-file:{}", path.display()),
            ConfigSource::Memory { name, .. } => name.clone(),
        }
    }

    /// Look up a key. Empty values are treated as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match self {
            ConfigSource::Environment => std::env::var(key).ok(),
            ConfigSource::EnvFile { values, .. } => values.get(key).cloned(),
            ConfigSource::Memory { data, .. } => data.get(key).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// A value together with the name of the source that supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: String,
    pub source: String,
}

/// Ordered list of configuration sources, highest precedence first
#[derive(Debug, Clone, Default)]
pub struct SourceChain {
    sources: Vec<ConfigSource>,
}

impl SourceChain {
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self { sources }
    }

    /// Process environment, then the env file, then (optionally) the built-in
    /// connection defaults.
    pub fn standard(env_file: impl AsRef<Path>, include_defaults: bool) -> CollectorResult<Self> {
        let mut sources = vec![ConfigSource::Environment, ConfigSource::env_file(env_file)?];
        if include_defaults {
            sources.push(ConfigSource::defaults());
        }
        Ok(Self::new(sources))
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    pub fn lookup(&self, key: &str) -> Option<ResolvedValue> {
        self.sources.iter().find_map(|source| {
            source.get(key).map(|value| ResolvedValue {
                value,
                source: source.name(),
            })
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|resolved| resolved.value)
    }

    /// Comma separated source names, for diagnostics
    pub fn describe(&self) -> String {
        self.sources
            .iter()
            .map(ConfigSource::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
