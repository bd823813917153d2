//! TOML configuration for the CLI.
//!
//! ```toml
//! [matching]
//! generation_threshold = 0.3
//! incremental_threshold = 0.5
//! high_confidence_threshold = 0.8
//!
//! [events]
//! agent_id = "schema-mapping-local"
//! topic = "mapping.events"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use schemap_map::MatchingOptions;
use schemap_sync::{DEFAULT_TOPIC, ServiceConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchingOptions,
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub agent_id: Option<String>,
    pub topic: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            agent_id: None,
            topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path` when given, otherwise returns defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            agent_id: self.events.agent_id.clone(),
            topic: self.events.topic.clone(),
            matching: self.matching,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("[matching]\nincremental_threshold = 0.7\n").unwrap();
        assert_eq!(config.matching.incremental_threshold, 0.7);
        assert_eq!(config.matching.generation_threshold, 0.3);
        assert_eq!(config.events.topic, DEFAULT_TOPIC);
        assert_eq!(config.events.agent_id, None);
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml::from_str::<AppConfig>(&text).unwrap(), config);
    }
}
