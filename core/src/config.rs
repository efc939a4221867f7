use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Candidates handed to the provider per round, source excluded.
    pub candidate_pool_limit: usize,
    pub max_proposals: usize,
    pub min_similarity: f32,
    pub provider_timeout_ms: u64,
    /// Extra provider attempts after the first failure.
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl DiscoveryConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            candidate_pool_limit: 20,
            max_proposals: 5,
            min_similarity: 0.5,
            provider_timeout_ms: 30_000,
            retry_attempts: 0,
            retry_backoff_ms: 250,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RecommendationConfig {
    pub default_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { default_limit: 5 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VisualizationConfig {
    pub default_radius: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self { default_radius: 2 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub discovery: DiscoveryConfig,
    pub recommendations: RecommendationConfig,
    pub visualization: VisualizationConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Layers `default`, then `$RUN_MODE`, then `CATALOG_GRAPH__*` environment overrides.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        tracing::debug!(dir = %dir.display(), run_mode = %run_mode, "loading configuration");

        let builder = Config::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(
                File::with_name(&dir.join(&run_mode).to_string_lossy()).required(false),
            )
            .add_source(Environment::with_prefix("CATALOG_GRAPH").separator("__"));

        builder.build()?.try_deserialize()
    }
}
