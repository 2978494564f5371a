use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::duplicates::TagMounts;

pub const DEFAULT_WORKERS: usize = 2;
/// Setting this too high lets the producer read far ahead of the workers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_ETA_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_ETA_WINDOW: usize = 12;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_eta_interval_secs")]
    pub eta_interval_secs: u64,
    /// Location tag -> mount point of that storage root.
    #[serde(default)]
    pub mounts: HashMap<String, String>,
    #[serde(default)]
    pub stats_csv: Option<String>,
}

fn default_database_path() -> String {
    "archive_keeper.db".to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_eta_interval_secs() -> u64 {
    DEFAULT_ETA_INTERVAL_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            ignore_patterns: Vec::new(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            eta_interval_secs: DEFAULT_ETA_INTERVAL_SECS,
            mounts: HashMap::new(),
            stats_csv: None,
        }
    }
}

impl AppConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            workers: self.workers.max(1),
            queue_capacity: self.queue_capacity.max(1),
            eta_interval: Duration::from_secs(self.eta_interval_secs.max(1)),
            eta_window: DEFAULT_ETA_WINDOW,
            ignore_patterns: self.ignore_patterns.clone(),
        }
    }

    pub fn tag_mounts(&self) -> TagMounts {
        self.mounts
            .iter()
            .map(|(tag, root)| (tag.clone(), PathBuf::from(root)))
            .collect()
    }
}

/// Load `Config.toml` (optional) overlaid with `ARCHIVE_KEEPER_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("ARCHIVE_KEEPER").separator("__"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Tuning knobs for one manage-files run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub workers: usize,
    pub queue_capacity: usize,
    pub eta_interval: Duration,
    pub eta_window: usize,
    pub ignore_patterns: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        AppConfig::default().pipeline_settings()
    }
}
