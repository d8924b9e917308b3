//! Runner configuration

use traffic_counter::ZoneConfig;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runner configuration, layered from an optional file and `TRAFFIC__*` variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Entry/exit zone geometry
    pub zones: ZoneConfig,
    /// Where the plain-text summary is written at the end of a run
    pub summary_path: PathBuf,
    /// Interval between progress log lines
    pub progress_interval_ms: u64,
    /// Optional Prometheus text dump written at the end of a run
    pub metrics_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zones: ZoneConfig::reference(),
            summary_path: PathBuf::from("Traffic summary counts.txt"),
            progress_interval_ms: 1000,
            metrics_path: None,
        }
    }
}

impl Settings {
    /// Load settings from `.env`, an optional config file and the environment
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(environment());

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.zones.validate()?;
        Ok(settings)
    }
}

/// `TRAFFIC__SUMMARY_PATH`, `TRAFFIC__ZONES__ANCHOR`, ...
fn environment() -> Environment {
    Environment::with_prefix("TRAFFIC")
        .separator("__")
        .try_parsing(true)
}

// ============================================================================
// TESTS
// ============================================================================
