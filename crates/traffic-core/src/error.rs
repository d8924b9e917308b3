//! Error types for the traffic counter

use thiserror::Error;

/// Core error type for the traffic counter
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Entry and exit zone lists differ in length: {entry} entry, {exit} exit")]
    ZoneCountMismatch { entry: usize, exit: usize },

    #[error("Expected one label per exit zone: {labels} labels, {exits} exit zones")]
    LabelCountMismatch { labels: usize, exits: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn zone_count_mismatch(entry: usize, exit: usize) -> Self {
        Self::ZoneCountMismatch { entry, exit }
    }

    pub fn label_count_mismatch(labels: usize, exits: usize) -> Self {
        Self::LabelCountMismatch { labels, exits }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
