//! Detection source error types

use thiserror::Error;

/// Errors raised while reading tracked detections
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    pub fn parse(line: usize, source: serde_json::Error) -> Self {
        Self::Parse { line, source }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
