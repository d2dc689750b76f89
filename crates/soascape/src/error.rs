use std::fmt;

use thiserror::Error;

/// High-level error type shared across the reporting pipeline.
///
/// Variants follow the run's failure taxonomy: `Setup` aborts a run before
/// any report is written, everything else is recoverable at the granularity
/// of one report or one endpoint.
#[derive(Debug, Error)]
pub enum SoascapeError {
    #[error("setup error: {0}")]
    Setup(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("report error: {0}")]
    Report(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("endpoint error: {0}")]
    Endpoint(String),
    #[error("xml error: {0}")]
    Xml(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for SoascapeError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for SoascapeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Catalog(err.to_string())
    }
}

impl SoascapeError {
    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            SoascapeError::Setup(msg) => SoascapeError::Setup(format!("{ctx}: {msg}")),
            SoascapeError::Catalog(msg) => SoascapeError::Catalog(format!("{ctx}: {msg}")),
            SoascapeError::Report(msg) => SoascapeError::Report(format!("{ctx}: {msg}")),
            SoascapeError::Transform(msg) => SoascapeError::Transform(format!("{ctx}: {msg}")),
            SoascapeError::Endpoint(msg) => SoascapeError::Endpoint(format!("{ctx}: {msg}")),
            SoascapeError::Xml(msg) => SoascapeError::Xml(format!("{ctx}: {msg}")),
            SoascapeError::Io(err) => SoascapeError::Io(err),
        }
    }
}
