use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, XgressError>;

/// Unified error type for xgress.
#[derive(Error, Debug)]
pub enum XgressError {
    /// The YAML stream could not be parsed. Documents before `document` were
    /// already ingested; the rest of the stream is dropped.
    #[error("Malformed document stream at document {document}: {source}")]
    MalformedStream {
        document: usize,
        #[source]
        source: serde_yaml::Error,
    },

    /// A single document is not shaped like a NetworkPolicy.
    #[error("Document {document} is not a NetworkPolicy resource: {reason}")]
    NonConforming { document: usize, reason: String },

    #[error("Cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl XgressError {
    /// Whether the error only affects a single resource and processing may go on.
    pub fn is_resource_level(&self) -> bool {
        matches!(self, XgressError::NonConforming { .. })
    }
}

impl From<figment::Error> for XgressError {
    fn from(e: figment::Error) -> Self {
        XgressError::Config(e.to_string())
    }
}
