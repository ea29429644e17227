//! Error taxonomy for metadata production.
//!
//! Per-file problems during discovery are logged and skipped; everything
//! surfaced through [`MetaError`] aborts the run. There is no partial or
//! resumable metadata state.

use jetmeta_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetaError {
    /// A class's reweight histogram has too few events in its tail bins to
    /// be trustworthy.
    #[error("not enough events in the reweight tail bins for label '{label}': {hist:?}")]
    InsufficientData { label: String, hist: Vec<f64> },
    /// A requested variable, label, or group has no match in the
    /// discovered schema, or the input set is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A variable-group pattern failed to compile.
    #[error("invalid pattern '{pattern}' in group '{group}': {source}")]
    Pattern {
        group: String,
        pattern: String,
        source: regex::Error,
    },
    /// The descriptor document cannot be written or parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, MetaError>;
