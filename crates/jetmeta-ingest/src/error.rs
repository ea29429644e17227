//! Error types for ingestion.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("file {path} holds tree '{found}', expected '{expected}'")]
    TreeMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("field '{field}' not found in {path}")]
    MissingField { path: PathBuf, field: String },
    #[error("cannot parse value '{value}' for field '{field}' in {path}")]
    ParseValue {
        path: PathBuf,
        field: String,
        value: String,
    },
    #[error("field '{field}' in {path} is {found:?} but was discovered as {expected:?}")]
    KindMismatch {
        path: PathBuf,
        field: String,
        expected: jetmeta_model::FieldKind,
        found: jetmeta_model::FieldKind,
    },
    #[error("cannot concatenate batches: {0}")]
    BatchMismatch(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
