//! Model errors definition.

use std::path::PathBuf;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot open snapshot file {0}: {1}")]
    SnapshotOpen(PathBuf, std::io::Error),

    #[error("malformed snapshot: {0}")]
    SnapshotFormat(#[from] serde_json::Error),

    #[error("malformed procedure signature: {0}")]
    BadSignature(String),
}
