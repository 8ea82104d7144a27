//! Error types for the doxnav core library.

use crate::models::QualifiedName;

/// Top-level error enum for the doxnav core library.
///
/// Every loader fails fast: the first error aborts the whole load and no
/// partial catalog, graph, or tree is ever exposed.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("duplicate entity: {0}")]
    DuplicateEntity(QualifiedName),

    #[error("duplicate anchor: {0:?}")]
    DuplicateAnchor(String),

    #[error("dangling reference: {0}")]
    DanglingReference(QualifiedName),

    #[error("inheritance cycle through: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    #[error("entity not found: {0}")]
    NotFound(QualifiedName),

    #[error("shard lookup against an empty table")]
    OutOfRange,

    #[error("shard key out of order at position {position}: {key:?}")]
    UnsortedShardKey { position: usize, key: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;
