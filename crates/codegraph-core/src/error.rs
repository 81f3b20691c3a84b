use thiserror::Error;

/// The error kinds the analytics core raises. Every variant carries the
/// repo_id and operation that was in flight, per the user-visible failure
/// convention: every error identifies the repo and operation.
#[derive(Error, Debug)]
pub enum CodeGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no snapshot for repo '{repo_id}'")]
    SnapshotNotFound { repo_id: String },

    #[error("snapshot for repo '{repo_id}' failed an integrity check during {operation}: {detail}")]
    SnapshotCorrupt {
        repo_id: String,
        operation: String,
        detail: String,
    },

    #[error("'{operation}' on repo '{repo_id}' needs table '{table}', which this snapshot doesn't have")]
    SchemaMissing {
        repo_id: String,
        operation: String,
        table: String,
    },

    #[error("node '{hash}' not found in repo '{repo_id}'")]
    NodeNotFound { repo_id: String, hash: String },

    #[error("invalid argument to '{operation}': {detail}")]
    InvalidArgument { operation: String, detail: String },

    #[error("'{operation}' on repo '{repo_id}' failed: {detail}")]
    KernelFailure {
        repo_id: String,
        operation: String,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, CodeGraphError>;
