use std::path::PathBuf;

use thiserror::Error;

use crate::DocId;

/// Errors produced while building or querying an index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot open {}: {source}", path.display())]
    MissingIndexFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad query: {0}")]
    BadQuery(String),

    #[error("document ids must be contiguous: expected {expected}, got {got}")]
    NonContiguousDocId { expected: DocId, got: DocId },

    #[error("corrupt posting block for {term:?} at offset {offset}")]
    CorruptPostings { term: String, offset: u64 },

    #[error("meta file error: {0}")]
    Meta(#[from] serde_json::Error),
}

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    /// Process exit code for the command-line front ends.
    pub fn exit_code(&self) -> i32 {
        match self {
            IndexError::MissingIndexFile { .. } => 2,
            IndexError::BadQuery(_) => 3,
            _ => 1,
        }
    }

    pub fn is_bad_query(&self) -> bool {
        matches!(self, IndexError::BadQuery(_))
    }
}
