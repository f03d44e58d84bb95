//! Boolean full-text index: term normalization, an open-addressing term
//! dictionary, delta-varint postings on disk, and an AND/OR/NOT query engine.

pub mod builder;
pub mod error;
pub mod hashmap;
pub mod persist;
pub mod postings;
pub mod query;
pub mod searcher;
pub mod tokenizer;
pub mod varint;

use serde::{Deserialize, Serialize};

pub use builder::{BuildStats, IndexBuilder};
pub use error::{IndexError, Result};
pub use searcher::Searcher;

pub type DocId = u32;

/// One row of the document table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    /// Name of the corpus source the document was enumerated from, e.g. `wikipedia_en`.
    pub source_tag: String,
    pub path: String,
}

/// Where a term's posting block lives inside `postings.bin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermInfo {
    pub offset: u64,
    pub doc_frequency: u32,
}
