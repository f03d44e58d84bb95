//! Corpus discovery: turns a list of tagged source roots into the ordered
//! document feed the builder expects.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSource {
    pub tag: String,
    pub root: PathBuf,
}

impl CorpusSource {
    pub fn new(tag: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self { tag: tag.into(), root: root.into() }
    }

    /// Parses `TAG=PATH`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (tag, root) = spec
            .split_once('=')
            .filter(|(tag, root)| !tag.is_empty() && !root.is_empty())
            .ok_or_else(|| anyhow!("expected TAG=PATH, got {spec:?}"))?;
        Ok(Self::new(tag, root))
    }
}

/// One source per tag, each rooted at `input_dir/<tag>`.
pub fn sources_under(input_dir: &Path, tags: &[String]) -> Vec<CorpusSource> {
    tags.iter().map(|tag| CorpusSource::new(tag.clone(), input_dir.join(tag))).collect()
}

/// Lists the `.txt` files directly under each root, sources in the given
/// order and files sorted by name within a source. The position of a file in
/// the returned list is its document id.
pub fn enumerate(sources: &[CorpusSource]) -> Vec<(String, PathBuf)> {
    let mut files = Vec::new();
    for source in sources {
        if !source.root.is_dir() {
            tracing::warn!(tag = %source.tag, root = %source.root.display(), "source directory not found, skipping");
            continue;
        }
        let before = files.len();
        for entry in WalkDir::new(&source.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if entry.file_type().is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push((source.tag.clone(), p.to_path_buf()));
            }
        }
        tracing::debug!(tag = %source.tag, count = files.len() - before, "enumerated source");
    }
    files
}
