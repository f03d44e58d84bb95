//! Single-pass index construction.
//!
//! Documents must arrive in id order starting at 0: a posting list only
//! stays duplicate-free because each new id is compared against the list's
//! last element.

use crate::error::{IndexError, Result};
use crate::hashmap::TermDict;
use crate::persist::{save_dictionary_and_postings, save_docs, save_meta, IndexPaths, MetaFile, INDEX_FORMAT_VERSION};
use crate::postings::PostingList;
use crate::tokenizer::normalize_line;
use crate::{DocId, Document};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

/// Summary counters reported after a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub num_docs: u32,
    pub num_terms: u32,
    pub postings_bytes: u64,
}

#[derive(Default)]
pub struct IndexBuilder {
    dictionary: TermDict<PostingList>,
    docs: Vec<Document>,
    skipped: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    /// Documents whose content could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn next_id(&self) -> DocId {
        self.docs.len() as DocId
    }

    /// Registers `doc` and indexes every line of `reader` under its id.
    pub fn add_document<R: BufRead>(&mut self, doc: Document, reader: R) -> Result<()> {
        let expected = self.next_id();
        if doc.id != expected {
            return Err(IndexError::NonContiguousDocId { expected, got: doc.id });
        }
        let doc_id = doc.id;
        self.docs.push(doc);
        self.ingest(doc_id, reader)?;
        Ok(())
    }

    /// Assigns the next id to the file at `path` and indexes it. A file that
    /// cannot be opened or read keeps its row in the document table but
    /// contributes no terms.
    pub fn add_file(&mut self, source_tag: &str, path: &Path) -> DocId {
        let doc_id = self.next_id();
        let stored_path = match path.to_str() {
            Some(p) => p.to_string(),
            None => {
                tracing::warn!(doc_id, path = %path.display(), "path is not valid UTF-8, stored lossily");
                path.to_string_lossy().into_owned()
            }
        };
        self.docs.push(Document { id: doc_id, source_tag: source_tag.to_string(), path: stored_path });

        let result = File::open(path).and_then(|f| self.ingest(doc_id, BufReader::new(f)));
        if let Err(err) = result {
            tracing::warn!(doc_id, path = %path.display(), error = %err, "skipping unreadable document");
            self.skipped += 1;
        }
        doc_id
    }

    fn ingest<R: BufRead>(&mut self, doc_id: DocId, mut reader: R) -> std::io::Result<()> {
        let mut line = Vec::with_capacity(256);
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            for term in normalize_line(&line) {
                self.dictionary.get_or_insert(&term, PostingList::new()).push(doc_id);
            }
        }
        Ok(())
    }

    /// Sorts the terms and writes the document table, dictionary, postings,
    /// and `meta.json` under `paths.root`.
    pub fn finish(self, paths: &IndexPaths) -> Result<BuildStats> {
        let mut entries = self.dictionary.into_entries();
        entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        save_docs(paths, &self.docs)?;
        let postings_bytes = save_dictionary_and_postings(paths, &entries)?;

        let stats = BuildStats {
            num_docs: self.docs.len() as u32,
            num_terms: entries.len() as u32,
            postings_bytes,
        };
        let meta = MetaFile {
            num_docs: stats.num_docs,
            num_terms: stats.num_terms,
            created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            version: INDEX_FORMAT_VERSION,
        };
        save_meta(paths, &meta)?;

        tracing::info!(num_docs = stats.num_docs, num_terms = stats.num_terms, skipped = self.skipped, "index written");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn doc(id: DocId) -> Document {
        Document { id, source_tag: "test".into(), path: format!("doc{id}.txt") }
    }

    #[test]
    fn accumulates_unique_ids_per_term() {
        let mut b = IndexBuilder::new();
        b.add_document(doc(0), "red red\nred fish".as_bytes()).unwrap();
        b.add_document(doc(1), "blue fish".as_bytes()).unwrap();
        assert_eq!(b.dictionary.find("red").unwrap().as_slice(), &[0]);
        assert_eq!(b.dictionary.find("fish").unwrap().as_slice(), &[0, 1]);
        assert_eq!(b.num_terms(), 3);
    }

    #[test]
    fn rejects_out_of_order_ids() {
        let mut b = IndexBuilder::new();
        let err = b.add_document(doc(1), "text".as_bytes()).unwrap_err();
        assert!(matches!(err, IndexError::NonContiguousDocId { expected: 0, got: 1 }));
    }

    #[test]
    fn terms_never_span_lines() {
        let mut b = IndexBuilder::new();
        b.add_document(doc(0), "abc\ndef".as_bytes()).unwrap();
        assert!(b.dictionary.find("abcdef").is_none());
        assert!(b.dictionary.find("abc").is_some());
    }

    #[test]
    fn unreadable_file_keeps_its_row() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "present").unwrap();

        let mut b = IndexBuilder::new();
        assert_eq!(b.add_file("src", &dir.path().join("missing.txt")), 0);
        assert_eq!(b.add_file("src", &good), 1);
        assert_eq!(b.skipped(), 1);
        assert_eq!(b.num_docs(), 2);
        assert_eq!(b.dictionary.find("present").unwrap().as_slice(), &[1]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_name_is_still_indexed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
        if fs::write(&path, "espresso").is_err() {
            // Some filesystems refuse non-UTF-8 names.
            return;
        }
        let mut b = IndexBuilder::new();
        assert_eq!(b.add_file("src", &path), 0);
        assert_eq!(b.skipped(), 0);
        assert!(b.docs[0].path.ends_with("caf\u{fffd}.txt"));
        assert_eq!(b.dictionary.find("espresso").unwrap().as_slice(), &[0]);
    }

    #[test]
    fn finish_with_no_documents_writes_empty_tables() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let stats = IndexBuilder::new().finish(&paths).unwrap();
        assert_eq!(stats, BuildStats { num_docs: 0, num_terms: 0, postings_bytes: 0 });
        for file in [paths.docs(), paths.dictionary(), paths.postings()] {
            assert_eq!(fs::metadata(file).unwrap().len(), 0);
        }
    }

    #[test]
    fn finish_creates_output_dir_and_writes_sorted_terms() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("out").join("index"));
        let mut b = IndexBuilder::new();
        b.add_document(doc(0), "zeta alpha mid".as_bytes()).unwrap();
        let stats = b.finish(&paths).unwrap();
        assert_eq!(stats, BuildStats { num_docs: 1, num_terms: 3, postings_bytes: 3 });

        let dict = fs::read_to_string(paths.dictionary()).unwrap();
        let terms: Vec<&str> = dict.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(terms, vec!["alpha", "mid", "zeta"]);
        assert_eq!(fs::read_to_string(paths.docs()).unwrap(), "0\ttest\tdoc0.txt\n");
        assert!(paths.meta().exists());
    }
}
