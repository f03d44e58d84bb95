use crate::error::Result;
use crate::hashmap::TermDict;
use crate::persist::{load_dictionary, load_docs, IndexPaths, PostingsReader};
use crate::query::{evaluate, parse, PostingSource};
use crate::{DocId, Document, TermInfo};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A loaded index: the document table and dictionary in memory, postings
/// read from disk one block at a time.
pub struct Searcher {
    docs: Vec<Document>,
    dictionary: TermDict<TermInfo>,
    postings: PostingsReader<BufReader<File>>,
}

struct DiskPostings<'a> {
    dictionary: &'a TermDict<TermInfo>,
    reader: &'a mut PostingsReader<BufReader<File>>,
}

impl PostingSource for DiskPostings<'_> {
    fn postings(&mut self, term: &str) -> Result<Vec<DocId>> {
        match self.dictionary.find(term) {
            Some(&info) => self.reader.read_block(term, info),
            None => Ok(Vec::new()),
        }
    }
}

impl Searcher {
    /// Opens the three required index files under `index_dir`.
    pub fn open<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        let paths = IndexPaths::new(index_dir);
        let docs = load_docs(&paths)?;
        let dictionary = load_dictionary(&paths)?;
        let postings = PostingsReader::open(&paths)?;
        tracing::debug!(num_docs = docs.len(), num_terms = dictionary.len(), root = %paths.root.display(), "index loaded");
        Ok(Self { docs, dictionary, postings })
    }

    /// Size of the universe `NOT` complements against.
    pub fn doc_count(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.docs.binary_search_by_key(&id, |d| d.id).ok().map(|i| &self.docs[i])
    }

    pub fn term_info(&self, term: &str) -> Option<TermInfo> {
        self.dictionary.find(term).copied()
    }

    /// Decoded posting list for an already normalized term.
    pub fn postings(&mut self, term: &str) -> Result<Vec<DocId>> {
        self.disk().postings(term)
    }

    /// Evaluates a boolean query, returning matching ids in ascending order.
    pub fn search(&mut self, query: &str) -> Result<Vec<DocId>> {
        let postfix = parse(query);
        let doc_count = self.doc_count();
        evaluate(&postfix, &mut self.disk(), doc_count)
    }

    fn disk(&mut self) -> DiskPostings<'_> {
        DiskPostings { dictionary: &self.dictionary, reader: &mut self.postings }
    }
}
