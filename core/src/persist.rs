use crate::error::{IndexError, Result};
use crate::hashmap::TermDict;
use crate::postings::PostingList;
use crate::{varint, DocId, Document, TermInfo};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn docs(&self) -> PathBuf { self.root.join("docs.tsv") }
    pub fn dictionary(&self) -> PathBuf { self.root.join("dict.tsv") }
    pub fn postings(&self) -> PathBuf { self.root.join("postings.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn open_required(path: PathBuf) -> Result<File> {
    File::open(&path).map_err(|source| IndexError::MissingIndexFile { path, source })
}

/// Rows of a `\n`-terminated table, trailing `\r` removed. A row that is not
/// valid UTF-8 comes back as `None` so the caller can drop it.
fn table_rows(f: File) -> impl Iterator<Item = io::Result<Option<String>>> {
    BufReader::new(f).split(b'\n').map(|row| {
        let mut row = row?;
        if row.last() == Some(&b'\r') {
            row.pop();
        }
        Ok(String::from_utf8(row).ok())
    })
}

fn split_row(line: &str) -> Option<(&str, &str, &str)> {
    let mut fields = line.splitn(3, '\t');
    Some((fields.next()?, fields.next()?, fields.next()?))
}

/// Whether `doc` survives a trip through `docs.tsv`: the tag holds no tab and
/// neither field holds a line break.
fn fits_doc_row(doc: &Document) -> bool {
    let breaks = |s: &str| s.contains(['\n', '\r']);
    !doc.source_tag.contains('\t') && !breaks(&doc.source_tag) && !breaks(&doc.path)
}

pub fn save_docs(paths: &IndexPaths, docs: &[Document]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = BufWriter::new(File::create(paths.docs())?);
    for doc in docs {
        if !fits_doc_row(doc) {
            tracing::warn!(doc_id = doc.id, tag = ?doc.source_tag, path = ?doc.path, "document row will not load back intact");
        }
        writeln!(f, "{}\t{}\t{}", doc.id, doc.source_tag, doc.path)?;
    }
    f.flush()?;
    Ok(())
}

/// Loads the document table. Rows that are not UTF-8, lack two tabs, or carry
/// a non-numeric id are dropped.
pub fn load_docs(paths: &IndexPaths) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    for (lineno, row) in table_rows(open_required(paths.docs())?).enumerate() {
        let row = row?;
        let parsed = row.as_deref().and_then(split_row).and_then(|(id, tag, path)| {
            Some(Document { id: id.parse().ok()?, source_tag: tag.to_string(), path: path.to_string() })
        });
        match parsed {
            Some(doc) => docs.push(doc),
            None => tracing::debug!(lineno, "dropping malformed document row"),
        }
    }
    Ok(docs)
}

/// Writes `dict.tsv` and `postings.bin` from entries already in their final
/// order. Returns the number of postings bytes written.
pub fn save_dictionary_and_postings(paths: &IndexPaths, entries: &[(String, PostingList)]) -> Result<u64> {
    create_dir_all(&paths.root)?;
    let mut dict = BufWriter::new(File::create(paths.dictionary())?);
    let mut postings = BufWriter::new(File::create(paths.postings())?);
    let mut offset: u64 = 0;
    let mut block = Vec::new();
    for (term, list) in entries {
        block.clear();
        varint::encode_gaps(list.as_slice(), &mut block);
        writeln!(dict, "{}\t{}\t{}", term, offset, list.len())?;
        postings.write_all(&block)?;
        offset += block.len() as u64;
    }
    dict.flush()?;
    postings.flush()?;
    Ok(offset)
}

/// Loads `dict.tsv` into a fresh term dictionary. Rows that are not UTF-8,
/// miss a field, or hold a non-numeric offset/frequency are dropped.
pub fn load_dictionary(paths: &IndexPaths) -> Result<TermDict<TermInfo>> {
    let mut dict = TermDict::new();
    for (lineno, row) in table_rows(open_required(paths.dictionary())?).enumerate() {
        let row = row?;
        let parsed = row.as_deref().and_then(split_row).and_then(|(term, offset, df)| {
            Some((term, TermInfo { offset: offset.parse().ok()?, doc_frequency: df.parse().ok()? }))
        });
        match parsed {
            Some((term, info)) => *dict.get_or_insert(term, info) = info,
            None => tracing::debug!(lineno, "dropping malformed dictionary row"),
        }
    }
    Ok(dict)
}

/// Random-access reader over `postings.bin`.
pub struct PostingsReader<R> {
    inner: R,
}

impl PostingsReader<BufReader<File>> {
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        Ok(Self::new(BufReader::new(open_required(paths.postings())?)))
    }
}

impl<R: Read + Seek> PostingsReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Seeks to the term's block and decodes `doc_frequency` ids.
    pub fn read_block(&mut self, term: &str, info: TermInfo) -> Result<Vec<DocId>> {
        self.inner.seek(SeekFrom::Start(info.offset))?;
        varint::decode_gaps(&mut self.inner, info.doc_frequency).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData => {
                IndexError::CorruptPostings { term: term.to_string(), offset: info.offset }
            }
            _ => IndexError::Io(err),
        })
    }
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}
