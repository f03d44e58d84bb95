//! Posting lists and the sorted-set algebra the query evaluator runs on.
//!
//! Every list handled here is strictly ascending with no duplicates.

use crate::DocId;

/// Ascending, duplicate-free ids of the documents containing one term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    docs: Vec<DocId>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `doc_id` unless it is already the last element. Only keeps the
    /// list sorted and unique when documents arrive in non-decreasing id order.
    pub fn push(&mut self, doc_id: DocId) {
        if self.docs.last() != Some(&doc_id) {
            self.docs.push(doc_id);
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn as_slice(&self) -> &[DocId] {
        &self.docs
    }
}

pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    out
}

pub fn union(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Every id in `[0, doc_count)` that is not in `a`.
pub fn complement(a: &[DocId], doc_count: u32) -> Vec<DocId> {
    let mut out = Vec::with_capacity((doc_count as usize).saturating_sub(a.len()));
    let mut j = 0;
    for id in 0..doc_count {
        if a.get(j) == Some(&id) {
            j += 1;
        } else {
            out.push(id);
        }
    }
    out
}

pub fn is_strictly_ascending(ids: &[DocId]) -> bool {
    ids.windows(2).all(|w| w[0] < w[1])
}
