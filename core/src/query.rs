//! Boolean query parsing and evaluation.
//!
//! A query string is tokenized, reordered into postfix with the usual
//! operator-precedence algorithm (`NOT` > `AND` > `OR`), and evaluated with a
//! stack of sorted doc id lists. Structural problems such as a dangling
//! operator only show up during evaluation.

use crate::error::{IndexError, Result};
use crate::postings::{complement, intersect, union};
use crate::tokenizer::{is_continuation_byte, is_word_byte, stem, MIN_TERM_LEN};
use crate::DocId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// A normalized term, stemmed exactly like indexed text.
    Term(String),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
}

impl QueryToken {
    fn precedence(&self) -> Option<u8> {
        match self {
            QueryToken::Not => Some(3),
            QueryToken::And => Some(2),
            QueryToken::Or => Some(1),
            _ => None,
        }
    }
}

/// Splits a query into tokens. Operator names match case-insensitively and
/// therefore can never be searched as terms; words that stem to fewer than
/// two characters are dropped.
pub fn tokenize_query(query: &str) -> Vec<QueryToken> {
    let bytes = query.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'(' {
            out.push(QueryToken::LeftParen);
            i += 1;
        } else if c == b')' {
            out.push(QueryToken::RightParen);
            i += 1;
        } else if is_word_byte(c) || is_continuation_byte(c) {
            let mut word = String::new();
            while i < bytes.len() && (is_word_byte(bytes[i]) || is_continuation_byte(bytes[i])) {
                word.push(bytes[i].to_ascii_lowercase() as char);
                i += 1;
            }
            match word.as_str() {
                "and" => out.push(QueryToken::And),
                "or" => out.push(QueryToken::Or),
                "not" => out.push(QueryToken::Not),
                _ => {
                    stem(&mut word);
                    if word.len() >= MIN_TERM_LEN {
                        out.push(QueryToken::Term(word));
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    out
}

/// Infix to postfix. Unbalanced parentheses are tolerated: a `)` without a
/// matching `(` does nothing and a leftover `(` is dropped.
pub fn to_postfix(tokens: Vec<QueryToken>) -> Vec<QueryToken> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut ops: Vec<QueryToken> = Vec::new();
    for tok in tokens {
        match tok {
            QueryToken::Term(_) => out.push(tok),
            QueryToken::LeftParen => ops.push(tok),
            QueryToken::RightParen => {
                while let Some(top) = ops.pop() {
                    if top == QueryToken::LeftParen {
                        break;
                    }
                    out.push(top);
                }
            }
            QueryToken::And | QueryToken::Or | QueryToken::Not => {
                let prec = tok.precedence();
                while let Some(top) = ops.last() {
                    if top.precedence().is_none() || top.precedence() < prec {
                        break;
                    }
                    out.extend(ops.pop());
                }
                ops.push(tok);
            }
        }
    }
    out.extend(ops.into_iter().rev().filter(|t| *t != QueryToken::LeftParen));
    out
}

pub fn parse(query: &str) -> Vec<QueryToken> {
    to_postfix(tokenize_query(query))
}

/// Supplies the sorted doc id list for a term; an unknown term yields an
/// empty list.
pub trait PostingSource {
    fn postings(&mut self, term: &str) -> Result<Vec<DocId>>;
}

impl PostingSource for HashMap<String, Vec<DocId>> {
    fn postings(&mut self, term: &str) -> Result<Vec<DocId>> {
        Ok(self.get(term).cloned().unwrap_or_default())
    }
}

fn pop_operand(stack: &mut Vec<Vec<DocId>>, op: &str) -> Result<Vec<DocId>> {
    stack.pop().ok_or_else(|| IndexError::BadQuery(format!("{op} is missing an operand")))
}

/// Runs a postfix token stream over `[0, doc_count)`.
pub fn evaluate<S: PostingSource + ?Sized>(postfix: &[QueryToken], source: &mut S, doc_count: u32) -> Result<Vec<DocId>> {
    let mut stack: Vec<Vec<DocId>> = Vec::new();
    for tok in postfix {
        match tok {
            QueryToken::Term(term) => stack.push(source.postings(term)?),
            QueryToken::Not => {
                let a = pop_operand(&mut stack, "NOT")?;
                stack.push(complement(&a, doc_count));
            }
            QueryToken::And => {
                let b = pop_operand(&mut stack, "AND")?;
                let a = pop_operand(&mut stack, "AND")?;
                stack.push(intersect(&a, &b));
            }
            QueryToken::Or => {
                let b = pop_operand(&mut stack, "OR")?;
                let a = pop_operand(&mut stack, "OR")?;
                stack.push(union(&a, &b));
            }
            QueryToken::LeftParen | QueryToken::RightParen => {}
        }
    }
    match (stack.pop(), stack.is_empty()) {
        (Some(result), true) => Ok(result),
        (None, _) => Err(IndexError::BadQuery("query has no terms".into())),
        (Some(_), false) => Err(IndexError::BadQuery(format!("{} operands left without an operator", stack.len() + 1))),
    }
}
