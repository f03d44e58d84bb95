//! Term normalization shared by the index builder and the query parser.
//!
//! Both sides must go through [`stem`]; a term normalized differently at
//! query time silently misses its postings.

use std::iter::FusedIterator;

/// Shortest token (and shortest stemmed term) that is ever indexed.
pub const MIN_TERM_LEN: usize = 2;

#[inline]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

#[inline]
pub fn is_continuation_byte(b: u8) -> bool {
    b == b'-' || b == b'\''
}

/// Lazy scan over one line of raw bytes, yielding lowercase word candidates.
///
/// Hyphens and apostrophes only extend a candidate that already has at least
/// one character. Anything else (including every non-ASCII byte) ends the
/// current candidate.
pub struct Tokens<'a> {
    line: &'a [u8],
    pos: usize,
    buf: String,
}

pub fn tokenize_line(line: &[u8]) -> Tokens<'_> {
    Tokens { line, pos: 0, buf: String::with_capacity(32) }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(&raw) = self.line.get(self.pos) {
            self.pos += 1;
            let b = raw.to_ascii_lowercase();
            if is_word_byte(b) || (is_continuation_byte(b) && !self.buf.is_empty()) {
                self.buf.push(b as char);
            } else if let Some(token) = self.flush() {
                return Some(token);
            }
        }
        self.flush()
    }
}

impl<'a> FusedIterator for Tokens<'a> {}

impl<'a> Tokens<'a> {
    fn flush(&mut self) -> Option<String> {
        if self.buf.len() >= MIN_TERM_LEN {
            Some(std::mem::take(&mut self.buf))
        } else {
            self.buf.clear();
            None
        }
    }
}

fn chop(word: &mut String, n: usize) {
    word.truncate(word.len() - n);
}

/// Ad hoc English suffix stripping, applied in place to a lowercase token.
///
/// Every rule is gated on the length the word has at that point in the chain,
/// so an earlier strip can disable a later rule.
pub fn stem(word: &mut String) {
    if word.len() < 4 {
        return;
    }
    if word.ends_with("'s") && word.len() > 3 {
        chop(word, 2);
    }

    if word.ends_with("sses") && word.len() > 6 {
        chop(word, 2);
        return;
    }
    if word.ends_with("ies") && word.len() > 5 {
        chop(word, 3);
        word.push('y');
        return;
    }
    if word.ends_with('s') && !word.ends_with("ss") && word.len() > 4 {
        chop(word, 1);
    }

    if word.ends_with("ing") && word.len() > 6 {
        chop(word, 3);
        return;
    }
    if word.ends_with("ed") && word.len() > 5 {
        chop(word, 2);
        return;
    }

    if word.ends_with("ly") && word.len() > 6 {
        chop(word, 2);
        return;
    }
    if word.ends_with("ment") && word.len() > 8 {
        chop(word, 4);
    }
}

pub fn stemmed(word: &str) -> String {
    let mut w = word.to_ascii_lowercase();
    stem(&mut w);
    w
}

/// Tokenize, stem, and drop anything that became too short: the exact term
/// stream the builder indexes for one line.
pub fn normalize_line(line: &[u8]) -> impl Iterator<Item = String> + '_ {
    tokenize_line(line).filter_map(|mut token| {
        stem(&mut token);
        (token.len() >= MIN_TERM_LEN).then_some(token)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        tokenize_line(line.as_bytes()).collect()
    }

    #[test]
    fn splits_and_lowercases() {
        assert_eq!(toks("The boxes, are RED!"), vec!["the", "boxes", "are", "red"]);
    }

    #[test]
    fn continuation_chars_never_lead() {
        assert_eq!(toks("-well-known 'tis rock'n'roll"), vec!["well-known", "tis", "rock'n'roll"]);
        assert_eq!(toks("--- ''"), Vec::<String>::new());
    }

    #[test]
    fn drops_single_char_tokens() {
        assert_eq!(toks("a b cd e"), vec!["cd"]);
    }

    #[test]
    fn non_ascii_bytes_separate_tokens() {
        assert_eq!(toks("café au lait"), vec!["caf", "au", "lait"]);
    }

    #[test]
    fn final_flush_at_end_of_line() {
        let mut it = tokenize_line(b"ab");
        assert_eq!(it.next().as_deref(), Some("ab"));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn stem_rules() {
        let cases = [
            ("red", "red"),
            ("boxes", "boxe"),
            ("classes", "class"),
            ("ponies", "pony"),
            ("dies", "dies"),
            ("glass", "glass"),
            ("walking", "walk"),
            ("walked", "walk"),
            ("quickly", "quick"),
            ("government", "govern"),
            ("nation", "nation"),
            ("john's", "john"),
            ("runnings", "runn"),
            ("moment", "moment"),
        ];
        for (input, want) in cases {
            assert_eq!(stemmed(input), want, "stem({input})");
        }
    }

    #[test]
    fn stem_uses_current_length() {
        // "'s" strip leaves "sing" (4), too short for the "ing" rule.
        assert_eq!(stemmed("sing's"), "sing");
        // "s" strip falls through to the "ed" rule.
        assert_eq!(stemmed("cooleds"), "cool");
    }

    #[test]
    fn normalize_filters_short_stems() {
        let terms: Vec<String> = normalize_line(b"Red boxes everywhere").collect();
        assert_eq!(terms, vec!["red", "boxe", "everywhere"]);
    }
}
