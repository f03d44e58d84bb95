use boolsearch_core::query::{tokenize_query, QueryToken};
use boolsearch_core::tokenizer::{normalize_line, stemmed};

#[test]
fn query_terms_match_indexed_terms() {
    let words = [
        "Boxes", "classes", "ponies", "walking", "walked", "quickly", "government", "runnings",
        "John's", "well-known", "rock'n'roll", "nation", "dies", "glass", "x86", "everywhere",
    ];
    for w in words {
        let indexed: Vec<String> = normalize_line(w.as_bytes()).collect();
        let queried: Vec<QueryToken> = tokenize_query(w);
        let queried: Vec<String> = queried
            .into_iter()
            .map(|t| match t {
                QueryToken::Term(s) => s,
                other => panic!("{w} parsed as {other:?}"),
            })
            .collect();
        assert_eq!(indexed, queried, "normalization differs for {w}");
    }
}

#[test]
fn it_lowercases_and_stems_lines() {
    let terms: Vec<String> = normalize_line(b"The boxes are RED\r\n").collect();
    assert_eq!(terms, vec!["the", "boxe", "are", "red"]);
}

#[test]
fn stemmer_has_no_tion_rule() {
    assert_eq!(stemmed("information"), "information");
    assert_eq!(stemmed("stations"), "station");
}
