//! Integration tests for the CSS tokenizer.

use quarry_css::LexError;
use quarry_css::tokenizer::{CSSToken, CSSTokenizer, HashType, NumericType, tokenize};
use quickcheck_macros::quickcheck;

/// Helper to tokenize a string and return the tokens
fn tokens(input: &str) -> Vec<CSSToken> {
    let mut tokenizer = CSSTokenizer::new(input);
    tokenizer.run().unwrap();
    tokenizer.into_tokens()
}

/// Helper to render tokens back to source
fn source(input: &str) -> String {
    tokens(input).iter().map(CSSToken::to_source).collect()
}

// ========== token kinds ==========

#[test]
fn test_whitespace() {
    let tokens = tokens("   \t\n  ");
    assert_eq!(tokens, vec![CSSToken::Whitespace, CSSToken::EOF]);
}

#[test]
fn test_ident() {
    assert_eq!(tokens("button"), vec![CSSToken::ident("button"), CSSToken::EOF]);
}

#[test]
fn test_ident_with_hyphen_and_underscore() {
    assert_eq!(tokens("data-test_id")[0], CSSToken::ident("data-test_id"));
    assert_eq!(tokens("--custom")[0], CSSToken::ident("--custom"));
}

#[test]
fn test_function() {
    assert_eq!(tokens("has-text(")[0], CSSToken::function("has-text"));
}

#[test]
fn test_hash_id_and_unrestricted() {
    assert_eq!(tokens("#main")[0], CSSToken::hash_id("main"));
    assert_eq!(
        tokens("#1st")[0],
        CSSToken::Hash {
            value: "1st".to_string(),
            hash_type: HashType::Unrestricted,
        }
    );
}

#[test]
fn test_strings() {
    assert_eq!(tokens("\"hello\"")[0], CSSToken::string("hello"));
    assert_eq!(tokens("'it''s'")[..2], [CSSToken::string("it"), CSSToken::string("s")]);
    assert_eq!(tokens(r#""a\"b""#)[0], CSSToken::string("a\"b"));
}

#[test]
fn test_string_with_newline_is_bad_string() {
    let tokens = tokens("\"abc\ndef");
    assert_eq!(tokens[0], CSSToken::BadString);
}

#[test]
fn test_numbers_keep_repr() {
    match &tokens("1.50")[0] {
        CSSToken::Number {
            value,
            numeric_type,
            repr,
        } => {
            assert!((value - 1.5).abs() < f64::EPSILON);
            assert_eq!(*numeric_type, NumericType::Number);
            assert_eq!(repr, "1.50");
        }
        other => panic!("Expected Number token, got {other:?}"),
    }
    assert_eq!(tokens("-3")[0], CSSToken::integer(-3));
    assert_eq!(tokens("+3")[0].to_source(), "+3");
}

#[test]
fn test_percentage_and_dimension() {
    assert!(matches!(&tokens("50%")[0], CSSToken::Percentage { repr, .. } if repr == "50"));
    assert!(matches!(
        &tokens("2n")[0],
        CSSToken::Dimension { repr, unit, .. } if repr == "2" && unit == "n"
    ));
}

#[test]
fn test_match_tokens() {
    let kinds: Vec<CSSToken> = tokens("~= |= ^= $= *= ||")
        .into_iter()
        .filter(|t| !t.is_whitespace())
        .collect();
    assert_eq!(
        kinds,
        vec![
            CSSToken::IncludeMatch,
            CSSToken::DashMatch,
            CSSToken::PrefixMatch,
            CSSToken::SuffixMatch,
            CSSToken::SubstringMatch,
            CSSToken::Column,
            CSSToken::EOF,
        ]
    );
}

#[test]
fn test_lone_match_characters_are_delims() {
    assert_eq!(tokens("*")[0], CSSToken::delim('*'));
    assert_eq!(tokens("|")[0], CSSToken::delim('|'));
    assert_eq!(tokens("~")[0], CSSToken::delim('~'));
    assert_eq!(tokens(">")[0], CSSToken::delim('>'));
}

#[test]
fn test_cdo_cdc() {
    assert_eq!(tokens("<!--")[0], CSSToken::CDO);
    assert_eq!(tokens("-->")[0], CSSToken::CDC);
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        tokens("a/* comment */b"),
        vec![CSSToken::ident("a"), CSSToken::ident("b"), CSSToken::EOF]
    );
}

#[test]
fn test_url() {
    assert_eq!(tokens("url(foo.png)")[0], CSSToken::Url("foo.png".to_string()));
    assert_eq!(tokens("url(\"foo.png\")")[0], CSSToken::function("url"));
}

#[test]
fn test_escapes_in_ident() {
    assert_eq!(tokens("\\31 23")[0], CSSToken::ident("123"));
    assert_eq!(tokens("a\\.b")[0], CSSToken::ident("a.b"));
}

#[test]
fn test_preprocessing_replaces_null() {
    assert_eq!(tokens("a\0b")[0], CSSToken::ident("a\u{FFFD}b"));
}

// ========== errors ==========

#[test]
fn test_unterminated_string_is_error() {
    assert_eq!(
        tokenize("div \"abc"),
        Err(LexError::UnterminatedString { position: 4 })
    );
}

#[test]
fn test_escape_beyond_max_code_point_is_error() {
    let err = tokenize("\\110000").unwrap_err();
    assert!(matches!(err, LexError::InvalidEscape { position: 0, .. }));
    assert!(err.to_string().contains("U+10FFFF"));
}

#[test]
fn test_surrogate_escape_becomes_replacement() {
    assert_eq!(tokens("\\d800")[0], CSSToken::ident("\u{FFFD}"));
}

// ========== to_source ==========

#[test]
fn test_to_source_canonical_forms() {
    assert_eq!(source("div  >  span"), "div > span");
    assert_eq!(source("[data-x='1']"), "[data-x=\"1\"]");
    assert_eq!(source("#main.item"), "#main.item");
    assert_eq!(source("a\\.b"), "a\\.b");
    assert_eq!(source("10px"), "10px");
    assert_eq!(source("url(x)"), "url(\"x\")");
    assert_eq!(source("[a^=b]"), "[a^=b]");
}

#[test]
fn test_to_source_escapes_leading_digit_ident() {
    assert_eq!(source("\\31 a"), "\\31 a");
}

// ========== properties ==========

#[quickcheck]
fn prop_tokenize_is_total(input: String) -> bool {
    match tokenize(&input) {
        Ok(tokens) => tokens.last() == Some(&CSSToken::EOF),
        Err(LexError::UnterminatedString { .. } | LexError::InvalidEscape { .. }) => true,
    }
}

#[quickcheck]
fn prop_escaped_ident_reads_back(input: String) -> bool {
    // A lone "-" is a delim however it is written.
    if input.is_empty() || input == "-" || input.contains('\0') {
        return true;
    }
    let escaped = quarry_css::tokenizer::escape_ident(&input);
    tokenize(&escaped).is_ok_and(|tokens| tokens.first() == Some(&CSSToken::ident(input)))
}
