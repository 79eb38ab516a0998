//! Integration tests for the selector-subset parser.

use quarry_css::{
    CUSTOM_CSS_NAMES, ClauseCombinator, CssFunctionArgument, CssParseError, parse_css,
};

fn parse(selector: &str) -> quarry_css::ParsedCss {
    parse_css(selector, CUSTOM_CSS_NAMES).unwrap()
}

// ========== structure ==========

#[test]
fn test_single_compound() {
    let parsed = parse("div.item#main");
    assert_eq!(parsed.selector.len(), 1);
    let simples = &parsed.selector[0].simples;
    assert_eq!(simples.len(), 1);
    assert_eq!(simples[0].selector.css.as_deref(), Some("div.item#main"));
    assert!(simples[0].selector.functions.is_empty());
    assert!(parsed.names.is_empty());
}

#[test]
fn test_combinators() {
    let parsed = parse("ul > li + li ~ span a");
    let simples = &parsed.selector[0].simples;
    let combinators: Vec<ClauseCombinator> = simples.iter().map(|s| s.combinator).collect();
    assert_eq!(
        combinators,
        vec![
            ClauseCombinator::Child,
            ClauseCombinator::NextSibling,
            ClauseCombinator::SubsequentSibling,
            ClauseCombinator::Descendant,
            ClauseCombinator::Descendant,
        ]
    );
    assert_eq!(simples[4].selector.css.as_deref(), Some("a"));
}

#[test]
fn test_selector_list() {
    let parsed = parse("button, a.link");
    assert_eq!(parsed.selector.len(), 2);
    assert_eq!(
        parsed.selector[1].simples[0].selector.css.as_deref(),
        Some("a.link")
    );
}

#[test]
fn test_attribute_source_is_normalized() {
    let parsed = parse("input[type='text' i]");
    assert_eq!(
        parsed.selector[0].simples[0].selector.css.as_deref(),
        Some("input[type=\"text\" i]")
    );
}

#[test]
fn test_leading_combinator_gets_scope() {
    let parsed = parse("> li");
    let simples = &parsed.selector[0].simples;
    assert_eq!(simples.len(), 2);
    assert_eq!(simples[0].selector.css, None);
    assert_eq!(simples[0].selector.functions[0].name, "scope");
    assert_eq!(simples[0].combinator, ClauseCombinator::Child);
}

// ========== custom functions ==========

#[test]
fn test_custom_function_with_string() {
    let parsed = parse("button:has-text(\"Save\")");
    let simple = &parsed.selector[0].simples[0].selector;
    assert_eq!(simple.css.as_deref(), Some("button"));
    assert_eq!(simple.functions[0].name, "has-text");
    assert_eq!(
        simple.functions[0].args,
        vec![CssFunctionArgument::String("Save".to_string())]
    );
    assert_eq!(parsed.names, vec!["has-text".to_string()]);
}

#[test]
fn test_custom_function_with_selector_and_number() {
    let parsed = parse(":nth-match(li.item, 2)");
    let function = &parsed.selector[0].simples[0].selector.functions[0];
    assert_eq!(function.name, "nth-match");
    assert!(matches!(&function.args[0], CssFunctionArgument::Selector(_)));
    assert_eq!(function.args[1], CssFunctionArgument::Number(2.0));
}

#[test]
fn test_custom_pseudo_without_arguments() {
    let parsed = parse("div:visible");
    let simple = &parsed.selector[0].simples[0].selector;
    assert_eq!(simple.css.as_deref(), Some("div"));
    assert_eq!(simple.functions[0].name, "visible");
    assert!(simple.functions[0].args.is_empty());
}

#[test]
fn test_nested_names_are_collected_once() {
    let parsed = parse("div:has(span:visible):has(a:visible)");
    assert_eq!(parsed.names, vec!["visible".to_string(), "has".to_string()]);
}

#[test]
fn test_custom_names_are_case_insensitive() {
    let parsed = parse("div:HAS-TEXT('x')");
    assert_eq!(parsed.selector[0].simples[0].selector.functions[0].name, "has-text");
}

#[test]
fn test_display_round_trip() {
    let parsed = parse("div > span:has-text(\"a\"), li:nth-match(p, 2)");
    let rendered: Vec<String> = parsed.selector.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["div > span:has-text(\"a\")", "li:nth-match(p, 2)"]);
}

#[test]
fn test_display_escapes_string_arguments() {
    let parsed = parse(r#"li:has-text("say \"hi\" \\ bye")"#);
    let CssFunctionArgument::String(text) = &parsed.selector[0].simples[0].selector.functions[0].args[0]
    else {
        panic!("expected a string argument");
    };
    assert_eq!(text, r#"say "hi" \ bye"#);

    let rendered = parsed.selector[0].to_string();
    assert_eq!(rendered, r#"li:has-text("say \"hi\" \\ bye")"#);
    assert_eq!(parse(&rendered), parsed);
}

// ========== errors ==========

#[test]
fn test_unsupported_tokens() {
    for selector in ["@media", "a;b", "a{}", "50%", "url(x)", "a||b"] {
        let err = parse_css(selector, CUSTOM_CSS_NAMES).unwrap_err();
        assert!(
            matches!(err, CssParseError::UnsupportedToken { .. }),
            "{selector}: {err}"
        );
    }
}

#[test]
fn test_unsupported_token_message() {
    let err = parse_css("a;b", CUSTOM_CSS_NAMES).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unsupported token \";\" while parsing css selector \"a;b\". Did you mean to CSS.escape it?"
    );
}

#[test]
fn test_unexpected_token() {
    let err = parse_css("div.", CUSTOM_CSS_NAMES).unwrap_err();
    assert!(matches!(err, CssParseError::UnexpectedToken { .. }));
    let err = parse_css("div)", CUSTOM_CSS_NAMES).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unexpected token \")\" while parsing css selector \"div)\". Did you mean to CSS.escape it?"
    );
}

#[test]
fn test_empty_selector_is_unexpected() {
    assert!(matches!(
        parse_css("", CUSTOM_CSS_NAMES),
        Err(CssParseError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_top_level_string_is_invalid() {
    let err = parse_css("\"text\"", CUSTOM_CSS_NAMES).unwrap_err();
    assert!(matches!(err, CssParseError::InvalidSelector { .. }));
}

#[test]
fn test_lex_error_is_wrapped() {
    let err = parse_css("div[a=\"x]", CUSTOM_CSS_NAMES).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Unterminated string"));
    assert!(message.ends_with("while parsing css selector \"div[a=\"x]\". Did you mean to CSS.escape it?"));
}
