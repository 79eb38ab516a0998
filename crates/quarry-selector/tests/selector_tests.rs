//! Tests for the `>>` selector language and the attribute mini-language.

use quarry_selector::attribute::{
    AttributeOperator, AttributeSelector, AttributeSelectorPart, AttributeValue,
    parse_attribute_selector,
};
use quarry_selector::parser::{SelectorBody, split_selector_by_frame};
use quarry_selector::{SelectorError, parse_selector, stringify_selector};
use quickcheck_macros::quickcheck;

fn names(selector: &str) -> Vec<String> {
    parse_selector(selector)
        .unwrap()
        .parts
        .into_iter()
        .map(|part| part.name)
        .collect()
}

// ========== parts ==========

#[test]
fn test_css_then_quoted_text() {
    let parsed = parse_selector(r#"div >> text="Hello""#).unwrap();
    assert_eq!(parsed.parts.len(), 2);
    assert_eq!(parsed.parts[0].name, "css");
    assert_eq!(parsed.parts[0].source, "div");
    assert!(matches!(parsed.parts[0].body, SelectorBody::Css(_)));
    assert_eq!(parsed.parts[1].name, "text");
    assert_eq!(parsed.parts[1].source, r#""Hello""#);
    assert_eq!(parsed.parts[1].raw_body(), Some(r#""Hello""#));
}

#[test]
fn test_engine_inference() {
    assert_eq!(names(r#""Sign in""#), ["text"]);
    assert_eq!(names("'Sign in'"), ["text"]);
    assert_eq!(names("//div"), ["xpath"]);
    assert_eq!(names(".."), ["xpath"]);
    assert_eq!(names("section > p"), ["css"]);
    assert_eq!(names("id=main >> nth=0"), ["id", "nth"]);
}

#[test]
fn test_combinator_inside_quotes_is_text() {
    let parsed = parse_selector(r#"text="a >> b" >> span"#).unwrap();
    assert_eq!(parsed.parts.len(), 2);
    assert_eq!(parsed.parts[0].source, r#""a >> b""#);
}

#[test]
fn test_capture() {
    let parsed = parse_selector("section >> *css=article >> h2").unwrap();
    assert_eq!(parsed.capture, Some(1));
    assert!(matches!(
        parse_selector("*css=div >> *css=span"),
        Err(SelectorError::InvalidSelector(_))
    ));
}

#[test]
fn test_nested_bodies() {
    let parsed = parse_selector(r#"li >> internal:has="span.price""#).unwrap();
    let nested = parsed.parts[1].nested().unwrap();
    assert_eq!(nested.parsed.parts[0].source, "span.price");
    assert_eq!(nested.distance, None);

    let parsed = parse_selector(r#"button >> left-of="input", 30"#).unwrap();
    assert_eq!(parsed.parts[1].nested().unwrap().distance, Some(30.0));
}

#[test]
fn test_malformed_nested_bodies() {
    for selector in [
        r#"internal:has="span""#,
        "div >> internal:has=span",
        r#"div >> internal:has="span", 10"#,
        r#"div >> internal:and=["a", "b", "c"]"#,
    ] {
        assert!(
            matches!(parse_selector(selector), Err(SelectorError::InvalidSelector(_))),
            "{selector}"
        );
    }
}

#[test]
fn test_stringify_omits_inferred_engines() {
    let parsed = parse_selector(r#"css=div >> text="Hi" >> text=Hi >> nth=1"#).unwrap();
    assert_eq!(
        stringify_selector(&parsed, false),
        r#"div >> "Hi" >> text=Hi >> nth=1"#
    );
    assert_eq!(
        stringify_selector(&parsed, true),
        r#"css=div >> text="Hi" >> text=Hi >> nth=1"#
    );
}

// ========== frames ==========

#[test]
fn test_split_by_frame() {
    let chunks =
        split_selector_by_frame("iframe >> internal:control=enter-frame >> *css=button").unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].parts[0].source, "iframe");
    assert_eq!(chunks[1].capture, Some(0));
}

#[test]
fn test_split_by_frame_rejects_empty_chunks_and_early_capture() {
    assert!(split_selector_by_frame("internal:control=enter-frame >> div").is_err());
    assert!(split_selector_by_frame("iframe >> internal:control=enter-frame").is_err());
    assert!(split_selector_by_frame("*css=iframe >> internal:control=enter-frame >> div").is_err());
}

// ========== attributes ==========

#[test]
fn test_attribute_selector_with_case_flag() {
    let parsed = parse_attribute_selector(r#"button[name="Submit" i]"#, false).unwrap();
    assert_eq!(parsed.name, "button");
    assert_eq!(parsed.attributes.len(), 1);
    let part = &parsed.attributes[0];
    assert_eq!(part.json_path, ["name"]);
    assert_eq!(part.op, AttributeOperator::Equals);
    assert_eq!(part.value, AttributeValue::String("Submit".to_string()));
    assert!(!part.case_sensitive);
}

#[test]
fn test_attribute_selector_values() {
    let parsed =
        parse_attribute_selector("heading[level=2][checked][pressed=false][a.b='x']", false)
            .unwrap();
    let values: Vec<_> = parsed.attributes.iter().map(|a| a.value.clone()).collect();
    assert_eq!(parsed.attributes[1].op, AttributeOperator::Truthy);
    assert_eq!(values[0], AttributeValue::Number(2.0));
    assert_eq!(values[2], AttributeValue::Bool(false));
    assert_eq!(parsed.attributes[3].json_path, ["a", "b"]);
    assert_eq!(values[3], AttributeValue::String("x".to_string()));
}

#[test]
fn test_attribute_selector_regex() {
    let parsed = parse_attribute_selector(r"[name=/^sub/i]", false).unwrap();
    let AttributeValue::Regex(re) = &parsed.attributes[0].value else {
        panic!("expected a pattern");
    };
    assert!(re.is_match("Submit"));
}

#[test]
fn test_attribute_selector_errors() {
    for selector in ["", "[name=", "[name^=/x/]", "[level^=2]", r#"[name="x"#] {
        assert!(
            matches!(
                parse_attribute_selector(selector, false),
                Err(SelectorError::AttributeGrammar(_))
            ),
            "{selector:?}"
        );
    }
}

#[test]
fn test_unquoted_values_stay_strings_when_allowed() {
    let parsed = parse_attribute_selector("[name=Submit][pressed=true]", true).unwrap();
    assert_eq!(
        parsed.attributes[0].value,
        AttributeValue::String("Submit".to_string())
    );
    assert_eq!(parsed.attributes[1].value, AttributeValue::Bool(true));
}

// ========== properties ==========

#[quickcheck]
fn prop_stringify_reparses(words: Vec<u8>) -> bool {
    const PARTS: &[&str] = &[
        "div",
        "span.price",
        r#""Hello""#,
        "text=Hi",
        "nth=0",
        "id=main",
        r#"internal:has="em""#,
        r#"internal:role=button[name="OK"i]"#,
    ];
    let chosen: Vec<&str> = words
        .iter()
        .take(6)
        .map(|&w| PARTS[usize::from(w) % PARTS.len()])
        .collect();
    // Composite engines cannot come first.
    if chosen.is_empty() || chosen[0].starts_with("internal:has") {
        return true;
    }
    let parsed = parse_selector(&chosen.join(" >> ")).unwrap();
    let text = stringify_selector(&parsed, false);
    parse_selector(&text).is_ok_and(|reparsed| reparsed == parsed)
}

const OPERATORS: [AttributeOperator; 6] = [
    AttributeOperator::Equals,
    AttributeOperator::Contains,
    AttributeOperator::Prefix,
    AttributeOperator::Suffix,
    AttributeOperator::DashMatch,
    AttributeOperator::Includes,
];

fn clause(path: &[&str], op: AttributeOperator, value: AttributeValue, case_sensitive: bool) -> AttributeSelectorPart {
    AttributeSelectorPart {
        name: path.join("."),
        json_path: path.iter().map(ToString::to_string).collect(),
        op,
        value,
        case_sensitive,
    }
}

#[quickcheck]
fn prop_attribute_selector_display_reparses(
    key: String,
    value: String,
    op: u8,
    case_sensitive: bool,
    number: i16,
) -> bool {
    if key.is_empty() {
        return true;
    }
    let overflow = if number < 0 { f64::NEG_INFINITY } else { f64::INFINITY };
    let selector = AttributeSelector {
        name: "role".to_string(),
        attributes: vec![
            clause(
                &["props", key.as_str()],
                OPERATORS[usize::from(op) % OPERATORS.len()],
                AttributeValue::String(value),
                case_sensitive,
            ),
            clause(&["level"], AttributeOperator::Equals, AttributeValue::Number(f64::from(number)), true),
            clause(&["depth"], AttributeOperator::Equals, AttributeValue::Number(overflow), true),
            clause(&["checked"], AttributeOperator::Truthy, AttributeValue::Null, false),
        ],
    };
    parse_attribute_selector(&selector.to_string(), false).is_ok_and(|parsed| parsed == selector)
}

#[quickcheck]
fn prop_only_equals_takes_non_string_values(op: u8, number: i16) -> bool {
    let op = OPERATORS[usize::from(op) % OPERATORS.len()];
    let legal = op == AttributeOperator::Equals;
    [format!("[level{op}{number}]"), format!("[name{op}/x/]"), format!("[pressed{op}true]")]
        .iter()
        .all(|selector| match parse_attribute_selector(selector, false) {
            Ok(_) => legal,
            Err(SelectorError::AttributeGrammar(_)) => !legal,
            Err(_) => false,
        })
}
