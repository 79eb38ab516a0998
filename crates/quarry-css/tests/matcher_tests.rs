//! Integration tests for compound selector matching.

use quarry_css::matcher::{AttributeOperator, PseudoClass, SimpleSelector};
use quarry_css::{CompoundSelector, CssParseError};
use quarry_dom::{DomTree, NodeId};

/// `<html><body>` skeleton; returns the tree and the body.
fn document() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    (tree, body)
}

fn matches(fragment: &str, tree: &DomTree, node: NodeId) -> bool {
    CompoundSelector::parse(fragment).unwrap().matches(tree, node)
}

// ========== compiling ==========

#[test]
fn test_parse_compound() {
    let compound = CompoundSelector::parse("input.primary#go[type=\"submit\" i]:first-child").unwrap();
    assert_eq!(compound.simple_selectors.len(), 5);
    assert_eq!(compound.simple_selectors[0], SimpleSelector::Type("input".to_string()));
    assert_eq!(compound.simple_selectors[1], SimpleSelector::Class("primary".to_string()));
    assert_eq!(compound.simple_selectors[2], SimpleSelector::Id("go".to_string()));
    match &compound.simple_selectors[3] {
        SimpleSelector::Attribute(attr) => {
            assert_eq!(attr.name, "type");
            assert_eq!(attr.operator, AttributeOperator::Equals);
            assert_eq!(attr.value, "submit");
            assert!(attr.case_insensitive);
        }
        other => panic!("Expected attribute selector, got {other:?}"),
    }
    assert_eq!(
        compound.simple_selectors[4],
        SimpleSelector::PseudoClass(PseudoClass::FirstChild)
    );
}

#[test]
fn test_parse_rejects_combinators() {
    let err = CompoundSelector::parse("div span").unwrap_err();
    assert!(matches!(err, CssParseError::UnsupportedFragment { .. }));
    assert!(CompoundSelector::parse("div>span").is_err());
}

#[test]
fn test_parse_rejects_unknown_pseudo_class() {
    let err = CompoundSelector::parse("div:frobnicate").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unsupported css fragment \"div:frobnicate\": unsupported pseudo-class \":frobnicate\""
    );
}

#[test]
fn test_parse_rejects_malformed_attribute() {
    assert!(CompoundSelector::parse("[=x]").is_err());
    assert!(CompoundSelector::parse("[a=x y]").is_err());
    assert!(CompoundSelector::parse("[a").is_err());
}

#[test]
fn test_surrounding_whitespace_is_allowed() {
    assert!(CompoundSelector::parse("  div  ").is_ok());
    assert!(CompoundSelector::parse("   ").is_err());
}

// ========== elemental selectors ==========

#[test]
fn test_type_class_id() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[("id", "main"), ("class", "a b")]);
    assert!(matches("div", &tree, div));
    assert!(matches("DIV", &tree, div));
    assert!(matches("*", &tree, div));
    assert!(matches(".a.b", &tree, div));
    assert!(matches("#main", &tree, div));
    assert!(matches("div#main.b", &tree, div));
    assert!(!matches("span", &tree, div));
    assert!(!matches(".c", &tree, div));
    assert!(!matches("#other", &tree, div));
}

#[test]
fn test_text_nodes_never_match() {
    let (mut tree, body) = document();
    let text = tree.append_text(body, "hello");
    assert!(!matches("*", &tree, text));
}

#[test]
fn test_escaped_class() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[("class", "w-1/2")]);
    assert!(matches(".w-1\\/2", &tree, div));
}

// ========== attribute selectors ==========

#[test]
fn test_attribute_operators() {
    let (mut tree, body) = document();
    let a = tree.append_element(
        body,
        "a",
        &[("href", "https://example.com/page"), ("lang", "en-US"), ("rel", "noopener external")],
    );
    assert!(matches("[href]", &tree, a));
    assert!(matches("[href=\"https://example.com/page\"]", &tree, a));
    assert!(matches("[rel~=external]", &tree, a));
    assert!(matches("[lang|=en]", &tree, a));
    assert!(matches("[href^=https]", &tree, a));
    assert!(matches("[href$=page]", &tree, a));
    assert!(matches("[href*=example]", &tree, a));
    assert!(!matches("[title]", &tree, a));
    assert!(!matches("[rel~=noop]", &tree, a));
    assert!(!matches("[href^=\"\"]", &tree, a));
}

#[test]
fn test_attribute_case_flag() {
    let (mut tree, body) = document();
    let input = tree.append_element(body, "input", &[("type", "Submit")]);
    assert!(!matches("[type=submit]", &tree, input));
    assert!(matches("[type=submit i]", &tree, input));
    assert!(!matches("[type=submit s]", &tree, input));
}

#[test]
fn test_attribute_name_is_case_insensitive() {
    let (mut tree, body) = document();
    let div = tree.append_element(body, "div", &[("data-x", "1")]);
    assert!(matches("[DATA-X=\"1\"]", &tree, div));
    assert!(matches("[data-x=1]", &tree, div));
}

// ========== structural pseudo-classes ==========

#[test]
fn test_child_position() {
    let (mut tree, body) = document();
    let ul = tree.append_element(body, "ul", &[]);
    let _ = tree.append_text(ul, " ");
    let first = tree.append_element(ul, "li", &[]);
    let second = tree.append_element(ul, "li", &[]);
    let third = tree.append_element(ul, "li", &[]);
    assert!(matches(":first-child", &tree, first));
    assert!(!matches(":first-child", &tree, second));
    assert!(matches(":last-child", &tree, third));
    assert!(matches(":nth-child(2)", &tree, second));
    assert!(matches("li:nth-child(odd)", &tree, third));
    assert!(matches(":nth-last-child(3)", &tree, first));
    assert!(matches(":nth-child(-n+2)", &tree, second));
    assert!(!matches(":nth-child(-n+2)", &tree, third));
    assert!(!matches(":only-child", &tree, first));
}

#[test]
fn test_of_type() {
    let (mut tree, body) = document();
    let h1 = tree.append_element(body, "h1", &[]);
    let p1 = tree.append_element(body, "p", &[]);
    let p2 = tree.append_element(body, "p", &[]);
    assert!(matches("p:first-of-type", &tree, p1));
    assert!(matches("p:last-of-type", &tree, p2));
    assert!(matches(":only-of-type", &tree, h1));
    assert!(matches(":nth-of-type(2)", &tree, p2));
    assert!(matches(":nth-last-of-type(2)", &tree, p1));
}

#[test]
fn test_root_and_empty() {
    let (mut tree, body) = document();
    let html = tree.document_element().unwrap();
    let empty = tree.append_element(body, "div", &[]);
    let full = tree.append_element(body, "div", &[]);
    let _ = tree.append_text(full, " ");
    assert!(matches(":root", &tree, html));
    assert!(!matches(":root", &tree, body));
    assert!(matches(":empty", &tree, empty));
    assert!(!matches(":empty", &tree, full));
}

// ========== form pseudo-classes ==========

#[test]
fn test_disabled_and_enabled() {
    let (mut tree, body) = document();
    let button = tree.append_element(body, "button", &[("disabled", "")]);
    let input = tree.append_element(body, "input", &[]);
    let div = tree.append_element(body, "div", &[("disabled", "")]);
    assert!(matches(":disabled", &tree, button));
    assert!(matches(":enabled", &tree, input));
    assert!(!matches(":disabled", &tree, div));
    assert!(!matches(":enabled", &tree, div));
}

#[test]
fn test_disabled_fieldset_spares_first_legend() {
    let (mut tree, body) = document();
    let fieldset = tree.append_element(body, "fieldset", &[("disabled", "")]);
    let legend = tree.append_element(fieldset, "legend", &[]);
    let in_legend = tree.append_element(legend, "input", &[]);
    let outside = tree.append_element(fieldset, "input", &[]);
    assert!(!matches(":disabled", &tree, in_legend));
    assert!(matches(":disabled", &tree, outside));
}

#[test]
fn test_disabled_optgroup_disables_options() {
    let (mut tree, body) = document();
    let select = tree.append_element(body, "select", &[]);
    let group = tree.append_element(select, "optgroup", &[("disabled", "")]);
    let option = tree.append_element(group, "option", &[]);
    assert!(matches("option:disabled", &tree, option));
}

#[test]
fn test_checked_required_link() {
    let (mut tree, body) = document();
    let checkbox = tree.append_element(body, "input", &[("type", "CHECKBOX"), ("checked", "")]);
    let text = tree.append_element(body, "input", &[("type", "text"), ("checked", "")]);
    let required = tree.append_element(body, "textarea", &[("required", "")]);
    let link = tree.append_element(body, "a", &[("href", "/")]);
    let anchor = tree.append_element(body, "a", &[]);
    assert!(matches(":checked", &tree, checkbox));
    assert!(!matches(":checked", &tree, text));
    assert!(matches(":required", &tree, required));
    assert!(matches(":optional", &tree, text));
    assert!(matches(":link", &tree, link));
    assert!(!matches(":any-link", &tree, anchor));
}

#[test]
fn test_user_action_states_never_match() {
    let (mut tree, body) = document();
    let button = tree.append_element(body, "button", &[]);
    assert!(!matches("button:hover", &tree, button));
    assert!(!matches("button::before", &tree, button));
}
