//! Tests for selector generation.

use quarry_dom::{DomTree, NodeId};
use quarry_selector::{GenerateOptions, GeneratedSelector, SelectorError, Selectors};
use quickcheck_macros::quickcheck;

fn document() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    (tree, body)
}

fn generate(tree: &DomTree, target: NodeId) -> GeneratedSelector {
    Selectors::default()
        .generate(tree, target, &GenerateOptions::default())
        .unwrap()
}

// ========== preferred tokens ==========

#[test]
fn test_test_id_wins_at_any_depth() {
    let (mut tree, body) = document();
    let mut parent = body;
    for _ in 0..6 {
        parent = tree.append_element(parent, "div", &[("class", "wrapper")]);
    }
    let button = tree.append_element(parent, "button", &[("data-testid", "save-btn"), ("id", "save")]);
    let _ = tree.append_text(button, "Save");
    let _ = tree.append_element(body, "button", &[("data-testid", "cancel-btn")]);

    let generated = generate(&tree, button);
    assert_eq!(generated.selector, r#"internal:testid=[data-testid="save-btn"s]"#);
    assert_eq!(generated.elements, [button]);
}

#[test]
fn test_custom_test_id_attribute() {
    let (mut tree, body) = document();
    let target = tree.append_element(body, "div", &[("data-qa", "panel"), ("data-testid", "other")]);
    let options = GenerateOptions {
        test_id_attribute: "data-qa".to_string(),
        ..GenerateOptions::default()
    };
    let generated = Selectors::default().generate(&tree, target, &options).unwrap();
    assert_eq!(generated.selector, r#"internal:testid=[data-qa="panel"s]"#);
}

#[test]
fn test_role_with_name_beats_text() {
    let (mut tree, body) = document();
    let save = tree.append_element(body, "button", &[]);
    let _ = tree.append_text(save, "Save");
    let cancel = tree.append_element(body, "button", &[]);
    let _ = tree.append_text(cancel, "Cancel");

    let generated = generate(&tree, save);
    assert_eq!(generated.selector, r#"internal:role=button[name="Save"i]"#);
    assert_eq!(generated.elements, [save]);
}

#[test]
fn test_text_for_plain_elements() {
    let (mut tree, body) = document();
    let greeting = tree.append_element(body, "span", &[]);
    let _ = tree.append_text(greeting, "Welcome back");
    let other = tree.append_element(body, "span", &[]);
    let _ = tree.append_text(other, "Sign out");

    let generated = generate(&tree, greeting);
    assert_eq!(generated.selector, r#"internal:text="Welcome back"i"#);
}

#[test]
fn test_css_id() {
    let (mut tree, body) = document();
    let section = tree.append_element(body, "section", &[]);
    let panel = tree.append_element(section, "div", &[("id", "main-panel")]);
    let _ = tree.append_element(section, "div", &[]);

    let generated = generate(&tree, panel);
    assert_eq!(generated.selector, "#main-panel");
}

#[test]
fn test_nth_disambiguates_identical_siblings() {
    let (mut tree, body) = document();
    let list = tree.append_element(body, "ul", &[]);
    let items: Vec<NodeId> = (0..3).map(|_| tree.append_element(list, "li", &[])).collect();

    let generated = generate(&tree, items[1]);
    assert!(generated.selector.ends_with("nth=1"), "{}", generated.selector);
    assert_eq!(generated.elements, [items[1]]);
}

#[test]
fn test_document_element() {
    let (tree, body) = document();
    let html = tree.parent_element(body).unwrap();
    assert_eq!(generate(&tree, html).selector, "html");
}

// ========== retargeting and scope ==========

#[test]
fn test_retargets_to_interactive_ancestor() {
    let (mut tree, body) = document();
    let button = tree.append_element(body, "button", &[("data-testid", "go")]);
    let icon = tree.append_element(button, "span", &[("class", "icon")]);

    let generated = generate(&tree, icon);
    assert_eq!(generated.elements, [button]);
}

#[test]
fn test_relative_to_root() {
    let (mut tree, body) = document();
    let first = tree.append_element(body, "section", &[]);
    let second = tree.append_element(body, "section", &[]);
    let heading = tree.append_element(second, "h2", &[]);
    let _ = tree.append_element(first, "h2", &[]);

    let options = GenerateOptions {
        root: Some(second),
        ..GenerateOptions::default()
    };
    let selectors = Selectors::default();
    let generated = selectors.generate(&tree, heading, &options).unwrap();
    assert_eq!(
        selectors.query_all(&tree, &generated.selector, second).unwrap(),
        [heading]
    );

    let outside = selectors.generate(&tree, first, &options);
    assert!(matches!(outside, Err(SelectorError::Engine(_))));
    let scope = selectors.generate(&tree, second, &options).unwrap();
    assert_eq!(scope.selector, ":scope");
}

#[test]
fn test_multiple_alternatives_resolve_to_target() {
    let (mut tree, body) = document();
    let target = tree.append_element(body, "div", &[("id", "summary")]);
    let _ = tree.append_text(target, "Order total");
    let _ = tree.append_element(body, "div", &[]);

    let options = GenerateOptions {
        multiple: true,
        ..GenerateOptions::default()
    };
    let selectors = Selectors::default();
    let generated = selectors.generate(&tree, target, &options).unwrap();
    assert_eq!(generated.selectors.first(), Some(&generated.selector));
    assert!(generated.selectors.len() > 1);
    for selector in &generated.selectors {
        let found = selectors.query_all(&tree, selector, NodeId::ROOT).unwrap();
        assert_eq!(found.first(), Some(&target), "{selector}");
    }
}

// ========== properties ==========

const TAGS: &[&str] = &["div", "span", "p", "section", "ul", "li"];

/// Grow a tree from `(parent, tag, decoration)` triples.
fn grow(shape: &[(u8, u8, u8)]) -> (DomTree, Vec<NodeId>) {
    let (mut tree, body) = document();
    let mut elements = vec![body];
    for (i, &(parent, tag, decoration)) in shape.iter().take(12).enumerate() {
        let parent = elements[usize::from(parent) % elements.len()];
        let tag = TAGS[usize::from(tag) % TAGS.len()];
        let id = format!("n{i}");
        let attrs: Vec<(&str, &str)> = match decoration % 6 {
            1 => vec![("class", "card")],
            2 => vec![("class", "card wide")],
            3 => vec![("id", id.as_str())],
            4 => vec![("data-testid", if decoration % 2 == 0 { "a" } else { "b" })],
            _ => Vec::new(),
        };
        let element = tree.append_element(parent, tag, &attrs);
        if decoration % 5 == 0 {
            let _ = tree.append_text(element, "Buy now");
        }
        elements.push(element);
    }
    (tree, elements)
}

#[quickcheck]
fn prop_generated_selector_finds_target_first(shape: Vec<(u8, u8, u8)>) -> bool {
    let (tree, elements) = grow(&shape);
    let selectors = Selectors::default();
    elements.iter().all(|&target| {
        selectors
            .generate(&tree, target, &GenerateOptions::default())
            .is_ok_and(|generated| generated.elements.first() == Some(&target))
    })
}
