//! Tests for ARIA roles, accessible names and states.

use quarry_dom::aria::{self, AriaChecked, AriaExpanded};
use quarry_dom::{DomTree, NodeId};

// ========== roles ==========

#[test]
fn test_implicit_roles() {
    let mut tree = DomTree::new();
    let link = tree.append_element(NodeId::ROOT, "a", &[("href", "/")]);
    let anchor = tree.append_element(NodeId::ROOT, "a", &[]);
    let heading = tree.append_element(NodeId::ROOT, "h2", &[]);
    let checkbox = tree.append_element(NodeId::ROOT, "input", &[("type", "checkbox")]);
    let text = tree.append_element(NodeId::ROOT, "input", &[]);
    let hidden = tree.append_element(NodeId::ROOT, "input", &[("type", "hidden")]);
    let select = tree.append_element(NodeId::ROOT, "select", &[]);
    let multi = tree.append_element(NodeId::ROOT, "select", &[("multiple", "")]);

    assert_eq!(aria::role(&tree, link), Some("link"));
    assert_eq!(aria::role(&tree, anchor), None);
    assert_eq!(aria::role(&tree, heading), Some("heading"));
    assert_eq!(aria::role(&tree, checkbox), Some("checkbox"));
    assert_eq!(aria::role(&tree, text), Some("textbox"));
    assert_eq!(aria::role(&tree, hidden), None);
    assert_eq!(aria::role(&tree, select), Some("combobox"));
    assert_eq!(aria::role(&tree, multi), Some("listbox"));
}

#[test]
fn test_explicit_role_wins() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[("role", "button")]);
    assert_eq!(aria::role(&tree, div), Some("button"));
}

#[test]
fn test_focusable_presentation_keeps_implicit_role() {
    let mut tree = DomTree::new();
    let button = tree.append_element(NodeId::ROOT, "button", &[("role", "none")]);
    assert_eq!(aria::role(&tree, button), Some("button"));
}

#[test]
fn test_header_inside_article_is_not_banner() {
    let mut tree = DomTree::new();
    let top = tree.append_element(NodeId::ROOT, "header", &[]);
    let article = tree.append_element(NodeId::ROOT, "article", &[]);
    let nested = tree.append_element(article, "header", &[]);

    assert_eq!(aria::role(&tree, top), Some("banner"));
    assert_eq!(aria::role(&tree, nested), None);
}

// ========== accessible name ==========

#[test]
fn test_name_from_content() {
    let mut tree = DomTree::new();
    let button = tree.append_element(NodeId::ROOT, "button", &[]);
    let _ = tree.append_text(button, "  Save ");
    let b = tree.append_element(button, "b", &[]);
    let _ = tree.append_text(b, "draft");

    assert_eq!(aria::accessible_name(&tree, button, false), "Save draft");
}

#[test]
fn test_aria_label_and_labelledby() {
    let mut tree = DomTree::new();
    let label = tree.append_element(NodeId::ROOT, "span", &[("id", "lbl")]);
    let _ = tree.append_text(label, "Close dialog");
    let by = tree.append_element(NodeId::ROOT, "button", &[("aria-labelledby", "lbl")]);
    let labelled = tree.append_element(NodeId::ROOT, "button", &[("aria-label", "Dismiss")]);
    let _ = tree.append_text(labelled, "X");

    assert_eq!(aria::accessible_name(&tree, by, false), "Close dialog");
    assert_eq!(aria::accessible_name(&tree, labelled, false), "Dismiss");
}

#[test]
fn test_input_names() {
    let mut tree = DomTree::new();
    let label = tree.append_element(NodeId::ROOT, "label", &[("for", "email")]);
    let _ = tree.append_text(label, "Email");
    let email = tree.append_element(NodeId::ROOT, "input", &[("id", "email")]);
    let submit = tree.append_element(NodeId::ROOT, "input", &[("type", "submit")]);
    let search = tree.append_element(NodeId::ROOT, "input", &[("placeholder", "Search")]);
    let wrapping = tree.append_element(NodeId::ROOT, "label", &[]);
    let _ = tree.append_text(wrapping, "Remember me");
    let checkbox = tree.append_element(wrapping, "input", &[("type", "checkbox")]);

    assert_eq!(aria::accessible_name(&tree, email, false), "Email");
    assert_eq!(aria::accessible_name(&tree, submit, false), "Submit");
    assert_eq!(aria::accessible_name(&tree, search, false), "Search");
    assert_eq!(aria::accessible_name(&tree, checkbox, false), "Remember me");
    assert_eq!(aria::labels(&tree, email), vec![label]);
}

#[test]
fn test_img_alt_and_prohibited_naming() {
    let mut tree = DomTree::new();
    let img = tree.append_element(NodeId::ROOT, "img", &[("alt", "Logo")]);
    let p = tree.append_element(NodeId::ROOT, "p", &[("aria-label", "ignored")]);

    assert_eq!(aria::accessible_name(&tree, img, false), "Logo");
    assert_eq!(aria::accessible_name(&tree, p, false), "");
}

#[test]
fn test_hidden_content_is_skipped_unless_included() {
    let mut tree = DomTree::new();
    let button = tree.append_element(NodeId::ROOT, "button", &[]);
    let _ = tree.append_text(button, "Open");
    let hint = tree.append_element(button, "span", &[("style", "display:none")]);
    let _ = tree.append_text(hint, " menu");

    assert_eq!(aria::accessible_name(&tree, button, false), "Open");
    assert_eq!(aria::accessible_name(&tree, button, true), "Open menu");
}

// ========== hidden ==========

#[test]
fn test_aria_hidden_applies_to_descendants() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[("aria-hidden", "true")]);
    let button = tree.append_element(div, "button", &[]);
    let visible = tree.append_element(NodeId::ROOT, "button", &[]);

    assert!(aria::is_hidden_for_aria(&tree, button));
    assert!(!aria::is_hidden_for_aria(&tree, visible));
}

// ========== states ==========

#[test]
fn test_checked_pressed_expanded_level() {
    let mut tree = DomTree::new();
    let on = tree.append_element(NodeId::ROOT, "input", &[("type", "checkbox"), ("checked", "")]);
    let mixed = tree.append_element(
        NodeId::ROOT,
        "div",
        &[("role", "checkbox"), ("aria-checked", "mixed")],
    );
    let toggle = tree.append_element(NodeId::ROOT, "button", &[("aria-pressed", "true")]);
    let menu = tree.append_element(NodeId::ROOT, "button", &[("aria-expanded", "false")]);
    let plain = tree.append_element(NodeId::ROOT, "div", &[]);
    let h3 = tree.append_element(NodeId::ROOT, "h3", &[]);
    let item = tree.append_element(
        NodeId::ROOT,
        "div",
        &[("role", "treeitem"), ("aria-level", "4")],
    );

    assert_eq!(aria::checked(&tree, on), AriaChecked::True);
    assert_eq!(aria::checked(&tree, mixed), AriaChecked::Mixed);
    assert_eq!(aria::checked_state(&tree, plain), None);
    assert_eq!(aria::pressed(&tree, toggle), AriaChecked::True);
    assert_eq!(aria::expanded(&tree, menu), AriaExpanded::False);
    assert_eq!(aria::expanded(&tree, plain), AriaExpanded::None);
    assert_eq!(aria::level(&tree, h3), 3);
    assert_eq!(aria::level(&tree, item), 4);
}

#[test]
fn test_disabled_through_fieldset_and_aria() {
    let mut tree = DomTree::new();
    let fieldset = tree.append_element(NodeId::ROOT, "fieldset", &[("disabled", "")]);
    let input = tree.append_element(fieldset, "input", &[]);
    let group = tree.append_element(
        NodeId::ROOT,
        "div",
        &[("role", "group"), ("aria-disabled", "true")],
    );
    let nested = tree.append_element(group, "div", &[("role", "button")]);
    let enabled = tree.append_element(NodeId::ROOT, "button", &[]);

    assert!(aria::disabled(&tree, input));
    assert!(aria::disabled(&tree, nested));
    assert!(!aria::disabled(&tree, enabled));
}

#[test]
fn test_option_selected() {
    let mut tree = DomTree::new();
    let select = tree.append_element(NodeId::ROOT, "select", &[]);
    let first = tree.append_element(select, "option", &[]);
    let second = tree.append_element(select, "option", &[("selected", "")]);

    assert!(!aria::selected(&tree, first));
    assert!(aria::selected(&tree, second));
}
