//! Tests for inline style lookup and element visibility.

use quarry_dom::style::{self, Display, Visibility};
use quarry_dom::{DomTree, NodeId, Rect};

#[test]
fn test_inline_display_none_hides_subtree() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[("style", "color: red; display: none")]);
    let span = tree.append_element(div, "span", &[]);

    assert_eq!(style::display(&tree, div), Display::None);
    assert!(!style::is_element_visible(&tree, div));
    assert!(!style::is_element_visible(&tree, span));
}

#[test]
fn test_hidden_attribute_is_display_none() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[("hidden", "")]);
    assert!(!style::is_element_visible(&tree, div));
}

#[test]
fn test_visibility_inherits_and_can_be_overridden() {
    let mut tree = DomTree::new();
    let outer = tree.append_element(NodeId::ROOT, "div", &[("style", "visibility:hidden")]);
    let inner = tree.append_element(outer, "div", &[]);
    let shown = tree.append_element(outer, "div", &[("style", "visibility: visible")]);

    assert_eq!(style::visibility(&tree, inner), Visibility::Hidden);
    assert!(!style::is_element_visible(&tree, inner));
    assert!(style::is_element_visible(&tree, shown));
}

#[test]
fn test_empty_box_is_not_visible() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[]);
    let other = tree.append_element(NodeId::ROOT, "div", &[]);
    tree.set_bounding_box(div, Rect::new(0.0, 0.0, 0.0, 10.0));
    tree.set_bounding_box(other, Rect::new(0.0, 0.0, 10.0, 10.0));

    assert!(!style::is_element_visible(&tree, div));
    assert!(style::is_element_visible(&tree, other));
}

#[test]
fn test_display_contents_depends_on_children() {
    let mut tree = DomTree::new();
    let empty = tree.append_element(NodeId::ROOT, "div", &[("style", "display: contents")]);
    let with_text = tree.append_element(NodeId::ROOT, "div", &[("style", "display: contents")]);
    let _ = tree.append_text(with_text, "shown");

    assert!(!style::is_element_visible(&tree, empty));
    assert!(style::is_element_visible(&tree, with_text));
}

#[test]
fn test_script_and_head_are_never_visible() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let head = tree.append_element(html, "head", &[]);
    let title = tree.append_element(head, "title", &[]);
    let body = tree.append_element(html, "body", &[]);
    let script = tree.append_element(body, "script", &[]);

    assert!(!style::is_element_visible(&tree, title));
    assert!(!style::is_element_visible(&tree, script));
    assert!(style::is_element_visible(&tree, body));
}
