//! Tests for DOM tree mutation and traversal: remove_child, insert_before,
//! move_children, descendants and document order.

use quarry_dom::{DomTree, ElementData, NodeId, NodeType};
use quickcheck_macros::quickcheck;

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);
    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child);

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_ignores_non_children() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let stranger = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, parent);
    tree.append_child(NodeId::ROOT, stranger);

    tree.remove_child(parent, stranger);

    assert_eq!(tree.parent(stranger), Some(NodeId::ROOT));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing);

    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(parent, new_child, existing);

    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(parent));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let existing = alloc_element(&mut tree, "x");
    tree.append_child(to, existing);
    let moved = alloc_element(&mut tree, "y");
    tree.append_child(from, moved);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, moved]);
    assert_eq!(tree.parent(moved), Some(to));
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
}

// ========== traversal ==========

#[test]
fn test_descendants_are_preorder() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    let div = tree.append_element(body, "div", &[]);
    let text = tree.append_text(div, "hi");
    let span = tree.append_element(body, "span", &[]);

    assert_eq!(tree.descendants(NodeId::ROOT), vec![html, body, div, text, span]);
    assert_eq!(tree.descendant_elements(body), vec![div, span]);
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.document_element(), Some(html));
}

#[test]
fn test_element_siblings_skip_text() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[]);
    let a = tree.append_element(div, "a", &[]);
    let _ = tree.append_text(div, " ");
    let b = tree.append_element(div, "b", &[]);

    assert_eq!(tree.next_element_sibling(a), Some(b));
    assert_eq!(tree.prev_element_sibling(b), Some(a));
    assert_eq!(tree.element_children(div).collect::<Vec<_>>(), vec![a, b]);
}

#[test]
fn test_sort_in_document_order_follows_tree_not_allocation() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[]);
    let late = tree.append_element(div, "b", &[]);
    let early = tree.create_element("a", &[]);
    tree.insert_before(div, early, late);

    let mut nodes = vec![late, div, early, late];
    tree.sort_in_document_order(&mut nodes);
    assert_eq!(nodes, vec![div, early, late]);
}

#[test]
fn test_text_content_concatenates_descendants() {
    let mut tree = DomTree::new();
    let p = tree.append_element(NodeId::ROOT, "p", &[]);
    let _ = tree.append_text(p, "Hello, ");
    let b = tree.append_element(p, "b", &[]);
    let _ = tree.append_text(b, "world");

    assert_eq!(tree.text_content(p), "Hello, world");
}

#[test]
fn test_attributes_keep_insertion_order() {
    let mut tree = DomTree::new();
    let input = tree.append_element(
        NodeId::ROOT,
        "INPUT",
        &[("type", "text"), ("name", "q"), ("id", "search")],
    );
    tree.set_attr(input, "name", "query");

    let element = tree.as_element(input).unwrap();
    assert_eq!(element.local_name(), "input");
    assert_eq!(element.node_name(), "INPUT");
    let names: Vec<&str> = element.attrs.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["type", "name", "id"]);
    assert_eq!(tree.attr(input, "name"), Some("query"));
    assert_eq!(tree.element_by_id("search"), Some(input));
}

// ========== properties ==========

#[quickcheck]
fn prop_sort_in_document_order_matches_preorder(parents: Vec<u8>) -> bool {
    let mut tree = DomTree::new();
    let mut nodes = vec![NodeId::ROOT];
    for parent in parents.into_iter().take(40) {
        let parent = nodes[usize::from(parent) % nodes.len()];
        nodes.push(tree.append_element(parent, "div", &[]));
    }

    let mut shuffled: Vec<NodeId> = nodes[1..].iter().rev().copied().collect();
    shuffled.extend(nodes.iter().step_by(2).skip(1));
    tree.sort_in_document_order(&mut shuffled);
    shuffled == tree.descendants(NodeId::ROOT)
}
