//! Inline style lookup and element visibility.
//!
//! There is no cascade here. An element's `display` and `visibility` come from
//! its inline `style` attribute, the `hidden` attribute, and a short table of
//! user-agent defaults. That is enough to answer "is this element rendered"
//! the way selector engines ask it.

use crate::{DomTree, NodeId};

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// "The element and its descendants generate no boxes or text runs."
    None,
    /// "The element itself does not generate any boxes, but its children and
    /// pseudo-elements still generate boxes and text runs as normal."
    Contents,
    /// `display: inline` and other inline-level values.
    Inline,
    /// `display: block` and every other box-generating value.
    Block,
}

/// [§ 11.2 Invisibility: the visibility property](https://www.w3.org/TR/css-display-3/#visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// "The box is visible."
    Visible,
    /// "The box is invisible (fully transparent, nothing is drawn), but still
    /// affects layout."
    Hidden,
    /// "Indicates that the box is collapsed."
    Collapse,
}

/// Elements the user-agent stylesheet hides.
const UA_DISPLAY_NONE: &[&str] = &[
    "area", "base", "basefont", "datalist", "head", "link", "meta", "noembed", "noframes",
    "noscript", "param", "rp", "script", "style", "template", "title",
];

/// Elements the user-agent stylesheet lays out as blocks (or other non-inline boxes).
const UA_DISPLAY_BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "details",
    "dialog", "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "legend", "li",
    "listing", "main", "menu", "nav", "ol", "optgroup", "option", "p", "plaintext", "pre",
    "search", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
    "xmp",
];

/// Look up a declaration in the element's inline `style` attribute.
///
/// The last declaration for a property wins, as in the cascade. Values are
/// lowercased with any `!important` suffix removed.
#[must_use]
pub fn inline_declaration(tree: &DomTree, id: NodeId, property: &str) -> Option<String> {
    let style = tree.attr(id, "style")?;
    let mut found = None;
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case(property) {
            let value = value.trim().to_ascii_lowercase();
            let value = value.trim_end_matches("!important").trim_end().to_string();
            found = Some(value);
        }
    }
    found
}

/// The element's own `display` value.
#[must_use]
pub fn display(tree: &DomTree, id: NodeId) -> Display {
    if let Some(value) = inline_declaration(tree, id, "display") {
        return match value.as_str() {
            "none" => Display::None,
            "contents" => Display::Contents,
            "inline" | "inline-block" | "inline-flex" | "inline-grid" | "inline-table" => {
                Display::Inline
            }
            _ => Display::Block,
        };
    }
    // [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
    // "[hidden]:not([hidden=until-found i]) { display: none; }"
    if tree
        .attr(id, "hidden")
        .is_some_and(|v| !v.eq_ignore_ascii_case("until-found"))
    {
        return Display::None;
    }
    match tree.local_name(id) {
        Some(tag) if UA_DISPLAY_NONE.contains(&tag) => Display::None,
        Some(tag) if UA_DISPLAY_BLOCK.contains(&tag) => Display::Block,
        _ => Display::Inline,
    }
}

/// The computed `visibility`, which inherits from the nearest ancestor that sets it.
#[must_use]
pub fn visibility(tree: &DomTree, id: NodeId) -> Visibility {
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(value) = inline_declaration(tree, node, "visibility") {
            match value.as_str() {
                "hidden" => return Visibility::Hidden,
                "collapse" => return Visibility::Collapse,
                "visible" => return Visibility::Visible,
                _ => {}
            }
        }
        current = tree.parent_element(node);
    }
    Visibility::Visible
}

/// Whether the element or any ancestor element has `display: none`.
///
/// This is the part of `Element.checkVisibility()` that does not depend on layout.
#[must_use]
pub fn belongs_to_display_none(tree: &DomTree, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if display(tree, node) == Display::None {
            return true;
        }
        current = tree.parent_element(node);
    }
    false
}

/// Visible as far as styles go: rendered and not `visibility: hidden`.
#[must_use]
pub fn is_element_style_visibility_visible(tree: &DomTree, id: NodeId) -> bool {
    !belongs_to_display_none(tree, id) && visibility(tree, id) == Visibility::Visible
}

/// A text node is visible when it has content and its parent renders.
#[must_use]
pub fn is_visible_text_node(tree: &DomTree, id: NodeId) -> bool {
    let Some(text) = tree.as_text(id) else {
        return false;
    };
    if text.trim().is_empty() {
        return false;
    }
    tree.parent_element(id)
        .is_none_or(|parent| is_element_style_visibility_visible(tree, parent))
}

/// Whether an element is visible: it renders, is not `visibility: hidden`,
/// and has a non-empty box.
///
/// Elements with `display: contents` have no box of their own and are visible
/// when any child is. Elements without a recorded bounding box are assumed to
/// occupy space.
#[must_use]
pub fn is_element_visible(tree: &DomTree, id: NodeId) -> bool {
    if !tree.is_element(id) {
        return false;
    }
    if display(tree, id) == Display::Contents && !belongs_to_display_none(tree, id) {
        return tree.children(id).iter().any(|&child| {
            if tree.is_element(child) {
                is_element_visible(tree, child)
            } else {
                is_visible_text_node(tree, child)
            }
        });
    }
    if !is_element_style_visibility_visible(tree, id) {
        return false;
    }
    tree.bounding_box(id)
        .is_none_or(|rect| rect.width > 0.0 && rect.height > 0.0)
}
