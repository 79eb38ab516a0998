//! ARIA role, accessible name and state computation.
//!
//! - [WAI-ARIA 1.2](https://www.w3.org/TR/wai-aria-1.2/)
//! - [HTML-AAM](https://w3c.github.io/html-aam/)
//! - [Accessible Name and Description Computation](https://w3c.github.io/accname/)
//!
//! NOTE: Shadow trees, slots and CSS generated content are not modelled.

use std::collections::HashSet;

use crate::style::{self, Display};
use crate::{DomTree, NodeId};

/// Value of a tri-state ARIA attribute such as `aria-checked` or `aria-pressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaChecked {
    /// The state is off.
    False,
    /// The state is on.
    True,
    /// "Indicates a mixed mode value for a tri-state checkbox or menuitemcheckbox."
    Mixed,
}

/// Value of `aria-expanded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaExpanded {
    /// The controlled grouping is collapsed.
    False,
    /// The controlled grouping is expanded.
    True,
    /// The element does not own or control an expandable grouping.
    None,
}

/// [§ 5.4 Definition of Roles](https://www.w3.org/TR/wai-aria-1.2/#role_definitions)
/// minus the abstract roles.
const VALID_ROLES: &[&str] = &[
    "alert", "alertdialog", "application", "article", "banner", "blockquote", "button", "caption",
    "cell", "checkbox", "code", "columnheader", "combobox", "complementary", "contentinfo",
    "definition", "deletion", "dialog", "directory", "document", "emphasis", "feed", "figure",
    "form", "generic", "grid", "gridcell", "group", "heading", "img", "insertion", "link", "list",
    "listbox", "listitem", "log", "main", "marquee", "math", "meter", "menu", "menubar",
    "menuitem", "menuitemcheckbox", "menuitemradio", "navigation", "none", "note", "option",
    "paragraph", "presentation", "progressbar", "radio", "radiogroup", "region", "row",
    "rowgroup", "rowheader", "scrollbar", "search", "searchbox", "separator", "slider",
    "spinbutton", "status", "strong", "subscript", "superscript", "switch", "tab", "table",
    "tablist", "tabpanel", "term", "textbox", "time", "timer", "toolbar", "tooltip", "tree",
    "treegrid", "treeitem",
];

/// Roles that support `aria-checked`.
pub const CHECKED_ROLES: &[&str] = &[
    "checkbox",
    "menuitemcheckbox",
    "option",
    "radio",
    "switch",
    "menuitemradio",
    "treeitem",
];

/// Roles that support `aria-pressed`.
pub const PRESSED_ROLES: &[&str] = &["button"];

/// Roles that support `aria-selected`.
pub const SELECTED_ROLES: &[&str] = &[
    "gridcell",
    "option",
    "row",
    "tab",
    "rowheader",
    "columnheader",
    "treeitem",
];

/// Roles that support `aria-expanded`.
pub const EXPANDED_ROLES: &[&str] = &[
    "application",
    "button",
    "checkbox",
    "combobox",
    "gridcell",
    "link",
    "listbox",
    "menuitem",
    "row",
    "rowheader",
    "tab",
    "treeitem",
    "columnheader",
    "menuitemcheckbox",
    "menuitemradio",
    "switch",
];

/// Roles that support `aria-level`.
pub const LEVEL_ROLES: &[&str] = &["heading", "listitem", "row", "treeitem"];

/// Roles that support `aria-disabled`.
pub const DISABLED_ROLES: &[&str] = &[
    "application", "button", "composite", "gridcell", "group", "input", "link", "menuitem",
    "scrollbar", "separator", "tab", "checkbox", "columnheader", "combobox", "grid", "listbox",
    "menu", "menubar", "menuitemcheckbox", "menuitemradio", "option", "radio", "radiogroup",
    "row", "rowheader", "searchbox", "select", "slider", "spinbutton", "switch", "tablist",
    "textbox", "toolbar", "tree", "treegrid", "treeitem",
];

/// [§ 6.4 Global States and Properties](https://www.w3.org/TR/wai-aria-1.2/#global_states)
const GLOBAL_ARIA_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("aria-atomic", &[]),
    ("aria-busy", &[]),
    ("aria-controls", &[]),
    ("aria-current", &[]),
    ("aria-describedby", &[]),
    ("aria-details", &[]),
    ("aria-dropeffect", &[]),
    ("aria-flowto", &[]),
    ("aria-grabbed", &[]),
    ("aria-hidden", &[]),
    ("aria-keyshortcuts", &[]),
    ("aria-label", NAMING_PROHIBITED),
    ("aria-labelledby", NAMING_PROHIBITED),
    ("aria-live", &[]),
    ("aria-owns", &[]),
    ("aria-relevant", &[]),
    ("aria-roledescription", &["generic"]),
];

const NAMING_PROHIBITED: &[&str] = &[
    "caption",
    "code",
    "deletion",
    "emphasis",
    "generic",
    "insertion",
    "paragraph",
    "presentation",
    "strong",
    "subscript",
    "superscript",
];

/// Ancestors that stop `header`/`footer` from being landmarks.
const LANDMARK_PREVENTING_TAGS: &[&str] = &["article", "aside", "main", "nav", "section"];
const LANDMARK_PREVENTING_ROLES: &[&str] = &[
    "article",
    "complementary",
    "main",
    "navigation",
    "region",
];

/// [§ 4.10.5 The input element](https://html.spec.whatwg.org/multipage/input.html#attr-input-type)
const INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "date", "datetime-local", "email", "file", "hidden", "image",
    "month", "number", "password", "radio", "range", "reset", "search", "submit", "tel", "text",
    "time", "url", "week",
];

/// [§ 4.10.2 Categories](https://html.spec.whatwg.org/multipage/forms.html#category-label)
/// "Labelable elements"
const LABELABLE_TAGS: &[&str] = &[
    "button", "input", "meter", "output", "progress", "select", "textarea",
];

/// `HTMLInputElement.type`: the lowercased `type` attribute, or `"text"` for
/// missing and unknown values.
#[must_use]
pub fn input_type(tree: &DomTree, id: NodeId) -> String {
    let value = tree.attr(id, "type").unwrap_or("").to_ascii_lowercase();
    if INPUT_TYPES.contains(&value.as_str()) {
        value
    } else {
        "text".to_string()
    }
}

fn tag(tree: &DomTree, id: NodeId) -> &str {
    tree.local_name(id).unwrap_or("")
}

fn has_explicit_accessible_name(tree: &DomTree, id: NodeId) -> bool {
    tree.has_attr(id, "aria-label") || tree.has_attr(id, "aria-labelledby")
}

fn has_global_aria_attribute(tree: &DomTree, id: NodeId, for_role: Option<&str>) -> bool {
    let role = for_role.unwrap_or("");
    GLOBAL_ARIA_ATTRIBUTES
        .iter()
        .any(|(attr, prohibited)| !prohibited.contains(&role) && tree.has_attr(id, attr))
}

fn has_tab_index(tree: &DomTree, id: NodeId) -> bool {
    tree.attr(id, "tabindex")
        .is_some_and(|v| v.trim().is_empty() || v.trim().parse::<f64>().is_ok())
}

fn is_natively_focusable(tree: &DomTree, id: NodeId) -> bool {
    match tag(tree, id) {
        "button" | "details" | "select" | "textarea" => true,
        "a" | "area" => tree.has_attr(id, "href"),
        "input" => !tree.has_attr(id, "hidden"),
        _ => false,
    }
}

fn is_focusable(tree: &DomTree, id: NodeId) -> bool {
    !is_natively_disabled(tree, id) && (is_natively_focusable(tree, id) || has_tab_index(tree, id))
}

fn closest_preventing_landmark(tree: &DomTree, id: NodeId) -> bool {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .filter(|&a| tree.is_element(a))
        .any(|a| {
            let explicit = explicit_role(tree, a);
            (LANDMARK_PREVENTING_TAGS.contains(&tag(tree, a)) && !tree.has_attr(a, "role"))
                || explicit.is_some_and(|r| LANDMARK_PREVENTING_ROLES.contains(&r))
        })
}

fn closest_table(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.ancestors(id).find(|&a| tree.has_tag(a, "table"))
}

fn cell_role(tree: &DomTree, id: NodeId) -> &'static str {
    let table_role = closest_table(tree, id).and_then(|t| explicit_role(tree, t));
    if matches!(table_role, Some("grid" | "treegrid")) {
        "gridcell"
    } else {
        "cell"
    }
}

fn implicit_role_for_tag(tree: &DomTree, id: NodeId) -> Option<&'static str> {
    let role = match tag(tree, id) {
        "a" | "area" => {
            if tree.has_attr(id, "href") {
                "link"
            } else {
                return None;
            }
        }
        "article" => "article",
        "aside" => "complementary",
        "blockquote" => "blockquote",
        "button" => "button",
        "caption" => "caption",
        "code" => "code",
        "datalist" => "listbox",
        "dd" => "definition",
        "del" => "deletion",
        "details" | "fieldset" | "optgroup" => "group",
        "dfn" | "dt" => "term",
        "dialog" => "dialog",
        "em" => "emphasis",
        "figure" => "figure",
        "footer" => {
            if closest_preventing_landmark_above(tree, id) {
                return None;
            }
            "contentinfo"
        }
        "form" => {
            if has_explicit_accessible_name(tree, id) {
                "form"
            } else {
                return None;
            }
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "header" => {
            if closest_preventing_landmark_above(tree, id) {
                return None;
            }
            "banner"
        }
        "hr" => "separator",
        "html" => "document",
        "img" => {
            let presentational = tree.attr(id, "alt") == Some("")
                && tree.attr(id, "title").is_none_or(str::is_empty)
                && !has_global_aria_attribute(tree, id, None)
                && !has_tab_index(tree, id);
            if presentational { "presentation" } else { "img" }
        }
        "input" => return input_role(tree, id),
        "ins" => "insertion",
        "li" => "listitem",
        "main" => "main",
        "mark" => "mark",
        "math" => "math",
        "menu" | "ol" | "ul" => "list",
        "meter" => "meter",
        "nav" => "navigation",
        "option" => "option",
        "output" => "status",
        "p" => "paragraph",
        "progress" => "progressbar",
        "section" => {
            if has_explicit_accessible_name(tree, id) {
                "region"
            } else {
                return None;
            }
        }
        "select" => {
            let size = tree
                .attr(id, "size")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(0);
            if tree.has_attr(id, "multiple") || size > 1 {
                "listbox"
            } else {
                "combobox"
            }
        }
        "strong" => "strong",
        "sub" => "subscript",
        "sup" => "superscript",
        "svg" => "img",
        "table" => "table",
        "tbody" | "tfoot" | "thead" => "rowgroup",
        "td" => cell_role(tree, id),
        "th" => match tree.attr(id, "scope") {
            Some("col") => "columnheader",
            Some("row") => "rowheader",
            _ => cell_role(tree, id),
        },
        "textarea" => "textbox",
        "time" => "time",
        "tr" => "row",
        _ => return None,
    };
    Some(role)
}

fn closest_preventing_landmark_above(tree: &DomTree, id: NodeId) -> bool {
    tree.parent_element(id)
        .is_some_and(|parent| closest_preventing_landmark(tree, parent))
}

fn input_role(tree: &DomTree, id: NodeId) -> Option<&'static str> {
    let input_type = input_type(tree, id);
    let role = match input_type.as_str() {
        "search" => {
            if tree.has_attr(id, "list") {
                "combobox"
            } else {
                "searchbox"
            }
        }
        "email" | "tel" | "text" | "url" => {
            let list = id_refs(tree, tree.attr(id, "list")).into_iter().next();
            if list.is_some_and(|l| tree.has_tag(l, "datalist")) {
                "combobox"
            } else {
                "textbox"
            }
        }
        "hidden" => return None,
        "button" | "image" | "reset" | "submit" => "button",
        "checkbox" => "checkbox",
        "number" => "spinbutton",
        "radio" => "radio",
        "range" => "slider",
        _ => "textbox",
    };
    Some(role)
}

/// Which parent tags pass an explicit `presentation` role down to a child.
fn presentation_inheritance_parents(tag: &str) -> &'static [&'static str] {
    match tag {
        "dd" | "dt" => &["dl", "div"],
        "div" => &["dl"],
        "li" => &["ol", "ul"],
        "tbody" | "tfoot" | "thead" => &["table"],
        "td" | "th" => &["tr"],
        "tr" => &["thead", "tbody", "tfoot", "table"],
        _ => &[],
    }
}

fn implicit_role(tree: &DomTree, id: NodeId) -> Option<&'static str> {
    let implicit = implicit_role_for_tag(tree, id)?;
    // [§ 9.1 Presentational Roles Conflict Resolution](https://www.w3.org/TR/wai-aria-1.2/#conflict_resolution_presentation_none)
    let mut ancestor = id;
    while let Some(parent) = tree.parent_element(ancestor) {
        let parents = presentation_inheritance_parents(tag(tree, ancestor));
        if !parents.contains(&tag(tree, parent)) {
            break;
        }
        let parent_role = explicit_role(tree, parent);
        if let Some(role @ ("none" | "presentation")) = parent_role
            && !has_presentation_conflict_resolution(tree, parent, Some(role))
        {
            return Some(role);
        }
        ancestor = parent;
    }
    Some(implicit)
}

/// The first valid token of the `role` attribute.
///
/// [§ 7.1 Roles](https://www.w3.org/TR/wai-aria-1.2/#document-handling_author-errors_roles)
#[must_use]
pub fn explicit_role(tree: &DomTree, id: NodeId) -> Option<&'static str> {
    let roles = tree.attr(id, "role")?;
    roles.split(' ').map(str::trim).find_map(|role| {
        VALID_ROLES
            .iter()
            .find(|&&valid| valid == role)
            .copied()
    })
}

fn has_presentation_conflict_resolution(tree: &DomTree, id: NodeId, role: Option<&str>) -> bool {
    has_global_aria_attribute(tree, id, role) || is_focusable(tree, id)
}

/// The element's computed ARIA role.
#[must_use]
pub fn role(tree: &DomTree, id: NodeId) -> Option<&'static str> {
    let Some(explicit) = explicit_role(tree, id) else {
        return implicit_role(tree, id);
    };
    if explicit == "none" || explicit == "presentation" {
        let implicit = implicit_role(tree, id);
        if has_presentation_conflict_resolution(tree, id, implicit) {
            return implicit;
        }
    }
    Some(explicit)
}

fn aria_boolean(value: Option<&str>) -> Option<bool> {
    value.map(|v| v.eq_ignore_ascii_case("true"))
}

fn is_ignored_for_aria(tree: &DomTree, id: NodeId) -> bool {
    matches!(tag(tree, id), "style" | "script" | "noscript" | "template")
}

/// [§ 8.6 Excluding Elements from the Accessibility Tree](https://www.w3.org/TR/wai-aria-1.2/#tree_exclusion)
///
/// Hidden from assistive technology: not rendered, `visibility: hidden`,
/// `aria-hidden="true"` on the element or an ancestor, or never rendered
/// (script, style and the like).
#[must_use]
pub fn is_hidden_for_aria(tree: &DomTree, id: NodeId) -> bool {
    if is_ignored_for_aria(tree, id) {
        return true;
    }
    if style::display(tree, id) == Display::Contents {
        for &child in tree.children(id) {
            if tree.is_element(child) && !is_hidden_for_aria(tree, child) {
                return false;
            }
            if style::is_visible_text_node(tree, child) {
                return false;
            }
        }
        return true;
    }
    let option_inside_select =
        tree.has_tag(id, "option") && tree.ancestors(id).any(|a| tree.has_tag(a, "select"));
    if !option_inside_select && style::visibility(tree, id) != style::Visibility::Visible {
        return true;
    }
    belongs_to_display_none_or_aria_hidden(tree, id)
}

fn belongs_to_display_none_or_aria_hidden(tree: &DomTree, id: NodeId) -> bool {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .filter(|&a| tree.is_element(a))
        .any(|a| {
            style::display(tree, a) == Display::None
                || aria_boolean(tree.attr(a, "aria-hidden")) == Some(true)
        })
}

fn id_refs(tree: &DomTree, refs: Option<&str>) -> Vec<NodeId> {
    let Some(refs) = refs else {
        return Vec::new();
    };
    let mut result: Vec<NodeId> = Vec::new();
    for id in refs.split(' ').filter(|id| !id.is_empty()) {
        // "If more than one element has the same ID, the user agent SHOULD use
        // the first element found with the given ID"
        if let Some(element) = tree.element_by_id(id)
            && !result.contains(&element)
        {
            result.push(element);
        }
    }
    result
}

/// Elements referenced by `aria-labelledby`, or `None` when the attribute is absent.
#[must_use]
pub fn labelled_by_elements(tree: &DomTree, id: NodeId) -> Option<Vec<NodeId>> {
    let refs = tree.attr(id, "aria-labelledby")?;
    Some(id_refs(tree, Some(refs)))
}

fn is_labelable(tree: &DomTree, id: NodeId) -> bool {
    let tag = tag(tree, id);
    LABELABLE_TAGS.contains(&tag) && !(tag == "input" && input_type(tree, id) == "hidden")
}

/// [§ 4.10.4 The label element](https://html.spec.whatwg.org/multipage/forms.html#the-label-element)
///
/// "If the for attribute is specified... the first such element in tree order
/// is the label element's labeled control. If the for attribute is not
/// specified, but the label element has a labelable element descendant, then
/// the first such descendant in tree order is the label element's labeled control."
#[must_use]
pub fn labeled_control(tree: &DomTree, label: NodeId) -> Option<NodeId> {
    if let Some(target) = tree.attr(label, "for") {
        return tree
            .element_by_id(target)
            .filter(|&control| is_labelable(tree, control));
    }
    tree.descendant_elements(label)
        .into_iter()
        .find(|&d| is_labelable(tree, d))
}

/// `HTMLInputElement.labels`: label elements whose labeled control is `id`,
/// in tree order.
#[must_use]
pub fn labels(tree: &DomTree, id: NodeId) -> Vec<NodeId> {
    if !is_labelable(tree, id) {
        return Vec::new();
    }
    tree.descendant_elements(NodeId::ROOT)
        .into_iter()
        .filter(|&l| tree.has_tag(l, "label") && labeled_control(tree, l) == Some(id))
        .collect()
}

/// "Flat string" from [accname § 2](https://w3c.github.io/accname/#terminology).
/// Non-breaking spaces are preserved.
fn as_flat_string(s: &str) -> String {
    s.split('\u{a0}')
        .map(collapse_whitespace)
        .collect::<Vec<_>>()
        .join("\u{a0}")
        .trim()
        .to_string()
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                result.push(' ');
            }
            in_space = true;
        } else {
            result.push(c);
            in_space = false;
        }
    }
    result
}

fn allows_name_from_content(role: &str, target_descendant: bool) -> bool {
    const ALWAYS: &[&str] = &[
        "button", "cell", "checkbox", "columnheader", "gridcell", "heading", "link", "menuitem",
        "menuitemcheckbox", "menuitemradio", "option", "radio", "row", "rowheader", "switch",
        "tab", "tooltip", "treeitem",
    ];
    const DESCENDANT: &[&str] = &[
        "", "caption", "code", "contentinfo", "definition", "deletion", "emphasis", "insertion",
        "list", "listitem", "mark", "none", "paragraph", "presentation", "region", "row",
        "rowgroup", "section", "strong", "subscript", "superscript", "table", "term", "time",
    ];
    ALWAYS.contains(&role) || (target_descendant && DESCENDANT.contains(&role))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Embedding {
    None,
    SelfTarget,
    Descendant,
}

/// Where the current traversal came from, and whether its root was hidden.
#[derive(Clone, Copy)]
struct NameContext {
    include_hidden: bool,
    labelled_by: Option<bool>,
    described_by: Option<bool>,
    label: Option<bool>,
    native_text_alternative: Option<bool>,
    target: Embedding,
}

impl NameContext {
    fn child(self) -> Self {
        Self {
            target: if self.target == Embedding::SelfTarget {
                Embedding::Descendant
            } else {
                self.target
            },
            ..self
        }
    }
}

/// [Accessible Name Computation](https://w3c.github.io/accname/#computation-steps)
///
/// Returns the flattened accessible name, or an empty string for roles that
/// prohibit naming.
#[must_use]
pub fn accessible_name(tree: &DomTree, id: NodeId, include_hidden: bool) -> String {
    const PROHIBITS_NAMING: &[&str] = &[
        "caption", "code", "definition", "deletion", "emphasis", "generic", "insertion", "mark",
        "paragraph", "presentation", "strong", "subscript", "suggestion", "superscript", "term",
        "time",
    ];
    if PROHIBITS_NAMING.contains(&role(tree, id).unwrap_or("")) {
        return String::new();
    }
    let context = NameContext {
        include_hidden,
        labelled_by: None,
        described_by: None,
        label: None,
        native_text_alternative: None,
        target: Embedding::SelfTarget,
    };
    let mut visited = HashSet::new();
    as_flat_string(&text_alternative(tree, id, context, &mut visited))
}

fn name_from_labels(
    tree: &DomTree,
    labels: &[NodeId],
    context: NameContext,
    visited: &mut HashSet<NodeId>,
) -> String {
    labels
        .iter()
        .map(|&label| {
            let label_context = NameContext {
                label: Some(is_hidden_for_aria(tree, label)),
                native_text_alternative: None,
                labelled_by: None,
                described_by: None,
                target: Embedding::None,
                ..context
            };
            text_alternative(tree, label, label_context, visited)
        })
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_child_with_tag(tree: &DomTree, id: NodeId, tag: &str) -> Option<NodeId> {
    tree.element_children(id).find(|&c| tree.has_tag(c, tag))
}

fn attr_or_empty<'a>(tree: &'a DomTree, id: NodeId, name: &str) -> &'a str {
    tree.attr(id, name).unwrap_or("")
}

fn text_alternative(
    tree: &DomTree,
    id: NodeId,
    context: NameContext,
    visited: &mut HashSet<NodeId>,
) -> String {
    if visited.contains(&id) {
        return String::new();
    }
    let child_context = context.child();

    // step 2a.
    if !context.include_hidden {
        let in_hidden_reference = context.labelled_by == Some(true)
            || context.described_by == Some(true)
            || context.native_text_alternative == Some(true)
            || context.label == Some(true);
        if is_ignored_for_aria(tree, id) || (!in_hidden_reference && is_hidden_for_aria(tree, id))
        {
            let _ = visited.insert(id);
            return String::new();
        }
    }

    let labelled_by = labelled_by_elements(tree, id);

    // step 2b.
    if context.labelled_by.is_none() {
        let name = labelled_by
            .iter()
            .flatten()
            .map(|&r| {
                let ref_context = NameContext {
                    labelled_by: Some(is_hidden_for_aria(tree, r)),
                    described_by: None,
                    target: Embedding::None,
                    label: None,
                    native_text_alternative: None,
                    ..context
                };
                text_alternative(tree, r, ref_context, visited)
            })
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return name;
        }
    }

    let role = role(tree, id).unwrap_or("");
    let tag = tag(tree, id);

    // step 2c: embedded controls.
    if context.label.is_some()
        || context.labelled_by.is_some()
        || context.target == Embedding::Descendant
    {
        let own_label = labels(tree, id).contains(&id);
        let own_labelled_by = labelled_by.as_ref().is_some_and(|l| l.contains(&id));
        if !own_label && !own_labelled_by {
            if role == "textbox" {
                let _ = visited.insert(id);
                if tag == "input" {
                    return attr_or_empty(tree, id, "value").to_string();
                }
                return tree.text_content(id);
            }
            if role == "combobox" || role == "listbox" {
                let _ = visited.insert(id);
                let mut selected: Vec<NodeId> = Vec::new();
                if tag == "select" {
                    let options: Vec<NodeId> = tree
                        .descendant_elements(id)
                        .into_iter()
                        .filter(|&o| tree.has_tag(o, "option"))
                        .collect();
                    selected = options
                        .iter()
                        .copied()
                        .filter(|&o| tree.has_attr(o, "selected"))
                        .collect();
                    if selected.is_empty() {
                        selected.extend(options.first());
                    }
                } else {
                    let listbox = if role == "combobox" {
                        tree.descendant_elements(id)
                            .into_iter()
                            .find(|&e| self::role(tree, e) == Some("listbox"))
                    } else {
                        Some(id)
                    };
                    if let Some(listbox) = listbox {
                        selected = tree
                            .descendant_elements(listbox)
                            .into_iter()
                            .filter(|&e| {
                                tree.attr(e, "aria-selected") == Some("true")
                                    && self::role(tree, e) == Some("option")
                            })
                            .collect();
                    }
                }
                if selected.is_empty() && tag == "input" {
                    return attr_or_empty(tree, id, "value").to_string();
                }
                return selected
                    .into_iter()
                    .map(|o| text_alternative(tree, o, child_context, visited))
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            if matches!(
                role,
                "progressbar" | "scrollbar" | "slider" | "spinbutton" | "meter"
            ) {
                let _ = visited.insert(id);
                if let Some(text) = tree.attr(id, "aria-valuetext") {
                    return text.to_string();
                }
                if let Some(now) = tree.attr(id, "aria-valuenow") {
                    return now.to_string();
                }
                return attr_or_empty(tree, id, "value").to_string();
            }
            if role == "menu" {
                let _ = visited.insert(id);
                return String::new();
            }
        }
    }

    // step 2d.
    let aria_label = attr_or_empty(tree, id, "aria-label");
    if !aria_label.trim().is_empty() {
        let _ = visited.insert(id);
        return aria_label.to_string();
    }

    // step 2e.
    if role != "presentation"
        && role != "none"
        && let Some(name) = native_text_alternative(
            tree,
            id,
            tag,
            labelled_by.is_some(),
            context,
            child_context,
            visited,
        )
    {
        return name;
    }

    // step 2f + step 2h.
    let name_from_summary = tag == "summary" && role != "presentation" && role != "none";
    if allows_name_from_content(role, context.target == Embedding::Descendant)
        || name_from_summary
        || context.labelled_by.is_some()
        || context.described_by.is_some()
        || context.label.is_some()
        || context.native_text_alternative.is_some()
    {
        let _ = visited.insert(id);
        let mut name = String::new();
        for &child in tree.children(id) {
            if tree.is_element(child) {
                let token = text_alternative(tree, child, child_context, visited);
                if style::display(tree, child) == Display::Inline && !tree.has_tag(child, "br") {
                    name.push_str(&token);
                } else {
                    name.push(' ');
                    name.push_str(&token);
                    name.push(' ');
                }
            } else if let Some(text) = tree.as_text(child) {
                // step 2g.
                name.push_str(text);
            }
        }
        let significant = if context.target == Embedding::SelfTarget {
            !name.trim().is_empty()
        } else {
            !name.is_empty()
        };
        if significant {
            return name;
        }
    }

    // step 2i.
    if (role != "presentation" && role != "none") || tag == "iframe" {
        let _ = visited.insert(id);
        let title = attr_or_empty(tree, id, "title");
        if !title.trim().is_empty() {
            return title.to_string();
        }
    }

    let _ = visited.insert(id);
    String::new()
}

/// Host-language text alternatives from
/// [HTML-AAM § 5 Accessible Name Computations](https://w3c.github.io/html-aam/#accessible-name-and-description-computation).
fn native_text_alternative(
    tree: &DomTree,
    id: NodeId,
    tag: &str,
    has_labelled_by: bool,
    context: NameContext,
    child_context: NameContext,
    visited: &mut HashSet<NodeId>,
) -> Option<String> {
    let input_type = if tag == "input" {
        input_type(tree, id)
    } else {
        String::new()
    };

    if tag == "input" && matches!(input_type.as_str(), "button" | "submit" | "reset") {
        let _ = visited.insert(id);
        let value = attr_or_empty(tree, id, "value");
        if !value.trim().is_empty() {
            return Some(value.to_string());
        }
        return Some(match input_type.as_str() {
            "submit" => "Submit".to_string(),
            "reset" => "Reset".to_string(),
            _ => attr_or_empty(tree, id, "title").to_string(),
        });
    }

    if tag == "input" && input_type == "image" {
        let _ = visited.insert(id);
        let labels = labels(tree, id);
        if !labels.is_empty() && context.labelled_by.is_none() {
            return Some(name_from_labels(tree, &labels, context, visited));
        }
        for attr in ["alt", "title"] {
            let value = attr_or_empty(tree, id, attr);
            if !value.trim().is_empty() {
                return Some(value.to_string());
            }
        }
        return Some("Submit".to_string());
    }

    if !has_labelled_by && tag == "button" {
        let labels = labels(tree, id);
        if !labels.is_empty() {
            let _ = visited.insert(id);
            return Some(name_from_labels(tree, &labels, context, visited));
        }
    }

    if !has_labelled_by && tag == "output" {
        let _ = visited.insert(id);
        let labels = labels(tree, id);
        if !labels.is_empty() {
            return Some(name_from_labels(tree, &labels, context, visited));
        }
        return Some(attr_or_empty(tree, id, "title").to_string());
    }

    if !has_labelled_by && matches!(tag, "textarea" | "select" | "input") {
        let _ = visited.insert(id);
        let labels = labels(tree, id);
        if !labels.is_empty() {
            return Some(name_from_labels(tree, &labels, context, visited));
        }
        let use_placeholder = (tag == "input"
            && matches!(
                input_type.as_str(),
                "text" | "password" | "search" | "tel" | "email" | "url"
            ))
            || tag == "textarea";
        let title = attr_or_empty(tree, id, "title");
        if !use_placeholder || !title.is_empty() {
            return Some(title.to_string());
        }
        return Some(attr_or_empty(tree, id, "placeholder").to_string());
    }

    let caption_tag = match tag {
        "fieldset" if !has_labelled_by => Some("legend"),
        "figure" if !has_labelled_by => Some("figcaption"),
        "table" => Some("caption"),
        _ => None,
    };
    if let Some(caption_tag) = caption_tag {
        let _ = visited.insert(id);
        if let Some(caption) = first_child_with_tag(tree, id, caption_tag) {
            let caption_context = NameContext {
                native_text_alternative: Some(is_hidden_for_aria(tree, caption)),
                ..child_context
            };
            return Some(text_alternative(tree, caption, caption_context, visited));
        }
        if tag == "table" {
            let summary = attr_or_empty(tree, id, "summary");
            if !summary.is_empty() {
                return Some(summary.to_string());
            }
            return None;
        }
        return Some(attr_or_empty(tree, id, "title").to_string());
    }

    if tag == "img" || tag == "area" {
        let _ = visited.insert(id);
        let alt = attr_or_empty(tree, id, "alt");
        if !alt.trim().is_empty() {
            return Some(alt.to_string());
        }
        return Some(attr_or_empty(tree, id, "title").to_string());
    }

    if tag == "svg" {
        let _ = visited.insert(id);
        if let Some(title) = first_child_with_tag(tree, id, "title") {
            let title_context = NameContext {
                labelled_by: Some(is_hidden_for_aria(tree, title)),
                ..child_context
            };
            return Some(text_alternative(tree, title, title_context, visited));
        }
    }

    None
}

/// [§ 6.6 aria-selected](https://www.w3.org/TR/wai-aria-1.2/#aria-selected)
#[must_use]
pub fn selected(tree: &DomTree, id: NodeId) -> bool {
    if tree.has_tag(id, "option") {
        return tree.has_attr(id, "selected");
    }
    if SELECTED_ROLES.contains(&role(tree, id).unwrap_or("")) {
        return aria_boolean(tree.attr(id, "aria-selected")) == Some(true);
    }
    false
}

/// [§ 6.6 aria-checked](https://www.w3.org/TR/wai-aria-1.2/#aria-checked)
///
/// `None` when the element's role does not support the checked state.
#[must_use]
pub fn checked_state(tree: &DomTree, id: NodeId) -> Option<AriaChecked> {
    if tree.has_tag(id, "input") && matches!(input_type(tree, id).as_str(), "checkbox" | "radio") {
        return Some(if tree.has_attr(id, "checked") {
            AriaChecked::True
        } else {
            AriaChecked::False
        });
    }
    if CHECKED_ROLES.contains(&role(tree, id).unwrap_or("")) {
        return Some(match tree.attr(id, "aria-checked") {
            Some("true") => AriaChecked::True,
            Some("mixed") => AriaChecked::Mixed,
            _ => AriaChecked::False,
        });
    }
    None
}

/// `aria-checked` with unsupported roles reported as unchecked.
#[must_use]
pub fn checked(tree: &DomTree, id: NodeId) -> AriaChecked {
    checked_state(tree, id).unwrap_or(AriaChecked::False)
}

/// [§ 6.6 aria-pressed](https://www.w3.org/TR/wai-aria-1.2/#aria-pressed)
#[must_use]
pub fn pressed(tree: &DomTree, id: NodeId) -> AriaChecked {
    if PRESSED_ROLES.contains(&role(tree, id).unwrap_or("")) {
        match tree.attr(id, "aria-pressed") {
            Some("true") => return AriaChecked::True,
            Some("mixed") => return AriaChecked::Mixed,
            _ => {}
        }
    }
    AriaChecked::False
}

/// [§ 6.6 aria-expanded](https://www.w3.org/TR/wai-aria-1.2/#aria-expanded)
#[must_use]
pub fn expanded(tree: &DomTree, id: NodeId) -> AriaExpanded {
    if tree.has_tag(id, "details") {
        return if tree.has_attr(id, "open") {
            AriaExpanded::True
        } else {
            AriaExpanded::False
        };
    }
    if EXPANDED_ROLES.contains(&role(tree, id).unwrap_or("")) {
        return match tree.attr(id, "aria-expanded") {
            None => AriaExpanded::None,
            Some("true") => AriaExpanded::True,
            Some(_) => AriaExpanded::False,
        };
    }
    AriaExpanded::None
}

/// [§ 6.6 aria-level](https://www.w3.org/TR/wai-aria-1.2/#aria-level)
///
/// Zero when the element has no level.
#[must_use]
pub fn level(tree: &DomTree, id: NodeId) -> u32 {
    let native = match tag(tree, id) {
        "h1" => 1,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        "h6" => 6,
        _ => 0,
    };
    if native != 0 {
        return native;
    }
    if LEVEL_ROLES.contains(&role(tree, id).unwrap_or(""))
        && let Some(level) = tree
            .attr(id, "aria-level")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&v| v >= 1)
    {
        return level;
    }
    0
}

/// [§ 6.6 aria-disabled](https://www.w3.org/TR/wai-aria-1.2/#aria-disabled)
///
/// `aria-disabled` applies to all descendants, so ancestors are consulted.
#[must_use]
pub fn disabled(tree: &DomTree, id: NodeId) -> bool {
    is_natively_disabled(tree, id) || has_explicit_aria_disabled(tree, id)
}

fn is_natively_disabled(tree: &DomTree, id: NodeId) -> bool {
    let native_form_control = matches!(
        tag(tree, id),
        "button" | "input" | "select" | "textarea" | "option" | "optgroup"
    );
    native_form_control && (tree.has_attr(id, "disabled") || belongs_to_disabled_fieldset(tree, id))
}

fn belongs_to_disabled_fieldset(tree: &DomTree, id: NodeId) -> bool {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .any(|a| tree.has_tag(a, "fieldset") && tree.has_attr(a, "disabled"))
}

fn has_explicit_aria_disabled(tree: &DomTree, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(element) = current {
        if DISABLED_ROLES.contains(&role(tree, element).unwrap_or("")) {
            let value = attr_or_empty(tree, element, "aria-disabled").to_ascii_lowercase();
            if value == "true" {
                return true;
            }
            if value == "false" {
                return false;
            }
        }
        current = tree.parent_element(element);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_string_collapses_whitespace_but_keeps_nbsp() {
        assert_eq!(as_flat_string("  a \n\t b\u{a0} c "), "a b\u{a0} c");
    }

    #[test]
    fn test_explicit_role_skips_invalid_tokens() {
        let mut tree = DomTree::new();
        let div = tree.append_element(NodeId::ROOT, "div", &[("role", "bogus command button")]);
        assert_eq!(explicit_role(&tree, div), Some("button"));
    }

    #[test]
    fn test_presentation_inherits_to_list_items() {
        let mut tree = DomTree::new();
        let ul = tree.append_element(NodeId::ROOT, "ul", &[("role", "presentation")]);
        let li = tree.append_element(ul, "li", &[]);
        assert_eq!(role(&tree, li), Some("presentation"));
    }
}
