//! The pluggable engine interface and the built-in engines.
//!
//! An engine turns one `name=body` part into elements, starting from a
//! root. The dispatcher in [`crate::query`] feeds it each element produced by
//! the previous part.

use quarry_css::{
    CUSTOM_CSS_NAMES, ClauseCombinator, CssComplexSelector, CssComplexSelectorPart,
    CssSimpleSelector, parse_css,
};
use quarry_dom::{AriaChecked, AriaExpanded, DomTree, NodeId, aria, style};

use crate::attribute::{
    AttributeOperator, AttributeSelectorPart, AttributeValue, parse_attribute_selector,
};
use crate::error::SelectorError;
use crate::parser::{NestedSelectorBody, SelectorBody};
use crate::query::QueryContext;
use crate::string_utils::{json_quote, normalize_white_space};
use crate::text::{
    TextMatch, TextMatcherKind, create_text_matcher, element_matches_text, get_element_labels,
};

/// Evaluates one selector part.
///
/// [`Selectors::register`](crate::Selectors::register) accepts any
/// implementation under a new name.
pub trait SelectorEngine {
    /// All elements matching `body`, starting from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when `body` is malformed for this engine.
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError>;
}

/// Names of the engines [`crate::Selectors::new`] registers. They cannot be
/// replaced.
pub const BUILTIN_ENGINE_NAMES: &[&str] = &[
    "css",
    "text",
    "id",
    "data-testid",
    "data-test-id",
    "data-test",
    "role",
    "visible",
    "nth",
    "internal:attr",
    "internal:testid",
    "internal:label",
    "internal:text",
    "internal:has-text",
    "internal:has-not-text",
    "internal:role",
    "internal:has",
    "internal:has-not",
    "internal:and",
    "internal:or",
    "internal:chain",
    "internal:control",
    "internal:describe",
];

/// Create the engine registered under a built-in `name`.
#[must_use]
pub fn builtin_engine(name: &str) -> Option<Box<dyn SelectorEngine>> {
    let engine: Box<dyn SelectorEngine> = match name {
        "css" => Box::new(CssEngine),
        "text" => Box::new(TextEngine { internal: false }),
        "internal:text" => Box::new(TextEngine { internal: true }),
        "id" | "data-testid" | "data-test-id" | "data-test" => Box::new(AttributeEngine {
            attribute: name.to_string(),
        }),
        "role" => Box::new(RoleEngine { internal: false }),
        "internal:role" => Box::new(RoleEngine { internal: true }),
        "visible" => Box::new(VisibleEngine),
        // Handled by the dispatcher; registered so selectors naming them validate.
        "nth" | "internal:and" | "internal:or" => Box::new(DispatcherEngine {
            name: name.to_string(),
        }),
        "internal:attr" | "internal:testid" => Box::new(NamedAttributeEngine),
        "internal:label" => Box::new(LabelEngine),
        "internal:has-text" => Box::new(HasTextEngine { negate: false }),
        "internal:has-not-text" => Box::new(HasTextEngine { negate: true }),
        "internal:has" => Box::new(HasEngine { negate: false }),
        "internal:has-not" => Box::new(HasEngine { negate: true }),
        "internal:chain" => Box::new(ChainEngine),
        "internal:control" => Box::new(ControlEngine),
        "internal:describe" => Box::new(DescribeEngine),
        _ => return None,
    };
    Some(engine)
}

fn raw_body<'b>(engine: &str, body: &'b SelectorBody) -> Result<&'b str, SelectorError> {
    match body {
        SelectorBody::Raw(text) => Ok(text),
        SelectorBody::Css(_) | SelectorBody::Nested(_) => Err(SelectorError::Engine(format!(
            "\"{engine}\" engine expects a string body"
        ))),
    }
}

fn nested_body<'b>(engine: &str, body: &'b SelectorBody) -> Result<&'b NestedSelectorBody, SelectorError> {
    match body {
        SelectorBody::Nested(nested) => Ok(nested),
        SelectorBody::Css(_) | SelectorBody::Raw(_) => Err(SelectorError::Engine(format!(
            "\"{engine}\" engine expects a nested selector"
        ))),
    }
}

/// A single-compound CSS selector list.
fn compound_list(css: String) -> Vec<CssComplexSelector> {
    vec![CssComplexSelector {
        simples: vec![CssComplexSelectorPart {
            selector: CssSimpleSelector {
                css: Some(css),
                functions: Vec::new(),
            },
            combinator: ClauseCombinator::Descendant,
        }],
    }]
}

// ========== css ==========

struct CssEngine;

impl SelectorEngine for CssEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        match body {
            SelectorBody::Css(list) => cx.evaluator().query(root, list),
            SelectorBody::Raw(text) => {
                let parsed = parse_css(text, CUSTOM_CSS_NAMES)?;
                cx.evaluator().query(root, &parsed.selector)
            }
            SelectorBody::Nested(_) => Err(SelectorError::Engine(
                "\"css\" engine expects a css selector".to_string(),
            )),
        }
    }
}

/// `id=`, `data-testid=` and friends: exact attribute value.
struct AttributeEngine {
    attribute: String,
}

impl SelectorEngine for AttributeEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let value = raw_body(&self.attribute, body)?;
        let css = format!("[{}={}]", self.attribute, json_quote(value));
        cx.evaluator().query(root, &compound_list(css))
    }
}

// ========== text ==========

struct TextEngine {
    internal: bool,
}

impl SelectorEngine for TextEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let tree = cx.tree();
        let matcher = create_text_matcher(raw_body("text", body)?, self.internal)?;
        let kind = matcher.kind();
        let mut result = Vec::new();
        let mut last_did_not_match_self: Option<NodeId> = None;

        let candidates = tree
            .is_element(root)
            .then_some(root)
            .into_iter()
            .chain(tree.descendant_elements(root));
        for element in candidates {
            if kind == TextMatcherKind::Lax
                && last_did_not_match_self.is_some_and(|skipped| tree.contains(skipped, element))
            {
                continue;
            }
            let matches = element_matches_text(cx.text_cache(), tree, element, |text| {
                matcher.matches(text)
            });
            match matches {
                TextMatch::None => last_did_not_match_self = Some(element),
                TextMatch::SelfMatch => result.push(element),
                TextMatch::SelfAndChildren => {
                    if kind == TextMatcherKind::Strict && !self.internal {
                        result.push(element);
                    }
                }
            }
        }
        Ok(result)
    }
}

/// `internal:has-text` / `internal:has-not-text`: filter the root by its text.
struct HasTextEngine {
    negate: bool,
}

impl SelectorEngine for HasTextEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let tree = cx.tree();
        if !tree.is_element(root) {
            return Ok(Vec::new());
        }
        let matcher = create_text_matcher(raw_body("internal:has-text", body)?, true)?;
        let matches = matcher.matches(&cx.text_cache().element_text(tree, root));
        Ok(if matches == self.negate { Vec::new() } else { vec![root] })
    }
}

struct LabelEngine;

impl SelectorEngine for LabelEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let tree = cx.tree();
        let matcher = create_text_matcher(raw_body("internal:label", body)?, true)?;
        Ok(tree
            .descendant_elements(root)
            .into_iter()
            .filter(|&element| {
                get_element_labels(cx.text_cache(), tree, element)
                    .iter()
                    .any(|label| matcher.matches(label))
            })
            .collect())
    }
}

// ========== attributes ==========

/// `internal:attr=[placeholder="Name"i]` and `internal:testid=[data-testid="x"s]`.
struct NamedAttributeEngine;

impl SelectorEngine for NamedAttributeEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let tree = cx.tree();
        let text = raw_body("internal:attr", body)?;
        let parsed = parse_attribute_selector(text, true)?;
        let [part] = parsed.attributes.as_slice() else {
            return Err(SelectorError::Engine(format!(
                "Malformed attribute selector: {text}"
            )));
        };
        if !parsed.name.is_empty() {
            return Err(SelectorError::Engine(format!(
                "Malformed attribute selector: {text}"
            )));
        }
        Ok(tree
            .descendant_elements(root)
            .into_iter()
            .filter(|&element| {
                tree.attr(element, &part.name)
                    .is_some_and(|actual| attribute_value_matches(part, actual))
            })
            .collect())
    }
}

/// `=` compares like a text matcher: pattern test, exact, or case-insensitive
/// substring. The other operators keep their CSS meaning.
fn attribute_value_matches(part: &AttributeSelectorPart, actual: &str) -> bool {
    if part.op != AttributeOperator::Equals {
        return part.matches(&AttributeValue::String(actual.to_string()));
    }
    match &part.value {
        AttributeValue::Regex(re) => re.is_match(actual),
        AttributeValue::String(expected) if part.case_sensitive => actual == expected,
        AttributeValue::String(expected) => actual
            .to_lowercase()
            .contains(&expected.to_lowercase()),
        _ => part.matches(&AttributeValue::String(actual.to_string())),
    }
}

// ========== role ==========

const ROLE_ATTRIBUTES: &[&str] = &[
    "checked",
    "disabled",
    "expanded",
    "include-hidden",
    "level",
    "name",
    "pressed",
    "selected",
];

#[derive(Debug, Default)]
struct RoleOptions {
    role: String,
    name: Option<AttributeValue>,
    name_op: Option<AttributeOperator>,
    exact: bool,
    checked: Option<AriaChecked>,
    pressed: Option<AriaChecked>,
    selected: Option<bool>,
    expanded: Option<bool>,
    level: Option<f64>,
    disabled: Option<bool>,
    include_hidden: bool,
}

/// `role=button[name="OK"][pressed]`: elements by ARIA role and state.
struct RoleEngine {
    internal: bool,
}

impl SelectorEngine for RoleEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = parse_attribute_selector(raw_body("role", body)?, true)?;
        let role = parsed.name.to_lowercase();
        if role.is_empty() {
            return Err(SelectorError::Engine("Role must not be empty".to_string()));
        }
        let mut options = validate_role_attributes(&parsed.attributes, role)?;
        if let Some(AttributeValue::String(name)) = &options.name {
            options.name = Some(AttributeValue::String(normalize_white_space(name)));
        }
        // internal:role treats a case-insensitive name as a substring.
        if self.internal && !options.exact && options.name_op == Some(AttributeOperator::Equals) {
            options.name_op = Some(AttributeOperator::Contains);
        }
        let tree = cx.tree();
        Ok(tree
            .descendant_elements(root)
            .into_iter()
            .filter(|&element| role_matches(tree, element, &options))
            .collect())
    }
}

fn role_matches(tree: &DomTree, element: NodeId, options: &RoleOptions) -> bool {
    if aria::role(tree, element) != Some(options.role.as_str()) {
        return false;
    }
    if options
        .selected
        .is_some_and(|selected| aria::selected(tree, element) != selected)
    {
        return false;
    }
    if options
        .checked
        .is_some_and(|checked| aria::checked(tree, element) != checked)
    {
        return false;
    }
    if options
        .pressed
        .is_some_and(|pressed| aria::pressed(tree, element) != pressed)
    {
        return false;
    }
    if let Some(expanded) = options.expanded {
        let actual = match aria::expanded(tree, element) {
            AriaExpanded::True => Some(true),
            AriaExpanded::False => Some(false),
            AriaExpanded::None => None,
        };
        if actual != Some(expanded) {
            return false;
        }
    }
    if options
        .level
        .is_some_and(|level| (f64::from(aria::level(tree, element)) - level).abs() > f64::EPSILON)
    {
        return false;
    }
    if options
        .disabled
        .is_some_and(|disabled| aria::disabled(tree, element) != disabled)
    {
        return false;
    }
    if !options.include_hidden && aria::is_hidden_for_aria(tree, element) {
        return false;
    }
    if let Some(name) = &options.name {
        let accessible_name =
            normalize_white_space(&aria::accessible_name(tree, element, options.include_hidden));
        let part = AttributeSelectorPart {
            name: String::new(),
            json_path: Vec::new(),
            op: options.name_op.unwrap_or(AttributeOperator::Equals),
            value: name.clone(),
            case_sensitive: options.exact,
        };
        if !part.matches(&AttributeValue::String(accessible_name)) {
            return false;
        }
    }
    true
}

fn validate_role_attributes(
    attributes: &[AttributeSelectorPart],
    role: String,
) -> Result<RoleOptions, SelectorError> {
    let mut options = RoleOptions {
        role,
        ..RoleOptions::default()
    };
    for attr in attributes {
        match attr.name.as_str() {
            "checked" | "pressed" => {
                let roles = if attr.name == "checked" {
                    aria::CHECKED_ROLES
                } else {
                    aria::PRESSED_ROLES
                };
                validate_supported_role(&attr.name, roles, &options.role)?;
                validate_supported_op(attr)?;
                let value = if attr.op == AttributeOperator::Truthy {
                    &AttributeValue::Bool(true)
                } else {
                    &attr.value
                };
                let state = match value {
                    AttributeValue::Bool(true) => AriaChecked::True,
                    AttributeValue::Bool(false) => AriaChecked::False,
                    AttributeValue::String(s) if s == "mixed" => AriaChecked::Mixed,
                    _ => {
                        return Err(SelectorError::Engine(format!(
                            "\"{}\" must be one of true, false, \"mixed\"",
                            attr.name
                        )));
                    }
                };
                if attr.name == "checked" {
                    options.checked = Some(state);
                } else {
                    options.pressed = Some(state);
                }
            }
            "selected" => {
                validate_supported_role(&attr.name, aria::SELECTED_ROLES, &options.role)?;
                options.selected = Some(boolean_attribute(attr)?);
            }
            "expanded" => {
                validate_supported_role(&attr.name, aria::EXPANDED_ROLES, &options.role)?;
                options.expanded = Some(boolean_attribute(attr)?);
            }
            "level" => {
                validate_supported_role(&attr.name, aria::LEVEL_ROLES, &options.role)?;
                let level = match &attr.value {
                    AttributeValue::Number(n) => Some(*n),
                    AttributeValue::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                match level {
                    Some(level) if attr.op == AttributeOperator::Equals && !level.is_nan() => {
                        options.level = Some(level);
                    }
                    _ => {
                        return Err(SelectorError::Engine(
                            "\"level\" attribute must be compared to a number".to_string(),
                        ));
                    }
                }
            }
            "disabled" => options.disabled = Some(boolean_attribute(attr)?),
            "include-hidden" => options.include_hidden = boolean_attribute(attr)?,
            "name" => {
                if attr.op == AttributeOperator::Truthy {
                    return Err(SelectorError::Engine(
                        "\"name\" attribute must have a value".to_string(),
                    ));
                }
                if !matches!(attr.value, AttributeValue::String(_) | AttributeValue::Regex(_)) {
                    return Err(SelectorError::Engine(
                        "\"name\" attribute must be a string or a regular expression".to_string(),
                    ));
                }
                options.name = Some(attr.value.clone());
                options.name_op = Some(attr.op);
                options.exact = attr.case_sensitive;
            }
            other => {
                return Err(SelectorError::Engine(format!(
                    "Unknown attribute \"{other}\", must be one of {}.",
                    quoted_list(ROLE_ATTRIBUTES)
                )));
            }
        }
    }
    Ok(options)
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_supported_role(attr: &str, roles: &[&str], role: &str) -> Result<(), SelectorError> {
    if roles.contains(&role) {
        return Ok(());
    }
    let mut sorted = roles.to_vec();
    sorted.sort_unstable();
    Err(SelectorError::Engine(format!(
        "\"{attr}\" attribute is only supported for roles: {}",
        quoted_list(&sorted)
    )))
}

fn validate_supported_op(attr: &AttributeSelectorPart) -> Result<(), SelectorError> {
    if matches!(attr.op, AttributeOperator::Truthy | AttributeOperator::Equals) {
        return Ok(());
    }
    Err(SelectorError::Engine(format!(
        "\"{}\" does not support \"{}\" matcher",
        attr.name, attr.op
    )))
}

fn boolean_attribute(attr: &AttributeSelectorPart) -> Result<bool, SelectorError> {
    validate_supported_op(attr)?;
    if attr.op == AttributeOperator::Truthy {
        return Ok(true);
    }
    match attr.value {
        AttributeValue::Bool(value) => Ok(value),
        _ => Err(SelectorError::Engine(format!(
            "\"{}\" must be one of true, false",
            attr.name
        ))),
    }
}

// ========== structural ==========

/// `visible=true` / `visible=false`: filter the root by visibility.
struct VisibleEngine;

impl SelectorEngine for VisibleEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        if !cx.tree().is_element(root) {
            return Ok(Vec::new());
        }
        let visible = raw_body("visible", body)? == "true";
        Ok(if style::is_element_visible(cx.tree(), root) == visible {
            vec![root]
        } else {
            Vec::new()
        })
    }
}

/// `internal:has` / `internal:has-not`: filter the root by a nested match.
struct HasEngine {
    negate: bool,
}

impl SelectorEngine for HasEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        if !cx.tree().is_element(root) {
            return Ok(Vec::new());
        }
        let nested = nested_body("internal:has", body)?;
        let has = cx.query_selector(&nested.parsed, root)?.is_some();
        Ok(if has == self.negate { Vec::new() } else { vec![root] })
    }
}

/// `internal:chain`: run a nested selector from the root.
struct ChainEngine;

impl SelectorEngine for ChainEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        cx.query_all(&nested_body("internal:chain", body)?.parsed, root)
    }
}

/// `internal:control=enter-frame|return-empty|component`.
struct ControlEngine;

impl SelectorEngine for ControlEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let tree = cx.tree();
        match raw_body("internal:control", body)? {
            // Frames are not modelled: nothing is reachable past the boundary.
            "enter-frame" | "return-empty" => Ok(Vec::new()),
            "component" => {
                if !tree.is_element(root) {
                    return Ok(Vec::new());
                }
                let mut children = tree.element_children(root);
                let only_child = match (children.next(), children.next()) {
                    (Some(child), None) => child,
                    _ => root,
                };
                Ok(vec![only_child])
            }
            other => Err(SelectorError::Engine(format!(
                "Internal error, unknown internal:control selector {other}"
            ))),
        }
    }
}

/// `internal:describe`: a label for the locator; matches the root itself.
struct DescribeEngine;

impl SelectorEngine for DescribeEngine {
    fn query_all(
        &self,
        cx: &QueryContext<'_>,
        root: NodeId,
        _body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        Ok(cx.tree().is_element(root).then_some(root).into_iter().collect())
    }
}

/// Placeholder for parts the dispatcher evaluates itself.
///
/// The dispatcher folds `nth`, `internal:and` and `internal:or` over the
/// current set before any engine lookup, so reaching this is a routing bug.
struct DispatcherEngine {
    name: String,
}

impl SelectorEngine for DispatcherEngine {
    fn query_all(
        &self,
        _cx: &QueryContext<'_>,
        _root: NodeId,
        _body: &SelectorBody,
    ) -> Result<Vec<NodeId>, SelectorError> {
        Err(SelectorError::Engine(format!(
            "Internal error, \"{}\" must be evaluated by the selector dispatcher",
            self.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Selectors;
    use crate::text::TextCache;

    #[test]
    fn test_dispatcher_parts_fail_outside_the_dispatcher() {
        let mut tree = DomTree::new();
        let _ = tree.append_element(NodeId::ROOT, "div", &[]);
        let selectors = Selectors::default();
        let text_cache = TextCache::new();
        let cx = QueryContext::new(&tree, &selectors, &text_cache);
        for name in ["nth", "internal:and", "internal:or"] {
            let engine = builtin_engine(name).unwrap();
            let result = engine.query_all(&cx, NodeId::ROOT, &SelectorBody::Raw("0".to_string()));
            assert!(matches!(result, Err(SelectorError::Engine(_))), "{name}");
        }
    }
}
