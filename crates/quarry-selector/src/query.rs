//! The engine registry and the dispatcher that evaluates a parsed selector.
//!
//! [`Selectors`] owns the engines and the options. Each call creates a
//! [`QueryContext`] that borrows the tree and carries the per-query caches,
//! then folds the selector parts left to right over a working set of
//! elements seeded with the root.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::sync::LazyLock;

use quarry_dom::{DomTree, NodeId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{BUILTIN_ENGINE_NAMES, SelectorEngine, builtin_engine};
use crate::error::SelectorError;
use crate::evaluator::CssEvaluator;
use crate::generator::{GenerateOptions, GeneratedSelector, generate_selector};
use crate::layout::{LayoutSelectorName, layout_selector_score};
use crate::locator::{Language, as_locator, as_locators, locator_or_selector_as_selector};
use crate::parser::{
    NestedSelectorBody, ParsedSelector, ParsedSelectorPart, SelectorBody, parse_selector,
    stringify_selector, visit_all_selector_parts,
};
use crate::string_utils::{static_regex, trim_string_with_ellipsis};
use crate::text::TextCache;

static ENGINE_NAME: LazyLock<Regex> = LazyLock::new(|| static_regex("^[a-zA-Z_0-9-]+$"));

/// How many matches a strict-mode error lists.
const MAX_STRICT_PREVIEWS: usize = 10;

/// Attributes rendered without a value in previews when empty.
const BOOLEAN_ATTRIBUTES: &[&str] = &["checked", "selected", "disabled", "readonly", "multiple"];

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
/// "Void elements", plus a few obsolete ones.
const AUTO_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "menuitem", "meta", "param", "source", "track", "wbr",
];

/// Settings shared by every operation of a [`Selectors`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuarryOptions {
    /// The attribute `getByTestId` targets.
    pub test_id_attribute: String,
    /// Fail [`Selectors::query`] when more than one element matches.
    pub strict: bool,
    /// Upper bound on alternative renderings from `as_locators`.
    pub max_locator_outputs: usize,
    /// Language of the locators embedded in error messages.
    pub language: Language,
}

impl Default for QuarryOptions {
    fn default() -> Self {
        Self {
            test_id_attribute: "data-testid".to_string(),
            strict: false,
            max_locator_outputs: 20,
            language: Language::JavaScript,
        }
    }
}

/// The engine registry.
pub struct Selectors {
    engines: HashMap<String, Box<dyn SelectorEngine>>,
    options: QuarryOptions,
}

impl fmt::Debug for Selectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.engines.keys().collect();
        names.sort();
        f.debug_struct("Selectors")
            .field("engines", &names)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new(QuarryOptions::default())
    }
}

impl Selectors {
    /// A registry with every built-in engine.
    #[must_use]
    pub fn new(options: QuarryOptions) -> Self {
        let engines = BUILTIN_ENGINE_NAMES
            .iter()
            .filter_map(|&name| builtin_engine(name).map(|engine| (name.to_string(), engine)))
            .collect();
        Self { engines, options }
    }

    /// The options this registry was created with.
    #[must_use]
    pub const fn options(&self) -> &QuarryOptions {
        &self.options
    }

    /// Add a custom engine.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidSelector`] when `name` has characters
    /// outside `[a-zA-Z0-9_-]` or names a built-in engine.
    pub fn register(
        &mut self,
        name: &str,
        engine: Box<dyn SelectorEngine>,
    ) -> Result<(), SelectorError> {
        if !ENGINE_NAME.is_match(name) {
            return Err(SelectorError::invalid(
                "Selector engine name may only contain [a-zA-Z0-9_] characters",
            ));
        }
        if BUILTIN_ENGINE_NAMES.contains(&name) {
            return Err(SelectorError::invalid(format!(
                "\"{name}\" is a predefined selector engine"
            )));
        }
        if self.engines.insert(name.to_string(), engine).is_some() {
            warn!(engine = name, "Replacing selector engine");
        }
        Ok(())
    }

    /// The engine registered under `name`.
    #[must_use]
    pub fn engine(&self, name: &str) -> Option<&dyn SelectorEngine> {
        self.engines.get(name).map(AsRef::as_ref)
    }

    /// Parse `selector` and check that every engine it names is registered.
    ///
    /// # Errors
    ///
    /// Everything [`parse_selector`] reports, and
    /// [`SelectorError::UnknownEngine`].
    pub fn parse(&self, selector: &str) -> Result<ParsedSelector, SelectorError> {
        let parsed = parse_selector(selector)?;
        let mut unknown = None;
        visit_all_selector_parts(&parsed, &mut |part: &ParsedSelectorPart, _nested| {
            if unknown.is_none()
                && LayoutSelectorName::from_name(&part.name).is_none()
                && !self.engines.contains_key(&part.name)
            {
                unknown = Some(part.name.clone());
            }
        });
        if let Some(name) = unknown {
            return Err(SelectorError::UnknownEngine {
                name,
                selector: selector.to_string(),
            });
        }
        Ok(parsed)
    }

    /// All elements matching `selector` under `root`.
    ///
    /// # Errors
    ///
    /// Parse errors, unknown engines, and engine errors.
    pub fn query_all(
        &self,
        tree: &DomTree,
        selector: &str,
        root: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let parsed = self.parse(selector)?;
        let text_cache = TextCache::new();
        QueryContext::new(tree, self, &text_cache).query_all(&parsed, root)
    }

    /// The first element matching `selector` under `root`.
    ///
    /// # Errors
    ///
    /// Same as [`Selectors::query_all`], plus [`SelectorError::Ambiguous`]
    /// in strict mode when more than one element matches.
    pub fn query(
        &self,
        tree: &DomTree,
        selector: &str,
        root: NodeId,
    ) -> Result<Option<NodeId>, SelectorError> {
        let parsed = self.parse(selector)?;
        let text_cache = TextCache::new();
        let cx = QueryContext::new(tree, self, &text_cache);
        let matches = cx.query_all(&parsed, root)?;
        if self.options.strict && matches.len() > 1 {
            return Err(cx.strict_mode_violation(&parsed, &matches));
        }
        Ok(matches.first().copied())
    }

    /// A selector that resolves to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::Engine`] when `target` lies outside
    /// `options.root`.
    pub fn generate(
        &self,
        tree: &DomTree,
        target: NodeId,
        options: &GenerateOptions,
    ) -> Result<GeneratedSelector, SelectorError> {
        let text_cache = TextCache::new();
        let cx = QueryContext::new(tree, self, &text_cache);
        generate_selector(&cx, target, options)
    }

    /// Every rendering of `selector` as locator code in the configured
    /// language, best first, bounded by `max_locator_outputs`.
    #[must_use]
    pub fn as_locators(&self, selector: &str) -> Vec<String> {
        as_locators(
            self.options.language,
            selector,
            false,
            self.options.max_locator_outputs,
        )
    }

    /// Locator code in the configured language read back as a selector.
    /// Anything else is returned unchanged.
    #[must_use]
    pub fn locator_as_selector(&self, text: &str) -> String {
        locator_or_selector_as_selector(
            self.options.language,
            text,
            &self.options.test_id_attribute,
        )
    }
}

/// Borrowed state for one top-level call: the tree, the registry, and the
/// caches that must not outlive it.
pub struct QueryContext<'a> {
    tree: &'a DomTree,
    selectors: &'a Selectors,
    text_cache: &'a TextCache,
    evaluator: CssEvaluator<'a>,
}

impl fmt::Debug for QueryContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("selectors", &self.selectors)
            .finish_non_exhaustive()
    }
}

impl<'a> QueryContext<'a> {
    /// Start a call against `tree`.
    #[must_use]
    pub fn new(tree: &'a DomTree, selectors: &'a Selectors, text_cache: &'a TextCache) -> Self {
        Self {
            tree,
            selectors,
            text_cache,
            evaluator: CssEvaluator::new(tree, text_cache),
        }
    }

    /// The tree being queried.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// The registry.
    #[must_use]
    pub const fn selectors(&self) -> &'a Selectors {
        self.selectors
    }

    /// Element text cache shared by the text engines.
    #[must_use]
    pub const fn text_cache(&self) -> &'a TextCache {
        self.text_cache
    }

    /// The CSS evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &CssEvaluator<'a> {
        &self.evaluator
    }

    /// Evaluate `selector` from `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidSelector`] when a captured selector
    /// also uses `nth`, [`SelectorError::UnknownEngine`] for unregistered
    /// engines, and whatever the engines report.
    pub fn query_all(
        &self,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError> {
        if let Some(capture) = selector.capture {
            return self.query_all(&rewrite_capture(selector, capture)?, root);
        }

        let mut roots = vec![root];
        for part in &selector.parts {
            roots = match part.name.as_str() {
                "nth" => query_nth(&roots, part),
                "internal:and" => {
                    let and = self.query_all(&nested_parsed(part)?, root)?;
                    let current: HashSet<NodeId> = roots.into_iter().collect();
                    and.into_iter().filter(|e| current.contains(e)).collect()
                }
                "internal:or" => {
                    let or = self.query_all(&nested_parsed(part)?, root)?;
                    let mut union = roots;
                    union.extend(or);
                    self.tree.sort_in_document_order(&mut union);
                    union
                }
                name => {
                    if let Some(layout) = LayoutSelectorName::from_name(name) {
                        self.query_layout(layout, &roots, part, root)?
                    } else {
                        self.query_engine(part, &roots, selector)?
                    }
                }
            };
        }
        Ok(roots)
    }

    /// The first element [`QueryContext::query_all`] returns.
    ///
    /// # Errors
    ///
    /// Same as [`QueryContext::query_all`].
    pub fn query_selector(
        &self,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_all(selector, root)?.first().copied())
    }

    fn query_engine(
        &self,
        part: &ParsedSelectorPart,
        roots: &[NodeId],
        selector: &ParsedSelector,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let engine =
            self.selectors
                .engine(&part.name)
                .ok_or_else(|| SelectorError::UnknownEngine {
                    name: part.name.clone(),
                    selector: stringify_selector(selector, false),
                })?;
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for &root in roots {
            for element in engine.query_all(self, root, &part.body)? {
                if seen.insert(element) {
                    next.push(element);
                }
            }
        }
        debug!(
            engine = part.name.as_str(),
            roots = roots.len(),
            results = next.len(),
            "Dispatched selector part"
        );
        Ok(next)
    }

    fn query_layout(
        &self,
        layout: LayoutSelectorName,
        roots: &[NodeId],
        part: &ParsedSelectorPart,
        original_root: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let SelectorBody::Nested(body) = &part.body else {
            return Err(SelectorError::invalid(format!(
                "Malformed selector: {}={}",
                part.name, part.source
            )));
        };
        let inner = self.query_all(&body.parsed, original_root)?;
        let mut scored: Vec<(NodeId, f64)> = roots
            .iter()
            .filter_map(|&element| {
                layout_selector_score(layout, self.tree, element, &inner, body.distance)
                    .map(|score| (element, score))
            })
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(scored.into_iter().map(|(element, _)| element).collect())
    }

    /// The error strict mode raises when `matches` has more than one element.
    #[must_use]
    pub fn strict_mode_violation(&self, selector: &ParsedSelector, matches: &[NodeId]) -> SelectorError {
        let language = self.selectors.options.language;
        let generate_options = GenerateOptions {
            test_id_attribute: self.selectors.options.test_id_attribute.clone(),
            ..GenerateOptions::default()
        };
        let mut message = format!(
            "strict mode violation: {} resolved to {} elements:",
            as_locator(language, &stringify_selector(selector, false), false),
            matches.len()
        );
        for (i, &element) in matches.iter().take(MAX_STRICT_PREVIEWS).enumerate() {
            let generated = generate_selector(self, element, &generate_options)
                .map(|generated| generated.selector)
                .unwrap_or_default();
            let _ = write!(
                message,
                "\n    {}) {} aka {}",
                i + 1,
                preview_node(self.tree, element),
                as_locator(language, &generated, false)
            );
        }
        if matches.len() > MAX_STRICT_PREVIEWS {
            message.push_str("\n    ...");
        }
        message.push('\n');
        SelectorError::Ambiguous {
            message,
            count: matches.len(),
        }
    }
}

/// Everything up to the captured part stays; the rest becomes an
/// `internal:has` filter on it.
fn rewrite_capture(selector: &ParsedSelector, capture: usize) -> Result<ParsedSelector, SelectorError> {
    if selector.parts.iter().any(|part| part.name == "nth") {
        return Err(SelectorError::invalid(
            "Can't query n-th element in a request with the capture.",
        ));
    }
    let mut parts = selector.parts[..=capture].to_vec();
    if capture + 1 < selector.parts.len() {
        let rest = ParsedSelector {
            parts: selector.parts[capture + 1..].to_vec(),
            capture: None,
        };
        let source = stringify_selector(&rest, false);
        parts.push(ParsedSelectorPart {
            name: "internal:has".to_string(),
            body: SelectorBody::Nested(NestedSelectorBody {
                parsed: rest,
                distance: None,
            }),
            source,
        });
    }
    debug!(capture, parts = parts.len(), "Rewrote captured selector");
    Ok(ParsedSelector {
        parts,
        capture: None,
    })
}

fn nested_parsed(part: &ParsedSelectorPart) -> Result<ParsedSelector, SelectorError> {
    part.nested()
        .map(|nested| nested.parsed.clone())
        .ok_or_else(|| {
            SelectorError::invalid(format!("Malformed selector: {}={}", part.name, part.source))
        })
}

/// `nth=k` keeps the k-th element; negative `k` counts from the end.
fn query_nth(elements: &[NodeId], part: &ParsedSelectorPart) -> Vec<NodeId> {
    let Ok(nth) = part.source.trim().parse::<i64>() else {
        return Vec::new();
    };
    let index = if nth < 0 {
        usize::try_from(nth.unsigned_abs())
            .ok()
            .and_then(|back| elements.len().checked_sub(back))
    } else {
        usize::try_from(nth).ok()
    };
    index
        .and_then(|index| elements.get(index))
        .copied()
        .into_iter()
        .collect()
}

/// One-line HTML-ish rendering of a node for error messages.
#[must_use]
pub fn preview_node(tree: &DomTree, node: NodeId) -> String {
    if let Some(text) = tree.as_text(node) {
        return one_line(&format!("#text={text}"));
    }
    let Some(element) = tree.as_element(node) else {
        let name = if node == NodeId::ROOT { "#document" } else { "#comment" };
        return one_line(&format!("<{name} />"));
    };
    let tag = element.local_name().to_lowercase();

    let mut attrs: Vec<String> = element
        .attrs
        .iter()
        .filter(|(name, _)| *name != "style")
        .map(|(name, value)| {
            if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name) {
                format!(" {name}")
            } else {
                format!(" {name}=\"{value}\"")
            }
        })
        .collect();
    attrs.sort_by_key(|attr| attr.chars().count());
    let attr_text = trim_string_with_ellipsis(&attrs.concat(), 500);
    if AUTO_CLOSING_TAGS.contains(&tag.as_str()) {
        return one_line(&format!("<{tag}{attr_text}/>"));
    }

    let children = tree.children(node);
    let only_text =
        children.len() <= 5 && children.iter().all(|&child| tree.as_text(child).is_some());
    let text = if only_text {
        tree.text_content(node)
    } else if children.is_empty() {
        String::new()
    } else {
        "\u{2026}".to_string()
    };
    one_line(&format!(
        "<{tag}{attr_text}>{}</{tag}>",
        trim_string_with_ellipsis(&text, 50)
    ))
}

fn one_line(text: &str) -> String {
    text.replace('\n', "\u{21b5}").replace('\t', "\u{21c6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(source: &str) -> ParsedSelectorPart {
        ParsedSelectorPart {
            name: "nth".to_string(),
            body: SelectorBody::Raw(source.to_string()),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_query_nth() {
        let elements = [NodeId(1), NodeId(2), NodeId(3)];
        assert_eq!(query_nth(&elements, &part("0")), vec![NodeId(1)]);
        assert_eq!(query_nth(&elements, &part("-1")), vec![NodeId(3)]);
        assert_eq!(query_nth(&elements, &part("-2")), vec![NodeId(2)]);
        assert!(query_nth(&elements, &part("3")).is_empty());
        assert!(query_nth(&elements, &part("-4")).is_empty());
        assert!(query_nth(&elements, &part("first")).is_empty());
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("a\nb\tc"), "a\u{21b5}b\u{21c6}c");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: QuarryOptions =
            serde_json::from_str(r#"{"testIdAttribute":"data-qa","strict":true}"#).unwrap();
        assert_eq!(options.test_id_attribute, "data-qa");
        assert!(options.strict);
        assert_eq!(options.max_locator_outputs, 20);
        assert_eq!(options.language, Language::JavaScript);
    }
}
