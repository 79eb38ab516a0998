//! Selector generation: find a short, readable selector that resolves to a
//! given element.
//!
//! Every element gets candidate tokens (test ids, labels, roles, text, tag
//! names, ...) with a score; lower is better. A chain of tokens scores
//! [`combine_scores`], which weighs tokens closer to the start more. The
//! generator picks the cheapest chain that finds the target first and only,
//! widening the search through ancestors when the target alone is
//! ambiguous, and falls back to a CSS path when nothing else works.

use std::collections::HashMap;
use std::sync::LazyLock;

use quarry_dom::{DomTree, NodeId, aria, style};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::SelectorError;
use crate::parser::parse_selector;
use crate::pattern::JsRegex;
use crate::query::QueryContext;
use crate::string_utils::{
    TextOrRegex, css_escape, escape_for_attribute_selector, escape_for_text_selector,
    escape_reg_exp, quote_css_attribute_value, static_regex,
};
use crate::text::get_element_labels;

const TEXT_SCORE_RANGE: u64 = 10;
const EXACT_PENALTY: u64 = TEXT_SCORE_RANGE / 2;

const TEST_ID_SCORE: u64 = 1;
const OTHER_TEST_ID_SCORE: u64 = 2;
const IFRAME_BY_ATTRIBUTE_SCORE: u64 = 10;

const BEGIN_PENALIZED_SCORE: u64 = 50;
const ROLE_WITH_NAME_SCORE: u64 = 100;
const PLACEHOLDER_SCORE: u64 = 120;
const LABEL_SCORE: u64 = 140;
const ALT_TEXT_SCORE: u64 = 160;
const TEXT_SCORE: u64 = 180;
const TITLE_SCORE: u64 = 200;
const TEXT_SCORE_REGEX: u64 = 250;
const END_PENALIZED_SCORE: u64 = 300;

const CSS_ID_SCORE: u64 = 500;
const ROLE_WITHOUT_NAME_SCORE: u64 = 510;
const CSS_INPUT_TYPE_NAME_SCORE: u64 = 520;
const CSS_TAG_NAME_SCORE: u64 = 530;
const NTH_SCORE: u64 = 10_000;
const CSS_FALLBACK_SCORE: u64 = 10_000_000;

const SCORE_THRESHOLD_FOR_TEXT_EXPECT: u64 = 1000;

/// Longest text used verbatim, and the length of the shorter alternative.
const MAX_TEXT_LENGTH: usize = 80;
const SHORT_TEXT_LENGTH: usize = 30;

/// `nth=` disambiguation is only tried when a candidate matches at most this
/// many elements.
const MAX_NTH_CANDIDATES: usize = 5;

const NAME_ATTRIBUTE_TAGS: &[&str] = &[
    "button", "form", "fieldset", "frame", "iframe", "input", "keygen", "object", "output",
    "select", "textarea", "map", "meta", "param",
];

static SIMPLE_ID: LazyLock<Regex> = LazyLock::new(|| static_regex(r"^[a-zA-Z][a-zA-Z0-9\-_]+$"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"^([0-9.,]+)[^.,a-zA-Z0-9_]"));
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"[^.,a-zA-Z0-9_]([0-9.,]+)$"));

/// Options for [`generate_selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    /// The attribute rendered as `internal:testid`.
    pub test_id_attribute: String,
    /// Only use engines whose name does not start with `internal:`.
    pub omit_internal_engines: bool,
    /// Resolve relative to this element instead of the document.
    #[serde(skip)]
    pub root: Option<NodeId>,
    /// Prefer a stable container over the text of the target, for text
    /// assertions.
    pub for_text_expect: bool,
    /// Also return alternatives in [`GeneratedSelector::selectors`].
    pub multiple: bool,
    /// Never use `#id` tokens.
    pub no_css_id: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            test_id_attribute: "data-testid".to_string(),
            omit_internal_engines: false,
            root: None,
            for_text_expect: false,
            multiple: false,
            no_css_id: false,
        }
    }
}

/// Output of [`generate_selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSelector {
    /// The best selector.
    pub selector: String,
    /// The best selector followed by alternatives, without duplicates.
    pub selectors: Vec<String>,
    /// What `selector` resolves to.
    pub elements: Vec<NodeId>,
}

/// One step of a generated selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorToken {
    /// Engine name.
    pub engine: String,
    /// Engine body.
    pub selector: String,
    /// Lower is better.
    pub score: u64,
}

impl SelectorToken {
    fn new(engine: &str, selector: impl Into<String>, score: u64) -> Self {
        Self {
            engine: engine.to_string(),
            selector: selector.into(),
            score,
        }
    }
}

type Tokens = Vec<SelectorToken>;

/// Generate a selector for `target`.
///
/// # Errors
///
/// Returns [`SelectorError::Engine`] when `target` is outside
/// `options.root`, and propagates query errors.
pub fn generate_selector(
    cx: &QueryContext<'_>,
    target: NodeId,
    options: &GenerateOptions,
) -> Result<GeneratedSelector, SelectorError> {
    let mut generator = Generator {
        cx,
        options,
        allow_text: HashMap::new(),
        disallow_text: HashMap::new(),
    };
    let tree = cx.tree();
    debug!(node = target.0, multiple = options.multiple, "Generating selector");

    let base = Pass::default();
    let selectors = if options.for_text_expect {
        let document_element = tree.document_element().unwrap_or(target);
        let mut target_tokens = generator.css_fallback(document_element, base)?;
        let mut element = Some(target);
        while let Some(current) = element {
            let no_text = Pass { no_text: true, ..base };
            if let Some(tokens) = generator.generate_for(current, no_text)?
                && combine_scores(&tokens) <= SCORE_THRESHOLD_FOR_TEXT_EXPECT
            {
                target_tokens = tokens;
                break;
            }
            element = tree.parent_element(current);
        }
        vec![join_tokens(&target_tokens)]
    } else {
        let target = generator.retarget(target);
        if options.multiple {
            generator.generate_multiple(target)?
        } else {
            let tokens = match generator.generate_for(target, base)? {
                Some(tokens) => tokens,
                None => generator.css_fallback(target, base)?,
            };
            vec![join_tokens(&tokens)]
        }
    };

    let selector = selectors.first().cloned().unwrap_or_default();
    let elements = cx.query_all(
        &parse_selector(&selector)?,
        options.root.unwrap_or(NodeId::ROOT),
    )?;
    debug!(
        selector = selector.as_str(),
        alternatives = selectors.len(),
        matches = elements.len(),
        "Generated selector"
    );
    Ok(GeneratedSelector {
        selector,
        selectors,
        elements,
    })
}

/// Flags that change between the passes of one generation.
#[derive(Debug, Clone, Copy, Default)]
struct Pass {
    no_text: bool,
    no_css_id: bool,
}

struct Generator<'c, 'a> {
    cx: &'c QueryContext<'a>,
    options: &'c GenerateOptions,
    allow_text: HashMap<NodeId, Option<Tokens>>,
    disallow_text: HashMap<NodeId, Option<Tokens>>,
}

impl Generator<'_, '_> {
    fn tree(&self) -> &DomTree {
        self.cx.tree()
    }

    fn scope(&self) -> NodeId {
        self.options.root.unwrap_or(NodeId::ROOT)
    }

    /// Clicking inside a button should target the button: prefer the closest
    /// visible interactive ancestor unless the target is a form control.
    fn retarget(&self, target: NodeId) -> NodeId {
        let tree = self.tree();
        let is_form_control = matches!(
            tree.local_name(target),
            Some("input" | "textarea" | "select")
        );
        let editable = tree
            .attr(target, "contenteditable")
            .is_some_and(|value| value != "false");
        if is_form_control || editable {
            return target;
        }
        let mut current = Some(target);
        while let Some(element) = current {
            if is_interactive(tree, element) {
                if let Some(root) = self.options.root
                    && element != root
                    && tree.contains(element, root)
                {
                    return target;
                }
                return if style::is_element_visible(tree, element) {
                    element
                } else {
                    target
                };
            }
            current = tree.parent_element(element);
        }
        target
    }

    fn generate_multiple(&mut self, target: NodeId) -> Result<Vec<String>, SelectorError> {
        let base = Pass::default();
        let no_text = Pass {
            no_text: true,
            ..base
        };
        let with_text = self.generate_for(target, base)?;
        let without_text = self.generate_for(target, no_text)?;
        let mut candidates = vec![with_text.clone(), without_text.clone()];

        // Regenerate without ids from a clean slate.
        self.allow_text.clear();
        self.disallow_text.clear();
        if with_text.as_deref().is_some_and(has_css_id_token) {
            candidates.push(self.generate_for(
                target,
                Pass {
                    no_css_id: true,
                    ..base
                },
            )?);
        }
        if without_text.as_deref().is_some_and(has_css_id_token) {
            candidates.push(self.generate_for(
                target,
                Pass {
                    no_text: true,
                    no_css_id: true,
                },
            )?);
        }

        let mut candidates: Vec<Tokens> = candidates.into_iter().flatten().collect();
        if candidates.is_empty() {
            let css = self.css_fallback(target, base)?;
            let uses_id = has_css_id_token(&css);
            candidates.push(css);
            if uses_id {
                candidates.push(self.css_fallback(
                    target,
                    Pass {
                        no_css_id: true,
                        ..base
                    },
                )?);
            }
        }

        let mut selectors: Vec<String> = Vec::new();
        for tokens in &candidates {
            let joined = join_tokens(tokens);
            if !selectors.contains(&joined) {
                selectors.push(joined);
            }
        }
        Ok(selectors)
    }

    fn generate_for(&mut self, target: NodeId, pass: Pass) -> Result<Option<Tokens>, SelectorError> {
        let tree = self.tree();
        if let Some(root) = self.options.root {
            if !tree.contains(root, target) {
                return Err(SelectorError::Engine(
                    "Target element must belong to the root's subtree".to_string(),
                ));
            }
            if target == root {
                return Ok(Some(vec![SelectorToken::new("css", ":scope", 1)]));
            }
        }
        if tree.document_element() == Some(target) {
            return Ok(Some(vec![SelectorToken::new("css", "html", 1)]));
        }
        self.calculate(target, target, !pass.no_text, pass)
    }

    fn calculate_cached(
        &mut self,
        target: NodeId,
        element: NodeId,
        allow_text: bool,
        pass: Pass,
    ) -> Result<Option<Tokens>, SelectorError> {
        let cache = if allow_text {
            &self.allow_text
        } else {
            &self.disallow_text
        };
        if let Some(value) = cache.get(&element) {
            return Ok(value.clone());
        }
        let value = self.calculate(target, element, allow_text, pass)?;
        let cache = if allow_text {
            &mut self.allow_text
        } else {
            &mut self.disallow_text
        };
        let _ = cache.insert(element, value.clone());
        Ok(value)
    }

    fn calculate(
        &mut self,
        target: NodeId,
        element: NodeId,
        allow_text: bool,
        pass: Pass,
    ) -> Result<Option<Tokens>, SelectorError> {
        let allow_nth_match = element == target;

        let mut text_candidates = if allow_text {
            self.build_text_candidates(element, element == target)
        } else {
            Vec::new()
        };
        if element != target {
            // Regex text is too slow to evaluate on every ancestor.
            text_candidates = filter_regex_tokens(text_candidates);
        }
        let no_text_candidates: Vec<Tokens> = self
            .build_no_text_candidates(element, pass)
            .into_iter()
            .filter(|token| !self.options.omit_internal_engines || !token.engine.starts_with("internal:"))
            .map(|token| vec![token])
            .collect();

        let all: Vec<Tokens> = text_candidates
            .iter()
            .chain(&no_text_candidates)
            .cloned()
            .collect();
        let mut result = self.choose_first_selector(self.scope(), element, &all, allow_nth_match)?;

        let text_candidates = filter_regex_tokens(text_candidates);
        self.check_with_text(
            target,
            element,
            &text_candidates,
            &no_text_candidates,
            allow_text,
            &mut result,
            pass,
        )?;
        // Also try plain tokens on the target with text on an ancestor.
        if element == target && !text_candidates.is_empty() {
            self.check_with_text(target, element, &[], &no_text_candidates, allow_text, &mut result, pass)?;
        }
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn check_with_text(
        &mut self,
        target: NodeId,
        element: NodeId,
        text_candidates: &[Tokens],
        no_text_candidates: &[Tokens],
        allow_text: bool,
        result: &mut Option<Tokens>,
        pass: Pass,
    ) -> Result<(), SelectorError> {
        let allow_nth_match = element == target;
        // Text on the element itself is the most specific; only use text on
        // ancestors when the element has none.
        let allow_parent_text = allow_text && text_candidates.is_empty();

        let candidates: Vec<Tokens> = text_candidates
            .iter()
            .chain(no_text_candidates)
            .filter(|c| {
                result
                    .as_ref()
                    .is_none_or(|r| combine_scores(c) < combine_scores(r))
            })
            .cloned()
            .collect();

        // Widening the scope to an ancestor never makes a candidate more
        // selective, so this bounds every chain through the ancestors.
        let Some(mut best_possible_in_parent) = candidates.first().cloned() else {
            return Ok(());
        };

        let mut parent = self.tree().parent_element(element);
        while let Some(current) = parent {
            if Some(current) == self.options.root {
                break;
            }
            parent = self.tree().parent_element(current);
            let Some(parent_tokens) = self.calculate_cached(target, current, allow_parent_text, pass)?
            else {
                continue;
            };
            if let Some(best) = result.as_ref() {
                let bound: Tokens = parent_tokens
                    .iter()
                    .chain(&best_possible_in_parent)
                    .cloned()
                    .collect();
                if combine_scores(&bound) >= combine_scores(best) {
                    continue;
                }
            }
            let Some(best) = self.choose_first_selector(current, element, &candidates, allow_nth_match)?
            else {
                return Ok(());
            };
            best_possible_in_parent = best;
            let combined: Tokens = parent_tokens
                .into_iter()
                .chain(best_possible_in_parent.iter().cloned())
                .collect();
            if result
                .as_ref()
                .is_none_or(|r| combine_scores(&combined) < combine_scores(r))
            {
                *result = Some(combined);
            }
        }
        Ok(())
    }

    /// The cheapest candidate that finds `element` first and only within
    /// `scope`. Otherwise the cheapest one that finds it among a handful of
    /// matches, with an `nth=` suffix, when allowed.
    fn choose_first_selector(
        &self,
        scope: NodeId,
        element: NodeId,
        candidates: &[Tokens],
        allow_nth_match: bool,
    ) -> Result<Option<Tokens>, SelectorError> {
        let mut joined: Vec<(&Tokens, u64)> = candidates
            .iter()
            .map(|tokens| (tokens, combine_scores(tokens)))
            .collect();
        joined.sort_by_key(|&(_, score)| score);

        let mut best_with_index: Option<Tokens> = None;
        for (tokens, score) in joined {
            let selector = join_tokens(tokens);
            let result = self.cx.query_all(&parse_selector(&selector)?, scope)?;
            trace!(
                selector = selector.as_str(),
                score,
                matches = result.len(),
                "Checked candidate"
            );
            if result.len() == 1 && result[0] == element {
                return Ok(Some(tokens.clone()));
            }
            if !allow_nth_match || best_with_index.is_some() || result.len() > MAX_NTH_CANDIDATES {
                continue;
            }
            let Some(index) = result.iter().position(|&e| e == element) else {
                continue;
            };
            let mut with_index = tokens.clone();
            with_index.push(SelectorToken::new("nth", index.to_string(), NTH_SCORE));
            best_with_index = Some(with_index);
        }
        Ok(best_with_index)
    }

    // ========== candidates ==========

    fn build_no_text_candidates(&self, element: NodeId, pass: Pass) -> Vec<SelectorToken> {
        let tree = self.tree();
        let test_id_attribute = self.options.test_id_attribute.as_str();
        let tag = tree.local_name(element).unwrap_or("").to_lowercase();
        let non_empty_attr = |name: &str| tree.attr(element, name).filter(|value| !value.is_empty());
        let mut candidates = Vec::new();

        for attr in ["data-testid", "data-test-id", "data-test"] {
            if attr != test_id_attribute
                && let Some(value) = non_empty_attr(attr)
            {
                candidates.push(SelectorToken::new(
                    "css",
                    format!("[{attr}={}]", quote_css_attribute_value(value)),
                    OTHER_TEST_ID_SCORE,
                ));
            }
        }
        if !pass.no_css_id && !self.options.no_css_id
            && let Some(id) = non_empty_attr("id")
            && !is_guid_like(id)
        {
            candidates.push(SelectorToken::new("css", make_selector_for_id(id), CSS_ID_SCORE));
        }
        candidates.push(SelectorToken::new("css", css_escape(&tag), CSS_TAG_NAME_SCORE));

        if tag == "iframe" {
            for attribute in ["name", "title"] {
                if let Some(value) = non_empty_attr(attribute) {
                    candidates.push(SelectorToken::new(
                        "css",
                        format!(
                            "{}[{attribute}={}]",
                            css_escape(&tag),
                            quote_css_attribute_value(value)
                        ),
                        IFRAME_BY_ATTRIBUTE_SCORE,
                    ));
                }
            }
            if let Some(value) = non_empty_attr(test_id_attribute) {
                candidates.push(SelectorToken::new(
                    "css",
                    format!("[{test_id_attribute}={}]", quote_css_attribute_value(value)),
                    TEST_ID_SCORE,
                ));
            }
            penalize_score_for_length(&mut candidates);
            return candidates;
        }

        if let Some(value) = non_empty_attr(test_id_attribute) {
            candidates.push(SelectorToken::new(
                "internal:testid",
                format!(
                    "[{test_id_attribute}={}]",
                    escape_for_attribute_selector(&TextOrRegex::Text(value.to_string()), true)
                ),
                TEST_ID_SCORE,
            ));
        }

        if (tag == "input" || tag == "textarea")
            && let Some(placeholder) = non_empty_attr("placeholder")
        {
            candidates.push(attr_token(
                "placeholder",
                placeholder,
                true,
                PLACEHOLDER_SCORE + EXACT_PENALTY,
            ));
            for alternative in suitable_text_alternatives(placeholder) {
                candidates.push(attr_token(
                    "placeholder",
                    &alternative.text,
                    false,
                    PLACEHOLDER_SCORE - alternative.score_bonus,
                ));
            }
        }

        for label in get_element_labels(self.cx.text_cache(), tree, element) {
            let label_text = label.normalized.as_str();
            candidates.push(SelectorToken::new(
                "internal:label",
                escape_for_text_selector(&TextOrRegex::Text(label_text.to_string()), true),
                LABEL_SCORE + EXACT_PENALTY,
            ));
            for alternative in suitable_text_alternatives(label_text) {
                candidates.push(SelectorToken::new(
                    "internal:label",
                    escape_for_text_selector(&TextOrRegex::Text(alternative.text), false),
                    LABEL_SCORE - alternative.score_bonus,
                ));
            }
        }

        if let Some(role) = aria::role(tree, element).filter(|&r| r != "none" && r != "presentation") {
            candidates.push(SelectorToken::new("internal:role", role, ROLE_WITHOUT_NAME_SCORE));
        }

        if NAME_ATTRIBUTE_TAGS.contains(&tag.as_str())
            && let Some(name) = non_empty_attr("name")
        {
            candidates.push(SelectorToken::new(
                "css",
                format!("{}[name={}]", css_escape(&tag), quote_css_attribute_value(name)),
                CSS_INPUT_TYPE_NAME_SCORE,
            ));
        }

        let input_type = tree.attr(element, "type");
        if (tag == "input" || tag == "textarea")
            && input_type != Some("hidden")
            && let Some(input_type) = input_type.filter(|t| !t.is_empty())
        {
            candidates.push(SelectorToken::new(
                "css",
                format!("{}[type={}]", css_escape(&tag), quote_css_attribute_value(input_type)),
                CSS_INPUT_TYPE_NAME_SCORE,
            ));
        }

        if matches!(tag.as_str(), "input" | "textarea" | "select") && input_type != Some("hidden") {
            candidates.push(SelectorToken::new(
                "css",
                css_escape(&tag),
                CSS_INPUT_TYPE_NAME_SCORE + 1,
            ));
        }

        penalize_score_for_length(&mut candidates);
        candidates
    }

    fn build_text_candidates(&self, element: NodeId, is_target_node: bool) -> Vec<Tokens> {
        let tree = self.tree();
        let tag = tree.local_name(element).unwrap_or("").to_lowercase();
        if tag == "select" {
            return Vec::new();
        }
        let mut candidates: Vec<Tokens> = Vec::new();

        if let Some(title) = tree.attr(element, "title").filter(|t| !t.is_empty()) {
            candidates.push(vec![attr_token("title", title, true, TITLE_SCORE + EXACT_PENALTY)]);
            for alternative in suitable_text_alternatives(title) {
                candidates.push(vec![attr_token(
                    "title",
                    &alternative.text,
                    false,
                    TITLE_SCORE - alternative.score_bonus,
                )]);
            }
        }

        if let Some(alt) = tree.attr(element, "alt").filter(|a| !a.is_empty())
            && matches!(tag.as_str(), "applet" | "area" | "img" | "input")
        {
            candidates.push(vec![attr_token("alt", alt, true, ALT_TEXT_SCORE + EXACT_PENALTY)]);
            for alternative in suitable_text_alternatives(alt) {
                candidates.push(vec![attr_token(
                    "alt",
                    &alternative.text,
                    false,
                    ALT_TEXT_SCORE - alternative.score_bonus,
                )]);
            }
        }

        let text = self.cx.text_cache().element_text(tree, element).normalized.clone();
        let text_length = text.chars().count();
        let text_alternatives = if text.is_empty() {
            Vec::new()
        } else {
            suitable_text_alternatives(&text)
        };
        let exact_text_regex = (!text.is_empty() && text_length <= MAX_TEXT_LENGTH)
            .then(|| exact_regex(&text))
            .flatten();

        if !text.is_empty() {
            if is_target_node {
                if text_length <= MAX_TEXT_LENGTH {
                    candidates.push(vec![SelectorToken::new(
                        "internal:text",
                        escape_for_text_selector(&TextOrRegex::Text(text.clone()), true),
                        TEXT_SCORE + EXACT_PENALTY,
                    )]);
                }
                for alternative in &text_alternatives {
                    candidates.push(vec![SelectorToken::new(
                        "internal:text",
                        escape_for_text_selector(&TextOrRegex::Text(alternative.text.clone()), false),
                        TEXT_SCORE - alternative.score_bonus,
                    )]);
                }
            }
            let css_token = SelectorToken::new("css", css_escape(&tag), CSS_TAG_NAME_SCORE);
            for alternative in &text_alternatives {
                candidates.push(vec![css_token.clone(), has_text_token(&alternative.text, alternative.score_bonus)]);
            }
            if let Some(re) = &exact_text_regex {
                candidates.push(vec![css_token, has_text_regex_token(re)]);
            }
        }

        if let Some(role) = aria::role(tree, element).filter(|&r| r != "none" && r != "presentation") {
            let name = aria::accessible_name(tree, element, false);
            if name.is_empty() {
                let role_token = SelectorToken::new("internal:role", role, ROLE_WITHOUT_NAME_SCORE);
                for alternative in &text_alternatives {
                    candidates.push(vec![role_token.clone(), has_text_token(&alternative.text, alternative.score_bonus)]);
                }
                if let Some(re) = &exact_text_regex {
                    candidates.push(vec![role_token, has_text_regex_token(re)]);
                }
            } else {
                candidates.push(vec![SelectorToken::new(
                    "internal:role",
                    format!(
                        "{role}[name={}]",
                        escape_for_attribute_selector(&TextOrRegex::Text(name.clone()), true)
                    ),
                    ROLE_WITH_NAME_SCORE + EXACT_PENALTY,
                )]);
                for alternative in suitable_text_alternatives(&name) {
                    candidates.push(vec![SelectorToken::new(
                        "internal:role",
                        format!(
                            "{role}[name={}]",
                            escape_for_attribute_selector(&TextOrRegex::Text(alternative.text), false)
                        ),
                        ROLE_WITH_NAME_SCORE - alternative.score_bonus,
                    )]);
                }
            }
        }

        for group in &mut candidates {
            penalize_score_for_length(group);
        }
        candidates
    }

    // ========== css fallback ==========

    /// A `>`-joined CSS path from the scope down to `target`, using ids,
    /// class subsets and `:nth-child()` until it is unique.
    fn css_fallback(&self, target: NodeId, pass: Pass) -> Result<Tokens, SelectorError> {
        let tree = self.tree();
        let root = self.scope();
        let mut tokens: Vec<String> = Vec::new();
        debug!(node = target.0, "Falling back to a CSS path");

        let mut element = Some(target);
        while let Some(current) = element.filter(|&e| e != root) {
            let node_name = tree.local_name(current).unwrap_or("").to_lowercase();
            let mut best_token_for_level = String::new();

            if !pass.no_css_id
                && !self.options.no_css_id
                && let Some(id) = tree.attr(current, "id").filter(|id| !id.is_empty())
            {
                let token = make_selector_for_id(id);
                if let Some(selector) = self.unique_css_selector(&tokens, Some(token.as_str()), target, root)? {
                    return self.make_strict(selector, target, root);
                }
                best_token_for_level = token;
            }

            let parent = tree.parent(current);

            let classes: Vec<String> = tree
                .as_element(current)
                .map(|data| data.classes().into_iter().map(ToString::to_string).collect())
                .unwrap_or_default();
            for i in 0..classes.len() {
                let token = classes[..=i]
                    .iter()
                    .map(|class| format!(".{}", css_escape(class)))
                    .collect::<String>();
                if let Some(selector) = self.unique_css_selector(&tokens, Some(token.as_str()), target, root)? {
                    return self.make_strict(selector, target, root);
                }
                // A class subset may still single the node out among its parent's descendants.
                if best_token_for_level.is_empty()
                    && let Some(parent) = parent
                    && self
                        .cx
                        .query_all(&parse_selector(&token)?, parent)?
                        .len()
                        == 1
                {
                    best_token_for_level = token;
                }
            }

            if let Some(parent) = parent {
                let siblings: Vec<NodeId> = tree.element_children(parent).collect();
                let first_same_tag = siblings
                    .iter()
                    .find(|&&sibling| tree.local_name(sibling).is_some_and(|n| n.eq_ignore_ascii_case(&node_name)))
                    .copied();
                let token = if first_same_tag == Some(current) {
                    css_escape(&node_name)
                } else {
                    let position = siblings.iter().position(|&s| s == current).unwrap_or(0);
                    format!("{}:nth-child({})", css_escape(&node_name), position + 1)
                };
                if let Some(selector) = self.unique_css_selector(&tokens, Some(token.as_str()), target, root)? {
                    return self.make_strict(selector, target, root);
                }
                if best_token_for_level.is_empty() {
                    best_token_for_level = token;
                }
            } else if best_token_for_level.is_empty() {
                best_token_for_level = css_escape(&node_name);
            }
            tokens.insert(0, best_token_for_level);
            element = tree.parent_element(current);
        }
        let selector = tokens.join(" > ");
        self.make_strict(selector, target, root)
    }

    fn unique_css_selector(
        &self,
        tokens: &[String],
        prefix: Option<&str>,
        target: NodeId,
        root: NodeId,
    ) -> Result<Option<String>, SelectorError> {
        let selector = prefix
            .into_iter()
            .map(ToString::to_string)
            .chain(tokens.iter().cloned())
            .collect::<Vec<_>>()
            .join(" > ");
        let found = self.cx.query_selector(&parse_selector(&selector)?, root)?;
        Ok((found == Some(target)).then_some(selector))
    }

    /// Append `nth=` when the path still matches several elements.
    ///
    /// Fails when the path does not reach `target` at all.
    fn make_strict(&self, selector: String, target: NodeId, root: NodeId) -> Result<Tokens, SelectorError> {
        let elements = self.cx.query_all(&parse_selector(&selector)?, root)?;
        let Some(index) = elements.iter().position(|&e| e == target) else {
            return Err(SelectorError::Engine(format!(
                "Selector \"{selector}\" does not match the target element"
            )));
        };
        let token = SelectorToken::new("css", selector, CSS_FALLBACK_SCORE);
        if elements.len() == 1 {
            return Ok(vec![token]);
        }
        Ok(vec![token, SelectorToken::new("nth", index.to_string(), NTH_SCORE)])
    }
}

fn is_interactive(tree: &DomTree, element: NodeId) -> bool {
    matches!(tree.local_name(element), Some("button" | "select" | "input" | "a"))
        || matches!(
            tree.attr(element, "role"),
            Some("button" | "checkbox" | "radio" | "link")
        )
}

fn attr_token(attribute: &str, value: &str, exact: bool, score: u64) -> SelectorToken {
    SelectorToken::new(
        "internal:attr",
        format!(
            "[{attribute}={}]",
            escape_for_attribute_selector(&TextOrRegex::Text(value.to_string()), exact)
        ),
        score,
    )
}

fn has_text_token(text: &str, score_bonus: u64) -> SelectorToken {
    SelectorToken::new(
        "internal:has-text",
        escape_for_text_selector(&TextOrRegex::Text(text.to_string()), false),
        TEXT_SCORE - score_bonus,
    )
}

fn has_text_regex_token(re: &JsRegex) -> SelectorToken {
    SelectorToken::new(
        "internal:has-text",
        escape_for_text_selector(&TextOrRegex::Regex(re.clone()), false),
        TEXT_SCORE_REGEX,
    )
}

/// `/^text$/` with metacharacters and slashes escaped.
fn exact_regex(text: &str) -> Option<JsRegex> {
    let source = format!("^{}$", escape_reg_exp(text).replace('/', "\\/"));
    JsRegex::new(&source, "").ok()
}

fn filter_regex_tokens(candidates: Vec<Tokens>) -> Vec<Tokens> {
    candidates
        .into_iter()
        .filter(|c| c.first().is_none_or(|token| !token.selector.starts_with('/')))
        .collect()
}

fn make_selector_for_id(id: &str) -> String {
    if SIMPLE_ID.is_match(id) {
        format!("#{id}")
    } else {
        format!("[id={}]", quote_css_attribute_value(id))
    }
}

fn has_css_id_token(tokens: &[SelectorToken]) -> bool {
    tokens.iter().any(|token| {
        token.engine == "css"
            && (token.selector.starts_with('#') || token.selector.starts_with("[id=\""))
    })
}

/// Longer selectors are harder to read: nudge mid-range scores up by one
/// point per ten characters, at most [`TEXT_SCORE_RANGE`].
fn penalize_score_for_length(group: &mut [SelectorToken]) {
    for token in group {
        if token.score > BEGIN_PENALIZED_SCORE && token.score < END_PENALIZED_SCORE {
            let length = token.selector.chars().count() as u64;
            token.score += TEXT_SCORE_RANGE.min(length / 10);
        }
    }
}

/// Render tokens as selector text. Adjacent CSS tokens are joined with a
/// space (a descendant combinator) instead of `>>`.
#[must_use]
pub fn join_tokens(tokens: &[SelectorToken]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut last_engine = "";
    for token in tokens {
        if !parts.is_empty()
            && (last_engine != "css"
                || token.engine != "css"
                || token.selector.starts_with(":nth-match("))
        {
            parts.push(">>".to_string());
        }
        last_engine = &token.engine;
        if token.engine == "css" {
            parts.push(token.selector.clone());
        } else {
            parts.push(format!("{}={}", token.engine, token.selector));
        }
    }
    parts.join(" ")
}

/// Position-weighted sum: the first of `n` tokens counts `n` times, the last
/// once.
#[must_use]
pub fn combine_scores(tokens: &[SelectorToken]) -> u64 {
    let n = tokens.len() as u64;
    tokens
        .iter()
        .zip((1..=n).rev())
        .fold(0u64, |sum, (token, weight)| {
            sum.saturating_add(token.score.saturating_mul(weight))
        })
}

/// Ids with many lower/upper/digit transitions look machine-generated.
fn is_guid_like(id: &str) -> bool {
    #[derive(PartialEq, Eq, Clone, Copy)]
    enum CharType {
        Lower,
        Upper,
        Digit,
        Other,
    }
    let mut last: Option<CharType> = None;
    let mut transitions = 0usize;
    for c in id.chars() {
        if c == '-' || c == '_' {
            continue;
        }
        let current = if c.is_ascii_lowercase() {
            CharType::Lower
        } else if c.is_ascii_uppercase() {
            CharType::Upper
        } else if c.is_ascii_digit() {
            CharType::Digit
        } else {
            CharType::Other
        };
        // Capitalized words are not a transition.
        if current == CharType::Lower && last == Some(CharType::Upper) {
            last = Some(current);
            continue;
        }
        if last.is_some_and(|last| last != current) {
            transitions += 1;
        }
        last = Some(current);
    }
    transitions * 4 >= id.chars().count()
}

/// Cut `text` at the last word boundary within `max_length` characters.
fn trim_word_boundary(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_length).collect();
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let chars: Vec<(usize, char)> = cut.char_indices().collect();
    // The last boundary that still leaves at least one character after it.
    let boundary = (0..chars.len()).rev().find(|&i| {
        let before = i.checked_sub(1).is_some_and(|j| is_word(chars[j].1));
        before != is_word(chars[i].1)
    });
    boundary.map_or_else(String::new, |i| cut[..chars[i].0].trim_end().to_string())
}

struct TextAlternative {
    text: String,
    score_bonus: u64,
}

/// Shorter forms of `text` worth trying: without a leading or trailing
/// number, and trimmed to word boundaries.
fn suitable_text_alternatives(text: &str) -> Vec<TextAlternative> {
    let mut result = Vec::new();
    let bonus_for = |alt: &str| if alt.chars().count() <= SHORT_TEXT_LENGTH { 2 } else { 1 };

    if let Some(number) = LEADING_NUMBER.captures(text).and_then(|c| c.get(1)) {
        let alt = trim_word_boundary(text[number.end()..].trim_start(), MAX_TEXT_LENGTH);
        let score_bonus = bonus_for(&alt);
        result.push(TextAlternative { text: alt, score_bonus });
    }
    if let Some(number) = TRAILING_NUMBER.captures(text).and_then(|c| c.get(1)) {
        let alt = trim_word_boundary(text[..number.start()].trim_end(), MAX_TEXT_LENGTH);
        let score_bonus = bonus_for(&alt);
        result.push(TextAlternative { text: alt, score_bonus });
    }

    if text.chars().count() <= SHORT_TEXT_LENGTH {
        result.push(TextAlternative {
            text: text.to_string(),
            score_bonus: 0,
        });
    } else {
        result.push(TextAlternative {
            text: trim_word_boundary(text, MAX_TEXT_LENGTH),
            score_bonus: 0,
        });
        result.push(TextAlternative {
            text: trim_word_boundary(text, SHORT_TEXT_LENGTH),
            score_bonus: 1,
        });
    }

    result.retain(|alternative| !alternative.text.is_empty());
    if result.is_empty() {
        result.push(TextAlternative {
            text: text.chars().take(MAX_TEXT_LENGTH).collect(),
            score_bonus: 0,
        });
    }
    result
}
