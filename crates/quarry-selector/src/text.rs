//! Element text extraction and the text matchers behind the `text` family of
//! engines and pseudo-classes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use quarry_dom::{DomTree, NodeId, aria};
use strum_macros::Display;

use crate::error::SelectorError;
use crate::pattern::JsRegex;
use crate::string_utils::normalize_white_space;

/// Text of an element as the matchers see it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementText {
    /// Concatenated text of the whole subtree.
    pub full: String,
    /// `full` with whitespace collapsed.
    pub normalized: String,
    /// Runs of adjacent child text nodes, split at element children.
    pub immediate: Vec<String>,
}

impl ElementText {
    fn synthetic(text: &str) -> Self {
        Self {
            full: text.to_string(),
            normalized: normalize_white_space(text),
            immediate: vec![text.to_string()],
        }
    }
}

/// Memoized [`ElementText`] per element. Lives for one query.
#[derive(Debug, Default)]
pub struct TextCache {
    entries: RefCell<HashMap<NodeId, Rc<ElementText>>>,
}

impl TextCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The text of `element`, computed once.
    pub fn element_text(&self, tree: &DomTree, element: NodeId) -> Rc<ElementText> {
        if let Some(text) = self.entries.borrow().get(&element) {
            return Rc::clone(text);
        }
        let text = Rc::new(self.compute(tree, element));
        let _ = self
            .entries
            .borrow_mut()
            .insert(element, Rc::clone(&text));
        text
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn compute(&self, tree: &DomTree, element: NodeId) -> ElementText {
        if should_skip_for_text_matching(tree, element) {
            return ElementText::default();
        }
        if tree.has_tag(element, "input") {
            let input_type = aria::input_type(tree, element);
            if input_type == "submit" || input_type == "button" {
                return ElementText::synthetic(tree.attr(element, "value").unwrap_or(""));
            }
        }

        let mut value = ElementText::default();
        let mut current_immediate = String::new();
        for &child in tree.children(element) {
            if let Some(text) = tree.as_text(child) {
                value.full.push_str(text);
                current_immediate.push_str(text);
            } else if tree.is_element(child) {
                if !current_immediate.is_empty() {
                    value.immediate.push(std::mem::take(&mut current_immediate));
                }
                value.full.push_str(&self.element_text(tree, child).full);
            }
            // Comments neither contribute text nor split runs.
        }
        if !current_immediate.is_empty() {
            value.immediate.push(current_immediate);
        }
        if !value.full.is_empty() {
            value.normalized = normalize_white_space(&value.full);
        }
        value
    }
}

/// `SCRIPT`, `NOSCRIPT`, `STYLE` and everything in `HEAD` have no matchable text.
#[must_use]
pub fn should_skip_for_text_matching(tree: &DomTree, element: NodeId) -> bool {
    matches!(
        tree.local_name(element),
        Some("script" | "noscript" | "style")
    ) || tree.has_tag(element, "head")
        || tree.ancestors(element).any(|a| tree.has_tag(a, "head"))
}

/// How an element relates to a text matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    /// The element's text does not match.
    None,
    /// The element matches and none of its element children do.
    SelfMatch,
    /// The element matches, and so does at least one element child.
    SelfAndChildren,
}

/// Classify `element` against `matcher`, preferring the innermost match.
pub fn element_matches_text<F>(
    cache: &TextCache,
    tree: &DomTree,
    element: NodeId,
    matcher: F,
) -> TextMatch
where
    F: Fn(&ElementText) -> bool,
{
    if should_skip_for_text_matching(tree, element) {
        return TextMatch::None;
    }
    if !matcher(&cache.element_text(tree, element)) {
        return TextMatch::None;
    }
    if tree
        .element_children(element)
        .any(|child| matcher(&cache.element_text(tree, child)))
    {
        return TextMatch::SelfAndChildren;
    }
    TextMatch::SelfMatch
}

/// Texts that label `element`: its `aria-labelledby` targets, a non-blank
/// `aria-label`, or the `<label>` elements of a labelable control.
#[must_use]
pub fn get_element_labels(cache: &TextCache, tree: &DomTree, element: NodeId) -> Vec<Rc<ElementText>> {
    if let Some(labels) = aria::labelled_by_elements(tree, element) {
        return labels
            .into_iter()
            .map(|label| cache.element_text(tree, label))
            .collect();
    }
    if let Some(aria_label) = tree.attr(element, "aria-label")
        && !aria_label.trim().is_empty()
    {
        return vec![Rc::new(ElementText::synthetic(aria_label))];
    }
    aria::labels(tree, element)
        .into_iter()
        .map(|label| cache.element_text(tree, label))
        .collect()
}

/// The flavor of a [`TextMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TextMatcherKind {
    /// A `/source/flags` pattern tested against the full text.
    Regex,
    /// Whole-text equality after normalization.
    Strict,
    /// Case-insensitive substring.
    Lax,
}

#[derive(Debug, Clone)]
enum Rule {
    Pattern(JsRegex),
    Normalized(String),
    ImmediateText(String),
    Contains(String),
}

/// A predicate over [`ElementText`].
#[derive(Debug, Clone)]
pub struct TextMatcher {
    kind: TextMatcherKind,
    rule: Rule,
}

impl TextMatcher {
    /// Case-insensitive substring of the normalized text.
    #[must_use]
    pub fn lax(text: &str) -> Self {
        Self {
            kind: TextMatcherKind::Lax,
            rule: Rule::Contains(normalize_white_space(text).to_lowercase()),
        }
    }

    /// Some run of immediate text equals `text` after normalization. An empty
    /// `text` also matches elements with no immediate text.
    #[must_use]
    pub fn strict_immediate(text: &str) -> Self {
        Self {
            kind: TextMatcherKind::Strict,
            rule: Rule::ImmediateText(normalize_white_space(text)),
        }
    }

    /// The normalized text equals `text` after normalization.
    #[must_use]
    pub fn strict_normalized(text: &str) -> Self {
        Self {
            kind: TextMatcherKind::Strict,
            rule: Rule::Normalized(normalize_white_space(text)),
        }
    }

    /// Pattern test against the full text.
    #[must_use]
    pub const fn regex(re: JsRegex) -> Self {
        Self {
            kind: TextMatcherKind::Regex,
            rule: Rule::Pattern(re),
        }
    }

    /// Which flavor this is.
    #[must_use]
    pub const fn kind(&self) -> TextMatcherKind {
        self.kind
    }

    /// Test one element text.
    #[must_use]
    pub fn matches(&self, text: &ElementText) -> bool {
        match &self.rule {
            Rule::Pattern(re) => re.is_match(&text.full),
            Rule::Normalized(expected) => text.normalized == *expected,
            Rule::ImmediateText(expected) => {
                if expected.is_empty() && text.immediate.is_empty() {
                    return true;
                }
                text.immediate
                    .iter()
                    .any(|run| normalize_white_space(run) == *expected)
            }
            Rule::Contains(needle) => text.normalized.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Build the matcher for a text engine body.
///
/// - `/source/flags` is a pattern;
/// - `"text"` and `'text'` are strict;
/// - for internal engines, `"text"i` is lax and `"text"s` strict, with JSON
///   string escapes;
/// - anything else is lax.
///
/// # Errors
///
/// Returns [`SelectorError::Engine`] when the pattern does not compile or an
/// internal body is not valid JSON.
pub fn create_text_matcher(selector: &str, internal: bool) -> Result<TextMatcher, SelectorError> {
    if selector.starts_with('/')
        && let Some(last_slash) = selector.rfind('/').filter(|&i| i > 0)
    {
        let re = JsRegex::new(&selector[1..last_slash], &selector[last_slash + 1..])
            .map_err(|e| SelectorError::Engine(format!("Invalid regular expression {selector}: {e}")))?;
        return Ok(TextMatcher::regex(re));
    }

    let unquote = |quoted: &str| -> Result<String, SelectorError> {
        if internal {
            serde_json::from_str::<String>(quoted)
                .map_err(|_| SelectorError::Engine(format!("Malformed text selector: {selector}")))
        } else {
            Ok(css_unquote(quoted))
        }
    };

    let is_quoted_with = |quote: char| {
        selector.len() > 1 && selector.starts_with(quote) && selector.ends_with(quote)
    };
    let has_flag = |flag: char| {
        internal
            && selector.len() > 2
            && selector.starts_with('"')
            && selector.ends_with(flag)
            && selector[..selector.len() - 1].ends_with('"')
    };

    let (text, strict) = if is_quoted_with('"') {
        (unquote(selector)?, true)
    } else if has_flag('i') {
        (unquote(&selector[..selector.len() - 1])?, false)
    } else if has_flag('s') {
        (unquote(&selector[..selector.len() - 1])?, true)
    } else if is_quoted_with('\'') {
        (unquote(selector)?, true)
    } else {
        (selector.to_string(), false)
    };

    Ok(match (strict, internal) {
        (true, true) => TextMatcher::strict_normalized(&text),
        (true, false) => TextMatcher::strict_immediate(&text),
        (false, _) => TextMatcher::lax(&text),
    })
}

/// Strip the surrounding quotes and resolve backslash escapes by taking the
/// next character literally.
fn css_unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(full: &str, immediate: &[&str]) -> ElementText {
        ElementText {
            full: full.to_string(),
            normalized: normalize_white_space(full),
            immediate: immediate.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_matcher_kinds() {
        assert_eq!(create_text_matcher("/a+/", false).unwrap().kind(), TextMatcherKind::Regex);
        assert_eq!(create_text_matcher("\"a\"", false).unwrap().kind(), TextMatcherKind::Strict);
        assert_eq!(create_text_matcher("'a'", false).unwrap().kind(), TextMatcherKind::Strict);
        assert_eq!(create_text_matcher("\"a\"i", true).unwrap().kind(), TextMatcherKind::Lax);
        assert_eq!(create_text_matcher("\"a\"s", true).unwrap().kind(), TextMatcherKind::Strict);
        assert_eq!(create_text_matcher("a", true).unwrap().kind(), TextMatcherKind::Lax);
        // Only internal engines understand the flag suffix.
        assert_eq!(create_text_matcher("\"a\"i", false).unwrap().kind(), TextMatcherKind::Lax);
    }

    #[test]
    fn test_lax_is_case_insensitive_substring() {
        let matcher = create_text_matcher("hello   WORLD", false).unwrap();
        assert!(matcher.matches(&text("Say hello world!", &["Say hello world!"])));
        assert!(!matcher.matches(&text("hello", &["hello"])));
    }

    #[test]
    fn test_strict_immediate_compares_text_runs() {
        let matcher = create_text_matcher("\"Hello\"", false).unwrap();
        assert!(matcher.matches(&text("Hello world", &["Hello", "world"])));
        assert!(!matcher.matches(&text("Hello world", &["Hello world"])));
        let empty = create_text_matcher("\"\"", false).unwrap();
        assert!(empty.matches(&text("", &[])));
    }

    #[test]
    fn test_strict_internal_compares_whole_text() {
        let matcher = create_text_matcher("\"Hello world\"s", true).unwrap();
        assert!(matcher.matches(&text("Hello  world", &["Hello", "world"])));
        assert!(!matcher.matches(&text("Hello world!", &["Hello world!"])));
    }

    #[test]
    fn test_unquoting() {
        assert_eq!(css_unquote(r#""a\"b""#), "a\"b");
        let matcher = create_text_matcher(r#""line\nbreak"s"#, true).unwrap();
        assert!(matcher.matches(&text("line\nbreak", &[])));
        assert!(create_text_matcher("'single'", true).is_err());
    }

    #[test]
    fn test_regex_over_full_text() {
        let matcher = create_text_matcher("/^sub\\s+mit$/i", false).unwrap();
        assert!(matcher.matches(&text("SUB  mit", &[])));
        assert!(create_text_matcher("/(/", false).is_err());
    }
}
