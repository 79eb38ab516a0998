//! Locator codegen: render selectors as locator-builder calls in client
//! languages, and read such calls back into selectors.
//!
//! Each selector part is classified into a [`LocatorKind`] and rendered by a
//! per-language [`LocatorFactory`]. Some parts have more than one idiomatic
//! rendering (`nth=0` is both `first()` and `nth(0)`); [`as_locators`]
//! enumerates the combinations, best first.
//!
//! The reverse direction lives in [`parser`].

pub mod builders;
mod csharp;
mod java;
mod javascript;
mod jsonl;
pub mod parser;
mod python;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::trace;

pub use self::csharp::CSharpLocatorFactory;
pub use self::java::JavaLocatorFactory;
pub use self::javascript::JavaScriptLocatorFactory;
pub use self::jsonl::JsonlLocatorFactory;
pub use self::python::PythonLocatorFactory;
pub use self::parser::{LocatorParseError, ParsedLocator, locator_or_selector_as_selector, parse_locator};

use crate::attribute::{AttributeOperator, AttributeValue, parse_attribute_selector};
use crate::error::SelectorError;
use crate::parser::{ParsedSelector, ParsedSelectorPart, parse_selector, stringify_selector};
use crate::pattern::JsRegex;
use crate::string_utils::{TextOrRegex, static_regex};

/// Default bound on [`as_locators`] output.
pub const DEFAULT_MAX_OUTPUT_SIZE: usize = 20;

static REGEX_BODY: LazyLock<Regex> = LazyLock::new(|| static_regex("^/(.*)/([igm]*)$"));

/// Target language of the generated locator code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// `page.getByRole('button', { name: 'OK' })`
    JavaScript,
    /// `page.get_by_role("button", name="OK")`
    Python,
    /// `page.getByRole(AriaRole.BUTTON, new Page.GetByRoleOptions().setName("OK"))`
    Java,
    /// `page.GetByRole(AriaRole.Button, new() { Name = "OK" })`
    CSharp,
    /// One JSON object per locator, chained through `next`.
    Jsonl,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Self; 5] = [
        Self::JavaScript,
        Self::Python,
        Self::Java,
        Self::CSharp,
        Self::Jsonl,
    ];
}

/// The receiver a locator call is made on. Java names its option classes
/// after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorBase {
    /// The first call of a chain.
    Page,
    /// Any later call.
    Locator,
    /// The call right after entering a frame.
    FrameLocator,
}

/// What a single locator call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum LocatorKind {
    /// A raw selector: `locator('...')`.
    Default,
    /// `getByRole`
    Role,
    /// `getByText`
    Text,
    /// `getByLabel`
    Label,
    /// `getByPlaceholder`
    Placeholder,
    /// `getByAltText`
    Alt,
    /// `getByTitle`
    Title,
    /// `getByTestId`
    TestId,
    /// `nth(n)`
    Nth,
    /// `first()`
    First,
    /// `last()`
    Last,
    /// `filter({ hasText })`
    HasText,
    /// `filter({ hasNotText })`
    HasNotText,
    /// `filter({ has })`
    Has,
    /// `filter({ hasNot })`
    #[strum(serialize = "hasNot")]
    HasNot,
    /// `frameLocator('...')`
    Frame,
    /// `and(...)`
    And,
    /// `or(...)`
    Or,
    /// `locator(<locator>)`
    Chain,
}

/// Options carried by a locator call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocatorOptions {
    /// `getByRole` properties other than the name, in selector order.
    pub attrs: Vec<(String, AttributeValue)>,
    /// Whole-string, case-sensitive matching.
    pub exact: Option<bool>,
    /// `getByRole` accessible name.
    pub name: Option<TextOrRegex>,
    /// `locator(..., { hasText })`
    pub has_text: Option<TextOrRegex>,
    /// `locator(..., { hasNotText })`
    pub has_not_text: Option<TextOrRegex>,
}

impl LocatorOptions {
    fn exact(exact: Option<bool>) -> Self {
        Self {
            exact,
            ..Self::default()
        }
    }
}

/// Renders locator calls for one language.
pub trait LocatorFactory {
    /// Render one call.
    fn generate_locator(
        &self,
        base: LocatorBase,
        kind: LocatorKind,
        body: &TextOrRegex,
        options: &LocatorOptions,
    ) -> String;

    /// Join calls into one chain expression.
    fn chain_locators(&self, locators: &[String]) -> String;
}

/// The factory for `language`. `preferred_quote` only affects JavaScript.
#[must_use]
pub fn factory_for(language: Language, preferred_quote: Option<char>) -> Box<dyn LocatorFactory> {
    match language {
        Language::JavaScript => Box::new(JavaScriptLocatorFactory::new(preferred_quote)),
        Language::Python => Box::new(PythonLocatorFactory),
        Language::Java => Box::new(JavaLocatorFactory),
        Language::CSharp => Box::new(CSharpLocatorFactory),
        Language::Jsonl => Box::new(JsonlLocatorFactory),
    }
}

/// The preferred rendering of `selector` in `language`.
///
/// Selector text that does not parse is returned as is.
#[must_use]
pub fn as_locator(language: Language, selector: &str, is_frame_locator: bool) -> String {
    as_locators(language, selector, is_frame_locator, DEFAULT_MAX_OUTPUT_SIZE)
        .into_iter()
        .next()
        .unwrap_or_else(|| selector.to_string())
}

/// Every rendering of `selector` in `language`, best first, at most
/// `max_output_size` of them.
///
/// Selector text that does not parse is returned as the only entry.
#[must_use]
pub fn as_locators(
    language: Language,
    selector: &str,
    is_frame_locator: bool,
    max_output_size: usize,
) -> Vec<String> {
    as_locators_with_quote(language, selector, is_frame_locator, max_output_size, None)
}

pub(crate) fn as_locators_with_quote(
    language: Language,
    selector: &str,
    is_frame_locator: bool,
    max_output_size: usize,
    preferred_quote: Option<char>,
) -> Vec<String> {
    let factory = factory_for(language, preferred_quote);
    let result = parse_selector(selector).and_then(|parsed| {
        inner_as_locators(factory.as_ref(), &parsed, is_frame_locator, max_output_size)
    });
    match result {
        Ok(locators) => locators,
        Err(error) => {
            trace!(selector, %error, "Rendering selector text verbatim");
            vec![selector.to_string()]
        }
    }
}

fn inner_as_locators(
    factory: &dyn LocatorFactory,
    parsed: &ParsedSelector,
    is_frame_locator: bool,
    max_output_size: usize,
) -> Result<Vec<String>, SelectorError> {
    let mut parts: Vec<&ParsedSelectorPart> = parsed.parts.iter().collect();
    // `frameLocator('iframe').first()` is `iframe >> nth=0 >> enter-frame`.
    // Put the nth after the frame entry so it renders on the frame locator.
    for index in 0..parts.len().saturating_sub(1) {
        if parts[index].name == "nth" && parts[index + 1].is_enter_frame() {
            parts.swap(index, index + 1);
        }
    }

    let nested = |part: &ParsedSelectorPart| -> Result<Vec<String>, SelectorError> {
        let inner = part.nested().ok_or_else(|| {
            SelectorError::invalid(format!("\"{}\" expects a nested selector", part.name))
        })?;
        inner_as_locators(factory, &inner.parsed, false, max_output_size)
    };

    let mut tokens: Vec<Vec<String>> = Vec::new();
    let mut next_base = if is_frame_locator {
        LocatorBase::FrameLocator
    } else {
        LocatorBase::Page
    };
    let mut index = 0;
    while index < parts.len() {
        let part = parts[index];
        let base = next_base;
        next_base = LocatorBase::Locator;
        let body = part.raw_body().unwrap_or(&part.source);
        let empty = TextOrRegex::Text(String::new());
        let none = LocatorOptions::default();
        let generate = |kind: LocatorKind, body: &TextOrRegex, options: &LocatorOptions| {
            factory.generate_locator(base, kind, body, options)
        };

        match part.name.as_str() {
            "nth" => {
                let n = TextOrRegex::Text(body.to_string());
                tokens.push(match body {
                    "0" => vec![
                        generate(LocatorKind::First, &empty, &none),
                        generate(LocatorKind::Nth, &n, &none),
                    ],
                    "-1" => vec![
                        generate(LocatorKind::Last, &empty, &none),
                        generate(LocatorKind::Nth, &n, &none),
                    ],
                    _ => vec![generate(LocatorKind::Nth, &n, &none)],
                });
                index += 1;
                continue;
            }
            "internal:text" | "internal:label" => {
                let (text, exact) = detect_exact(body)?;
                let kind = if part.name == "internal:text" {
                    LocatorKind::Text
                } else {
                    LocatorKind::Label
                };
                tokens.push(vec![generate(kind, &text, &LocatorOptions::exact(exact))]);
                index += 1;
                continue;
            }
            "internal:has-text" | "internal:has-not-text" => {
                // Strict has-text has no locator equivalent; it falls through
                // to a raw `locator()` below.
                let (text, exact) = detect_exact(body)?;
                if exact != Some(true) {
                    let kind = if part.name == "internal:has-text" {
                        LocatorKind::HasText
                    } else {
                        LocatorKind::HasNotText
                    };
                    tokens.push(vec![generate(kind, &text, &LocatorOptions::exact(exact))]);
                    index += 1;
                    continue;
                }
            }
            "internal:has" | "internal:has-not" | "internal:and" | "internal:or"
            | "internal:chain" => {
                let kind = match part.name.as_str() {
                    "internal:has" => LocatorKind::Has,
                    "internal:has-not" => LocatorKind::HasNot,
                    "internal:and" => LocatorKind::And,
                    "internal:or" => LocatorKind::Or,
                    _ => LocatorKind::Chain,
                };
                tokens.push(
                    nested(part)?
                        .into_iter()
                        .map(|inner| generate(kind, &TextOrRegex::Text(inner), &none))
                        .collect(),
                );
                index += 1;
                continue;
            }
            "internal:role" => {
                let (role, options) = role_options(body)?;
                tokens.push(vec![generate(LocatorKind::Role, &TextOrRegex::Text(role), &options)]);
                index += 1;
                continue;
            }
            "internal:testid" => {
                let selector = parse_attribute_selector(body, true)?;
                let value = selector
                    .attributes
                    .first()
                    .map(|attr| attribute_text(&attr.value))
                    .ok_or_else(|| SelectorError::invalid("Empty test id selector"))?;
                tokens.push(vec![generate(LocatorKind::TestId, &value, &none)]);
                index += 1;
                continue;
            }
            "internal:attr" => {
                let selector = parse_attribute_selector(body, true)?;
                if let Some(attr) = selector.attributes.first() {
                    let kind = match attr.name.as_str() {
                        "placeholder" => Some(LocatorKind::Placeholder),
                        "alt" => Some(LocatorKind::Alt),
                        "title" => Some(LocatorKind::Title),
                        _ => None,
                    };
                    if let Some(kind) = kind {
                        let options = LocatorOptions::exact(Some(attr.case_sensitive));
                        tokens.push(vec![generate(kind, &attribute_text(&attr.value), &options)]);
                        index += 1;
                        continue;
                    }
                }
            }
            _ => {}
        }

        let mut kind = LocatorKind::Default;
        let next_part = parts.get(index + 1).copied();
        if next_part.is_some_and(ParsedSelectorPart::is_enter_frame) {
            kind = LocatorKind::Frame;
            next_base = LocatorBase::FrameLocator;
            index += 1;
        }

        let single = |force: bool| {
            stringify_selector(
                &ParsedSelector {
                    parts: vec![part.clone()],
                    capture: None,
                },
                force,
            )
        };
        let selector_part = TextOrRegex::Text(single(false));
        let locator_part = generate(kind, &selector_part, &none);

        // `locator('div').filter({ hasText: 'foo' })` can also be written as
        // `locator('div', { hasText: 'foo' })`.
        if kind == LocatorKind::Default
            && let Some(next) = parts.get(index + 1)
            && matches!(next.name.as_str(), "internal:has-text" | "internal:has-not-text")
        {
            let (text, exact) = detect_exact(next.raw_body().unwrap_or(&next.source))?;
            if exact != Some(true) {
                let has_text = next.name == "internal:has-text";
                let next_locator = factory.generate_locator(
                    LocatorBase::Locator,
                    if has_text {
                        LocatorKind::HasText
                    } else {
                        LocatorKind::HasNotText
                    },
                    &text,
                    &LocatorOptions::exact(exact),
                );
                let options = if has_text {
                    LocatorOptions {
                        has_text: Some(text),
                        ..LocatorOptions::default()
                    }
                } else {
                    LocatorOptions {
                        has_not_text: Some(text),
                        ..LocatorOptions::default()
                    }
                };
                let combined = generate(LocatorKind::Default, &selector_part, &options);
                tokens.push(vec![
                    factory.chain_locators(&[locator_part, next_locator]),
                    combined,
                ]);
                index += 2;
                continue;
            }
        }

        let mut alternatives = vec![locator_part];
        if matches!(part.name.as_str(), "css" | "xpath") {
            let with_engine = generate(kind, &TextOrRegex::Text(single(true)), &none);
            if !alternatives.contains(&with_engine) {
                alternatives.push(with_engine);
            }
        }
        tokens.push(alternatives);
        index += 1;
    }

    Ok(combine_tokens(factory, &tokens, max_output_size))
}

/// The cartesian product of the per-part alternatives, in order, stopping at
/// `max_output_size`.
fn combine_tokens(
    factory: &dyn LocatorFactory,
    tokens: &[Vec<String>],
    max_output_size: usize,
) -> Vec<String> {
    fn visit(
        factory: &dyn LocatorFactory,
        tokens: &[Vec<String>],
        current: &mut Vec<String>,
        result: &mut Vec<String>,
        max_output_size: usize,
    ) -> bool {
        if current.len() == tokens.len() {
            result.push(factory.chain_locators(current));
            return result.len() < max_output_size;
        }
        for taken in &tokens[current.len()] {
            current.push(taken.clone());
            let more = visit(factory, tokens, current, result, max_output_size);
            let _ = current.pop();
            if !more {
                return false;
            }
        }
        true
    }

    let mut result = Vec::new();
    if max_output_size > 0 {
        let _ = visit(factory, tokens, &mut Vec::new(), &mut result, max_output_size);
    }
    result
}

/// Split a text-engine body into its text and exactness. Regex bodies have
/// no exactness.
fn detect_exact(text: &str) -> Result<(TextOrRegex, Option<bool>), SelectorError> {
    if let Some(captures) = REGEX_BODY.captures(text) {
        let re = JsRegex::new(&captures[1], &captures[2])
            .map_err(|error| SelectorError::invalid(error.to_string()))?;
        return Ok((TextOrRegex::Regex(re), None));
    }
    let unquote = |quoted: &str| {
        serde_json::from_str::<String>(quoted)
            .map_err(|error| SelectorError::invalid(format!("Malformed text body {text}: {error}")))
    };
    if text.ends_with('"') {
        return Ok((TextOrRegex::Text(unquote(text)?), Some(true)));
    }
    if let Some(quoted) = text.strip_suffix('s').filter(|q| q.ends_with('"')) {
        return Ok((TextOrRegex::Text(unquote(quoted)?), Some(true)));
    }
    if let Some(quoted) = text.strip_suffix('i').filter(|q| q.ends_with('"')) {
        return Ok((TextOrRegex::Text(unquote(quoted)?), Some(false)));
    }
    Ok((TextOrRegex::Text(text.to_string()), Some(false)))
}

fn attribute_text(value: &AttributeValue) -> TextOrRegex {
    match value {
        AttributeValue::Regex(re) => TextOrRegex::Regex(re.clone()),
        other => TextOrRegex::Text(other.to_string()),
    }
}

fn role_options(body: &str) -> Result<(String, LocatorOptions), SelectorError> {
    let selector = parse_attribute_selector(body, true)?;
    let mut options = LocatorOptions::default();
    for attr in selector.attributes {
        if attr.name == "name" {
            options.exact = Some(attr.case_sensitive);
            options.name = Some(attribute_text(&attr.value));
            continue;
        }
        let value = match attr.value {
            // `[include-hidden]` reads as `includeHidden: true`.
            _ if attr.op == AttributeOperator::Truthy => AttributeValue::Bool(true),
            AttributeValue::String(level) if attr.name == "level" => level
                .parse::<f64>()
                .map_or(AttributeValue::String(level), AttributeValue::Number),
            value => value,
        };
        let name = if attr.name == "include-hidden" {
            "includeHidden".to_string()
        } else {
            attr.name
        };
        options.attrs.push((name, value));
    }
    Ok((selector.name, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js(selector: &str) -> String {
        as_locator(Language::JavaScript, selector, false)
    }

    #[test]
    fn test_language_names() {
        assert_eq!(Language::CSharp.to_string(), "csharp");
        assert_eq!("javascript".parse::<Language>().ok(), Some(Language::JavaScript));
        assert_eq!(LocatorKind::TestId.to_string(), "test-id");
        assert_eq!(LocatorKind::HasNot.to_string(), "hasNot");
    }

    #[test]
    fn test_detect_exact() {
        assert_eq!(
            detect_exact("\"Hello\"s").ok(),
            Some((TextOrRegex::Text("Hello".to_string()), Some(true)))
        );
        assert_eq!(
            detect_exact("\"Hello\"i").ok(),
            Some((TextOrRegex::Text("Hello".to_string()), Some(false)))
        );
        assert_eq!(
            detect_exact("Hello").ok(),
            Some((TextOrRegex::Text("Hello".to_string()), Some(false)))
        );
        let (re, exact) = detect_exact("/^sub/i").unwrap();
        assert!(matches!(re, TextOrRegex::Regex(ref re) if re.source() == "^sub" && re.flags() == "i"));
        assert_eq!(exact, None);
    }

    #[test]
    fn test_nth_alternatives() {
        let all = as_locators(Language::JavaScript, "div >> nth=0", false, 20);
        assert_eq!(
            all,
            vec![
                "locator('div').first()".to_string(),
                "locator('div').nth(0)".to_string(),
                "locator('css=div').first()".to_string(),
                "locator('css=div').nth(0)".to_string(),
            ]
        );
        let bounded = as_locators(Language::JavaScript, "div >> nth=0", false, 2);
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn test_has_text_fusion() {
        let all = as_locators(Language::JavaScript, "div >> internal:has-text=\"Hi\"i", false, 20);
        assert_eq!(all[0], "locator('div').filter({ hasText: 'Hi' })");
        assert_eq!(all[1], "locator('div', { hasText: 'Hi' })");
        // Strict has-text stays a raw selector.
        assert_eq!(
            js("div >> internal:has-text=\"Hi\"s"),
            "locator('div').locator('internal:has-text=\"Hi\"s')"
        );
    }

    #[test]
    fn test_frame_locator() {
        assert_eq!(
            js("iframe >> nth=0 >> internal:control=enter-frame >> internal:text=\"Go\"i"),
            "frameLocator('iframe').first().getByText('Go')"
        );
        assert_eq!(
            as_locator(Language::Java, "iframe >> internal:control=enter-frame >> div", false),
            "frameLocator(\"iframe\").locator(\"div\")"
        );
    }

    #[test]
    fn test_role_options() {
        assert_eq!(
            js("internal:role=heading[level=2][include-hidden]"),
            "getByRole('heading', { level: 2, includeHidden: true })"
        );
        assert_eq!(
            as_locator(Language::Python, "internal:role=checkbox[checked=true][name=\"Agree\"i]", false),
            "get_by_role(\"checkbox\", name=\"Agree\", checked=True)"
        );
    }

    #[test]
    fn test_unparsable_selector_is_returned_verbatim() {
        assert_eq!(js("internal:has=\"div"), "internal:has=\"div");
    }
}
