//! The selector language: `engine=body >> engine=body`.
//!
//! A selector is a chain of parts separated by `>>`. Each part names the
//! engine that evaluates it (`css=`, `text=`, `internal:role=`, ...) or lets
//! the parser infer one: quoted text is `text`, a leading `//` or `..` is
//! `xpath`, anything else is `css`. One part may carry a leading `*` to
//! capture it as the result instead of the last part.
//!
//! Composite engines (`internal:has`, `internal:and`, `left-of`, ...) take a
//! JSON-encoded inner selector, optionally followed by a distance:
//! `left-of="button",50`. Their bodies are parsed recursively.

use core::fmt;

use quarry_css::{CUSTOM_CSS_NAMES, CssComplexSelectorList, parse_css};

use crate::error::SelectorError;

/// Engines whose body is itself a selector.
pub const NESTED_SELECTOR_NAMES: &[&str] = &[
    "internal:has",
    "internal:has-not",
    "internal:and",
    "internal:or",
    "internal:chain",
    "left-of",
    "right-of",
    "above",
    "below",
    "near",
];

/// Nested engines that accept a trailing distance.
pub const NESTED_SELECTOR_NAMES_WITH_DISTANCE: &[&str] =
    &["left-of", "right-of", "above", "below", "near"];

/// The inner selector of a composite engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedSelectorBody {
    /// The inner selector.
    pub parsed: ParsedSelector,
    /// Maximum distance, for the layout engines.
    pub distance: Option<f64>,
}

/// A part body, shaped by its engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorBody {
    /// `css` parts.
    Css(CssComplexSelectorList),
    /// Composite engines.
    Nested(NestedSelectorBody),
    /// Every other engine receives its body text as written.
    Raw(String),
}

/// One `engine=body` step.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSelectorPart {
    /// Engine name.
    pub name: String,
    /// Parsed body.
    pub body: SelectorBody,
    /// Body text as written, used to render the part back.
    pub source: String,
}

impl ParsedSelectorPart {
    /// The body text, for engines that take it raw.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match &self.body {
            SelectorBody::Raw(body) => Some(body.as_str()),
            _ => None,
        }
    }

    /// The inner selector, for composite engines.
    #[must_use]
    pub const fn nested(&self) -> Option<&NestedSelectorBody> {
        match &self.body {
            SelectorBody::Nested(nested) => Some(nested),
            _ => None,
        }
    }

    /// Whether this is the `internal:control=enter-frame` boundary.
    #[must_use]
    pub fn is_enter_frame(&self) -> bool {
        self.name == "internal:control" && self.raw_body() == Some("enter-frame")
    }
}

/// A parsed selector.
///
/// `parts` is never empty and its first part is never a composite engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSelector {
    /// The chain, evaluated left to right.
    pub parts: Vec<ParsedSelectorPart>,
    /// Index of the part marked with `*`.
    pub capture: Option<usize>,
}

impl fmt::Display for ParsedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stringify_selector(self, false))
    }
}

/// Whether `name` is one of [`NESTED_SELECTOR_NAMES`].
#[must_use]
pub fn is_nested_selector_name(name: &str) -> bool {
    NESTED_SELECTOR_NAMES.contains(&name)
}

struct PartString {
    name: String,
    body: String,
}

/// Parse selector text.
///
/// # Errors
///
/// Returns [`SelectorError::InvalidSelector`] for a second capture marker,
/// malformed composite bodies, a composite engine in first position, frame
/// boundaries inside composite bodies and invalid `css` parts, and
/// [`SelectorError::Lex`] when a `css` part does not tokenize.
pub fn parse_selector(selector: &str) -> Result<ParsedSelector, SelectorError> {
    let (strings, capture) = parse_selector_string(selector)?;
    let mut parts: Vec<ParsedSelectorPart> = Vec::with_capacity(strings.len());
    for PartString { name, body } in strings {
        if name == "css" || name == "css:light" {
            let body = if name == "css:light" {
                format!(":light({body})")
            } else {
                body
            };
            let parsed = parse_css(&body, CUSTOM_CSS_NAMES)?;
            parts.push(ParsedSelectorPart {
                name: "css".to_string(),
                body: SelectorBody::Css(parsed.selector),
                source: body,
            });
            continue;
        }
        if is_nested_selector_name(&name) {
            let nested = parse_nested_body(&name, &body, &parts)?;
            parts.push(ParsedSelectorPart {
                name,
                body: SelectorBody::Nested(nested),
                source: body,
            });
            continue;
        }
        parts.push(ParsedSelectorPart {
            name,
            source: body.clone(),
            body: SelectorBody::Raw(body),
        });
    }
    if let Some(first) = parts.first().filter(|p| is_nested_selector_name(&p.name)) {
        return Err(SelectorError::invalid(format!(
            "\"{}\" selector cannot be first",
            first.name
        )));
    }
    Ok(ParsedSelector { parts, capture })
}

/// Decode `["inner", distance?]` and parse the inner selector.
fn parse_nested_body(
    name: &str,
    body: &str,
    preceding: &[ParsedSelectorPart],
) -> Result<NestedSelectorBody, SelectorError> {
    let malformed = || SelectorError::invalid(format!("Malformed selector: {name}={body}"));
    let decoded: serde_json::Value =
        serde_json::from_str(&format!("[{body}]")).map_err(|_| malformed())?;
    let items = decoded.as_array().ok_or_else(malformed)?;
    if items.is_empty() || items.len() > 2 {
        return Err(malformed());
    }
    let inner = items[0].as_str().ok_or_else(malformed)?;
    let distance = match items.get(1) {
        None => None,
        Some(value) => {
            if !NESTED_SELECTOR_NAMES_WITH_DISTANCE.contains(&name) {
                return Err(malformed());
            }
            Some(value.as_f64().ok_or_else(malformed)?)
        }
    };

    let mut parsed = parse_selector(inner)?;
    // A nested selector may repeat the frame prefix of the enclosing one.
    if let Some(last_frame) = parsed.parts.iter().rposition(ParsedSelectorPart::is_enter_frame) {
        let prefix_len = last_frame + 1;
        let own = stringify_parts(&parsed.parts[..prefix_len]);
        let enclosing = stringify_parts(&preceding[..prefix_len.min(preceding.len())]);
        if own == enclosing {
            let _ = parsed.parts.drain(..prefix_len);
            parsed.capture = parsed
                .capture
                .and_then(|capture| capture.checked_sub(prefix_len));
        }
    }
    if parsed.parts.iter().any(ParsedSelectorPart::is_enter_frame) {
        return Err(SelectorError::invalid(format!(
            "Frame boundaries are not allowed inside \"{name}\" selector"
        )));
    }
    Ok(NestedSelectorBody { parsed, distance })
}

fn stringify_parts(parts: &[ParsedSelectorPart]) -> String {
    stringify_selector(
        &ParsedSelector {
            parts: parts.to_vec(),
            capture: None,
        },
        false,
    )
}

/// Cut a selector into one chunk per frame, at each
/// `internal:control=enter-frame`. The capture index is rebased to its
/// chunk.
///
/// # Errors
///
/// Everything [`parse_selector`] reports, plus a chunk that would be empty
/// and a capture outside the last chunk.
pub fn split_selector_by_frame(selector_text: &str) -> Result<Vec<ParsedSelector>, SelectorError> {
    let selector = parse_selector(selector_text)?;
    let mut result = Vec::new();
    let mut chunk = ParsedSelector::default();
    let mut chunk_start = 0;
    for (i, part) in selector.parts.into_iter().enumerate() {
        if part.is_enter_frame() {
            if chunk.parts.is_empty() {
                return Err(SelectorError::invalid(
                    "Selector cannot start with entering frame, select the iframe first",
                ));
            }
            result.push(core::mem::take(&mut chunk));
            chunk_start = i + 1;
            continue;
        }
        if selector.capture == Some(i) {
            chunk.capture = Some(i - chunk_start);
        }
        chunk.parts.push(part);
    }
    if chunk.parts.is_empty() {
        return Err(SelectorError::invalid(format!(
            "Selector cannot end with entering frame, while parsing selector {selector_text}"
        )));
    }
    let last_has_capture = chunk.capture.is_some();
    result.push(chunk);
    if selector.capture.is_some() && !last_has_capture {
        return Err(SelectorError::invalid(
            "Can not capture the selector before diving into the frame. Only use * after the last frame has been selected",
        ));
    }
    Ok(result)
}

/// Render a parsed selector back to text.
///
/// The engine prefix is left out where the parser would infer it anyway,
/// unless `force_engine_name` is set or the part is captured.
#[must_use]
pub fn stringify_selector(selector: &ParsedSelector, force_engine_name: bool) -> String {
    selector
        .parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let captured = selector.capture == Some(i);
            let include_engine = force_engine_name || captured || !is_inferred_engine(part);
            format!(
                "{}{}{}",
                if captured { "*" } else { "" },
                if include_engine { format!("{}=", part.name) } else { String::new() },
                part.source
            )
        })
        .collect::<Vec<_>>()
        .join(" >> ")
}

fn is_inferred_engine(part: &ParsedSelectorPart) -> bool {
    match part.name.as_str() {
        "css" => true,
        "xpath" => part.source.starts_with("//") || part.source.starts_with(".."),
        "text" => is_quoted(&part.source),
        _ => false,
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() > 1
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
}

/// Call `visitor` on every part, descending into composite bodies. The flag
/// tells whether the part sits inside one.
pub fn visit_all_selector_parts<F>(selector: &ParsedSelector, visitor: &mut F)
where
    F: FnMut(&ParsedSelectorPart, bool),
{
    fn visit<F>(selector: &ParsedSelector, nested: bool, visitor: &mut F)
    where
        F: FnMut(&ParsedSelectorPart, bool),
    {
        for part in &selector.parts {
            visitor(part, nested);
            if let Some(inner) = part.nested() {
                visit(&inner.parsed, true, visitor);
            }
        }
    }
    visit(selector, false, visitor);
}

/// Split on top-level `>>` and name each part.
fn parse_selector_string(
    selector: &str,
) -> Result<(Vec<PartString>, Option<usize>), SelectorError> {
    let mut parts = Vec::new();
    let mut capture = None;
    let mut append = |raw: &str| -> Result<(), SelectorError> {
        let (name, body) = classify_part(raw.trim());
        let (captured, name) = match name.strip_prefix('*') {
            Some(rest) => (true, rest.to_string()),
            None => (false, name),
        };
        parts.push(PartString { name, body });
        if captured {
            if capture.is_some() {
                return Err(SelectorError::invalid(
                    "Only one of the selectors can capture using * modifier",
                ));
            }
            capture = Some(parts.len() - 1);
        }
        Ok(())
    };

    if !selector.contains(">>") {
        append(selector)?;
        return Ok((parts, capture));
    }

    let bytes = selector.as_bytes();
    let mut index = 0;
    let mut start = 0;
    let mut quote: Option<u8> = None;
    while index < bytes.len() {
        let c = bytes[index];
        if c == b'\\' && index + 1 < bytes.len() {
            index += 1;
            // Step over the whole escaped character.
            index += selector[index..].chars().next().map_or(1, char::len_utf8);
        } else if Some(c) == quote {
            quote = None;
            index += 1;
        } else if quote.is_none()
            && matches!(c, b'"' | b'\'' | b'`')
            && !ignores_text_selector_quote(&selector[start..index])
        {
            quote = Some(c);
            index += 1;
        } else if quote.is_none() && c == b'>' && bytes.get(index + 1) == Some(&b'>') {
            append(&selector[start..index])?;
            index += 2;
            start = index;
        } else {
            index += 1;
        }
    }
    append(&selector[start..])?;
    Ok((parts, capture))
}

/// `text=foo "bar"`: quotes after unquoted text are literal.
fn ignores_text_selector_quote(prefix: &str) -> bool {
    let Some(rest) = prefix.trim_start().strip_prefix("text") else {
        return false;
    };
    let Some(text) = rest.trim_start().strip_prefix('=') else {
        return false;
    };
    !text.is_empty() && !text.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
}

fn is_engine_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | ':' | '*'))
}

fn classify_part(part: &str) -> (String, String) {
    if let Some((name, body)) = part
        .split_once('=')
        .filter(|(name, _)| is_engine_name(name.trim()))
    {
        return (name.trim().to_string(), body.to_string());
    }
    let name = if is_quoted(part) {
        "text"
    } else if part.trim_start_matches('(').starts_with("//") || part.starts_with("..") {
        "xpath"
    } else {
        "css"
    };
    (name.to_string(), part.to_string())
}
