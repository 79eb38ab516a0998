//! The attribute mini-language: `name[prop.path op value]...`.
//!
//! Role, test-id and attribute engines take bodies like
//! `button[name="Submit" i][pressed]`. This grammar is separate from CSS: it
//! is read character by character, property names may be dotted paths with
//! quoted segments, and values are typed (string, number, boolean or regular
//! expression).

use core::fmt;

use strum_macros::{Display, EnumString};

use crate::error::SelectorError;
use crate::pattern::JsRegex;

/// Comparison in an attribute clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum AttributeOperator {
    /// `[prop]`: the property is truthy.
    #[strum(serialize = "<truthy>")]
    Truthy,
    /// `[prop=value]`
    #[strum(serialize = "=")]
    Equals,
    /// `[prop*=value]`: substring.
    #[strum(serialize = "*=")]
    Contains,
    /// `[prop^=value]`: prefix.
    #[strum(serialize = "^=")]
    Prefix,
    /// `[prop$=value]`: suffix.
    #[strum(serialize = "$=")]
    Suffix,
    /// `[prop|=value]`: exact or followed by `-`.
    #[strum(serialize = "|=")]
    DashMatch,
    /// `[prop~=value]`: one of the space-separated words.
    #[strum(serialize = "~=")]
    Includes,
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// No value; only used by [`AttributeOperator::Truthy`].
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// An unquoted number.
    Number(f64),
    /// A quoted (or, when allowed, unquoted) string.
    String(String),
    /// `/source/flags`.
    Regex(JsRegex),
}

impl AttributeValue {
    /// The string, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// JavaScript truthiness.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Regex(_) => true,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.is_infinite() => {
                f.write_str(if n.is_sign_negative() { "-Infinity" } else { "Infinity" })
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Regex(re) => write!(f, "{re}"),
        }
    }
}

/// One bracketed clause.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelectorPart {
    /// The property path joined with `.`.
    pub name: String,
    /// The property path.
    pub json_path: Vec<String>,
    /// The comparison.
    pub op: AttributeOperator,
    /// The value compared against.
    pub value: AttributeValue,
    /// `false` after an `i` suffix, and for truthy clauses.
    pub case_sensitive: bool,
}

impl AttributeSelectorPart {
    /// Compare an actual property value against this clause.
    #[must_use]
    pub fn matches(&self, actual: &AttributeValue) -> bool {
        let fold = |value: &AttributeValue| match value {
            AttributeValue::String(s) if !self.case_sensitive => {
                AttributeValue::String(s.to_uppercase())
            }
            other => other.clone(),
        };
        let actual = fold(actual);
        let expected = fold(&self.value);

        match self.op {
            AttributeOperator::Truthy => return actual.is_truthy(),
            AttributeOperator::Equals => {
                return match &expected {
                    AttributeValue::Regex(re) => actual.as_str().is_some_and(|s| re.is_match(s)),
                    _ => actual == expected,
                };
            }
            _ => {}
        }
        let (Some(actual), Some(expected)) = (actual.as_str(), expected.as_str()) else {
            return false;
        };
        match self.op {
            AttributeOperator::Contains => actual.contains(expected),
            AttributeOperator::Prefix => actual.starts_with(expected),
            AttributeOperator::Suffix => actual.ends_with(expected),
            AttributeOperator::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
            AttributeOperator::Includes => actual.split(' ').any(|word| word == expected),
            AttributeOperator::Truthy | AttributeOperator::Equals => false,
        }
    }
}

/// A parsed `name[...][...]` body.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    /// Leading identifier, possibly empty.
    pub name: String,
    /// Clauses in source order.
    pub attributes: Vec<AttributeSelectorPart>,
}

/// Parse attribute mini-language text.
///
/// With `allow_unquoted_strings`, bare values other than `true`/`false` stay
/// strings; otherwise they must be numbers.
///
/// # Errors
///
/// Returns [`SelectorError::AttributeGrammar`] for malformed text, for an
/// empty selector, for regular expressions with an operator other than `=`,
/// and for non-string values with an operator other than `=`.
pub fn parse_attribute_selector(
    selector: &str,
    allow_unquoted_strings: bool,
) -> Result<AttributeSelector, SelectorError> {
    let mut parser = AttributeParser {
        selector,
        chars: selector.chars().collect(),
        wp: 0,
        allow_unquoted_strings,
    };

    let name = parser.read_identifier();
    parser.skip_spaces();
    let mut attributes = Vec::new();
    while parser.next() == Some('[') {
        attributes.push(parser.read_attribute()?);
        parser.skip_spaces();
    }
    if !parser.eol() {
        return Err(parser.syntax_error(None));
    }
    if name.is_empty() && attributes.is_empty() {
        return Err(SelectorError::AttributeGrammar(format!(
            "Error while parsing selector `{selector}` - selector cannot be empty"
        )));
    }
    Ok(AttributeSelector { name, attributes })
}

/// [§ 4.3.9 ident-token diagram](https://www.w3.org/TR/css-syntax-3/#ident-token-diagram)
/// name code points.
fn is_css_name_char(c: char) -> bool {
    c >= '\u{80}' || c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

struct AttributeParser<'a> {
    selector: &'a str,
    chars: Vec<char>,
    wp: usize,
    allow_unquoted_strings: bool,
}

impl AttributeParser<'_> {
    fn eol(&self) -> bool {
        self.wp >= self.chars.len()
    }

    fn next(&self) -> Option<char> {
        self.chars.get(self.wp).copied()
    }

    fn eat1(&mut self) -> Option<char> {
        let result = self.next();
        self.wp += 1;
        result
    }

    fn syntax_error(&self, stage: Option<&str>) -> SelectorError {
        let selector = self.selector;
        let Some(c) = self.next() else {
            return SelectorError::AttributeGrammar(format!(
                "Unexpected end of selector while parsing selector `{selector}`"
            ));
        };
        let stage = stage.map(|s| format!(" during {s}")).unwrap_or_default();
        SelectorError::AttributeGrammar(format!(
            "Error while parsing selector `{selector}` - unexpected symbol \"{c}\" at position {}{stage}",
            self.wp
        ))
    }

    fn grammar_error(&self, message: &str) -> SelectorError {
        SelectorError::AttributeGrammar(format!(
            "Error while parsing selector `{}` - {message}",
            self.selector
        ))
    }

    fn skip_spaces(&mut self) {
        while self.next().is_some_and(char::is_whitespace) {
            self.wp += 1;
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        self.skip_spaces();
        while let Some(c) = self.next().filter(|&c| is_css_name_char(c)) {
            result.push(c);
            self.wp += 1;
        }
        result
    }

    /// Returns the string without its quotes. A backslash escapes the next
    /// character.
    fn read_quoted_string(&mut self, quote: char) -> Result<String, SelectorError> {
        if self.eat1() != Some(quote) {
            return Err(self.syntax_error(Some("parsing quoted string")));
        }
        let mut result = String::new();
        while let Some(c) = self.next().filter(|&c| c != quote) {
            self.wp += 1;
            if c == '\\' {
                if let Some(escaped) = self.eat1() {
                    result.push(escaped);
                }
            } else {
                result.push(c);
            }
        }
        if self.next() != Some(quote) {
            return Err(self.syntax_error(Some("parsing quoted string")));
        }
        self.wp += 1;
        Ok(result)
    }

    fn read_regular_expression(&mut self) -> Result<JsRegex, SelectorError> {
        if self.eat1() != Some('/') {
            return Err(self.syntax_error(Some("parsing regular expression")));
        }
        let mut source = String::new();
        let mut in_class = false;
        while let Some(c) = self.next() {
            if c == '\\' {
                source.push(c);
                self.wp += 1;
                if self.eol() {
                    return Err(self.syntax_error(Some("parsing regular expression")));
                }
            } else if in_class && c == ']' {
                in_class = false;
            } else if !in_class && c == '[' {
                in_class = true;
            } else if !in_class && c == '/' {
                break;
            }
            if let Some(c) = self.eat1() {
                source.push(c);
            }
        }
        if self.eat1() != Some('/') {
            return Err(self.syntax_error(Some("parsing regular expression")));
        }
        let mut flags = String::new();
        while let Some(c) = self.next().filter(|c| "dgimsuy".contains(*c)) {
            flags.push(c);
            self.wp += 1;
        }
        JsRegex::new(&source, &flags).map_err(|e| {
            SelectorError::AttributeGrammar(format!(
                "Error while parsing selector `{}`: {e}",
                self.selector
            ))
        })
    }

    fn read_attribute_token(&mut self) -> Result<String, SelectorError> {
        self.skip_spaces();
        let token = match self.next() {
            Some(quote @ ('\'' | '"')) => self.read_quoted_string(quote)?,
            _ => self.read_identifier(),
        };
        if token.is_empty() {
            return Err(self.syntax_error(Some("parsing property path")));
        }
        Ok(token)
    }

    fn read_operator(&mut self) -> Result<AttributeOperator, SelectorError> {
        self.skip_spaces();
        let first = self.eat_if_any();
        let mut op: String = first.into_iter().collect();
        if first != Some('=') {
            op.extend(self.eat_if_any());
        }
        match op.parse::<AttributeOperator>() {
            Ok(AttributeOperator::Truthy) | Err(_) => {
                Err(self.syntax_error(Some("parsing operator")))
            }
            Ok(op) => Ok(op),
        }
    }

    fn eat_if_any(&mut self) -> Option<char> {
        if self.eol() { None } else { self.eat1() }
    }

    fn read_attribute(&mut self) -> Result<AttributeSelectorPart, SelectorError> {
        // Leading `[`.
        self.wp += 1;

        let mut json_path = vec![self.read_attribute_token()?];
        self.skip_spaces();
        while self.next() == Some('.') {
            self.wp += 1;
            json_path.push(self.read_attribute_token()?);
            self.skip_spaces();
        }
        if self.next() == Some(']') {
            self.wp += 1;
            return Ok(AttributeSelectorPart {
                name: json_path.join("."),
                json_path,
                op: AttributeOperator::Truthy,
                value: AttributeValue::Null,
                case_sensitive: false,
            });
        }

        let op = self.read_operator()?;
        let mut case_sensitive = true;
        self.skip_spaces();
        let value = match self.next() {
            Some('/') => {
                if op != AttributeOperator::Equals {
                    return Err(self.grammar_error(&format!(
                        "cannot use {op} in attribute with regular expression"
                    )));
                }
                AttributeValue::Regex(self.read_regular_expression()?)
            }
            Some(quote @ ('\'' | '"')) => {
                let value = self.read_quoted_string(quote)?;
                self.skip_spaces();
                match self.next() {
                    Some('i' | 'I') => {
                        case_sensitive = false;
                        self.wp += 1;
                    }
                    Some('s' | 'S') => self.wp += 1,
                    _ => {}
                }
                AttributeValue::String(value)
            }
            _ => self.read_unquoted_value()?,
        };
        self.skip_spaces();
        if self.next() != Some(']') {
            return Err(self.syntax_error(Some("parsing attribute value")));
        }
        self.wp += 1;
        if op != AttributeOperator::Equals && value.as_str().is_none() {
            return Err(self.grammar_error(&format!(
                "cannot use {op} in attribute with non-string matching value - {value}"
            )));
        }
        Ok(AttributeSelectorPart {
            name: json_path.join("."),
            json_path,
            op,
            value,
            case_sensitive,
        })
    }

    fn read_unquoted_value(&mut self) -> Result<AttributeValue, SelectorError> {
        let mut raw = String::new();
        while let Some(c) = self
            .next()
            .filter(|&c| is_css_name_char(c) || c == '+' || c == '.')
        {
            raw.push(c);
            self.wp += 1;
        }
        match raw.as_str() {
            "true" => return Ok(AttributeValue::Bool(true)),
            "false" => return Ok(AttributeValue::Bool(false)),
            _ => {}
        }
        if self.allow_unquoted_strings {
            return Ok(AttributeValue::String(raw));
        }
        parse_js_number(&raw)
            .map(AttributeValue::Number)
            .ok_or_else(|| self.syntax_error(Some("parsing attribute value")))
    }
}

/// Unary `+` on a string, restricted to the decimal forms that can appear
/// here. `None` stands for `NaN`.
fn parse_js_number(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(0.0);
    }
    let unsigned = raw.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" {
        let negative = raw.starts_with('-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    // Rust also accepts `inf` and `nan`, which are not numbers here.
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Serializes back to text that parses to an equal selector.
impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for attribute in &self.attributes {
            let path: Vec<String> = attribute.json_path.iter().map(|s| path_segment(s)).collect();
            write!(f, "[{}", path.join("."))?;
            match &attribute.value {
                AttributeValue::Null if attribute.op == AttributeOperator::Truthy => {}
                AttributeValue::String(s) => write!(
                    f,
                    "{}{}{}",
                    attribute.op,
                    quote_value(s),
                    if attribute.case_sensitive { "s" } else { "i" }
                )?,
                value => write!(f, "{}{value}", attribute.op)?,
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn path_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.chars().all(|c| is_css_name_char(c) && !c.is_whitespace()) {
        segment.to_string()
    } else {
        quote_value(segment)
    }
}
