//! Reading locator code back into selector text.
//!
//! The input is free-form text pasted by a user, in any of the supported
//! languages. It is tokenized with one table that covers all of them
//! (`'`/`"`/backtick strings, Python `r"..."` raw strings, `/re/` literals),
//! parsed into a small call-chain tree and interpreted call by call. Method
//! and option names are compared after lowercasing and dropping `_`, so
//! `get_by_role`, `getByRole` and `GetByRole` are the same call.
//!
//! A result is only returned when rendering it again in the requested
//! language reproduces the input, up to whitespace and quote style.

use thiserror::Error;
use tracing::{debug, trace};

use super::builders::{
    ByRoleOptions, RoleState, get_by_alt_text_selector, get_by_label_selector,
    get_by_placeholder_selector, get_by_role_selector, get_by_test_id_selector,
    get_by_text_selector, get_by_title_selector,
};
use super::{DEFAULT_MAX_OUTPUT_SIZE, Language, as_locators_with_quote};
use crate::parser::parse_selector;
use crate::pattern::JsRegex;
use crate::string_utils::{TextOrRegex, escape_for_text_selector, json_quote};

/// Why locator text could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorParseError {
    /// A string or pattern literal never closed.
    #[error("unterminated literal starting at {0}")]
    UnterminatedLiteral(usize),
    /// A character no locator expression contains.
    #[error("unexpected character {character:?} at {position}")]
    UnexpectedCharacter {
        /// The character.
        character: char,
        /// Its index.
        position: usize,
    },
    /// The token stream does not form a call chain.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the grammar needed.
        expected: &'static str,
        /// What was there.
        found: String,
    },
    /// A pattern the regex engine rejects.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
    /// A method that has no selector equivalent.
    #[error("unsupported method {0}")]
    UnsupportedMethod(String),
    /// A known method called with arguments it does not take.
    #[error("unsupported arguments for {0}")]
    UnsupportedArguments(String),
}

/// Selector text read from locator code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocator {
    /// The equivalent selector.
    pub selector: String,
    /// The first quote character used for a string, to render JavaScript
    /// back in the same style.
    pub preferred_quote: Option<char>,
}

/// Turn `text` into selector text when it is locator code in `language`.
///
/// Text that already parses as a selector is returned unchanged. So is text
/// that cannot be read, or whose reading does not render back to the same
/// locator.
#[must_use]
pub fn locator_or_selector_as_selector(
    language: Language,
    text: &str,
    test_id_attribute: &str,
) -> String {
    if parse_selector(text).is_ok() {
        return text.to_string();
    }
    match parse_locator(text, test_id_attribute) {
        Ok(parsed) => {
            let digest = digest_for_comparison(language, text);
            let renderings = as_locators_with_quote(
                language,
                &parsed.selector,
                false,
                DEFAULT_MAX_OUTPUT_SIZE,
                parsed.preferred_quote,
            );
            if renderings
                .iter()
                .any(|candidate| digest_for_comparison(language, candidate) == digest)
            {
                debug!(%language, selector = parsed.selector.as_str(), "Read locator");
                return parsed.selector;
            }
            debug!(
                %language,
                selector = parsed.selector.as_str(),
                "Locator does not render back to its input"
            );
        }
        Err(error) => trace!(%language, %error, "Not a locator"),
    }
    text.to_string()
}

/// Read locator code without checking that it renders back.
///
/// # Errors
///
/// Returns [`LocatorParseError`] when `text` does not tokenize, does not
/// parse as a call chain, or uses calls or options with no selector
/// equivalent.
pub fn parse_locator(text: &str, test_id_attribute: &str) -> Result<ParsedLocator, LocatorParseError> {
    let tokens = LocatorTokenizer::new(text).run()?;
    let preferred_quote = tokens.iter().find_map(|token| match token {
        LocatorToken::Str { quote, .. } => Some(*quote),
        _ => None,
    });
    let mut parser = LocatorParser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    let selector = Interpreter { test_id_attribute }.chain(&expr)?;
    Ok(ParsedLocator {
        selector,
        preferred_quote,
    })
}

/// Whitespace never matters; in JavaScript neither does the quote style.
fn digest_for_comparison(language: Language, locator: &str) -> String {
    let mut digest: String = locator.chars().filter(|c| !c.is_whitespace()).collect();
    if language == Language::JavaScript {
        digest = digest
            .replace("\\\"", "'")
            .replace("\\`", "'")
            .replace(['"', '`'], "'");
    }
    digest
}

// ========== tokenizer ==========

#[derive(Debug, Clone, PartialEq)]
enum LocatorToken {
    Ident(String),
    /// A string literal; raw strings have already been unescaped by their own
    /// rules.
    Str {
        value: String,
        quote: char,
    },
    Regex {
        source: String,
        flags: String,
    },
    Number(String),
    Punct(char),
    Eof,
}

impl LocatorToken {
    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier {name}"),
            Self::Str { value, .. } => format!("string {value:?}"),
            Self::Regex { source, flags } => format!("pattern /{source}/{flags}"),
            Self::Number(n) => format!("number {n}"),
            Self::Punct(c) => format!("{c:?}"),
            Self::Eof => "end of input".to_string(),
        }
    }
}

struct LocatorTokenizer {
    input: Vec<char>,
    position: usize,
    tokens: Vec<LocatorToken>,
}

impl LocatorTokenizer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<LocatorToken>, LocatorParseError> {
        loop {
            let token = self.consume_token()?;
            let is_eof = token == LocatorToken::Eof;
            self.tokens.push(token);
            if is_eof {
                return Ok(self.tokens);
            }
        }
    }

    fn consume_token(&mut self) -> Result<LocatorToken, LocatorParseError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
        let start = self.position;
        let Some(c) = self.consume() else {
            return Ok(LocatorToken::Eof);
        };
        match c {
            '\'' | '"' | '`' => {
                let value = self.consume_string(c, start)?;
                Ok(LocatorToken::Str { value, quote: c })
            }
            '/' => {
                let source = self.consume_raw(c, start)?;
                let mut flags = String::new();
                while let Some(flag) = self.peek().filter(char::is_ascii_alphabetic) {
                    flags.push(flag);
                    self.position += 1;
                }
                Ok(LocatorToken::Regex { source, flags })
            }
            // Python raw string: escapes stay as written.
            'r' if matches!(self.peek(), Some('"' | '\'')) => {
                let quote = self.consume().unwrap_or('"');
                let value = self.consume_raw(quote, start)?;
                Ok(LocatorToken::Str { value, quote })
            }
            c if c.is_ascii_digit()
                || (c == '-' && self.peek().is_some_and(|next| next.is_ascii_digit())) =>
            {
                let mut number = String::from(c);
                while let Some(d) = self.peek().filter(|d| d.is_ascii_digit() || *d == '.') {
                    number.push(d);
                    self.position += 1;
                }
                Ok(LocatorToken::Number(number))
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::from(c);
                while let Some(d) = self
                    .peek()
                    .filter(|d| d.is_alphanumeric() || *d == '_' || *d == '$')
                {
                    ident.push(d);
                    self.position += 1;
                }
                Ok(LocatorToken::Ident(ident))
            }
            '.' | ',' | '(' | ')' | '{' | '}' | '=' | ':' => Ok(LocatorToken::Punct(c)),
            character => Err(LocatorParseError::UnexpectedCharacter {
                character,
                position: start,
            }),
        }
    }

    /// A string with the usual backslash escapes.
    fn consume_string(&mut self, quote: char, start: usize) -> Result<String, LocatorParseError> {
        let mut value = String::new();
        loop {
            match self.consume() {
                None => return Err(LocatorParseError::UnterminatedLiteral(start)),
                Some('\\') => match self.consume() {
                    None => return Err(LocatorParseError::UnterminatedLiteral(start)),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some(escaped) => value.push(escaped),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    /// A pattern literal or raw string: backslashes are kept, except before
    /// a quote in a raw string.
    fn consume_raw(&mut self, quote: char, start: usize) -> Result<String, LocatorParseError> {
        let mut value = String::new();
        loop {
            match self.consume() {
                None => return Err(LocatorParseError::UnterminatedLiteral(start)),
                Some('\\') => {
                    let Some(escaped) = self.consume() else {
                        return Err(LocatorParseError::UnterminatedLiteral(start));
                    };
                    if escaped != quote || quote == '/' {
                        value.push('\\');
                    }
                    value.push(escaped);
                }
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }
}

// ========== parser ==========

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Str(String),
    Regex { source: String, flags: String },
    Number(String),
    Ident(String),
    Member { object: Box<Expr>, property: String },
    Call { callee: Box<Expr>, args: Vec<Arg> },
    /// `new Path.Class(args)` or C#'s `new() { Key = value }`.
    New {
        class: Vec<String>,
        args: Vec<Arg>,
        init: Vec<(String, Expr)>,
    },
    /// `{ key: value }`
    Object(Vec<(String, Expr)>),
}

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Positional(Expr),
    /// Python keyword argument.
    Named(String, Expr),
}

struct LocatorParser {
    tokens: Vec<LocatorToken>,
    pos: usize,
}

impl LocatorParser {
    fn current(&self) -> &LocatorToken {
        self.tokens.get(self.pos).unwrap_or(&LocatorToken::Eof)
    }

    fn peek_at(&self, offset: usize) -> &LocatorToken {
        self.tokens.get(self.pos + offset).unwrap_or(&LocatorToken::Eof)
    }

    fn advance(&mut self) -> LocatorToken {
        let token = self.current().clone();
        self.pos += 1;
        token
    }

    fn is_punct(&self, c: char) -> bool {
        *self.current() == LocatorToken::Punct(c)
    }

    fn expect_punct(&mut self, c: char, expected: &'static str) -> Result<(), LocatorParseError> {
        if self.is_punct(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, LocatorParseError> {
        match self.advance() {
            LocatorToken::Ident(name) => Ok(name),
            other => Err(LocatorParseError::UnexpectedToken {
                expected,
                found: other.describe(),
            }),
        }
    }

    fn expect_eof(&self) -> Result<(), LocatorParseError> {
        if *self.current() == LocatorToken::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn unexpected(&self, expected: &'static str) -> LocatorParseError {
        LocatorParseError::UnexpectedToken {
            expected,
            found: self.current().describe(),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, LocatorParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.is_punct('.') {
                self.pos += 1;
                let property = self.expect_ident("a method name")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.is_punct('(') {
                let args = self.parse_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, LocatorParseError> {
        match self.advance() {
            LocatorToken::Str { value, .. } => Ok(Expr::Str(value)),
            LocatorToken::Regex { source, flags } => Ok(Expr::Regex { source, flags }),
            LocatorToken::Number(n) => Ok(Expr::Number(n)),
            LocatorToken::Punct('{') => Ok(Expr::Object(self.parse_entries()?)),
            LocatorToken::Ident(name) if name == "new" => self.parse_new(),
            LocatorToken::Ident(name) => Ok(Expr::Ident(name)),
            other => Err(LocatorParseError::UnexpectedToken {
                expected: "an expression",
                found: other.describe(),
            }),
        }
    }

    fn parse_new(&mut self) -> Result<Expr, LocatorParseError> {
        let mut class = Vec::new();
        if let LocatorToken::Ident(_) = self.current() {
            class.push(self.expect_ident("a class name")?);
            while self.is_punct('.') {
                self.pos += 1;
                class.push(self.expect_ident("a class name")?);
            }
        }
        let args = self.parse_args()?;
        let init = if self.is_punct('{') {
            self.pos += 1;
            self.parse_entries()?
        } else {
            Vec::new()
        };
        Ok(Expr::New { class, args, init })
    }

    /// `( arg, ... )`, starting at the opening parenthesis.
    fn parse_args(&mut self) -> Result<Vec<Arg>, LocatorParseError> {
        self.expect_punct('(', "'('")?;
        let mut args = Vec::new();
        while !self.is_punct(')') {
            let named = matches!(self.current(), LocatorToken::Ident(_))
                && *self.peek_at(1) == LocatorToken::Punct('=');
            if named {
                let name = self.expect_ident("an argument name")?;
                self.pos += 1;
                args.push(Arg::Named(name, self.parse_expr()?));
            } else {
                args.push(Arg::Positional(self.parse_expr()?));
            }
            if !self.is_punct(',') {
                break;
            }
            self.pos += 1;
        }
        self.expect_punct(')', "')'")?;
        Ok(args)
    }

    /// `key: value, Key = value, ... }`, after the opening brace.
    fn parse_entries(&mut self) -> Result<Vec<(String, Expr)>, LocatorParseError> {
        let mut entries = Vec::new();
        while !self.is_punct('}') {
            let key = self.expect_ident("an option name")?;
            if self.is_punct(':') || self.is_punct('=') {
                self.pos += 1;
            } else {
                return Err(self.unexpected("':' or '='"));
            }
            entries.push((key, self.parse_expr()?));
            if !self.is_punct(',') {
                break;
            }
            self.pos += 1;
        }
        self.expect_punct('}', "'}'")?;
        Ok(entries)
    }
}

// ========== interpreter ==========

/// One call of a chain. `args` is `None` for property access such as
/// Python's `.first`.
struct Step<'e> {
    name: String,
    args: Option<&'e [Arg]>,
}

/// `getByRole` → `getbyrole`, `get_by_role` → `getbyrole`.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn flatten<'e>(expr: &'e Expr, steps: &mut Vec<Step<'e>>) -> Result<(), LocatorParseError> {
    match expr {
        Expr::Ident(name) => steps.push(Step {
            name: normalize_name(name),
            args: None,
        }),
        Expr::Member { object, property } => {
            flatten(object, steps)?;
            steps.push(Step {
                name: normalize_name(property),
                args: None,
            });
        }
        Expr::Call { callee, args } => {
            flatten(callee, steps)?;
            if let Some(last) = steps.last_mut()
                && last.args.is_none()
            {
                last.args = Some(args.as_slice());
            } else {
                return Err(LocatorParseError::UnsupportedArguments("a call result".to_string()));
            }
        }
        _ => {
            return Err(LocatorParseError::UnexpectedToken {
                expected: "a locator call",
                found: format!("{expr:?}"),
            });
        }
    }
    Ok(())
}

struct Interpreter<'a> {
    test_id_attribute: &'a str,
}

impl Interpreter<'_> {
    /// The selector a whole call chain stands for.
    fn chain(&self, expr: &Expr) -> Result<String, LocatorParseError> {
        let mut steps = Vec::new();
        flatten(expr, &mut steps)?;
        let mut parts: Vec<String> = Vec::new();
        for step in &steps {
            self.step(step, &mut parts)?;
        }
        // A frame locator's `nth` goes before the frame entry in selectors.
        for index in 0..parts.len().saturating_sub(1) {
            if parts[index] == "internal:control=enter-frame" && parts[index + 1].starts_with("nth=") {
                parts.swap(index, index + 1);
            }
        }
        Ok(parts.join(" >> "))
    }

    fn step(&self, step: &Step<'_>, parts: &mut Vec<String>) -> Result<(), LocatorParseError> {
        let name = step.name.as_str();
        let unsupported = || LocatorParseError::UnsupportedArguments(name.to_string());
        match (name, step.args) {
            ("first", None | Some([])) => parts.push("nth=0".to_string()),
            ("last", None | Some([])) => parts.push("nth=-1".to_string()),
            ("nth", Some([Arg::Positional(Expr::Number(n))])) => parts.push(format!("nth={n}")),
            ("locator", Some([Arg::Positional(body), rest @ ..])) => {
                match body {
                    Expr::Str(selector) => parts.push(selector.clone()),
                    inner => parts.push(format!("internal:chain={}", json_quote(&self.chain(inner)?))),
                }
                self.filters(name, rest, parts)?;
            }
            ("framelocator", Some([Arg::Positional(Expr::Str(selector))])) => {
                parts.push(selector.clone());
                parts.push("internal:control=enter-frame".to_string());
            }
            ("filter", Some(args)) => self.filters(name, args, parts)?,
            ("and" | "or", Some([Arg::Positional(inner)])) => {
                parts.push(format!("internal:{name}={}", json_quote(&self.chain(inner)?)));
            }
            ("getbyrole", Some([Arg::Positional(role), rest @ ..])) => {
                let role = match role {
                    Expr::Str(role) => role.to_lowercase(),
                    // `AriaRole.BUTTON`, `AriaRole.Button`
                    Expr::Member { property, .. } => normalize_name(property),
                    _ => return Err(unsupported()),
                };
                let options = role_options(name, rest)?;
                parts.push(get_by_role_selector(&role, &options));
            }
            (
                "getbytext" | "getbylabel" | "getbyplaceholder" | "getbyalttext" | "getbytitle",
                Some([Arg::Positional(body), rest @ ..]),
            ) => {
                let text = text_or_regex(body).ok_or_else(unsupported)?;
                let mut exact = false;
                for (key, value) in options(rest).ok_or_else(unsupported)? {
                    match key.as_str() {
                        "exact" => exact = boolean(value).ok_or_else(unsupported)?,
                        _ => return Err(unsupported()),
                    }
                }
                parts.push(match name {
                    "getbytext" => get_by_text_selector(&text, exact),
                    "getbylabel" => get_by_label_selector(&text, exact),
                    "getbyplaceholder" => get_by_placeholder_selector(&text, exact),
                    "getbyalttext" => get_by_alt_text_selector(&text, exact),
                    _ => get_by_title_selector(&text, exact),
                });
            }
            ("getbytestid", Some([Arg::Positional(body)])) => {
                let test_id = text_or_regex(body).ok_or_else(unsupported)?;
                parts.push(get_by_test_id_selector(self.test_id_attribute, &test_id));
            }
            ("first" | "last" | "nth" | "locator" | "framelocator" | "filter" | "and" | "or", _)
            | ("getbyrole" | "getbytext" | "getbylabel" | "getbyplaceholder", _)
            | ("getbyalttext" | "getbytitle" | "getbytestid", _) => return Err(unsupported()),
            _ => return Err(LocatorParseError::UnsupportedMethod(name.to_string())),
        }
        Ok(())
    }

    /// `hasText`, `hasNotText`, `has` and `hasNot`, as on `filter()` and the
    /// options of `locator()`.
    fn filters(&self, method: &str, args: &[Arg], parts: &mut Vec<String>) -> Result<(), LocatorParseError> {
        let unsupported = || LocatorParseError::UnsupportedArguments(method.to_string());
        for (key, value) in options(args).ok_or_else(unsupported)? {
            match key.as_str() {
                "hastext" | "hasnottext" => {
                    let text = text_or_regex(value).ok_or_else(unsupported)?;
                    let engine = if key == "hastext" {
                        "has-text"
                    } else {
                        "has-not-text"
                    };
                    parts.push(format!(
                        "internal:{engine}={}",
                        escape_for_text_selector(&text, false)
                    ));
                }
                "has" | "hasnot" => {
                    let engine = if key == "has" { "has" } else { "has-not" };
                    parts.push(format!("internal:{engine}={}", json_quote(&self.chain(value)?)));
                }
                _ => return Err(unsupported()),
            }
        }
        Ok(())
    }
}

fn role_options(method: &str, args: &[Arg]) -> Result<ByRoleOptions, LocatorParseError> {
    let unsupported = || LocatorParseError::UnsupportedArguments(method.to_string());
    let mut options_out = ByRoleOptions::default();
    for (key, value) in options(args).ok_or_else(unsupported)? {
        let flag = || boolean(value).ok_or_else(unsupported);
        match key.as_str() {
            "checked" => options_out.checked = Some(role_state(value).ok_or_else(unsupported)?),
            "disabled" => options_out.disabled = Some(flag()?),
            "selected" => options_out.selected = Some(flag()?),
            "expanded" => options_out.expanded = Some(flag()?),
            "includehidden" => options_out.include_hidden = Some(flag()?),
            "pressed" => options_out.pressed = Some(role_state(value).ok_or_else(unsupported)?),
            "exact" => options_out.exact = flag()?,
            "level" => {
                options_out.level = Some(match value {
                    Expr::Number(n) => n.parse().map_err(|_| unsupported())?,
                    _ => return Err(unsupported()),
                });
            }
            "name" => options_out.name = Some(text_or_regex(value).ok_or_else(unsupported)?),
            _ => return Err(unsupported()),
        }
    }
    Ok(options_out)
}

/// A string, or a pattern in any language's spelling.
fn text_or_regex(expr: &Expr) -> Option<TextOrRegex> {
    match expr {
        Expr::Str(text) => Some(TextOrRegex::Text(text.clone())),
        Expr::Regex { source, flags } => JsRegex::new(source, flags).ok().map(TextOrRegex::Regex),
        // re.compile(r"...", re.IGNORECASE), Pattern.compile("...", Pattern.CASE_INSENSITIVE)
        Expr::Call { callee, args } => match callee.as_ref() {
            Expr::Member { object, property } if property == "compile" => {
                match object.as_ref() {
                    Expr::Ident(module) if module == "re" || module == "Pattern" => {
                        compiled_pattern(args)
                    }
                    _ => None,
                }
            }
            _ => None,
        },
        // new Regex("...", RegexOptions.IgnoreCase)
        Expr::New { class, args, init } if class.as_slice() == ["Regex"] && init.is_empty() => {
            compiled_pattern(args)
        }
        _ => None,
    }
}

/// `(source)` or `(source, <ignore case flag>)`.
fn compiled_pattern(args: &[Arg]) -> Option<TextOrRegex> {
    let (source, flags) = match args {
        [Arg::Positional(Expr::Str(source))] => (source, ""),
        [Arg::Positional(Expr::Str(source)), Arg::Positional(Expr::Member { property, .. })]
            if matches!(property.as_str(), "IGNORECASE" | "CASE_INSENSITIVE" | "IgnoreCase") =>
        {
            (source, "i")
        }
        _ => return None,
    };
    JsRegex::new(source, flags).ok().map(TextOrRegex::Regex)
}

/// `true`, `false` or the string `"mixed"`.
fn role_state(expr: &Expr) -> Option<RoleState> {
    match expr {
        Expr::Str(value) if value == "mixed" => Some(RoleState::Mixed),
        other => boolean(other).map(RoleState::from),
    }
}

fn boolean(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Ident(value) => match value.as_str() {
            "true" | "True" => Some(true),
            "false" | "False" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Options as normalized `(name, value)` pairs, from JavaScript objects,
/// Python keyword arguments, Java option builders and C# initializers.
fn options(args: &[Arg]) -> Option<Vec<(String, &Expr)>> {
    let mut entries = Vec::new();
    for arg in args {
        match arg {
            Arg::Named(key, value) => entries.push((normalize_option(key), value)),
            Arg::Positional(Expr::Object(object)) => {
                entries.extend(object.iter().map(|(key, value)| (normalize_option(key), value)));
            }
            Arg::Positional(Expr::New { class, args, init })
                if args.is_empty() && class.last().is_none_or(|c| c.ends_with("Options")) =>
            {
                entries.extend(init.iter().map(|(key, value)| (normalize_option(key), value)));
            }
            Arg::Positional(expr) => entries.extend(java_options(expr)?),
        }
    }
    Some(entries)
}

/// `new Page.GetByRoleOptions().setName("OK").setExact(true)`
fn java_options(expr: &Expr) -> Option<Vec<(String, &Expr)>> {
    match expr {
        Expr::New { class, args, init }
            if args.is_empty()
                && init.is_empty()
                && class.last().is_some_and(|c| c.ends_with("Options")) =>
        {
            Some(Vec::new())
        }
        Expr::Call { callee, args } => match (callee.as_ref(), args.as_slice()) {
            (Expr::Member { object, property }, [Arg::Positional(value)]) => {
                let key = property.strip_prefix("set")?;
                let mut entries = java_options(object)?;
                entries.push((normalize_option(key), value));
                Some(entries)
            }
            _ => None,
        },
        _ => None,
    }
}

/// `has_text`, `hasText`, `HasText` and `HasTextRegex` are all `hastext`.
fn normalize_option(key: &str) -> String {
    let name = normalize_name(key);
    match name.strip_suffix("regex") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(text: &str) -> String {
        parse_locator(text, "data-testid").map(|parsed| parsed.selector).unwrap_or_default()
    }

    #[test]
    fn test_javascript_role() {
        assert_eq!(
            selector("getByRole('button', { name: 'Submit', exact: true })"),
            "internal:role=button[name=\"Submit\"s]"
        );
    }

    #[test]
    fn test_python_keywords_and_raw_regex() {
        assert_eq!(
            selector(r#"get_by_text(re.compile(r"^sign\s+in", re.IGNORECASE)).first"#),
            r"internal:text=/^sign\s+in/i >> nth=0"
        );
    }

    #[test]
    fn test_java_option_builders() {
        assert_eq!(
            selector(
                "getByRole(AriaRole.HEADING, new Page.GetByRoleOptions().setName(\"Title\").setLevel(2))"
            ),
            "internal:role=heading[level=2][name=\"Title\"i]"
        );
    }

    #[test]
    fn test_csharp_initializers() {
        assert_eq!(
            selector("Locator(\"li\").Filter(new() { HasText = \"Milk\" }).Last"),
            "li >> internal:has-text=\"Milk\"i >> nth=-1"
        );
    }

    #[test]
    fn test_nested_has() {
        assert_eq!(
            selector("locator('article').filter({ has: getByText('Sale') })"),
            "article >> internal:has=\"internal:text=\\\"Sale\\\"i\""
        );
    }

    #[test]
    fn test_frame_nth_moves_before_frame_entry() {
        assert_eq!(
            selector("frameLocator('iframe').first().getByTestId('save')"),
            "iframe >> nth=0 >> internal:control=enter-frame >> internal:testid=[data-testid=\"save\"s]"
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_locator("getByText('open", "data-testid"),
            Err(LocatorParseError::UnterminatedLiteral(10))
        ));
        assert!(matches!(
            parse_locator("click()", "data-testid"),
            Err(LocatorParseError::UnsupportedMethod(name)) if name == "click"
        ));
    }

    #[test]
    fn test_round_trip_rejects_other_language() {
        let python = "get_by_text(\"Hi\")";
        assert_eq!(
            locator_or_selector_as_selector(Language::Python, python, "data-testid"),
            "internal:text=\"Hi\"i"
        );
        assert_eq!(
            locator_or_selector_as_selector(Language::JavaScript, python, "data-testid"),
            python
        );
    }

    #[test]
    fn test_selector_input_is_returned_unchanged() {
        assert_eq!(
            locator_or_selector_as_selector(Language::JavaScript, "div >> nth=1", "data-testid"),
            "div >> nth=1"
        );
    }
}
