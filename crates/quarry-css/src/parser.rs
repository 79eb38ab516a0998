//! Selector-subset parser.
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! "The grammar of Selectors is defined in terms of CSS syntax."
//!
//! Only the shape of a selector list is parsed here: complex selectors, their
//! combinators, and a fixed set of custom pseudo-functions that selector
//! engines evaluate themselves. Everything else inside a compound selector
//! (`div.item[data-x="1"]:first-child`) is kept as CSS source text and handed
//! to [`crate::matcher::CompoundSelector`] later.

use core::fmt;

use crate::error::CssParseError;
use crate::tokenizer::{CSSToken, escape_string, tokenize};

/// Pseudo-classes that selector engines implement on top of plain CSS.
pub const CUSTOM_CSS_NAMES: &[&str] = &[
    "not",
    "is",
    "where",
    "has",
    "scope",
    "light",
    "visible",
    "text",
    "text-matches",
    "text-is",
    "has-text",
    "above",
    "below",
    "right-of",
    "left-of",
    "near",
    "nth-match",
];

/// An argument of a custom pseudo-function.
#[derive(Debug, Clone, PartialEq)]
pub enum CssFunctionArgument {
    /// A nested complex selector, as in `:has(> .item)`.
    Selector(CssComplexSelector),
    /// A string token, as in `:text("Hello")`.
    String(String),
    /// A number token, as in `:nth-match(li, 2)`.
    Number(f64),
}

/// A custom pseudo-function such as `:has-text("x")`.
///
/// Pseudo-classes without arguments (`:visible`, `:scope`) have empty `args`.
#[derive(Debug, Clone, PartialEq)]
pub struct CssFunction {
    /// Lowercased name, without the colon.
    pub name: String,
    /// Comma-separated arguments.
    pub args: Vec<CssFunctionArgument>,
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
///
/// Split into the plain CSS part and the custom functions that were lifted
/// out of it. At least one of the two is present.
#[derive(Debug, Clone, PartialEq)]
pub struct CssSimpleSelector {
    /// Plain CSS source for the rest of the compound.
    pub css: Option<String>,
    /// Custom pseudo-functions, in source order.
    pub functions: Vec<CssFunction>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// The combinator that links a compound selector to the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClauseCombinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// Also used for the last compound, which has nothing after it.
    #[default]
    Descendant,
    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators) `>`
    Child,
    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `+`
    NextSibling,
    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `~`
    SubsequentSibling,
}

impl ClauseCombinator {
    const fn from_delim(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }

    /// Source text of the combinator; empty for descendant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => "",
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::SubsequentSibling => "~",
        }
    }
}

/// One compound selector of a complex selector and the combinator after it.
#[derive(Debug, Clone, PartialEq)]
pub struct CssComplexSelectorPart {
    /// The compound selector.
    pub selector: CssSimpleSelector,
    /// How it relates to the next part.
    pub combinator: ClauseCombinator,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors
/// separated by combinators."
#[derive(Debug, Clone, PartialEq)]
pub struct CssComplexSelector {
    /// Compounds from left to right.
    pub simples: Vec<CssComplexSelectorPart>,
}

/// [§ 4.4 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// "A selector list is a comma-separated list of selectors."
pub type CssComplexSelectorList = Vec<CssComplexSelector>;

/// Result of [`parse_css`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCss {
    /// The parsed selector list.
    pub selector: CssComplexSelectorList,
    /// Custom function names that occur anywhere in the selector, deduplicated.
    pub names: Vec<String>,
}

/// Parse a selector list, lifting the pseudo-classes named in `custom_names`
/// into [`CssFunction`] nodes.
///
/// # Errors
///
/// Returns [`CssParseError`] for tokens outside the selector grammar, for
/// tokens in the wrong place, and when the top level is not a selector.
pub fn parse_css(selector: &str, custom_names: &[&str]) -> Result<ParsedCss, CssParseError> {
    let mut tokens = tokenize(selector).map_err(|source| CssParseError::Lex {
        source,
        selector: selector.to_string(),
    })?;
    if !tokens.last().is_some_and(CSSToken::is_eof) {
        tokens.push(CSSToken::EOF);
    }

    if let Some(token) = tokens.iter().find(|t| is_unsupported(t)) {
        return Err(CssParseError::UnsupportedToken {
            token: token.to_source(),
            selector: selector.to_string(),
        });
    }

    let mut parser = CssParser {
        tokens: &tokens,
        pos: 0,
        selector,
        custom_names,
        names: Vec::new(),
    };
    let args = parser.consume_function_arguments()?;
    if !parser.is_eof() {
        return Err(parser.unexpected());
    }

    let mut list = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            CssFunctionArgument::Selector(complex) => list.push(complex),
            CssFunctionArgument::String(_) | CssFunctionArgument::Number(_) => {
                return Err(CssParseError::InvalidSelector {
                    selector: selector.to_string(),
                });
            }
        }
    }
    Ok(ParsedCss {
        selector: list,
        names: parser.names,
    })
}

/// Tokens that never appear in a selector.
const fn is_unsupported(token: &CSSToken) -> bool {
    matches!(
        token,
        CSSToken::AtKeyword(_)
            | CSSToken::BadString
            | CSSToken::BadUrl
            | CSSToken::Column
            | CSSToken::CDO
            | CSSToken::CDC
            | CSSToken::Semicolon
            | CSSToken::LeftBrace
            | CSSToken::RightBrace
            | CSSToken::Url(_)
            | CSSToken::Percentage { .. }
    )
}

static EOF_TOKEN: CSSToken = CSSToken::EOF;

struct CssParser<'a> {
    tokens: &'a [CSSToken],
    pos: usize,
    selector: &'a str,
    custom_names: &'a [&'a str],
    names: Vec<String>,
}

impl CssParser<'_> {
    fn current(&self) -> &CSSToken {
        self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
    }

    fn advance(&mut self) -> CSSToken {
        let token = self.current().clone();
        self.pos += 1;
        token
    }

    fn unexpected(&self) -> CssParseError {
        CssParseError::UnexpectedToken {
            token: self.current().to_source(),
            selector: self.selector.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_whitespace() {
            self.pos += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.current().is_eof()
    }

    fn clause_combinator(&self) -> Option<ClauseCombinator> {
        match self.current() {
            CSSToken::Delim(c) => ClauseCombinator::from_delim(*c),
            _ => None,
        }
    }

    fn is_selector_clause_end(&self) -> bool {
        matches!(
            self.current(),
            CSSToken::Comma | CSSToken::RightParen | CSSToken::EOF | CSSToken::Whitespace
        ) || self.clause_combinator().is_some()
    }

    fn is_custom(&self, name: &str) -> bool {
        self.custom_names.contains(&name)
    }

    fn record_name(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    fn consume_function_arguments(&mut self) -> Result<Vec<CssFunctionArgument>, CssParseError> {
        let mut result = vec![self.consume_argument()?];
        loop {
            self.skip_whitespace();
            if *self.current() != CSSToken::Comma {
                break;
            }
            self.pos += 1;
            result.push(self.consume_argument()?);
        }
        Ok(result)
    }

    fn consume_argument(&mut self) -> Result<CssFunctionArgument, CssParseError> {
        self.skip_whitespace();
        match self.current() {
            CSSToken::Number { value, .. } => {
                let value = *value;
                self.pos += 1;
                Ok(CssFunctionArgument::Number(value))
            }
            CSSToken::String(value) => {
                let value = value.clone();
                self.pos += 1;
                Ok(CssFunctionArgument::String(value))
            }
            _ => Ok(CssFunctionArgument::Selector(self.consume_complex_selector()?)),
        }
    }

    fn consume_complex_selector(&mut self) -> Result<CssComplexSelector, CssParseError> {
        let mut simples = Vec::new();
        self.skip_whitespace();
        if self.clause_combinator().is_some() {
            // [§ 3.6.1 Absolutizing a Relative Selector](https://drafts.csswg.org/selectors-4/#absolutize)
            // "If the selector starts with a combinator other than the descendant
            // combinator, prepend :scope as the initial compound selector."
            simples.push(CssComplexSelectorPart {
                selector: CssSimpleSelector {
                    css: None,
                    functions: vec![CssFunction {
                        name: "scope".to_string(),
                        args: Vec::new(),
                    }],
                },
                combinator: ClauseCombinator::Descendant,
            });
        } else {
            simples.push(CssComplexSelectorPart {
                selector: self.consume_simple_selector()?,
                combinator: ClauseCombinator::Descendant,
            });
        }
        loop {
            self.skip_whitespace();
            if let Some(combinator) = self.clause_combinator() {
                if let Some(last) = simples.last_mut() {
                    last.combinator = combinator;
                }
                self.pos += 1;
                self.skip_whitespace();
            } else if self.is_selector_clause_end() {
                break;
            }
            simples.push(CssComplexSelectorPart {
                selector: self.consume_simple_selector()?,
                combinator: ClauseCombinator::Descendant,
            });
        }
        Ok(CssComplexSelector { simples })
    }

    fn consume_simple_selector(&mut self) -> Result<CssSimpleSelector, CssParseError> {
        let mut raw = String::new();
        let mut functions = Vec::new();

        while !self.is_selector_clause_end() {
            match self.current() {
                CSSToken::Ident(_) | CSSToken::Hash { .. } | CSSToken::Delim('*') => {
                    raw.push_str(&self.advance().to_source());
                }
                CSSToken::Delim('.') => {
                    self.pos += 1;
                    if !matches!(self.current(), CSSToken::Ident(_)) {
                        return Err(self.unexpected());
                    }
                    raw.push('.');
                    raw.push_str(&self.advance().to_source());
                }
                CSSToken::Colon => {
                    self.pos += 1;
                    match self.current().clone() {
                        CSSToken::Ident(ident) => {
                            let name = ident.to_lowercase();
                            if self.is_custom(&name) {
                                self.pos += 1;
                                self.record_name(&name);
                                functions.push(CssFunction {
                                    name,
                                    args: Vec::new(),
                                });
                            } else {
                                raw.push(':');
                                raw.push_str(&self.advance().to_source());
                            }
                        }
                        CSSToken::Function(function) => {
                            self.pos += 1;
                            let name = function.to_lowercase();
                            if self.is_custom(&name) {
                                let args = self.consume_function_arguments()?;
                                self.record_name(&name);
                                functions.push(CssFunction { name, args });
                            } else {
                                let args = self.consume_builtin_function_arguments();
                                raw.push_str(&format!(":{name}({args})"));
                            }
                            self.skip_whitespace();
                            if *self.current() != CSSToken::RightParen {
                                return Err(self.unexpected());
                            }
                            self.pos += 1;
                        }
                        _ => return Err(self.unexpected()),
                    }
                }
                CSSToken::LeftBracket => {
                    raw.push('[');
                    self.pos += 1;
                    while !matches!(self.current(), CSSToken::RightBracket | CSSToken::EOF) {
                        raw.push_str(&self.advance().to_source());
                    }
                    if *self.current() != CSSToken::RightBracket {
                        return Err(self.unexpected());
                    }
                    raw.push(']');
                    self.pos += 1;
                }
                _ => return Err(self.unexpected()),
            }
        }

        if raw.is_empty() && functions.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CssSimpleSelector {
            css: (!raw.is_empty()).then_some(raw),
            functions,
        })
    }

    /// Source of a built-in function's arguments up to (not including) the
    /// matching `)`. The opening parenthesis is part of the function token.
    fn consume_builtin_function_arguments(&mut self) -> String {
        let mut source = String::new();
        let mut balance = 1usize;
        while !self.is_eof() {
            match self.current() {
                CSSToken::LeftParen | CSSToken::Function(_) => balance += 1,
                CSSToken::RightParen => balance -= 1,
                _ => {}
            }
            if balance == 0 {
                break;
            }
            source.push_str(&self.advance().to_source());
        }
        source
    }
}

/// Serialize function arguments back to selector text.
///
/// Strings are serialized as escaped double-quoted strings, numbers use their
/// shortest form, and nested selectors join their compounds with spaces.
#[must_use]
pub fn serialize_selector(args: &[CssFunctionArgument]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for CssFunctionArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Self::Number(n) => write!(f, "{n}"),
            Self::Selector(complex) => write!(f, "{complex}"),
        }
    }
}

impl fmt::Display for CssSimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(css) = &self.css {
            f.write_str(css)?;
        }
        for function in &self.functions {
            write!(f, ":{}({})", function.name, serialize_selector(&function.args))?;
        }
        Ok(())
    }
}

impl fmt::Display for CssComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.simples.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", part.selector)?;
            if part.combinator != ClauseCombinator::Descendant {
                write!(f, " {}", part.combinator.as_str())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_function_arguments_kept_raw() {
        let parsed = parse_css("li:nth-child(2n+1)", CUSTOM_CSS_NAMES).unwrap();
        let simple = &parsed.selector[0].simples[0].selector;
        assert_eq!(simple.css.as_deref(), Some("li:nth-child(2n+1)"));
        assert!(simple.functions.is_empty());
    }

    #[test]
    fn test_nested_builtin_parens_balance() {
        let parsed = parse_css("div:foo(a(b)c)", CUSTOM_CSS_NAMES).unwrap();
        assert_eq!(
            parsed.selector[0].simples[0].selector.css.as_deref(),
            Some("div:foo(a(b)c)")
        );
    }
}
