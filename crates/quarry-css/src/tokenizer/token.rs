//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: `<ident-token>`, `<function-token>`, `<at-keyword-token>`,
//! `<hash-token>`, `<string-token>`, `<bad-string-token>`, `<url-token>`,
//! `<bad-url-token>`, `<delim-token>`, `<number-token>`, `<percentage-token>`,
//! `<dimension-token>`, `<unicode-range-token>`, `<whitespace-token>`,
//! `<CDO-token>`, `<CDC-token>`, `<colon-token>`, `<semicolon-token>`,
//! `<comma-token>`, `<[-token>`, `<]-token>`, `<(-token>`, `<)-token>`, `<{-token>`,
//! and `<}-token>`."
//!
//! Selectors also need the attribute-matcher tokens from
//! [CSS Syntax Level 2](https://www.w3.org/TR/2014/CR-css-syntax-3-20140220/#tokenization)
//! (`~=`, `|=`, `^=`, `$=`, `*=`) and the column token `||`.
//!
//! Every token renders back to CSS source through its [`Display`](fmt::Display)
//! implementation, see [`CSSToken::to_source`].

use core::fmt;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<hash-token>` with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// "id" - the hash token's value is a valid identifier
    Id,
    /// "unrestricted" - the hash token's value is not a valid identifier
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<number-token>` has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// "integer" - the number is an integer
    Integer,
    /// "number" - the number has a decimal point or exponent
    Number,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// CSS tokens as defined by the CSS Syntax Module Level 3 specification.
/// Each variant corresponds to a token type in the spec's railroad diagrams.
///
/// Numeric tokens keep the exact text they were read from (`repr`) so that
/// `1.50` renders back as `1.50` rather than `1.5`.
#[derive(Debug, Clone, PartialEq)]
pub enum CSSToken {
    /// "`<ident-token>`"
    /// "has a value composed of one or more code points"
    Ident(String),

    /// "`<function-token>`"
    /// "has a value composed of one or more code points, followed by U+0028 LEFT PARENTHESIS"
    Function(String),

    /// "`<at-keyword-token>`"
    /// "has a value composed of one or more code points, preceded by U+0040 COMMERCIAL AT (@)"
    AtKeyword(String),

    /// "`<hash-token>`"
    /// "has a value composed of one or more code points, preceded by U+0023 NUMBER SIGN (#)"
    /// "has a type flag set to either 'id' or 'unrestricted'"
    Hash {
        /// "a value composed of one or more code points"
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },

    /// "`<string-token>`"
    /// "has a value composed of zero or more code points"
    String(String),

    /// "`<bad-string-token>`"
    /// "represents a parsing error"
    BadString,

    /// "`<url-token>`"
    /// "has a value composed of zero or more code points"
    Url(String),

    /// "`<bad-url-token>`"
    /// "represents a parsing error"
    BadUrl,

    /// "`<delim-token>`"
    /// "has a value composed of a single code point"
    Delim(char),

    /// "`<number-token>`"
    /// "has a numeric value, and a type flag set to either 'integer' or 'number'"
    Number {
        /// "a numeric value"
        value: f64,
        /// "a type flag set to either 'integer' or 'number'"
        numeric_type: NumericType,
        /// Source text of the number.
        repr: String,
    },

    /// "`<percentage-token>`"
    /// "has a numeric value"
    Percentage {
        /// "a numeric value"
        value: f64,
        /// Source text of the number, without the `%`.
        repr: String,
    },

    /// "`<dimension-token>`"
    /// "has a numeric value, a type flag, and a unit"
    Dimension {
        /// "a numeric value"
        value: f64,
        /// "a type flag set to either 'integer' or 'number'"
        numeric_type: NumericType,
        /// Source text of the number, without the unit.
        repr: String,
        /// "a unit"
        unit: String,
    },

    /// `~=` - "Represents an element with the att attribute whose value is a
    /// whitespace-separated list of words, one of which is exactly val."
    IncludeMatch,

    /// `|=` - exactly `val` or `val` followed by `-`.
    DashMatch,

    /// `^=` - begins with the prefix `val`.
    PrefixMatch,

    /// `$=` - ends with the suffix `val`.
    SuffixMatch,

    /// `*=` - contains at least one instance of `val`.
    SubstringMatch,

    /// `||` - the column combinator.
    Column,

    /// "`<whitespace-token>`"
    /// "represents one or more whitespace code points"
    Whitespace,

    /// "`<CDO-token>`"
    /// "represents the character sequence U+003C U+0021 U+002D U+002D (<!--)"
    CDO,

    /// "`<CDC-token>`"
    /// "represents the character sequence U+002D U+002D U+003E (-->)"
    CDC,

    /// "`<colon-token>`"
    /// "represents U+003A COLON (:)"
    Colon,

    /// "`<semicolon-token>`"
    /// "represents U+003B SEMICOLON (;)"
    Semicolon,

    /// "`<comma-token>`"
    /// "represents U+002C COMMA (,)"
    Comma,

    /// `<[-token>`
    /// "represents U+005B LEFT SQUARE BRACKET ([)"
    LeftBracket,

    /// `<]-token>`
    /// "represents U+005D RIGHT SQUARE BRACKET (])"
    RightBracket,

    /// `<(-token>`
    /// "represents U+0028 LEFT PARENTHESIS (()"
    LeftParen,

    /// `<)-token>`
    /// "represents U+0029 RIGHT PARENTHESIS ())"
    RightParen,

    /// `<{-token>`
    /// "represents U+007B LEFT CURLY BRACKET ({)"
    LeftBrace,

    /// `<}-token>`
    /// "represents U+007D RIGHT CURLY BRACKET (})"
    RightBrace,

    /// End of file - signals end of input
    EOF,
}

impl CSSToken {
    /// Create a new ident token.
    #[must_use]
    pub fn ident(value: impl Into<String>) -> Self {
        Self::Ident(value.into())
    }

    /// Create a new function token.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }

    /// Create a new hash token with id type.
    #[must_use]
    pub fn hash_id(value: impl Into<String>) -> Self {
        Self::Hash {
            value: value.into(),
            hash_type: HashType::Id,
        }
    }

    /// Create a new string token.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create a new integer number token.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn integer(value: i64) -> Self {
        Self::Number {
            value: value as f64,
            numeric_type: NumericType::Integer,
            repr: value.to_string(),
        }
    }

    /// Create a new delim token.
    #[must_use]
    pub const fn delim(c: char) -> Self {
        Self::Delim(c)
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Returns true if this is a delim token with the given value.
    #[must_use]
    pub fn is_delim(&self, c: char) -> bool {
        *self == Self::Delim(c)
    }

    /// CSS source text that tokenizes back to this token.
    ///
    /// Whitespace runs collapse to a single space and comments are gone, so
    /// the result is canonical rather than byte-identical to the input.
    #[must_use]
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CSSToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => f.write_str(&escape_ident(v)),
            Self::Function(v) => write!(f, "{}(", escape_ident(v)),
            Self::AtKeyword(v) => write!(f, "@{}", escape_ident(v)),
            Self::Hash { value, hash_type } => match hash_type {
                HashType::Id => write!(f, "#{}", escape_ident(value)),
                HashType::Unrestricted => write!(f, "#{}", escape_hash(value)),
            },
            Self::String(v) => write!(f, "\"{}\"", escape_string(v)),
            Self::BadString => f.write_str("BADSTRING"),
            Self::Url(v) => write!(f, "url(\"{}\")", escape_string(v)),
            Self::BadUrl => f.write_str("BADURL"),
            // A lone backslash only survives as a delim when a newline follows it.
            Self::Delim('\\') => f.write_str("\\\n"),
            Self::Delim(c) => write!(f, "{c}"),
            Self::Number { repr, .. } => f.write_str(repr),
            Self::Percentage { repr, .. } => write!(f, "{repr}%"),
            Self::Dimension { repr, unit, .. } => {
                // "1e3" would read back as a number, so an `e` that starts the
                // unit is escaped when a digit or `-` follows it.
                let mut unit = escape_ident(unit);
                let mut chars = unit.chars();
                let first = chars.next();
                let second = chars.next();
                if first.is_some_and(|c| c.eq_ignore_ascii_case(&'e'))
                    && second.is_some_and(|c| c == '-' || c.is_ascii_digit())
                {
                    unit = format!("\\65 {}", &unit[1..]);
                }
                write!(f, "{repr}{unit}")
            }
            Self::IncludeMatch => f.write_str("~="),
            Self::DashMatch => f.write_str("|="),
            Self::PrefixMatch => f.write_str("^="),
            Self::SuffixMatch => f.write_str("$="),
            Self::SubstringMatch => f.write_str("*="),
            Self::Column => f.write_str("||"),
            Self::Whitespace => f.write_str(" "),
            Self::CDO => f.write_str("<!--"),
            Self::CDC => f.write_str("-->"),
            Self::Colon => f.write_str(":"),
            Self::Semicolon => f.write_str(";"),
            Self::Comma => f.write_str(","),
            Self::LeftBracket => f.write_str("["),
            Self::RightBracket => f.write_str("]"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::LeftBrace => f.write_str("{"),
            Self::RightBrace => f.write_str("}"),
            Self::EOF => Ok(()),
        }
    }
}

/// Characters that serialize as themselves inside identifiers and hashes.
const fn is_name_char(c: char) -> bool {
    !c.is_ascii() || c == '-' || c == '_' || c.is_ascii_alphanumeric()
}

fn push_hex_escape(out: &mut String, c: char) {
    out.push_str(&format!("\\{:x} ", u32::from(c)));
}

/// [§ 2.1 Serializing an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier)
///
/// "If the character is NULL (U+0000), then the REPLACEMENT CHARACTER (U+FFFD)."
/// "If the character is in the range \[\\1-\\1f\] (U+0001 to U+001F) or is
/// U+007F, \[or\] is the first character and is in the range \[0-9\]...,
/// \[or\] is the second character and is in the range \[0-9\] and the first
/// character is a "-" (U+002D), then the character escaped as code point."
#[must_use]
pub fn escape_ident(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let first = value.chars().next();
    for (i, c) in value.chars().enumerate() {
        if c == '\0' {
            result.push('\u{FFFD}');
        } else if matches!(c, '\u{1}'..='\u{1f}' | '\u{7f}')
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && first == Some('-'))
        {
            push_hex_escape(&mut result, c);
        } else if is_name_char(c) {
            result.push(c);
        } else {
            result.push('\\');
            result.push(c);
        }
    }
    result
}

/// Serialize the value of an unrestricted hash token: anything that is not a
/// name character is escaped as a code point.
#[must_use]
pub fn escape_hash(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\0' {
            result.push('\u{FFFD}');
        } else if is_name_char(c) {
            result.push(c);
        } else {
            push_hex_escape(&mut result, c);
        }
    }
    result
}

/// [§ 2.1 Serializing a string](https://drafts.csswg.org/cssom/#serialize-a-string)
///
/// "If the character is in the range \[\\1-\\1f\] (U+0001 to U+001F) or is
/// U+007F, the character escaped as code point. If the character is '"'
/// (U+0022) or '\\' (U+005C), the escaped character."
///
/// The surrounding quotes are not included.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\0' => result.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => push_hex_escape(&mut result, c),
            '"' | '\\' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
