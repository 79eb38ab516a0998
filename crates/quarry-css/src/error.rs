//! Error types for tokenizing, parsing and matching CSS selectors.

use thiserror::Error;

/// A malformed low-level token.
///
/// The tokenizer recovers from most bad input the way
/// [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization) describes
/// (bad-string and bad-url tokens, replacement characters). These are the
/// cases a selector cannot sensibly recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A string token ran into the end of input before its closing quote.
    #[error("Unterminated string starting at position {position}")]
    UnterminatedString {
        /// Character offset of the opening quote.
        position: usize,
    },

    /// A hex escape named a code point above U+10FFFF.
    #[error(
        "Invalid escape \\{hex} at position {position}: code point exceeds the maximum allowed U+10FFFF"
    )]
    InvalidEscape {
        /// The hex digits of the escape.
        hex: String,
        /// Character offset of the backslash.
        position: usize,
    },
}

/// A selector that does not fit the supported CSS subset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssParseError {
    /// The tokenizer rejected the selector text.
    #[error("{source} while parsing css selector \"{selector}\". Did you mean to CSS.escape it?")]
    Lex {
        /// The underlying tokenizer error.
        source: LexError,
        /// The selector being parsed.
        selector: String,
    },

    /// A token the selector grammar never accepts (at-keywords, blocks, urls, ...).
    #[error(
        "Unsupported token \"{token}\" while parsing css selector \"{selector}\". Did you mean to CSS.escape it?"
    )]
    UnsupportedToken {
        /// Source text of the token.
        token: String,
        /// The selector being parsed.
        selector: String,
    },

    /// A token in a position the grammar does not allow.
    #[error(
        "Unexpected token \"{token}\" while parsing css selector \"{selector}\". Did you mean to CSS.escape it?"
    )]
    UnexpectedToken {
        /// Source text of the token.
        token: String,
        /// The selector being parsed.
        selector: String,
    },

    /// The top level of the selector was a string or number, not a selector.
    #[error("Error while parsing css selector \"{selector}\". Did you mean to CSS.escape it?")]
    InvalidSelector {
        /// The selector being parsed.
        selector: String,
    },

    /// A CSS fragment uses syntax the compound matcher does not implement.
    #[error("Unsupported css fragment \"{fragment}\": {reason}")]
    UnsupportedFragment {
        /// The fragment text.
        fragment: String,
        /// What went wrong.
        reason: String,
    },
}
