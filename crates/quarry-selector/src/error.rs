//! Error types for parsing and evaluating selectors.

use quarry_css::{CssParseError, LexError};
use thiserror::Error;

/// Everything that can go wrong between selector text and a result set.
///
/// All of these are caller errors. They carry the offending selector text
/// and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The CSS tokenizer rejected a `css` part.
    #[error("{source} while parsing css selector \"{selector}\". Did you mean to CSS.escape it?")]
    Lex {
        /// The underlying tokenizer error.
        source: LexError,
        /// The CSS text being parsed.
        selector: String,
    },

    /// Structurally invalid selector text.
    #[error("{0}")]
    InvalidSelector(String),

    /// The selector names an engine nobody registered.
    #[error("Unknown engine \"{name}\" while parsing selector {selector}")]
    UnknownEngine {
        /// The engine name.
        name: String,
        /// The full selector text.
        selector: String,
    },

    /// Malformed attribute mini-language text, or a type/operator mismatch.
    #[error("{0}")]
    AttributeGrammar(String),

    /// Strict evaluation matched more than one element.
    #[error("{message}")]
    Ambiguous {
        /// The rendered report, including element previews.
        message: String,
        /// How many elements matched.
        count: usize,
    },

    /// An engine rejected its body at query time.
    #[error("{0}")]
    Engine(String),
}

impl SelectorError {
    /// Shorthand for [`SelectorError::InvalidSelector`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSelector(message.into())
    }
}

impl From<CssParseError> for SelectorError {
    fn from(error: CssParseError) -> Self {
        match error {
            CssParseError::Lex { source, selector } => Self::Lex { source, selector },
            other => Self::InvalidSelector(other.to_string()),
        }
    }
}
