//! CSS tokenizer, selector-subset parser and compound matcher for Quarry.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - All token types, including the attribute matchers `~= |= ^= $= *=` and `||`
//!   - Comment handling and input preprocessing
//!   - Escape sequences, and escaping back to source with [`CSSToken::to_source`]
//!
//! - **Selector parser** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Complex selector lists with the `>`, `+`, `~` and descendant combinators
//!   - Custom pseudo-functions (`:has()`, `:text()`, `:nth-match()`, ...) lifted
//!     into structured [`CssFunction`] nodes
//!   - Everything else kept as opaque compound CSS text
//!
//! - **Compound matcher**
//!   - Type, universal, class, id and attribute selectors
//!   - Structural and form pseudo-classes, including `An+B` ones
//!
//! # Not Yet Implemented
//!
//! - Namespaces (`ns|tag`)
//! - `:nth-child(An+B of S)`
//! - `:lang()`, `:dir()`

/// Error types.
pub mod error;
/// Compound selector matching against a [`quarry_dom::DomTree`].
pub mod matcher;
/// Selector-subset parser per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod parser;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use error::{CssParseError, LexError};
pub use matcher::CompoundSelector;
pub use parser::{
    CUSTOM_CSS_NAMES, ClauseCombinator, CssComplexSelector, CssComplexSelectorList,
    CssComplexSelectorPart, CssFunction, CssFunctionArgument, CssSimpleSelector, ParsedCss,
    parse_css, serialize_selector,
};
pub use tokenizer::{CSSToken, tokenize};
