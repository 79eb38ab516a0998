//! Selector language, query dispatcher, selector generator and locator
//! codegen for Quarry.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector language**
//!   - `engine=body` parts chained with `>>`, bare CSS, XPath and quoted
//!     text shorthands, `*` capture
//!   - Nested selector bodies (`internal:has="..."`) and frame boundaries
//!   - The attribute mini-language (`[name="x"i][checked]`)
//!
//! - **Query dispatcher**
//!   - Built-in engines: `css`, `text`, `id`, `data-testid`, `nth`,
//!     `visible`, `internal:*` and more, plus user-registered ones
//!   - Custom CSS pseudo-classes (`:has()`, `:text()`, `:right-of()`, ...)
//!   - Strict mode with diagnostics that suggest narrower locators
//!
//! - **Selector generator**
//!   - Scored candidates from test ids, roles, labels, text and CSS, with a
//!     structural CSS fallback
//!
//! - **Locator codegen**
//!   - Rendering selectors as JavaScript, Python, Java, C# and JSONL locators
//!   - Reading locator code back into selectors
//!
//! # Not Yet Implemented
//!
//! - XPath evaluation
//! - Frames and shadow roots

/// Attribute mini-language (`[name="OK"i][level=2]`).
pub mod attribute;
/// Selector engines and the built-in registry.
pub mod engine;
/// Error types.
pub mod error;
/// CSS selector evaluation with custom pseudo-classes.
pub mod evaluator;
/// Selector generation for a target element.
pub mod generator;
/// Layout pseudo-classes (`:left-of()`, `:near()`, ...).
pub mod layout;
/// Locator codegen in client languages and its reverse.
pub mod locator;
/// `>>` selector parsing and serialization.
pub mod parser;
/// JavaScript-style regular expressions.
pub mod pattern;
/// The engine registry and query dispatcher.
pub mod query;
/// Quoting, escaping and case helpers.
pub mod string_utils;
/// Element text, labels and text matching.
pub mod text;

pub use engine::SelectorEngine;
pub use error::SelectorError;
pub use generator::{GenerateOptions, GeneratedSelector, generate_selector};
pub use locator::{Language, as_locator, as_locators, locator_or_selector_as_selector};
pub use parser::{ParsedSelector, parse_selector, stringify_selector};
pub use pattern::JsRegex;
pub use query::{QuarryOptions, QueryContext, Selectors};
pub use string_utils::TextOrRegex;
