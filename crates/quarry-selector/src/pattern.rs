//! Regular-expression values written in `/source/flags` literal form.
//!
//! Selector text borrows the ECMAScript literal syntax for patterns
//! (`internal:text=/sub\s*mit/i`, `[name=/^OK$/]`). The source is compiled
//! with the `regex` crate. Flags that change matching (`i`, `m`, `s`) map to
//! builder options; the stateful ones (`g`, `y`, `d`, `u`) have no effect on a
//! single test and are only kept for rendering.

use core::fmt;

use regex::{Regex, RegexBuilder};

/// A compiled pattern that remembers how it was written.
#[derive(Debug, Clone)]
pub struct JsRegex {
    source: String,
    flags: String,
    regex: Regex,
}

impl JsRegex {
    /// Compile `source` with ECMAScript-style `flags`.
    ///
    /// # Errors
    ///
    /// Returns the compile error for syntax the `regex` crate does not
    /// support, such as look-around and back-references.
    pub fn new(source: &str, flags: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&translate_source(source))
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()?;
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// Parse `/source/flags` literal text. Returns `None` when `text` is not
    /// in literal form or does not compile.
    #[must_use]
    pub fn parse_literal(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;
        let last_slash = rest.rfind('/')?;
        let (source, flags) = (&rest[..last_slash], &rest[last_slash + 1..]);
        Self::new(source, flags).ok()
    }

    /// The pattern exactly as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The flags exactly as written.
    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// `RegExp.prototype.test()`.
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for JsRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for JsRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// `\<` and `\>` are identity escapes in ECMAScript but word boundaries in
/// the `regex` crate.
fn translate_source(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('<' | '>')) => result.push(escaped),
            Some(escaped) => {
                result.push('\\');
                result.push(escaped);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let re = JsRegex::new("^ok$", "i").unwrap();
        assert!(re.is_match("OK"));
        let re = JsRegex::new("a.b", "s").unwrap();
        assert!(re.is_match("a\nb"));
        let re = JsRegex::new("a.b", "").unwrap();
        assert!(!re.is_match("a\nb"));
    }

    #[test]
    fn test_angle_bracket_escapes_are_literal() {
        let re = JsRegex::new(r"\>\>", "").unwrap();
        assert!(re.is_match("a >> b"));
    }

    #[test]
    fn test_parse_literal() {
        let re = JsRegex::parse_literal("/sub\\/mit/gi").unwrap();
        assert_eq!(re.source(), "sub\\/mit");
        assert_eq!(re.flags(), "gi");
        assert_eq!(re.to_string(), "/sub\\/mit/gi");
        assert!(JsRegex::parse_literal("plain").is_none());
    }

    #[test]
    fn test_equality_ignores_compiled_form() {
        assert_eq!(JsRegex::new("a", "i").unwrap(), JsRegex::new("a", "i").unwrap());
        assert_ne!(JsRegex::new("a", "i").unwrap(), JsRegex::new("a", "").unwrap());
    }
}
