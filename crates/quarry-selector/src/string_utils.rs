//! Quoting, escaping and normalization helpers shared by the engines, the
//! generator and the locator codegen.

use std::sync::LazyLock;

use quarry_css::tokenizer::escape_ident;
use regex::Regex;

use crate::pattern::JsRegex;

static SNAKE_LOWER_UPPER: LazyLock<Regex> = LazyLock::new(|| static_regex("([a-z0-9])([A-Z])"));
static SNAKE_ACRONYM: LazyLock<Regex> = LazyLock::new(|| static_regex("([A-Z])([A-Z][a-z])"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\s+"));
static ESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r#"(^|[^\\])(\\\\)*\\(['"`])"#));
static UNESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r#"(^|[^\\])(\\\\)*(["'`])"#));
static REGEX_SPECIAL: LazyLock<Regex> = LazyLock::new(|| static_regex(r"[.*+?^${}()|\[\]\\]"));

/// Compile one of the patterns above.
pub(crate) fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern should compile")
}

/// `JSON.stringify` for a string.
#[must_use]
pub fn json_quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Render `text` as a string literal delimited by `quote` (`'`, `"` or a
/// backtick), JSON-escaping everything else.
#[must_use]
pub fn escape_with_quotes(text: &str, quote: char) -> String {
    let stringified = json_quote(text);
    let inner = stringified[1..stringified.len() - 1].replace("\\\"", "\"");
    let escaped = match quote {
        '\'' => inner.replace('\'', "\\'"),
        '`' => inner.replace('`', "\\`"),
        _ => inner.replace('"', "\\\""),
    };
    format!("{quote}{escaped}{quote}")
}

/// Uppercase the first character.
#[must_use]
pub fn to_title_case(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// `includeHidden` → `include_hidden`, `ARIARole` → `aria_role`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let step = SNAKE_LOWER_UPPER.replace_all(name, "${1}_${2}");
    SNAKE_ACRONYM.replace_all(&step, "${1}_${2}").to_lowercase()
}

/// [CSSOM § 2.1 CSS.escape()](https://drafts.csswg.org/cssom/#the-css.escape()-method)
#[must_use]
pub fn css_escape(text: &str) -> String {
    // "If the character is the first character and is a "-" (U+002D), and
    // there is no second character, then the escaped character."
    if text == "-" {
        return "\\-".to_string();
    }
    escape_ident(text)
}

/// A double-quoted CSS attribute value.
#[must_use]
pub fn quote_css_attribute_value(text: &str) -> String {
    format!("\"{}\"", css_escape(text).replace("\\ ", " "))
}

/// Drop zero-width spaces, trim, and collapse whitespace runs to one space.
#[must_use]
pub fn normalize_white_space(text: &str) -> String {
    let text = text.replace('\u{200b}', "");
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Undo [`escape_regex_for_selector`]: an odd run of backslashes before a
/// quote loses one backslash.
#[must_use]
pub fn normalize_escaped_regex_quotes(source: &str) -> String {
    ESCAPED_QUOTE.replace_all(source, "${1}${2}${3}").into_owned()
}

/// Render a pattern so it survives inside selector text: quotes get escaped
/// and `>>` cannot split the selector.
#[must_use]
pub fn escape_regex_for_selector(re: &JsRegex) -> String {
    // Unicode mode forbids identity escapes.
    if re.flags().contains('u') || re.flags().contains('v') {
        return re.to_string();
    }
    UNESCAPED_QUOTE
        .replace_all(&re.to_string(), "${1}${2}\\${3}")
        .replace(">>", "\\>\\>")
}

/// Text or pattern, the two shapes a text-matching option can take.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOrRegex {
    /// Plain text.
    Text(String),
    /// A pattern.
    Regex(JsRegex),
}

/// Body for a text engine: `"json"s` when exact, `"json"i` otherwise.
#[must_use]
pub fn escape_for_text_selector(text: &TextOrRegex, exact: bool) -> String {
    match text {
        TextOrRegex::Regex(re) => escape_regex_for_selector(re),
        TextOrRegex::Text(text) => format!("{}{}", json_quote(text), if exact { 's' } else { 'i' }),
    }
}

/// Value for an attribute clause: `"v"s` when exact, `"v"i` otherwise.
#[must_use]
pub fn escape_for_attribute_selector(value: &TextOrRegex, exact: bool) -> String {
    match value {
        TextOrRegex::Regex(re) => escape_regex_for_selector(re),
        TextOrRegex::Text(value) => format!(
            "\"{}\"{}",
            value.replace('\\', "\\\\").replace('"', "\\\""),
            if exact { 's' } else { 'i' }
        ),
    }
}

/// Cap `input` at `cap` characters, ending with `suffix` when cut.
#[must_use]
pub fn trim_string(input: &str, cap: usize, suffix: &str) -> String {
    if input.chars().count() <= cap {
        return input.to_string();
    }
    let keep = cap.saturating_sub(suffix.chars().count());
    let mut result: String = input.chars().take(keep).collect();
    result.push_str(suffix);
    result
}

/// [`trim_string`] with `…`.
#[must_use]
pub fn trim_string_with_ellipsis(input: &str, cap: usize) -> String {
    trim_string(input, cap, "\u{2026}")
}

/// Escape every regex metacharacter in `text`.
#[must_use]
pub fn escape_reg_exp(text: &str) -> String {
    REGEX_SPECIAL.replace_all(text, "\\$0").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_with_quotes() {
        assert_eq!(escape_with_quotes("it's", '\''), "'it\\'s'");
        assert_eq!(escape_with_quotes("say \"hi\"", '"'), "\"say \\\"hi\\\"\"");
        assert_eq!(escape_with_quotes("say \"hi\"", '\''), "'say \"hi\"'");
        assert_eq!(escape_with_quotes("a\nb", '\''), "'a\\nb'");
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_title_case("button"), "Button");
        assert_eq!(to_title_case(""), "");
        assert_eq!(to_snake_case("includeHidden"), "include_hidden");
        assert_eq!(to_snake_case("hasNotText"), "has_not_text");
        assert_eq!(to_snake_case("ARIARole"), "aria_role");
    }

    #[test]
    fn test_normalize_white_space() {
        assert_eq!(normalize_white_space("  a \n\t b\u{200b}c  "), "a bc");
    }

    #[test]
    fn test_css_escape() {
        assert_eq!(css_escape("-"), "\\-");
        assert_eq!(css_escape("1a"), "\\31 a");
        assert_eq!(quote_css_attribute_value("a b\"c"), "\"a b\\\"c\"");
    }

    #[test]
    fn test_regex_quote_escaping_round_trips() {
        let re = JsRegex::new("say \"hi\" >> 'x'", "i").unwrap();
        let escaped = escape_regex_for_selector(&re);
        assert_eq!(escaped, "/say \\\"hi\\\" \\>\\> \\'x\\'/i");
        assert_eq!(
            normalize_escaped_regex_quotes("say \\\"hi\\\""),
            "say \"hi\""
        );
    }

    #[test]
    fn test_text_and_attribute_bodies() {
        let text = TextOrRegex::Text("a\"b".to_string());
        assert_eq!(escape_for_text_selector(&text, true), "\"a\\\"b\"s");
        assert_eq!(escape_for_attribute_selector(&text, false), "\"a\\\"b\"i");
    }

    #[test]
    fn test_trim_string() {
        assert_eq!(trim_string_with_ellipsis("abcdef", 4), "abc\u{2026}");
        assert_eq!(trim_string_with_ellipsis("abc", 4), "abc");
    }

    #[test]
    fn test_escape_reg_exp() {
        assert_eq!(escape_reg_exp("a.b(c)"), "a\\.b\\(c\\)");
    }
}
