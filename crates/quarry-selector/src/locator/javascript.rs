//! JavaScript and TypeScript locators: `getByRole('button', { name: 'OK' })`.

use super::{LocatorBase, LocatorFactory, LocatorKind, LocatorOptions};
use crate::attribute::AttributeValue;
use crate::string_utils::{TextOrRegex, escape_with_quotes, normalize_escaped_regex_quotes};

/// Renders JavaScript locator calls.
#[derive(Debug, Clone)]
pub struct JavaScriptLocatorFactory {
    quote: char,
}

impl JavaScriptLocatorFactory {
    /// Quote strings with `preferred_quote`, or `'` when unset.
    #[must_use]
    pub fn new(preferred_quote: Option<char>) -> Self {
        Self {
            quote: preferred_quote.unwrap_or('\''),
        }
    }

    fn quote(&self, text: &str) -> String {
        escape_with_quotes(text, self.quote)
    }

    fn text_or_regex(&self, body: &TextOrRegex) -> String {
        match body {
            TextOrRegex::Text(text) => self.quote(text),
            TextOrRegex::Regex(re) => normalize_escaped_regex_quotes(&re.to_string()),
        }
    }

    fn call_with_exact(&self, method: &str, body: &TextOrRegex, exact: bool) -> String {
        match body {
            TextOrRegex::Regex(_) => format!("{method}({})", self.text_or_regex(body)),
            TextOrRegex::Text(text) if exact => {
                format!("{method}({}, {{ exact: true }})", self.quote(text))
            }
            TextOrRegex::Text(text) => format!("{method}({})", self.quote(text)),
        }
    }

    fn value(&self, value: &AttributeValue) -> String {
        match value {
            AttributeValue::String(text) => self.quote(text),
            other => other.to_string(),
        }
    }
}

impl Default for JavaScriptLocatorFactory {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LocatorFactory for JavaScriptLocatorFactory {
    fn generate_locator(
        &self,
        _base: LocatorBase,
        kind: LocatorKind,
        body: &TextOrRegex,
        options: &LocatorOptions,
    ) -> String {
        let raw = body_text(body);
        let exact = options.exact.unwrap_or(false);
        match kind {
            LocatorKind::Default => {
                if let Some(has_text) = &options.has_text {
                    format!(
                        "locator({}, {{ hasText: {} }})",
                        self.quote(&raw),
                        self.text_or_regex(has_text)
                    )
                } else if let Some(has_not_text) = &options.has_not_text {
                    format!(
                        "locator({}, {{ hasNotText: {} }})",
                        self.quote(&raw),
                        self.text_or_regex(has_not_text)
                    )
                } else {
                    format!("locator({})", self.quote(&raw))
                }
            }
            LocatorKind::Frame => format!("frameLocator({})", self.quote(&raw)),
            LocatorKind::Nth => format!("nth({raw})"),
            LocatorKind::First => "first()".to_string(),
            LocatorKind::Last => "last()".to_string(),
            LocatorKind::Role => {
                let mut attrs = Vec::new();
                match &options.name {
                    Some(name @ TextOrRegex::Regex(_)) => {
                        attrs.push(format!("name: {}", self.text_or_regex(name)));
                    }
                    Some(TextOrRegex::Text(name)) => {
                        attrs.push(format!("name: {}", self.quote(name)));
                        if exact {
                            attrs.push("exact: true".to_string());
                        }
                    }
                    None => {}
                }
                for (name, value) in &options.attrs {
                    attrs.push(format!("{name}: {}", self.value(value)));
                }
                let attrs = if attrs.is_empty() {
                    String::new()
                } else {
                    format!(", {{ {} }}", attrs.join(", "))
                };
                format!("getByRole({}{attrs})", self.quote(&raw))
            }
            LocatorKind::HasText => format!("filter({{ hasText: {} }})", self.text_or_regex(body)),
            LocatorKind::HasNotText => {
                format!("filter({{ hasNotText: {} }})", self.text_or_regex(body))
            }
            LocatorKind::Has => format!("filter({{ has: {raw} }})"),
            LocatorKind::HasNot => format!("filter({{ hasNot: {raw} }})"),
            LocatorKind::And => format!("and({raw})"),
            LocatorKind::Or => format!("or({raw})"),
            LocatorKind::Chain => format!("locator({raw})"),
            LocatorKind::TestId => format!("getByTestId({})", self.text_or_regex(body)),
            LocatorKind::Text => self.call_with_exact("getByText", body, exact),
            LocatorKind::Alt => self.call_with_exact("getByAltText", body, exact),
            LocatorKind::Placeholder => self.call_with_exact("getByPlaceholder", body, exact),
            LocatorKind::Label => self.call_with_exact("getByLabel", body, exact),
            LocatorKind::Title => self.call_with_exact("getByTitle", body, exact),
        }
    }

    fn chain_locators(&self, locators: &[String]) -> String {
        locators.join(".")
    }
}

/// The body as plain text; patterns render in literal form.
pub(super) fn body_text(body: &TextOrRegex) -> String {
    match body {
        TextOrRegex::Text(text) => text.clone(),
        TextOrRegex::Regex(re) => re.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::JsRegex;

    #[test]
    fn test_exact_text() {
        let factory = JavaScriptLocatorFactory::default();
        let text = TextOrRegex::Text("Sign in".to_string());
        let options = LocatorOptions {
            exact: Some(true),
            ..LocatorOptions::default()
        };
        assert_eq!(
            factory.generate_locator(LocatorBase::Page, LocatorKind::Text, &text, &options),
            "getByText('Sign in', { exact: true })"
        );
    }

    #[test]
    fn test_regex_body() {
        let factory = JavaScriptLocatorFactory::default();
        let re = TextOrRegex::Regex(JsRegex::new("^it's", "i").unwrap());
        assert_eq!(
            factory.generate_locator(
                LocatorBase::Page,
                LocatorKind::Label,
                &re,
                &LocatorOptions::default()
            ),
            "getByLabel(/^it's/i)"
        );
    }

    #[test]
    fn test_preferred_quote() {
        let factory = JavaScriptLocatorFactory::new(Some('"'));
        let body = TextOrRegex::Text("div".to_string());
        assert_eq!(
            factory.generate_locator(
                LocatorBase::Page,
                LocatorKind::Default,
                &body,
                &LocatorOptions::default()
            ),
            "locator(\"div\")"
        );
    }
}
