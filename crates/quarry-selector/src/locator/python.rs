//! Python locators: `get_by_role("button", name="OK")`.

use super::javascript::body_text;
use super::{LocatorBase, LocatorFactory, LocatorKind, LocatorOptions};
use crate::attribute::AttributeValue;
use crate::pattern::JsRegex;
use crate::string_utils::{
    TextOrRegex, escape_with_quotes, normalize_escaped_regex_quotes, to_snake_case,
};

/// Renders Python locator calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonLocatorFactory;

impl PythonLocatorFactory {
    fn quote(text: &str) -> String {
        escape_with_quotes(text, '"')
    }

    fn regex(re: &JsRegex) -> String {
        let suffix = if re.flags().contains('i') {
            ", re.IGNORECASE"
        } else {
            ""
        };
        let source = normalize_escaped_regex_quotes(re.source())
            .replace("\\/", "/")
            .replace('"', "\\\"");
        format!("re.compile(r\"{source}\"{suffix})")
    }

    fn text_or_regex(body: &TextOrRegex) -> String {
        match body {
            TextOrRegex::Text(text) => Self::quote(text),
            TextOrRegex::Regex(re) => Self::regex(re),
        }
    }

    fn call_with_exact(method: &str, body: &TextOrRegex, exact: bool) -> String {
        match body {
            TextOrRegex::Regex(re) => format!("{method}({})", Self::regex(re)),
            TextOrRegex::Text(text) if exact => format!("{method}({}, exact=True)", Self::quote(text)),
            TextOrRegex::Text(text) => format!("{method}({})", Self::quote(text)),
        }
    }

    fn value(value: &AttributeValue) -> String {
        match value {
            AttributeValue::String(text) => Self::quote(text),
            AttributeValue::Bool(true) => "True".to_string(),
            AttributeValue::Bool(false) => "False".to_string(),
            other => other.to_string(),
        }
    }
}

impl LocatorFactory for PythonLocatorFactory {
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
                        "locator({}, has_text={})",
                        Self::quote(&raw),
                        Self::text_or_regex(has_text)
                    )
                } else if let Some(has_not_text) = &options.has_not_text {
                    format!(
                        "locator({}, has_not_text={})",
                        Self::quote(&raw),
                        Self::text_or_regex(has_not_text)
                    )
                } else {
                    format!("locator({})", Self::quote(&raw))
                }
            }
            LocatorKind::Frame => format!("frame_locator({})", Self::quote(&raw)),
            LocatorKind::Nth => format!("nth({raw})"),
            LocatorKind::First => "first".to_string(),
            LocatorKind::Last => "last".to_string(),
            LocatorKind::Role => {
                let mut attrs = Vec::new();
                match &options.name {
                    Some(TextOrRegex::Regex(re)) => attrs.push(format!("name={}", Self::regex(re))),
                    Some(TextOrRegex::Text(name)) => {
                        attrs.push(format!("name={}", Self::quote(name)));
                        if exact {
                            attrs.push("exact=True".to_string());
                        }
                    }
                    None => {}
                }
                for (name, value) in &options.attrs {
                    attrs.push(format!("{}={}", to_snake_case(name), Self::value(value)));
                }
                let attrs = if attrs.is_empty() {
                    String::new()
                } else {
                    format!(", {}", attrs.join(", "))
                };
                format!("get_by_role({}{attrs})", Self::quote(&raw))
            }
            LocatorKind::HasText => format!("filter(has_text={})", Self::text_or_regex(body)),
            LocatorKind::HasNotText => {
                format!("filter(has_not_text={})", Self::text_or_regex(body))
            }
            LocatorKind::Has => format!("filter(has={raw})"),
            LocatorKind::HasNot => format!("filter(has_not={raw})"),
            LocatorKind::And => format!("and_({raw})"),
            LocatorKind::Or => format!("or_({raw})"),
            LocatorKind::Chain => format!("locator({raw})"),
            LocatorKind::TestId => format!("get_by_test_id({})", Self::text_or_regex(body)),
            LocatorKind::Text => Self::call_with_exact("get_by_text", body, exact),
            LocatorKind::Alt => Self::call_with_exact("get_by_alt_text", body, exact),
            LocatorKind::Placeholder => Self::call_with_exact("get_by_placeholder", body, exact),
            LocatorKind::Label => Self::call_with_exact("get_by_label", body, exact),
            LocatorKind::Title => Self::call_with_exact("get_by_title", body, exact),
        }
    }

    fn chain_locators(&self, locators: &[String]) -> String {
        locators.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_uses_raw_string() {
        let re = JsRegex::new("say \"hi\"", "i").unwrap();
        assert_eq!(
            PythonLocatorFactory::regex(&re),
            "re.compile(r\"say \\\"hi\\\"\", re.IGNORECASE)"
        );
    }

    #[test]
    fn test_first_is_a_property() {
        let body = TextOrRegex::Text(String::new());
        assert_eq!(
            PythonLocatorFactory.generate_locator(
                LocatorBase::Locator,
                LocatorKind::First,
                &body,
                &LocatorOptions::default()
            ),
            "first"
        );
    }
}
