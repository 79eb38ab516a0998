//! C# locators: `GetByRole(AriaRole.Button, new() { Name = "OK" })`.

use super::javascript::body_text;
use super::{LocatorBase, LocatorFactory, LocatorKind, LocatorOptions};
use crate::pattern::JsRegex;
use crate::string_utils::{
    TextOrRegex, escape_with_quotes, normalize_escaped_regex_quotes, to_title_case,
};

/// Renders C# locator calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpLocatorFactory;

impl CSharpLocatorFactory {
    fn quote(text: &str) -> String {
        escape_with_quotes(text, '"')
    }

    fn regex(re: &JsRegex) -> String {
        let suffix = if re.flags().contains('i') {
            ", RegexOptions.IgnoreCase"
        } else {
            ""
        };
        format!(
            "new Regex({}{suffix})",
            Self::quote(&normalize_escaped_regex_quotes(re.source()))
        )
    }

    /// `Property = "text"` or `PropertyRegex = new Regex(...)`.
    fn text_property(property: &str, body: &TextOrRegex) -> String {
        match body {
            TextOrRegex::Text(text) => format!("{property} = {}", Self::quote(text)),
            TextOrRegex::Regex(re) => format!("{property}Regex = {}", Self::regex(re)),
        }
    }

    fn call_with_exact(method: &str, body: &TextOrRegex, exact: bool) -> String {
        match body {
            TextOrRegex::Regex(re) => format!("{method}({})", Self::regex(re)),
            TextOrRegex::Text(text) if exact => {
                format!("{method}({}, new() {{ Exact = true }})", Self::quote(text))
            }
            TextOrRegex::Text(text) => format!("{method}({})", Self::quote(text)),
        }
    }
}

impl LocatorFactory for CSharpLocatorFactory {
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
                        "Locator({}, new() {{ {} }})",
                        Self::quote(&raw),
                        Self::text_property("HasText", has_text)
                    )
                } else if let Some(has_not_text) = &options.has_not_text {
                    format!(
                        "Locator({}, new() {{ {} }})",
                        Self::quote(&raw),
                        Self::text_property("HasNotText", has_not_text)
                    )
                } else {
                    format!("Locator({})", Self::quote(&raw))
                }
            }
            LocatorKind::Frame => format!("FrameLocator({})", Self::quote(&raw)),
            LocatorKind::Nth => format!("Nth({raw})"),
            LocatorKind::First => "First".to_string(),
            LocatorKind::Last => "Last".to_string(),
            LocatorKind::Role => {
                let mut attrs = Vec::new();
                match &options.name {
                    Some(name @ TextOrRegex::Regex(_)) => {
                        attrs.push(Self::text_property("Name", name));
                    }
                    Some(name @ TextOrRegex::Text(_)) => {
                        attrs.push(Self::text_property("Name", name));
                        if exact {
                            attrs.push("Exact = true".to_string());
                        }
                    }
                    None => {}
                }
                for (name, value) in &options.attrs {
                    let value = value
                        .as_str()
                        .map_or_else(|| value.to_string(), Self::quote);
                    attrs.push(format!("{} = {value}", to_title_case(name)));
                }
                let attrs = if attrs.is_empty() {
                    String::new()
                } else {
                    format!(", new() {{ {} }}", attrs.join(", "))
                };
                format!("GetByRole(AriaRole.{}{attrs})", to_title_case(&raw))
            }
            LocatorKind::HasText => {
                format!("Filter(new() {{ {} }})", Self::text_property("HasText", body))
            }
            LocatorKind::HasNotText => {
                format!("Filter(new() {{ {} }})", Self::text_property("HasNotText", body))
            }
            LocatorKind::Has => format!("Filter(new() {{ Has = {raw} }})"),
            LocatorKind::HasNot => format!("Filter(new() {{ HasNot = {raw} }})"),
            LocatorKind::And => format!("And({raw})"),
            LocatorKind::Or => format!("Or({raw})"),
            LocatorKind::Chain => format!("Locator({raw})"),
            LocatorKind::TestId => match body {
                TextOrRegex::Text(text) => format!("GetByTestId({})", Self::quote(text)),
                TextOrRegex::Regex(re) => format!("GetByTestId({})", Self::regex(re)),
            },
            LocatorKind::Text => Self::call_with_exact("GetByText", body, exact),
            LocatorKind::Alt => Self::call_with_exact("GetByAltText", body, exact),
            LocatorKind::Placeholder => Self::call_with_exact("GetByPlaceholder", body, exact),
            LocatorKind::Label => Self::call_with_exact("GetByLabel", body, exact),
            LocatorKind::Title => Self::call_with_exact("GetByTitle", body, exact),
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
    fn test_has_text_regex_property() {
        let re = TextOrRegex::Regex(JsRegex::new("^Total", "i").unwrap());
        assert_eq!(
            CSharpLocatorFactory.generate_locator(
                LocatorBase::Locator,
                LocatorKind::HasText,
                &re,
                &LocatorOptions::default()
            ),
            "Filter(new() { HasTextRegex = new Regex(\"^Total\", RegexOptions.IgnoreCase) })"
        );
    }

    #[test]
    fn test_role_is_title_cased() {
        assert_eq!(
            CSharpLocatorFactory.generate_locator(
                LocatorBase::Page,
                LocatorKind::Role,
                &TextOrRegex::Text("checkbox".to_string()),
                &LocatorOptions::default()
            ),
            "GetByRole(AriaRole.Checkbox)"
        );
    }
}
