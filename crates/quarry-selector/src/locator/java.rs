//! Java locators:
//! `getByRole(AriaRole.BUTTON, new Page.GetByRoleOptions().setName("OK"))`.
//!
//! Option classes are nested in the receiver's class, so the same call reads
//! `Page.GetByTextOptions` on a page and `Locator.GetByTextOptions` on a
//! locator.

use super::javascript::body_text;
use super::{LocatorBase, LocatorFactory, LocatorKind, LocatorOptions};
use crate::pattern::JsRegex;
use crate::string_utils::{
    TextOrRegex, escape_with_quotes, normalize_escaped_regex_quotes, to_snake_case, to_title_case,
};

/// Renders Java locator calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaLocatorFactory;

impl JavaLocatorFactory {
    fn quote(text: &str) -> String {
        escape_with_quotes(text, '"')
    }

    fn regex(re: &JsRegex) -> String {
        let suffix = if re.flags().contains('i') {
            ", Pattern.CASE_INSENSITIVE"
        } else {
            ""
        };
        format!(
            "Pattern.compile({}{suffix})",
            Self::quote(&normalize_escaped_regex_quotes(re.source()))
        )
    }

    fn text_or_regex(body: &TextOrRegex) -> String {
        match body {
            TextOrRegex::Text(text) => Self::quote(text),
            TextOrRegex::Regex(re) => Self::regex(re),
        }
    }

    fn call_with_exact(class: &str, method: &str, body: &TextOrRegex, exact: bool) -> String {
        match body {
            TextOrRegex::Regex(re) => format!("{method}({})", Self::regex(re)),
            TextOrRegex::Text(text) if exact => format!(
                "{method}({}, new {class}.{}Options().setExact(true))",
                Self::quote(text),
                to_title_case(method)
            ),
            TextOrRegex::Text(text) => format!("{method}({})", Self::quote(text)),
        }
    }
}

impl LocatorFactory for JavaLocatorFactory {
    fn generate_locator(
        &self,
        base: LocatorBase,
        kind: LocatorKind,
        body: &TextOrRegex,
        options: &LocatorOptions,
    ) -> String {
        let class = match base {
            LocatorBase::Page => "Page",
            LocatorBase::FrameLocator => "FrameLocator",
            LocatorBase::Locator => "Locator",
        };
        let raw = body_text(body);
        let exact = options.exact.unwrap_or(false);
        match kind {
            LocatorKind::Default => {
                if let Some(has_text) = &options.has_text {
                    format!(
                        "locator({}, new {class}.LocatorOptions().setHasText({}))",
                        Self::quote(&raw),
                        Self::text_or_regex(has_text)
                    )
                } else if let Some(has_not_text) = &options.has_not_text {
                    format!(
                        "locator({}, new {class}.LocatorOptions().setHasNotText({}))",
                        Self::quote(&raw),
                        Self::text_or_regex(has_not_text)
                    )
                } else {
                    format!("locator({})", Self::quote(&raw))
                }
            }
            LocatorKind::Frame => format!("frameLocator({})", Self::quote(&raw)),
            LocatorKind::Nth => format!("nth({raw})"),
            LocatorKind::First => "first()".to_string(),
            LocatorKind::Last => "last()".to_string(),
            LocatorKind::Role => {
                let mut setters = String::new();
                match &options.name {
                    Some(TextOrRegex::Regex(re)) => {
                        setters.push_str(&format!(".setName({})", Self::regex(re)));
                    }
                    Some(TextOrRegex::Text(name)) => {
                        setters.push_str(&format!(".setName({})", Self::quote(name)));
                        if exact {
                            setters.push_str(".setExact(true)");
                        }
                    }
                    None => {}
                }
                for (name, value) in &options.attrs {
                    let value = value
                        .as_str()
                        .map_or_else(|| value.to_string(), Self::quote);
                    setters.push_str(&format!(".set{}({value})", to_title_case(name)));
                }
                let options = if setters.is_empty() {
                    String::new()
                } else {
                    format!(", new {class}.GetByRoleOptions(){setters}")
                };
                format!(
                    "getByRole(AriaRole.{}{options})",
                    to_snake_case(&raw).to_uppercase()
                )
            }
            LocatorKind::HasText => format!(
                "filter(new {class}.FilterOptions().setHasText({}))",
                Self::text_or_regex(body)
            ),
            LocatorKind::HasNotText => format!(
                "filter(new {class}.FilterOptions().setHasNotText({}))",
                Self::text_or_regex(body)
            ),
            LocatorKind::Has => format!("filter(new {class}.FilterOptions().setHas({raw}))"),
            LocatorKind::HasNot => format!("filter(new {class}.FilterOptions().setHasNot({raw}))"),
            LocatorKind::And => format!("and({raw})"),
            LocatorKind::Or => format!("or({raw})"),
            LocatorKind::Chain => format!("locator({raw})"),
            LocatorKind::TestId => format!("getByTestId({})", Self::text_or_regex(body)),
            LocatorKind::Text => Self::call_with_exact(class, "getByText", body, exact),
            LocatorKind::Alt => Self::call_with_exact(class, "getByAltText", body, exact),
            LocatorKind::Placeholder => Self::call_with_exact(class, "getByPlaceholder", body, exact),
            LocatorKind::Label => Self::call_with_exact(class, "getByLabel", body, exact),
            LocatorKind::Title => Self::call_with_exact(class, "getByTitle", body, exact),
        }
    }

    fn chain_locators(&self, locators: &[String]) -> String {
        locators.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeValue;

    #[test]
    fn test_role_with_options() {
        let options = LocatorOptions {
            name: Some(TextOrRegex::Text("Submit".to_string())),
            exact: Some(true),
            attrs: vec![("pressed".to_string(), AttributeValue::Bool(true))],
            ..LocatorOptions::default()
        };
        assert_eq!(
            JavaLocatorFactory.generate_locator(
                LocatorBase::Locator,
                LocatorKind::Role,
                &TextOrRegex::Text("button".to_string()),
                &options
            ),
            "getByRole(AriaRole.BUTTON, new Locator.GetByRoleOptions().setName(\"Submit\").setExact(true).setPressed(true))"
        );
    }

    #[test]
    fn test_exact_text_options_class() {
        let options = LocatorOptions {
            exact: Some(true),
            ..LocatorOptions::default()
        };
        assert_eq!(
            JavaLocatorFactory.generate_locator(
                LocatorBase::Page,
                LocatorKind::Text,
                &TextOrRegex::Text("Hi".to_string()),
                &options
            ),
            "getByText(\"Hi\", new Page.GetByTextOptions().setExact(true))"
        );
    }
}
