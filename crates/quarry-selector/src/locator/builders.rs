//! Selector text for the `getBy*` locator methods.
//!
//! Each builder produces the `internal:*` part that the corresponding
//! locator call stands for, so `getByText('Hi', { exact: true })` is
//! `internal:text="Hi"s`.

use crate::string_utils::{TextOrRegex, escape_for_attribute_selector, escape_for_text_selector};

/// A `checked` or `pressed` option, which also accepts `"mixed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// `false`
    Off,
    /// `true`
    On,
    /// `"mixed"`
    Mixed,
}

impl RoleState {
    /// The attribute-selector value text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "false",
            Self::On => "true",
            Self::Mixed => "\"mixed\"",
        }
    }
}

impl From<bool> for RoleState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Options of `getByRole`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ByRoleOptions {
    /// `aria-checked` state.
    pub checked: Option<RoleState>,
    /// `aria-disabled` state.
    pub disabled: Option<bool>,
    /// `aria-selected` state.
    pub selected: Option<bool>,
    /// `aria-expanded` state.
    pub expanded: Option<bool>,
    /// Also match elements hidden from the accessibility tree.
    pub include_hidden: Option<bool>,
    /// Heading level.
    pub level: Option<u32>,
    /// Accessible name.
    pub name: Option<TextOrRegex>,
    /// Match `name` exactly.
    pub exact: bool,
    /// `aria-pressed` state.
    pub pressed: Option<RoleState>,
}

/// `internal:role=button[name="OK"i]`
#[must_use]
pub fn get_by_role_selector(role: &str, options: &ByRoleOptions) -> String {
    let mut props: Vec<(&str, String)> = Vec::new();
    if let Some(checked) = options.checked {
        props.push(("checked", checked.as_str().to_string()));
    }
    let flags = [
        ("disabled", options.disabled),
        ("selected", options.selected),
        ("expanded", options.expanded),
        ("include-hidden", options.include_hidden),
    ];
    for (name, value) in flags {
        if let Some(value) = value {
            props.push((name, value.to_string()));
        }
    }
    if let Some(level) = options.level {
        props.push(("level", level.to_string()));
    }
    if let Some(name) = &options.name {
        props.push(("name", escape_for_attribute_selector(name, options.exact)));
    }
    if let Some(pressed) = options.pressed {
        props.push(("pressed", pressed.as_str().to_string()));
    }
    let props: String = props
        .into_iter()
        .map(|(name, value)| format!("[{name}={value}]"))
        .collect();
    format!("internal:role={role}{props}")
}

/// `internal:text="Hi"i`
#[must_use]
pub fn get_by_text_selector(text: &TextOrRegex, exact: bool) -> String {
    format!("internal:text={}", escape_for_text_selector(text, exact))
}

/// `internal:label="Email"i`
#[must_use]
pub fn get_by_label_selector(text: &TextOrRegex, exact: bool) -> String {
    format!("internal:label={}", escape_for_text_selector(text, exact))
}

fn get_by_attribute_text_selector(attribute: &str, text: &TextOrRegex, exact: bool) -> String {
    format!(
        "internal:attr=[{attribute}={}]",
        escape_for_attribute_selector(text, exact)
    )
}

/// `internal:attr=[alt="Logo"i]`
#[must_use]
pub fn get_by_alt_text_selector(text: &TextOrRegex, exact: bool) -> String {
    get_by_attribute_text_selector("alt", text, exact)
}

/// `internal:attr=[title="Close"i]`
#[must_use]
pub fn get_by_title_selector(text: &TextOrRegex, exact: bool) -> String {
    get_by_attribute_text_selector("title", text, exact)
}

/// `internal:attr=[placeholder="Search"i]`
#[must_use]
pub fn get_by_placeholder_selector(text: &TextOrRegex, exact: bool) -> String {
    get_by_attribute_text_selector("placeholder", text, exact)
}

/// `internal:testid=[data-testid="save"s]`. Test ids always match exactly.
#[must_use]
pub fn get_by_test_id_selector(test_id_attribute: &str, test_id: &TextOrRegex) -> String {
    format!(
        "internal:testid=[{test_id_attribute}={}]",
        escape_for_attribute_selector(test_id, true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_property_order() {
        let options = ByRoleOptions {
            pressed: Some(RoleState::On),
            name: Some(TextOrRegex::Text("Bold".to_string())),
            checked: Some(RoleState::Off),
            level: Some(3),
            ..ByRoleOptions::default()
        };
        assert_eq!(
            get_by_role_selector("button", &options),
            "internal:role=button[checked=false][level=3][name=\"Bold\"i][pressed=true]"
        );
    }

    #[test]
    fn test_mixed_state_is_quoted() {
        let options = ByRoleOptions {
            checked: Some(RoleState::Mixed),
            ..ByRoleOptions::default()
        };
        assert_eq!(
            get_by_role_selector("checkbox", &options),
            "internal:role=checkbox[checked=\"mixed\"]"
        );
    }

    #[test]
    fn test_test_id_is_exact() {
        assert_eq!(
            get_by_test_id_selector("data-qa", &TextOrRegex::Text("save".to_string())),
            "internal:testid=[data-qa=\"save\"s]"
        );
    }
}
