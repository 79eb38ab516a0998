//! Machine-readable locators: one JSON object per call, chained through a
//! `next` field.
//!
//! ```text
//! {"kind":"role","body":"button","options":{"attrs":[],"exact":false,"name":"OK"},"next":{...}}
//! ```
//!
//! Patterns are written in `/source/flags` form.

use serde_json::{Map, Number, Value, json};

use super::javascript::body_text;
use super::{LocatorBase, LocatorFactory, LocatorKind, LocatorOptions};
use crate::attribute::AttributeValue;
use crate::string_utils::TextOrRegex;

/// Renders JSONL locator objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlLocatorFactory;

fn text_value(body: &TextOrRegex) -> Value {
    Value::String(body_text(body))
}

fn attribute_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Number(n) => number_value(*n),
        AttributeValue::String(s) => Value::String(s.clone()),
        AttributeValue::Regex(re) => Value::String(re.to_string()),
    }
}

/// Integral numbers are written without a fraction, as JSON.stringify does.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl LocatorFactory for JsonlLocatorFactory {
    fn generate_locator(
        &self,
        _base: LocatorBase,
        kind: LocatorKind,
        body: &TextOrRegex,
        options: &LocatorOptions,
    ) -> String {
        let mut object = Map::new();
        if kind == LocatorKind::Role {
            let attrs = options
                .attrs
                .iter()
                .map(|(name, value)| json!({ "name": name, "value": attribute_value(value) }))
                .collect();
            let _ = object.insert("attrs".to_string(), Value::Array(attrs));
        }
        if let Some(exact) = options.exact {
            let _ = object.insert("exact".to_string(), Value::Bool(exact));
        }
        if let Some(name) = &options.name {
            let _ = object.insert("name".to_string(), text_value(name));
        }
        if let Some(has_text) = &options.has_text {
            let _ = object.insert("hasText".to_string(), text_value(has_text));
        }
        if let Some(has_not_text) = &options.has_not_text {
            let _ = object.insert("hasNotText".to_string(), text_value(has_not_text));
        }
        json!({
            "kind": kind.to_string(),
            "body": text_value(body),
            "options": Value::Object(object),
        })
        .to_string()
    }

    fn chain_locators(&self, locators: &[String]) -> String {
        let mut objects: Vec<Value> = locators
            .iter()
            .filter_map(|locator| serde_json::from_str(locator).ok())
            .collect();
        let mut chained: Option<Value> = None;
        while let Some(mut object) = objects.pop() {
            if let (Some(next), Value::Object(map)) = (chained.take(), &mut object) {
                let _ = map.insert("next".to_string(), next);
            }
            chained = Some(object);
        }
        chained.map(|value| value.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_object() {
        let options = LocatorOptions {
            attrs: vec![("level".to_string(), AttributeValue::Number(2.0))],
            ..LocatorOptions::default()
        };
        let locator = JsonlLocatorFactory.generate_locator(
            LocatorBase::Page,
            LocatorKind::Role,
            &TextOrRegex::Text("heading".to_string()),
            &options,
        );
        assert_eq!(
            locator,
            r#"{"kind":"role","body":"heading","options":{"attrs":[{"name":"level","value":2}]}}"#
        );
    }

    #[test]
    fn test_chain_nests_through_next() {
        let factory = JsonlLocatorFactory;
        let first = factory.generate_locator(
            LocatorBase::Page,
            LocatorKind::Default,
            &TextOrRegex::Text("div".to_string()),
            &LocatorOptions::default(),
        );
        let second = factory.generate_locator(
            LocatorBase::Locator,
            LocatorKind::Nth,
            &TextOrRegex::Text("1".to_string()),
            &LocatorOptions::default(),
        );
        assert_eq!(
            factory.chain_locators(&[first, second]),
            r#"{"kind":"default","body":"div","options":{},"next":{"kind":"nth","body":"1","options":{}}}"#
        );
    }
}
