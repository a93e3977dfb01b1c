//! Comparison with another field of the same model

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Rule, Template};

const EQUAL: &str = "The value failed equality comparison with {comparand}.";
const NOT_EQUAL: &str = "The value failed not equal comparison with {comparand}.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Comparison {
    None,
    Equal(String),
    NotEqual(String),
}

/// Compares the value with another field's current value.
///
/// The other field is read through the [`Model`] at validation time; a
/// field the model lacks reads as `None`. `None` values always pass.
/// Numbers of different kinds are equal when their values are.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Compare, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model = BTreeMap::from([
///     ("password".to_string(), Value::from("secret")),
///     ("confirm".to_string(), Value::from("secrets")),
/// ]);
/// let rule = Compare::equal("password");
/// let mut errors = Vec::new();
///
/// assert!(!rule.validate(&model["confirm"], "confirm", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["The value failed equality comparison with password."]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    comparison: Comparison,
    message: Option<Template>,
}

impl Compare {
    /// Always succeeds; no comparand configured.
    pub fn none() -> Self {
        Self {
            comparison: Comparison::None,
            message: None,
        }
    }

    /// Must equal the field `other`.
    pub fn equal(other: impl Into<String>) -> Self {
        Self {
            comparison: Comparison::Equal(other.into()),
            message: None,
        }
    }

    /// Must differ from the field `other`.
    pub fn not_equal(other: impl Into<String>) -> Self {
        Self {
            comparison: Comparison::NotEqual(other.into()),
            message: None,
        }
    }

    /// Override the message template. `{comparand}` is the other field.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = Some(template.into());
        self
    }

    /// Name of the field compared against, if any.
    pub fn comparand(&self) -> Option<&str> {
        match &self.comparison {
            Comparison::None => None,
            Comparison::Equal(other) | Comparison::NotEqual(other) => Some(other),
        }
    }
}

impl Default for Compare {
    fn default() -> Self {
        Self::none()
    }
}

impl Rule for Compare {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if value.is_none() {
            return true;
        }
        let (other, expect_equal, template) = match &self.comparison {
            Comparison::None => return true,
            Comparison::Equal(other) => (other, true, EQUAL),
            Comparison::NotEqual(other) => (other, false, NOT_EQUAL),
        };
        let comparand = model.get(other).unwrap_or_default();
        if value.same_as(&comparand) == expect_equal {
            return true;
        }
        let template = self.message.as_deref().unwrap_or(template);
        result.push(render(translate, template, &[("comparand", other)]));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::NoTranslation;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn model() -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("previous".to_string(), Value::from("x")),
            ("count".to_string(), Value::from(1)),
        ])
    }

    fn check(rule: &Compare, value: impl Into<Value>, errors: &mut Vec<String>) -> bool {
        rule.validate(&value.into(), "f", &model(), errors, &NoTranslation)
    }

    #[test]
    fn test_compare_strategies() {
        assert_eq!(Compare::none().comparand(), None);
        assert_eq!(Compare::equal("previous").comparand(), Some("previous"));
        assert_eq!(Compare::not_equal("previous").comparand(), Some("previous"));
    }

    #[test]
    fn test_compare_succeed() {
        let mut errors = Vec::new();
        assert!(check(&Compare::default(), "anything", &mut errors));
        assert!(check(&Compare::equal("previous"), Value::None, &mut errors));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_compare_check_equal() {
        let rule = Compare::equal("previous").with_message("equal {comparand}");
        let mut errors = Vec::new();
        assert!(check(&rule, "x", &mut errors));
        assert!(errors.is_empty());
        assert!(!check(&rule, "z", &mut errors));
        assert_eq!(errors, ["equal previous"]);
    }

    #[test]
    fn test_compare_check_not_equal() {
        let rule = Compare::not_equal("previous");
        let mut errors = Vec::new();
        assert!(check(&rule, "z", &mut errors));
        assert!(!check(&rule, "x", &mut errors));
        assert_eq!(
            errors,
            ["The value failed not equal comparison with previous."]
        );
    }

    #[test]
    fn test_compare_across_numeric_kinds() {
        let amounts = BTreeMap::from([
            ("amount".to_string(), Value::Decimal(Decimal::ONE)),
            ("rate".to_string(), Value::from(1.0)),
        ]);
        let mut errors = Vec::new();
        let mut check = |rule: Compare, value: Value| {
            rule.validate(&value, "f", &amounts, &mut errors, &NoTranslation)
        };

        assert!(check(Compare::equal("amount"), Value::from(1)));
        assert!(check(Compare::equal("rate"), Value::from(1)));
        assert!(check(Compare::equal("rate"), Value::Decimal(Decimal::ONE)));
        assert!(!check(Compare::not_equal("amount"), Value::from(1)));
        assert!(!check(Compare::equal("amount"), Value::from(2)));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_compare_missing_field_reads_as_none() {
        let mut errors = Vec::new();
        assert!(!check(&Compare::equal("absent"), 1, &mut errors));
        assert!(check(&Compare::not_equal("absent"), 1, &mut errors));
    }
}
