//! Presence rules: [`Required`], [`NotNone`], [`Missing`] and [`Ignore`]

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::{min_sentinels, Value};

use super::{Rule, Template};

const REQUIRED: &str = "Required field cannot be left blank.";
const MISSING: &str = "Field cannot have a value.";

/// Fails when the value is falsy or one of the "deemed missing" sentinels.
///
/// The default sentinels are the minimum date, time and datetime, which
/// form widgets use as placeholders for "not picked".
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Required, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use chrono::NaiveDate;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let rule = Required::new();
/// let mut errors = Vec::new();
///
/// assert!(rule.validate(&Value::from("abc"), "f", &model, &mut errors, &NoTranslation));
/// assert!(!rule.validate(&Value::from(0), "f", &model, &mut errors, &NoTranslation));
/// let unpicked = Value::from(NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
/// assert!(!rule.validate(&unpicked, "f", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Required {
    sentinels: Vec<Value>,
    message: Template,
}

impl Required {
    /// Required with the default sentinels.
    pub fn new() -> Self {
        Self {
            sentinels: min_sentinels(),
            message: Template::Borrowed(REQUIRED),
        }
    }

    /// Replace the set of values deemed missing.
    pub fn with_sentinels(mut self, sentinels: impl IntoIterator<Item = Value>) -> Self {
        self.sentinels = sentinels.into_iter().collect();
        self
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }

    /// The message template.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Required {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if value.is_truthy() && !self.sentinels.contains(value) {
            return true;
        }
        result.push(render(translate, &self.message, &[]));
        false
    }
}

/// Fails only when the value is `None`; empty strings and zero pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NotNone {
    message: Template,
}

impl NotNone {
    /// NotNone with the default message.
    pub fn new() -> Self {
        Self {
            message: Template::Borrowed(REQUIRED),
        }
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }
}

impl Default for NotNone {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NotNone {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if !value.is_none() {
            return true;
        }
        result.push(render(translate, &self.message, &[]));
        false
    }
}

/// The inverse of [`Required`]: passes when the value is falsy or a
/// sentinel, fails when it carries anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Missing {
    sentinels: Vec<Value>,
    message: Template,
}

impl Missing {
    /// Missing with the default sentinels.
    pub fn new() -> Self {
        Self {
            sentinels: min_sentinels(),
            message: Template::Borrowed(MISSING),
        }
    }

    /// Replace the set of values deemed missing.
    pub fn with_sentinels(mut self, sentinels: impl IntoIterator<Item = Value>) -> Self {
        self.sentinels = sentinels.into_iter().collect();
        self
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }
}

impl Default for Missing {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Missing {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if !value.is_truthy() || self.sentinels.contains(value) {
            return true;
        }
        result.push(render(translate, &self.message, &[]));
        false
    }
}

/// Always succeeds. A placeholder where a rule list is expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ignore;

impl Rule for Ignore {
    #[inline]
    fn validate(
        &self,
        _value: &Value,
        _name: &str,
        _model: &dyn Model,
        _result: &mut Vec<String>,
        _translate: &dyn Translate,
    ) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::NoTranslation;
    use std::collections::BTreeMap;

    fn run(rule: &dyn Rule, value: Value, errors: &mut Vec<String>) -> bool {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        rule.validate(&value, "field", &model, errors, &NoTranslation)
    }

    #[test]
    fn test_required() {
        let rule = Required::new().with_message("required");
        let mut errors = Vec::new();

        assert!(!run(&rule, Value::None, &mut errors));
        assert_eq!(errors, ["required"]);

        errors.clear();
        assert!(run(&rule, Value::from("abc"), &mut errors));
        assert!(run(&rule, Value::from(1), &mut errors));
        assert!(errors.is_empty());

        for sentinel in min_sentinels() {
            assert!(!run(&rule, sentinel, &mut errors));
        }
        assert_eq!(rule.message(), "required");
    }

    #[test]
    fn test_required_default_message() {
        let mut errors = Vec::new();
        assert!(!run(&Required::default(), Value::from(""), &mut errors));
        assert_eq!(errors, [REQUIRED]);
    }

    #[test]
    fn test_required_custom_sentinels() {
        let rule = Required::new().with_sentinels([Value::from("n/a")]);
        let mut errors = Vec::new();
        assert!(!run(&rule, Value::from("n/a"), &mut errors));
        assert!(run(&rule, min_sentinels().remove(0), &mut errors));
    }

    #[test]
    fn test_missing() {
        let rule = Missing::new().with_message("missing");
        let mut errors = Vec::new();

        assert!(!run(&rule, Value::from(1), &mut errors));
        assert_eq!(errors, ["missing"]);

        errors.clear();
        assert!(run(&rule, Value::None, &mut errors));
        assert!(run(&rule, Value::from(""), &mut errors));
        assert!(run(&rule, Value::from(0), &mut errors));
        for sentinel in min_sentinels() {
            assert!(run(&rule, sentinel, &mut errors));
        }
        assert!(errors.is_empty());
    }

    #[test]
    fn test_not_none() {
        let mut errors = Vec::new();
        assert!(run(&NotNone::new(), Value::from(""), &mut errors));
        assert!(run(&NotNone::new(), Value::from(0), &mut errors));
        assert!(!run(&NotNone::new(), Value::None, &mut errors));
        assert_eq!(errors, [REQUIRED]);
    }

    #[test]
    fn test_ignore() {
        let mut errors = Vec::new();
        assert!(run(&Ignore, Value::None, &mut errors));
        assert!(run(&Ignore, Value::from(100), &mut errors));
        assert!(run(&Ignore, Value::from("x"), &mut errors));
        assert!(errors.is_empty());
    }
}
