//! Membership in a fixed set of values

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Rule, RuleError, Template};

const ONE_OF: &str = "The value does not belong to the list of known items.";

/// Passes when the value is one of the allowed items.
///
/// `None` is checked like any other value: it passes only if the set
/// contains it. Numbers match across kinds, so `Decimal(1)` is one of
/// `[1, 2]`.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{OneOf, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let account_type = OneOf::try_new(["user", "business"]).unwrap();
/// let mut errors = Vec::new();
///
/// assert!(account_type.validate(&Value::from("user"), "t", &model, &mut errors, &NoTranslation));
/// assert!(!account_type.validate(&Value::from("x"), "t", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["The value does not belong to the list of known items."]);
///
/// assert!(OneOf::try_new(Vec::<Value>::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf {
    items: Vec<Value>,
    message: Template,
}

impl OneOf {
    /// Build from the allowed items; fails when there are none.
    pub fn try_new<I>(items: I) -> Result<Self, RuleError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(RuleError::Empty("OneOf"));
        }
        Ok(Self {
            items,
            message: Template::Borrowed(ONE_OF),
        })
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }

    /// The allowed items.
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

impl Rule for OneOf {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if self.items.iter().any(|item| item.same_as(value)) {
            return true;
        }
        result.push(render(translate, &self.message, &[]));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::NoTranslation;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    #[test]
    fn test_one_of() {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        let rule = OneOf::try_new([Value::from(1), Value::from(2), Value::from(3), Value::None])
            .unwrap();
        let mut errors = Vec::new();
        let mut check = |v: Value| rule.validate(&v, "f", &model, &mut errors, &NoTranslation);

        assert!(check(Value::None));
        assert!(check(Value::from(3)));
        assert!(!check(Value::from(7)));
        assert_eq!(errors, [ONE_OF]);
    }

    #[test]
    fn test_one_of_matches_across_numeric_kinds() {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        let rule = OneOf::try_new([1, 2]).unwrap();
        let mut errors = Vec::new();
        let mut check = |v: Value| rule.validate(&v, "f", &model, &mut errors, &NoTranslation);

        assert!(check(Value::Decimal(Decimal::ONE)));
        assert!(check(Value::from(2.0)));
        assert!(!check(Value::from(1.5)));
        assert!(!check(Value::from("1")));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_one_of_rejects_empty() {
        assert_eq!(
            OneOf::try_new(Vec::<&str>::new()),
            Err(RuleError::Empty("OneOf"))
        );
    }

    #[test]
    fn test_none_fails_unless_listed() {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        let rule = OneOf::try_new(["a"]).unwrap().with_message("unknown");
        let mut errors = Vec::new();
        assert!(!rule.validate(&Value::None, "f", &model, &mut errors, &NoTranslation));
        assert_eq!(errors, ["unknown"]);
        assert_eq!(rule.items(), [Value::from("a")]);
    }
}
