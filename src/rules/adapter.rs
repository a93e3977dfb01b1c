//! Integer conversion in front of another rule

use rust_decimal::prelude::ToPrimitive;

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Rule, RuleExt, RuleRef, Template};

const INT_ADAPTER: &str = "Required to be a valid integer.";

/// Converts the value to an integer, then delegates to the wrapped rule.
///
/// Text is parsed after trimming; decimals and floats are truncated;
/// booleans read as `0`/`1`. A value that cannot be converted fails with a
/// single message and the wrapped rule is not run. `None` is handed to the
/// wrapped rule unchanged.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{IntAdapter, Range, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let positive = IntAdapter::new(Range::at_least(1));
/// let mut errors = Vec::new();
///
/// assert!(positive.validate(&Value::from("100"), "n", &model, &mut errors, &NoTranslation));
/// assert!(!positive.validate(&Value::from("X"), "n", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["Required to be a valid integer."]);
/// ```
#[derive(Debug, Clone)]
pub struct IntAdapter {
    rule: RuleRef,
    message: Template,
}

impl IntAdapter {
    /// Wrap `rule`.
    pub fn new(rule: impl RuleExt) -> Self {
        Self {
            rule: rule.shared(),
            message: Template::Borrowed(INT_ADAPTER),
        }
    }

    /// Override the conversion failure message.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }
}

fn to_int(value: &Value) -> Option<Value> {
    let int = match value {
        Value::None => return Some(Value::None),
        Value::Int(i) => *i,
        Value::Str(s) => s.trim().parse().ok()?,
        Value::Decimal(d) => d.trunc().to_i64()?,
        Value::Float(f) if f.is_finite() => f.trunc().to_i64()?,
        Value::Bool(b) => i64::from(*b),
        _ => return None,
    };
    Some(Value::Int(int))
}

impl Rule for IntAdapter {
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        match to_int(value) {
            Some(int) => self.rule.validate(&int, name, model, result, translate),
            None => {
                result.push(render(translate, &self.message, &[]));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Range;
    use crate::translate::NoTranslation;
    use std::collections::BTreeMap;

    #[test]
    fn test_adapter() {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        let rule = IntAdapter::new(Range::at_least(1));
        let mut errors = Vec::new();
        let check = |v: Value, errors: &mut Vec<String>| {
            rule.validate(&v, "f", &model, errors, &NoTranslation)
        };

        assert!(check(Value::None, &mut errors));
        assert!(check(Value::from("100"), &mut errors));
        assert!(check(Value::from(" 1 "), &mut errors));
        assert!(errors.is_empty());

        assert!(!check(Value::from("0"), &mut errors));
        assert_eq!(errors, ["The value must be greater or equal to 1."]);
        errors.clear();

        assert!(!check(Value::from("X"), &mut errors));
        assert_eq!(errors, [INT_ADAPTER]);
    }

    #[test]
    fn test_to_int_conversions() {
        assert_eq!(to_int(&Value::from(2.9)), Some(Value::Int(2)));
        assert_eq!(to_int(&Value::from(true)), Some(Value::Int(1)));
        assert_eq!(to_int(&Value::from(f64::NAN)), None);
        assert_eq!(to_int(&Value::from(vec![1])), None);
    }
}
