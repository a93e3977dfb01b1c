//! Bounds on ordered values

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Bounds, Rule, RuleError, Strategy, Template};

const MIN: &str = "The value must be greater or equal to {min}.";
const MAX: &str = "The value must be less or equal to {max}.";
const EXACT: &str = "The value must be exactly {min}.";
const RANGE: &str = "The value must fall within the range {min} - {max}.";

/// Checks an ordered value (number, date, time, text) against `min`/`max`.
///
/// Integers, decimals and floats compare with each other. A value that
/// cannot be ordered against the bounds fails. `None` always passes.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Range, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let rule = Range::at_most(Decimal::from(15));
/// let mut errors = Vec::new();
///
/// assert!(rule.validate(&Value::from(Decimal::from(10)), "f", &model, &mut errors, &NoTranslation));
/// assert!(rule.validate(&Value::from(12), "f", &model, &mut errors, &NoTranslation));
/// assert!(!rule.validate(&Value::from(20.5), "f", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["The value must be less or equal to 15."]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    bounds: Bounds<Value>,
    message: Option<Template>,
}

impl Range {
    /// Select the strategy from optional bounds.
    ///
    /// Fails when `min > max` or the bounds cannot be ordered.
    pub fn new(min: Option<Value>, max: Option<Value>) -> Result<Self, RuleError> {
        Ok(Self {
            bounds: Bounds::select(min, max, Value::compare)?,
            message: None,
        })
    }

    /// No bounds: always succeeds.
    pub fn any() -> Self {
        Self {
            bounds: Bounds::Unbounded,
            message: None,
        }
    }

    /// Greater or equal to `min`.
    pub fn at_least(min: impl Into<Value>) -> Self {
        Self {
            bounds: Bounds::Min(min.into()),
            message: None,
        }
    }

    /// Less or equal to `max`.
    pub fn at_most(max: impl Into<Value>) -> Self {
        Self {
            bounds: Bounds::Max(max.into()),
            message: None,
        }
    }

    /// Equal to `value`.
    pub fn exactly(value: impl Into<Value>) -> Self {
        Self {
            bounds: Bounds::Exact(value.into()),
            message: None,
        }
    }

    /// Within `min..=max`.
    pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Result<Self, RuleError> {
        Self::new(Some(min.into()), Some(max.into()))
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = Some(template.into());
        self
    }

    /// The selected strategy.
    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.bounds.strategy()
    }

    fn failure(&self, translate: &dyn Translate) -> String {
        let none = Value::None;
        let (template, min, max) = match &self.bounds {
            Bounds::Unbounded => ("", &none, &none),
            Bounds::Min(min) => (MIN, min, &none),
            Bounds::Max(max) => (MAX, &none, max),
            Bounds::Exact(exact) => (EXACT, exact, exact),
            Bounds::Range(min, max) => (RANGE, min, max),
        };
        let template = self.message.as_deref().unwrap_or(template);
        render(translate, template, &[("min", min), ("max", max)])
    }
}

impl Rule for Range {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if value.is_none() {
            return true;
        }
        let within = self.bounds.contains(|bound| value.compare(bound));
        if !within {
            result.push(self.failure(translate));
        }
        within
    }
}
