//! Length of text, bytes and collections

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Bounds, Rule, RuleError, Strategy, Template};

const MIN: &str = "Required to be a minimum of {min} characters in length.";
const MAX: &str = "Exceeds maximum length of {max}.";
const EXACT: &str = "The length must be exactly {len} characters.";
const RANGE: &str = "The length must fall within the range {min} - {max} characters.";

/// Checks the length of a value against `min`/`max`.
///
/// Text is measured in characters. A value without a length (a number, a
/// date) fails any bounded strategy. `None` always passes.
///
/// Templates may use `{min}`, `{max}` and `{len}`.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Length, Rule, Strategy};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let rule = Length::between(2, 3).unwrap();
/// assert_eq!(rule.strategy(), Strategy::Range);
///
/// let mut errors = Vec::new();
/// assert!(rule.validate(&Value::from("ab"), "f", &model, &mut errors, &NoTranslation));
/// assert!(!rule.validate(&Value::from("abcd"), "f", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["The length must fall within the range 2 - 3 characters."]);
///
/// assert!(Length::between(3, 2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    bounds: Bounds<usize>,
    message: Option<Template>,
}

impl Length {
    /// Select the strategy from optional bounds.
    pub fn new(min: Option<usize>, max: Option<usize>) -> Result<Self, RuleError> {
        Ok(Self {
            bounds: Bounds::select(min, max, |a, b| a.partial_cmp(b))?,
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

    /// At least `min`.
    pub fn at_least(min: usize) -> Self {
        Self {
            bounds: Bounds::Min(min),
            message: None,
        }
    }

    /// At most `max`.
    pub fn at_most(max: usize) -> Self {
        Self {
            bounds: Bounds::Max(max),
            message: None,
        }
    }

    /// Exactly `len`.
    pub fn exactly(len: usize) -> Self {
        Self {
            bounds: Bounds::Exact(len),
            message: None,
        }
    }

    /// Within `min..=max`; equal bounds select the exact strategy.
    pub fn between(min: usize, max: usize) -> Result<Self, RuleError> {
        Self::new(Some(min), Some(max))
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
        let (template, min, max) = match &self.bounds {
            Bounds::Unbounded => ("", 0, 0),
            Bounds::Min(min) => (MIN, *min, 0),
            Bounds::Max(max) => (MAX, 0, *max),
            Bounds::Exact(len) => (EXACT, *len, *len),
            Bounds::Range(min, max) => (RANGE, *min, *max),
        };
        let template = self.message.as_deref().unwrap_or(template);
        render(
            translate,
            template,
            &[("min", &min), ("max", &max), ("len", &min)],
        )
    }
}

impl Rule for Length {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if value.is_none() || self.bounds == Bounds::Unbounded {
            return true;
        }
        let within = value
            .len()
            .is_some_and(|len| self.bounds.contains(|bound| Some(len.cmp(bound))));
        if !within {
            result.push(self.failure(translate));
        }
        within
    }
}
