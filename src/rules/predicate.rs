//! Rules wrapping arbitrary checks

use std::fmt;
use std::sync::Arc;

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Rule, Template};

const PREDICATE: &str = "Required to satisfy validation predicate condition.";

type ModelCheck = dyn Fn(&dyn Model) -> bool + Send + Sync;
type ValueCheck = dyn Fn(&Value) -> bool + Send + Sync;

/// Checks a condition over the whole model.
///
/// Useful for cross-field constraints. The value under test is ignored.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Predicate, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model = BTreeMap::from([
///     ("start".to_string(), Value::from(5)),
///     ("end".to_string(), Value::from(3)),
/// ]);
/// let ordered = Predicate::new(|m| match (m.get("start"), m.get("end")) {
///     (Some(start), Some(end)) => start.compare(&end).is_some_and(|o| o.is_le()),
///     _ => true,
/// })
/// .with_message("Start must not be after end.");
///
/// let mut errors = Vec::new();
/// assert!(!ordered.validate(&Value::None, "end", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["Start must not be after end."]);
/// ```
#[derive(Clone)]
pub struct Predicate {
    check: Arc<ModelCheck>,
    message: Template,
}

impl Predicate {
    /// Wrap a model-level check.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&dyn Model) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: Template::Borrowed(PREDICATE),
        }
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Rule for Predicate {
    fn validate(
        &self,
        _value: &Value,
        _name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if (self.check)(model) {
            return true;
        }
        result.push(render(translate, &self.message, &[]));
        false
    }
}

/// Checks a condition over the value alone.
#[derive(Clone)]
pub struct ValuePredicate {
    check: Arc<ValueCheck>,
    message: Template,
}

impl ValuePredicate {
    /// Wrap a value-level check.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            message: Template::Borrowed(PREDICATE),
        }
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }
}

impl fmt::Debug for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePredicate")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Rule for ValuePredicate {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if (self.check)(value) {
            return true;
        }
        result.push(render(translate, &self.message, &[]));
        false
    }
}

/// Shorthand for [`ValuePredicate::new`].
///
/// ```rust
/// use stillform::rules::{must, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let even = must(|v| v.as_int().is_some_and(|i| i % 2 == 0));
/// let mut errors = Vec::new();
/// assert!(even.validate(&Value::from(4), "n", &model, &mut errors, &NoTranslation));
/// assert!(!even.validate(&Value::from(3), "n", &model, &mut errors, &NoTranslation));
/// ```
pub fn must<F>(check: F) -> ValuePredicate
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    ValuePredicate::new(check)
}
