//! Validation rules
//!
//! A [`Rule`] checks one field's value. On failure it appends one or more
//! messages to the field's result list and returns `false`; it never
//! panics or returns an error at validation time. Misuse is caught when the
//! rule is built, as a [`RuleError`].
//!
//! Parametrized rules ([`Length`], [`Range`], [`RelativeDelta`]) pick a
//! fixed [`Strategy`] from their bounds at construction:
//!
//! - no bounds: always succeed
//! - only `min`: check the lower bound
//! - only `max`: check the upper bound
//! - `min == max`: check equality
//! - `min < max`: check the inclusive range
//!
//! These rules let a `None` value through; use [`Required`] to demand one.
//!
//! # Example
//!
//! ```rust
//! use stillform::rules::{Length, Required, Rule, Strategy};
//! use stillform::translate::NoTranslation;
//! use stillform::Value;
//! use std::collections::BTreeMap;
//!
//! let model: BTreeMap<String, Value> = BTreeMap::new();
//! let rule = Length::at_least(4);
//! assert_eq!(rule.strategy(), Strategy::Min);
//!
//! let mut messages = Vec::new();
//! assert!(!rule.validate(&Value::from("abc"), "name", &model, &mut messages, &NoTranslation));
//! assert_eq!(messages, ["Required to be a minimum of 4 characters in length."]);
//!
//! assert!(rule.validate(&Value::None, "name", &model, &mut messages, &NoTranslation));
//! assert!(!Required::new().validate(&Value::None, "name", &model, &mut messages, &NoTranslation));
//! ```

mod adapter;
mod combinators;
mod compare;
mod length;
mod one_of;
mod pattern;
mod predicate;
mod presence;
mod range;
mod relative;

pub use adapter::IntAdapter;
pub use combinators::{And, IteratorRule, Or};
pub use compare::Compare;
pub use length::Length;
pub use one_of::OneOf;
pub use pattern::{Base64, Email, Regex, Scientific, Slug};
pub use predicate::{must, Predicate, ValuePredicate};
pub use presence::{Ignore, Missing, NotNone, Required};
pub use range::Range;
pub use relative::{Clock, RelativeDelta};

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::model::Model;
use crate::translate::Translate;
use crate::value::Value;

/// A validation check over one field's value.
///
/// Rules are immutable once built and can be shared between threads.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Check `value`, the current value of field `name` in `model`.
    ///
    /// On failure, appends messages to `result` (each template translated
    /// once through `translate`, then interpolated) and returns `false`.
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool;
}

impl<R: Rule + ?Sized> Rule for Arc<R> {
    #[inline]
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        (**self).validate(value, name, model, result, translate)
    }
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    #[inline]
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        (**self).validate(value, name, model, result, translate)
    }
}

/// A shareable rule.
pub type RuleRef = Arc<dyn Rule>;

/// Conversion of any rule into a [`RuleRef`].
pub trait RuleExt: Rule + Sized + 'static {
    /// Wrap the rule for sharing between validators and combinators.
    fn shared(self) -> RuleRef {
        Arc::new(self)
    }
}

impl<R: Rule + 'static> RuleExt for R {}

/// Build a `Vec<RuleRef>` from rule expressions.
///
/// ```rust
/// use stillform::rules;
/// use stillform::rules::{Email, Length, Required};
///
/// let email_rules = rules![Required::new(), Length::at_most(30), Email::new()];
/// assert_eq!(email_rules.len(), 3);
/// ```
#[macro_export]
macro_rules! rules {
    ($($rule:expr),* $(,)?) => {
        ::std::vec![$($crate::rules::RuleExt::shared($rule)),*]
    };
}

/// Rule construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A combinator was given fewer than two rules.
    #[error("{rule} requires at least two rules, got {given}")]
    TooFewRules {
        /// Combinator name.
        rule: &'static str,
        /// Number of rules supplied.
        given: usize,
    },
    /// A rule that needs a non-empty list got an empty one.
    #[error("{0} requires a non-empty list")]
    Empty(&'static str),
    /// `min` is greater than `max`.
    #[error("lower bound {min} is greater than upper bound {max}")]
    InvertedBounds {
        /// Lower bound as given.
        min: String,
        /// Upper bound as given.
        max: String,
    },
    /// `min` and `max` cannot be ordered against each other.
    #[error("bounds {min} and {max} are not comparable")]
    IncomparableBounds {
        /// Lower bound as given.
        min: String,
        /// Upper bound as given.
        max: String,
    },
    /// A pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(String),
    /// Base64 alternate characters must be exactly two characters.
    #[error("alternate base64 characters must be two characters, got '{0}'")]
    AltChars(String),
}

impl From<regex::Error> for RuleError {
    fn from(err: regex::Error) -> Self {
        RuleError::Pattern(err.to_string())
    }
}

/// The check a parametrized rule is bound to, selected from its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// No bounds: always succeed.
    Succeed,
    /// Lower bound only.
    Min,
    /// Upper bound only.
    Max,
    /// `min == max`: exact match.
    Exact,
    /// Inclusive `min..=max`.
    Range,
}

/// Message template owned by a rule.
pub(crate) type Template = Cow<'static, str>;

/// Bounds resolved into a strategy at construction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Bounds<T> {
    Unbounded,
    Min(T),
    Max(T),
    Exact(T),
    Range(T, T),
}

impl<T: fmt::Display> Bounds<T> {
    /// Select the strategy for `min`/`max`, ordered with `cmp`.
    pub(crate) fn select(
        min: Option<T>,
        max: Option<T>,
        cmp: impl Fn(&T, &T) -> Option<Ordering>,
    ) -> Result<Self, RuleError> {
        match (min, max) {
            (None, None) => Ok(Bounds::Unbounded),
            (Some(min), None) => Ok(Bounds::Min(min)),
            (None, Some(max)) => Ok(Bounds::Max(max)),
            (Some(min), Some(max)) => match cmp(&min, &max) {
                Some(Ordering::Equal) => Ok(Bounds::Exact(min)),
                Some(Ordering::Less) => Ok(Bounds::Range(min, max)),
                Some(Ordering::Greater) => Err(RuleError::InvertedBounds {
                    min: min.to_string(),
                    max: max.to_string(),
                }),
                None => Err(RuleError::IncomparableBounds {
                    min: min.to_string(),
                    max: max.to_string(),
                }),
            },
        }
    }
}

impl<T> Bounds<T> {
    pub(crate) fn strategy(&self) -> Strategy {
        match self {
            Bounds::Unbounded => Strategy::Succeed,
            Bounds::Min(_) => Strategy::Min,
            Bounds::Max(_) => Strategy::Max,
            Bounds::Exact(_) => Strategy::Exact,
            Bounds::Range(..) => Strategy::Range,
        }
    }

    /// Map every bound; `None` if any mapping fails.
    pub(crate) fn try_map<U>(&self, mut f: impl FnMut(&T) -> Option<U>) -> Option<Bounds<U>> {
        Some(match self {
            Bounds::Unbounded => Bounds::Unbounded,
            Bounds::Min(min) => Bounds::Min(f(min)?),
            Bounds::Max(max) => Bounds::Max(f(max)?),
            Bounds::Exact(exact) => Bounds::Exact(f(exact)?),
            Bounds::Range(min, max) => Bounds::Range(f(min)?, f(max)?),
        })
    }

    /// Whether the checked value falls within the bounds.
    ///
    /// `cmp` orders the checked value against a bound; an incomparable
    /// value is out of bounds.
    pub(crate) fn contains(&self, cmp: impl Fn(&T) -> Option<Ordering>) -> bool {
        let at_least = |bound: &T| matches!(cmp(bound), Some(Ordering::Greater | Ordering::Equal));
        let at_most = |bound: &T| matches!(cmp(bound), Some(Ordering::Less | Ordering::Equal));
        match self {
            Bounds::Unbounded => true,
            Bounds::Min(min) => at_least(min),
            Bounds::Max(max) => at_most(max),
            Bounds::Exact(exact) => cmp(exact) == Some(Ordering::Equal),
            Bounds::Range(min, max) => at_least(min) && at_most(max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(min: Option<i32>, max: Option<i32>) -> Result<Bounds<i32>, RuleError> {
        Bounds::select(min, max, |a, b| a.partial_cmp(b))
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(select(None, None).unwrap().strategy(), Strategy::Succeed);
        assert_eq!(select(Some(2), None).unwrap().strategy(), Strategy::Min);
        assert_eq!(select(None, Some(2)).unwrap().strategy(), Strategy::Max);
        assert_eq!(select(Some(2), Some(2)).unwrap().strategy(), Strategy::Exact);
        assert_eq!(select(Some(1), Some(2)).unwrap().strategy(), Strategy::Range);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert_eq!(
            select(Some(3), Some(2)),
            Err(RuleError::InvertedBounds {
                min: "3".into(),
                max: "2".into()
            })
        );
    }

    #[test]
    fn test_contains() {
        let range = select(Some(2), Some(4)).unwrap();
        let check = |v: i32| range.contains(|b| v.partial_cmp(b));
        assert!(!check(1));
        assert!(check(2));
        assert!(check(4));
        assert!(!check(5));

        let exact = select(Some(2), Some(2)).unwrap();
        assert!(exact.contains(|b| 2.partial_cmp(b)));
        assert!(!exact.contains(|_| None));
        assert!(Bounds::<i32>::Unbounded.contains(|_| None));
    }

    #[test]
    fn test_try_map_propagates_failure() {
        let range = select(Some(2), Some(4)).unwrap();
        assert_eq!(range.try_map(|b| Some(b * 10)), Some(Bounds::Range(20, 40)));
        assert_eq!(range.try_map(|b| (*b > 2).then_some(*b)), None);
    }

    #[test]
    fn test_shared_rules_macro() {
        let list = crate::rules![Ignore, Required::new()];
        assert_eq!(list.len(), 2);
    }
}
