//! Testing utilities for rules, validators and model updates
//!
//! This module provides assertion macros for validators, a helper that runs
//! a single rule against a value, and (with the `proptest` feature)
//! strategies for generating values and localized numeric input.
//!
//! # Examples
//!
//! ## Running one rule
//!
//! ```rust
//! use stillform::rules::Length;
//! use stillform::testing::run_rule;
//!
//! assert_eq!(run_rule(&Length::at_most(3), "abc"), Ok(()));
//! assert_eq!(
//!     run_rule(&Length::at_most(2), "abc"),
//!     Err(vec!["Exceeds maximum length of 2.".to_string()])
//! );
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use stillform::rules::Required;
//! use stillform::validator::Validator;
//! use stillform::{assert_field_errors, assert_invalid, assert_valid, rules, Value};
//! use std::collections::BTreeMap;
//!
//! let validator = Validator::new().field("name", rules![Required::new()]);
//!
//! let valid = BTreeMap::from([("name".to_string(), Value::from("john"))]);
//! assert_valid!(validator, &valid);
//!
//! let invalid = BTreeMap::from([("name".to_string(), Value::from(""))]);
//! let errors = assert_invalid!(validator, &invalid);
//! assert_field_errors!(errors, "name", ["Required field cannot be left blank."]);
//! ```

use std::collections::BTreeMap;

use crate::rules::Rule;
use crate::translate::NoTranslation;
use crate::value::Value;

/// Run `rule` against `value` with an empty model and no translation.
///
/// Returns the messages the rule recorded when it fails.
pub fn run_rule(rule: &dyn Rule, value: impl Into<Value>) -> Result<(), Vec<String>> {
    let model: BTreeMap<String, Value> = BTreeMap::new();
    let mut messages = Vec::new();
    if rule.validate(&value.into(), "value", &model, &mut messages, &NoTranslation) {
        Ok(())
    } else {
        Err(messages)
    }
}

/// Assert that a validator accepts a model.
///
/// Panics with the collected errors otherwise.
///
/// # Example
///
/// ```rust
/// use stillform::validator::Validator;
/// use stillform::{assert_valid, Value};
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// assert_valid!(Validator::new(), &model);
/// ```
#[macro_export]
macro_rules! assert_valid {
    ($validator:expr, $model:expr) => {
        if let ::std::result::Result::Err(errors) = $validator.check($model) {
            panic!("Expected model to be valid, got errors: {:?}", errors);
        }
    };
}

/// Assert that a validator rejects a model, evaluating to the errors.
///
/// # Example
///
/// ```rust
/// use stillform::rules::Required;
/// use stillform::validator::Validator;
/// use stillform::{assert_invalid, rules, Value};
/// use std::collections::BTreeMap;
///
/// let validator = Validator::new().field("name", rules![Required::new()]);
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let errors = assert_invalid!(validator, &model);
/// assert!(errors.contains("name"));
/// ```
#[macro_export]
macro_rules! assert_invalid {
    ($validator:expr, $model:expr) => {
        match $validator.check($model) {
            ::std::result::Result::Err(errors) => errors,
            ::std::result::Result::Ok(()) => {
                panic!("Expected model to be invalid, but it passed validation");
            }
        }
    };
}

/// Assert the exact messages recorded for one field.
///
/// # Example
///
/// ```rust
/// use stillform::{assert_field_errors, Errors};
///
/// let mut errors = Errors::new();
/// errors.push("age", "The value 'x' is invalid.");
/// assert_field_errors!(errors, "age", ["The value 'x' is invalid."]);
/// ```
#[macro_export]
macro_rules! assert_field_errors {
    ($errors:expr, $field:expr, $expected:expr) => {
        match $errors.get($field) {
            ::std::option::Option::Some(messages) => {
                assert_eq!(messages, $expected, "errors for field {:?}", $field);
            }
            ::std::option::Option::None => {
                panic!(
                    "Expected errors {:?} for field {:?}, got none: {:?}",
                    $expected, $field, $errors
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Scalar values only; lists and maps one level deep.
    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let scalar = prop_oneof![
            Just(Value::None),
            any::<String>().prop_map(Value::Str),
            any::<i64>().prop_map(Value::Int),
            any::<bool>().prop_map(Value::Bool),
            (-1.0e9..1.0e9f64).prop_map(Value::Float),
        ];
        prop_oneof![
            4 => scalar.clone(),
            1 => proptest::collection::vec(scalar, 0..5).prop_map(Value::List),
        ]
        .boxed()
    }
}

/// Format `n` with `separator` between groups of three digits.
pub fn group_thousands(n: i64, separator: &str) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len() + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Integers paired with their input text, grouped with `separator`.
#[cfg(feature = "proptest")]
pub fn localized_integer(separator: &'static str) -> impl Strategy<Value = (i64, String)> {
    any::<i64>().prop_map(move |n| (n, group_thousands(n, separator)))
}

/// Cent amounts paired with their input text, using the given separators.
#[cfg(feature = "proptest")]
pub fn localized_amount(
    thousands: &'static str,
    decimal: &'static str,
) -> impl Strategy<Value = (i64, String)> {
    (-1_000_000_000_000i64..1_000_000_000_000).prop_map(move |cents| {
        let whole = group_thousands(cents / 100, thousands);
        let sign = if cents < 0 && cents / 100 == 0 { "-" } else { "" };
        let text = format!("{}{}{}{:02}", sign, whole, decimal, (cents % 100).abs());
        (cents, text)
    })
}
