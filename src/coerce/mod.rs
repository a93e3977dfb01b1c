//! Coercion of raw form input into typed values
//!
//! A value provider turns one raw string into a typed [`Value`]. Providers
//! are looked up in a closed [`ValueProviders`] registry keyed by
//! [`ValueKind`]; a kind with no provider is simply not coerced.
//!
//! Every provider follows the same contract:
//!
//! - `Ok(Some(value))`: the input parsed
//! - `Ok(None)`: the input was empty or whitespace, meaning "absent"
//! - `Err(CoercionError::Invalid)`: malformed numeric input
//! - `Err(CoercionError::Unparseable)`: no date/time pattern matched
//!
//! # Example
//!
//! ```rust
//! use stillform::coerce::{coerce_value, RawInput};
//! use stillform::format::FormatProvider;
//! use stillform::value::{Value, ValueKind};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let formats = FormatProvider::default();
//! let v = coerce_value(ValueKind::Decimal, &RawInput::from("1,007.85"), &formats);
//! assert_eq!(v, Ok(Some(Value::Decimal(Decimal::from_str("1007.85").unwrap()))));
//!
//! let v = coerce_value(ValueKind::Int, &RawInput::from(vec!["1", "1,000,000"]), &formats);
//! assert_eq!(v, Ok(Some(Value::Int(1_000_000))));
//! ```

mod update;

pub use update::{try_update_model, ModelUpdater, RawValues};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::format::FormatProvider;
use crate::value::{Value, ValueKind};

/// Why a provider rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// The input is malformed for the target kind.
    #[error("the value '{input}' is invalid for {kind:?}")]
    Invalid {
        /// Target kind.
        kind: ValueKind,
        /// Offending input.
        input: String,
    },
    /// None of the configured date/time patterns matched.
    #[error("the value '{input}' is not in one of the supported {kind:?} formats")]
    Unparseable {
        /// Target kind.
        kind: ValueKind,
        /// Offending input.
        input: String,
    },
}

impl CoercionError {
    fn invalid(kind: ValueKind, input: &str) -> Self {
        CoercionError::Invalid {
            kind,
            input: input.to_string(),
        }
    }

    fn unparseable(kind: ValueKind, input: &str) -> Self {
        CoercionError::Unparseable {
            kind,
            input: input.to_string(),
        }
    }

    /// The raw input that failed.
    pub fn input(&self) -> &str {
        match self {
            CoercionError::Invalid { input, .. } | CoercionError::Unparseable { input, .. } => {
                input
            }
        }
    }
}

/// Outcome of a provider call.
pub type Coerced = Result<Option<Value>, CoercionError>;

/// A value provider: raw text plus locale formats to a typed value.
pub type ValueProvider = fn(&str, &FormatProvider) -> Coerced;

/// Raw input for one field, as submitted by a form.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// A single string.
    One(String),
    /// A multi-valued field.
    Many(Vec<String>),
    /// An already typed value, assigned as-is.
    Typed(Value),
}

impl RawInput {
    /// The string used for scalar fields: the last element of a list.
    ///
    /// An empty list reads as the empty string; typed input has no text.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            RawInput::One(s) => Some(s),
            RawInput::Many(items) => Some(items.last().map_or("", String::as_str)),
            RawInput::Typed(_) => None,
        }
    }

    /// Every string submitted, for sequence fields.
    pub fn items(&self) -> Vec<&str> {
        match self {
            RawInput::One(s) => vec![s.as_str()],
            RawInput::Many(items) => items.iter().map(String::as_str).collect(),
            RawInput::Typed(_) => Vec::new(),
        }
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        RawInput::One(value.to_string())
    }
}

impl From<String> for RawInput {
    fn from(value: String) -> Self {
        RawInput::One(value)
    }
}

impl From<Vec<&str>> for RawInput {
    fn from(value: Vec<&str>) -> Self {
        RawInput::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for RawInput {
    fn from(value: Vec<String>) -> Self {
        RawInput::Many(value)
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        RawInput::Typed(value)
    }
}

/// Text: whitespace-only input becomes the empty string.
pub fn str_value_provider(input: &str, _formats: &FormatProvider) -> Coerced {
    if input.trim().is_empty() {
        Ok(Some(Value::Str(String::new())))
    } else {
        Ok(Some(Value::Str(input.to_string())))
    }
}

/// Bytes: the UTF-8 encoding of the input.
pub fn bytes_value_provider(input: &str, _formats: &FormatProvider) -> Coerced {
    Ok(Some(Value::Bytes(input.as_bytes().to_vec())))
}

/// Integer, after stripping thousands separators.
pub fn int_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    let Some(text) = non_blank(input) else {
        return Ok(None);
    };
    let normalized = formats.normalize_number(text);
    i64::from_str(normalized.trim())
        .map(|i| Some(Value::Int(i)))
        .map_err(|_| CoercionError::invalid(ValueKind::Int, input))
}

/// Exact decimal, after separator normalization. Scientific notation is
/// accepted.
pub fn decimal_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    let Some(text) = non_blank(input) else {
        return Ok(None);
    };
    let normalized = formats.normalize_number(text);
    let normalized = normalized.trim();
    Decimal::from_str(normalized)
        .or_else(|_| Decimal::from_scientific(normalized))
        .map(|d| Some(Value::Decimal(d)))
        .map_err(|_| CoercionError::invalid(ValueKind::Decimal, input))
}

/// Float, after separator normalization.
pub fn float_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    let Some(text) = non_blank(input) else {
        return Ok(None);
    };
    let normalized = formats.normalize_number(text);
    f64::from_str(normalized.trim())
        .map(|f| Some(Value::Float(f)))
        .map_err(|_| CoercionError::invalid(ValueKind::Float, input))
}

/// Boolean: true iff the input is in the configured true-value set. Never
/// fails and never yields "absent".
pub fn bool_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    Ok(Some(Value::Bool(formats.is_true_value(input))))
}

/// Date via the primary pattern then each fallback.
pub fn date_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    let Some(text) = non_blank(input) else {
        return Ok(None);
    };
    formats
        .parse_date(text)
        .map(|d| Some(Value::Date(d)))
        .ok_or_else(|| CoercionError::unparseable(ValueKind::Date, input))
}

/// Time via the primary pattern then each fallback.
pub fn time_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    let Some(text) = non_blank(input) else {
        return Ok(None);
    };
    formats
        .parse_time(text)
        .map(|t| Some(Value::Time(t)))
        .ok_or_else(|| CoercionError::unparseable(ValueKind::Time, input))
}

/// Datetime via the datetime patterns; falls back to the date patterns,
/// producing midnight.
pub fn datetime_value_provider(input: &str, formats: &FormatProvider) -> Coerced {
    let Some(text) = non_blank(input) else {
        return Ok(None);
    };
    formats
        .parse_datetime(text)
        .or_else(|| formats.parse_date(text).map(|d| d.and_time(NaiveTime::MIN)))
        .map(|dt| Some(Value::DateTime(dt)))
        .ok_or_else(|| CoercionError::unparseable(ValueKind::DateTime, input))
}

fn non_blank(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// The closed registry of value providers.
///
/// The default registry covers every [`ValueKind`]. Providers can be
/// replaced or removed; removed kinds are skipped during model update.
#[derive(Clone)]
pub struct ValueProviders {
    providers: HashMap<ValueKind, ValueProvider>,
}

impl ValueProviders {
    /// A registry with no providers.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register (or replace) the provider for `kind`.
    pub fn with(mut self, kind: ValueKind, provider: ValueProvider) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Drop the provider for `kind`.
    pub fn without(mut self, kind: ValueKind) -> Self {
        self.providers.remove(&kind);
        self
    }

    /// Provider registered for `kind`.
    pub fn get(&self, kind: ValueKind) -> Option<ValueProvider> {
        self.providers.get(&kind).copied()
    }

    /// Whether `kind` has a provider.
    pub fn contains(&self, kind: ValueKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Coerce one raw string with the provider for `kind`.
    ///
    /// Returns `None` when no provider is registered.
    pub fn coerce(&self, kind: ValueKind, input: &str, formats: &FormatProvider) -> Option<Coerced> {
        self.get(kind).map(|provider| provider(input, formats))
    }
}

impl Default for ValueProviders {
    fn default() -> Self {
        Self::empty()
            .with(ValueKind::Str, str_value_provider)
            .with(ValueKind::Bytes, bytes_value_provider)
            .with(ValueKind::Int, int_value_provider)
            .with(ValueKind::Decimal, decimal_value_provider)
            .with(ValueKind::Float, float_value_provider)
            .with(ValueKind::Bool, bool_value_provider)
            .with(ValueKind::Date, date_value_provider)
            .with(ValueKind::Time, time_value_provider)
            .with(ValueKind::DateTime, datetime_value_provider)
    }
}

impl fmt::Debug for ValueProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.providers.keys().collect();
        kinds.sort();
        f.debug_struct("ValueProviders").field("kinds", &kinds).finish()
    }
}

static DEFAULT_PROVIDERS: LazyLock<ValueProviders> = LazyLock::new(ValueProviders::default);

/// Coerce raw input to `kind` with the default providers.
///
/// Typed input passes through untouched; a list uses its last element.
pub fn coerce_value(kind: ValueKind, raw: &RawInput, formats: &FormatProvider) -> Coerced {
    match raw.scalar() {
        Some(text) => match DEFAULT_PROVIDERS.coerce(kind, text, formats) {
            Some(coerced) => coerced,
            None => Ok(None),
        },
        None => match raw {
            RawInput::Typed(value) => Ok(Some(value.clone())),
            _ => Ok(None),
        },
    }
}
