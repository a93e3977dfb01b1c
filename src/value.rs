//! Dynamic field values and their kinds
//!
//! Every model field is read and written through [`Value`], a closed set of
//! the types the rule engine and the coercion engine understand. [`FieldKind`]
//! describes what a field holds; it is declared by a struct schema (see
//! [`model!`](crate::model!)) or inferred from the stored value for mappings.
//!
//! # Example
//!
//! ```rust
//! use stillform::value::{FieldKind, Value, ValueKind};
//!
//! let v = Value::from(42);
//! assert_eq!(v.field_kind(), FieldKind::Scalar(ValueKind::Int));
//! assert!(v.is_truthy());
//! assert!(!Value::from("").is_truthy());
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dynamically typed field value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Absent value.
    #[default]
    None,
    /// Text.
    Str(String),
    /// Raw bytes (UTF-8 encoded text when produced by coercion).
    Bytes(Vec<u8>),
    /// Signed integer.
    Int(i64),
    /// Exact decimal number.
    Decimal(Decimal),
    /// Floating point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Nested key-value structure.
    Map(BTreeMap<String, Value>),
}

/// Discriminator of scalar values, used as the coercion registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueKind {
    /// [`Value::Str`]
    Str,
    /// [`Value::Bytes`]
    Bytes,
    /// [`Value::Int`]
    Int,
    /// [`Value::Decimal`]
    Decimal,
    /// [`Value::Float`]
    Float,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Date`]
    Date,
    /// [`Value::Time`]
    Time,
    /// [`Value::DateTime`]
    DateTime,
}

/// What a model field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldKind {
    /// Nothing is known about the field (its value is `None`).
    Null,
    /// A single scalar value.
    Scalar(ValueKind),
    /// A sequence; the element kind is `None` when it cannot be determined.
    List(Option<ValueKind>),
    /// A nested model.
    Map,
}

impl FieldKind {
    /// The scalar kind, if this is a scalar field.
    pub fn scalar(self) -> Option<ValueKind> {
        match self {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }
}

impl Value {
    /// Scalar kind of this value, `None` for `None`, lists and maps.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Value::Str(_) => Some(ValueKind::Str),
            Value::Bytes(_) => Some(ValueKind::Bytes),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Decimal(_) => Some(ValueKind::Decimal),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Date(_) => Some(ValueKind::Date),
            Value::Time(_) => Some(ValueKind::Time),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::None | Value::List(_) | Value::Map(_) => None,
        }
    }

    /// Field kind inferred from the runtime value.
    ///
    /// A list's element kind is taken from its first element.
    pub fn field_kind(&self) -> FieldKind {
        match self {
            Value::None => FieldKind::Null,
            Value::List(items) => FieldKind::List(items.first().and_then(Value::value_kind)),
            Value::Map(_) => FieldKind::Map,
            other => other
                .value_kind()
                .map_or(FieldKind::Null, FieldKind::Scalar),
        }
    }

    /// Returns `true` for [`Value::None`].
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Truthiness: `None`, empty text/bytes/collections, zero and `false`
    /// are falsy. Dates and times are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Int(i) => *i != 0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => true,
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Size of text (in chars), bytes, lists and maps.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::List(items) => Some(items.len()),
            Value::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Borrow the text of a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value, accepting integral decimals and floats.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            Value::Float(f) if f.fract() == 0.0 => i64::from_f64(*f),
            _ => None,
        }
    }

    /// Ordering between two values.
    ///
    /// Values of the same kind compare naturally; integers, decimals and
    /// floats compare across kinds. Anything else is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Decimal(b)) => Decimal::from(*a).partial_cmp(b),
            (Value::Decimal(a), Value::Int(b)) => a.partial_cmp(&Decimal::from(*b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Decimal(a), Value::Float(b)) => a.to_f64()?.partial_cmp(b),
            (Value::Float(a), Value::Decimal(b)) => a.partial_cmp(&b.to_f64()?),
            _ => None,
        }
    }

    /// Equality that agrees with [`Value::compare`].
    ///
    /// Numbers of different kinds are equal when they compare equal, so
    /// `Int(1)`, `Decimal(1)` and `Float(1.0)` are the same. Values that do
    /// not order fall back to `==`.
    pub fn same_as(&self, other: &Value) -> bool {
        match self.compare(other) {
            Some(ordering) => ordering == Ordering::Equal,
            None => self == other,
        }
    }

    /// Returns `true` for the minimum date, time and datetime sentinels.
    pub fn is_min_sentinel(&self) -> bool {
        match self {
            Value::Date(d) => is_min_date(d),
            Value::Time(t) => is_min_time(t),
            Value::DateTime(dt) => is_min_date(&dt.date()) && is_min_time(&dt.time()),
            _ => false,
        }
    }
}

fn is_min_date(date: &NaiveDate) -> bool {
    date.year() == 1 && date.ordinal() == 1
}

fn is_min_time(time: &NaiveTime) -> bool {
    time.num_seconds_from_midnight() == 0 && time.nanosecond() == 0
}

/// The values deemed missing by `Required` although they are truthy:
/// the minimum date, time and datetime.
pub fn min_sentinels() -> Vec<Value> {
    let mut sentinels = Vec::with_capacity(3);
    if let Some(date) = NaiveDate::from_ymd_opt(1, 1, 1) {
        sentinels.push(Value::Date(date));
        sentinels.push(Value::DateTime(date.and_time(NaiveTime::MIN)));
    }
    sentinels.push(Value::Time(NaiveTime::MIN));
    sentinels
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Int(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

/// A Rust type that can be stored in a model field.
///
/// Implemented for the scalar types the coercion engine produces, for
/// `Option<T>` (absent values) and `Vec<T>` (multi-valued fields). The
/// [`model!`](crate::model!) macro uses it to declare each field's kind.
///
/// Integer fields are limited to types that convert losslessly into `i64`;
/// `u64` and `usize` are not fields.
pub trait Field: Sized {
    /// Kind declared by this type.
    fn field_kind() -> FieldKind;

    /// Convert the field into a [`Value`].
    fn to_value(&self) -> Value;

    /// Convert a [`Value`] back, `None` when the value has the wrong kind.
    fn from_value(value: Value) -> Option<Self>;
}

/// Declared kind of a field, inferred from a reference to it.
#[inline]
pub fn kind_of<F: Field>(_: &F) -> FieldKind {
    F::field_kind()
}

impl Field for String {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::Str)
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! int_field {
    ($($ty:ty),*) => {
        $(
            impl Field for $ty {
                fn field_kind() -> FieldKind {
                    FieldKind::Scalar(ValueKind::Int)
                }

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> Option<Self> {
                    value.as_int().and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

int_field!(i8, i16, i32, i64, u8, u16, u32);

impl Field for Decimal {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::Decimal)
    }

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Decimal(d) => Some(d),
            Value::Int(i) => Some(Decimal::from(i)),
            _ => None,
        }
    }
}

impl Field for f64 {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::Float)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl Field for bool {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::Bool)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl Field for NaiveDate {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::Date)
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl Field for NaiveTime {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::Time)
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }
}

impl Field for NaiveDateTime {
    fn field_kind() -> FieldKind {
        FieldKind::Scalar(ValueKind::DateTime)
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl<T: Field> Field for Option<T> {
    fn field_kind() -> FieldKind {
        T::field_kind()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::None, Field::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Field> Field for Vec<T> {
    fn field_kind() -> FieldKind {
        FieldKind::List(T::field_kind().scalar())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Field::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
