//! Locale format configuration
//!
//! [`Formats`] is the plain configuration: separators, input patterns and
//! the boolean true-value set. [`FormatProvider`] is its compiled form, the
//! leaf the coercion engine reads from. Patterns are chrono strftime
//! patterns, checked once when the provider is built.
//!
//! Components a pattern leaves out default to 1900-01-01 00:00:00. `%y`
//! pivots at 69: `69`-`99` are read as 19xx and `00`-`68` as 20xx. `%Y`
//! only matches four digit years.
//!
//! # Example
//!
//! ```rust
//! use stillform::format::{FormatProvider, Formats};
//! use chrono::NaiveDate;
//!
//! let provider = FormatProvider::new(&Formats::default()).unwrap();
//! let expected = NaiveDate::from_ymd_opt(2012, 2, 4);
//! assert_eq!(provider.parse_date("2012/2/4"), expected);
//! assert_eq!(provider.parse_date("2/4/12"), expected);
//! assert_eq!(provider.parse_date("2.4.12"), None);
//! ```

use chrono::format::{self, Item, Numeric, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::translate::Translate;

/// Errors raised while compiling a [`Formats`] configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The pattern holds a directive chrono does not recognize.
    #[error("invalid pattern '{0}'")]
    InvalidPattern(String),
    /// A separator is empty.
    #[error("{0} separator must not be empty")]
    EmptySeparator(&'static str),
}

/// Locale-specific input conventions.
///
/// Fallback pattern lists are `|`-delimited and tried in order after the
/// primary pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Formats {
    /// Decimal separator, normalized to `.` before parsing.
    pub decimal_separator: String,
    /// Thousands separator, stripped before parsing.
    pub thousands_separator: String,
    /// Primary date pattern.
    pub date_input_format: String,
    /// Fallback date patterns.
    pub fallback_date_input_formats: String,
    /// Primary time pattern.
    pub time_input_format: String,
    /// Fallback time patterns.
    pub fallback_time_input_formats: String,
    /// Primary datetime pattern.
    pub datetime_input_format: String,
    /// Fallback datetime patterns.
    pub fallback_datetime_input_formats: String,
    /// Inputs the boolean provider reads as `true`.
    pub boolean_true_values: Vec<String>,
}

impl Default for Formats {
    fn default() -> Self {
        Self {
            decimal_separator: ".".into(),
            thousands_separator: ",".into(),
            date_input_format: "%Y/%m/%d".into(),
            fallback_date_input_formats: "%m/%d/%Y|%Y-%m-%d|%m/%d/%y".into(),
            time_input_format: "%H:%M".into(),
            fallback_time_input_formats: "%H:%M:%S|%I:%M %p|%I:%M:%S %p".into(),
            datetime_input_format: "%Y/%m/%d %H:%M".into(),
            fallback_datetime_input_formats: [
                "%Y/%m/%d %H:%M:%S",
                "%m/%d/%Y %H:%M",
                "%m/%d/%Y %H:%M:%S",
                "%m/%d/%y %H:%M",
                "%m/%d/%y %H:%M:%S",
                "%Y-%m-%d %H:%M",
                "%Y-%m-%d %H:%M:%S",
            ]
            .join("|"),
            boolean_true_values: vec!["1".into(), "True".into()],
        }
    }
}

impl Formats {
    /// Resolve formats through a translation function.
    ///
    /// Each setting is looked up by a well-known key such as
    /// `__DECIMAL_SEPARATOR__`; a key that translates to itself keeps the
    /// value from `self`.
    ///
    /// ```rust
    /// use stillform::format::Formats;
    ///
    /// let de = |key: &str| match key {
    ///     "__DECIMAL_SEPARATOR__" => ",".to_string(),
    ///     "__THOUSANDS_SEPARATOR__" => ".".to_string(),
    ///     "__DATE_INPUT_FORMAT__" => "%d.%m.%Y".to_string(),
    ///     other => other.to_string(),
    /// };
    /// let formats = Formats::default().localized(&de);
    /// assert_eq!(formats.decimal_separator, ",");
    /// assert_eq!(formats.date_input_format, "%d.%m.%Y");
    /// assert_eq!(formats.time_input_format, "%H:%M");
    /// ```
    pub fn localized(&self, translate: &dyn Translate) -> Self {
        let lookup = |key: &str, fallback: &str| -> String {
            let translated = translate.translate(key);
            if translated == key {
                fallback.to_string()
            } else {
                translated.into_owned()
            }
        };
        Self {
            decimal_separator: lookup("__DECIMAL_SEPARATOR__", &self.decimal_separator),
            thousands_separator: lookup("__THOUSANDS_SEPARATOR__", &self.thousands_separator),
            date_input_format: lookup("__DATE_INPUT_FORMAT__", &self.date_input_format),
            fallback_date_input_formats: lookup(
                "__FALLBACK_DATE_INPUT_FORMATS__",
                &self.fallback_date_input_formats,
            ),
            time_input_format: lookup("__TIME_INPUT_FORMAT__", &self.time_input_format),
            fallback_time_input_formats: lookup(
                "__FALLBACK_TIME_INPUT_FORMATS__",
                &self.fallback_time_input_formats,
            ),
            datetime_input_format: lookup(
                "__DATETIME_INPUT_FORMAT__",
                &self.datetime_input_format,
            ),
            fallback_datetime_input_formats: lookup(
                "__FALLBACK_DATETIME_INPUT_FORMATS__",
                &self.fallback_datetime_input_formats,
            ),
            boolean_true_values: self.boolean_true_values.clone(),
        }
    }
}

/// Compiled [`Formats`], ready for parsing.
#[derive(Debug, Clone)]
pub struct FormatProvider {
    decimal_separator: String,
    thousands_separator: String,
    date_patterns: Vec<InputPattern>,
    time_patterns: Vec<InputPattern>,
    datetime_patterns: Vec<InputPattern>,
    boolean_true_values: Vec<String>,
}

impl FormatProvider {
    /// Compile a configuration.
    pub fn new(formats: &Formats) -> Result<Self, FormatError> {
        if formats.decimal_separator.is_empty() {
            return Err(FormatError::EmptySeparator("decimal"));
        }
        Ok(Self {
            decimal_separator: formats.decimal_separator.clone(),
            thousands_separator: formats.thousands_separator.clone(),
            date_patterns: compile_chain(
                &formats.date_input_format,
                &formats.fallback_date_input_formats,
            )?,
            time_patterns: compile_chain(
                &formats.time_input_format,
                &formats.fallback_time_input_formats,
            )?,
            datetime_patterns: compile_chain(
                &formats.datetime_input_format,
                &formats.fallback_datetime_input_formats,
            )?,
            boolean_true_values: formats.boolean_true_values.clone(),
        })
    }

    /// Compile the configuration as resolved through `translate`.
    pub fn localized(formats: &Formats, translate: &dyn Translate) -> Result<Self, FormatError> {
        Self::new(&formats.localized(translate))
    }

    /// Decimal separator.
    pub fn decimal_separator(&self) -> &str {
        &self.decimal_separator
    }

    /// Thousands separator; empty means none.
    pub fn thousands_separator(&self) -> &str {
        &self.thousands_separator
    }

    /// Whether `input` belongs to the boolean true-value set.
    pub fn is_true_value(&self, input: &str) -> bool {
        self.boolean_true_values.iter().any(|v| v == input)
    }

    /// Rewrite a localized number into the `1234.5` form.
    ///
    /// ```rust
    /// use stillform::format::{FormatProvider, Formats};
    ///
    /// let provider = FormatProvider::new(&Formats::default()).unwrap();
    /// assert_eq!(provider.normalize_number("1,007.85"), "1007.85");
    /// ```
    pub fn normalize_number(&self, input: &str) -> String {
        let stripped = if self.thousands_separator.is_empty() {
            input.to_string()
        } else {
            input.replace(self.thousands_separator.as_str(), "")
        };
        if self.decimal_separator == "." {
            stripped
        } else {
            stripped.replacen(self.decimal_separator.as_str(), ".", 1)
        }
    }

    /// Parse a date with the primary pattern, then each fallback in order.
    pub fn parse_date(&self, input: &str) -> Option<NaiveDate> {
        self.date_patterns
            .iter()
            .find_map(|p| p.fields(input).as_ref().and_then(date_of))
    }

    /// Parse a time with the primary pattern, then each fallback in order.
    pub fn parse_time(&self, input: &str) -> Option<NaiveTime> {
        self.time_patterns
            .iter()
            .find_map(|p| p.fields(input).as_ref().and_then(time_of))
    }

    /// Parse a datetime with the primary pattern, then each fallback in order.
    ///
    /// Does not fall back to dates; the datetime provider does that.
    pub fn parse_datetime(&self, input: &str) -> Option<NaiveDateTime> {
        self.datetime_patterns.iter().find_map(|p| {
            let parsed = p.fields(input)?;
            Some(NaiveDateTime::new(date_of(&parsed)?, time_of(&parsed)?))
        })
    }
}

impl Default for FormatProvider {
    fn default() -> Self {
        Self::new(&Formats::default())
            .unwrap_or_else(|e| unreachable!("built-in formats failed to compile: {e}"))
    }
}

fn compile_chain(primary: &str, fallbacks: &str) -> Result<Vec<InputPattern>, FormatError> {
    std::iter::once(primary)
        .chain(fallbacks.split('|'))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(InputPattern::compile)
        .collect()
}

/// A strftime pattern split into chrono items.
#[derive(Debug, Clone)]
struct InputPattern {
    items: Vec<Item<'static>>,
    full_year: bool,
}

impl InputPattern {
    fn compile(pattern: &str) -> Result<Self, FormatError> {
        let items: Vec<Item<'static>> = StrftimeItems::new(pattern)
            .map(|item| item.to_owned())
            .collect();
        if items.contains(&Item::Error) {
            return Err(FormatError::InvalidPattern(pattern.to_string()));
        }
        let full_year = items
            .iter()
            .any(|item| matches!(item, Item::Numeric(Numeric::Year, _)));
        Ok(Self { items, full_year })
    }

    fn fields(&self, input: &str) -> Option<Parsed> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, input.trim(), self.items.iter()).ok()?;
        // chrono reads `%Y` as one to four digits.
        if self.full_year && parsed.year.is_some_and(|y| y < 1000) {
            return None;
        }
        Some(parsed)
    }
}

fn date_of(parsed: &Parsed) -> Option<NaiveDate> {
    let mut parsed = parsed.clone();
    if parsed.year.is_none() && parsed.year_div_100.is_none() {
        match parsed.year_mod_100 {
            Some(yy) => parsed.set_year_div_100(if yy >= 69 { 19 } else { 20 }).ok()?,
            None => parsed.set_year(1900).ok()?,
        }
    }
    let by_week_or_ordinal = parsed.ordinal.is_some()
        || parsed.week_from_sun.is_some()
        || parsed.week_from_mon.is_some();
    if !by_week_or_ordinal {
        if parsed.month.is_none() {
            parsed.set_month(1).ok()?;
        }
        if parsed.day.is_none() {
            parsed.set_day(1).ok()?;
        }
    }
    parsed.to_naive_date().ok()
}

fn time_of(parsed: &Parsed) -> Option<NaiveTime> {
    let mut parsed = parsed.clone();
    match (parsed.hour_div_12, parsed.hour_mod_12) {
        (None, None) => parsed.set_hour(0).ok()?,
        // `%I` without `%p` reads as AM.
        (None, Some(_)) => parsed.set_ampm(false).ok()?,
        (Some(_), None) => parsed.set_hour12(12).ok()?,
        (Some(_), Some(_)) => {}
    }
    if parsed.minute.is_none() {
        parsed.set_minute(0).ok()?;
    }
    parsed.to_naive_time().ok()
}
