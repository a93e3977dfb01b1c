//! Bounds relative to the current date or time

use chrono::{FixedOffset, Local, TimeDelta, Utc};
use rust_decimal::Decimal;

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Bounds, Rule, RuleError, Strategy, Template};

const MIN: &str = "The value is less than the lower bound {min}.";
const MAX: &str = "The value is greater than the upper bound {max}.";
const EXACT: &str = "The value must be exactly {min}.";
const RANGE: &str = "The value is out of the range {min} - {max}.";

/// Where "now" comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Clock {
    /// Today in the local timezone.
    Date,
    /// Today in UTC.
    UtcDate,
    /// Today at a fixed UTC offset.
    TzDate(FixedOffset),
    /// The local date and time.
    DateTime,
    /// The UTC date and time.
    UtcDateTime,
    /// The date and time at a fixed UTC offset.
    TzDateTime(FixedOffset),
    /// Seconds since the Unix epoch.
    UnixTime,
    /// A fixed instant.
    Fixed(Value),
}

impl Clock {
    /// The current value of this clock.
    pub fn now(&self) -> Value {
        match self {
            Clock::Date => Value::Date(Local::now().date_naive()),
            Clock::UtcDate => Value::Date(Utc::now().date_naive()),
            Clock::TzDate(offset) => Value::Date(Utc::now().with_timezone(offset).date_naive()),
            Clock::DateTime => Value::DateTime(Local::now().naive_local()),
            Clock::UtcDateTime => Value::DateTime(Utc::now().naive_utc()),
            Clock::TzDateTime(offset) => {
                Value::DateTime(Utc::now().with_timezone(offset).naive_local())
            }
            Clock::UnixTime => Value::Int(Utc::now().timestamp()),
            Clock::Fixed(now) => now.clone(),
        }
    }
}

/// `base + delta` for dates, datetimes, times and numeric timestamps.
///
/// Dates move by whole days, timestamps by seconds.
fn shift(base: &Value, delta: TimeDelta) -> Option<Value> {
    match base {
        Value::Date(date) => date.checked_add_signed(delta).map(Value::Date),
        Value::DateTime(dt) => dt.checked_add_signed(delta).map(Value::DateTime),
        Value::Time(time) => Some(Value::Time(time.overflowing_add_signed(delta).0)),
        Value::Int(secs) => secs.checked_add(delta.num_seconds()).map(Value::Int),
        Value::Decimal(secs) => secs
            .checked_add(Decimal::from(delta.num_seconds()))
            .map(Value::Decimal),
        Value::Float(secs) => Some(Value::Float(
            secs + delta.num_milliseconds() as f64 / 1000.0,
        )),
        _ => None,
    }
}

/// Checks a value against `now + min` and `now + max`.
///
/// The clock is read once per validation. A value that cannot be
/// ordered against the computed bounds fails. `None` always passes.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Clock, RelativeDelta, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use chrono::{NaiveDate, TimeDelta};
/// use std::collections::BTreeMap;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let within_a_week = RelativeDelta::between(
///     Clock::Fixed(Value::from(today)),
///     TimeDelta::days(-7),
///     TimeDelta::days(7),
/// )
/// .unwrap();
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let mut errors = Vec::new();
/// let later = Value::from(today + TimeDelta::days(8));
/// assert!(!within_a_week.validate(&later, "f", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["The value is out of the range 2024-03-03 - 2024-03-17."]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeDelta {
    clock: Clock,
    bounds: Bounds<TimeDelta>,
    message: Option<Template>,
}

impl RelativeDelta {
    /// Select the strategy from optional deltas.
    pub fn new(
        clock: Clock,
        min: Option<TimeDelta>,
        max: Option<TimeDelta>,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            clock,
            bounds: Bounds::select(min, max, |a, b| a.partial_cmp(b))?,
            message: None,
        })
    }

    /// No bounds: always succeeds.
    pub fn any(clock: Clock) -> Self {
        Self {
            clock,
            bounds: Bounds::Unbounded,
            message: None,
        }
    }

    /// Not earlier than `now + min`.
    pub fn at_least(clock: Clock, min: TimeDelta) -> Self {
        Self {
            clock,
            bounds: Bounds::Min(min),
            message: None,
        }
    }

    /// Not later than `now + max`.
    pub fn at_most(clock: Clock, max: TimeDelta) -> Self {
        Self {
            clock,
            bounds: Bounds::Max(max),
            message: None,
        }
    }

    /// Within `now + min ..= now + max`.
    pub fn between(clock: Clock, min: TimeDelta, max: TimeDelta) -> Result<Self, RuleError> {
        Self::new(clock, Some(min), Some(max))
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

    /// The clock "now" is read from.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The clock's current value.
    pub fn now(&self) -> Value {
        self.clock.now()
    }

    fn failure(&self, bounds: Option<&Bounds<Value>>, translate: &dyn Translate) -> String {
        let none = Value::None;
        let (template, min, max) = match bounds {
            None | Some(Bounds::Unbounded) => (self.default_template(), &none, &none),
            Some(Bounds::Min(min)) => (MIN, min, &none),
            Some(Bounds::Max(max)) => (MAX, &none, max),
            Some(Bounds::Exact(exact)) => (EXACT, exact, exact),
            Some(Bounds::Range(min, max)) => (RANGE, min, max),
        };
        let template = self.message.as_deref().unwrap_or(template);
        render(translate, template, &[("min", min), ("max", max)])
    }

    fn default_template(&self) -> &'static str {
        match self.bounds.strategy() {
            Strategy::Succeed | Strategy::Range => RANGE,
            Strategy::Min => MIN,
            Strategy::Max => MAX,
            Strategy::Exact => EXACT,
        }
    }
}

impl Rule for RelativeDelta {
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
        let now = self.clock.now();
        let bounds = self.bounds.try_map(|delta| shift(&now, *delta));
        let within = bounds
            .as_ref()
            .is_some_and(|b| b.contains(|bound| value.compare(bound)));
        if !within {
            result.push(self.failure(bounds.as_ref(), translate));
        }
        within
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::NoTranslation;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn check(rule: &RelativeDelta, value: Value, errors: &mut Vec<String>) -> bool {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        rule.validate(&value, "f", &model, errors, &NoTranslation)
    }

    fn week() -> TimeDelta {
        TimeDelta::days(7)
    }

    fn clocks() -> Vec<Clock> {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        vec![
            Clock::Date,
            Clock::UtcDate,
            Clock::TzDate(offset),
            Clock::DateTime,
            Clock::UtcDateTime,
            Clock::TzDateTime(offset),
            Clock::UnixTime,
        ]
    }

    #[test]
    fn test_strategies() {
        let clock = Clock::UtcDate;
        assert_eq!(RelativeDelta::any(clock.clone()).strategy(), Strategy::Succeed);
        assert_eq!(
            RelativeDelta::at_least(clock.clone(), -week()).strategy(),
            Strategy::Min
        );
        assert_eq!(
            RelativeDelta::at_most(clock.clone(), week()).strategy(),
            Strategy::Max
        );
        assert_eq!(
            RelativeDelta::between(clock.clone(), week(), week())
                .unwrap()
                .strategy(),
            Strategy::Exact
        );
        assert_eq!(
            RelativeDelta::between(clock.clone(), -week(), week())
                .unwrap()
                .strategy(),
            Strategy::Range
        );
        assert!(RelativeDelta::between(clock, week(), -week()).is_err());
    }

    #[test]
    fn test_every_clock() {
        for clock in clocks() {
            let rule = RelativeDelta::between(clock.clone(), -week(), week()).unwrap();
            let now = rule.now();
            let mut errors = Vec::new();

            assert!(check(&rule, Value::None, &mut errors), "{:?}", clock);
            assert!(check(&rule, now.clone(), &mut errors), "{:?}", clock);
            assert!(errors.is_empty(), "{:?}", clock);

            let early = shift(&now, -TimeDelta::days(8)).unwrap();
            let late = shift(&now, TimeDelta::days(8)).unwrap();
            assert!(!check(&rule, early, &mut errors), "{:?}", clock);
            assert!(!check(&rule, late, &mut errors), "{:?}", clock);
            assert_eq!(errors.len(), 2, "{:?}", clock);
        }
    }

    #[test]
    fn test_succeed_strategy_ignores_value() {
        let rule = RelativeDelta::any(Clock::UtcDate);
        let mut errors = Vec::new();
        assert!(check(&rule, Value::from("whatever"), &mut errors));
    }

    #[test]
    fn test_fixed_clock_messages() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let clock = Clock::Fixed(Value::from(today));
        let mut errors = Vec::new();

        let min = RelativeDelta::at_least(clock.clone(), -week());
        assert!(check(&min, Value::from(today - week()), &mut errors));
        assert!(!check(&min, Value::from(today - TimeDelta::days(8)), &mut errors));

        let max = RelativeDelta::at_most(clock, week()).with_message("max {max}");
        assert!(!check(&max, Value::from(today + TimeDelta::days(8)), &mut errors));
        assert_eq!(
            errors,
            [
                "The value is less than the lower bound 2024-03-03.",
                "max 2024-03-17"
            ]
        );
    }

    #[test]
    fn test_incomparable_value_fails() {
        let rule = RelativeDelta::at_most(Clock::UtcDate, week());
        let mut errors = Vec::new();
        assert!(!check(&rule, Value::from(12), &mut errors));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unsupported_fixed_clock_fails() {
        let rule = RelativeDelta::at_most(Clock::Fixed(Value::from("now")), week());
        let mut errors = Vec::new();
        assert!(!check(&rule, Value::from("now"), &mut errors));
        assert_eq!(errors, ["The value is greater than the upper bound None."]);
    }
}
