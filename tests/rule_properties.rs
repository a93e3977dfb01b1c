//! Property-based tests for rules and combinators

use std::collections::BTreeMap;

use proptest::prelude::*;
use stillform::prelude::*;
use stillform::testing::run_rule;
use stillform::{rules, Strategy as BoundsStrategy};

fn check(rule: &dyn Rule, value: &Value) -> (bool, Vec<String>) {
    let model: BTreeMap<String, Value> = BTreeMap::new();
    let mut messages = Vec::new();
    let ok = rule.validate(value, "field", &model, &mut messages, &NoTranslation);
    (ok, messages)
}

fn scalar_value() -> impl proptest::strategy::Strategy<Value = Value> {
    prop_oneof![
        Just(Value::None),
        "\\PC{0,5}".prop_map(Value::from),
        (-3i64..3).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn test_length_passes_none(min in 0usize..20, extra in 0usize..20) {
        let rule = Length::between(min, min + extra).unwrap();
        prop_assert_eq!(run_rule(&rule, Value::None), Ok(()));
    }

    #[test]
    fn test_length_matches_char_count(text in "\\PC{0,30}", max in 0usize..30) {
        let rule = Length::at_most(max);
        let expected = text.chars().count() <= max;
        prop_assert_eq!(run_rule(&rule, text.as_str()).is_ok(), expected);
    }

    #[test]
    fn test_range_agrees_with_integer_order(n in any::<i64>(), lo in -1000i64..1000, width in 0i64..1000) {
        let rule = Range::between(lo, lo + width).unwrap();
        let expected = lo <= n && n <= lo + width;
        prop_assert_eq!(run_rule(&rule, n).is_ok(), expected);
        prop_assert_eq!(run_rule(&rule, Value::None), Ok(()));
    }

    #[test]
    fn test_bounds_select_strategy(min in proptest::option::of(0usize..=10), max in proptest::option::of(10usize..=20)) {
        let rule = Length::new(min, max).unwrap();
        let expected = match (min, max) {
            (None, None) => BoundsStrategy::Succeed,
            (Some(_), None) => BoundsStrategy::Min,
            (None, Some(_)) => BoundsStrategy::Max,
            (Some(a), Some(b)) if a == b => BoundsStrategy::Exact,
            (Some(_), Some(_)) => BoundsStrategy::Range,
        };
        prop_assert_eq!(rule.strategy(), expected);
    }

    #[test]
    fn test_inverted_bounds_are_rejected(min in 1usize..100, gap in 1usize..100) {
        prop_assert!(Length::between(min + gap, min).is_err());
        prop_assert!(Range::between(min as i64 + gap as i64, min as i64).is_err());
    }

    #[test]
    fn test_and_reports_every_failing_rule(n in -50i64..50) {
        let rule = And::new(Range::at_least(0), Range::at_most(10)).and(Range::exactly(5));
        let (ok, messages) = check(&rule, &Value::from(n));
        let failures = [n < 0, n > 10, n != 5].iter().filter(|f| **f).count();
        prop_assert_eq!(ok, failures == 0);
        prop_assert_eq!(messages.len(), failures);
    }

    #[test]
    fn test_or_keeps_messages_only_when_all_fail(n in -50i64..50) {
        let rule = Or::new(Range::at_most(-10), Range::at_least(10));
        let (ok, messages) = check(&rule, &Value::from(n));
        prop_assert_eq!(ok, !(-10 < n && n < 10));
        prop_assert_eq!(messages.len(), if ok { 0 } else { 2 });
    }

    #[test]
    fn test_iterator_collect_all_counts_failures(items in proptest::collection::vec(-20i64..20, 0..10)) {
        let rule = IteratorRule::each(Range::at_least(0)).with_mode(Mode::CollectAll);
        let (ok, messages) = check(&rule, &Value::from(items.clone()));
        let failures = items.iter().filter(|n| **n < 0).count();
        prop_assert_eq!(ok, failures == 0);
        prop_assert_eq!(messages.len(), failures);
    }

    #[test]
    fn test_one_of_membership(choice in 0usize..3, other in "[d-z]{1,3}") {
        let items = ["a", "b", "c"];
        let rule = OneOf::try_new(items).unwrap();
        prop_assert!(run_rule(&rule, items[choice]).is_ok());
        prop_assert!(run_rule(&rule, other.as_str()).is_err());
    }

    #[test]
    fn test_required_matches_truthiness(value in scalar_value()) {
        let expected = value.is_truthy();
        prop_assert_eq!(run_rule(&Required::new(), value).is_ok(), expected);
    }

    #[test]
    fn test_relative_delta_passes_none(days in 0i64..365) {
        let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rule = RelativeDelta::at_most(
            Clock::Fixed(Value::from(today)),
            chrono::TimeDelta::days(days),
        );
        prop_assert_eq!(run_rule(&rule, Value::None), Ok(()));
        prop_assert!(run_rule(&rule, today + chrono::TimeDelta::days(days)).is_ok());
        prop_assert!(run_rule(&rule, today + chrono::TimeDelta::days(days + 1)).is_err());
    }

    #[test]
    fn test_slug_accepts_generated_slugs(slug in "[A-Za-z0-9_-]{1,20}") {
        prop_assert_eq!(run_rule(&Slug::new(), slug.as_str()), Ok(()));
    }
}

#[test]
fn test_validation_is_deterministic_across_threads() {
    let validator = std::sync::Arc::new(
        Validator::new()
            .field("name", rules![Required::new(), Length::at_least(3)])
            .field("age", rules![Range::between(0, 150).unwrap()]),
    );
    let model = std::sync::Arc::new(BTreeMap::from([
        ("name".to_string(), Value::from("jo")),
        ("age".to_string(), Value::from(200)),
    ]));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let validator = validator.clone();
            let model = model.clone();
            std::thread::spawn(move || validator.check(&*model).unwrap_err())
        })
        .collect();

    let results: Vec<Errors> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].len(), 2);
}
