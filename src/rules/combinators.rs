//! Logical combinators: [`And`], [`Or`] and [`IteratorRule`]

use std::slice;

use crate::model::Model;
use crate::translate::Translate;
use crate::validator::Mode;
use crate::value::Value;

use super::{Rule, RuleError, RuleExt, RuleRef};

/// Runs every rule and passes only if all of them pass.
///
/// Every failing rule contributes its messages, so one field gets a full
/// report from several angles.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{And, Range, Required, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let rule = And::new(Required::new(), Range::between(1, 5).unwrap());
/// let mut errors = Vec::new();
///
/// assert!(rule.validate(&Value::from(1), "n", &model, &mut errors, &NoTranslation));
/// assert!(!rule.validate(&Value::from(0), "n", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct And {
    rules: Vec<RuleRef>,
}

impl And {
    /// Combine two rules.
    pub fn new(first: impl RuleExt, second: impl RuleExt) -> Self {
        Self {
            rules: vec![first.shared(), second.shared()],
        }
    }

    /// Combine a list of rules; at least two are required.
    pub fn try_from_rules(rules: Vec<RuleRef>) -> Result<Self, RuleError> {
        check_at_least_two("And", &rules)?;
        Ok(Self { rules })
    }

    /// Add one more rule.
    pub fn and(mut self, rule: impl RuleExt) -> Self {
        self.rules.push(rule.shared());
        self
    }

    /// The combined rules.
    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }
}

impl Rule for And {
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        self.rules.iter().fold(true, |succeed, rule| {
            rule.validate(value, name, model, result, translate) && succeed
        })
    }
}

/// Passes as soon as one rule passes.
///
/// Messages from rules tried before the passing one are discarded. When
/// every rule fails, all of their messages are kept.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Or, Range, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let rule = Or::new(Range::between(1, 5).unwrap(), Range::between(11, 15).unwrap());
/// let mut errors = Vec::new();
///
/// assert!(rule.validate(&Value::from(12), "n", &model, &mut errors, &NoTranslation));
/// assert!(errors.is_empty());
/// assert!(!rule.validate(&Value::from(0), "n", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Or {
    rules: Vec<RuleRef>,
}

impl Or {
    /// Combine two rules.
    pub fn new(first: impl RuleExt, second: impl RuleExt) -> Self {
        Self {
            rules: vec![first.shared(), second.shared()],
        }
    }

    /// Combine a list of rules; at least two are required.
    pub fn try_from_rules(rules: Vec<RuleRef>) -> Result<Self, RuleError> {
        check_at_least_two("Or", &rules)?;
        Ok(Self { rules })
    }

    /// Add one more alternative.
    pub fn or(mut self, rule: impl RuleExt) -> Self {
        self.rules.push(rule.shared());
        self
    }

    /// The combined rules.
    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }
}

impl Rule for Or {
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        let mut errors = Vec::new();
        for rule in &self.rules {
            if rule.validate(value, name, model, &mut errors, translate) {
                return true;
            }
        }
        result.append(&mut errors);
        false
    }
}

fn check_at_least_two(rule: &'static str, rules: &[RuleRef]) -> Result<(), RuleError> {
    if rules.len() < 2 {
        return Err(RuleError::TooFewRules {
            rule,
            given: rules.len(),
        });
    }
    Ok(())
}

/// Applies each rule to every item of a collection.
///
/// Lists yield their items and maps their values; any other value is
/// checked as a single item. `None` passes.
///
/// With [`Mode::StopOnFirst`] (the default) a rule stops at its first
/// failing item, and the next rule still runs. The result is the AND of
/// every rule/item check attempted.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{IteratorRule, Range, Required, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::validator::Mode;
/// use stillform::{rules, Value};
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let each = IteratorRule::try_new(rules![Required::new(), Range::between(1, 5).unwrap()]).unwrap();
/// let lucky = Value::from(vec![1, 7, 9]);
///
/// let mut errors = Vec::new();
/// assert!(!each.validate(&lucky, "lucky", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors.len(), 1);
///
/// let each = each.with_mode(Mode::CollectAll);
/// let mut errors = Vec::new();
/// assert!(!each.validate(&lucky, "lucky", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct IteratorRule {
    rules: Vec<RuleRef>,
    mode: Mode,
}

impl IteratorRule {
    /// Build from a non-empty rule list.
    pub fn try_new(rules: Vec<RuleRef>) -> Result<Self, RuleError> {
        if rules.is_empty() {
            return Err(RuleError::Empty("IteratorRule"));
        }
        Ok(Self {
            rules,
            mode: Mode::StopOnFirst,
        })
    }

    /// Build from a single rule.
    pub fn each(rule: impl RuleExt) -> Self {
        Self {
            rules: vec![rule.shared()],
            mode: Mode::StopOnFirst,
        }
    }

    /// Whether each rule stops at its first failing item.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// The configured mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl Rule for IteratorRule {
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        let items: Vec<&Value> = match value {
            Value::None => return true,
            Value::List(items) => items.iter().collect(),
            Value::Map(map) => map.values().collect(),
            other => slice::from_ref(other).iter().collect(),
        };
        let mut succeed = true;
        for rule in &self.rules {
            for item in &items {
                if !rule.validate(item, name, model, result, translate) {
                    succeed = false;
                    if self.mode == Mode::StopOnFirst {
                        break;
                    }
                }
            }
        }
        succeed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Ignore, Range, Required};
    use crate::translate::NoTranslation;
    use std::collections::BTreeMap;

    fn check(rule: &dyn Rule, value: impl Into<Value>, errors: &mut Vec<String>) -> bool {
        let model: BTreeMap<String, Value> = BTreeMap::new();
        rule.validate(&value.into(), "f", &model, errors, &NoTranslation)
    }

    #[test]
    fn test_and() {
        let rule = And::new(Required::new(), Range::between(1, 5).unwrap());
        let mut errors = Vec::new();
        assert!(check(&rule, 1, &mut errors));
        assert!(errors.is_empty());
        assert!(!check(&rule, 0, &mut errors));
        assert_eq!(
            errors,
            [
                "Required field cannot be left blank.",
                "The value must fall within the range 1 - 5."
            ]
        );
    }

    #[test]
    fn test_and_is_false_when_any_rule_fails() {
        let rule = And::new(Range::at_most(0), Ignore).and(Ignore);
        assert_eq!(rule.rules().len(), 3);
        let mut errors = Vec::new();
        assert!(!check(&rule, 1, &mut errors));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_and_or_require_two_rules() {
        assert_eq!(
            And::try_from_rules(Vec::new()).unwrap_err(),
            RuleError::TooFewRules { rule: "And", given: 0 }
        );
        assert_eq!(
            Or::try_from_rules(crate::rules![Range::any()]).unwrap_err(),
            RuleError::TooFewRules { rule: "Or", given: 1 }
        );
        assert!(And::try_from_rules(crate::rules![Ignore, Ignore]).is_ok());
    }

    #[test]
    fn test_or() {
        let rule = Or::new(Range::between(1, 5).unwrap(), Range::between(11, 15).unwrap());
        let mut errors = Vec::new();
        assert!(check(&rule, 1, &mut errors));
        assert!(check(&rule, 12, &mut errors));
        assert!(errors.is_empty());
        assert!(!check(&rule, 0, &mut errors));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_iterator() {
        let rule =
            IteratorRule::try_new(crate::rules![Required::new(), Range::between(1, 5).unwrap()])
                .unwrap();
        let mut errors = Vec::new();
        assert!(check(&rule, Value::None, &mut errors));
        assert!(check(&rule, vec![1, 2, 3], &mut errors));
        assert!(errors.is_empty());

        assert!(!check(&rule, vec![1, 7, 9], &mut errors));
        assert_eq!(errors.len(), 1);

        let rule = rule.with_mode(Mode::CollectAll);
        errors.clear();
        assert!(!check(&rule, vec![1, 7, 9], &mut errors));
        assert_eq!(errors.len(), 2);

        assert_eq!(
            IteratorRule::try_new(Vec::new()).unwrap_err(),
            RuleError::Empty("IteratorRule")
        );
    }

    #[test]
    fn test_iterator_over_maps_and_scalars() {
        let rule = IteratorRule::each(Range::at_most(5));
        let mut errors = Vec::new();
        let map = Value::Map(BTreeMap::from([
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(9)),
        ]));
        assert!(!check(&rule, map, &mut errors));
        assert!(check(&rule, 3, &mut errors));
        assert!(!check(&rule, 6, &mut errors));
        assert_eq!(errors.len(), 2);
    }
}
