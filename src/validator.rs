//! Field-by-field validation of a model
//!
//! A [`Validator`] maps field names to rule lists. Validation fetches each
//! field's value through [`Model`], runs its rules in order and records
//! the messages of failing rules under the field's name. A field with no
//! entry in the result passed.
//!
//! Fields holding a sub-model are validated by a nested [`Validator`];
//! its errors are recorded under the composite field's name.
//!
//! # Example
//!
//! ```rust
//! use stillform::rules::{Email, Length, OneOf, Required};
//! use stillform::validator::{Mode, Validator};
//! use stillform::translate::NoTranslation;
//! use stillform::{rules, Errors, Value};
//! use std::collections::BTreeMap;
//!
//! let validator = Validator::new()
//!     .field("email", rules![
//!         Required::new(),
//!         Length::at_least(6),
//!         Length::at_most(30),
//!         Email::new(),
//!     ])
//!     .field("account_type", rules![
//!         Required::new(),
//!         OneOf::try_new(["user", "business"]).unwrap(),
//!     ]);
//!
//! let model = BTreeMap::from([
//!     ("email".to_string(), Value::from("")),
//!     ("account_type".to_string(), Value::from("x")),
//! ]);
//!
//! let mut errors = Errors::new();
//! assert!(!validator.validate(&model, &mut errors));
//! assert_eq!(errors["email"], ["Required field cannot be left blank."]);
//! assert_eq!(
//!     errors["account_type"],
//!     ["The value does not belong to the list of known items."]
//! );
//!
//! let mut errors = Errors::new();
//! validator.validate_with(&model, &mut errors, Mode::CollectAll, &NoTranslation);
//! assert_eq!(errors["email"].len(), 3);
//! ```

use std::collections::BTreeMap;

use crate::errors::Errors;
use crate::model::Model;
use crate::rules::RuleRef;
use crate::translate::{NoTranslation, Translate};

/// How many failing rules a field reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Stop a field's rule list at its first failing rule.
    #[default]
    StopOnFirst,
    /// Run every rule and report every failure.
    CollectAll,
}

/// What a validator runs for one field.
#[derive(Debug, Clone)]
pub enum FieldRules {
    /// Rules applied in order to the field's value.
    Rules(Vec<RuleRef>),
    /// A validator applied to the sub-model held by the field.
    Nested(Validator),
}

/// Named rule lists applied to a model.
///
/// Built once, then shared freely: validation never mutates the validator.
/// Fields are visited in name order, so error output is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    fields: BTreeMap<String, FieldRules>,
}

impl Validator {
    /// A validator with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule list for `name`, replacing any previous entry.
    pub fn field(mut self, name: impl Into<String>, rules: Vec<RuleRef>) -> Self {
        self.fields.insert(name.into(), FieldRules::Rules(rules));
        self
    }

    /// Validate the sub-model held by `name` with `validator`.
    pub fn nested(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.fields.insert(name.into(), FieldRules::Nested(validator));
        self
    }

    /// Number of fields with rules.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` when no field has rules.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The configured fields in validation order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    /// Validate with [`Mode::StopOnFirst`] and no translation.
    ///
    /// Returns `true` iff every rule attempted passed.
    pub fn validate(&self, model: &dyn Model, results: &mut Errors) -> bool {
        self.validate_with(model, results, Mode::StopOnFirst, &NoTranslation)
    }

    /// Validate `model`, appending failures to `results`.
    ///
    /// The result is the AND of every rule that ran, whatever the mode;
    /// `mode` only limits how many messages a field collects.
    pub fn validate_with(
        &self,
        model: &dyn Model,
        results: &mut Errors,
        mode: Mode,
        translate: &dyn Translate,
    ) -> bool {
        let mut succeed = true;
        for (name, field) in &self.fields {
            #[cfg(feature = "tracing")]
            tracing::trace!("Validating field '{}'", name);

            match field {
                FieldRules::Rules(rules) => {
                    let value = model.get(name).unwrap_or_default();
                    let mut messages = Vec::new();
                    for rule in rules {
                        if !rule.validate(&value, name, model, &mut messages, translate) {
                            succeed = false;
                            if mode == Mode::StopOnFirst {
                                break;
                            }
                        }
                    }
                    if !messages.is_empty() {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("Field '{}' failed validation: {:?}", name, messages);
                        results.extend(name, messages);
                    }
                }
                FieldRules::Nested(validator) => {
                    let Some(submodel) = model.submodel(name) else {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("Skipping nested field '{}': no sub-model", name);
                        continue;
                    };
                    let mut nested = Errors::new();
                    if !validator.validate_with(submodel, &mut nested, mode, translate) {
                        succeed = false;
                    }
                    results.merge_nested(name, nested);
                }
            }
        }
        succeed
    }

    /// Validate with the defaults and return the errors, if any.
    ///
    /// ```rust
    /// use stillform::rules::Required;
    /// use stillform::validator::Validator;
    /// use stillform::{rules, Value};
    /// use std::collections::BTreeMap;
    ///
    /// let validator = Validator::new().field("name", rules![Required::new()]);
    /// let model = BTreeMap::from([("name".to_string(), Value::from("john"))]);
    /// assert!(validator.check(&model).is_ok());
    /// ```
    pub fn check(&self, model: &dyn Model) -> Result<(), Errors> {
        let mut errors = Errors::new();
        if self.validate(model, &mut errors) {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
