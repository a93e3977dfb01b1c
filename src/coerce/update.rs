//! Populating a model from raw form input

use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::{CoercionError, RawInput, ValueProviders};
use crate::errors::Errors;
use crate::format::{FormatProvider, Formats};
use crate::model::ModelMut;
use crate::translate::{render, Translate};
use crate::value::{FieldKind, Value, ValueKind};

/// Raw input keyed by field name.
pub type RawValues = BTreeMap<String, RawInput>;

/// Message recorded when a value is malformed.
pub const INVALID_VALUE: &str = "The value '{value}' is invalid.";
/// Message recorded when an empty value cannot be assigned.
pub const INVALID_EMPTY_VALUE: &str = "Input was not in a correct format.";
/// Message recorded when no date/time pattern matched.
pub const UNPARSEABLE_VALUE: &str = "The value '{value}' is not in one of supported formats.";
/// Message recorded when any element of a sequence failed.
pub const INVALID_MULTIPLE_VALUE: &str = "Multiple input was not in a correct format.";

static DEFAULT_UPDATER: LazyLock<ModelUpdater> = LazyLock::new(ModelUpdater::default);

/// Coerces raw input into a model's fields.
///
/// The provider for each field is chosen from the field's declared kind.
/// Fields without a registered provider are skipped. Failures are recorded
/// per field in the caller's [`Errors`]; a failing field keeps its original
/// value while succeeding fields are still written.
///
/// # Example
///
/// ```rust
/// use stillform::coerce::{ModelUpdater, RawValues};
/// use stillform::format::Formats;
/// use stillform::translate::NoTranslation;
/// use stillform::{Errors, Value};
/// use std::collections::BTreeMap;
///
/// let de = Formats {
///     decimal_separator: ",".into(),
///     thousands_separator: ".".into(),
///     ..Formats::default()
/// };
/// let updater = ModelUpdater::with_formats(&de).unwrap();
///
/// let mut model = BTreeMap::from([("amount".to_string(), Value::Float(0.0))]);
/// let values = RawValues::from([("amount".to_string(), "1.234,5".into())]);
/// let mut errors = Errors::new();
///
/// assert!(updater.try_update(&mut model, &values, &mut errors, &NoTranslation));
/// assert_eq!(model["amount"], Value::Float(1234.5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelUpdater {
    providers: ValueProviders,
    formats: FormatProvider,
}

impl ModelUpdater {
    /// An updater with custom providers and formats.
    pub fn new(providers: ValueProviders, formats: FormatProvider) -> Self {
        Self { providers, formats }
    }

    /// An updater with the default providers and the given formats.
    pub fn with_formats(formats: &Formats) -> Result<Self, crate::format::FormatError> {
        Ok(Self::new(ValueProviders::default(), FormatProvider::new(formats)?))
    }

    /// The provider registry.
    pub fn providers(&self) -> &ValueProviders {
        &self.providers
    }

    /// The compiled formats.
    pub fn formats(&self) -> &FormatProvider {
        &self.formats
    }

    /// Update every model field present in `values`.
    ///
    /// Returns `true` iff no field produced an error.
    pub fn try_update<M>(
        &self,
        model: &mut M,
        values: &RawValues,
        results: &mut Errors,
        translate: &dyn Translate,
    ) -> bool
    where
        M: ModelMut + ?Sized,
    {
        let names: Vec<String> = model
            .field_names()
            .into_iter()
            .filter(|name| values.contains_key(*name))
            .map(str::to_string)
            .collect();

        let mut succeeded = true;
        for name in names {
            let (Some(raw), Some(kind)) = (values.get(&name), model.kind(&name)) else {
                continue;
            };
            let outcome = match kind {
                FieldKind::List(element) => self.update_list(model, &name, element, raw),
                FieldKind::Scalar(kind) => self.update_scalar(model, &name, kind, raw),
                FieldKind::Null | FieldKind::Map => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Skipping field '{}': no provider for {:?}", name, kind);
                    Ok(())
                }
            };
            if let Err(failure) = outcome {
                #[cfg(feature = "tracing")]
                tracing::debug!("Field '{}' rejected input: {:?}", name, failure);
                results.push(&name, failure.message(translate));
                succeeded = false;
            }
        }
        succeeded
    }

    fn update_scalar<M>(
        &self,
        model: &mut M,
        name: &str,
        kind: ValueKind,
        raw: &RawInput,
    ) -> Result<(), Failure>
    where
        M: ModelMut + ?Sized,
    {
        let text = match raw {
            RawInput::Typed(value) => {
                return model
                    .set(name, value.clone())
                    .map_err(|_| Failure::Invalid(value.to_string()));
            }
            _ => raw.scalar().unwrap_or_default(),
        };
        let Some(provider) = self.providers.get(kind) else {
            #[cfg(feature = "tracing")]
            tracing::debug!("Skipping field '{}': no provider for {:?}", name, kind);
            return Ok(());
        };
        let value = match provider(text, &self.formats) {
            Ok(value) => value.unwrap_or(Value::None),
            Err(CoercionError::Invalid { .. }) => return Err(Failure::Invalid(text.to_string())),
            Err(CoercionError::Unparseable { .. }) => {
                return Err(Failure::Unparseable(text.to_string()))
            }
        };
        model
            .set(name, value)
            .map_err(|_| Failure::Invalid(text.to_string()))
    }

    fn update_list<M>(
        &self,
        model: &mut M,
        name: &str,
        element: Option<ValueKind>,
        raw: &RawInput,
    ) -> Result<(), Failure>
    where
        M: ModelMut + ?Sized,
    {
        if let RawInput::Typed(value) = raw {
            return model
                .set(name, value.clone())
                .map_err(|_| Failure::Multiple);
        }
        let kind = element.unwrap_or(ValueKind::Str);
        let Some(provider) = self.providers.get(kind) else {
            #[cfg(feature = "tracing")]
            tracing::debug!("Skipping field '{}': no provider for {:?}", name, kind);
            return Ok(());
        };
        let items = raw
            .items()
            .into_iter()
            .map(|item| provider(item, &self.formats).map(|v| v.unwrap_or(Value::None)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Failure::Multiple)?;
        model
            .set(name, Value::List(items))
            .map_err(|_| Failure::Multiple)
    }
}

/// Update `model` from `values` with the default providers and formats.
///
/// Returns `true` iff no field produced an error.
///
/// # Example
///
/// ```rust
/// use stillform::coerce::{try_update_model, RawValues};
/// use stillform::translate::NoTranslation;
/// use stillform::{Errors, Value};
/// use std::collections::BTreeMap;
///
/// let mut model = BTreeMap::from([
///     ("age".to_string(), Value::Int(0)),
///     ("name".to_string(), Value::from("")),
/// ]);
/// let values = RawValues::from([
///     ("age".to_string(), "x".into()),
///     ("name".to_string(), "john".into()),
/// ]);
/// let mut errors = Errors::new();
///
/// assert!(!try_update_model(&mut model, &values, &mut errors, &NoTranslation));
/// assert_eq!(errors["age"], ["The value 'x' is invalid."]);
/// assert_eq!(model["age"], Value::Int(0));
/// assert_eq!(model["name"], Value::from("john"));
/// ```
pub fn try_update_model<M>(
    model: &mut M,
    values: &RawValues,
    results: &mut Errors,
    translate: &dyn Translate,
) -> bool
where
    M: ModelMut + ?Sized,
{
    DEFAULT_UPDATER.try_update(model, values, results, translate)
}

#[derive(Debug)]
enum Failure {
    Invalid(String),
    Unparseable(String),
    Multiple,
}

impl Failure {
    fn message(&self, translate: &dyn Translate) -> String {
        match self {
            Failure::Invalid(value) if value.trim().is_empty() => {
                render(translate, INVALID_EMPTY_VALUE, &[])
            }
            Failure::Invalid(value) => render(translate, INVALID_VALUE, &[("value", value)]),
            Failure::Unparseable(value) => {
                render(translate, UNPARSEABLE_VALUE, &[("value", value)])
            }
            Failure::Multiple => render(translate, INVALID_MULTIPLE_VALUE, &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::NoTranslation;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Debug, Default)]
    struct Registration {
        name: String,
        age: i64,
        balance: Option<Decimal>,
        score: f64,
        accepted: bool,
        birthday: Option<NaiveDate>,
        lucky: Vec<i64>,
    }

    crate::model!(Registration {
        name,
        age,
        balance,
        score,
        accepted,
        birthday,
        lucky,
    });

    fn raw(pairs: &[(&str, RawInput)]) -> RawValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_update_struct_model() {
        let mut model = Registration::default();
        let values = raw(&[
            ("name", "john".into()),
            ("age", "33".into()),
            ("balance", "1,007.85".into()),
            ("score", "4.5".into()),
            ("accepted", "1".into()),
            ("birthday", "2012/2/4".into()),
            ("lucky", vec!["1", "7", "9"].into()),
        ]);
        let mut errors = Errors::new();

        assert!(try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert!(errors.is_empty());
        assert_eq!(model.name, "john");
        assert_eq!(model.age, 33);
        assert_eq!(model.balance, Some(Decimal::from_str("1007.85").unwrap()));
        assert_eq!(model.score, 4.5);
        assert!(model.accepted);
        assert_eq!(model.birthday, NaiveDate::from_ymd_opt(2012, 2, 4));
        assert_eq!(model.lucky, vec![1, 7, 9]);
    }

    #[test]
    fn test_fields_absent_from_values_are_untouched() {
        let mut model = Registration {
            name: "keep".into(),
            ..Default::default()
        };
        let mut errors = Errors::new();
        let values = raw(&[("age", "1".into())]);
        assert!(try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(model.name, "keep");
        assert_eq!(model.age, 1);
    }

    #[test]
    fn test_failures_preserve_original_values() {
        let mut model = Registration {
            age: 5,
            birthday: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Default::default()
        };
        let values = raw(&[
            ("age", "x".into()),
            ("birthday", "2.4.12".into()),
            ("name", "ok".into()),
        ]);
        let mut errors = Errors::new();

        assert!(!try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(errors["age"], ["The value 'x' is invalid."]);
        assert_eq!(
            errors["birthday"],
            ["The value '2.4.12' is not in one of supported formats."]
        );
        assert_eq!(model.age, 5);
        assert_eq!(model.birthday, NaiveDate::from_ymd_opt(2000, 1, 1));
        assert_eq!(model.name, "ok");
    }

    #[test]
    fn test_empty_numeric_input() {
        let mut model = Registration {
            age: 5,
            balance: Some(Decimal::ONE),
            ..Default::default()
        };
        let values = raw(&[("age", " ".into()), ("balance", "".into())]);
        let mut errors = Errors::new();

        assert!(!try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(errors["age"], ["Input was not in a correct format."]);
        assert_eq!(model.age, 5);
        assert_eq!(model.balance, None);
        assert!(errors.get("balance").is_none());
    }

    #[test]
    fn test_list_update_is_atomic() {
        let mut model = Registration {
            lucky: vec![3],
            ..Default::default()
        };
        let values = raw(&[("lucky", vec!["1", "x", "9"].into())]);
        let mut errors = Errors::new();

        assert!(!try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(errors["lucky"], ["Multiple input was not in a correct format."]);
        assert_eq!(model.lucky, vec![3]);
    }

    #[test]
    fn test_scalar_takes_last_list_element() {
        let mut model = Registration::default();
        let values = raw(&[("age", vec!["1", "2"].into())]);
        let mut errors = Errors::new();
        assert!(try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(model.age, 2);
    }

    #[test]
    fn test_map_model_skips_unregistered_kinds() {
        let mut model = BTreeMap::from([
            ("nothing".to_string(), Value::None),
            ("tags".to_string(), Value::List(Vec::new())),
            ("price".to_string(), Value::Float(0.0)),
        ]);
        let values = raw(&[
            ("nothing", "x".into()),
            ("tags", vec!["a", "b"].into()),
            ("price", "1.5".into()),
            ("unknown", "1".into()),
        ]);
        let updater = ModelUpdater::new(
            ValueProviders::default().without(ValueKind::Float),
            FormatProvider::default(),
        );
        let mut errors = Errors::new();

        assert!(updater.try_update(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(model["nothing"], Value::None);
        assert_eq!(model["tags"], Value::from(vec!["a", "b"]));
        assert_eq!(model["price"], Value::Float(0.0));
        assert!(!model.contains_key("unknown"));
    }

    #[test]
    fn test_messages_are_translated() {
        let mut model = Registration::default();
        let values = raw(&[("age", "x".into())]);
        let mut errors = Errors::new();
        let translate = |t: &str| t.replace("is invalid", "ist ungültig");

        assert!(!try_update_model(&mut model, &values, &mut errors, &translate));
        assert_eq!(errors["age"], ["The value 'x' ist ungültig."]);
    }

    #[test]
    fn test_typed_input_passes_through() {
        let mut model = Registration::default();
        let values = raw(&[("age", RawInput::Typed(Value::Int(41)))]);
        let mut errors = Errors::new();
        assert!(try_update_model(&mut model, &values, &mut errors, &NoTranslation));
        assert_eq!(model.age, 41);
    }

    #[cfg(feature = "tracing")]
    #[test]
    #[tracing_test::traced_test]
    fn test_rejected_input_is_traced() {
        let mut model = Registration::default();
        let values = raw(&[("age", "x".into())]);
        let mut errors = Errors::new();
        try_update_model(&mut model, &values, &mut errors, &NoTranslation);
        assert!(logs_contain("Field 'age' rejected input"));
    }
}
