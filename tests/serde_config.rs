//! Serialization of configuration and error reports
#![cfg(feature = "serde")]

use stillform::prelude::*;
use stillform::{rules, FormatProvider};

#[test]
fn test_formats_from_partial_json() {
    let json = r#"{
        "decimal_separator": ",",
        "thousands_separator": ".",
        "date_input_format": "%d.%m.%Y"
    }"#;
    let formats: Formats = serde_json::from_str(json).unwrap();

    assert_eq!(formats.decimal_separator, ",");
    assert_eq!(formats.date_input_format, "%d.%m.%Y");
    assert_eq!(formats.time_input_format, Formats::default().time_input_format);
    assert_eq!(formats.boolean_true_values, ["1", "True"]);

    let provider = FormatProvider::new(&formats).unwrap();
    assert_eq!(provider.normalize_number("1.234,5"), "1234.5");
}

#[test]
fn test_formats_roundtrip() {
    let formats = Formats {
        boolean_true_values: vec!["yes".into(), "on".into()],
        ..Formats::default()
    };
    let json = serde_json::to_string(&formats).unwrap();
    let back: Formats = serde_json::from_str(&json).unwrap();
    assert_eq!(back, formats);
}

#[test]
fn test_invalid_pattern_in_config_is_reported() {
    let formats: Formats = serde_json::from_str(r#"{"time_input_format": "%H:%Q"}"#).unwrap();
    assert!(FormatProvider::new(&formats).is_err());
    assert!(ModelUpdater::with_formats(&formats).is_err());
}

#[test]
fn test_mode_names() {
    assert_eq!(serde_json::to_string(&Mode::CollectAll).unwrap(), r#""CollectAll""#);
    let mode: Mode = serde_json::from_str(r#""StopOnFirst""#).unwrap();
    assert_eq!(mode, Mode::StopOnFirst);
}

#[test]
fn test_errors_serialize_per_field() {
    let validator = Validator::new()
        .field("email", rules![Required::new()])
        .field("age", rules![Range::at_least(18)]);
    let model = std::collections::BTreeMap::from([
        ("email".to_string(), Value::from("")),
        ("age".to_string(), Value::from(3)),
    ]);

    let errors = validator.check(&model).unwrap_err();
    let json = serde_json::to_value(&errors).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "fields": {
                "age": ["The value must be greater or equal to 18."],
                "email": ["Required field cannot be left blank."]
            }
        })
    );

    let back: Errors = serde_json::from_value(json).unwrap();
    assert_eq!(back, errors);
}

#[test]
fn test_nested_errors_serialize() {
    let mut nested = Errors::new();
    nested.push("zip", "bad");
    let mut errors = Errors::new();
    errors.merge_nested("address", nested);

    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json["nested"]["address"]["fields"]["zip"][0], "bad");
}
