//! # Stillform
//!
//! > *Validate what the form says, coerce what the form means*
//!
//! A Rust library for field validation rules and locale-aware coercion of
//! form input into typed models.
//!
//! ## Overview
//!
//! **Stillform** has two halves that work on the same model:
//! - **Coercion** turns raw strings (or lists of strings) into typed field
//!   values, honouring locale separators and fallback date formats
//! - **Validation** runs composable rules over each field and collects
//!   human-readable messages per field
//!
//! Models are plain structs (via [`model!`]) or string-keyed maps. Nothing
//! here touches I/O, and rules and validators are immutable once built, so
//! one instance can serve every request.
//!
//! ## Quick Example
//!
//! ```rust
//! use stillform::prelude::*;
//! use stillform::{model, rules};
//!
//! #[derive(Debug, Default)]
//! struct Signup {
//!     email: String,
//!     age: Option<i64>,
//! }
//!
//! model!(Signup { email, age });
//!
//! let validator = Validator::new()
//!     .field("email", rules![Required::new(), Email::new()])
//!     .field("age", rules![Range::at_least(18)]);
//!
//! let mut signup = Signup::default();
//! let input = RawValues::from([
//!     ("email".to_string(), "john@example.org".into()),
//!     ("age".to_string(), "17".into()),
//! ]);
//!
//! let mut errors = Errors::new();
//! assert!(try_update_model(&mut signup, &input, &mut errors, &NoTranslation));
//! assert_eq!(signup.age, Some(17));
//!
//! assert!(!validator.validate(&signup, &mut errors));
//! assert_eq!(errors["age"], ["The value must be greater or equal to 18."]);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod coerce;
pub mod errors;
pub mod format;
pub mod model;
pub mod rules;
pub mod testing;
pub mod translate;
pub mod validator;
pub mod value;

// Re-exports
pub use coerce::{try_update_model, CoercionError, ModelUpdater, RawInput, RawValues};
pub use errors::Errors;
pub use format::{FormatError, FormatProvider, Formats};
pub use model::{Model, ModelError, ModelMut};
pub use rules::{Rule, RuleError, RuleExt, RuleRef, Strategy};
pub use translate::{NoTranslation, Translate};
pub use validator::{Mode, Validator};
pub use value::{Field, FieldKind, Value, ValueKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coerce::{try_update_model, ModelUpdater, RawInput, RawValues};
    pub use crate::errors::Errors;
    pub use crate::format::Formats;
    pub use crate::model::{Model, ModelMut};
    pub use crate::rules::{
        And, Base64, Clock, Compare, Email, Ignore, IntAdapter, IteratorRule, Length, Missing,
        NotNone, OneOf, Or, Predicate, Range, RelativeDelta, Regex, Required, Rule, RuleExt,
        Scientific, Slug, ValuePredicate,
    };
    pub use crate::translate::{NoTranslation, Translate};
    pub use crate::validator::{Mode, Validator};
    pub use crate::value::Value;
}
