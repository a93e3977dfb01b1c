//! Uniform access to models
//!
//! The validator and the model updater never look inside a model directly.
//! They go through [`Model`] (get-by-name) and [`ModelMut`] (set-by-name),
//! which have two implementations:
//!
//! - key-value mappings: `BTreeMap<String, Value>` and `HashMap<String, Value>`
//! - plain structs, via the [`model!`](crate::model!) macro
//!
//! # Example
//!
//! ```rust
//! use stillform::model::{Model, ModelMut};
//! use stillform::Value;
//! use std::collections::BTreeMap;
//!
//! let mut user: BTreeMap<String, Value> = BTreeMap::new();
//! user.insert("name".into(), Value::from(""));
//!
//! user.set("name", Value::from("john")).unwrap();
//! assert_eq!(Model::get(&user, "name"), Some(Value::from("john")));
//! assert!(user.set("age", Value::from(3)).is_err());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use thiserror::Error;

use crate::value::{FieldKind, Value};

/// Errors raised by model setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The model has no field with this name.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// The value does not fit the field's declared type.
    #[error("field '{field}' cannot hold a value of this kind")]
    TypeMismatch {
        /// Field name.
        field: String,
    },
    /// The field cannot be assigned (for example a nested model).
    #[error("field '{0}' is read-only")]
    ReadOnly(String),
}

impl ModelError {
    /// Build a [`ModelError::TypeMismatch`] for `field`.
    pub fn type_mismatch(field: &str) -> Self {
        ModelError::TypeMismatch {
            field: field.to_string(),
        }
    }
}

/// Read access to a model's fields by name.
pub trait Model {
    /// Names of the fields this model declares.
    fn field_names(&self) -> Vec<&str>;

    /// Current value of a field, `None` if the field does not exist.
    fn get(&self, name: &str) -> Option<Value>;

    /// Kind of a field, `None` if the field does not exist.
    fn kind(&self, name: &str) -> Option<FieldKind>;

    /// A field holding a nested model, used by nested validators.
    fn submodel(&self, _name: &str) -> Option<&dyn Model> {
        None
    }

    /// Copy every field into a map.
    fn snapshot(&self) -> BTreeMap<String, Value> {
        self.field_names()
            .into_iter()
            .filter_map(|name| self.get(name).map(|value| (name.to_string(), value)))
            .collect()
    }
}

/// Write access to a model's fields by name.
pub trait ModelMut: Model {
    /// Assign a field.
    fn set(&mut self, name: &str, value: Value) -> Result<(), ModelError>;
}

impl Model for BTreeMap<String, Value> {
    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned()
    }

    fn kind(&self, name: &str) -> Option<FieldKind> {
        BTreeMap::get(self, name).map(Value::field_kind)
    }

    fn submodel(&self, name: &str) -> Option<&dyn Model> {
        match BTreeMap::get(self, name) {
            Some(Value::Map(map)) => Some(map),
            _ => None,
        }
    }
}

impl ModelMut for BTreeMap<String, Value> {
    fn set(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ModelError::UnknownField(name.to_string())),
        }
    }
}

impl<S: BuildHasher> Model for HashMap<String, Value, S> {
    fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }

    fn kind(&self, name: &str) -> Option<FieldKind> {
        HashMap::get(self, name).map(Value::field_kind)
    }

    fn submodel(&self, name: &str) -> Option<&dyn Model> {
        match HashMap::get(self, name) {
            Some(Value::Map(map)) => Some(map),
            _ => None,
        }
    }
}

impl<S: BuildHasher> ModelMut for HashMap<String, Value, S> {
    fn set(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ModelError::UnknownField(name.to_string())),
        }
    }
}

/// Implement [`Model`] and [`ModelMut`] for a plain struct.
///
/// List the fields to expose; each field type must implement
/// [`Field`](crate::value::Field), which declares the field's kind.
/// Fields holding another model go in an optional `nested { ... }`
/// section; they are readable and validatable but not assignable.
///
/// # Example
///
/// ```rust
/// use stillform::model;
/// use stillform::model::{Model, ModelMut};
/// use stillform::value::{FieldKind, Value, ValueKind};
///
/// #[derive(Default)]
/// struct Address {
///     city: String,
/// }
///
/// #[derive(Default)]
/// struct User {
///     name: String,
///     age: i64,
///     address: Address,
/// }
///
/// model!(Address { city });
/// model!(User { name, age; nested { address } });
///
/// let mut user = User::default();
/// user.set("age", Value::from(33)).unwrap();
/// assert_eq!(user.age, 33);
/// assert_eq!(user.kind("name"), Some(FieldKind::Scalar(ValueKind::Str)));
/// assert!(user.submodel("address").is_some());
/// assert!(user.set("age", Value::from("x")).is_err());
/// ```
#[macro_export]
macro_rules! model {
    ($ty:ty { $($field:ident),* $(,)? $(; nested { $($sub:ident),* $(,)? })? }) => {
        impl $crate::model::Model for $ty {
            fn field_names(&self) -> ::std::vec::Vec<&str> {
                ::std::vec![$(stringify!($field),)* $($(stringify!($sub),)*)?]
            }

            fn get(&self, name: &str) -> ::std::option::Option<$crate::Value> {
                match name {
                    $(stringify!($field) => ::std::option::Option::Some(
                        $crate::value::Field::to_value(&self.$field),
                    ),)*
                    $($(stringify!($sub) => ::std::option::Option::Some(
                        $crate::Value::Map($crate::model::Model::snapshot(&self.$sub)),
                    ),)*)?
                    _ => ::std::option::Option::None,
                }
            }

            fn kind(&self, name: &str) -> ::std::option::Option<$crate::value::FieldKind> {
                match name {
                    $(stringify!($field) => ::std::option::Option::Some(
                        $crate::value::kind_of(&self.$field),
                    ),)*
                    $($(stringify!($sub) => ::std::option::Option::Some(
                        $crate::value::FieldKind::Map,
                    ),)*)?
                    _ => ::std::option::Option::None,
                }
            }

            fn submodel(&self, name: &str) -> ::std::option::Option<&dyn $crate::model::Model> {
                match name {
                    $($(stringify!($sub) => ::std::option::Option::Some(&self.$sub),)*)?
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl $crate::model::ModelMut for $ty {
            fn set(
                &mut self,
                name: &str,
                value: $crate::Value,
            ) -> ::std::result::Result<(), $crate::model::ModelError> {
                match name {
                    $(stringify!($field) => {
                        self.$field = $crate::value::Field::from_value(value)
                            .ok_or_else(|| $crate::model::ModelError::type_mismatch(name))?;
                        ::std::result::Result::Ok(())
                    })*
                    $($(stringify!($sub) => ::std::result::Result::Err(
                        $crate::model::ModelError::ReadOnly(name.to_string()),
                    ),)*)?
                    _ => ::std::result::Result::Err(
                        $crate::model::ModelError::UnknownField(name.to_string()),
                    ),
                }
            }
        }
    };
}
