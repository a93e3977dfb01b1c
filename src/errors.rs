//! Per-field error collections
//!
//! [`Errors`] is the caller-owned aggregate both the validator and the model
//! updater write into. A field with no entry passed. Nested validators record
//! their sub-model's errors under the composite field's key.
//!
//! # Example
//!
//! ```rust
//! use stillform::Errors;
//!
//! let mut errors = Errors::new();
//! errors.push("email", "Required field cannot be left blank.");
//! assert_eq!(errors["email"], ["Required field cannot be left blank."]);
//! assert!(errors.get("name").is_none());
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Errors {
    fields: BTreeMap<String, Vec<String>>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "BTreeMap::is_empty")
    )]
    nested: BTreeMap<String, Errors>,
}

impl Errors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no field and no nested model recorded an error.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.nested.is_empty()
    }

    /// Number of fields carrying messages, nested models included.
    pub fn len(&self) -> usize {
        self.fields.len() + self.nested.len()
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// First message recorded for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    /// Errors recorded for a nested model.
    pub fn nested(&self, field: &str) -> Option<&Errors> {
        self.nested.get(field)
    }

    /// `true` if the field has messages or nested errors.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field) || self.nested.contains_key(field)
    }

    /// Append one message to a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Append several messages to a field; no-op when `messages` is empty.
    pub fn extend<I>(&mut self, field: &str, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut messages = messages.into_iter().peekable();
        if messages.peek().is_none() {
            return;
        }
        self.fields
            .entry(field.to_string())
            .or_default()
            .extend(messages);
    }

    /// Replace a field's messages.
    pub fn set(&mut self, field: &str, messages: Vec<String>) {
        if messages.is_empty() {
            self.fields.remove(field);
        } else {
            self.fields.insert(field.to_string(), messages);
        }
    }

    /// Union a nested model's errors under `field`.
    pub fn merge_nested(&mut self, field: &str, errors: Errors) {
        if errors.is_empty() {
            return;
        }
        match self.nested.entry(field.to_string()) {
            btree_map::Entry::Occupied(mut slot) => slot.get_mut().merge(errors),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(errors);
            }
        }
    }

    /// Union another collection into this one, appending messages.
    pub fn merge(&mut self, other: Errors) {
        for (field, messages) in other.fields {
            self.extend(&field, messages);
        }
        for (field, nested) in other.nested {
            self.merge_nested(&field, nested);
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.nested.clear();
    }

    /// Iterate fields and their messages in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Iterate nested models' errors in key order.
    pub fn iter_nested(&self) -> impl Iterator<Item = (&str, &Errors)> {
        self.nested.iter().map(|(field, errors)| (field.as_str(), errors))
    }
}

impl Index<&str> for Errors {
    type Output = [String];

    /// # Panics
    ///
    /// Panics if the field has no messages.
    fn index(&self, field: &str) -> &Self::Output {
        match self.get(field) {
            Some(messages) => messages,
            None => panic!("no errors recorded for field '{}'", field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_ignores_empty() {
        let mut errors = Errors::new();
        errors.extend("name", Vec::new());
        assert!(errors.is_empty());
        errors.extend("name", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(errors["name"], ["a", "b"]);
    }

    #[test]
    fn test_merge_nested_unions_messages() {
        let mut inner = Errors::new();
        inner.push("name", "first");
        let mut more = Errors::new();
        more.push("name", "second");
        more.push("age", "third");

        let mut errors = Errors::new();
        errors.merge_nested("user", inner);
        errors.merge_nested("user", more);
        errors.merge_nested("empty", Errors::new());

        let user = errors.nested("user").unwrap();
        assert_eq!(user["name"], ["first", "second"]);
        assert_eq!(user.first("age"), Some("third"));
        assert!(errors.nested("empty").is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("user"));
    }

    #[test]
    fn test_set_with_empty_removes_field() {
        let mut errors = Errors::new();
        errors.push("a", "x");
        errors.set("a", Vec::new());
        assert!(errors.is_empty());
    }

    #[test]
    #[should_panic(expected = "no errors recorded for field 'missing'")]
    fn test_index_panics_on_missing_field() {
        let errors = Errors::new();
        let _ = &errors["missing"];
    }
}
