//! Pattern rules: [`Regex`] and its fixed-pattern forms

use std::borrow::Cow;
use std::sync::LazyLock;

use crate::model::Model;
use crate::translate::{render, Translate};
use crate::value::Value;

use super::{Rule, RuleError, Template};

const REGEX: &str = "Required to match validation pattern.";
const SLUG: &str =
    "Invalid slug. The value must consist of letters, digits, underscopes and/or hyphens.";
const EMAIL: &str = "Required to be a valid email address.";
const SCIENTIFIC: &str = "Required to be a valid number in scientific format.";
const BASE64: &str = "Required to be a valid base64 string.";
const URLSAFE_BASE64: &str = "Required to be a valid URL-safe base64 string.";

static SLUG_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| builtin(r"^[-\w]+$"));
static EMAIL_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| builtin(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,5}$"));
static SCIENTIFIC_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| builtin(r"^[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?$"));
static BASE64_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| builtin(&base64_pattern("+/")));
static URLSAFE_BASE64_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| builtin(&base64_pattern("-_")));

fn builtin(pattern: &str) -> regex::Regex {
    regex::Regex::new(pattern)
        .unwrap_or_else(|e| unreachable!("built-in pattern {pattern:?} failed to compile: {e}"))
}

fn base64_pattern(altchars: &str) -> String {
    let alphabet = format!("A-Za-z0-9{}", regex::escape(altchars));
    format!("^(?:[{a}]{{4}})*(?:[{a}]{{2}}==|[{a}]{{3}}=)?$", a = alphabet)
}

/// Searches the value for a pattern; `negated` flips pass and fail.
///
/// Only text (and UTF-8 bytes) can match; other values fail. `None`
/// passes.
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Regex, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let digits = Regex::new(r"\d+").unwrap();
/// let no_digits = Regex::new(r"\d+").unwrap().negated();
/// let mut errors = Vec::new();
///
/// assert!(digits.validate(&Value::from("ab42"), "f", &model, &mut errors, &NoTranslation));
/// assert!(!no_digits.validate(&Value::from("ab42"), "f", &model, &mut errors, &NoTranslation));
/// assert_eq!(errors, ["Required to match validation pattern."]);
///
/// assert!(Regex::new("(").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: regex::Regex,
    negated: bool,
    message: Template,
}

impl Regex {
    /// Compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self::from_regex(regex::Regex::new(pattern)?))
    }

    /// Use an already compiled pattern.
    pub fn from_regex(pattern: regex::Regex) -> Self {
        Self::with_template(pattern, REGEX)
    }

    fn with_template(pattern: regex::Regex, template: &'static str) -> Self {
        Self {
            pattern,
            negated: false,
            message: Cow::Borrowed(template),
        }
    }

    /// Fail when the pattern is found instead of when it is missing.
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    /// Override the message template.
    pub fn with_message(mut self, template: impl Into<Template>) -> Self {
        self.message = template.into();
        self
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &regex::Regex {
        &self.pattern
    }

    /// Whether pass and fail are flipped.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The message template.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn found(&self, value: &Value) -> Option<bool> {
        match value {
            Value::Str(s) => Some(self.pattern.is_match(s)),
            Value::Bytes(b) => std::str::from_utf8(b)
                .ok()
                .map(|s| self.pattern.is_match(s)),
            _ => None,
        }
    }
}

impl Rule for Regex {
    fn validate(
        &self,
        value: &Value,
        _name: &str,
        _model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        if value.is_none() {
            return true;
        }
        let passed = self
            .found(value)
            .is_some_and(|found| found != self.negated);
        if !passed {
            result.push(render(translate, &self.message, &[]));
        }
        passed
    }
}

macro_rules! fixed_pattern {
    ($(#[$meta:meta])* $name:ident, $pattern:ident, $template:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(Regex);

        impl $name {
            /// The rule with its default message.
            pub fn new() -> Self {
                Self(Regex::with_template($pattern.clone(), $template))
            }

            /// Fail when the pattern is found instead of when it is missing.
            pub fn negated(self) -> Self {
                Self(self.0.negated())
            }

            /// Override the message template.
            pub fn with_message(self, template: impl Into<Template>) -> Self {
                Self(self.0.with_message(template))
            }

            /// The message template.
            pub fn message(&self) -> &str {
                self.0.message()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Rule for $name {
            #[inline]
            fn validate(
                &self,
                value: &Value,
                name: &str,
                model: &dyn Model,
                result: &mut Vec<String>,
                translate: &dyn Translate,
            ) -> bool {
                self.0.validate(value, name, model, result, translate)
            }
        }
    };
}

fixed_pattern!(
    /// Letters, digits, underscores and hyphens only.
    Slug,
    SLUG_PATTERN,
    SLUG
);

fixed_pattern!(
    /// A plausible email address (case-insensitive, TLD of 2 to 5 letters).
    Email,
    EMAIL_PATTERN,
    EMAIL
);

fixed_pattern!(
    /// A number in plain or scientific notation, such as `12.5e-3`.
    Scientific,
    SCIENTIFIC_PATTERN,
    SCIENTIFIC
);

/// A base64 string: groups of four characters with optional `=` padding.
///
/// The alphabet is `A-Z`, `a-z`, `0-9` plus two alternate characters:
/// `+/` for [`Base64::new`], `-_` for [`Base64::urlsafe`], or any pair
/// with [`Base64::with_altchars`].
///
/// # Example
///
/// ```rust
/// use stillform::rules::{Base64, Rule};
/// use stillform::translate::NoTranslation;
/// use stillform::Value;
/// use std::collections::BTreeMap;
///
/// let model: BTreeMap<String, Value> = BTreeMap::new();
/// let mut errors = Vec::new();
/// let token = Value::from("d2hlZXp51-_=");
///
/// assert!(!Base64::new().validate(&token, "f", &model, &mut errors, &NoTranslation));
/// assert!(Base64::urlsafe().validate(&token, "f", &model, &mut errors, &NoTranslation));
/// assert!(Base64::with_altchars("-_").unwrap().validate(&token, "f", &model, &mut errors, &NoTranslation));
/// ```
#[derive(Debug, Clone)]
pub struct Base64(Regex);

impl Base64 {
    /// The standard alphabet (`+/`).
    pub fn new() -> Self {
        Self(Regex::with_template(BASE64_PATTERN.clone(), BASE64))
    }

    /// The URL-safe alphabet (`-_`).
    pub fn urlsafe() -> Self {
        Self(Regex::with_template(
            URLSAFE_BASE64_PATTERN.clone(),
            URLSAFE_BASE64,
        ))
    }

    /// A custom pair of alternate characters.
    pub fn with_altchars(altchars: &str) -> Result<Self, RuleError> {
        if altchars.chars().count() != 2 {
            return Err(RuleError::AltChars(altchars.to_string()));
        }
        let pattern = regex::Regex::new(&base64_pattern(altchars))?;
        Ok(Self(Regex::with_template(pattern, BASE64)))
    }

    /// Override the message template.
    pub fn with_message(self, template: impl Into<Template>) -> Self {
        Self(self.0.with_message(template))
    }

    /// The message template.
    pub fn message(&self) -> &str {
        self.0.message()
    }
}

impl Default for Base64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Base64 {
    #[inline]
    fn validate(
        &self,
        value: &Value,
        name: &str,
        model: &dyn Model,
        result: &mut Vec<String>,
        translate: &dyn Translate,
    ) -> bool {
        self.0.validate(value, name, model, result, translate)
    }
}
