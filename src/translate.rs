//! Message translation and template interpolation
//!
//! Rules never format messages directly. On failure a rule hands its raw
//! template to the injected [`Translate`] capability exactly once, then
//! interpolates named `{placeholder}` parameters into the translated text.
//!
//! # Example
//!
//! ```rust
//! use stillform::translate::{interpolate, NoTranslation, Translate};
//!
//! let template = NoTranslation.translate("Exceeds maximum length of {max}.");
//! assert_eq!(
//!     interpolate(&template, &[("max", &30)]),
//!     "Exceeds maximum length of 30."
//! );
//!
//! let upper = |t: &str| t.to_uppercase();
//! assert_eq!(upper.translate("abc"), "ABC");
//! ```

use std::borrow::Cow;
use std::fmt::Display;

/// The translation capability: `translate(template) -> string`.
///
/// Implemented for [`NoTranslation`] (identity) and for any
/// `Fn(&str) -> String` closure.
pub trait Translate: Send + Sync {
    /// Translate a raw message template.
    fn translate<'a>(&self, template: &'a str) -> Cow<'a, str>;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    #[inline]
    fn translate<'a>(&self, template: &'a str) -> Cow<'a, str> {
        Cow::Owned(self(template))
    }
}

/// Identity translation, the default everywhere a translator is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoTranslation;

impl Translate for NoTranslation {
    #[inline]
    fn translate<'a>(&self, template: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(template)
    }
}

/// Replace every `{name}` in `template` with the matching parameter.
///
/// Placeholders without a parameter are left untouched.
pub fn interpolate(template: &str, params: &[(&str, &dyn Display)]) -> String {
    if params.is_empty() || !template.contains('{') {
        return template.to_string();
    }
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let Some(end) = tail.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &tail[..end];
        match params.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(&value.to_string()),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Translate `template` once, interpolate `params`, and return the message.
pub(crate) fn render(
    translate: &dyn Translate,
    template: &str,
    params: &[(&str, &dyn Display)],
) -> String {
    interpolate(&translate.translate(template), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_interpolate_named_params() {
        let s = interpolate(
            "The length must fall within the range {min} - {max} characters.",
            &[("min", &2), ("max", &3)],
        );
        assert_eq!(s, "The length must fall within the range 2 - 3 characters.");
    }

    #[test]
    fn test_interpolate_keeps_unknown_placeholders() {
        assert_eq!(interpolate("{a} {b}", &[("a", &1)]), "1 {b}");
        assert_eq!(interpolate("open {brace", &[("a", &1)]), "open {brace");
    }

    #[test]
    fn test_render_translates_once_before_interpolation() {
        let calls = AtomicUsize::new(0);
        let translate = |t: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            t.replace("max", "maximum")
        };
        let s = render(&translate, "max {max}", &[("maximum", &5), ("max", &9)]);
        assert_eq!(s, "maximum 5");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_translation_borrows() {
        assert!(matches!(NoTranslation.translate("x"), Cow::Borrowed("x")));
    }
}
