//! Field-level validation for records sent with `PATCH`.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use url::Url;

use crate::errors::{PluralKitError, PluralKitResult};

/// Validation rule for one record field.
///
/// `check` returns the value to send, possibly normalised, or `None` if the
/// value is rejected with `message`.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// JSON key of the field.
    pub name: &'static str,
    /// Accepts and transforms a non-null value.
    pub check: fn(&Value) -> Option<Value>,
    /// Reported when `check` rejects the value.
    pub message: &'static str,
}

impl FieldRule {
    /// A rule that accepts any value unchanged.
    pub const fn any(name: &'static str) -> Self {
        Self {
            name,
            check: accept,
            message: "",
        }
    }
}

/// Verifies `record` against `rules`, in rule order.
///
/// Unset fields are skipped and null fields are passed through. Every
/// failing rule contributes its message; if any fail, all messages are
/// returned joined by newlines.
pub fn verify_fields<T: Serialize>(
    record: &T,
    rules: &[FieldRule],
) -> PluralKitResult<Map<String, Value>> {
    let fields = match serde_json::to_value(record)? {
        Value::Object(fields) => fields,
        _ => return Err(PluralKitError::validation("Record must serialize to an object")),
    };

    let mut verified = Map::new();
    let mut errors = Vec::new();

    for rule in rules {
        match fields.get(rule.name) {
            None => {}
            Some(Value::Null) => {
                verified.insert(rule.name.to_string(), Value::Null);
            }
            Some(value) => match (rule.check)(value) {
                Some(value) => {
                    verified.insert(rule.name.to_string(), value);
                }
                None => errors.push(rule.message),
            },
        }
    }

    if errors.is_empty() {
        Ok(verified)
    } else {
        Err(PluralKitError::validation(errors.join("\n")))
    }
}

pub(crate) fn accept(value: &Value) -> Option<Value> {
    Some(value.clone())
}

/// Accepts strings of at most `max` characters.
pub(crate) fn max_chars(value: &Value, max: usize) -> Option<Value> {
    let text = value.as_str()?;
    (text.chars().count() <= max).then(|| value.clone())
}

/// Accepts absolute `http` and `https` URLs.
pub(crate) fn web_url(value: &Value) -> Option<Value> {
    let url = Url::parse(value.as_str()?).ok()?;
    (matches!(url.scheme(), "http" | "https") && url.has_host()).then(|| value.clone())
}

/// Accepts six digit hex colours with or without a leading `#`, returning
/// the lowercase digits.
pub(crate) fn hex_color(value: &Value) -> Option<Value> {
    static HEX_COLOR: OnceLock<Option<regex::Regex>> = OnceLock::new();

    let pattern = HEX_COLOR
        .get_or_init(|| regex::Regex::new(r"^#?([0-9a-fA-F]{6})$").ok())
        .as_ref()?;
    let captures = pattern.captures(value.as_str()?.trim())?;
    Some(Value::from(captures[1].to_ascii_lowercase()))
}

/// Coerces any value to a boolean by truthiness.
pub(crate) fn truthy(value: &Value) -> Option<Value> {
    let flag = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    };
    Some(Value::Bool(flag))
}
