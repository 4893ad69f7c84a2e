//! Reusable field validators
//!
//! A validator receives the field name and the sanitized value, and returns
//! the message to report when the value is rejected. Messages are supplied by
//! the caller so each operation keeps its own wording.
//!
//! An absent field reaches validators as `Value::Null`. Only the presence
//! rules ([`required`], [`not_empty`]) reject it; format rules let it through
//! so a missing field is not reported once per format.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use validator::ValidateEmail;

use crate::core::id::RecordId;

static DECIMAL: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[-+]?([0-9]+)?(\.[0-9]+)?$"));

/// Validator: field is present (not null)
pub fn required(
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| {
        if value.is_null() {
            Err(msg.clone())
        } else {
            Ok(())
        }
    }
}

/// Validator: field is present and not an empty string
pub fn not_empty(
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::Null => Err(msg.clone()),
        Value::String(s) if s.is_empty() => Err(msg.clone()),
        _ => Ok(()),
    }
}

/// Validator: value is text
pub fn string(
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::Null | Value::String(_) => Ok(()),
        _ => Err(msg.clone()),
    }
}

/// Whether `text` is a decimal literal: optional sign, digits, optional fraction
pub fn is_decimal(text: &str) -> bool {
    if text.is_empty() || text == "." || text == "+" || text == "-" {
        return false;
    }
    match DECIMAL.as_ref() {
        Ok(re) => re.is_match(text),
        Err(_) => text.parse::<f64>().is_ok(),
    }
}

/// Validator: value is a number, or a string holding a decimal literal
pub fn decimal(
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::Null => Ok(()),
        Value::Number(_) => Ok(()),
        Value::String(s) if is_decimal(s) && s.parse::<f64>().is_ok_and(f64::is_finite) => Ok(()),
        _ => Err(msg.clone()),
    }
}

/// Validator: value is a syntactically valid email address
pub fn email(
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::Null => Ok(()),
        Value::String(s) if s.validate_email() => Ok(()),
        _ => Err(msg.clone()),
    }
}

/// Validator: value is a well-formed record id.
///
/// The message defaults to `Invalid <field>`.
pub fn record_id() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value {
        Value::Null => Ok(()),
        Value::String(s) if RecordId::is_well_formed(s) => Ok(()),
        _ => Err(format!("Invalid {}", field)),
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::Null => Ok(()),
        Value::String(s) if allowed.contains(s) => Ok(()),
        _ => Err(msg.clone()),
    }
}

/// Validator: string has at least `min` characters
pub fn min_length(
    min: usize,
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::String(s) if s.chars().count() < min => Err(msg.clone()),
        _ => Ok(()),
    }
}

/// Validator: value is a boolean, or the string `true` / `false`
pub fn boolean(
    msg: impl Into<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let msg = msg.into();
    move |_: &str, value: &Value| match value {
        Value::Null | Value::Bool(_) => Ok(()),
        Value::String(s) if s == "true" || s == "false" => Ok(()),
        _ => Err(msg.clone()),
    }
}
