//! HTTP handlers for the marketplace resources
//!
//! Every handler follows the same flow: extract a [`RequestInput`], run the
//! operation's [`Schema`], touch the store, shape the envelope.
//!
//! [`RequestInput`]: crate::core::validation::RequestInput
//! [`Schema`]: crate::core::validation::Schema

pub mod auth;
pub mod listings;
pub mod offers;
pub mod resource;
pub mod users;

use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::ApiError;

/// Wrap `value` as `{ <key>: value }`
pub(crate) fn envelope(key: &str, value: impl Serialize) -> Result<Json<Value>, ApiError> {
    let value = serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut body = Map::new();
    body.insert(key.to_string(), value);
    Ok(Json(Value::Object(body)))
}

/// `There was a problem <doing> the <what>.`
pub(crate) fn problem(doing: &str, what: &str) -> String {
    format!("There was a problem {} the {}.", doing, what)
}

/// `offers` → `Offers`
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
