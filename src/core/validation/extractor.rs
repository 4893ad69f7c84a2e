//! Axum extractor gathering the raw request fields
//!
//! [`RequestInput`] collects path parameters, query parameters and the body
//! into three flat maps. Handlers run their operation [`Schema`] against it,
//! which sanitizes the values in place, then read the cleaned fields back.
//!
//! [`Schema`]: super::Schema

use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{Method, header::CONTENT_TYPE},
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::core::auth::AuthenticatedUser;
use crate::core::error::{ApiError, FieldError, Location};
use crate::core::id::RecordId;
use crate::core::store::Patch;

/// Raw request fields, keyed by location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInput {
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
    pub body: Map<String, Value>,
}

impl RequestInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, location: Location, name: &str, value: impl Into<Value>) -> Self {
        self.set(location, name, value.into());
        self
    }

    fn section(&self, location: Location) -> Option<&Map<String, Value>> {
        match location {
            Location::Body => Some(&self.body),
            Location::Params => Some(&self.params),
            Location::Query => Some(&self.query),
            Location::Header => None,
        }
    }

    fn section_mut(&mut self, location: Location) -> Option<&mut Map<String, Value>> {
        match location {
            Location::Body => Some(&mut self.body),
            Location::Params => Some(&mut self.params),
            Location::Query => Some(&mut self.query),
            Location::Header => None,
        }
    }

    /// Field value, if the client sent it
    pub fn get(&self, location: Location, name: &str) -> Option<&Value> {
        self.section(location).and_then(|fields| fields.get(name))
    }

    /// Replace a field value
    pub fn set(&mut self, location: Location, name: &str, value: Value) {
        if let Some(fields) = self.section_mut(location) {
            fields.insert(name.to_string(), value);
        }
    }

    /// Field value as text
    pub fn text(&self, location: Location, name: &str) -> Option<&str> {
        self.get(location, name).and_then(Value::as_str)
    }

    /// Field value as a boolean
    pub fn flag(&self, location: Location, name: &str) -> Option<bool> {
        self.get(location, name).and_then(Value::as_bool)
    }

    /// Mandatory text field of an already validated request
    pub fn string(&self, location: Location, name: &str) -> Result<String, ApiError> {
        self.text(location, name)
            .map(str::to_string)
            .ok_or_else(|| self.unusable(location, name))
    }

    /// Mandatory numeric field of an already validated request
    pub fn number(&self, location: Location, name: &str) -> Result<f64, ApiError> {
        self.get(location, name)
            .and_then(Value::as_f64)
            .ok_or_else(|| self.unusable(location, name))
    }

    /// Mandatory id field of an already validated request
    pub fn record_id(&self, location: Location, name: &str) -> Result<RecordId, ApiError> {
        self.text(location, name)
            .and_then(|text| RecordId::parse(text).ok())
            .ok_or_else(|| self.unusable(location, name))
    }

    /// Body fields present in the request, restricted to `allowed`
    pub fn patch(&self, allowed: &[&str]) -> Patch {
        allowed
            .iter()
            .filter_map(|name| {
                self.body
                    .get(*name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }

    fn unusable(&self, location: Location, name: &str) -> ApiError {
        let value = self.get(location, name).cloned().unwrap_or(Value::Null);
        ApiError::invalid(FieldError::new(
            location,
            name,
            value,
            format!("Invalid {}", name),
        ))
    }
}

fn strings_to_map(fields: HashMap<String, String>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn malformed_body(details: impl std::fmt::Display) -> ApiError {
    tracing::debug!(%details, "rejecting unreadable request body");
    ApiError::invalid(FieldError::new(
        Location::Body,
        "body",
        Value::Null,
        "Malformed request body",
    ))
}

impl<S> FromRequest<S> for RequestInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        let query = Query::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Query(query)| query)
            .unwrap_or_default();

        let caller = parts.extensions.get::<AuthenticatedUser>().cloned();
        let is_form = parts.method != Method::GET
            && parts.method != Method::HEAD
            && parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let req = Request::from_parts(parts, body);
        let mut body = if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(malformed_body)?;
            strings_to_map(fields)
        } else {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(malformed_body)?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Map::new()
            } else {
                match serde_json::from_slice::<Value>(&bytes).map_err(malformed_body)? {
                    Value::Object(fields) => fields,
                    _ => return Err(malformed_body("body is not a JSON object")),
                }
            }
        };

        if let Some(caller) = caller {
            body.insert("userId".to_string(), Value::String(caller.id.to_string()));
        }

        Ok(Self {
            params: strings_to_map(params),
            query: strings_to_map(query),
            body,
        })
    }
}
