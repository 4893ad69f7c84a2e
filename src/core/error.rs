//! Typed error handling for the marketplace API
//!
//! Every failure a handler can produce is an [`ApiError`]. Each variant maps
//! to exactly one response envelope:
//!
//! - [`ApiError::Validation`]: `422 { errors: [FieldError, ...] }`
//! - [`ApiError::NotFound`]: `404 { errors: FieldError }`
//! - [`ApiError::InvalidCredentials`]: `401 { errors: [{ msg }] }`
//! - [`ApiError::Token`]: the gate's field-error shaped payload
//! - [`ApiError::Persistence`] / [`ApiError::Internal`]: `500 { errors, message }`

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::store::StoreError;

/// Where a request field was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Params,
    Query,
    Header,
}

/// A single field-level problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub location: Location,
    pub param: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    pub msg: String,
}

impl FieldError {
    pub fn new(
        location: Location,
        param: impl Into<String>,
        value: Value,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            location,
            param: param.into(),
            value,
            msg: msg.into(),
        }
    }
}

/// The main error type returned by handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more request fields failed validation
    #[error("request failed validation with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The id was well-formed but resolves to no record
    #[error("{}", .0.msg)]
    NotFound(FieldError),

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired token at the gate
    #[error("{msg}")]
    Token {
        header: String,
        msg: String,
        status: StatusCode,
    },

    /// The store itself failed
    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source: StoreError,
    },

    /// Failure outside the store (token signing, response encoding)
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap a store failure with a human-readable message
    pub fn persistence(message: impl Into<String>, source: StoreError) -> Self {
        ApiError::Persistence {
            message: message.into(),
            source,
        }
    }

    /// Not-found error echoing the path parameter that failed to resolve
    pub fn not_found(param: &str, value: &str, msg: impl Into<String>) -> Self {
        ApiError::NotFound(FieldError::new(
            Location::Params,
            param,
            Value::String(value.to_string()),
            msg,
        ))
    }

    /// Single validation error
    pub fn invalid(error: FieldError) -> Self {
        ApiError::Validation(vec![error])
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Token { status, .. } => *status,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for this error
    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::NotFound(error) => json!({ "errors": error }),
            ApiError::InvalidCredentials => json!({ "errors": [{ "msg": self.to_string() }] }),
            ApiError::Token { header, msg, .. } => json!({
                "value": "token",
                "msg": msg,
                "param": header,
                "location": Location::Header,
            }),
            ApiError::Persistence { message, source } => json!({
                "errors": source.to_raw(),
                "message": message,
            }),
            ApiError::Internal(details) => json!({
                "errors": { "name": "InternalError", "message": details },
                "message": "Internal server error.",
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Persistence { message, source } => {
                tracing::error!(error = %source, %message, "store operation failed");
            }
            ApiError::Internal(details) => {
                tracing::error!(%details, "server returned 500 status");
            }
            _ => {}
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_is_error_array() {
        let err = ApiError::Validation(vec![FieldError::new(
            Location::Body,
            "message",
            Value::Null,
            "Message field is required",
        )]);

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.body(),
            json!({ "errors": [{ "location": "body", "param": "message", "msg": "Message field is required" }] })
        );
    }

    #[test]
    fn test_not_found_body_is_single_object() {
        let err = ApiError::not_found("offerId", "000000000000000000000000", "Offer not found");

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.body(),
            json!({ "errors": {
                "location": "params",
                "param": "offerId",
                "value": "000000000000000000000000",
                "msg": "Offer not found"
            } })
        );
    }

    #[test]
    fn test_token_error_uses_configured_status() {
        let err = ApiError::Token {
            header: "x-access-token".into(),
            msg: "jwt expired".into(),
            status: StatusCode::OK,
        };

        assert_eq!(err.status_code(), StatusCode::OK);
        assert_eq!(err.body()["param"], "x-access-token");
        assert_eq!(err.body()["location"], "header");
        assert_eq!(err.body()["value"], "token");
    }

    #[test]
    fn test_persistence_surfaces_message_and_raw_error() {
        let err = ApiError::persistence(
            "There was a problem creating the Offer.",
            StoreError::Backend("connection reset".into()),
        );

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body["message"], "There was a problem creating the Offer.");
        assert_eq!(body["errors"]["name"], "BackendError");
    }
}
