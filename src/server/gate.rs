//! Token gate for protected routes
//!
//! Reads the token from the configured header, verifies it, and attaches the
//! resolved [`AuthenticatedUser`] to the request extensions. The request
//! extractor then merges the caller's id into the body as `userId`.
//!
//! A rejected token does not raise a 401: the gate answers with a
//! field-error shaped payload, by default with status 200.

use axum::extract::{Request, State};
use axum::http::{HeaderName, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::warn;

use crate::core::auth::{TokenError, TokenSigner};
use crate::core::error::ApiError;

/// Gate configuration and verifier
#[derive(Clone)]
pub struct Gate {
    signer: Arc<dyn TokenSigner>,
    header: HeaderName,
    failure_status: StatusCode,
}

impl Gate {
    pub fn new(signer: Arc<dyn TokenSigner>, header: HeaderName, failure_status: StatusCode) -> Self {
        Self {
            signer,
            header,
            failure_status,
        }
    }

    fn reject(&self, reason: TokenError) -> ApiError {
        ApiError::Token {
            header: self.header.as_str().to_string(),
            msg: reason.to_string(),
            status: self.failure_status,
        }
    }
}

/// Middleware: only let requests with a valid token through
pub async fn require_token(State(gate): State<Gate>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(&gate.header)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let verified = if token.is_empty() {
        Err(TokenError::Missing)
    } else {
        gate.signer.verify(token)
    };

    match verified {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(reason) => {
            warn!(
                path = %request.uri().path(),
                %reason,
                "rejected request at token gate"
            );
            gate.reject(reason).into_response()
        }
    }
}
