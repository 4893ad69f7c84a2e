//! Token issuance
//!
//! `POST /auth` exchanges `{ email, password }` for `{ token }`. Unknown email
//! and wrong password produce the same 401.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::auth::{AuthenticatedUser, TokenSigner};
use crate::core::error::{ApiError, Location};
use crate::core::validation::{FieldRules, RequestInput, Schema, filters, validators};
use crate::storage::UserStore;

/// Token issuance state
#[derive(Clone)]
pub struct AuthState {
    pub users: UserStore,
    pub signer: Arc<dyn TokenSigner>,
    pub schema: Arc<Schema>,
}

impl AuthState {
    pub fn new(users: UserStore, signer: Arc<dyn TokenSigner>) -> Self {
        Self {
            users,
            signer,
            schema: Arc::new(issue_schema()),
        }
    }
}

fn issue_schema() -> Schema {
    Schema::new("issueToken").field(
        FieldRules::body("email", "Email")
            .required()
            .not_empty()
            .filter(filters::trim())
            .filter(filters::strip_low())
            .filter(filters::lowercase())
            .validate(validators::string("Invalid email")),
    )
}

pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/auth", post(issue_token))
        .with_state(state)
}

/// Verify credentials and mint a token
pub async fn issue_token(
    State(state): State<AuthState>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schema.check(&mut input).await?;

    let email = input.string(Location::Body, "email")?;
    let password = input.text(Location::Body, "password").unwrap_or_default();

    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::persistence("There was a problem issuing the token.", e))?;

    let Some(user) = user.filter(|u| !password.is_empty() && state.users.password_matches(u, password))
    else {
        warn!("token refused: invalid credentials");
        return Err(ApiError::InvalidCredentials);
    };

    let token = state
        .signer
        .sign(&AuthenticatedUser {
            id: user.id,
            email: user.email.clone(),
        })
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(id = %user.id, "token issued");
    Ok(Json(json!({ "token": token })))
}
