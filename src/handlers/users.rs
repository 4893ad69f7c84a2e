//! User registration and profile handlers
//!
//! - `POST /users`: register (public)
//! - `GET /users`: list (token)
//! - `GET /users/{userId}`, `PUT /users/{userId}`: read and update (token)
//!
//! Responses always use the password-free [`UserView`] projection.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{envelope, problem};
use crate::core::entity::Record;
use crate::core::error::{ApiError, Location};
use crate::core::store::{Filter, Store};
use crate::core::validation::{FieldRules, MustBeUnique, RequestInput, Schema, filters, validators};
use crate::entities::{User, UserStatus, UserView};
use crate::server::gate::{Gate, require_token};
use crate::storage::UserStore;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 7;

/// Validation schemas of the user operations
#[derive(Clone)]
pub struct UserSchemas {
    pub create: Schema,
    pub get: Schema,
    pub update: Schema,
}

impl UserSchemas {
    pub fn new(users: Arc<dyn Store<User>>) -> Self {
        let create = body_fields(users.clone(), false)
            .into_iter()
            .fold(Schema::new("createUser"), Schema::field);

        let update = body_fields(users, true).into_iter().fold(
            Schema::new("updateUser").field(FieldRules::param("userId").record_id()),
            Schema::field,
        );

        Self {
            create,
            get: Schema::new("getUser").field(FieldRules::param("userId").record_id()),
            update,
        }
    }
}

fn body_fields(users: Arc<dyn Store<User>>, partial: bool) -> Vec<FieldRules> {
    let mut unique_email = MustBeUnique::new(users, "email", "Email already in use");
    if partial {
        unique_email = unique_email.except_param("userId");
    }

    vec![
        FieldRules::body("firstName", "First name")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("lastName", "Last name")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("email", "Email")
            .optional_if(partial)
            .required()
            .not_empty()
            .filter(filters::trim())
            .filter(filters::strip_low())
            .filter(filters::lowercase())
            .validate(validators::email("Invalid email"))
            .lookup(unique_email),
        FieldRules::body("password", "Password")
            .optional_if(partial)
            .required()
            .not_empty()
            .validate(validators::string("Invalid password"))
            .validate(validators::min_length(
                MIN_PASSWORD_LEN,
                format!(
                    "Password must be at least {} characters long",
                    MIN_PASSWORD_LEN
                ),
            )),
        FieldRules::body("phone", "Phone").optional().text(),
        FieldRules::body("status", "Status")
            .optional()
            .filter(filters::trim())
            .validate(validators::in_list(
                UserStatus::ALL.iter().map(|s| s.to_string()).collect(),
                "Invalid status",
            )),
    ]
}

/// User handler state
#[derive(Clone)]
pub struct UserState {
    pub users: UserStore,
    pub schemas: Arc<UserSchemas>,
}

impl UserState {
    pub fn new(users: UserStore) -> Self {
        let schemas = UserSchemas::new(Arc::new(users.clone()));
        Self {
            users,
            schemas: Arc::new(schemas),
        }
    }
}

/// Build the user routes
pub fn routes(state: UserState, gate: Gate) -> Router {
    let guard = middleware::from_fn_with_state(gate, require_token);

    Router::new()
        .route(
            "/users",
            get(list).route_layer(guard.clone()).post(create),
        )
        .route(
            "/users/{userId}",
            get(get_one).put(update).route_layer(guard),
        )
        .with_state(state)
}

/// Register a new user
pub async fn create(
    State(state): State<UserState>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.create.check(&mut input).await?;

    let user = User::from_input(&input)?;
    let user = state
        .users
        .insert(user)
        .await
        .map_err(|e| ApiError::persistence(problem("creating", User::label()), e))?;

    info!(id = %user.id, "user registered");
    envelope(User::resource_name_singular(), user.view())
}

/// List all users
pub async fn list(State(state): State<UserState>) -> Result<Json<Value>, ApiError> {
    let users = state
        .users
        .find(&Filter::any())
        .await
        .map_err(|e| ApiError::persistence(problem("finding", User::resource_name()), e))?;

    let views: Vec<UserView> = users.iter().map(User::view).collect();
    envelope(User::resource_name(), views)
}

/// Get one user
pub async fn get_one(
    State(state): State<UserState>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.get.check(&mut input).await?;
    let id = input.record_id(Location::Params, User::id_param())?;

    let user = state
        .users
        .get(&id)
        .await
        .map_err(|e| ApiError::persistence(problem("finding", User::label()), e))?
        .ok_or_else(|| not_found(&id.to_string()))?;

    envelope(User::resource_name_singular(), user.view())
}

/// Partially update a user; a new password is hashed by the store
pub async fn update(
    State(state): State<UserState>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.update.check(&mut input).await?;
    let id = input.record_id(Location::Params, User::id_param())?;

    let patch = input.patch(User::UPDATABLE);
    let user = state
        .users
        .update(&Filter::any().with_id(id), patch)
        .await
        .map_err(|e| ApiError::persistence(problem("updating", User::label()), e))?
        .ok_or_else(|| not_found(&id.to_string()))?;

    info!(id = %id, "user updated");
    envelope(User::resource_name_singular(), user.view())
}

fn not_found(id: &str) -> ApiError {
    ApiError::not_found(User::id_param(), id, "User not found")
}
