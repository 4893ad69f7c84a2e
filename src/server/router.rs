//! Router assembly: resource routes, health checks and the HTTP layer stack

use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use super::gate::Gate;
use super::state::AppState;
use crate::config::{ConfigError, CorsConfig};
use crate::core::store::Store;
use crate::entities::{Offer, Publication, Supply, User};
use crate::handlers::auth::{self, AuthState};
use crate::handlers::resource::{self, ResourceState};
use crate::handlers::users::{self, UserState};
use crate::handlers::{listings, offers};

/// Service name reported by the health routes
pub const SERVICE_NAME: &str = "market-api";

/// Build the full application router
pub fn build_router(state: AppState) -> Result<Router, ConfigError> {
    let header = state.config.token.header_name()?;
    let gate = Gate::new(
        state.signer.clone(),
        header.clone(),
        state.config.token.failure_status()?,
    );

    let users: Arc<dyn Store<User>> = Arc::new(state.users.clone());

    let publications = ResourceState::<Publication>::new(
        state.publications.clone(),
        listings::schemas::<Publication>(users.clone()),
    );
    let supplies = ResourceState::<Supply>::new(
        state.supplies.clone(),
        listings::schemas::<Supply>(users.clone()),
    );
    let offer_state = ResourceState::<Offer>::new(
        state.offers.clone(),
        offers::schemas(users, state.publications.clone()),
    );

    let middleware = ServiceBuilder::new()
        .layer(SetSensitiveRequestHeadersLayer::new([header]))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors));

    Ok(Router::new()
        .merge(health_routes())
        .merge(resource::routes(publications, gate.clone()))
        .merge(resource::routes(supplies, gate.clone()))
        .merge(resource::routes(offer_state, gate.clone()))
        .merge(users::routes(UserState::new(state.users.clone()), gate))
        .merge(auth::routes(AuthState::new(state.users.clone(), state.signer.clone())))
        .layer(middleware))
}

/// `GET /health` and `GET /healthz`
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// CORS policy from configuration; unparsable entries are skipped
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|method| Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok())
        .collect();
    let headers: Vec<HeaderName> = cors
        .allowed_headers
        .iter()
        .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
        .collect();
    let exposed: Vec<HeaderName> = cors
        .exposed_headers
        .iter()
        .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
        .collect();

    // Wildcards cannot be combined with credentials; mirror the request instead.
    let allow_origin = match (origins.is_empty(), cors.allow_credentials) {
        (false, _) => AllowOrigin::list(origins),
        (true, true) => AllowOrigin::mirror_request(),
        (true, false) => AllowOrigin::from(Any),
    };
    let allow_headers = match (headers.is_empty(), cors.allow_credentials) {
        (false, _) => AllowHeaders::list(headers),
        (true, true) => AllowHeaders::mirror_request(),
        (true, false) => AllowHeaders::from(Any),
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers(allow_headers)
        .expose_headers(exposed)
        .allow_credentials(cors.allow_credentials);

    if let Some(seconds) = cors.max_age {
        layer = layer.max_age(Duration::from_secs(seconds));
    }

    layer
}
