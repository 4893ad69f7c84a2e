//! Shared controller for soft-deletable resources
//!
//! Publications, supplies and offers expose the same five operations:
//!
//! - `POST /{resource}`: create (public)
//! - `GET /{resource}`: list live records, optionally filtered (public)
//! - `GET /{resource}/{id}`: get by id (token)
//! - `PUT /{resource}/{id}`: partial update (token)
//! - `DELETE /{resource}/{id}`: soft delete (token)

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{capitalize, envelope, problem};
use crate::core::entity::Resource;
use crate::core::error::{ApiError, Location};
use crate::core::store::{Filter, Store};
use crate::core::validation::{FieldRules, RequestInput, Schema};
use crate::server::gate::{Gate, require_token};

/// Validation schemas for the five operations of one resource
#[derive(Clone)]
pub struct ResourceSchemas {
    pub create: Schema,
    pub list: Schema,
    pub get: Schema,
    pub update: Schema,
    pub delete: Schema,
}

impl ResourceSchemas {
    /// Assemble the schemas from the body rules of the resource.
    ///
    /// `body_fields(partial)` returns the body rules; with `partial` set every
    /// field is optional, as on update. `list_fields` are the query rules.
    pub fn build<T: Resource>(
        body_fields: impl Fn(bool) -> Vec<FieldRules>,
        list_fields: Vec<FieldRules>,
    ) -> Self {
        let label = T::label();
        let id_rule = || FieldRules::param(T::id_param()).record_id();

        let create = body_fields(false)
            .into_iter()
            .fold(Schema::new(format!("create{}", label)), Schema::field);

        let update = body_fields(true)
            .into_iter()
            .fold(Schema::new(format!("update{}", label)).field(id_rule()), Schema::field);

        let list = list_fields.into_iter().fold(
            Schema::new(format!("list{}", capitalize(T::resource_name()))),
            Schema::field,
        );

        Self {
            create,
            list,
            get: Schema::new(format!("get{}", label)).field(id_rule()),
            update,
            delete: Schema::new(format!("delete{}", label)).field(id_rule()),
        }
    }
}

/// Per-resource handler state
pub struct ResourceState<T: Resource> {
    pub store: Arc<dyn Store<T>>,
    pub schemas: Arc<ResourceSchemas>,
}

impl<T: Resource> ResourceState<T> {
    pub fn new(store: Arc<dyn Store<T>>, schemas: ResourceSchemas) -> Self {
        Self {
            store,
            schemas: Arc::new(schemas),
        }
    }
}

impl<T: Resource> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            schemas: self.schemas.clone(),
        }
    }
}

/// Build the routes of one resource
pub fn routes<T: Resource>(state: ResourceState<T>, gate: Gate) -> Router {
    let collection = format!("/{}", T::resource_name());
    let item = format!("/{}/{{{}}}", T::resource_name(), T::id_param());

    Router::new()
        .route(&collection, post(create::<T>).get(list::<T>))
        .route(
            &item,
            get(get_one::<T>)
                .put(update::<T>)
                .delete(delete::<T>)
                .route_layer(middleware::from_fn_with_state(gate, require_token)),
        )
        .with_state(state)
}

/// Create a new record
pub async fn create<T: Resource>(
    State(state): State<ResourceState<T>>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.create.check(&mut input).await?;

    let record = T::from_input(&input)?;
    let record = state
        .store
        .insert(record)
        .await
        .map_err(|e| ApiError::persistence(problem("creating", T::label()), e))?;

    info!(resource = T::resource_name(), id = %record.id(), "record created");
    envelope(T::resource_name_singular(), record)
}

/// List live records matching the query filters
pub async fn list<T: Resource>(
    State(state): State<ResourceState<T>>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.list.check(&mut input).await?;

    let mut filter = Filter::live();
    for field in T::LIST_FILTERS {
        match input.get(Location::Query, field) {
            None => {}
            Some(Value::String(text)) if text.is_empty() => {}
            Some(value) => filter = filter.eq(*field, value.clone()),
        }
    }

    let records = state
        .store
        .find(&filter)
        .await
        .map_err(|e| ApiError::persistence(problem("finding", T::resource_name()), e))?;

    envelope(T::resource_name(), records)
}

/// Get a record by id.
///
/// Soft-deleted records are still returned here; only list hides them.
pub async fn get_one<T: Resource>(
    State(state): State<ResourceState<T>>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.get.check(&mut input).await?;
    let id = input.record_id(Location::Params, T::id_param())?;

    let record = state
        .store
        .get(&id)
        .await
        .map_err(|e| ApiError::persistence(problem("finding", T::label()), e))?
        .ok_or_else(|| not_found::<T>(&id.to_string()))?;

    envelope(T::resource_name_singular(), record)
}

/// Apply a partial update and return the post-update record
pub async fn update<T: Resource>(
    State(state): State<ResourceState<T>>,
    mut input: RequestInput,
) -> Result<Json<Value>, ApiError> {
    state.schemas.update.check(&mut input).await?;
    let id = input.record_id(Location::Params, T::id_param())?;

    let patch = input.patch(T::UPDATABLE);
    let record = state
        .store
        .update(&Filter::any().with_id(id), patch)
        .await
        .map_err(|e| ApiError::persistence(problem("updating", T::label()), e))?
        .ok_or_else(|| not_found::<T>(&id.to_string()))?;

    info!(resource = T::resource_name(), id = %id, "record updated");
    envelope(T::resource_name_singular(), record)
}

/// Soft-delete a live record, answering `true`
pub async fn delete<T: Resource>(
    State(state): State<ResourceState<T>>,
    mut input: RequestInput,
) -> Result<Json<bool>, ApiError> {
    state.schemas.delete.check(&mut input).await?;
    let id = input.record_id(Location::Params, T::id_param())?;

    state
        .store
        .soft_delete(&id)
        .await
        .map_err(|e| ApiError::persistence(problem("deleting", T::label()), e))?
        .ok_or_else(|| not_found::<T>(&id.to_string()))?;

    info!(resource = T::resource_name(), id = %id, "record soft-deleted");
    Ok(Json(true))
}

fn not_found<T: Resource>(id: &str) -> ApiError {
    ApiError::not_found(T::id_param(), id, format!("{} not found", T::label()))
}
