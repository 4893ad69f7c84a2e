//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoStore<T>`, backed by a `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! One collection per record type, named by `T::resource_name()` (`users`,
//! `publications`, `supplies`, `offers`).
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. Ids and timestamps are stored as
//! strings. The `id` field is mapped to MongoDB's `_id` convention.

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Database, IndexModel};
use serde_json::{Value, json};
use std::marker::PhantomData;

use crate::core::entity::Record;
use crate::core::store::{Filter, Patch, Store, StoreError};

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: Value) -> Result<Document, StoreError> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| StoreError::Encode(format!("Failed to convert JSON to BSON: {}", e)))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(StoreError::Encode("Expected BSON document, got non-object".into())),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` for record convention.
fn document_to_json(mut doc: Document) -> Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn json_to_bson(value: &Value) -> Result<Bson, StoreError> {
    mongodb::bson::to_bson(value)
        .map_err(|e| StoreError::Encode(format!("Failed to convert JSON to BSON: {}", e)))
}

/// Translate a [`Filter`] into a query document
fn filter_to_document(filter: &Filter) -> Result<Document, StoreError> {
    let mut query = Document::new();

    if let Some(id) = &filter.id {
        query.insert("_id", id.to_string());
    }
    if filter.live_only {
        query.insert("deletedAt", Bson::Null);
    }
    for (field, value) in &filter.equals {
        query.insert(field.as_str(), json_to_bson(value)?);
    }

    Ok(query)
}

fn backend(context: &str) -> impl Fn(mongodb::error::Error) -> StoreError + '_ {
    move |e| StoreError::Backend(format!("{}: {}", context, e))
}

// ---------------------------------------------------------------------------
// MongoStore<T>
// ---------------------------------------------------------------------------

/// Generic record store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use market::storage::MongoStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoStore::<Offer>::new(client.database("market"));
/// let offer = store.insert(offer).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore<T> {
    database: Database,
    _marker: PhantomData<T>,
}

impl<T> MongoStore<T> {
    /// Create a new `MongoStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self {
            database,
            _marker: PhantomData,
        }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl<T: Record> MongoStore<T> {
    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::resource_name())
    }

    fn record_to_document(record: &T) -> Result<Document, StoreError> {
        let json = serde_json::to_value(record)
            .map_err(|e| StoreError::Encode(format!("Failed to serialize record: {}", e)))?;
        json_to_document(json)
    }

    fn document_to_record(doc: Document) -> Result<T, StoreError> {
        serde_json::from_value(document_to_json(doc)).map_err(|e| {
            StoreError::Decode(format!("Failed to deserialize record from document: {}", e))
        })
    }

    /// Create a unique index on `field`.
    ///
    /// Safe to call on every startup.
    pub async fn ensure_unique(&self, field: &str) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection()
            .create_index(index)
            .await
            .map_err(backend("Failed to create index"))?;

        Ok(())
    }
}

#[async_trait]
impl<T: Record> Store<T> for MongoStore<T> {
    async fn insert(&self, record: T) -> Result<T, StoreError> {
        let doc = Self::record_to_document(&record)?;

        self.collection()
            .insert_one(doc)
            .await
            .map_err(backend("Failed to insert record"))?;

        Ok(record)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        let cursor = self
            .collection()
            .find(filter_to_document(filter)?)
            .await
            .map_err(backend("Failed to query records"))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(backend("Failed to read query results"))?;

        docs.into_iter().map(Self::document_to_record).collect()
    }

    async fn update(&self, filter: &Filter, patch: Patch) -> Result<Option<T>, StoreError> {
        let mut changes = patch;
        changes.remove("id");
        changes.remove("_id");
        changes.insert("updatedAt".to_string(), json!(Utc::now()));

        let set = json_to_document(Value::Object(changes))?;

        let updated = self
            .collection()
            .find_one_and_update(filter_to_document(filter)?, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend("Failed to update record"))?;

        updated.map(Self::document_to_record).transpose()
    }

    async fn count(&self, filter: &Filter) -> Result<usize, StoreError> {
        let count = self
            .collection()
            .count_documents(filter_to_document(filter)?)
            .await
            .map_err(backend("Failed to count records"))?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::RecordId;

    #[test]
    fn test_id_maps_to_underscore_id() {
        let doc = json_to_document(json!({ "id": "abc", "message": "m" })).unwrap();
        assert_eq!(doc.get_str("_id").unwrap(), "abc");
        assert!(doc.get("id").is_none());

        let back = document_to_json(doc);
        assert_eq!(back["id"], "abc");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(json_to_document(json!([1, 2])).is_err());
    }

    #[test]
    fn test_filter_translation() {
        let id = RecordId::new();
        let query = filter_to_document(
            &Filter::live()
                .with_id(id)
                .eq("isActive", true)
                .eq("type", "fruit"),
        )
        .unwrap();

        assert_eq!(query.get_str("_id").unwrap(), id.to_string());
        assert_eq!(query.get("deletedAt"), Some(&Bson::Null));
        assert_eq!(query.get_bool("isActive").unwrap(), true);
        assert_eq!(query.get_str("type").unwrap(), "fruit");
    }
}
