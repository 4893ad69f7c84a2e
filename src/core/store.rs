//! Store traits for persisting records
//!
//! A store is an opaque document collection reached through create, find,
//! update-by-filter and soft-delete. Each call is atomic on its own; there
//! are no multi-record transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::core::entity::Record;
use crate::core::id::RecordId;

/// Partial update: field name to new value, in storage (camelCase) naming
pub type Patch = Map<String, Value>;

/// Errors raised by a store backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A record could not be converted into its storage form
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// A stored document could not be read back as a record
    #[error("failed to decode record: {0}")]
    Decode(String),

    /// A pre-persist hook refused the write
    #[error("pre-persist hook failed: {0}")]
    Hook(String),
}

impl StoreError {
    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Backend(_) => "BackendError",
            StoreError::Encode(_) => "EncodeError",
            StoreError::Decode(_) => "DecodeError",
            StoreError::Hook(_) => "HookError",
        }
    }

    /// Raw form surfaced to API callers in 500 responses
    pub fn to_raw(&self) -> Value {
        json!({ "name": self.kind(), "message": self.to_string() })
    }
}

/// Record selection criteria.
///
/// The default filter matches every record. [`Filter::live`] adds the
/// `deletedAt = null` constraint used by list reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub id: Option<RecordId>,
    pub live_only: bool,
    pub equals: Vec<(String, Value)>,
}

impl Filter {
    /// Match every record, deleted or not
    pub fn any() -> Self {
        Self::default()
    }

    /// Match only records that have not been soft-deleted
    pub fn live() -> Self {
        Self {
            live_only: true,
            ..Self::default()
        }
    }

    /// Restrict to one id
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Require an exact field match
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Evaluate the filter against a record
    pub fn matches<T: Record>(&self, record: &T) -> Result<bool, StoreError> {
        if let Some(id) = &self.id
            && record.id() != *id
        {
            return Ok(false);
        }

        if self.live_only && !record.is_live() {
            return Ok(false);
        }

        if self.equals.is_empty() {
            return Ok(true);
        }

        let document = serde_json::to_value(record).map_err(|e| StoreError::Encode(e.to_string()))?;

        Ok(self
            .equals
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected)))
    }
}

/// Apply a partial update to a record, refreshing `updatedAt`.
///
/// The id can never be patched. A patch that does not fit the record's shape
/// is a decode failure, which callers surface as a persistence error.
pub fn apply_patch<T: Record>(record: &T, patch: &Patch, now: DateTime<Utc>) -> Result<T, StoreError> {
    let mut document = serde_json::to_value(record).map_err(|e| StoreError::Encode(e.to_string()))?;

    let fields = document
        .as_object_mut()
        .ok_or_else(|| StoreError::Encode("record is not a document".to_string()))?;

    for (field, value) in patch {
        if field == "id" || field == "_id" {
            continue;
        }
        fields.insert(field.clone(), value.clone());
    }
    fields.insert("updatedAt".to_string(), json!(now));

    serde_json::from_value(document).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Patch marking a record deleted at `now`
pub fn soft_delete_patch(now: DateTime<Utc>) -> Patch {
    let mut patch = Patch::new();
    patch.insert("deletedAt".to_string(), json!(now));
    patch
}

/// Persistence capability for one record type.
///
/// Implementations provide storage; the controllers are agnostic to it.
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// Persist a new record and return the stored version
    async fn insert(&self, record: T) -> Result<T, StoreError>;

    /// All records matching the filter, in insertion order
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError>;

    /// Patch the first record matching the filter and return it post-update.
    ///
    /// Returns `Ok(None)` when nothing matched.
    async fn update(&self, filter: &Filter, patch: Patch) -> Result<Option<T>, StoreError>;

    /// First record matching the filter
    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Fetch a record by id regardless of its lifecycle
    async fn get(&self, id: &RecordId) -> Result<Option<T>, StoreError> {
        self.find_one(&Filter::any().with_id(*id)).await
    }

    /// Number of records matching the filter
    async fn count(&self, filter: &Filter) -> Result<usize, StoreError> {
        Ok(self.find(filter).await?.len())
    }

    /// Mark a live record deleted.
    ///
    /// Only live records match, so deleting twice never overwrites the
    /// first timestamp; the second call returns `Ok(None)`.
    async fn soft_delete(&self, id: &RecordId) -> Result<Option<T>, StoreError> {
        self.update(&Filter::live().with_id(*id), soft_delete_patch(Utc::now()))
            .await
    }
}
