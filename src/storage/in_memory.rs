//! In-memory implementation of Store for testing and development

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};

use crate::core::entity::Record;
use crate::core::store::{Filter, Patch, Store, StoreError, apply_patch};

/// In-memory record store
///
/// Keeps records in insertion order. Every call takes the lock once, so each
/// operation is atomic on its own.
#[derive(Clone)]
pub struct InMemoryStore<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T> InMemoryStore<T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> Store<T> for InMemoryStore<T> {
    async fn insert(&self, record: T) -> Result<T, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire write lock: {}", e)))?;

        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(StoreError::Backend(format!(
                "duplicate id {} in {}",
                record.id(),
                T::resource_name()
            )));
        }

        records.push(record.clone());
        Ok(record)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire read lock: {}", e)))?;

        let mut found = Vec::new();
        for record in records.iter() {
            if filter.matches(record)? {
                found.push(record.clone());
            }
        }

        Ok(found)
    }

    async fn update(&self, filter: &Filter, patch: Patch) -> Result<Option<T>, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(format!("Failed to acquire write lock: {}", e)))?;

        for slot in records.iter_mut() {
            if filter.matches(slot)? {
                let updated = apply_patch(slot, &patch, Utc::now())?;
                *slot = updated.clone();
                return Ok(Some(updated));
            }
        }

        Ok(None)
    }
}
