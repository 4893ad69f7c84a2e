//! Asynchronous store-backed checks
//!
//! Lookups run after a field's synchronous validators have all passed. They
//! are not re-verified at write time.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::RequestInput;
use crate::core::entity::Record;
use crate::core::error::Location;
use crate::core::id::RecordId;
use crate::core::store::{Filter, Store, StoreError};

/// A check that needs to consult a store.
///
/// Returns the message to report, or `None` when the value is acceptable.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn check(&self, value: &Value, input: &RequestInput)
    -> Result<Option<String>, StoreError>;
}

/// The value must be the id of a live record
pub struct MustExist<T: Record> {
    store: Arc<dyn Store<T>>,
    msg: String,
}

impl<T: Record> MustExist<T> {
    pub fn new(store: Arc<dyn Store<T>>, msg: impl Into<String>) -> Self {
        Self {
            store,
            msg: msg.into(),
        }
    }
}

#[async_trait]
impl<T: Record> Lookup for MustExist<T> {
    async fn check(
        &self,
        value: &Value,
        _input: &RequestInput,
    ) -> Result<Option<String>, StoreError> {
        let Some(id) = value.as_str().and_then(|text| RecordId::parse(text).ok()) else {
            return Ok(Some(self.msg.clone()));
        };

        let found = self.store.count(&Filter::live().with_id(id)).await?;
        Ok((found == 0).then(|| self.msg.clone()))
    }
}

/// No other record may hold the same value in `field`.
///
/// When `exempt_param` names a path parameter, the record with that id is
/// ignored so an update can keep its own value.
pub struct MustBeUnique<T: Record> {
    store: Arc<dyn Store<T>>,
    field: &'static str,
    exempt_param: Option<&'static str>,
    msg: String,
}

impl<T: Record> MustBeUnique<T> {
    pub fn new(store: Arc<dyn Store<T>>, field: &'static str, msg: impl Into<String>) -> Self {
        Self {
            store,
            field,
            exempt_param: None,
            msg: msg.into(),
        }
    }

    /// Ignore the record addressed by this path parameter
    pub fn except_param(mut self, param: &'static str) -> Self {
        self.exempt_param = Some(param);
        self
    }
}

#[async_trait]
impl<T: Record> Lookup for MustBeUnique<T> {
    async fn check(
        &self,
        value: &Value,
        input: &RequestInput,
    ) -> Result<Option<String>, StoreError> {
        let exempt = self
            .exempt_param
            .and_then(|param| input.text(Location::Params, param))
            .and_then(|text| RecordId::parse(text).ok());

        let holders = self
            .store
            .find(&Filter::any().eq(self.field, value.clone()))
            .await?;

        let conflict = holders.iter().any(|record| Some(record.id()) != exempt);
        Ok(conflict.then(|| self.msg.clone()))
    }
}
