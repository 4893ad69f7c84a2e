//! Credential store: user records with a password-hashing pre-persist hook

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::core::password::PasswordHasher;
use crate::core::store::{Filter, Patch, Store, StoreError};
use crate::entities::User;

/// Wraps any `Store<User>` so plaintext passwords never reach storage.
///
/// The password is hashed on insert and whenever a patch sets it; any other
/// write leaves the stored hash untouched.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<dyn Store<User>>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserStore {
    pub fn new(inner: Arc<dyn Store<User>>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { inner, hasher }
    }

    fn hash(&self, plain: &str) -> Result<String, StoreError> {
        self.hasher
            .hash(plain)
            .map_err(|e| StoreError::Hook(e.to_string()))
    }

    /// Look a user up by (already lower-cased) email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_one(&Filter::any().eq("email", email)).await
    }

    /// Check a plaintext password against a user's stored hash
    pub fn password_matches(&self, user: &User, plain: &str) -> bool {
        self.hasher.verify(plain, &user.password)
    }
}

#[async_trait]
impl Store<User> for UserStore {
    async fn insert(&self, mut record: User) -> Result<User, StoreError> {
        record.password = self.hash(&record.password)?;
        self.inner.insert(record).await
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<User>, StoreError> {
        self.inner.find(filter).await
    }

    async fn update(&self, filter: &Filter, mut patch: Patch) -> Result<Option<User>, StoreError> {
        if let Some(plain) = patch.get("password").and_then(Value::as_str) {
            let hashed = self.hash(plain)?;
            patch.insert("password".to_string(), Value::String(hashed));
        }
        self.inner.update(filter, patch).await
    }
}
