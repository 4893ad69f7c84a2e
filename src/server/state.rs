//! Shared application state

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};
use crate::core::auth::{JwtSigner, TokenSigner};
use crate::core::password::{BcryptHasher, PasswordHasher};
use crate::core::store::{Store, StoreError};
use crate::entities::{Offer, Publication, Supply, User};
use crate::storage::{InMemoryStore, UserStore};

/// Stores and credentials shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub publications: Arc<dyn Store<Publication>>,
    pub supplies: Arc<dyn Store<Supply>>,
    pub offers: Arc<dyn Store<Offer>>,
    pub users: UserStore,
    pub signer: Arc<dyn TokenSigner>,
}

impl AppState {
    /// Assemble state over the given stores.
    ///
    /// `users` is the raw user store; it is wrapped with the password hook here.
    pub fn with_stores(
        config: AppConfig,
        publications: Arc<dyn Store<Publication>>,
        supplies: Arc<dyn Store<Supply>>,
        offers: Arc<dyn Store<Offer>>,
        users: Arc<dyn Store<User>>,
    ) -> Self {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.password.cost));
        let signer: Arc<dyn TokenSigner> =
            Arc::new(JwtSigner::new(&config.token.secret, config.token.ttl()));

        Self {
            users: UserStore::new(users, hasher),
            publications,
            supplies,
            offers,
            signer,
            config: Arc::new(config),
        }
    }

    /// State backed by fresh in-memory stores
    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryStore::<Publication>::new()),
            Arc::new(InMemoryStore::<Supply>::new()),
            Arc::new(InMemoryStore::<Offer>::new()),
            Arc::new(InMemoryStore::<User>::new()),
        )
    }

    /// State backed by MongoDB, one collection per record type
    #[cfg(feature = "mongodb_backend")]
    pub async fn mongodb(config: AppConfig) -> Result<Self, StoreError> {
        use crate::storage::MongoStore;

        let client = mongodb::Client::with_uri_str(config.storage.mongodb.uri())
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to MongoDB: {}", e)))?;
        let database = client.database(&config.storage.mongodb.database);

        let users = MongoStore::<User>::new(database.clone());
        users.ensure_unique("email").await?;

        Ok(Self::with_stores(
            config,
            Arc::new(MongoStore::<Publication>::new(database.clone())),
            Arc::new(MongoStore::<Supply>::new(database.clone())),
            Arc::new(MongoStore::<Offer>::new(database)),
            Arc::new(users),
        ))
    }

    /// State for the backend selected in the configuration
    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        match config.storage.backend {
            StorageBackend::Memory => Ok(Self::in_memory(config)),
            #[cfg(feature = "mongodb_backend")]
            StorageBackend::Mongodb => Self::mongodb(config).await,
            #[cfg(not(feature = "mongodb_backend"))]
            StorageBackend::Mongodb => Err(StoreError::Backend(
                "storage.backend is mongodb but the mongodb_backend feature is disabled"
                    .to_string(),
            )),
        }
    }
}
