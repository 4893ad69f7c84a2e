//! # Market API
//!
//! REST backend for a classifieds marketplace. Users post publications and
//! supplies; other users bid on publications with offers.
//!
//! ## Features
//!
//! - **Declarative validation**: per-operation schemas that sanitize, validate
//!   and check references against the stores, reporting every error at once
//! - **Soft delete**: records carry an explicit [`Lifecycle`](core::Lifecycle)
//!   and list reads only see live ones
//! - **Token gate**: stateless HS256 tokens on protected routes
//! - **Pluggable storage**: in-memory stores, or MongoDB behind the
//!   `mongodb_backend` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use market::prelude::*;
//!
//! let mut config = AppConfig::default();
//! config.token.secret = "change-me".into();
//!
//! let app = build_router(AppState::in_memory(config))?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod handlers;
pub mod server;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::{AppConfig, ConfigError, StorageBackend};
    pub use crate::core::{
        ApiError, AuthenticatedUser, BcryptHasher, FieldError, Filter, JwtSigner, Lifecycle,
        Location, PasswordHasher, Patch, RecordId, Record, Resource, Store, StoreError,
        TokenError, TokenSigner,
        validation::{FieldRules, RequestInput, Schema},
    };
    pub use crate::entities::{Offer, Publication, Supply, User, UserStatus, UserView};
    pub use crate::server::{AppState, ServerBuilder, build_router};
    pub use crate::storage::{InMemoryStore, UserStore};

    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoStore;
}
