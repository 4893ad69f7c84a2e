//! Core module containing the fundamental traits and types of the service

pub mod auth;
pub mod entity;
pub mod error;
pub mod id;
pub mod password;
pub mod store;
pub mod validation;

pub use auth::{AuthenticatedUser, JwtSigner, TokenError, TokenSigner};
pub use entity::{Lifecycle, Record, Resource};
pub use error::{ApiError, FieldError, Location};
pub use id::RecordId;
pub use password::{BcryptHasher, HashError, PasswordHasher};
pub use store::{Filter, Patch, Store, StoreError};
