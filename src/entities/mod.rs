//! Record models of the marketplace

pub mod listing;
pub mod macros;
pub mod offer;
pub mod user;

pub use listing::{Publication, Supply};
pub use offer::Offer;
pub use user::{User, UserStatus, UserView};

/// Listings and offers are active unless stated otherwise
pub(crate) fn default_active() -> bool {
    true
}
