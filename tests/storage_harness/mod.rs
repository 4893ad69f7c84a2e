//! Shared test harness for storage backend testing
//!
//! Provides record fixtures built the same way the handlers build them
//! (through `Resource::from_input`) and the `store_contract_tests!` macro.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_contract_tests;

use market::core::entity::Resource;
use market::core::error::Location::Body;
use market::core::id::RecordId;
use market::core::validation::RequestInput;
use market::entities::{Offer, Publication};

/// A publication owned by `user`
pub fn publication(user: RecordId, message: &str, kind: &str) -> Publication {
    let input = RequestInput::new()
        .with(Body, "message", message)
        .with(Body, "type", kind)
        .with(Body, "geolocation", "Lyon")
        .with(Body, "weight", 12.5)
        .with(Body, "price", 3.0)
        .with(Body, "userId", user.to_string());
    Publication::from_input(&input).unwrap()
}

/// An offer from `user` on `publication`
pub fn offer(user: RecordId, publication: RecordId, bid: f64) -> Offer {
    let input = RequestInput::new()
        .with(Body, "message", "I can take it all")
        .with(Body, "geolocation", "Paris")
        .with(Body, "bid", bid)
        .with(Body, "weight", 12.5)
        .with(Body, "userId", user.to_string())
        .with(Body, "publicationId", publication.to_string());
    Offer::from_input(&input).unwrap()
}

/// `count` publications with alternating type and active flag
pub fn sample_batch(count: usize) -> Vec<Publication> {
    let owner = RecordId::new();
    (0..count)
        .map(|i| {
            let kind = if i % 2 == 0 { "fruit" } else { "grain" };
            let mut record = publication(owner, &format!("Lot {}", i), kind);
            record.is_active = i % 3 != 0;
            record
        })
        .collect()
}
