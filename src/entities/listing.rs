//! Listing records: publications and supplies

use super::default_active;
use crate::impl_listing_entity;

impl_listing_entity!(
    Publication,
    "publication",
    "publications",
    "Publication",
    "publicationId"
);

impl_listing_entity!(Supply, "supply", "supplies", "Supply", "supplyId");
