//! Offers: bids placed by a user against a publication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::default_active;
use crate::core::entity::{Lifecycle, Record, Resource};
use crate::core::error::{ApiError, Location::Body};
use crate::core::id::RecordId;
use crate::core::validation::RequestInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: RecordId,
    pub message: String,
    pub geolocation: String,
    pub bid: f64,
    pub weight: f64,

    /// Bidder
    pub user_id: RecordId,

    /// Publication bid on
    pub publication_id: RecordId,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub deleted_at: Lifecycle,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Offer {
    fn resource_name() -> &'static str {
        "offers"
    }

    fn resource_name_singular() -> &'static str {
        "offer"
    }

    fn label() -> &'static str {
        "Offer"
    }

    fn id_param() -> &'static str {
        "offerId"
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.deleted_at
    }
}

impl Resource for Offer {
    const LIST_FILTERS: &'static [&'static str] = &["message", "geolocation", "isActive"];

    const UPDATABLE: &'static [&'static str] = &[
        "message",
        "geolocation",
        "bid",
        "weight",
        "userId",
        "publicationId",
        "isActive",
    ];

    fn from_input(input: &RequestInput) -> Result<Self, ApiError> {
        let now = Utc::now();
        Ok(Self {
            id: RecordId::new(),
            message: input.string(Body, "message")?,
            geolocation: input.string(Body, "geolocation")?,
            bid: input.number(Body, "bid")?,
            weight: input.number(Body, "weight")?,
            user_id: input.record_id(Body, "userId")?,
            publication_id: input.record_id(Body, "publicationId")?,
            is_active: input.flag(Body, "isActive").unwrap_or(true),
            deleted_at: Lifecycle::Live,
            created_at: now,
            updated_at: now,
        })
    }
}
