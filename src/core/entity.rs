//! Record traits defining the core abstraction for all stored types

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::ApiError;
use crate::core::id::RecordId;
use crate::core::validation::RequestInput;

/// Lifecycle of a soft-deletable record.
///
/// On the wire and in storage this is the nullable `deletedAt` field:
/// `null` means [`Lifecycle::Live`], a timestamp means [`Lifecycle::Deleted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Visible to normal reads
    #[default]
    Live,

    /// Hidden from list reads, retained in the store
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    /// Whether the record is still live
    pub fn is_live(&self) -> bool {
        matches!(self, Lifecycle::Live)
    }

    /// Deletion timestamp, if any
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Live => None,
            Lifecycle::Deleted { at } => Some(*at),
        }
    }
}

impl From<Option<DateTime<Utc>>> for Lifecycle {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(at) => Lifecycle::Deleted { at },
            None => Lifecycle::Live,
        }
    }
}

impl Serialize for Lifecycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.deleted_at().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Lifecycle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer).map(Lifecycle::from)
    }
}

/// Base trait for everything kept in a store.
///
/// The serialized form of a record is its storage form: field names are the
/// camelCase names clients see, and `id` is the record identifier.
pub trait Record: Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Plural name: collection name, list envelope key and route prefix
    fn resource_name() -> &'static str;

    /// Singular name used as the envelope key of a single record
    fn resource_name_singular() -> &'static str;

    /// Capitalised name used in human-readable messages
    fn label() -> &'static str;

    /// Name of the path parameter carrying this record's id
    fn id_param() -> &'static str;

    /// Identifier of this record
    fn id(&self) -> RecordId;

    /// Soft-delete state. Records that cannot be deleted are always live.
    fn lifecycle(&self) -> Lifecycle {
        Lifecycle::Live
    }

    /// Check if the record has not been soft-deleted
    fn is_live(&self) -> bool {
        self.lifecycle().is_live()
    }
}

/// A record managed by the shared create/list/get/update/delete controller.
pub trait Resource: Record {
    /// Query parameters accepted as exact-match list filters
    const LIST_FILTERS: &'static [&'static str];

    /// Body fields a partial update may set
    const UPDATABLE: &'static [&'static str];

    /// Build a new live record from an already validated and sanitized request
    fn from_input(input: &RequestInput) -> Result<Self, ApiError>;
}
