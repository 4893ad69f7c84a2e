//! Macros for reducing boilerplate when defining listing records
//!
//! Publications and supplies share one shape and one lifecycle. Each is its
//! own type so the stores, routes and messages stay distinct.

/// Define a listing record type and implement [`Record`] and [`Resource`] for it
///
/// # Example
/// ```rust,ignore
/// impl_listing_entity!(Publication, "publication", "publications", "Publication", "publicationId");
/// ```
///
/// [`Record`]: crate::core::entity::Record
/// [`Resource`]: crate::core::entity::Resource
#[macro_export]
macro_rules! impl_listing_entity {
    (
        $type:ident,
        $singular:expr,
        $plural:expr,
        $label:expr,
        $id_param:expr $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $type {
            pub id: $crate::core::id::RecordId,

            /// Free text
            pub message: String,

            /// Category tag
            #[serde(rename = "type")]
            pub kind: String,

            /// Free-text location
            pub geolocation: String,

            pub weight: f64,

            pub price: f64,

            /// Owning user
            pub user_id: $crate::core::id::RecordId,

            #[serde(default = "default_active")]
            pub is_active: bool,

            #[serde(default)]
            pub deleted_at: $crate::core::entity::Lifecycle,

            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            pub updated_at: ::chrono::DateTime<::chrono::Utc>,
        }

        impl $crate::core::entity::Record for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn label() -> &'static str {
                $label
            }

            fn id_param() -> &'static str {
                $id_param
            }

            fn id(&self) -> $crate::core::id::RecordId {
                self.id
            }

            fn lifecycle(&self) -> $crate::core::entity::Lifecycle {
                self.deleted_at
            }
        }

        impl $crate::core::entity::Resource for $type {
            const LIST_FILTERS: &'static [&'static str] = &["message", "type", "isActive"];

            const UPDATABLE: &'static [&'static str] = &[
                "message",
                "type",
                "geolocation",
                "weight",
                "price",
                "userId",
                "isActive",
            ];

            fn from_input(
                input: &$crate::core::validation::RequestInput,
            ) -> Result<Self, $crate::core::error::ApiError> {
                use $crate::core::error::Location::Body;

                let now = ::chrono::Utc::now();
                Ok(Self {
                    id: $crate::core::id::RecordId::new(),
                    message: input.string(Body, "message")?,
                    kind: input.string(Body, "type")?,
                    geolocation: input.string(Body, "geolocation")?,
                    weight: input.number(Body, "weight")?,
                    price: input.number(Body, "price")?,
                    user_id: input.record_id(Body, "userId")?,
                    is_active: input.flag(Body, "isActive").unwrap_or(true),
                    deleted_at: $crate::core::entity::Lifecycle::Live,
                    created_at: now,
                    updated_at: now,
                })
            }
        }
    };
}
