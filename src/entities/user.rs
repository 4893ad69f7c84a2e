//! Users and their public projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::error::{ApiError, Location::Body};
use crate::core::id::RecordId;
use crate::core::validation::RequestInput;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
}

impl UserStatus {
    pub const ALL: [&'static str; 2] = ["enabled", "disabled"];

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "enabled" => Some(UserStatus::Enabled),
            "disabled" => Some(UserStatus::Disabled),
            _ => None,
        }
    }
}

/// Stored user. `password` holds the bcrypt hash once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,

    /// Lower-cased, unique
    pub email: String,

    pub password: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub status: UserStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fields a partial update may set
    pub const UPDATABLE: &'static [&'static str] = &[
        "firstName",
        "lastName",
        "email",
        "password",
        "phone",
        "status",
    ];

    /// Build a new user from a validated request; the password is still plaintext
    pub fn from_input(input: &RequestInput) -> Result<Self, ApiError> {
        let now = Utc::now();
        Ok(Self {
            id: RecordId::new(),
            first_name: input.string(Body, "firstName")?,
            last_name: input.string(Body, "lastName")?,
            email: input.string(Body, "email")?,
            password: input.string(Body, "password")?,
            phone: input.text(Body, "phone").map(str::to_string),
            status: input
                .text(Body, "status")
                .and_then(UserStatus::parse)
                .unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Read projection without the password
    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

impl Record for User {
    fn resource_name() -> &'static str {
        "users"
    }

    fn resource_name_singular() -> &'static str {
        "user"
    }

    fn label() -> &'static str {
        "User"
    }

    fn id_param() -> &'static str {
        "userId"
    }

    fn id(&self) -> RecordId {
        self.id
    }
}

/// What clients see of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
