use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// Coarse capability tag used for route-level gating. Stored as lowercase text
/// in the `users.role` column and parsed into this enum by the auth extractor.
/// There are no per-field permissions; a role either appears in an operation's
/// allow-list or the request is rejected with 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" => Ok(Role::User),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        };
        f.write_str(s)
    }
}

/// User
///
/// The authenticated principal's canonical record from the `users` table.
/// Only the minimal data needed by the auth extractor is loaded: identity,
/// email, and the raw role string (parsed to [`Role`] during authentication).
/// Users are never created or mutated by this service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // Lowercase role tag: 'admin', 'moderator' or 'user'.
    pub role: String,
}

/// Contact
///
/// A person record owned by exactly one user. Every read and mutation is
/// scoped to the owner (`user_id`), with the single documented exception of
/// the admin-only delete operation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Contact {
    // Server-assigned, immutable, always >= 1 (BIGSERIAL).
    pub id: i64,
    // FK to users.id (owner).
    pub user_id: Uuid,
    pub firstname: String,
    pub lastname: String,
    // Intended unique per owner; enforced by a pre-create existence check,
    // not a storage constraint.
    pub email: String,
    pub phone: String,
    #[ts(type = "string | null")]
    pub birthday: Option<NaiveDate>,
    pub notes: Option<String>,
    // Used by the recency listing (`/contacts/days/{days}`).
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateContactRequest
///
/// Full payload for POST /contacts. Schema validation (field lengths, email
/// format) runs before the handler touches the repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 50))]
    pub firstname: String,
    #[validate(length(min = 1, max = 50))]
    pub lastname: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub phone: String,
    #[ts(type = "string | null")]
    pub birthday: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// UpdateContactRequest
///
/// Partial update payload for PATCH /contacts/{contact_id}. Every field is
/// `Option<T>`: only fields present in the JSON body overwrite stored values,
/// absent fields retain their prior values. "Absent" and "set to empty" are
/// deliberately distinct states.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub firstname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub lastname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30))]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub birthday: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// ContactFilter
///
/// Accepted query parameters for the list endpoint (GET /contacts). Each
/// filter is independently optional; present filters are ANDed together as
/// case-insensitive partial matches in the repository.
#[derive(Debug, Clone, Deserialize, Default, utoipa::IntoParams)]
pub struct ContactFilter {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
}

impl ContactFilter {
    /// True when no filter parameter was supplied, selecting the unfiltered
    /// owner listing instead of the filtered lookup.
    pub fn is_empty(&self) -> bool {
        self.firstname.is_none() && self.lastname.is_none() && self.email.is_none()
    }
}
