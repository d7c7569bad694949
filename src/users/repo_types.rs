use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub handle: String, // slugged, unique
    pub name: String,
    pub email: String, // lowercased, unique
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub description: String,
    pub image: String,
    pub links: String,   // JSON-encoded list, stored as-is
    pub qr_code: String, // data URL of the last generated QR
    pub visits: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields supplied at registration; everything else takes its column default.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub description: String,
}

/// `None` leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub handle: String,
    pub description: Option<String>,
    pub links: Option<String>,
}

/// Column a uniqueness violation was raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Handle,
}
