use crate::{error::AppError, state::AppState};
use axum::Router;

mod dto;
pub mod handlers;
#[cfg(test)]
mod memory;
mod repo;
mod repo_types;
mod slug;

#[cfg(test)]
pub use memory::{BlindLookupStore, MemoryUserStore};
pub use repo::{PgUserStore, StoreError, UserStore};
pub use repo_types::{NewUser, ProfileUpdate, UniqueField, User};
pub use slug::{is_reserved_handle, slugify_handle};

pub const EMAIL_TAKEN: &str = "a user with that email is already registered";
pub const HANDLE_TAKEN: &str = "handle not available";
pub const USER_NOT_FOUND: &str = "user does not exist";

/// 409 response for a uniqueness violation, whether caught by a pre-check or
/// raised by the store.
pub fn conflict_error(field: UniqueField) -> AppError {
    match field {
        UniqueField::Email => AppError::Conflict(EMAIL_TAKEN.into()),
        UniqueField::Handle => AppError::Conflict(HANDLE_TAKEN.into()),
    }
}

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
