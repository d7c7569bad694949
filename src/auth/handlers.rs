use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        validation::body_rejection,
    },
    error::{AppError, FieldError},
    state::AppState,
    users::{conflict_error, is_reserved_handle, slugify_handle, NewUser, StoreError, UniqueField, USER_NOT_FOUND},
};

pub const ACCOUNT_CREATED: &str = "account created successfully";
pub const INCORRECT_PASSWORD: &str = "incorrect password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), AppError> {
    let Json(mut payload) = payload.map_err(body_rejection)?;
    payload.normalize_and_validate()?;

    if state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(AppError::internal)?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(conflict_error(UniqueField::Email));
    }

    let handle = slugify_handle(&payload.handle);
    if handle.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "handle",
            "must contain at least one letter or digit",
        )]));
    }
    if is_reserved_handle(&handle)
        || state
            .users
            .find_by_handle(&handle)
            .await
            .map_err(AppError::internal)?
            .is_some()
    {
        warn!(%handle, "handle already taken");
        return Err(conflict_error(UniqueField::Handle));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::internal(e)
    })?;

    let new = NewUser {
        handle,
        name: payload.name,
        email: payload.email,
        password_hash,
        description: payload.description,
    };
    let user = match state.users.create(new).await {
        Ok(u) => u,
        // lost a race against a concurrent registration
        Err(StoreError::Conflict(field)) => return Err(conflict_error(field)),
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(AppError::internal(e));
        }
    };

    info!(user_id = %user.id, handle = %user.handle, "user registered");
    Ok((StatusCode::CREATED, ACCOUNT_CREATED))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(mut payload) = payload.map_err(body_rejection)?;
    payload.normalize_and_validate()?;

    let user = match state.users.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::NotFound(USER_NOT_FOUND.into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(AppError::internal(e));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "verify_password failed");
        AppError::internal(e)
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INCORRECT_PASSWORD.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AppError::internal(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
