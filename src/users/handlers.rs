use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{ImageResponse, PublicProfile, QrResponse, SearchHandleRequest, UpdateProfileRequest};
use super::{
    conflict_error, is_reserved_handle, slugify_handle, ProfileUpdate, StoreError, UniqueField, User, USER_NOT_FOUND,
};
use crate::{
    auth::{
        extractors::CurrentUser,
        validation::{body_rejection, Validator},
    },
    error::{AppError, FieldError},
    qr::{self, QrOptions},
    state::AppState,
    storage::avatar_key,
};

pub const PROFILE_UPDATED: &str = "profile updated successfully";
pub const UPLOAD_ERROR: &str = "there was an error uploading the image";
pub const QR_ERROR: &str = "error generating QR code";

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_profile))
        .route(
            "/me/image",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/me/qr", post(generate_qr))
        .route("/search-handle", post(search_handle))
        .route("/:handle", get(get_by_handle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let Json(payload) = payload.map_err(body_rejection)?;

    let handle = slugify_handle(&payload.handle);
    if handle.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "handle",
            "must contain at least one letter or digit",
        )]));
    }

    if is_reserved_handle(&handle) {
        warn!(%handle, "reserved handle requested");
        return Err(conflict_error(UniqueField::Handle));
    }

    match state.users.find_by_handle(&handle).await {
        Ok(Some(owner)) if owner.email != user.email => {
            warn!(%handle, "handle owned by another user");
            return Err(conflict_error(UniqueField::Handle));
        }
        Ok(_) => {}
        Err(e) => return Err(AppError::internal(e)),
    }

    let update = ProfileUpdate {
        handle,
        description: payload.description.clone(),
        links: payload.links_text(),
    };
    match state.users.update_profile(user.id, update).await {
        Ok(updated) => {
            info!(handle = %updated.handle, "profile updated");
            Ok(PROFILE_UPDATED)
        }
        Err(StoreError::Conflict(field)) => Err(conflict_error(field)),
        Err(e) => {
            error!(error = %e, "update profile failed");
            Err(AppError::internal(e))
        }
    }
}

/// Pulls the first `file` part out of the form.
async fn read_file_field(mp: &mut Multipart) -> anyhow::Result<(Bytes, String)> {
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await?;
        return Ok((body, content_type));
    }
    anyhow::bail!("multipart form has no `file` field")
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn upload_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageResponse>, AppError> {
    let mut mp = mp.map_err(AppError::internal)?;
    let (body, content_type) = read_file_field(&mut mp).await.map_err(AppError::internal)?;

    let key = avatar_key(Uuid::new_v4(), &content_type);
    let media = state.media.clone();
    // a panicking uploader surfaces as a JoinError instead of dropping the request
    let upload = tokio::spawn(async move { media.upload(&key, body, &content_type).await });
    let url = match upload.await {
        Ok(Ok(url)) => url,
        Ok(Err(e)) => return Err(AppError::internal_with(UPLOAD_ERROR, e)),
        Err(e) => return Err(AppError::internal_with(UPLOAD_ERROR, e)),
    };

    state
        .users
        .set_image(user.id, &url)
        .await
        .map_err(AppError::internal)?;

    info!(%url, "profile image uploaded");
    Ok(Json(ImageResponse { image: url }))
}

#[instrument(skip(state))]
pub async fn get_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    match state.users.record_visit(&handle).await {
        Ok(Some(user)) => Ok(Json(PublicProfile::from(user))),
        Ok(None) => Err(AppError::NotFound(USER_NOT_FOUND.into())),
        Err(e) => {
            error!(error = %e, "record_visit failed");
            Err(AppError::internal(e))
        }
    }
}

/// Checks the handle exactly as submitted, without slugging.
#[instrument(skip_all)]
pub async fn search_handle(
    State(state): State<AppState>,
    payload: Result<Json<SearchHandleRequest>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(payload) = payload.map_err(body_rejection)?;
    let mut v = Validator::default();
    v.require("handle", &payload.handle);
    v.finish()?;

    let taken = state
        .users
        .find_by_handle(&payload.handle)
        .await
        .map_err(AppError::internal)?
        .is_some();
    if taken {
        return Err(AppError::Conflict(format!(
            "{} is already registered",
            payload.handle
        )));
    }
    Ok(format!("{} is available", payload.handle))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn generate_qr(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<QrResponse>, AppError> {
    let profile_url = format!(
        "{}/{}",
        state.config.profile_base_url.trim_end_matches('/'),
        user.handle
    );

    let data = qr::encode_data_url(&profile_url, &QrOptions::default())
        .map_err(|e| AppError::internal_with(QR_ERROR, e))?;

    // always overwritten; the stored copy is for clients that want it offline
    state
        .users
        .set_qr_code(user.id, &data)
        .await
        .map_err(|e| AppError::internal_with(QR_ERROR, e))?;

    Ok(Json(QrResponse { qr_code: data }))
}
