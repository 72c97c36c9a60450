use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{error, instrument};

use skin_nova_domain::auth::AuthUser;

use crate::api::handlers::read_file_field;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::users::{ProfilePhotoResponse, ProfilePhotoUpload};

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Replace the caller's profile photo (multipart field `profilePhoto`)
#[utoipa::path(
    post,
    path = "/api/profile/upload-photo",
    request_body(content = ProfilePhotoUpload, content_type = "multipart/form-data", description = "Image under the `profilePhoto` field"),
    responses(
        (status = 200, description = "Photo stored", body = ProfilePhotoResponse),
        (status = 400, description = "No file or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File larger than 5 MB", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<ProfilePhotoResponse>> {
    let file = read_file_field(multipart, "profilePhoto").await?;
    let updated = state
        .services
        .users
        .upload_profile_photo(&user, &file.filename, &file.bytes)
        .await?;
    Ok(Json(updated.into()))
}

/// Serve a user's profile photo
#[utoipa::path(
    get,
    path = "/api/profile/photo/{userId}",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "User or photo not found", body = ErrorResponse),
    ),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn get_photo(State(state): State<AppState>, Path(user_id): Path<String>) -> ApiResult<impl IntoResponse> {
    let path = state.services.users.profile_photo_path(&user_id).await?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read profile photo {:?}: {}", path, e);
        ErrorResponse::not_found("Profile photo not found")
    })?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&path))], bytes))
}
