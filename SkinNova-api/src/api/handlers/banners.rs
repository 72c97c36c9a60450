use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::instrument;

use skin_nova_data::models::Banner;

use crate::api::error::validate_request;
use crate::api::handlers::read_file_field;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::banners::BannerRequest;
use crate::entities::common::{FileUpload, MessageResponse, UploadResponse};

/// Active banners for the landing page
#[utoipa::path(
    get,
    path = "/api/banners/all",
    responses(
        (status = 200, description = "Active banners", body = [Banner]),
    ),
    tag = "banners"
)]
#[instrument(skip(state))]
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<Banner>>> {
    Ok(Json(state.services.banners.list_active().await?))
}

#[utoipa::path(
    get,
    path = "/api/banners/all-admin",
    responses(
        (status = 200, description = "All banners, active or not", body = [Banner]),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "banners"
)]
#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Banner>>> {
    Ok(Json(state.services.banners.list_all().await?))
}

/// Store a banner image (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/banners/upload",
    request_body(content = FileUpload, content_type = "multipart/form-data", description = "Image under the `file` field"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No file or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "banners"
)]
#[instrument(skip(state, multipart))]
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> ApiResult<impl IntoResponse> {
    let file = read_file_field(multipart, "file").await?;
    let stored = state.services.banners.upload(&file.filename, &file.bytes).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse::from(stored))))
}

#[utoipa::path(
    post,
    path = "/api/banners/create",
    request_body = BannerRequest,
    responses(
        (status = 201, description = "Banner created", body = Banner),
        (status = 400, description = "Missing title or image", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "banners"
)]
#[instrument(skip(state, request))]
pub async fn create(State(state): State<AppState>, Json(request): Json<BannerRequest>) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;
    let banner = state.services.banners.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

#[utoipa::path(
    put,
    path = "/api/banners/{id}",
    params(("id" = String, Path, description = "Banner ID")),
    request_body = BannerRequest,
    responses(
        (status = 200, description = "Banner updated", body = Banner),
        (status = 404, description = "Banner not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "banners"
)]
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BannerRequest>,
) -> ApiResult<Json<Banner>> {
    validate_request(&request)?;
    Ok(Json(state.services.banners.update(&id, request.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/banners/{id}",
    params(("id" = String, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner deleted", body = MessageResponse),
        (status = 404, description = "Banner not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "banners"
)]
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<MessageResponse>> {
    state.services.banners.delete(&id).await?;
    Ok(Json(MessageResponse::new("Banner deleted")))
}

#[utoipa::path(
    patch,
    path = "/api/banners/{id}/toggle",
    params(("id" = String, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner with flipped isActive", body = Banner),
        (status = 404, description = "Banner not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "banners"
)]
#[instrument(skip(state))]
pub async fn toggle(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Banner>> {
    Ok(Json(state.services.banners.toggle(&id).await?))
}
