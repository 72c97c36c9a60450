// Account and appointment management for administrators.
// Every route here sits behind the admin role check.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use skin_nova_data::models::Appointment;
use skin_nova_domain::auth::AuthUser;
use skin_nova_domain::entities::PublicUser;

use crate::api::error::validate_request;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::common::MessageResponse;
use crate::entities::users::{UpdateUserRequest, VerifyUserRequest};

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [PublicUser]),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    Ok(Json(state.services.users.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account", body = PublicUser),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.services.users.get_user(&id).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = PublicUser),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    validate_request(&request)?;
    let user = state.services.users.update_user(&admin, &id, request.into()).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Admins cannot delete themselves", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.users.delete_user(&admin, &id).await?;
    info!("User {} deleted by {}", id, admin.id);
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Mark an account verified. An empty body verifies.
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/verify",
    params(("id" = String, Path, description = "User ID")),
    request_body = VerifyUserRequest,
    responses(
        (status = 200, description = "Updated account", body = PublicUser),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn verify_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<VerifyUserRequest>>,
) -> ApiResult<Json<PublicUser>> {
    let verified = request.map_or(true, |Json(request)| request.verified);
    Ok(Json(state.services.users.set_verified(&id, verified).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/appointments",
    responses(
        (status = 200, description = "Every appointment, newest first", body = [Appointment]),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state))]
pub async fn list_appointments(State(state): State<AppState>) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(state.services.appointments.list_all().await?))
}
