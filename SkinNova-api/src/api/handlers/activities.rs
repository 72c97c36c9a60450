use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::instrument;

use skin_nova_data::models::Activity;
use skin_nova_domain::auth::AuthUser;

use crate::api::{ApiResult, AppState, ErrorResponse};

/// Recent activity across all users
#[utoipa::path(
    get,
    path = "/api/activities",
    responses(
        (status = 200, description = "Latest 100 activities", body = [Activity]),
        (status = 403, description = "Admin only", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "activities"
)]
#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Activity>>> {
    Ok(Json(state.services.activities.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/activities/{userId}",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Latest 50 activities of the user", body = [Activity]),
        (status = 403, description = "Not your activity", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "activities"
)]
#[instrument(skip(state))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Activity>>> {
    Ok(Json(state.services.activities.list_for_user(&user, &user_id).await?))
}
