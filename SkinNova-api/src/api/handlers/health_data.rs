// Wearable measurements and the analytics computed over them

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use skin_nova_data::models::HealthRecord;
use skin_nova_domain::auth::AuthUser;
use skin_nova_domain::entities::{HealthAnalytics, HealthRecordPage, LatestHealth};

use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::health_data::{AnalyticsQuery, HealthRecordRequest, RecordsQuery};

#[utoipa::path(
    post,
    path = "/api/health-data/records",
    request_body = HealthRecordRequest,
    responses(
        (status = 201, description = "Record stored", body = HealthRecord),
        (status = 400, description = "A metric is out of range", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-data"
)]
#[instrument(skip(state, request))]
pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<HealthRecordRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = state.services.health_metrics.record(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/health-data/records",
    params(RecordsQuery),
    responses(
        (status = 200, description = "Page of records, newest first", body = HealthRecordPage),
        (status = 400, description = "Unknown device type", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-data"
)]
#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecordsQuery>,
) -> ApiResult<Json<HealthRecordPage>> {
    let page = state.services.health_metrics.list(&user, query.try_into()?).await?;
    Ok(Json(page))
}

/// Newest record plus a summary of the last 24 hours
#[utoipa::path(
    get,
    path = "/api/health-data/latest",
    responses(
        (status = 200, description = "Latest measurements", body = LatestHealth),
    ),
    security(("bearer" = [])),
    tag = "health-data"
)]
#[instrument(skip(state))]
pub async fn latest(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<LatestHealth>> {
    Ok(Json(state.services.health_metrics.latest(&user).await?))
}

#[utoipa::path(
    get,
    path = "/api/health-data/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Daily metrics, trends and insights", body = HealthAnalytics),
        (status = 400, description = "Unknown period", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health-data"
)]
#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<HealthAnalytics>> {
    let period = query.period()?;
    Ok(Json(state.services.health_metrics.analytics(&user, period).await?))
}
