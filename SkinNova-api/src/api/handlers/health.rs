use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{instrument, warn};

use skin_nova_domain::health::SystemHealth;

use crate::api::AppState;

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API is healthy", body = SystemHealth),
        (status = 503, description = "The document store is unreachable", body = SystemHealth)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.health.get_system_health().await;

    let status = if health.is_available() {
        StatusCode::OK
    } else {
        warn!("Health check failed: {:?}", health.components);
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
