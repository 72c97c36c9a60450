use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use skin_nova_data::models::AvailabilitySlot;
use skin_nova_domain::auth::AuthUser;

use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::availability::{SlotRequest, SlotUpdateRequest};
use crate::entities::common::MessageResponse;

/// The calling doctor's active slots
#[utoipa::path(
    get,
    path = "/api/availability/my-availability",
    responses(
        (status = 200, description = "Active slots by day and start time", body = [AvailabilitySlot]),
        (status = 403, description = "Only doctors have availability", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "availability"
)]
#[instrument(skip(state))]
pub async fn my_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<AvailabilitySlot>>> {
    Ok(Json(state.services.availability.my_availability(&user).await?))
}

/// A doctor's active slots
#[utoipa::path(
    get,
    path = "/api/availability/{doctorId}",
    params(("doctorId" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Active slots", body = [AvailabilitySlot]),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "availability"
)]
#[instrument(skip(state))]
pub async fn doctor_availability(
    State(state): State<AppState>,
    Path(doctor_id): Path<String>,
) -> ApiResult<Json<Vec<AvailabilitySlot>>> {
    Ok(Json(state.services.availability.doctor_availability(&doctor_id).await?))
}

/// Create the slot for a day, or replace the existing one
#[utoipa::path(
    post,
    path = "/api/availability",
    request_body = SlotRequest,
    responses(
        (status = 201, description = "Slot created", body = AvailabilitySlot),
        (status = 200, description = "Existing slot for that day updated", body = AvailabilitySlot),
        (status = 400, description = "Invalid day or times", body = ErrorResponse),
        (status = 403, description = "Only doctors have availability", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "availability"
)]
#[instrument(skip(state))]
pub async fn upsert_slot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SlotRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.services.availability.upsert(&user, request.into()).await?;
    let status = if outcome.is_created() {
        info!("Created availability slot {}", outcome.slot().id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_slot())))
}

#[utoipa::path(
    put,
    path = "/api/availability/{slotId}",
    params(("slotId" = String, Path, description = "Slot ID")),
    request_body = SlotUpdateRequest,
    responses(
        (status = 200, description = "Slot updated", body = AvailabilitySlot),
        (status = 403, description = "Not the owner of the slot", body = ErrorResponse),
        (status = 404, description = "Slot not found", body = ErrorResponse),
        (status = 409, description = "Another slot already covers the new day", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "availability"
)]
#[instrument(skip(state))]
pub async fn update_slot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(slot_id): Path<String>,
    Json(request): Json<SlotUpdateRequest>,
) -> ApiResult<Json<AvailabilitySlot>> {
    let slot = state
        .services
        .availability
        .update_slot(&user, &slot_id, request.into())
        .await?;
    Ok(Json(slot))
}

/// Deactivate a slot
#[utoipa::path(
    delete,
    path = "/api/availability/{slotId}",
    params(("slotId" = String, Path, description = "Slot ID")),
    responses(
        (status = 200, description = "Slot deactivated", body = MessageResponse),
        (status = 403, description = "Not the owner of the slot", body = ErrorResponse),
        (status = 404, description = "Slot not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "availability"
)]
#[instrument(skip(state))]
pub async fn delete_slot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(slot_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.availability.delete_slot(&user, &slot_id).await?;
    Ok(Json(MessageResponse::new("Availability slot deleted")))
}
