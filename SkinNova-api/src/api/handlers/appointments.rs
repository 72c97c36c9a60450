use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use skin_nova_data::models::Appointment;
use skin_nova_domain::auth::AuthUser;
use skin_nova_domain::entities::{AppointmentFilter, AppointmentListing};

use crate::api::error::validate_request;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::appointments::{
    AppointmentsQuery, ApproveAppointmentRequest, CompleteAppointmentRequest, CreateAppointmentRequest,
    RejectAppointmentRequest,
};

/// Request an appointment with a doctor
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment requested", body = Appointment),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Booking for another patient requires admin", body = ErrorResponse),
        (status = 404, description = "Patient or doctor not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state))]
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAppointmentRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;
    let appointment = state.services.appointments.create(&user, request.into()).await?;
    info!("Appointment {} requested", appointment.id);
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// The caller's appointments with per-status counts
#[utoipa::path(
    get,
    path = "/api/appointments",
    params(AppointmentsQuery),
    responses(
        (status = 200, description = "Appointments, newest requested date first", body = AppointmentListing),
        (status = 400, description = "Unknown view or status", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state))]
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AppointmentsQuery>,
) -> ApiResult<Json<AppointmentListing>> {
    let filter = AppointmentFilter::try_from(query)?;
    Ok(Json(state.services.appointments.list_for_user(&user, filter).await?))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}/approve",
    params(("id" = String, Path, description = "Appointment ID")),
    request_body = ApproveAppointmentRequest,
    responses(
        (status = 200, description = "Appointment approved", body = Appointment),
        (status = 403, description = "Only the assigned doctor", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Appointment is not pending", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state))]
pub async fn approve_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    request: Option<Json<ApproveAppointmentRequest>>,
) -> ApiResult<Json<Appointment>> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    validate_request(&request)?;
    Ok(Json(state.services.appointments.approve(&user, &id, request.into()).await?))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}/reject",
    params(("id" = String, Path, description = "Appointment ID")),
    request_body = RejectAppointmentRequest,
    responses(
        (status = 200, description = "Appointment rejected", body = Appointment),
        (status = 403, description = "Only the assigned doctor", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Appointment is not pending", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state))]
pub async fn reject_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    request: Option<Json<RejectAppointmentRequest>>,
) -> ApiResult<Json<Appointment>> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    validate_request(&request)?;
    Ok(Json(state.services.appointments.reject(&user, &id, request.into()).await?))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}/complete",
    params(("id" = String, Path, description = "Appointment ID")),
    request_body = CompleteAppointmentRequest,
    responses(
        (status = 200, description = "Appointment completed", body = Appointment),
        (status = 403, description = "Only the assigned doctor", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Appointment is not approved", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(state))]
pub async fn complete_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    request: Option<Json<CompleteAppointmentRequest>>,
) -> ApiResult<Json<Appointment>> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    validate_request(&request)?;
    Ok(Json(state.services.appointments.complete(&user, &id, request.into()).await?))
}
