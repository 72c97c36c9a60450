// Patient reports and report access grants.
// Patients manage their own reports; doctors read them through a grant.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use skin_nova_data::models::{Report, ReportAccess};
use skin_nova_domain::auth::AuthUser;
use skin_nova_domain::entities::{PatientReports, ReportAccessStatus};

use crate::api::error::validate_request;
use crate::api::handlers::read_file_field;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::common::{FileUpload, MessageResponse};
use crate::entities::reports::{AccessCheckResponse, ReportAccessRequest, ReportFileResponse, ReportRequest};

/// The caller's reports, latest first
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Reports", body = [Report]),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state))]
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Report>>> {
    Ok(Json(state.services.reports.list_mine(&user).await?))
}

#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = ReportRequest,
    responses(
        (status = 201, description = "Report stored", body = Report),
        (status = 400, description = "Missing report name", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, request))]
pub async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;
    let report = state.services.reports.create(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Store a report file (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/reports/upload",
    request_body(content = FileUpload, content_type = "multipart/form-data", description = "PDF or Word document under the `file` field"),
    responses(
        (status = 200, description = "File stored", body = ReportFileResponse),
        (status = 400, description = "No file or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File larger than 10 MB", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<ReportFileResponse>> {
    let file = read_file_field(multipart, "file").await?;
    let stored = state.services.reports.upload_file(&user, &file.filename, &file.bytes).await?;
    Ok(Json(ReportFileResponse::new(stored, file.filename)))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 404, description = "No such report of the caller", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Report>> {
    Ok(Json(state.services.reports.get(&user, &id).await?))
}

#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report updated", body = Report),
        (status = 404, description = "No such report of the caller", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, request))]
pub async fn update_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<Json<Report>> {
    validate_request(&request)?;
    Ok(Json(state.services.reports.update(&user, &id, request.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report deleted", body = MessageResponse),
        (status = 404, description = "No such report of the caller", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state))]
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.reports.delete(&user, &id).await?;
    Ok(Json(MessageResponse::new("Report deleted successfully")))
}

/// Let the doctor of one of the caller's appointments read their reports
#[utoipa::path(
    post,
    path = "/api/report-access/grant",
    request_body = ReportAccessRequest,
    responses(
        (status = 200, description = "Access granted", body = ReportAccess),
        (status = 400, description = "Missing doctor or appointment", body = ErrorResponse),
        (status = 404, description = "No such appointment between caller and doctor", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "report-access"
)]
#[instrument(skip(state))]
pub async fn grant_access(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ReportAccessRequest>,
) -> ApiResult<Json<ReportAccess>> {
    let access = state
        .services
        .reports
        .grant_access(&user, &request.doctor_id, &request.appointment_id)
        .await?;
    Ok(Json(access))
}

#[utoipa::path(
    post,
    path = "/api/report-access/revoke",
    request_body = ReportAccessRequest,
    responses(
        (status = 200, description = "Access revoked", body = MessageResponse),
        (status = 404, description = "Access record not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "report-access"
)]
#[instrument(skip(state))]
pub async fn revoke_access(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ReportAccessRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .services
        .reports
        .revoke_access(&user, &request.doctor_id, &request.appointment_id)
        .await?;
    Ok(Json(MessageResponse::new("Access revoked successfully")))
}

/// Whether the calling doctor may read the patient's reports for an appointment
#[utoipa::path(
    get,
    path = "/api/report-access/check/{patientId}/{appointmentId}",
    params(
        ("patientId" = String, Path, description = "Patient ID"),
        ("appointmentId" = String, Path, description = "Appointment ID"),
    ),
    responses(
        (status = 200, description = "Access state", body = AccessCheckResponse),
    ),
    security(("bearer" = [])),
    tag = "report-access"
)]
#[instrument(skip(state))]
pub async fn check_access(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, appointment_id)): Path<(String, String)>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let has_access = state
        .services
        .reports
        .check_access(&user, &patient_id, &appointment_id)
        .await?;
    Ok(Json(AccessCheckResponse { has_access }))
}

/// The caller's access record for one of their appointments
#[utoipa::path(
    get,
    path = "/api/report-access/{appointmentId}",
    params(("appointmentId" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Access record, if any", body = ReportAccessStatus),
    ),
    security(("bearer" = [])),
    tag = "report-access"
)]
#[instrument(skip(state))]
pub async fn access_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<String>,
) -> ApiResult<Json<ReportAccessStatus>> {
    Ok(Json(state.services.reports.access_status(&user, &appointment_id).await?))
}

/// A patient's reports, for a doctor holding any grant from them
#[utoipa::path(
    get,
    path = "/api/patient-reports/{patientId}",
    params(("patientId" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient and reports", body = PatientReports),
        (status = 403, description = "No grant in effect", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "report-access"
)]
#[instrument(skip(state))]
pub async fn patient_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<String>,
) -> ApiResult<Json<PatientReports>> {
    Ok(Json(state.services.reports.patient_reports(&user, &patient_id, None).await?))
}

#[utoipa::path(
    get,
    path = "/api/patient-reports/{patientId}/{appointmentId}",
    params(
        ("patientId" = String, Path, description = "Patient ID"),
        ("appointmentId" = String, Path, description = "Appointment the grant was given for"),
    ),
    responses(
        (status = 200, description = "Patient and reports", body = PatientReports),
        (status = 403, description = "No grant in effect for this appointment", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "report-access"
)]
#[instrument(skip(state))]
pub async fn patient_reports_for_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, appointment_id)): Path<(String, String)>,
) -> ApiResult<Json<PatientReports>> {
    let reports = state
        .services
        .reports
        .patient_reports(&user, &patient_id, Some(&appointment_id))
        .await?;
    Ok(Json(reports))
}
