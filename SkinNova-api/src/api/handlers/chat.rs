use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use skin_nova_data::models::{Chat, ChatMessage};
use skin_nova_domain::auth::AuthUser;
use skin_nova_domain::entities::{AppointmentWithChat, DoctorPatientChat};

use crate::api::error::validate_request;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::chat::MessageRequest;

/// The chat between a patient and a doctor, created on first access
#[utoipa::path(
    get,
    path = "/api/chat/{patientId}/{doctorId}",
    params(
        ("patientId" = String, Path, description = "Patient ID"),
        ("doctorId" = String, Path, description = "Doctor ID"),
    ),
    responses(
        (status = 200, description = "Chat with its messages", body = Chat),
        (status = 403, description = "Not a participant or no active appointment", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state))]
pub async fn get_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, doctor_id)): Path<(String, String)>,
) -> ApiResult<Json<Chat>> {
    Ok(Json(state.services.chat.get_or_create(&user, &patient_id, &doctor_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/chat/{patientId}/{doctorId}/message",
    params(
        ("patientId" = String, Path, description = "Patient ID"),
        ("doctorId" = String, Path, description = "Doctor ID"),
    ),
    request_body = MessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Chat),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 403, description = "Not a participant or no active appointment", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, request))]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, doctor_id)): Path<(String, String)>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;
    let chat = state
        .services
        .chat
        .send_message(&user, &patient_id, &doctor_id, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

#[utoipa::path(
    put,
    path = "/api/chat/{patientId}/{doctorId}/message/{messageId}",
    params(
        ("patientId" = String, Path, description = "Patient ID"),
        ("doctorId" = String, Path, description = "Doctor ID"),
        ("messageId" = String, Path, description = "Message ID"),
    ),
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Message edited", body = ChatMessage),
        (status = 400, description = "Empty or deleted message", body = ErrorResponse),
        (status = 403, description = "Only the sender can edit", body = ErrorResponse),
        (status = 404, description = "Chat or message not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state, request))]
pub async fn edit_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, doctor_id, message_id)): Path<(String, String, String)>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<Json<ChatMessage>> {
    validate_request(&request)?;
    let message = state
        .services
        .chat
        .edit_message(&user, &patient_id, &doctor_id, &message_id, &request.content)
        .await?;
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/chat/{patientId}/{doctorId}/message/{messageId}",
    params(
        ("patientId" = String, Path, description = "Patient ID"),
        ("doctorId" = String, Path, description = "Doctor ID"),
        ("messageId" = String, Path, description = "Message ID"),
    ),
    responses(
        (status = 200, description = "Message marked deleted", body = ChatMessage),
        (status = 403, description = "Only the sender can delete", body = ErrorResponse),
        (status = 404, description = "Chat or message not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, doctor_id, message_id)): Path<(String, String, String)>,
) -> ApiResult<Json<ChatMessage>> {
    let message = state
        .services
        .chat
        .delete_message(&user, &patient_id, &doctor_id, &message_id)
        .await?;
    Ok(Json(message))
}

/// All chats a user takes part in
#[utoipa::path(
    get,
    path = "/api/chat/user/{userId}",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Chats, most recently active first", body = [Chat]),
        (status = 403, description = "Not your chats", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state))]
pub async fn user_chats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Chat>>> {
    Ok(Json(state.services.chat.list_for_user(&user, &user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/chat/doctor/{doctorId}/patients",
    params(("doctorId" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Patients the doctor can chat with", body = [DoctorPatientChat]),
        (status = 403, description = "Not your patients", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state))]
pub async fn doctor_patients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<String>,
) -> ApiResult<Json<Vec<DoctorPatientChat>>> {
    Ok(Json(state.services.chat.doctor_patients(&user, &doctor_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/chat/patient/{patientId}/appointments-with-chat",
    params(("patientId" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Approved appointments with chat state", body = [AppointmentWithChat]),
        (status = 403, description = "Not your appointments", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
#[instrument(skip(state))]
pub async fn appointments_with_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<String>,
) -> ApiResult<Json<Vec<AppointmentWithChat>>> {
    Ok(Json(state.services.chat.appointments_with_chat(&user, &patient_id).await?))
}
