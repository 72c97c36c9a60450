use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{error, instrument};

use skin_nova_domain::auth::AuthUser;
use skin_nova_domain::entities::{DoctorDocuments, PublicUser};
use skin_nova_domain::services::users::MAX_VERIFICATION_DOCUMENTS;

use crate::api::handlers::read_file_fields;
use crate::api::{ApiResult, AppState, ErrorResponse};
use crate::entities::reports::{DocumentsUpload, DocumentsUploadResponse};
use crate::entities::users::DoctorsQuery;

fn document_content_type(filename: &str) -> &'static str {
    match std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Doctors for the booking page
#[utoipa::path(
    get,
    path = "/api/doctors/verified",
    params(DoctorsQuery),
    responses(
        (status = 200, description = "Doctors", body = [PublicUser]),
    ),
    tag = "doctors"
)]
#[instrument(skip(state))]
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorsQuery>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let doctors = state
        .services
        .users
        .list_doctors(query.verified_only.unwrap_or(true))
        .await?;
    Ok(Json(doctors))
}

/// Replace the caller's verification documents (multipart field `documents`, up to five files)
#[utoipa::path(
    post,
    path = "/api/doctors/upload-documents",
    request_body(content = DocumentsUpload, content_type = "multipart/form-data", description = "PDF, image or Word files under the `documents` field"),
    responses(
        (status = 200, description = "Documents stored", body = DocumentsUploadResponse),
        (status = 400, description = "No files, too many files or unsupported file type", body = ErrorResponse),
        (status = 403, description = "Caller is not a doctor", body = ErrorResponse),
        (status = 413, description = "File larger than 10 MB", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "doctors"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_documents(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Json<DocumentsUploadResponse>> {
    let files: Vec<(String, Vec<u8>)> = read_file_fields(multipart, "documents", MAX_VERIFICATION_DOCUMENTS)
        .await?
        .into_iter()
        .map(|file| (file.filename, file.bytes))
        .collect();

    let documents = state
        .services
        .users
        .upload_verification_documents(&user, &files)
        .await?;
    Ok(Json(documents.into()))
}

#[utoipa::path(
    get,
    path = "/api/doctors/documents/{doctorId}",
    params(("doctorId" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Stored document names", body = DoctorDocuments),
        (status = 403, description = "Neither the doctor nor an admin", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "doctors"
)]
#[instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<String>,
) -> ApiResult<Json<DoctorDocuments>> {
    Ok(Json(state.services.users.verification_documents(&user, &doctor_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/doctors/documents/{doctorId}/download/{filename}",
    params(
        ("doctorId" = String, Path, description = "Doctor ID"),
        ("filename" = String, Path, description = "Stored document name"),
    ),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 403, description = "Neither the doctor nor an admin", body = ErrorResponse),
        (status = 404, description = "Doctor or document not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "doctors"
)]
#[instrument(skip(state))]
pub async fn download_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((doctor_id, filename)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let path = state
        .services
        .users
        .verification_document_path(&user, &doctor_id, &filename)
        .await?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!("Failed to read verification document {:?}: {}", path, e);
        ErrorResponse::not_found("File not found on server")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, document_content_type(&filename).to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        bytes,
    ))
}
