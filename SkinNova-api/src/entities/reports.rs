use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use skin_nova_domain::entities::ReportInput;
use skin_nova_domain::uploads::StoredFile;

/// Report fields. `reportName` is required on create.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[validate(length(max = 200, message = "Report name cannot exceed 200 characters"))]
    pub report_name: Option<String>,
    /// e.g. "Skin Analysis", "Lab Test", "Follow-up"
    #[validate(length(max = 100, message = "Report type cannot exceed 100 characters"))]
    pub report_type: Option<String>,
    #[validate(length(max = 5000, message = "Description cannot exceed 5000 characters"))]
    pub description: Option<String>,
    /// Url returned by `/api/reports/upload`
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

impl From<ReportRequest> for ReportInput {
    fn from(request: ReportRequest) -> Self {
        ReportInput {
            report_name: request.report_name,
            report_type: request.report_type,
            description: request.description,
            file_url: request.file_url,
            file_name: request.file_name,
        }
    }
}

/// The doctor and appointment a grant is about
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportAccessRequest {
    #[serde(default)]
    pub doctor_id: String,
    #[serde(default)]
    pub appointment_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheckResponse {
    pub has_access: bool,
}

/// A stored report file, ready to be attached to a report
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFileResponse {
    pub message: String,
    pub file_url: String,
    /// Name the file was uploaded with
    pub file_name: String,
}

impl ReportFileResponse {
    pub fn new(stored: StoredFile, original_name: String) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            file_url: stored.url,
            file_name: original_name,
        }
    }
}

/// Multipart form with up to five files under `documents`
#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentsUpload {
    #[schema(value_type = Vec<String>)]
    pub documents: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsUploadResponse {
    pub message: String,
    pub verification_documents: Vec<String>,
    pub file_count: usize,
}

impl From<Vec<String>> for DocumentsUploadResponse {
    fn from(documents: Vec<String>) -> Self {
        Self {
            message: "Documents uploaded successfully".to_string(),
            file_count: documents.len(),
            verification_documents: documents,
        }
    }
}
