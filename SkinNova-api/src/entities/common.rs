use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use skin_nova_domain::uploads::StoredFile;

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Multipart form carrying one file under `file`
#[derive(Debug, ToSchema)]
pub struct FileUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// A file accepted by an upload endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    /// Public path under `/uploads`
    pub url: String,
}

impl From<StoredFile> for UploadResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: file.filename,
            url: file.url,
        }
    }
}
