// Request handlers, one module per resource

pub mod activities;
pub mod admin;
pub mod appointments;
pub mod auth;
pub mod availability;
pub mod banners;
pub mod chat;
pub mod doctors;
pub mod health;
pub mod health_data;
pub mod profile;
pub mod reports;

use axum::extract::Multipart;

use crate::api::{ApiResult, ErrorResponse};

/// A file read from a multipart form
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read the file sent under `field_name`, ignoring other fields
pub async fn read_file_field(mut multipart: Multipart, field_name: &str) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(ErrorResponse::bad_request("No file uploaded"))
}

/// Read every file sent under `field_name`, stopping with 400 once more than `max` arrive
pub async fn read_file_fields(mut multipart: Multipart, field_name: &str, max: usize) -> ApiResult<Vec<UploadedFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        if files.len() == max {
            return Err(ErrorResponse::bad_request(format!("At most {} files can be uploaded", max)));
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        files.push(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(ErrorResponse::bad_request("No files uploaded"));
    }
    Ok(files)
}
