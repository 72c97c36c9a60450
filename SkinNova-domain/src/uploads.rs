//! Files uploaded by users, stored under the upload root and served at `/uploads`

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::services::errors::{ServiceError, ServiceResult};

const MB: usize = 1024 * 1024;

/// What an upload is for. Decides the directory, size limit and accepted extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Banner,
    ProfilePhoto,
    Report,
    /// Licences and certificates a doctor submits for review. Never served statically.
    VerificationDocument,
}

impl UploadKind {
    /// Kinds whose files are publicly served under `/uploads`
    pub const SERVED: [UploadKind; 3] = [UploadKind::Banner, UploadKind::ProfilePhoto, UploadKind::Report];

    pub fn directory(&self) -> &'static str {
        match self {
            UploadKind::Banner => "banners",
            UploadKind::ProfilePhoto => "profile-photos",
            UploadKind::Report => "reports",
            UploadKind::VerificationDocument => "verification-documents",
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Banner => 50 * MB,
            UploadKind::ProfilePhoto => 5 * MB,
            UploadKind::Report | UploadKind::VerificationDocument => 10 * MB,
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Banner => &["jpeg", "jpg", "png", "gif", "mp4", "webm", "avi", "mov"],
            UploadKind::ProfilePhoto => &["jpg", "jpeg", "png", "gif", "webp"],
            UploadKind::Report => &["pdf", "doc", "docx"],
            UploadKind::VerificationDocument => &["pdf", "jpg", "jpeg", "png", "doc", "docx"],
        }
    }

    fn rejection_message(&self) -> &'static str {
        match self {
            UploadKind::Banner => "Only image and video files are allowed",
            UploadKind::ProfilePhoto => "Only image files are allowed (jpg, jpeg, png, gif, webp)",
            UploadKind::Report => "Only PDF and Word documents (.pdf, .doc, .docx) are allowed",
            UploadKind::VerificationDocument => "Invalid file type. Only PDF, JPG, PNG, DOC, DOCX are allowed.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    /// Public path of the file, e.g. `/uploads/banners/file-1700000000000-42.png`
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, kind: UploadKind, filename: &str) -> PathBuf {
        self.root.join(kind.directory()).join(filename)
    }

    /// Validate and write an uploaded file. `owner` prefixes the names of
    /// profile photos, reports and verification documents.
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
        owner: Option<&str>,
    ) -> ServiceResult<StoredFile> {
        if bytes.is_empty() {
            return Err(ServiceError::validation("No file uploaded"));
        }
        if bytes.len() > kind.max_bytes() {
            return Err(ServiceError::PayloadTooLarge(format!(
                "File exceeds the {} MB limit",
                kind.max_bytes() / MB
            )));
        }

        let extension = extension_of(original_name)
            .filter(|ext| kind.allowed_extensions().contains(&ext.as_str()))
            .ok_or_else(|| ServiceError::validation(kind.rejection_message()))?;

        let millis = Utc::now().timestamp_millis();
        let filename = match (kind, owner) {
            (UploadKind::ProfilePhoto, Some(owner)) => format!("{}-profile-{}.{}", owner, millis, extension),
            (UploadKind::Report | UploadKind::VerificationDocument, Some(owner)) => {
                let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
                format!("{}-{}-{}-{}.{}", owner, file_stem(original_name), millis, suffix, extension)
            }
            _ => {
                let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
                format!("file-{}-{}.{}", millis, suffix, extension)
            }
        };

        let directory = self.root.join(kind.directory());
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| ServiceError::Internal(format!("Failed to create upload directory: {}", e)))?;
        tokio::fs::write(directory.join(&filename), bytes)
            .await
            .map_err(|e| ServiceError::Internal(format!("Failed to store upload: {}", e)))?;

        info!("Stored {} upload {} ({} bytes)", kind.directory(), filename, bytes.len());

        Ok(StoredFile {
            url: format!("/uploads/{}/{}", kind.directory(), filename),
            filename,
        })
    }

    /// Best effort removal of a stored file
    pub async fn remove(&self, kind: UploadKind, filename: &str) {
        // Only plain file names, never paths
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
            warn!("Refusing to remove suspicious upload name {:?}", filename);
            return;
        }
        match tokio::fs::remove_file(self.path_of(kind, filename)).await {
            Ok(()) => debug!("Removed upload {}/{}", kind.directory(), filename),
            Err(e) => debug!("Could not remove upload {}/{}: {}", kind.directory(), filename, e),
        }
    }

    /// File name of an upload url of the given kind, e.g. for `/uploads/banners/x.png`
    pub fn filename_from_url<'a>(kind: UploadKind, url: &'a str) -> Option<&'a str> {
        let prefix = format!("/uploads/{}/", kind.directory());
        url.strip_prefix(prefix.as_str()).filter(|name| !name.is_empty())
    }
}

/// The name without its extension, reduced to characters safe in a file name
fn file_stem(name: &str) -> String {
    let stem: String = Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    if stem.is_empty() {
        "file".to_string()
    } else {
        stem
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
