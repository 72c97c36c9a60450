use std::str::FromStr;

use chrono::Utc;
use tracing::info;

use skin_nova_data::models::common::UnknownVariant;
use skin_nova_data::models::Banner;
use skin_nova_data::repository::{BannerRepository, SharedDocumentStore};

use crate::entities::BannerInput;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::uploads::{StoredFile, UploadKind, UploadStore};

/// Promotional banners shown on the landing page
#[derive(Debug, Clone)]
pub struct BannerService {
    banners: BannerRepository,
    uploads: UploadStore,
}

fn parse_style<T: FromStr<Err = UnknownVariant>>(value: &str) -> ServiceResult<T> {
    value.parse::<T>().map_err(|e| ServiceError::validation(e.to_string()))
}

fn required(value: Option<String>, field: &str) -> ServiceResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::validation(format!("{} is required", field)))
}

/// Copy the present fields of `input` onto the banner
fn apply(banner: &mut Banner, input: BannerInput) -> ServiceResult<()> {
    if let Some(title) = input.title {
        banner.title = required(Some(title), "Title")?;
    }
    if let Some(description) = input.description {
        banner.description = required(Some(description), "Description")?;
    }
    if let Some(image_url) = input.image_url {
        banner.image_url = required(Some(image_url), "Image URL")?;
    }
    if let Some(link) = input.link {
        banner.link = link.trim().to_string();
    }
    if let Some(is_active) = input.is_active {
        banner.is_active = is_active;
    }
    if let Some(color) = input.text_color {
        banner.text_color = color;
    }
    if let Some(color) = input.background_color {
        banner.background_color = color;
    }
    if let Some(font_size) = input.font_size.as_deref() {
        banner.font_size = parse_style(font_size)?;
    }
    if let Some(text_style) = input.text_style.as_deref() {
        banner.text_style = parse_style(text_style)?;
    }
    if let Some(alignment) = input.alignment.as_deref() {
        banner.alignment = parse_style(alignment)?;
    }
    if let Some(opacity) = input.overlay_opacity {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ServiceError::validation("Overlay opacity must be between 0 and 1"));
        }
        banner.overlay_opacity = opacity;
    }
    Ok(())
}

impl BannerService {
    pub fn new(store: SharedDocumentStore, uploads: UploadStore) -> Self {
        Self {
            banners: BannerRepository::new(store),
            uploads,
        }
    }

    /// Active banners, newest first
    pub async fn list_active(&self) -> ServiceResult<Vec<Banner>> {
        Ok(self.banners.list(true).await?)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Banner>> {
        Ok(self.banners.list(false).await?)
    }

    pub async fn create(&self, mut input: BannerInput) -> ServiceResult<Banner> {
        let title = required(input.title.take(), "Title")?;
        let description = required(input.description.take(), "Description")?;
        let image_url = required(input.image_url.take(), "Image URL")?;

        let mut banner = Banner::new(title, description, image_url);
        apply(&mut banner, input)?;
        self.banners.save(&banner).await?;

        info!("Created banner {}", banner.id);
        Ok(banner)
    }

    pub async fn update(&self, id: &str, input: BannerInput) -> ServiceResult<Banner> {
        let mut banner = self.require(id).await?;
        apply(&mut banner, input)?;
        banner.updated_at = Utc::now();
        self.banners.save(&banner).await?;
        Ok(banner)
    }

    /// Delete the banner and the file it was uploaded with
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let banner = self.require(id).await?;
        self.banners.delete(id).await?;

        if let Some(filename) = UploadStore::filename_from_url(UploadKind::Banner, &banner.image_url) {
            self.uploads.remove(UploadKind::Banner, filename).await;
        }
        info!("Deleted banner {}", id);
        Ok(())
    }

    pub async fn toggle(&self, id: &str) -> ServiceResult<Banner> {
        let mut banner = self.require(id).await?;
        banner.is_active = !banner.is_active;
        banner.updated_at = Utc::now();
        self.banners.save(&banner).await?;
        Ok(banner)
    }

    /// Store an uploaded banner image or video
    pub async fn upload(&self, original_name: &str, bytes: &[u8]) -> ServiceResult<StoredFile> {
        self.uploads.save(UploadKind::Banner, original_name, bytes, None).await
    }

    async fn require(&self, id: &str) -> ServiceResult<Banner> {
        self.banners
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Banner not found"))
    }
}
