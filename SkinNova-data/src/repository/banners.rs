use crate::models::banner::Banner;
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for Banner {
    const COLLECTION: &'static str = "banners";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for carousel banners
#[derive(Debug, Clone)]
pub struct BannerRepository {
    banners: Collection<Banner>,
}

impl BannerRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            banners: Collection::new(store),
        }
    }

    pub async fn save(&self, banner: &Banner) -> Result<(), RepositoryError> {
        self.banners.save(banner).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Banner>, RepositoryError> {
        self.banners.find_by_id(id).await
    }

    /// Banners newest first, optionally only the active ones
    pub async fn list(&self, active_only: bool) -> Result<Vec<Banner>, RepositoryError> {
        let mut banners = self.banners.find(|b| !active_only || b.is_active).await?;
        banners.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(banners)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.banners.remove(id).await
    }
}
