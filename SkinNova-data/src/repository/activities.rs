use crate::models::activity::Activity;
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for Activity {
    const COLLECTION: &'static str = "activities";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for the activity feed
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    activities: Collection<Activity>,
}

impl ActivityRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            activities: Collection::new(store),
        }
    }

    pub async fn insert(&self, activity: &Activity) -> Result<(), RepositoryError> {
        self.activities.save(activity).await
    }

    /// Newest entries first, optionally restricted to one user
    pub async fn list(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<Activity>, RepositoryError> {
        let mut activities = self
            .activities
            .find(|activity| user_id.map_or(true, |id| activity.user_id == id))
            .await?;
        activities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        activities.truncate(limit);
        Ok(activities)
    }

    pub async fn all(&self) -> Result<Vec<Activity>, RepositoryError> {
        self.activities.find_all().await
    }

    pub async fn delete_many(&self, ids: &[String]) -> Result<usize, RepositoryError> {
        self.activities.remove_where(|activity| ids.contains(&activity.id)).await
    }
}
