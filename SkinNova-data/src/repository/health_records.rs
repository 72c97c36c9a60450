use chrono::{DateTime, Utc};

use crate::models::health_record::{DeviceType, HealthRecord};
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for HealthRecord {
    const COLLECTION: &'static str = "health_records";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Criteria for selecting health records of one user
#[derive(Debug, Clone, Default)]
pub struct HealthRecordFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub device_type: Option<DeviceType>,
}

impl HealthRecordFilter {
    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            ..Self::default()
        }
    }

    fn matches(&self, record: &HealthRecord) -> bool {
        self.from.map_or(true, |from| record.recorded_at >= from)
            && self.to.map_or(true, |to| record.recorded_at <= to)
            && self.device_type.map_or(true, |device| record.device_type == device)
    }
}

/// Repository for wearable health records
#[derive(Debug, Clone)]
pub struct HealthRecordRepository {
    records: Collection<HealthRecord>,
}

impl HealthRecordRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            records: Collection::new(store),
        }
    }

    pub async fn insert(&self, record: &HealthRecord) -> Result<(), RepositoryError> {
        self.records.save(record).await
    }

    /// Matching records of the user, most recent measurement first
    pub async fn list_for_user(&self, user_id: &str, filter: &HealthRecordFilter) -> Result<Vec<HealthRecord>, RepositoryError> {
        let mut records = self
            .records
            .find(|record| record.user_id == user_id && filter.matches(record))
            .await?;
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }

    pub async fn latest_for_user(&self, user_id: &str) -> Result<Option<HealthRecord>, RepositoryError> {
        let records = self.list_for_user(user_id, &HealthRecordFilter::default()).await?;
        Ok(records.into_iter().next())
    }
}
