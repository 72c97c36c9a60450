use crate::models::availability::AvailabilitySlot;
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for AvailabilitySlot {
    const COLLECTION: &'static str = "availability";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for doctor availability slots
#[derive(Debug, Clone)]
pub struct AvailabilityRepository {
    slots: Collection<AvailabilitySlot>,
}

impl AvailabilityRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            slots: Collection::new(store),
        }
    }

    pub async fn save(&self, slot: &AvailabilitySlot) -> Result<(), RepositoryError> {
        self.slots.save(slot).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AvailabilitySlot>, RepositoryError> {
        self.slots.find_by_id(id).await
    }

    /// The slot of a doctor for a day of the week, active or not
    pub async fn find_for_day(&self, doctor_id: &str, day_of_week: u8) -> Result<Option<AvailabilitySlot>, RepositoryError> {
        self.slots
            .find_one(|slot| slot.doctor_id == doctor_id && slot.day_of_week == day_of_week)
            .await
    }

    /// Active slots of a doctor ordered by day and start time
    pub async fn list_active_for_doctor(&self, doctor_id: &str) -> Result<Vec<AvailabilitySlot>, RepositoryError> {
        let mut slots = self
            .slots
            .find(|slot| slot.doctor_id == doctor_id && slot.is_active)
            .await?;
        slots.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });
        Ok(slots)
    }
}
