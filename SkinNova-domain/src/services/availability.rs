use chrono::{NaiveTime, Utc};
use tracing::{debug, info};

use skin_nova_data::models::{AvailabilitySlot, Role};
use skin_nova_data::repository::{AvailabilityRepository, SharedDocumentStore, UserRepository};

use crate::auth::AuthUser;
use crate::entities::{SlotInput, SlotPatch, UpsertOutcome};
use crate::services::errors::{ServiceError, ServiceResult};

/// Weekly availability of doctors
#[derive(Debug, Clone)]
pub struct AvailabilityService {
    slots: AvailabilityRepository,
    users: UserRepository,
}

fn parse_day(day: i64) -> ServiceResult<u8> {
    u8::try_from(day)
        .ok()
        .filter(|day| *day <= 6)
        .ok_or_else(|| ServiceError::validation("Invalid day of week"))
}

fn parse_time(value: &str) -> ServiceResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ServiceError::validation(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Both times must be HH:MM and the window must not be empty
fn check_window(start: &str, end: &str) -> ServiceResult<()> {
    if parse_time(start)? >= parse_time(end)? {
        return Err(ServiceError::validation("Start time must be before end time"));
    }
    Ok(())
}

fn require_doctor(requester: &AuthUser, message: &str) -> ServiceResult<()> {
    if requester.role != Role::Doctor {
        return Err(ServiceError::forbidden(message));
    }
    Ok(())
}

impl AvailabilityService {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            slots: AvailabilityRepository::new(store.clone()),
            users: UserRepository::new(store),
        }
    }

    pub async fn my_availability(&self, requester: &AuthUser) -> ServiceResult<Vec<AvailabilitySlot>> {
        require_doctor(requester, "Only doctors can access this")?;
        Ok(self.slots.list_active_for_doctor(&requester.id).await?)
    }

    pub async fn doctor_availability(&self, doctor_id: &str) -> ServiceResult<Vec<AvailabilitySlot>> {
        match self.users.find_by_id(doctor_id).await? {
            Some(user) if user.is_doctor() => Ok(self.slots.list_active_for_doctor(doctor_id).await?),
            _ => Err(ServiceError::not_found("Doctor not found")),
        }
    }

    /// Create a slot, or replace the doctor's slot for the same day
    pub async fn upsert(&self, requester: &AuthUser, input: SlotInput) -> ServiceResult<UpsertOutcome> {
        require_doctor(requester, "Only doctors can set availability")?;

        let (Some(day), Some(start), Some(end)) = (input.day_of_week, input.start_time, input.end_time) else {
            return Err(ServiceError::validation("Day, start time, and end time required"));
        };
        let day = parse_day(day)?;
        check_window(&start, &end)?;

        if let Some(mut slot) = self.slots.find_for_day(&requester.id, day).await? {
            slot.start_time = start;
            slot.end_time = end;
            if input.location.is_some() {
                slot.location = input.location;
            }
            slot.is_active = true;
            slot.updated_at = Utc::now();
            self.slots.save(&slot).await?;
            debug!("Updated availability slot {} for doctor {}", slot.id, requester.id);
            return Ok(UpsertOutcome::Updated(slot));
        }

        let slot = AvailabilitySlot::new(&requester.id, day, start, end, input.location);
        self.slots.save(&slot).await?;
        info!("Created availability slot {} for doctor {} on day {}", slot.id, requester.id, day);
        Ok(UpsertOutcome::Created(slot))
    }

    pub async fn update_slot(&self, requester: &AuthUser, slot_id: &str, patch: SlotPatch) -> ServiceResult<AvailabilitySlot> {
        let mut slot = self.owned_slot(requester, slot_id, "Can only edit own availability").await?;

        if let Some(day) = patch.day_of_week {
            let day = parse_day(day)?;
            if day != slot.day_of_week {
                // One slot per doctor and day
                if let Some(existing) = self.slots.find_for_day(&requester.id, day).await? {
                    if existing.id != slot.id {
                        return Err(ServiceError::conflict("Availability already exists for that day"));
                    }
                }
                slot.day_of_week = day;
            }
        }
        if let Some(start) = patch.start_time {
            slot.start_time = start;
        }
        if let Some(end) = patch.end_time {
            slot.end_time = end;
        }
        check_window(&slot.start_time, &slot.end_time)?;
        if patch.location.is_some() {
            slot.location = patch.location;
        }
        if let Some(is_active) = patch.is_active {
            slot.is_active = is_active;
        }

        slot.updated_at = Utc::now();
        self.slots.save(&slot).await?;
        Ok(slot)
    }

    /// Deactivate a slot. It stays stored so past appointments can refer to it.
    pub async fn delete_slot(&self, requester: &AuthUser, slot_id: &str) -> ServiceResult<()> {
        let mut slot = self.owned_slot(requester, slot_id, "Can only delete own availability").await?;
        slot.is_active = false;
        slot.updated_at = Utc::now();
        self.slots.save(&slot).await?;
        info!("Deactivated availability slot {}", slot.id);
        Ok(())
    }

    async fn owned_slot(&self, requester: &AuthUser, slot_id: &str, forbidden: &str) -> ServiceResult<AvailabilitySlot> {
        let slot = self
            .slots
            .find_by_id(slot_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Availability slot not found"))?;
        if slot.doctor_id != requester.id {
            return Err(ServiceError::forbidden(forbidden));
        }
        Ok(slot)
    }
}
