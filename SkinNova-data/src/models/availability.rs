use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Location;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Weekly recurring window during which a doctor accepts appointments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub doctor_id: String,
    /// 0 = Sunday ... 6 = Saturday
    pub day_of_week: u8,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub is_active: bool,
    pub location: Option<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    pub fn new(doctor_id: &str, day_of_week: u8, start_time: String, end_time: String, location: Option<Location>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            doctor_id: doctor_id.to_string(),
            day_of_week,
            start_time,
            end_time,
            is_active: true,
            location,
            created_at: now,
            updated_at: now,
        }
    }
}
