use serde::Deserialize;
use utoipa::ToSchema;

use skin_nova_data::models::Location;
use skin_nova_domain::entities::{SlotInput, SlotPatch};

/// Weekly availability for one day
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: Option<i64>,
    /// HH:MM
    pub start_time: Option<String>,
    /// HH:MM, after `startTime`
    pub end_time: Option<String>,
    pub location: Option<Location>,
}

impl From<SlotRequest> for SlotInput {
    fn from(request: SlotRequest) -> Self {
        SlotInput {
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            location: request.location,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotUpdateRequest {
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<Location>,
    pub is_active: Option<bool>,
}

impl From<SlotUpdateRequest> for SlotPatch {
    fn from(request: SlotUpdateRequest) -> Self {
        SlotPatch {
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            location: request.location,
            is_active: request.is_active,
        }
    }
}
