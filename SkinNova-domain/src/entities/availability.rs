use skin_nova_data::models::{AvailabilitySlot, Location};

/// Weekly slot as submitted by a doctor. Missing fields are rejected by the service.
#[derive(Debug, Clone, Default)]
pub struct SlotInput {
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default)]
pub struct SlotPatch {
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<Location>,
    pub is_active: Option<bool>,
}

/// Whether saving a slot created a new one or replaced the doctor's slot for that day
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    Created(AvailabilitySlot),
    Updated(AvailabilitySlot),
}

impl UpsertOutcome {
    pub fn slot(&self) -> &AvailabilitySlot {
        match self {
            UpsertOutcome::Created(slot) | UpsertOutcome::Updated(slot) => slot,
        }
    }

    pub fn into_slot(self) -> AvailabilitySlot {
        match self {
            UpsertOutcome::Created(slot) | UpsertOutcome::Updated(slot) => slot,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}
