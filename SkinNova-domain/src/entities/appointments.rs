use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skin_nova_data::models::common::UnknownVariant;
use skin_nova_data::models::{Appointment, AppointmentStatus, Location};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Default)]
pub struct CreateAppointmentInput {
    pub doctor_id: String,
    pub requested_date: DateTime<Utc>,
    pub reason: String,
    /// Book for someone else. Admins only.
    pub patient_id: Option<String>,
    pub availability_slot_id: Option<String>,
    pub location: Option<Location>,
}

/// Preset selections of the appointment list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentView {
    #[default]
    All,
    Pending,
    Upcoming,
    Past,
}

impl AppointmentView {
    pub fn includes(&self, appointment: &Appointment, now: DateTime<Utc>) -> bool {
        match self {
            AppointmentView::All => true,
            AppointmentView::Pending => appointment.status == AppointmentStatus::Pending,
            AppointmentView::Upcoming => {
                appointment.status == AppointmentStatus::Approved && appointment.effective_date() >= now
            }
            AppointmentView::Past => match appointment.status {
                AppointmentStatus::Completed | AppointmentStatus::Rejected => true,
                AppointmentStatus::Approved => appointment.effective_date() < now,
                AppointmentStatus::Pending => false,
            },
        }
    }
}

impl FromStr for AppointmentView {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(AppointmentView::All),
            "pending" => Ok(AppointmentView::Pending),
            "upcoming" => Ok(AppointmentView::Upcoming),
            "past" => Ok(AppointmentView::Past),
            _ => Err(UnknownVariant::new("appointment view", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentFilter {
    pub view: AppointmentView,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AppointmentCounts {
    pub all: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub completed: usize,
}

impl AppointmentCounts {
    pub fn tally<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        appointments.into_iter().fold(Self::default(), |mut counts, appointment| {
            counts.all += 1;
            match appointment.status {
                AppointmentStatus::Pending => counts.pending += 1,
                AppointmentStatus::Approved => counts.approved += 1,
                AppointmentStatus::Rejected => counts.rejected += 1,
                AppointmentStatus::Completed => counts.completed += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AppointmentListing {
    pub appointments: Vec<Appointment>,
    /// Over every appointment of the user, not only the selected ones
    pub counts: AppointmentCounts,
}

#[derive(Debug, Clone, Default)]
pub struct ApproveAppointmentInput {
    pub approved_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RejectAppointmentInput {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompleteAppointmentInput {
    pub notes: Option<String>,
}
