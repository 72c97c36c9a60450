use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Location, UnknownVariant};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Lifecycle of an appointment request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Approved,
        AppointmentStatus::Rejected,
        AppointmentStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "approved" => Ok(AppointmentStatus::Approved),
            "rejected" => Ok(AppointmentStatus::Rejected),
            "completed" => Ok(AppointmentStatus::Completed),
            _ => Err(UnknownVariant::new("appointment status", s)),
        }
    }
}

/// Storage model for an appointment between a patient and a doctor.
///
/// Names and emails are denormalized at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub doctor_email: String,
    pub requested_date: DateTime<Utc>,
    pub approved_date: Option<DateTime<Utc>>,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub availability_slot_id: Option<String>,
    pub location: Option<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// The date the appointment actually takes place on
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.approved_date.unwrap_or(self.requested_date)
    }

    /// Approved appointments whose date has passed and pending requests
    /// whose requested date has passed are expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            AppointmentStatus::Approved => self.approved_date.map_or(false, |date| date < now),
            AppointmentStatus::Pending => self.requested_date < now,
            _ => false,
        }
    }

    /// Whether the participants may exchange chat messages
    pub fn permits_chat(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Approved | AppointmentStatus::Pending | AppointmentStatus::Completed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn appointment(status: AppointmentStatus, requested: DateTime<Utc>, approved: Option<DateTime<Utc>>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Appointment::new_id(),
            patient_id: "p".into(),
            patient_name: "Pat".into(),
            patient_email: "pat@example.com".into(),
            doctor_id: "d".into(),
            doctor_name: "Doc".into(),
            doctor_email: "doc@example.com".into(),
            requested_date: requested,
            approved_date: approved,
            reason: "rash".into(),
            status,
            notes: None,
            availability_slot_id: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn effective_date_prefers_approved_date() {
        let now = Utc::now();
        let later = now + Duration::days(3);
        assert_eq!(appointment(AppointmentStatus::Approved, now, Some(later)).effective_date(), later);
        assert_eq!(appointment(AppointmentStatus::Pending, now, None).effective_date(), now);
    }

    #[test]
    fn expiry_depends_on_status() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);

        assert!(appointment(AppointmentStatus::Pending, yesterday, None).is_expired(now));
        assert!(!appointment(AppointmentStatus::Pending, tomorrow, None).is_expired(now));
        assert!(appointment(AppointmentStatus::Approved, tomorrow, Some(yesterday)).is_expired(now));
        // approved without an approved date never expires
        assert!(!appointment(AppointmentStatus::Approved, yesterday, None).is_expired(now));
        assert!(!appointment(AppointmentStatus::Completed, yesterday, None).is_expired(now));
    }

    #[test]
    fn rejected_appointments_do_not_permit_chat() {
        let now = Utc::now();
        assert!(!appointment(AppointmentStatus::Rejected, now, None).permits_chat());
        assert!(appointment(AppointmentStatus::Completed, now, None).permits_chat());
    }
}
