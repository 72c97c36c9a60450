use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub const DEFAULT_REPORT_TYPE: &str = "General Report";

/// A medical report kept by a patient, e.g. a skin analysis or lab result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub report_name: String,
    pub report_type: String,
    #[serde(default)]
    pub description: String,
    /// Public path of the attached file, empty when there is none
    #[serde(default)]
    pub file_url: String,
    /// Original name of the attached file
    #[serde(default)]
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(patient_id: &str, patient_name: &str, patient_email: &str, report_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            patient_name: patient_name.to_string(),
            patient_email: patient_email.to_string(),
            report_name,
            report_type: DEFAULT_REPORT_TYPE.to_string(),
            description: String::new(),
            file_url: String::new(),
            file_name: String::new(),
            uploaded_at: now,
            updated_at: now,
        }
    }
}

/// Permission for a doctor to read a patient's reports, scoped to one appointment.
/// There is at most one record per (patient, doctor, appointment).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportAccess {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub appointment_id: String,
    pub access_granted: bool,
    pub granted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportAccess {
    /// A new grant, already in effect
    pub fn granted(
        patient_id: &str,
        patient_name: &str,
        doctor_id: &str,
        doctor_name: &str,
        appointment_id: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            patient_name: patient_name.to_string(),
            doctor_id: doctor_id.to_string(),
            doctor_name: doctor_name.to_string(),
            appointment_id: appointment_id.to_string(),
            access_granted: true,
            granted_at: Some(now),
            revoked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn grant(&mut self) {
        let now = Utc::now();
        self.access_granted = true;
        self.granted_at = Some(now);
        self.revoked_at = None;
        self.updated_at = now;
    }

    pub fn revoke(&mut self) {
        let now = Utc::now();
        self.access_granted = false;
        self.revoked_at = Some(now);
        self.updated_at = now;
    }
}
