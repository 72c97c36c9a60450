use serde::Serialize;

use skin_nova_data::models::{Report, ReportAccess};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Report fields as submitted. The name is required on create, everything is optional on update.
#[derive(Debug, Clone, Default)]
pub struct ReportInput {
    pub report_name: Option<String>,
    pub report_type: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

/// Whose reports a doctor is looking at
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportPatient {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PatientReports {
    pub patient: ReportPatient,
    pub reports: Vec<Report>,
}

/// A patient's access record for one appointment
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportAccessStatus {
    pub access: Option<ReportAccess>,
    pub has_access: bool,
}

/// Verification documents of a doctor, as listed for the doctor or an admin
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DoctorDocuments {
    pub doctor_id: String,
    pub name: Option<String>,
    pub email: String,
    pub verified: bool,
    pub documents: Vec<String>,
    pub document_count: usize,
}
