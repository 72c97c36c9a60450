use crate::models::report::{Report, ReportAccess};
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for Report {
    const COLLECTION: &'static str = "reports";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for ReportAccess {
    const COLLECTION: &'static str = "report_access";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for patient reports
#[derive(Debug, Clone)]
pub struct ReportRepository {
    reports: Collection<Report>,
}

impl ReportRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            reports: Collection::new(store),
        }
    }

    pub async fn save(&self, report: &Report) -> Result<(), RepositoryError> {
        self.reports.save(report).await
    }

    /// A report, only if it belongs to the patient
    pub async fn find_for_patient(&self, id: &str, patient_id: &str) -> Result<Option<Report>, RepositoryError> {
        Ok(self
            .reports
            .find_by_id(id)
            .await?
            .filter(|report| report.patient_id == patient_id))
    }

    /// Reports of a patient, latest upload first
    pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Report>, RepositoryError> {
        let mut reports = self.reports.find(|r| r.patient_id == patient_id).await?;
        reports.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(reports)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.reports.remove(id).await
    }
}

/// Repository for report access grants
#[derive(Debug, Clone)]
pub struct ReportAccessRepository {
    grants: Collection<ReportAccess>,
}

impl ReportAccessRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            grants: Collection::new(store),
        }
    }

    pub async fn save(&self, access: &ReportAccess) -> Result<(), RepositoryError> {
        self.grants.save(access).await
    }

    /// The record for one (patient, doctor, appointment), granted or not
    pub async fn find(
        &self,
        patient_id: &str,
        doctor_id: &str,
        appointment_id: &str,
    ) -> Result<Option<ReportAccess>, RepositoryError> {
        self.grants
            .find_one(|a| a.patient_id == patient_id && a.doctor_id == doctor_id && a.appointment_id == appointment_id)
            .await
    }

    /// Any grant in effect between the patient and the doctor
    pub async fn find_granted(&self, patient_id: &str, doctor_id: &str) -> Result<Option<ReportAccess>, RepositoryError> {
        self.grants
            .find_one(|a| a.patient_id == patient_id && a.doctor_id == doctor_id && a.access_granted)
            .await
    }

    /// The patient's record for an appointment, whichever doctor it names
    pub async fn find_for_appointment(
        &self,
        patient_id: &str,
        appointment_id: &str,
    ) -> Result<Option<ReportAccess>, RepositoryError> {
        self.grants
            .find_one(|a| a.patient_id == patient_id && a.appointment_id == appointment_id)
            .await
    }
}
