//! Patient reports and the grants that let doctors read them
//!
//! A patient owns their reports. Access is granted per appointment: the
//! patient names the doctor and the appointment they share, and any grant
//! in effect lets that doctor read all of the patient's reports.

use chrono::Utc;
use tracing::{info, instrument};

use skin_nova_data::models::{Report, ReportAccess, User};
use skin_nova_data::repository::{
    AppointmentRepository, ReportAccessRepository, ReportRepository, SharedDocumentStore, UserRepository,
};

use crate::auth::AuthUser;
use crate::entities::{PatientReports, ReportAccessStatus, ReportInput, ReportPatient};
use crate::services::errors::{ServiceError, ServiceResult};
use crate::uploads::{StoredFile, UploadKind, UploadStore};

#[derive(Debug, Clone)]
pub struct ReportService {
    reports: ReportRepository,
    grants: ReportAccessRepository,
    appointments: AppointmentRepository,
    users: UserRepository,
    uploads: UploadStore,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required_ids(doctor_id: &str, appointment_id: &str) -> ServiceResult<()> {
    if doctor_id.trim().is_empty() || appointment_id.trim().is_empty() {
        return Err(ServiceError::validation("Doctor ID and Appointment ID are required"));
    }
    Ok(())
}

impl ReportService {
    pub fn new(store: SharedDocumentStore, uploads: UploadStore) -> Self {
        Self {
            reports: ReportRepository::new(store.clone()),
            grants: ReportAccessRepository::new(store.clone()),
            appointments: AppointmentRepository::new(store.clone()),
            users: UserRepository::new(store),
            uploads,
        }
    }

    /// The caller's reports, latest first
    pub async fn list_mine(&self, requester: &AuthUser) -> ServiceResult<Vec<Report>> {
        Ok(self.reports.list_for_patient(&requester.id).await?)
    }

    #[instrument(skip(self, requester, input), fields(patient = %requester.id))]
    pub async fn create(&self, requester: &AuthUser, input: ReportInput) -> ServiceResult<Report> {
        let name = trimmed(input.report_name).ok_or_else(|| ServiceError::validation("Report name is required"))?;
        let patient = self.require_user(&requester.id).await?;

        let mut report = Report::new(&patient.id, patient.display_name(), &patient.email, name);
        if let Some(report_type) = trimmed(input.report_type) {
            report.report_type = report_type;
        }
        report.description = input.description.unwrap_or_default();
        report.file_url = input.file_url.unwrap_or_default();
        report.file_name = input.file_name.unwrap_or_default();

        self.reports.save(&report).await?;
        info!("Stored report {} for patient {}", report.id, patient.id);
        Ok(report)
    }

    pub async fn get(&self, requester: &AuthUser, id: &str) -> ServiceResult<Report> {
        self.owned(requester, id).await
    }

    /// Apply the present fields. A blank name or type leaves the stored value.
    pub async fn update(&self, requester: &AuthUser, id: &str, input: ReportInput) -> ServiceResult<Report> {
        let mut report = self.owned(requester, id).await?;

        if let Some(name) = trimmed(input.report_name) {
            report.report_name = name;
        }
        if let Some(report_type) = trimmed(input.report_type) {
            report.report_type = report_type;
        }
        if let Some(description) = input.description {
            report.description = description;
        }
        if let Some(file_name) = trimmed(input.file_name) {
            report.file_name = file_name;
        }
        if let Some(file_url) = trimmed(input.file_url) {
            report.file_url = file_url;
        }

        report.updated_at = Utc::now();
        self.reports.save(&report).await?;
        Ok(report)
    }

    /// Delete the report and its uploaded file
    pub async fn delete(&self, requester: &AuthUser, id: &str) -> ServiceResult<()> {
        let report = self.owned(requester, id).await?;
        self.reports.delete(&report.id).await?;

        // Only files this patient uploaded
        let owner_prefix = format!("{}-", report.patient_id);
        if let Some(filename) = UploadStore::filename_from_url(UploadKind::Report, &report.file_url)
            .filter(|name| name.starts_with(&owner_prefix))
        {
            self.uploads.remove(UploadKind::Report, filename).await;
        }
        info!("Deleted report {}", report.id);
        Ok(())
    }

    /// Store a report file. The returned url is then attached with `create` or `update`.
    pub async fn upload_file(&self, requester: &AuthUser, original_name: &str, bytes: &[u8]) -> ServiceResult<StoredFile> {
        self.uploads
            .save(UploadKind::Report, original_name, bytes, Some(&requester.id))
            .await
    }

    /// Let the doctor of one of the caller's appointments read their reports
    #[instrument(skip(self, requester), fields(patient = %requester.id))]
    pub async fn grant_access(&self, requester: &AuthUser, doctor_id: &str, appointment_id: &str) -> ServiceResult<ReportAccess> {
        required_ids(doctor_id, appointment_id)?;

        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .filter(|a| a.patient_id == requester.id && a.doctor_id == doctor_id)
            .ok_or_else(|| ServiceError::not_found("Appointment not found"))?;

        let access = match self.grants.find(&requester.id, doctor_id, appointment_id).await? {
            Some(mut access) => {
                access.grant();
                access
            }
            None => ReportAccess::granted(
                &requester.id,
                &appointment.patient_name,
                doctor_id,
                &appointment.doctor_name,
                appointment_id,
            ),
        };
        self.grants.save(&access).await?;

        info!("Patient {} granted report access to doctor {}", requester.id, doctor_id);
        Ok(access)
    }

    pub async fn revoke_access(&self, requester: &AuthUser, doctor_id: &str, appointment_id: &str) -> ServiceResult<ReportAccess> {
        required_ids(doctor_id, appointment_id)?;

        let mut access = self
            .grants
            .find(&requester.id, doctor_id, appointment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Access record not found"))?;
        access.revoke();
        self.grants.save(&access).await?;

        info!("Patient {} revoked report access of doctor {}", requester.id, doctor_id);
        Ok(access)
    }

    /// Whether the calling doctor may read the patient's reports for this appointment
    pub async fn check_access(&self, requester: &AuthUser, patient_id: &str, appointment_id: &str) -> ServiceResult<bool> {
        Ok(self
            .grants
            .find(patient_id, &requester.id, appointment_id)
            .await?
            .map_or(false, |access| access.access_granted))
    }

    /// The caller's access record for one of their appointments
    pub async fn access_status(&self, requester: &AuthUser, appointment_id: &str) -> ServiceResult<ReportAccessStatus> {
        let access = self.grants.find_for_appointment(&requester.id, appointment_id).await?;
        Ok(ReportAccessStatus {
            has_access: access.as_ref().map_or(false, |a| a.access_granted),
            access,
        })
    }

    /// A patient's reports as seen by a doctor. Any grant in effect will do,
    /// unless an appointment is named, in which case that grant must be.
    pub async fn patient_reports(
        &self,
        requester: &AuthUser,
        patient_id: &str,
        appointment_id: Option<&str>,
    ) -> ServiceResult<PatientReports> {
        let access = match appointment_id {
            Some(appointment_id) => self
                .grants
                .find(patient_id, &requester.id, appointment_id)
                .await?
                .filter(|access| access.access_granted),
            None => self.grants.find_granted(patient_id, &requester.id).await?,
        };
        if access.is_none() {
            return Err(ServiceError::forbidden("Access denied to patient reports"));
        }

        let patient = match self.users.find_by_id(patient_id).await? {
            Some(user) => ReportPatient {
                id: user.id.clone(),
                name: user.display_name().to_string(),
                email: user.email,
            },
            None => ReportPatient {
                id: patient_id.to_string(),
                name: "Unknown Patient".to_string(),
                email: String::new(),
            },
        };

        Ok(PatientReports {
            patient,
            reports: self.reports.list_for_patient(patient_id).await?,
        })
    }

    async fn owned(&self, requester: &AuthUser, id: &str) -> ServiceResult<Report> {
        self.reports
            .find_for_patient(id, &requester.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Report not found"))
    }

    async fn require_user(&self, id: &str) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skin_nova_data::models::{AppointmentStatus, Role};

    use crate::testing::TestContext;

    fn named(name: &str) -> ReportInput {
        ReportInput {
            report_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reports_belong_to_their_patient() {
        let ctx = TestContext::new();
        let patient = AuthUser::from(&ctx.create_user("pat@example.com", Role::Patient).await);
        let other = AuthUser::from(&ctx.create_user("other@example.com", Role::Patient).await);
        let reports = &ctx.services.reports;

        assert!(matches!(
            reports.create(&patient, named("   ")).await,
            Err(ServiceError::Validation(_))
        ));

        let report = reports.create(&patient, named("Mole scan")).await.unwrap();
        assert_eq!(report.report_type, "General Report");
        assert_eq!(report.patient_email, "pat@example.com");

        assert!(matches!(reports.get(&other, &report.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(reports.delete(&other, &report.id).await, Err(ServiceError::NotFound(_))));

        let updated = reports
            .update(
                &patient,
                &report.id,
                ReportInput {
                    report_type: Some("Skin Analysis".into()),
                    description: Some("Benign".into()),
                    report_name: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.report_name, "Mole scan");
        assert_eq!(updated.report_type, "Skin Analysis");
        assert_eq!(updated.description, "Benign");

        assert_eq!(reports.list_mine(&patient).await.unwrap().len(), 1);
        assert!(reports.list_mine(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_own_uploaded_file() {
        let ctx = TestContext::new();
        let patient = AuthUser::from(&ctx.create_user("pat@example.com", Role::Patient).await);
        let reports = &ctx.services.reports;

        let stored = reports.upload_file(&patient, "biopsy.pdf", b"%PDF-1.4").await.unwrap();
        let path = ctx.upload_store().path_of(UploadKind::Report, &stored.filename);
        assert!(path.exists());

        let report = reports
            .create(
                &patient,
                ReportInput {
                    file_url: Some(stored.url.clone()),
                    file_name: Some("biopsy.pdf".into()),
                    ..named("Biopsy")
                },
            )
            .await
            .unwrap();

        reports.delete(&patient, &report.id).await.unwrap();
        assert!(!path.exists());
        assert!(matches!(reports.get(&patient, &report.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn doctors_read_reports_only_while_access_is_granted() {
        let ctx = TestContext::new();
        let patient_user = ctx.create_user("pat@example.com", Role::Patient).await;
        let doctor_user = ctx.create_user("doc@example.com", Role::Doctor).await;
        let stranger_user = ctx.create_user("stranger@example.com", Role::Doctor).await;
        let appointment = ctx
            .create_appointment(&patient_user, &doctor_user, Utc::now() + Duration::days(2), AppointmentStatus::Approved)
            .await;

        let patient = AuthUser::from(&patient_user);
        let doctor = AuthUser::from(&doctor_user);
        let reports = &ctx.services.reports;
        reports.create(&patient, named("Patch test")).await.unwrap();

        assert!(matches!(
            reports.patient_reports(&doctor, &patient.id, None).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            reports.grant_access(&patient, &stranger_user.id, &appointment.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            reports.grant_access(&patient, "", &appointment.id).await,
            Err(ServiceError::Validation(_))
        ));

        let access = reports.grant_access(&patient, &doctor.id, &appointment.id).await.unwrap();
        assert!(access.access_granted);
        assert_eq!(access.doctor_name, appointment.doctor_name);
        assert!(reports.check_access(&doctor, &patient.id, &appointment.id).await.unwrap());

        let seen = reports
            .patient_reports(&doctor, &patient.id, Some(&appointment.id))
            .await
            .unwrap();
        assert_eq!(seen.patient.email, "pat@example.com");
        assert_eq!(seen.reports.len(), 1);

        let regranted = reports.grant_access(&patient, &doctor.id, &appointment.id).await.unwrap();
        assert_eq!(regranted.id, access.id);

        reports.revoke_access(&patient, &doctor.id, &appointment.id).await.unwrap();
        assert!(!reports.check_access(&doctor, &patient.id, &appointment.id).await.unwrap());
        assert!(matches!(
            reports.patient_reports(&doctor, &patient.id, None).await,
            Err(ServiceError::Forbidden(_))
        ));

        let status = reports.access_status(&patient, &appointment.id).await.unwrap();
        assert!(!status.has_access);
        assert!(status.access.is_some());

        assert!(matches!(
            reports.revoke_access(&patient, &stranger_user.id, &appointment.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
