use crate::models::appointment::Appointment;
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for appointments
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    appointments: Collection<Appointment>,
}

impl AppointmentRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            appointments: Collection::new(store),
        }
    }

    pub async fn save(&self, appointment: &Appointment) -> Result<(), RepositoryError> {
        self.appointments.save(appointment).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>, RepositoryError> {
        self.appointments.find_by_id(id).await
    }

    /// Appointments where the user is the doctor, latest requested date first
    pub async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>, RepositoryError> {
        let mut appointments = self.appointments.find(|a| a.doctor_id == doctor_id).await?;
        sort_by_requested_date_desc(&mut appointments);
        Ok(appointments)
    }

    /// Appointments where the user is the patient, latest requested date first
    pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, RepositoryError> {
        let mut appointments = self.appointments.find(|a| a.patient_id == patient_id).await?;
        sort_by_requested_date_desc(&mut appointments);
        Ok(appointments)
    }

    /// Appointments between one patient and one doctor
    pub async fn list_between(&self, patient_id: &str, doctor_id: &str) -> Result<Vec<Appointment>, RepositoryError> {
        self.appointments
            .find(|a| a.patient_id == patient_id && a.doctor_id == doctor_id)
            .await
    }

    /// Every appointment, most recently created first
    pub async fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError> {
        let mut appointments = self.appointments.find_all().await?;
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }
}

fn sort_by_requested_date_desc(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| b.requested_date.cmp(&a.requested_date));
}
