// Testing utilities for the domain layer
// Available to unit tests and, with the "mock" feature, to dependent crates

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use skin_nova_data::models::{Appointment, AppointmentStatus, Role, User};
use skin_nova_data::repository::{AppointmentRepository, InMemoryDocumentStore, SharedDocumentStore, UserRepository};

use crate::auth::password::PasswordHasher;
use crate::config::AppConfig;
use crate::mail::RecordingMailer;
use crate::services::Services;
use crate::uploads::UploadStore;

/// Password of every account created by [`TestContext::create_user`]
pub const TEST_PASSWORD: &str = "Password123!";

/// In-memory services with a recording mailer and a private upload directory
pub struct TestContext {
    pub store: SharedDocumentStore,
    pub mailer: RecordingMailer,
    pub config: AppConfig,
    pub services: Services,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AppConfig::for_testing();
        config.upload_dir = std::env::temp_dir().join(format!("skinnova-test-{}", Uuid::new_v4()));

        let store: SharedDocumentStore = Arc::new(InMemoryDocumentStore::new());
        let mailer = RecordingMailer::new();
        let services = Services::new(store.clone(), &config, Arc::new(mailer.clone()));

        Self {
            store,
            mailer,
            config,
            services,
        }
    }

    /// Store an unverified account whose password is [`TEST_PASSWORD`]
    pub async fn create_user(&self, email: &str, role: Role) -> User {
        let hash = PasswordHasher::new(self.config.bcrypt_cost)
            .hash_password(TEST_PASSWORD)
            .await
            .expect("hash test password");

        let local = email.split('@').next().unwrap_or(email);
        let user = User::new(Some(format!("Test {}", local)), email, hash, role);

        UserRepository::new(self.store.clone())
            .create(&user)
            .await
            .expect("store test user");
        user
    }

    /// Store an appointment directly, bypassing the request workflow
    pub async fn create_appointment(
        &self,
        patient: &User,
        doctor: &User,
        date: DateTime<Utc>,
        status: AppointmentStatus,
    ) -> Appointment {
        let now = Utc::now();
        let appointment = Appointment {
            id: Appointment::new_id(),
            patient_id: patient.id.clone(),
            patient_name: patient.display_name().to_string(),
            patient_email: patient.email.clone(),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.display_name().to_string(),
            doctor_email: doctor.email.clone(),
            requested_date: date,
            approved_date: (status == AppointmentStatus::Approved).then_some(date),
            reason: "Skin check".to_string(),
            status,
            notes: None,
            availability_slot_id: None,
            location: None,
            created_at: now,
            updated_at: now,
        };

        AppointmentRepository::new(self.store.clone())
            .save(&appointment)
            .await
            .expect("store test appointment");
        appointment
    }

    pub fn upload_store(&self) -> UploadStore {
        UploadStore::new(self.config.upload_dir.clone())
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.config.upload_dir);
    }
}
