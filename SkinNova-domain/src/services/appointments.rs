use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use skin_nova_data::models::{
    Activity, ActivityAction, ActivityMetadata, Appointment, AppointmentStatus, Role,
};
use skin_nova_data::repository::{AppointmentRepository, AvailabilityRepository, SharedDocumentStore, UserRepository};

use crate::auth::AuthUser;
use crate::entities::{
    AppointmentCounts, AppointmentFilter, AppointmentListing, ApproveAppointmentInput, CompleteAppointmentInput,
    CreateAppointmentInput, RejectAppointmentInput,
};
use crate::mail::{templates, EmailMessage, Mailer};
use crate::services::activities::ActivityService;
use crate::services::errors::{ServiceError, ServiceResult};

const NO_REASON: &str = "No reason provided";

fn display_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn metadata(appointment: &Appointment) -> ActivityMetadata {
    ActivityMetadata {
        appointment_id: Some(appointment.id.clone()),
        patient_id: Some(appointment.patient_id.clone()),
        patient_name: Some(appointment.patient_name.clone()),
        doctor_id: Some(appointment.doctor_id.clone()),
        doctor_name: Some(appointment.doctor_name.clone()),
        ..Default::default()
    }
}

fn patient_activity(appointment: &Appointment, action: ActivityAction, title: &str) -> Activity {
    Activity::new(
        &appointment.patient_id,
        &appointment.patient_name,
        &appointment.patient_email,
        action,
        title,
    )
    .with_metadata(metadata(appointment))
}

/// Scheduling between patients and doctors
#[derive(Debug, Clone)]
pub struct AppointmentService {
    appointments: AppointmentRepository,
    users: UserRepository,
    slots: AvailabilityRepository,
    mailer: Arc<dyn Mailer>,
    activities: ActivityService,
}

impl AppointmentService {
    pub fn new(store: SharedDocumentStore, mailer: Arc<dyn Mailer>, activities: ActivityService) -> Self {
        Self {
            appointments: AppointmentRepository::new(store.clone()),
            users: UserRepository::new(store.clone()),
            slots: AvailabilityRepository::new(store),
            mailer,
            activities,
        }
    }

    /// Request an appointment. Admins may book on behalf of a patient.
    #[instrument(skip(self, requester, input), fields(requester = %requester.id, doctor = %input.doctor_id))]
    pub async fn create(&self, requester: &AuthUser, input: CreateAppointmentInput) -> ServiceResult<Appointment> {
        if input.doctor_id.trim().is_empty() || input.reason.trim().is_empty() {
            return Err(ServiceError::validation("Doctor, date, and reason required"));
        }

        let patient_id = match input.patient_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) if id != requester.id => {
                if !requester.is_admin() {
                    return Err(ServiceError::forbidden("Only admins can schedule for another patient"));
                }
                id.to_string()
            }
            _ => requester.id.clone(),
        };

        let patient = self.users.find_by_id(&patient_id).await?;
        let doctor = self.users.find_by_id(&input.doctor_id).await?;
        let (Some(patient), Some(doctor)) = (patient, doctor) else {
            return Err(ServiceError::not_found("Patient or doctor not found"));
        };
        if !doctor.is_doctor() {
            return Err(ServiceError::validation("Can only schedule with doctors"));
        }
        if patient.id == doctor.id {
            return Err(ServiceError::validation("Cannot schedule an appointment with yourself"));
        }

        let mut location = input.location;
        if let Some(slot_id) = input.availability_slot_id.as_deref() {
            let slot = self
                .slots
                .find_by_id(slot_id)
                .await?
                .filter(|slot| slot.doctor_id == doctor.id)
                .ok_or_else(|| ServiceError::validation("Availability slot does not belong to this doctor"))?;
            if location.is_none() {
                location = slot.location;
            }
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Appointment::new_id(),
            patient_id: patient.id.clone(),
            patient_name: patient.display_name().to_string(),
            patient_email: patient.email.clone(),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.display_name().to_string(),
            doctor_email: doctor.email.clone(),
            requested_date: input.requested_date,
            approved_date: None,
            reason: input.reason.trim().to_string(),
            status: AppointmentStatus::Pending,
            notes: None,
            availability_slot_id: input.availability_slot_id,
            location,
            created_at: now,
            updated_at: now,
        };
        self.appointments.save(&appointment).await?;
        info!("Appointment {} requested by {} with {}", appointment.id, patient.id, doctor.id);

        self.notify(templates::appointment_request_email(
            &doctor.email,
            doctor.display_name(),
            &appointment.patient_name,
            appointment.requested_date,
            &appointment.reason,
        ))
        .await;

        let when = display_date(appointment.requested_date);
        self.activities
            .record(
                patient_activity(&appointment, ActivityAction::AppointmentScheduled, "Appointment Scheduled")
                    .with_description(format!("Appointment requested with Dr. {} on {}", appointment.doctor_name, when)),
            )
            .await;
        self.activities
            .record(
                Activity::new(
                    &appointment.doctor_id,
                    &appointment.doctor_name,
                    &appointment.doctor_email,
                    ActivityAction::AppointmentRequestReceived,
                    "Appointment Request Received",
                )
                .with_description(format!("New appointment request from {} for {}", appointment.patient_name, when))
                .with_metadata(metadata(&appointment)),
            )
            .await;

        Ok(appointment)
    }

    /// Appointments of the caller. Doctors see the ones assigned to them.
    pub async fn list_for_user(&self, requester: &AuthUser, filter: AppointmentFilter) -> ServiceResult<AppointmentListing> {
        let all = if requester.role == Role::Doctor {
            self.appointments.list_for_doctor(&requester.id).await?
        } else {
            self.appointments.list_for_patient(&requester.id).await?
        };

        let counts = AppointmentCounts::tally(&all);
        let now = Utc::now();
        let appointments = all
            .into_iter()
            .filter(|appointment| filter.view.includes(appointment, now))
            .filter(|appointment| filter.status.map_or(true, |status| appointment.status == status))
            .collect();

        Ok(AppointmentListing { appointments, counts })
    }

    pub async fn approve(&self, requester: &AuthUser, id: &str, input: ApproveAppointmentInput) -> ServiceResult<Appointment> {
        let mut appointment = self.assigned(requester, id, "approve").await?;
        Self::expect_status(&appointment, AppointmentStatus::Pending, "approve")?;

        let approved_date = input.approved_date.unwrap_or(appointment.requested_date);
        appointment.status = AppointmentStatus::Approved;
        appointment.approved_date = Some(approved_date);
        appointment.notes = input.notes.filter(|n| !n.trim().is_empty());
        appointment.updated_at = Utc::now();
        self.appointments.save(&appointment).await?;

        self.notify(templates::appointment_status_email(
            &appointment.patient_email,
            &appointment.patient_name,
            &appointment.doctor_name,
            AppointmentStatus::Approved,
            approved_date,
            appointment.notes.as_deref(),
        ))
        .await;

        self.activities
            .record(
                patient_activity(&appointment, ActivityAction::AppointmentApproved, "Appointment Approved").with_description(
                    format!(
                        "Dr. {} approved the appointment for {}",
                        appointment.doctor_name,
                        display_date(approved_date)
                    ),
                ),
            )
            .await;

        Ok(appointment)
    }

    pub async fn reject(&self, requester: &AuthUser, id: &str, input: RejectAppointmentInput) -> ServiceResult<Appointment> {
        let mut appointment = self.assigned(requester, id, "reject").await?;
        Self::expect_status(&appointment, AppointmentStatus::Pending, "reject")?;

        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| NO_REASON.to_string());
        appointment.status = AppointmentStatus::Rejected;
        appointment.notes = Some(reason);
        appointment.updated_at = Utc::now();
        self.appointments.save(&appointment).await?;

        self.notify(templates::appointment_status_email(
            &appointment.patient_email,
            &appointment.patient_name,
            &appointment.doctor_name,
            AppointmentStatus::Rejected,
            appointment.requested_date,
            appointment.notes.as_deref(),
        ))
        .await;

        self.activities
            .record(
                patient_activity(&appointment, ActivityAction::AppointmentRejected, "Appointment Rejected")
                    .with_description(format!("Dr. {} declined the appointment request", appointment.doctor_name)),
            )
            .await;

        Ok(appointment)
    }

    pub async fn complete(&self, requester: &AuthUser, id: &str, input: CompleteAppointmentInput) -> ServiceResult<Appointment> {
        let mut appointment = self.assigned(requester, id, "complete").await?;
        Self::expect_status(&appointment, AppointmentStatus::Approved, "complete")?;

        appointment.status = AppointmentStatus::Completed;
        if let Some(notes) = input.notes.filter(|n| !n.trim().is_empty()) {
            appointment.notes = Some(notes);
        }
        appointment.updated_at = Utc::now();
        self.appointments.save(&appointment).await?;

        self.activities
            .record(
                patient_activity(&appointment, ActivityAction::AppointmentCompleted, "Appointment Completed")
                    .with_description(format!("Appointment with Dr. {} completed", appointment.doctor_name)),
            )
            .await;

        Ok(appointment)
    }

    /// Every appointment, newest first
    pub async fn list_all(&self) -> ServiceResult<Vec<Appointment>> {
        Ok(self.appointments.list_all().await?)
    }

    async fn assigned(&self, requester: &AuthUser, id: &str, action: &str) -> ServiceResult<Appointment> {
        let appointment = self
            .appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Appointment not found"))?;
        if appointment.doctor_id != requester.id {
            return Err(ServiceError::forbidden(format!("Only assigned doctor can {}", action)));
        }
        Ok(appointment)
    }

    fn expect_status(appointment: &Appointment, expected: AppointmentStatus, action: &str) -> ServiceResult<()> {
        if appointment.status != expected {
            return Err(ServiceError::conflict(format!(
                "Cannot {} an appointment that is {}",
                action, appointment.status
            )));
        }
        Ok(())
    }

    /// Appointment emails are best effort
    async fn notify(&self, message: EmailMessage) {
        let to = message.to.clone();
        if let Err(e) = self.mailer.send(message).await {
            warn!("Failed to send appointment email to {}: {}", to, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skin_nova_data::models::User;

    use crate::entities::AppointmentView;
    use crate::testing::TestContext;

    async fn setup(ctx: &TestContext) -> (User, User) {
        let patient = ctx.create_user("pat@example.com", Role::Patient).await;
        let doctor = ctx.create_user("doc@example.com", Role::Doctor).await;
        (patient, doctor)
    }

    fn request(doctor: &User, days_ahead: i64) -> CreateAppointmentInput {
        CreateAppointmentInput {
            doctor_id: doctor.id.clone(),
            requested_date: Utc::now() + Duration::days(days_ahead),
            reason: "Itchy rash on forearm".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_notifies_doctor_and_logs_activities() {
        let ctx = TestContext::new();
        let (patient, doctor) = setup(&ctx).await;

        let appointment = ctx
            .services
            .appointments
            .create(&AuthUser::from(&patient), request(&doctor, 3))
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.doctor_email, "doc@example.com");

        let sent = ctx.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "doc@example.com");

        let feed = ctx.services.activities.list_all().await.unwrap();
        assert!(feed.iter().any(|a| a.action == ActivityAction::AppointmentScheduled && a.user_id == patient.id));
        assert!(feed
            .iter()
            .any(|a| a.action == ActivityAction::AppointmentRequestReceived && a.user_id == doctor.id));
    }

    #[tokio::test]
    async fn create_validates_participants() {
        let ctx = TestContext::new();
        let (patient, doctor) = setup(&ctx).await;
        let other = ctx.create_user("other@example.com", Role::Patient).await;
        let service = &ctx.services.appointments;
        let requester = AuthUser::from(&patient);

        let mut blank = request(&doctor, 1);
        blank.reason = "   ".into();
        assert!(matches!(service.create(&requester, blank).await, Err(ServiceError::Validation(_))));

        assert!(matches!(
            service.create(&requester, request(&other, 1)).await,
            Err(ServiceError::Validation(_))
        ));

        let mut missing = request(&doctor, 1);
        missing.doctor_id = "nope".into();
        assert!(matches!(service.create(&requester, missing).await, Err(ServiceError::NotFound(_))));

        let mut on_behalf = request(&doctor, 1);
        on_behalf.patient_id = Some(other.id.clone());
        assert!(matches!(
            service.create(&requester, on_behalf.clone()).await,
            Err(ServiceError::Forbidden(_))
        ));

        let admin = ctx.create_user("root@example.com", Role::Admin).await;
        let booked = service.create(&AuthUser::from(&admin), on_behalf).await.unwrap();
        assert_eq!(booked.patient_id, other.id);
    }

    #[tokio::test]
    async fn doctor_cannot_book_with_themselves() {
        let ctx = TestContext::new();
        let (_, doctor) = setup(&ctx).await;

        let result = ctx
            .services
            .appointments
            .create(&AuthUser::from(&doctor), request(&doctor, 1))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert!(ctx.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_request() {
        let ctx = TestContext::new();
        let (patient, doctor) = setup(&ctx).await;
        ctx.mailer.set_failing(true);

        assert!(ctx
            .services
            .appointments
            .create(&AuthUser::from(&patient), request(&doctor, 2))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn transitions_are_enforced() {
        let ctx = TestContext::new();
        let (patient, doctor) = setup(&ctx).await;
        let service = &ctx.services.appointments;
        let doc = AuthUser::from(&doctor);

        let appointment = service.create(&AuthUser::from(&patient), request(&doctor, 5)).await.unwrap();

        // Only approved appointments can be completed
        assert!(matches!(
            service.complete(&doc, &appointment.id, CompleteAppointmentInput::default()).await,
            Err(ServiceError::Conflict(_))
        ));
        // Only the assigned doctor may act
        assert!(matches!(
            service
                .approve(&AuthUser::from(&patient), &appointment.id, ApproveAppointmentInput::default())
                .await,
            Err(ServiceError::Forbidden(_))
        ));

        let approved = service
            .approve(&doc, &appointment.id, ApproveAppointmentInput::default())
            .await
            .unwrap();
        assert_eq!(approved.approved_date, Some(appointment.requested_date));

        assert!(matches!(
            service.reject(&doc, &appointment.id, RejectAppointmentInput::default()).await,
            Err(ServiceError::Conflict(_))
        ));

        let completed = service
            .complete(
                &doc,
                &appointment.id,
                CompleteAppointmentInput {
                    notes: Some("Prescribed cream".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);
        assert_eq!(completed.notes.as_deref(), Some("Prescribed cream"));
    }

    #[tokio::test]
    async fn reject_defaults_reason() {
        let ctx = TestContext::new();
        let (patient, doctor) = setup(&ctx).await;
        let service = &ctx.services.appointments;

        let appointment = service.create(&AuthUser::from(&patient), request(&doctor, 5)).await.unwrap();
        let rejected = service
            .reject(&AuthUser::from(&doctor), &appointment.id, RejectAppointmentInput::default())
            .await
            .unwrap();

        assert_eq!(rejected.status, AppointmentStatus::Rejected);
        assert_eq!(rejected.notes.as_deref(), Some(NO_REASON));
        let last = ctx.mailer.sent().pop().unwrap();
        assert_eq!(last.to, "pat@example.com");
        assert_eq!(last.subject, "SkinNova - Appointment Rejected");
    }

    #[tokio::test]
    async fn listing_views_and_counts() {
        let ctx = TestContext::new();
        let (patient, doctor) = setup(&ctx).await;
        let now = Utc::now();

        ctx.create_appointment(&patient, &doctor, now + Duration::days(1), AppointmentStatus::Pending).await;
        ctx.create_appointment(&patient, &doctor, now + Duration::days(2), AppointmentStatus::Approved).await;
        ctx.create_appointment(&patient, &doctor, now - Duration::days(2), AppointmentStatus::Approved).await;
        ctx.create_appointment(&patient, &doctor, now - Duration::days(3), AppointmentStatus::Rejected).await;

        let service = &ctx.services.appointments;
        let as_patient = AuthUser::from(&patient);

        let all = service.list_for_user(&as_patient, AppointmentFilter::default()).await.unwrap();
        assert_eq!(all.appointments.len(), 4);
        assert_eq!(
            all.counts,
            AppointmentCounts {
                all: 4,
                pending: 1,
                approved: 2,
                rejected: 1,
                completed: 0
            }
        );
        // Newest requested date first
        assert!(all.appointments[0].requested_date > all.appointments[1].requested_date);

        let upcoming = service
            .list_for_user(
                &as_patient,
                AppointmentFilter {
                    view: AppointmentView::Upcoming,
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(upcoming.appointments.len(), 1);
        assert_eq!(upcoming.counts.all, 4);

        let past = service
            .list_for_user(
                &as_patient,
                AppointmentFilter {
                    view: AppointmentView::Past,
                    status: Some(AppointmentStatus::Approved),
                },
            )
            .await
            .unwrap();
        assert_eq!(past.appointments.len(), 1);

        // The doctor sees the same appointments from the other side
        let as_doctor = service
            .list_for_user(&AuthUser::from(&doctor), AppointmentFilter::default())
            .await
            .unwrap();
        assert_eq!(as_doctor.appointments.len(), 4);
    }
}
