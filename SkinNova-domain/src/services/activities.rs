use chrono::Utc;
use tracing::{debug, info, warn};

use skin_nova_data::models::{Activity, ActivityAction, User};
use skin_nova_data::repository::{ActivityRepository, AppointmentRepository, SharedDocumentStore};

use crate::auth::AuthUser;
use crate::services::errors::{ServiceError, ServiceResult};

const ADMIN_FEED_LIMIT: usize = 100;
const USER_FEED_LIMIT: usize = 50;

/// Activity feed shown on the dashboards
#[derive(Debug, Clone)]
pub struct ActivityService {
    activities: ActivityRepository,
    appointments: AppointmentRepository,
}

impl ActivityService {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            activities: ActivityRepository::new(store.clone()),
            appointments: AppointmentRepository::new(store),
        }
    }

    /// Store an activity. Failures are logged and never reach the caller.
    pub async fn record(&self, activity: Activity) {
        debug!("Recording activity {} for user {}", activity.action, activity.user_id);
        if let Err(e) = self.activities.insert(&activity).await {
            warn!("Failed to record activity {} for user {}: {}", activity.action, activity.user_id, e);
        }
    }

    /// Shorthand for an activity about `user`
    pub fn for_user(user: &User, action: ActivityAction, title: impl Into<String>) -> Activity {
        Activity::new(&user.id, user.display_name(), &user.email, action, title)
    }

    /// Admin feed, newest first
    pub async fn list_all(&self) -> ServiceResult<Vec<Activity>> {
        self.prune_expired().await;
        Ok(self.activities.list(None, ADMIN_FEED_LIMIT).await?)
    }

    /// Feed of one user. Visible to that user and to admins.
    pub async fn list_for_user(&self, requester: &AuthUser, user_id: &str) -> ServiceResult<Vec<Activity>> {
        if requester.id != user_id && !requester.is_admin() {
            return Err(ServiceError::forbidden("Unauthorized"));
        }
        self.prune_expired().await;
        Ok(self.activities.list(Some(user_id), USER_FEED_LIMIT).await?)
    }

    /// Drop appointment activities whose appointment has passed or is gone
    async fn prune_expired(&self) {
        match self.collect_expired().await {
            Ok(ids) if ids.is_empty() => {}
            Ok(ids) => match self.activities.delete_many(&ids).await {
                Ok(removed) => info!("Cleaned up {} expired appointment activities", removed),
                Err(e) => warn!("Error cleaning up expired appointment activities: {}", e),
            },
            Err(e) => warn!("Error looking up expired appointment activities: {}", e),
        }
    }

    async fn collect_expired(&self) -> ServiceResult<Vec<String>> {
        let now = Utc::now();
        let mut expired = Vec::new();

        for activity in self.activities.all().await? {
            if !activity.action.is_appointment_related() {
                continue;
            }
            let Some(appointment_id) = activity.metadata.appointment_id.as_deref() else {
                continue;
            };
            let stale = match self.appointments.find_by_id(appointment_id).await? {
                Some(appointment) => appointment.is_expired(now),
                None => true,
            };
            if stale {
                expired.push(activity.id);
            }
        }

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skin_nova_data::models::{ActivityMetadata, AppointmentStatus, Role};

    use crate::testing::TestContext;

    #[tokio::test]
    async fn expired_appointment_activities_are_pruned() {
        let ctx = TestContext::new();
        let patient = ctx.create_user("pat@example.com", Role::Patient).await;
        let doctor = ctx.create_user("doc@example.com", Role::Doctor).await;

        let past = ctx
            .create_appointment(&patient, &doctor, Utc::now() - Duration::days(2), AppointmentStatus::Pending)
            .await;
        let future = ctx
            .create_appointment(&patient, &doctor, Utc::now() + Duration::days(2), AppointmentStatus::Pending)
            .await;

        let service = &ctx.services.activities;
        for appointment_id in [past.id.clone(), future.id.clone(), "missing".to_string()] {
            let activity = ActivityService::for_user(&patient, ActivityAction::AppointmentScheduled, "Appointment Scheduled")
                .with_metadata(ActivityMetadata {
                    appointment_id: Some(appointment_id),
                    ..Default::default()
                });
            service.record(activity).await;
        }
        service
            .record(ActivityService::for_user(&patient, ActivityAction::UserRegistration, "New User Registration"))
            .await;

        let feed = service.list_for_user(&AuthUser::from(&patient), &patient.id).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert!(feed
            .iter()
            .all(|a| a.metadata.appointment_id.is_none() || a.metadata.appointment_id.as_deref() == Some(future.id.as_str())));
    }

    #[tokio::test]
    async fn other_users_feed_requires_admin() {
        let ctx = TestContext::new();
        let patient = ctx.create_user("pat@example.com", Role::Patient).await;
        let other = ctx.create_user("other@example.com", Role::Patient).await;
        let admin = ctx.create_user("root@example.com", Role::Admin).await;

        let err = ctx
            .services
            .activities
            .list_for_user(&AuthUser::from(&other), &patient.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        assert!(ctx
            .services
            .activities
            .list_for_user(&AuthUser::from(&admin), &patient.id)
            .await
            .is_ok());
    }
}
