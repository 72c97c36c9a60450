use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Kind of event recorded in the activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    UserRegistration,
    AppointmentScheduled,
    AppointmentRequestReceived,
    AppointmentApproved,
    AppointmentRejected,
    AppointmentCompleted,
    ProfileUpdated,
    UserVerified,
    PasswordResetRequested,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::UserRegistration => "user_registration",
            ActivityAction::AppointmentScheduled => "appointment_scheduled",
            ActivityAction::AppointmentRequestReceived => "appointment_request_received",
            ActivityAction::AppointmentApproved => "appointment_approved",
            ActivityAction::AppointmentRejected => "appointment_rejected",
            ActivityAction::AppointmentCompleted => "appointment_completed",
            ActivityAction::ProfileUpdated => "profile_updated",
            ActivityAction::UserVerified => "user_verified",
            ActivityAction::PasswordResetRequested => "password_reset_requested",
        }
    }

    /// Actions whose relevance ends with the appointment they refer to
    pub fn is_appointment_related(&self) -> bool {
        matches!(
            self,
            ActivityAction::AppointmentScheduled
                | ActivityAction::AppointmentRequestReceived
                | ActivityAction::AppointmentApproved
                | ActivityAction::AppointmentRejected
        )
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

/// Storage model for an activity feed entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub action: ActivityAction,
    pub action_title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: ActivityMetadata,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        user_id: &str,
        user_name: &str,
        user_email: &str,
        action: ActivityAction,
        action_title: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            user_email: user_email.to_string(),
            action,
            action_title: action_title.into(),
            description: None,
            metadata: ActivityMetadata::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: ActivityMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
