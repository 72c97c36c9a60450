use chrono::{DateTime, Utc};
use serde::Serialize;

use skin_nova_data::models::{Appointment, ChatMessage};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A doctor's conversation with one patient
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DoctorPatientChat {
    pub chat_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: Option<String>,
    pub last_message: Option<ChatMessage>,
    /// The last message was sent by the patient
    pub has_unread_messages: bool,
    pub message_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// An approved appointment of a patient and the state of its chat
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AppointmentWithChat {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub has_chat: bool,
    pub has_messages: bool,
    pub message_count: usize,
}
