use chrono::Utc;
use tracing::{debug, info};

use skin_nova_data::models::chat::DELETED_MESSAGE_PLACEHOLDER;
use skin_nova_data::models::{AppointmentStatus, Chat, ChatMessage, SenderRole};
use skin_nova_data::repository::{AppointmentRepository, ChatRepository, SharedDocumentStore, UserRepository};

use crate::auth::AuthUser;
use crate::entities::{AppointmentWithChat, DoctorPatientChat};
use crate::services::errors::{ServiceError, ServiceResult};

/// Conversations between a patient and a doctor who share an appointment
#[derive(Debug, Clone)]
pub struct ChatService {
    chats: ChatRepository,
    appointments: AppointmentRepository,
    users: UserRepository,
}

impl ChatService {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            chats: ChatRepository::new(store.clone()),
            appointments: AppointmentRepository::new(store.clone()),
            users: UserRepository::new(store),
        }
    }

    /// The chat of the pair, created on first access
    pub async fn get_or_create(&self, requester: &AuthUser, patient_id: &str, doctor_id: &str) -> ServiceResult<Chat> {
        self.authorize(requester, patient_id, doctor_id).await?;

        if let Some(chat) = self.chats.find_by_pair(patient_id, doctor_id).await? {
            return Ok(chat);
        }

        let patient = self.users.find_by_id(patient_id).await?;
        let doctor = self.users.find_by_id(doctor_id).await?;
        let (Some(patient), Some(doctor)) = (patient, doctor) else {
            return Err(ServiceError::not_found("Patient or doctor not found"));
        };

        let chat = Chat::new(&patient.id, &doctor.id, patient.display_name(), doctor.display_name());
        self.chats.save(&chat).await?;
        info!("Created chat {} between patient {} and doctor {}", chat.id, patient_id, doctor_id);
        Ok(chat)
    }

    pub async fn send_message(
        &self,
        requester: &AuthUser,
        patient_id: &str,
        doctor_id: &str,
        content: &str,
    ) -> ServiceResult<Chat> {
        if !Self::is_participant(requester, patient_id, doctor_id) {
            return Err(ServiceError::forbidden("Unauthorized: Cannot send message as this user"));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Message content cannot be empty"));
        }

        let mut chat = self.get_or_create(requester, patient_id, doctor_id).await?;

        let (role, name) = if requester.id == chat.doctor_id {
            (SenderRole::Doctor, chat.doctor_name.clone())
        } else {
            (SenderRole::Patient, chat.patient_name.clone())
        };
        chat.messages.push(ChatMessage::new(&requester.id, &name, role, content.to_string()));
        chat.updated_at = Utc::now();
        self.chats.save(&chat).await?;

        debug!("Message added to chat {}", chat.id);
        Ok(chat)
    }

    pub async fn edit_message(
        &self,
        requester: &AuthUser,
        patient_id: &str,
        doctor_id: &str,
        message_id: &str,
        content: &str,
    ) -> ServiceResult<ChatMessage> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Message content cannot be empty"));
        }

        let mut chat = self.existing_chat(requester, patient_id, doctor_id).await?;
        let now = Utc::now();
        let message = chat
            .message_mut(message_id)
            .ok_or_else(|| ServiceError::not_found("Message not found"))?;
        if message.sender_id != requester.id {
            return Err(ServiceError::forbidden("Unauthorized: Can only edit your own messages"));
        }
        if message.is_deleted {
            return Err(ServiceError::validation("Cannot edit a deleted message"));
        }

        message.content = content.to_string();
        message.is_edited = true;
        message.edited_at = Some(now);
        let edited = message.clone();

        chat.updated_at = now;
        self.chats.save(&chat).await?;
        Ok(edited)
    }

    /// Replace the content with a placeholder. The message keeps its place in the history.
    pub async fn delete_message(
        &self,
        requester: &AuthUser,
        patient_id: &str,
        doctor_id: &str,
        message_id: &str,
    ) -> ServiceResult<ChatMessage> {
        let mut chat = self.existing_chat(requester, patient_id, doctor_id).await?;
        let message = chat
            .message_mut(message_id)
            .ok_or_else(|| ServiceError::not_found("Message not found"))?;
        if message.sender_id != requester.id {
            return Err(ServiceError::forbidden("Unauthorized: Can only delete your own messages"));
        }

        message.is_deleted = true;
        message.content = DELETED_MESSAGE_PLACEHOLDER.to_string();
        let deleted = message.clone();

        chat.updated_at = Utc::now();
        self.chats.save(&chat).await?;
        Ok(deleted)
    }

    /// Chats the user takes part in, most recently active first
    pub async fn list_for_user(&self, requester: &AuthUser, user_id: &str) -> ServiceResult<Vec<Chat>> {
        if requester.id != user_id && !requester.is_admin() {
            return Err(ServiceError::forbidden("Unauthorized: Cannot access other user chats"));
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User not found"));
        }
        Ok(self.chats.list_for_user(user_id).await?)
    }

    /// A doctor's chats with patients who still have an appointment with them
    pub async fn doctor_patients(&self, requester: &AuthUser, doctor_id: &str) -> ServiceResult<Vec<DoctorPatientChat>> {
        if requester.id != doctor_id {
            return Err(ServiceError::forbidden("Unauthorized"));
        }

        let active_patients: Vec<String> = self
            .appointments
            .list_for_doctor(doctor_id)
            .await?
            .into_iter()
            .filter(|appointment| appointment.permits_chat())
            .map(|appointment| appointment.patient_id)
            .collect();

        let mut result = Vec::new();
        for chat in self.chats.list_for_doctor(doctor_id).await? {
            if !active_patients.contains(&chat.patient_id) {
                continue;
            }
            let patient_email = self.users.find_by_id(&chat.patient_id).await?.map(|user| user.email);
            let last_message = chat.last_message().cloned();
            let has_unread_messages = last_message
                .as_ref()
                .map_or(false, |message| message.sender_id != doctor_id);

            result.push(DoctorPatientChat {
                chat_id: chat.id,
                patient_id: chat.patient_id,
                patient_name: chat.patient_name,
                patient_email,
                last_message,
                has_unread_messages,
                message_count: chat.messages.len(),
                updated_at: chat.updated_at,
            });
        }
        Ok(result)
    }

    /// A patient's approved appointments and whether each has a chat going
    pub async fn appointments_with_chat(&self, requester: &AuthUser, patient_id: &str) -> ServiceResult<Vec<AppointmentWithChat>> {
        if requester.id != patient_id {
            return Err(ServiceError::forbidden("Unauthorized"));
        }

        let chats = self.chats.list_for_patient(patient_id).await?;
        let appointments = self
            .appointments
            .list_for_patient(patient_id)
            .await?
            .into_iter()
            .filter(|appointment| appointment.status == AppointmentStatus::Approved)
            .map(|appointment| {
                let message_count = chats
                    .iter()
                    .find(|chat| chat.doctor_id == appointment.doctor_id)
                    .map(|chat| chat.messages.len());
                AppointmentWithChat {
                    appointment,
                    has_chat: message_count.is_some(),
                    has_messages: message_count.map_or(false, |count| count > 0),
                    message_count: message_count.unwrap_or(0),
                }
            })
            .collect();

        Ok(appointments)
    }

    fn is_participant(requester: &AuthUser, patient_id: &str, doctor_id: &str) -> bool {
        requester.id == patient_id || requester.id == doctor_id
    }

    /// Participants only, and only while an appointment links them
    async fn authorize(&self, requester: &AuthUser, patient_id: &str, doctor_id: &str) -> ServiceResult<()> {
        if !Self::is_participant(requester, patient_id, doctor_id) {
            return Err(ServiceError::forbidden("Unauthorized: Cannot access this chat"));
        }

        let linked = self
            .appointments
            .list_between(patient_id, doctor_id)
            .await?
            .iter()
            .any(|appointment| appointment.permits_chat());
        if !linked {
            return Err(ServiceError::forbidden("No active appointment between patient and doctor"));
        }
        Ok(())
    }

    async fn existing_chat(&self, requester: &AuthUser, patient_id: &str, doctor_id: &str) -> ServiceResult<Chat> {
        if !Self::is_participant(requester, patient_id, doctor_id) {
            return Err(ServiceError::forbidden("Unauthorized: Cannot access this chat"));
        }
        self.chats
            .find_by_pair(patient_id, doctor_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Chat not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skin_nova_data::models::{Role, User};

    use crate::testing::TestContext;

    async fn linked_pair(ctx: &TestContext, status: AppointmentStatus) -> (User, User) {
        let patient = ctx.create_user("pat@example.com", Role::Patient).await;
        let doctor = ctx.create_user("doc@example.com", Role::Doctor).await;
        ctx.create_appointment(&patient, &doctor, Utc::now() + Duration::days(1), status)
            .await;
        (patient, doctor)
    }

    #[tokio::test]
    async fn chat_requires_an_active_appointment() {
        let ctx = TestContext::new();
        let (patient, doctor) = linked_pair(&ctx, AppointmentStatus::Rejected).await;

        let err = ctx
            .services
            .chat
            .get_or_create(&AuthUser::from(&patient), &patient.id, &doctor.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(msg) if msg.contains("No active appointment")));
    }

    #[tokio::test]
    async fn outsiders_cannot_read_chat() {
        let ctx = TestContext::new();
        let (patient, doctor) = linked_pair(&ctx, AppointmentStatus::Approved).await;
        let outsider = ctx.create_user("eve@example.com", Role::Patient).await;

        assert!(matches!(
            ctx.services
                .chat
                .get_or_create(&AuthUser::from(&outsider), &patient.id, &doctor.id)
                .await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn messages_can_be_edited_and_deleted_by_sender() {
        let ctx = TestContext::new();
        let (patient, doctor) = linked_pair(&ctx, AppointmentStatus::Pending).await;
        let chat_service = &ctx.services.chat;
        let pat = AuthUser::from(&patient);
        let doc = AuthUser::from(&doctor);

        assert!(matches!(
            chat_service.send_message(&pat, &patient.id, &doctor.id, "   ").await,
            Err(ServiceError::Validation(_))
        ));

        let chat = chat_service
            .send_message(&pat, &patient.id, &doctor.id, "  Hello doctor  ")
            .await
            .unwrap();
        let message = chat.messages[0].clone();
        assert_eq!(message.content, "Hello doctor");
        assert_eq!(message.sender_role, SenderRole::Patient);
        assert_eq!(message.sender_name, patient.display_name());

        assert!(matches!(
            chat_service
                .edit_message(&doc, &patient.id, &doctor.id, &message.id, "changed")
                .await,
            Err(ServiceError::Forbidden(_))
        ));

        let edited = chat_service
            .edit_message(&pat, &patient.id, &doctor.id, &message.id, "Hello again")
            .await
            .unwrap();
        assert!(edited.is_edited);
        assert!(edited.edited_at.is_some());

        let deleted = chat_service
            .delete_message(&pat, &patient.id, &doctor.id, &message.id)
            .await
            .unwrap();
        assert!(deleted.is_deleted);
        assert_eq!(deleted.content, DELETED_MESSAGE_PLACEHOLDER);

        assert!(matches!(
            chat_service
                .edit_message(&pat, &patient.id, &doctor.id, &message.id, "revive")
                .await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            chat_service
                .delete_message(&pat, &patient.id, &doctor.id, "missing")
                .await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn doctor_sees_unread_patient_messages() {
        let ctx = TestContext::new();
        let (patient, doctor) = linked_pair(&ctx, AppointmentStatus::Approved).await;
        let chat_service = &ctx.services.chat;
        let pat = AuthUser::from(&patient);
        let doc = AuthUser::from(&doctor);

        chat_service
            .send_message(&pat, &patient.id, &doctor.id, "Is this serious?")
            .await
            .unwrap();

        let patients = chat_service.doctor_patients(&doc, &doctor.id).await.unwrap();
        assert_eq!(patients.len(), 1);
        assert!(patients[0].has_unread_messages);
        assert_eq!(patients[0].patient_email.as_deref(), Some("pat@example.com"));

        chat_service
            .send_message(&doc, &patient.id, &doctor.id, "Not at all")
            .await
            .unwrap();
        let patients = chat_service.doctor_patients(&doc, &doctor.id).await.unwrap();
        assert!(!patients[0].has_unread_messages);
        assert_eq!(patients[0].message_count, 2);

        assert!(matches!(
            chat_service.doctor_patients(&pat, &doctor.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn appointments_with_chat_reports_message_counts() {
        let ctx = TestContext::new();
        let (patient, doctor) = linked_pair(&ctx, AppointmentStatus::Approved).await;
        let pat = AuthUser::from(&patient);

        let before = ctx.services.chat.appointments_with_chat(&pat, &patient.id).await.unwrap();
        assert_eq!(before.len(), 1);
        assert!(!before[0].has_chat);

        ctx.services
            .chat
            .send_message(&pat, &patient.id, &doctor.id, "Hi")
            .await
            .unwrap();

        let after = ctx.services.chat.appointments_with_chat(&pat, &patient.id).await.unwrap();
        assert!(after[0].has_chat);
        assert!(after[0].has_messages);
        assert_eq!(after[0].message_count, 1);

        let listed = ctx.services.chat.list_for_user(&pat, &patient.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
