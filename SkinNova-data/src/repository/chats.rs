use crate::models::chat::Chat;
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for Chat {
    const COLLECTION: &'static str = "chats";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for patient/doctor chats
#[derive(Debug, Clone)]
pub struct ChatRepository {
    chats: Collection<Chat>,
}

impl ChatRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            chats: Collection::new(store),
        }
    }

    pub async fn save(&self, chat: &Chat) -> Result<(), RepositoryError> {
        self.chats.save(chat).await
    }

    pub async fn find_by_pair(&self, patient_id: &str, doctor_id: &str) -> Result<Option<Chat>, RepositoryError> {
        self.chats
            .find_one(|chat| chat.patient_id == patient_id && chat.doctor_id == doctor_id)
            .await
    }

    /// Chats the user takes part in, most recently active first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        let mut chats = self
            .chats
            .find(|chat| chat.patient_id == user_id || chat.doctor_id == user_id)
            .await?;
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    pub async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        let mut chats = self.chats.find(|chat| chat.doctor_id == doctor_id).await?;
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        self.chats.find(|chat| chat.patient_id == patient_id).await
    }
}
