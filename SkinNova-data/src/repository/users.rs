use chrono::{DateTime, Utc};

use crate::models::user::{normalize_email, Role, User};
use super::document::{Collection, Document, SharedDocumentStore};
use super::errors::RepositoryError;

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Repository for user accounts
#[derive(Debug, Clone)]
pub struct UserRepository {
    users: Collection<User>,
}

impl UserRepository {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            users: Collection::new(store),
        }
    }

    /// Insert a new user, rejecting duplicate emails
    pub async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(RepositoryError::Conflict(format!("email {} already registered", user.email)));
        }
        self.users.save(user).await
    }

    pub async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        if self.users.find_by_id(&user.id).await?.is_none() {
            return Err(RepositoryError::NotFound(user.id.clone()));
        }
        self.users.save(user).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.users.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = normalize_email(email);
        self.users.find_one(|user| user.email == email).await
    }

    /// User holding an unexpired reset token with the given hash
    pub async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>, RepositoryError> {
        self.users
            .find_one(|user| {
                user.reset_token_hash.as_deref() == Some(token_hash)
                    && user.reset_token_expires.map_or(false, |expires| expires > now)
            })
            .await
    }

    /// All users, newest first
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users = self.users.find_all().await?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, RepositoryError> {
        self.users.find(|user| user.role == role).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        self.users.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryDocumentStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn repository() -> UserRepository {
        UserRepository::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = repository();
        repo.create(&User::new(None, "dup@example.com", "h".into(), Role::Patient)).await.unwrap();

        let result = repo.create(&User::new(None, "DUP@example.com", "h".into(), Role::Doctor)).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn reset_token_lookup_ignores_expired_tokens() {
        let repo = repository();
        let now = Utc::now();

        let mut fresh = User::new(None, "fresh@example.com", "h".into(), Role::Patient);
        fresh.reset_token_hash = Some("abc".into());
        fresh.reset_token_expires = Some(now + Duration::minutes(30));
        repo.create(&fresh).await.unwrap();

        let mut stale = User::new(None, "stale@example.com", "h".into(), Role::Patient);
        stale.reset_token_hash = Some("def".into());
        stale.reset_token_expires = Some(now - Duration::minutes(1));
        repo.create(&stale).await.unwrap();

        assert_eq!(repo.find_by_reset_token("abc", now).await.unwrap().unwrap().id, fresh.id);
        assert!(repo.find_by_reset_token("def", now).await.unwrap().is_none());
    }
}
