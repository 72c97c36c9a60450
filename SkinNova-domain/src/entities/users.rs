use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use skin_nova_data::models::{Role, User};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    /// Any case, defaults to patient
    pub role: Option<String>,
    pub profile: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Admin edit of an account. At least one field must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

/// Account without credentials or reset state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub profile: Value,
    pub profile_photo: Option<String>,
    pub verified: bool,
    pub verification_documents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            profile: user.profile.clone(),
            profile_photo: user.profile_photo.clone(),
            verified: user.verified,
            verification_documents: user.verification_documents.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser::from(&user)
    }
}

/// Result of a signup or login
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: PublicUser,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}
