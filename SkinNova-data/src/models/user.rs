use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::common::UnknownVariant;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    #[default]
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            _ => Err(UnknownVariant::new("role", s)),
        }
    }
}

/// Storage model for an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    /// Always stored lowercased
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default = "empty_profile")]
    pub profile: Value,
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verification_documents: Vec<String>,
    /// SHA-256 of the outstanding password reset token
    pub reset_token_hash: Option<String>,
    pub reset_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn empty_profile() -> Value {
    Value::Object(Default::default())
}

impl User {
    pub fn new(name: Option<String>, email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email: normalize_email(email),
            password_hash,
            role,
            profile: empty_profile(),
            profile_photo: None,
            verified: false,
            verification_documents: Vec::new(),
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown to other users, falling back to the email address
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}

/// Canonical form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
