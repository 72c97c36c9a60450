use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use skin_nova_domain::auth::token::IssuedToken;
use skin_nova_domain::entities::{LoginInput, SignupInput};

/// Registration request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(max = 100, message = "Name cannot exceed 100 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 128, message = "Password cannot exceed 128 characters"))]
    pub password: String,

    /// `patient` (default) or `doctor`
    pub role: Option<String>,

    /// Free-form profile data
    #[schema(value_type = Option<Object>)]
    pub profile: Option<serde_json::Value>,
}

impl From<SignupRequest> for SignupInput {
    fn from(request: SignupRequest) -> Self {
        SignupInput {
            name: request.name,
            email: request.email,
            password: request.password,
            role: request.role,
            profile: request.profile,
        }
    }
}

/// Login request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(request: LoginRequest) -> Self {
        LoginInput {
            email: request.email,
            password: request.password,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// A new access token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    #[validate(length(max = 128, message = "Password cannot exceed 128 characters"))]
    pub password: String,
}
