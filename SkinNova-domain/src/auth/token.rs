use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use skin_nova_data::models::{Role, User};

use crate::auth::token_blacklist::TokenBlacklist;
use crate::config::JwtConfig;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Token has been revoked
    #[error("Token has been revoked")]
    TokenRevoked,

    /// A refresh token was presented where an access token was expected, or the reverse
    #[error("Wrong token type")]
    WrongTokenType,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    Configuration(String),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token sent with every request
    Access,
    /// Long-lived token exchanged for new access tokens
    Refresh,
}

/// Claims carried by SkinNova JWTs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Token id, used for revocation
    pub jti: String,
    pub token_type: TokenType,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs, validates and revokes JWTs
#[derive(Debug, Clone)]
pub struct TokenManager {
    config: JwtConfig,
    blacklist: Arc<TokenBlacklist>,
}

impl TokenManager {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            blacklist: Arc::new(TokenBlacklist::new()),
        }
    }

    pub fn blacklist(&self) -> &Arc<TokenBlacklist> {
        &self.blacklist
    }

    /// Generate a new JWT for the user
    pub fn generate_token(&self, user: &User, token_type: TokenType) -> Result<IssuedToken, SecurityError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.config.access_token_ttl,
            TokenType::Refresh => self.config.refresh_token_ttl,
        };
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            token_type,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        // Log token generation (but not the token itself)
        info!("Generated {:?} token for user {}", token_type, user.id);
        debug!("Token expiration: {}", expires_at);

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a JWT of the expected type and return the decoded claims
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            ErrorKind::InvalidToken => SecurityError::InvalidToken,
            ErrorKind::InvalidSignature => SecurityError::TokenValidation("Invalid signature".to_string()),
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

        let claims = token_data.claims;
        if claims.token_type != expected {
            return Err(SecurityError::WrongTokenType);
        }

        if self.blacklist.is_revoked(&claims.jti) {
            debug!("Rejected revoked token {} for user {}", claims.jti, claims.sub);
            return Err(SecurityError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Revoke a token until it would have expired anyway
    pub fn revoke_token(&self, claims: &Claims) {
        info!("Revoking token {} for user {}", claims.jti, claims.sub);
        self.blacklist.revoke_token(&claims.jti, claims.expires_at());
    }
}
