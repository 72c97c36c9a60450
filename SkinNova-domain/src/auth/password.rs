//! Password hashing and reset tokens

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::auth::token::SecurityError;

/// Cost range bcrypt accepts
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt password hasher. Hashing runs on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, SecurityError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| SecurityError::Hashing(e.to_string()))?
            .map_err(|e| SecurityError::Hashing(e.to_string()))
    }

    /// A malformed stored hash counts as a mismatch
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, SecurityError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| SecurityError::Hashing(e.to_string()))?;
        Ok(verified)
    }
}

/// A password reset token as sent to the user, and the digest that gets stored
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub hash: String,
}

/// 32 random bytes, hex encoded
pub fn generate_reset_token() -> ResetToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let hash = hash_reset_token(&token);
    ResetToken { token, hash }
}

/// SHA-256 of the token, hex encoded
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
