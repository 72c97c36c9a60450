use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

type RevokedTokens = HashMap<String, (DateTime<Utc>, DateTime<Utc>)>;

/// Revoked token ids, kept until the tokens would have expired anyway.
///
/// Expired entries are pruned on every revocation. The blacklist also has a
/// maximum size; when it is still full after pruning, the oldest revocations go.
#[derive(Debug)]
pub struct TokenBlacklist {
    /// Key: JWT id. Value: (expiration, revocation time)
    revoked_tokens: Mutex<RevokedTokens>,
    max_size: usize,
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBlacklist {
    pub fn new() -> Self {
        Self::with_max_size(10_000)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            revoked_tokens: Mutex::new(HashMap::new()),
            max_size,
        }
    }

    fn tokens(&self) -> MutexGuard<'_, RevokedTokens> {
        self.revoked_tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a token to the blacklist until `expiration`
    pub fn revoke_token(&self, token_id: &str, expiration: DateTime<Utc>) {
        let mut tokens = self.tokens();
        cleanup_expired(&mut tokens);

        if tokens.len() >= self.max_size {
            warn!("Token blacklist reached max size ({}), dropping oldest revocations", self.max_size);
            remove_oldest(&mut tokens, (self.max_size / 2).max(1));
        }

        tokens.insert(token_id.to_string(), (expiration, Utc::now()));
        info!("Token revoked: {}", token_id);
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.tokens().contains_key(token_id)
    }

    pub fn size(&self) -> usize {
        self.tokens().len()
    }

    /// Remove expired tokens, returning how many were removed
    pub fn cleanup_expired_tokens(&self) -> usize {
        cleanup_expired(&mut self.tokens())
    }
}

fn cleanup_expired(tokens: &mut RevokedTokens) -> usize {
    let now = Utc::now();
    let before = tokens.len();
    tokens.retain(|_, (expiration, _)| *expiration > now);

    let removed = before - tokens.len();
    if removed > 0 {
        debug!("Removed {} expired tokens from blacklist", removed);
    }
    removed
}

fn remove_oldest(tokens: &mut RevokedTokens, count: usize) {
    let mut entries: Vec<(String, DateTime<Utc>)> = tokens
        .iter()
        .map(|(id, (_, revoked_at))| (id.clone(), *revoked_at))
        .collect();
    entries.sort_by(|a, b| a.1.cmp(&b.1));

    for (id, _) in entries.into_iter().take(count) {
        tokens.remove(&id);
    }
    debug!("Removed {} oldest entries from token blacklist", count);
}

/// Periodically drop expired entries from the blacklist
pub fn start_cleanup_task(blacklist: Arc<TokenBlacklist>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let removed = blacklist.cleanup_expired_tokens();
            debug!("Removed {} expired tokens, {} remain in blacklist", removed, blacklist.size());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::thread::sleep;

    #[test]
    fn test_revoke_and_check_token() {
        let blacklist = TokenBlacklist::new();
        blacklist.revoke_token("test-token-1", Utc::now() + ChronoDuration::seconds(60));

        assert!(blacklist.is_revoked("test-token-1"));
        assert!(!blacklist.is_revoked("unknown-token"));
    }

    #[test]
    fn test_revoke_prunes_expired_entries() {
        let blacklist = TokenBlacklist::new();
        blacklist.revoke_token("expired-token", Utc::now() - ChronoDuration::seconds(1));
        assert_eq!(blacklist.size(), 1);

        blacklist.revoke_token("valid-token", Utc::now() + ChronoDuration::seconds(60));
        assert_eq!(blacklist.size(), 1);
        assert!(!blacklist.is_revoked("expired-token"));
        assert!(blacklist.is_revoked("valid-token"));
    }

    #[test]
    fn test_cleanup_expired_tokens() {
        let blacklist = TokenBlacklist::new();
        blacklist.revoke_token("valid-token", Utc::now() + ChronoDuration::seconds(60));
        blacklist.revoke_token("expired-token", Utc::now() - ChronoDuration::seconds(1));
        assert_eq!(blacklist.size(), 2);

        assert_eq!(blacklist.cleanup_expired_tokens(), 1);
        assert!(!blacklist.is_revoked("expired-token"));
        assert!(blacklist.is_revoked("valid-token"));
    }

    #[test]
    fn test_max_size_and_oldest_removal() {
        let blacklist = TokenBlacklist::with_max_size(4);
        for i in 0..4 {
            blacklist.revoke_token(&format!("token-{}", i), Utc::now() + ChronoDuration::seconds(300));
            sleep(Duration::from_millis(5));
        }
        assert_eq!(blacklist.size(), 4);

        blacklist.revoke_token("new-token", Utc::now() + ChronoDuration::seconds(300));

        assert_eq!(blacklist.size(), 3);
        assert!(!blacklist.is_revoked("token-0"));
        assert!(!blacklist.is_revoked("token-1"));
        assert!(blacklist.is_revoked("token-3"));
        assert!(blacklist.is_revoked("new-token"));
    }
}
