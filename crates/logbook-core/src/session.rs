use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore};
use tracing::debug;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Session {
    username: String,
    issued_at: Instant,
}

/// Issues and resolves opaque bearer tokens.
///
/// Non-durable by design: restarting the process logs everyone out.
/// Expiry is absolute from issue time and enforced lazily inside
/// [`resolve`](Self::resolve) — there is no background sweep.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a fresh token for a verified identity. 128 bits from the
    /// OS RNG, base64url without padding.
    pub fn issue(&self, username: &str) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                issued_at: Instant::now(),
            },
        );
        token
    }

    /// Resolve a token to its identity. An expired session is removed
    /// on the spot and reported as absent.
    pub fn resolve(&self, token: &str) -> Option<String> {
        {
            let sessions = self.sessions.read().expect("session lock poisoned");
            match sessions.get(token) {
                None => return None,
                Some(s) if s.issued_at.elapsed() <= self.ttl => {
                    return Some(s.username.clone());
                }
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().expect("session lock poisoned");
        if let Some(s) = sessions.remove(token) {
            debug!("expired session for {} dropped", s.username);
        }
        None
    }

    /// Idempotent; revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &str) {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_resolve_revoke() {
        let registry = SessionRegistry::new(DEFAULT_SESSION_TTL);
        let token = registry.issue("kirk");

        assert_eq!(registry.resolve(&token).as_deref(), Some("kirk"));
        registry.revoke(&token);
        assert_eq!(registry.resolve(&token), None);
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let registry = SessionRegistry::new(DEFAULT_SESSION_TTL);
        let a = registry.issue("kirk");
        let b = registry.issue("kirk");

        assert_ne!(a, b);
        assert!(!a.contains("kirk"));
        // 16 bytes base64url without padding
        assert_eq!(a.len(), 22);
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let registry = SessionRegistry::new(DEFAULT_SESSION_TTL);
        assert_eq!(registry.resolve("not-a-token"), None);
        registry.revoke("not-a-token"); // no-op
    }

    #[test]
    fn expired_session_is_dropped_lazily() {
        let registry = SessionRegistry::new(Duration::from_millis(10));
        let token = registry.issue("kirk");
        assert_eq!(registry.resolve(&token).as_deref(), Some("kirk"));

        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(registry.resolve(&token), None);
        // and it stays gone
        assert_eq!(registry.resolve(&token), None);
    }
}
