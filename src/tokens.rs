//! Expiring password-reset token store
//!
//! Single-use tokens keyed by their opaque string, each carrying the owning
//! user id and an expiry deadline. Expired entries are dropped on contact
//! and swept opportunistically on issue, so the map stays bounded without a
//! background task.

use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TOKEN_LEN: usize = 43;
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct TokenEntry {
    user_id: u64,
    expires_at: Instant,
}

/// Thread-safe expiring token store (cheap to clone)
#[derive(Clone)]
pub struct ResetTokenStore {
    entries: Arc<RwLock<HashMap<String, TokenEntry>>>,
    ttl: Duration,
}

impl ResetTokenStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh token for a user
    pub fn issue(&self, user_id: u64) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();

        let mut entries = self.entries.write();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            token.clone(),
            TokenEntry {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Redeem a token: returns the owning user id and removes the entry.
    /// Expired or unknown tokens yield `None`; expired entries are dropped
    /// on contact.
    pub fn consume(&self, token: &str) -> Option<u64> {
        let mut entries = self.entries.write();
        let entry = entries.remove(token)?;
        if entry.expires_at > Instant::now() {
            Some(entry.user_id)
        } else {
            None
        }
    }

    /// Drop all expired entries
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, entry| entry.expires_at > now);
    }

    /// Number of live entries (expired-but-unswept included)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ResetTokenStore {
    fn default() -> Self {
        Self::new()
    }
}
