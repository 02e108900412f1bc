//! Server-side session storage
//!
//! Sessions map a randomly generated opaque identifier to the GitHub
//! login of the signed-in user. The store owns expiry; the application
//! owns identifier generation and never reuses an identifier.

use axum::async_trait;
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;

use crate::error::AppError;

/// Name of the browser cookie carrying the session identifier
pub const SESSION_COOKIE: &str = "session_id";

/// Generate a fresh opaque session identifier.
///
/// UUID v4, so identifiers are globally unique and never reused.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Key-value session storage with per-entry expiration.
///
/// Abstracted so tests can substitute deterministic fakes for the
/// real store. Cookie transport is a separate concern handled by the
/// route layer.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the identity for a session identifier.
    ///
    /// Returns `None` for unknown or expired identifiers.
    async fn get(&self, session_id: &str) -> Result<Option<String>, AppError>;

    /// Store an identifier -> identity mapping with a time-to-live.
    async fn put(&self, session_id: &str, username: &str, ttl: Duration) -> Result<(), AppError>;

    /// Remove a session. Deleting an unknown identifier is not an error.
    async fn delete(&self, session_id: &str) -> Result<(), AppError>;
}

/// Stored session entry
#[derive(Debug, Clone)]
struct SessionEntry {
    username: String,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// In-memory session store (volatile, cleared on restart)
///
/// Uses Moka for concurrent access with a time-to-live backstop; each
/// entry also carries its own expiry timestamp which is checked on
/// every read, so a lookup never returns a stale identity.
pub struct MemorySessionStore {
    entries: Cache<String, SessionEntry>,
}

impl MemorySessionStore {
    /// Create a new store.
    ///
    /// # Arguments
    /// * `max_ttl` - Upper bound on entry lifetime, used as the cache
    ///   eviction time-to-live
    pub fn new(max_ttl: Duration) -> Self {
        let ttl = max_ttl
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(86_400));
        let entries = Cache::builder().time_to_live(ttl).build();

        Self { entries }
    }

    /// Number of entries currently held, after pending maintenance.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<String>, AppError> {
        use crate::metrics::{SESSION_HITS_TOTAL, SESSION_MISSES_TOTAL};

        let Some(entry) = self.entries.get(session_id).await else {
            SESSION_MISSES_TOTAL.inc();
            return Ok(None);
        };

        if entry.is_expired() {
            self.entries.invalidate(session_id).await;
            SESSION_MISSES_TOTAL.inc();
            return Ok(None);
        }

        SESSION_HITS_TOTAL.inc();
        Ok(Some(entry.username))
    }

    async fn put(
        &self,
        session_id: &str,
        username: &str,
        ttl: Duration,
    ) -> Result<(), AppError> {
        let entry = SessionEntry {
            username: username.to_string(),
            expires_at: Utc::now() + ttl,
        };
        self.entries.insert(session_id.to_string(), entry).await;

        use crate::metrics::SESSIONS_ACTIVE;
        SESSIONS_ACTIVE.set(self.entries.entry_count() as i64);

        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), AppError> {
        self.entries.invalidate(session_id).await;

        use crate::metrics::SESSIONS_ACTIVE;
        SESSIONS_ACTIVE.set(self.entries.entry_count() as i64);

        Ok(())
    }
}
