use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::{MemoryBackend, SessionBackend};
use super::clock::{Clock, SystemClock};

/// Session validity window in minutes.
/// The backend issues tokens that are good for 3 hours.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 180;

/// The persisted session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    /// A window too large to represent saturates at the latest instant chrono supports.
    pub fn issue(token: &str, user_id: i64, now: DateTime<Utc>, validity: Duration) -> Self {
        Self {
            token: token.to_string(),
            user_id,
            created_at: now,
            expires_at: now
                .checked_add_signed(validity)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// A session stops being usable at the instant it reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }
}

/// Owner of the one session record for this device.
///
/// Construct it once at startup and share it behind an `Arc`. Every accessor
/// takes the internal lock for its whole check-and-act, so callers on
/// different threads always see the token, user id and expiry from the same
/// `save_session` call.
///
/// `token()`, `user_id()` and `session()` clear an expired record as a side
/// effect; `is_valid()` and `peek()` never modify anything.
pub struct CredentialStore {
    backend: Box<dyn SessionBackend>,
    clock: Arc<dyn Clock>,
    validity: Duration,
    data: Mutex<Option<SessionData>>,
}

impl CredentialStore {
    /// Open a store on the wall clock with the default validity window.
    pub fn new(backend: impl SessionBackend + 'static) -> Self {
        Self::open(
            backend,
            Arc::new(SystemClock),
            Duration::minutes(DEFAULT_VALIDITY_MINUTES),
        )
    }

    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open a store, loading any persisted session from `backend`.
    ///
    /// A persisted session that has already expired is deleted. A record
    /// that cannot be read is logged and treated as absent.
    pub fn open(
        backend: impl SessionBackend + 'static,
        clock: Arc<dyn Clock>,
        validity: Duration,
    ) -> Self {
        let backend: Box<dyn SessionBackend> = Box::new(backend);

        let loaded = match backend.load() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Could not load persisted session, starting signed out");
                None
            }
        };

        let data = match loaded {
            Some(data) if data.is_expired_at(clock.now()) => {
                info!("Persisted session has expired, removing it");
                if let Err(e) = backend.remove() {
                    warn!(error = %e, "Failed to remove expired session");
                }
                None
            }
            other => other,
        };

        Self {
            backend,
            clock,
            validity,
            data: Mutex::new(data),
        }
    }

    /// Start a new session, replacing any existing one.
    pub fn save_session(&self, token: &str, user_id: i64) {
        let data = SessionData::issue(token, user_id, self.clock.now(), self.validity);
        let mut guard = self.lock();
        if let Err(e) = self.backend.store(&data) {
            warn!(error = %e, "Failed to persist session, keeping it in memory only");
        }
        info!(user_id, expires_at = %data.expires_at, "Session saved");
        *guard = Some(data);
    }

    /// The bearer token, or `None` when signed out or expired.
    pub fn token(&self) -> Option<String> {
        self.live_session().map(|d| d.token)
    }

    /// The signed-in user's id, or `None` when signed out or expired.
    pub fn user_id(&self) -> Option<i64> {
        self.live_session().map(|d| d.user_id)
    }

    /// The full record, with the same expiry handling as `token()`.
    pub fn session(&self) -> Option<SessionData> {
        self.live_session()
    }

    /// Check if the session exists and has not expired. Does not clear anything.
    pub fn is_valid(&self) -> bool {
        let now = self.clock.now();
        self.lock()
            .as_ref()
            .map(|d| !d.is_expired_at(now))
            .unwrap_or(false)
    }

    /// The record if still valid, without clearing an expired one.
    pub fn peek(&self) -> Option<SessionData> {
        let now = self.clock.now();
        self.lock()
            .as_ref()
            .filter(|d| !d.is_expired_at(now))
            .cloned()
    }

    /// Clear the record if it has expired. Returns true if something was removed.
    pub fn reap_expired(&self) -> bool {
        let now = self.clock.now();
        let mut guard = self.lock();
        let expired = guard.as_ref().is_some_and(|d| d.is_expired_at(now));
        if expired {
            info!("Session expired, clearing");
            self.clear_locked(&mut guard);
        }
        expired
    }

    /// Remove the session. Safe to call when already signed out.
    pub fn clear(&self) {
        let mut guard = self.lock();
        self.clear_locked(&mut guard);
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn live_session(&self) -> Option<SessionData> {
        let now = self.clock.now();
        let mut guard = self.lock();
        match guard.clone() {
            Some(d) if !d.is_expired_at(now) => Some(d),
            Some(_) => {
                info!("Session expired, clearing");
                self.clear_locked(&mut guard);
                None
            }
            None => None,
        }
    }

    fn clear_locked(&self, guard: &mut MutexGuard<'_, Option<SessionData>>) {
        if let Err(e) = self.backend.remove() {
            warn!(error = %e, "Failed to remove persisted session");
        }
        if guard.take().is_some() {
            debug!("Session cleared");
        }
    }

    // A panic while holding the lock cannot leave the record half written,
    // since it is only ever replaced whole.
    fn lock(&self) -> MutexGuard<'_, Option<SessionData>> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}
