// Session cache
//
// Single-slot store for the one session a client instance manages.
// Expiry is checked on every read against an injected clock so tests can
// drive time deterministically.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::session::Session;

/// Pluggable time source for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock. The production time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Entry {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Single-entry session store with expiry-on-read.
///
/// `get` and `set` are individually atomic (interior lock); there is no
/// single-flight discipline around the read-then-login sequence, so two
/// tasks racing a cache miss may both log in. Each produces a valid
/// session and the last write wins.
pub struct TokenCache {
    slot: RwLock<Option<Entry>>,
    clock: Box<dyn Clock>,
}

impl TokenCache {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            clock,
        }
    }

    /// The cached session, if one is present and not expired.
    ///
    /// An entry whose `expires_at` is at or before the current time is
    /// treated as absent and evicted.
    pub fn get(&self) -> Option<Session> {
        let now = self.clock.now();
        {
            let slot = self.slot.read().expect("session cache lock poisoned");
            match slot.as_ref() {
                Some(entry) if now < entry.expires_at => return Some(entry.session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Observed an expired entry; re-check under the write lock so a
        // concurrent login's fresh session is not thrown away.
        let mut slot = self.slot.write().expect("session cache lock poisoned");
        if let Some(entry) = slot.as_ref() {
            if self.clock.now() >= entry.expires_at {
                *slot = None;
            }
        }
        None
    }

    /// Store a session. Overwrites any previous entry, valid or not.
    pub fn set(&self, session: Session, expires_at: DateTime<Utc>) {
        let mut slot = self.slot.write().expect("session cache lock poisoned");
        *slot = Some(Entry {
            session,
            expires_at,
        });
    }

    /// Remove and return the current entry, expired or not.
    ///
    /// Used by logout, which wants the token to present to the logout
    /// endpoint even when it is past its expiry.
    pub fn take(&self) -> Option<Session> {
        let mut slot = self.slot.write().expect("session cache lock poisoned");
        slot.take().map(|entry| entry.session)
    }

    /// Empty the slot.
    pub fn clear(&self) {
        let mut slot = self.slot.write().expect("session cache lock poisoned");
        *slot = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Duration;

    use super::*;

    /// Test clock with a settable current time, shared by handle.
    #[derive(Clone)]
    struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session::new(
            "header.payload.sig".to_owned(),
            "csrf-abc".to_owned(),
            expires_at,
        )
    }

    fn t0() -> DateTime<Utc> {
        "2021-10-11T14:33:00Z".parse().unwrap()
    }

    #[test]
    fn empty_cache_returns_none() {
        let cache = TokenCache::new(Box::new(ManualClock::at(t0())));
        assert!(cache.get().is_none());
    }

    #[test]
    fn entry_returned_before_expiry() {
        let expires_at = t0() + Duration::minutes(50);
        let cache = TokenCache::new(Box::new(ManualClock::at(t0())));
        cache.set(session(expires_at), expires_at);

        let cached = cache.get().unwrap();
        assert_eq!(cached.csrf_token(), "csrf-abc");
    }

    #[test]
    fn entry_absent_at_exact_expiry() {
        let cache = TokenCache::new(Box::new(ManualClock::at(t0())));
        cache.set(session(t0()), t0());
        assert!(cache.get().is_none());
    }

    #[test]
    fn entry_evicted_after_expiry() {
        let expires_at = t0() + Duration::minutes(50);
        let clock = ManualClock::at(t0());
        let cache = TokenCache::new(Box::new(clock.clone()));
        cache.set(session(expires_at), expires_at);
        assert!(cache.get().is_some());

        clock.advance(Duration::minutes(52));
        assert!(cache.get().is_none());
        // The expired entry is gone, not just hidden.
        assert!(cache.take().is_none());
    }

    #[test]
    fn newest_entry_overwrites() {
        let first = t0() + Duration::minutes(10);
        let second = t0() + Duration::minutes(20);
        let cache = TokenCache::new(Box::new(ManualClock::at(t0())));
        cache.set(session(first), first);
        cache.set(session(second), second);

        assert_eq!(cache.get().unwrap().expires_at(), second);
    }

    #[test]
    fn take_returns_expired_entry() {
        let expired = t0() - Duration::minutes(5);
        let cache = TokenCache::new(Box::new(ManualClock::at(t0())));
        cache.set(session(expired), expired);

        assert!(cache.take().is_some());
        assert!(cache.take().is_none());
    }

    #[test]
    fn clear_empties_the_slot() {
        let expires_at = t0() + Duration::minutes(50);
        let cache = TokenCache::new(Box::new(ManualClock::at(t0())));
        cache.set(session(expires_at), expires_at);
        cache.clear();
        assert!(cache.get().is_none());
    }
}
