use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use uuid::Uuid;

use crate::principal::Principal;

/// Opaque session identifier carried by the session cookie.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a raw cookie value. Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for authenticated sessions.
///
/// Implementations are shared across concurrent requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a new session for the principal.
    async fn create(&self, principal: Principal) -> SessionId;

    /// Principal bound to a live session, if any.
    async fn get(&self, id: &SessionId) -> Option<Principal>;

    /// Invalidate a session. Returns `true` if it was live.
    async fn invalidate(&self, id: &SessionId) -> bool;
}

struct Session {
    principal: Principal,
    last_access: Instant,
}

/// Process-local session store.
///
/// With an idle timeout, a session not read for longer than the timeout is
/// gone: lookups drop it and every new login sweeps the stale ones.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Session>,
    idle_timeout: Option<Duration>,
}

impl InMemorySessionStore {
    /// Store whose sessions never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout: Some(idle_timeout),
        }
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        self.idle_timeout
            .is_some_and(|timeout| now.saturating_duration_since(session.last_access) > timeout)
    }

    /// Drop idle sessions. Returns how many were removed.
    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !self.is_expired(session, now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::debug!(purged, "idle sessions purged");
        }
        purged
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, principal: Principal) -> SessionId {
        self.purge_expired();
        let id = SessionId::generate();
        tracing::debug!(principal = principal.name(), "session created");
        self.sessions.insert(
            id.clone(),
            Session {
                principal,
                last_access: Instant::now(),
            },
        );
        id
    }

    async fn get(&self, id: &SessionId) -> Option<Principal> {
        let now = Instant::now();
        if self
            .sessions
            .remove_if(id, |_, session| self.is_expired(session, now))
            .is_some()
        {
            tracing::debug!("idle session expired");
            return None;
        }
        let mut session = self.sessions.get_mut(id)?;
        session.last_access = now;
        Some(session.principal.clone())
    }

    async fn invalidate(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }
}
