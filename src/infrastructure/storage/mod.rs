//! In-memory session storage

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::domain::entities::UserSession;
use crate::domain::traits::SessionStore;

/// HashMap-backed session store
///
/// Sessions never expire unless an idle limit is set; with a limit, a
/// session idle longer than it is dropped the next time it is looked up.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<String, UserSession>,
    idle_limit: Option<Duration>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_limit(mut self, minutes: Option<u64>) -> Self {
        self.idle_limit = minutes
            .filter(|m| *m > 0)
            .and_then(|m| i64::try_from(m).ok())
            .and_then(Duration::try_minutes);
        self
    }

    fn evict_if_idle(&mut self, user_id: &str) {
        let Some(limit) = self.idle_limit else {
            return;
        };
        let expired = self
            .sessions
            .get(user_id)
            .is_some_and(|s| Utc::now() - s.updated_at > limit);
        if expired {
            tracing::debug!("Session for {} expired after idling", user_id);
            self.sessions.remove(user_id);
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&mut self, user_id: &str) -> Option<&UserSession> {
        self.evict_if_idle(user_id);
        self.sessions.get(user_id)
    }

    fn get_mut(&mut self, user_id: &str) -> Option<&mut UserSession> {
        self.evict_if_idle(user_id);
        self.sessions.get_mut(user_id)
    }

    fn put(&mut self, session: UserSession) {
        self.sessions.insert(session.user_id.clone(), session);
    }

    fn remove(&mut self, user_id: &str) -> Option<UserSession> {
        self.sessions.remove(user_id)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FlightStep, Flow, QuestionStep};

    #[test]
    fn test_put_overwrites_existing_session() {
        let mut store = MemorySessionStore::new();
        store.put(UserSession::new("u1", Flow::Flight(FlightStep::Dates)));
        store.put(UserSession::new("u1", Flow::Question(QuestionStep::MenuSelection)));

        assert_eq!(store.len(), 1);
        assert!(matches!(store.get("u1").unwrap().flow, Flow::Question(_)));
    }

    #[test]
    fn test_remove_deletes() {
        let mut store = MemorySessionStore::new();
        store.put(UserSession::new("u1", Flow::Flight(FlightStep::Name)));
        assert!(store.remove("u1").is_some());
        assert!(store.is_empty());
        assert!(!store.contains("u1"));
    }

    #[test]
    fn test_sessions_persist_without_idle_limit() {
        let mut store = MemorySessionStore::new();
        let mut session = UserSession::new("u1", Flow::Flight(FlightStep::Name));
        session.updated_at = Utc::now() - Duration::days(30);
        store.put(session);
        assert!(store.contains("u1"));
    }

    #[test]
    fn test_idle_session_is_evicted() {
        let mut store = MemorySessionStore::new().with_idle_limit(Some(10));
        let mut stale = UserSession::new("stale", Flow::Flight(FlightStep::Name));
        stale.updated_at = Utc::now() - Duration::minutes(11);
        store.put(stale);
        store.put(UserSession::new("fresh", Flow::Flight(FlightStep::Name)));

        assert!(store.get("stale").is_none());
        assert!(store.get("fresh").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_idle_limit_disables_expiry() {
        let mut store = MemorySessionStore::new().with_idle_limit(Some(0));
        let mut session = UserSession::new("u1", Flow::Flight(FlightStep::Name));
        session.updated_at = Utc::now() - Duration::days(1);
        store.put(session);
        assert!(store.contains("u1"));
    }

    #[test]
    fn test_out_of_range_idle_limit_disables_expiry() {
        for minutes in [i64::MAX as u64, u64::MAX] {
            let mut store = MemorySessionStore::new().with_idle_limit(Some(minutes));
            let mut session = UserSession::new("u1", Flow::Flight(FlightStep::Name));
            session.updated_at = Utc::now() - Duration::days(365);
            store.put(session);
            assert!(store.get("u1").is_some());
        }
    }
}
