// Session service - per-session view selection and row filters
use crate::application::chart_catalog::ChartCatalog;
use crate::domain::measurement::RowFilter;
use crate::domain::view::{View, ViewRouter};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// UI state owned by one client session
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub router: ViewRouter,
    pub filter: RowFilter,
}

/// Bounds on the in-memory session map
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
        }
    }
}

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionService {
    catalog: Arc<ChartCatalog>,
    limits: SessionLimits,
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl SessionService {
    pub fn new(catalog: Arc<ChartCatalog>, limits: SessionLimits) -> Self {
        Self {
            catalog,
            limits,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot of a session. Unknown or expired sessions start at the
    /// overview with no filter.
    pub async fn get(&self, session_id: &str) -> Session {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(entry) if entry.last_seen.elapsed() < self.limits.idle_timeout => {
                entry.last_seen = Instant::now();
                entry.session.clone()
            }
            _ => Session::default(),
        }
    }

    /// Select a view and return its visible chart slots
    pub async fn select_view(&self, session_id: &str, view: View) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        let session = self.touch(&mut sessions, session_id);
        session.router.select(view, self.catalog.as_ref())
    }

    pub async fn set_filter(&self, session_id: &str, filter: RowFilter) {
        tracing::debug!("Session {} filter set to {:?}", session_id, filter);
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, session_id).filter = filter;
    }

    /// Evict stale sessions, then return the (possibly new) session for `session_id`
    fn touch<'a>(&self, sessions: &'a mut HashMap<String, Entry>, session_id: &str) -> &'a mut Session {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() < self.limits.idle_timeout);

        if !sessions.contains_key(session_id) {
            while sessions.len() >= self.limits.max_sessions.max(1) {
                let Some(oldest) = sessions
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_seen)
                    .map(|(id, _)| id.clone())
                else {
                    break;
                };
                sessions.remove(&oldest);
            }
        }

        let evicted = before.saturating_sub(sessions.len());
        if evicted > 0 {
            tracing::debug!("Evicted {} stale sessions", evicted);
        }

        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| Entry {
            session: Session::default(),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        &mut entry.session
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
