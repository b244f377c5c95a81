//! Per-session, per-field validation retry counters.
//!
//! This is the only state the advisor keeps between turns. It is process
//! local and lost on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info};

use super::state::IntakeField;

/// Storage for intake retry counters, keyed by session id.
pub trait RetryStore: Send + Sync {
    /// Current count; 0 for an unseen session or field.
    fn get(&self, session_id: &str, field: IntakeField) -> u32;

    fn set(&self, session_id: &str, field: IntakeField, count: u32);

    /// Drop every counter for a session. Returns whether anything was removed.
    fn reset(&self, session_id: &str) -> bool;

    /// Drop sessions untouched for at least `max_idle`. Returns how many.
    fn evict_idle(&self, max_idle: Duration) -> usize;

    fn session_count(&self) -> usize;
}

#[derive(Debug)]
struct SessionRetries {
    counts: HashMap<IntakeField, u32>,
    last_touched: Instant,
}

impl SessionRetries {
    fn new() -> Self {
        Self {
            counts: HashMap::new(),
            last_touched: Instant::now(),
        }
    }
}

/// In-memory store. Each session entry is locked independently, so turns for
/// unrelated sessions never contend.
#[derive(Debug, Default)]
pub struct InMemoryRetryStore {
    sessions: DashMap<String, SessionRetries>,
}

impl InMemoryRetryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RetryStore for InMemoryRetryStore {
    fn get(&self, session_id: &str, field: IntakeField) -> u32 {
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                entry.last_touched = Instant::now();
                entry.counts.get(&field).copied().unwrap_or(0)
            }
            None => 0,
        }
    }

    fn set(&self, session_id: &str, field: IntakeField, count: u32) {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionRetries::new);
        entry.counts.insert(field, count);
        entry.last_touched = Instant::now();
        debug!(session_id = session_id, field = %field, count = count, "Retry count updated");
    }

    fn reset(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!(session_id = session_id, "Retry state reset");
        }
        removed
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_touched.elapsed() < max_idle);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!(count = evicted, "Evicted idle retry sessions");
        }
        evicted
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Periodically evict idle sessions from the store.
pub fn spawn_eviction_task(
    store: Arc<dyn RetryStore>,
    every: Duration,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            store.evict_idle(max_idle);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_pairs_default_to_zero() {
        let store = InMemoryRetryStore::new();
        assert_eq!(store.get("nobody", IntakeField::Year), 0);
        // Reading does not create an entry.
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn set_and_get_per_field() {
        let store = InMemoryRetryStore::new();
        store.set("s1", IntakeField::Year, 1);
        store.set("s1", IntakeField::CareerGoals, 3);
        assert_eq!(store.get("s1", IntakeField::Year), 1);
        assert_eq!(store.get("s1", IntakeField::TimePreference), 0);
        assert_eq!(store.get("s1", IntakeField::CareerGoals), 3);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = InMemoryRetryStore::new();
        store.set("a", IntakeField::Year, 2);
        store.set("b", IntakeField::Year, 1);
        assert!(store.reset("a"));
        assert_eq!(store.get("a", IntakeField::Year), 0);
        assert_eq!(store.get("b", IntakeField::Year), 1);
        assert!(!store.reset("a"));
    }

    #[test]
    fn eviction_respects_idle_window() {
        let store = InMemoryRetryStore::new();
        store.set("a", IntakeField::Year, 1);
        store.set("b", IntakeField::Year, 1);
        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.session_count(), 2);
        assert_eq!(store.evict_idle(Duration::ZERO), 2);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn concurrent_sessions_do_not_interfere() {
        let store = Arc::new(InMemoryRetryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let session = format!("s{i}");
                    for n in 0..100 {
                        store.set(&session, IntakeField::Year, n);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.session_count(), 8);
        for i in 0..8 {
            assert_eq!(store.get(&format!("s{i}"), IntakeField::Year), 99);
        }
    }
}
