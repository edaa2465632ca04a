//! Live viewer counter
//!
//! A viewer is identified by a short IP + user-agent fingerprint. Each
//! request "touches" the viewer; viewers not seen within the TTL stop
//! counting and are dropped by a periodic sweep. The active count is
//! published on a `watch` channel for the SSE endpoint.

use axum::http::HeaderMap;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const ID_PART_LEN: usize = 8;

/// Fingerprint a client from its request headers and socket address
///
/// First 8 characters of the client IP (`x-forwarded-for`, `x-real-ip`,
/// socket address, else "unknown") joined by `_` to the first 8
/// characters of the user agent.
pub fn viewer_id(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let ip = header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .or_else(|| remote.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = header("user-agent").unwrap_or_else(|| "unknown".to_string());

    format!(
        "{}_{}",
        ip.chars().take(ID_PART_LEN).collect::<String>(),
        user_agent.chars().take(ID_PART_LEN).collect::<String>()
    )
}

/// Tracks last-seen times per viewer
pub struct ViewerCounter {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Instant>>,
    count_tx: watch::Sender<usize>,
}

impl ViewerCounter {
    pub fn new(ttl: Duration) -> Self {
        let (count_tx, _) = watch::channel(0);
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
            count_tx,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record activity for `viewer_id`; returns true for a viewer not
    /// currently tracked
    pub fn touch(&self, viewer_id: &str, now: Instant) -> bool {
        let was_new = self.sessions().insert(viewer_id.to_string(), now).is_none();
        if was_new {
            info!(viewer_id = %viewer_id, "New viewer connected");
        }
        self.publish(now);
        was_new
    }

    /// Viewers seen strictly within the TTL
    pub fn active_count(&self, now: Instant) -> usize {
        self.sessions()
            .values()
            .filter(|seen| now.saturating_duration_since(**seen) < self.ttl)
            .count()
    }

    /// Tracked viewers, active or not yet swept
    pub fn total(&self) -> usize {
        self.sessions().len()
    }

    /// Drop viewers last seen longer than the TTL ago
    pub fn sweep(&self, now: Instant) -> Vec<String> {
        let removed: Vec<String> = {
            let mut sessions = self.sessions();
            let stale: Vec<String> = sessions
                .iter()
                .filter(|(_, seen)| now.saturating_duration_since(**seen) > self.ttl)
                .map(|(id, _)| id.clone())
                .collect();
            for id in &stale {
                sessions.remove(id);
            }
            stale
        };

        for id in &removed {
            info!(viewer_id = %id, "Viewer disconnected");
        }
        self.publish(now);
        removed
    }

    /// Receiver for active-count changes
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count_tx.subscribe()
    }

    fn publish(&self, now: Instant) {
        let count = self.active_count(now);
        let changed = self.count_tx.send_if_modified(|current| {
            if *current == count {
                false
            } else {
                *current = count;
                true
            }
        });
        if changed {
            debug!(active = count, "Viewer count changed");
        }
    }

    /// Spawn the periodic sweep task
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep(Instant::now());
            }
        })
    }
}
