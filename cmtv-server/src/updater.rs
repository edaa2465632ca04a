//! Daily playlist auto-update
//!
//! On start the service checks whether the playlist is missing or stale and
//! updates it right away, then runs every day at the configured local time.
//! Runs never overlap: a trigger arriving while an update is in flight is
//! skipped.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use cmtv_common::config::{ScheduleConfig, SourceKind};
use cmtv_common::{time, Playlist, PlaylistStore};
use cmtv_scraper::{JobReport, RunOptions, ScrapeJob, ScrapeResult};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Runs a scrape for one source
#[async_trait]
pub trait UpdateJob: Send + Sync {
    async fn run_source(&self, source: SourceKind) -> ScrapeResult<JobReport>;
}

#[async_trait]
impl UpdateJob for ScrapeJob {
    async fn run_source(&self, source: SourceKind) -> ScrapeResult<JobReport> {
        self.run(source, RunOptions::default()).await
    }
}

/// Result of one source within an update cycle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    pub source: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<JobReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a trigger
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum UpdateOutcome {
    /// The cycle ran; individual sources may still have failed
    #[serde(rename_all = "camelCase")]
    Ran {
        finished_at: String,
        results: Vec<SourceResult>,
    },
    /// Another cycle was already in flight
    Skipped,
}

/// Service status as reported over HTTP
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub is_running: bool,
    pub last_update: Option<String>,
    pub next_update: String,
}

/// Next occurrence of `hour:minute` strictly after `now`, in `now`'s zone
pub fn next_scheduled_update<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32, minute: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let at = |date: NaiveDate| {
        date.and_hms_opt(hour, minute, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
    };

    let today = now.date_naive();
    if let Some(candidate) = at(today) {
        if candidate > *now {
            return candidate;
        }
    }

    today
        .succ_opt()
        .and_then(at)
        .unwrap_or_else(|| now.clone() + ChronoDuration::days(1))
}

/// True when the playlist is missing, undated, or older than `stale_after`
pub fn needs_initial_update(
    playlist: Option<&Playlist>,
    now: DateTime<Utc>,
    stale_after: ChronoDuration,
) -> bool {
    let Some(playlist) = playlist else {
        return true;
    };
    match playlist.last_updated_at() {
        Some(last_updated) => now - last_updated >= stale_after,
        None => true,
    }
}

/// Clears the running flag when a cycle ends, however it ends
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Scheduled, non-reentrant playlist updater
pub struct AutoUpdateService {
    job: Arc<dyn UpdateJob>,
    store: PlaylistStore,
    schedule: ScheduleConfig,
    running: AtomicBool,
    last_update: Mutex<Option<DateTime<Utc>>>,
}

impl AutoUpdateService {
    pub fn new(job: Arc<dyn UpdateJob>, store: PlaylistStore, schedule: ScheduleConfig) -> Self {
        Self {
            job,
            store,
            schedule,
            running: AtomicBool::new(false),
            last_update: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> UpdateStatus {
        let next = next_scheduled_update(&Local::now(), self.schedule.hour, self.schedule.minute);
        UpdateStatus {
            is_running: self.is_running(),
            last_update: self.last_update().map(time::to_iso_string),
            next_update: time::to_iso_string(next.with_timezone(&Utc)),
        }
    }

    /// Run every configured source once, unless a cycle is already running
    ///
    /// A failing source is logged and the remaining sources still run.
    pub async fn trigger(&self) -> UpdateOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Update already in progress, skipping");
            return UpdateOutcome::Skipped;
        }
        let _guard = RunningGuard(&self.running);

        info!(sources = ?self.schedule.sources, "Starting playlist update");

        let mut results = Vec::with_capacity(self.schedule.sources.len());
        for &source in &self.schedule.sources {
            match self.job.run_source(source).await {
                Ok(report) => results.push(SourceResult {
                    source,
                    report: Some(report),
                    error: None,
                }),
                Err(e) => {
                    error!(source = %source, "Update failed: {}", e);
                    results.push(SourceResult {
                        source,
                        report: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let finished = time::now();
        *self.last_update.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(finished);

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        info!(failed, total = results.len(), "Playlist update finished");

        UpdateOutcome::Ran {
            finished_at: time::to_iso_string(finished),
            results,
        }
    }

    /// Update now when the stored playlist is missing or stale
    pub async fn run_initial_check(&self) -> Option<UpdateOutcome> {
        let playlist = self.store.load();
        let stale_after = ChronoDuration::hours(i64::from(self.schedule.stale_after_hours));

        if needs_initial_update(playlist.as_ref(), time::now(), stale_after) {
            match &playlist {
                Some(_) => info!("Playlist is out of date, running update now"),
                None => info!("No playlist found, running initial update"),
            }
            Some(self.trigger().await)
        } else {
            info!("Playlist is up to date");
            None
        }
    }

    /// Spawn the initial check followed by the daily schedule
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            "Auto-update scheduled daily at {:02}:{:02}",
            self.schedule.hour, self.schedule.minute
        );

        tokio::spawn(async move {
            self.run_initial_check().await;

            loop {
                let now = Local::now();
                let next = next_scheduled_update(&now, self.schedule.hour, self.schedule.minute);
                let wait = (next - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::from_secs(60));
                info!("Next playlist update at {}", next.to_rfc3339());

                tokio::time::sleep(wait).await;
                self.trigger().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_next_update_later_today() {
        let next = next_scheduled_update(&at(2025, 10, 16, 1, 30), 3, 0);
        assert_eq!(next, at(2025, 10, 16, 3, 0));
    }

    #[test]
    fn test_next_update_tomorrow_when_passed() {
        let next = next_scheduled_update(&at(2025, 10, 16, 14, 0), 3, 0);
        assert_eq!(next, at(2025, 10, 17, 3, 0));
    }

    #[test]
    fn test_next_update_at_exact_time_is_tomorrow() {
        let next = next_scheduled_update(&at(2025, 10, 31, 3, 0), 3, 0);
        assert_eq!(next, at(2025, 11, 1, 3, 0));
    }

    fn playlist_updated(last_updated: &str) -> Playlist {
        Playlist {
            last_updated: last_updated.to_string(),
            ..Playlist::default()
        }
    }

    #[test]
    fn test_initial_update_decisions() {
        let now = Utc.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap();
        let day = ChronoDuration::hours(24);

        assert!(needs_initial_update(None, now, day));
        assert!(needs_initial_update(Some(&playlist_updated("garbage")), now, day));
        assert!(needs_initial_update(
            Some(&playlist_updated("2025-10-15T12:00:00.000Z")),
            now,
            day
        ));
        assert!(!needs_initial_update(
            Some(&playlist_updated("2025-10-15T13:00:00.000Z")),
            now,
            day
        ));
    }
}
