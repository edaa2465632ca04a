//! Integration tests for cmtv-server HTTP endpoints
//!
//! Each test builds the router over a temporary playlist file and public
//! directory and drives it with `oneshot`; scrape jobs are replaced by a
//! recording fake.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cmtv_common::config::{ScheduleConfig, SourceKind};
use cmtv_common::{Playlist, PlaylistStore, Song};
use cmtv_scraper::{JobReport, ScrapeError, ScrapeResult};
use cmtv_server::{
    build_router, AppState, AutoUpdateService, UpdateJob, UpdateOutcome, ViewerCounter,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::util::ServiceExt; // for `oneshot` method

#[derive(Default)]
struct FakeJob {
    calls: Mutex<Vec<SourceKind>>,
    fail_on: Option<SourceKind>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl UpdateJob for FakeJob {
    async fn run_source(&self, source: SourceKind) -> ScrapeResult<JobReport> {
        self.calls.lock().unwrap().push(source);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_on == Some(source) {
            return Err(ScrapeError::Network("connection reset".into()));
        }
        Ok(JobReport {
            source,
            scraped: 1,
            total_songs: 1,
            added: 1,
            skipped_duplicates: 0,
            dropped_missing_id: 0,
            new_flagged: 1,
            saved: true,
        })
    }
}

struct TestServer {
    _dir: TempDir,
    state: AppState,
    job: Arc<FakeJob>,
}

impl TestServer {
    fn new(job: FakeJob) -> Self {
        let dir = TempDir::new().unwrap();
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(&public_dir).unwrap();
        std::fs::write(public_dir.join("index.html"), "<h1>Country MTV</h1>").unwrap();

        let store = PlaylistStore::new(public_dir.join("playlist.json"));
        let job = Arc::new(job);
        let schedule = ScheduleConfig {
            sources: vec![SourceKind::Youtube, SourceKind::Spotify],
            ..ScheduleConfig::default()
        };
        let updater = Arc::new(AutoUpdateService::new(job.clone(), store.clone(), schedule));
        let viewers = Arc::new(ViewerCounter::new(Duration::from_secs(15)));

        let state = AppState::new(store, public_dir, viewers, updater);
        Self { _dir: dir, state, job }
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

fn song(position: u32, id: &str) -> Song {
    Song {
        position,
        title: format!("Title {}", position),
        artist: "Artist".into(),
        youtube_id: id.into(),
        is_new: None,
        added_date: None,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new(FakeJob::default());

    let response = server.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "cmtv-server");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_static_index_served_at_root() {
    let server = TestServer::new(FakeJob::default());

    let response = server.router().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>Country MTV</h1>");
}

#[tokio::test]
async fn test_playlist_missing_is_404() {
    let server = TestServer::new(FakeJob::default());

    let response = server.router().oneshot(get("/api/playlist")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_playlist_returned_in_stored_order() {
    let server = TestServer::new(FakeJob::default());
    server
        .state
        .store
        .save(&Playlist {
            last_updated: "2025-10-16T03:00:00.000Z".into(),
            source: "test".into(),
            songs: vec![song(1, "id1"), song(2, "id2")],
        })
        .unwrap();

    let response = server.router().oneshot(get("/api/playlist")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["lastUpdated"], "2025-10-16T03:00:00.000Z");
    assert_eq!(json["songs"][0]["youtubeId"], "id1");
    assert_eq!(json["songs"][1]["position"], 2);
}

#[tokio::test]
async fn test_shuffled_playlist_drops_unplayable_songs() {
    let server = TestServer::new(FakeJob::default());
    server
        .state
        .store
        .save(&Playlist {
            last_updated: "2025-10-16T03:00:00.000Z".into(),
            source: "test".into(),
            songs: vec![song(1, "id1"), song(2, ""), song(3, "id3")],
        })
        .unwrap();

    let response = server
        .router()
        .oneshot(get("/api/playlist?shuffle=true"))
        .await
        .unwrap();

    let json = body_json(response).await;
    let mut ids: Vec<&str> = json["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["youtubeId"].as_str().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["id1", "id3"]);
    assert_eq!(json["source"], "test");
}

#[tokio::test]
async fn test_viewer_count_get_counts_distinct_viewers() {
    let server = TestServer::new(FakeJob::default());

    let request = |ua: &str| {
        Request::builder()
            .uri("/api/viewer-count")
            .header("x-forwarded-for", "203.0.113.9")
            .header("user-agent", ua)
            .body(Body::empty())
            .unwrap()
    };

    let first = body_json(server.router().oneshot(request("Firefox/131")).await.unwrap()).await;
    assert_eq!(first["count"], 1);
    assert_eq!(first["source"], "real-count");
    assert_eq!(first["viewerId"], "203.0.11_Firefox/");

    let again = body_json(server.router().oneshot(request("Firefox/131")).await.unwrap()).await;
    assert_eq!(again["count"], 1);

    let second = body_json(server.router().oneshot(request("Safari/17")).await.unwrap()).await;
    assert_eq!(second["count"], 2);
    assert_eq!(second["active"], 2);
    assert_eq!(second["viewers"], 2);
}

#[tokio::test]
async fn test_viewer_heartbeat_post() {
    let server = TestServer::new(FakeJob::default());

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/viewer-count")
                .header("user-agent", "Chrome/130")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "heartbeat received");
    assert_eq!(server.state.viewers.total(), 1);
}

#[tokio::test]
async fn test_viewer_count_other_methods_rejected() {
    let server = TestServer::new(FakeJob::default());

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/viewer-count")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["error"], "Method not allowed");
}

#[tokio::test]
async fn test_viewer_count_allows_any_origin() {
    let server = TestServer::new(FakeJob::default());

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .uri("/api/viewer-count")
                .header("origin", "https://example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_event_stream_is_sse() {
    let server = TestServer::new(FakeJob::default());

    let response = server.router().oneshot(get("/api/events")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
}

#[tokio::test]
async fn test_update_status_before_any_run() {
    let server = TestServer::new(FakeJob::default());

    let response = server.router().oneshot(get("/api/update/status")).await.unwrap();

    let json = body_json(response).await;
    assert_eq!(json["isRunning"], false);
    assert!(json["lastUpdate"].is_null());
    assert!(json["nextUpdate"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_trigger_runs_all_sources_despite_failure() {
    let server = TestServer::new(FakeJob {
        fail_on: Some(SourceKind::Youtube),
        ..FakeJob::default()
    });

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/update/trigger")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["outcome"], "ran");
    assert_eq!(json["results"][0]["source"], "youtube");
    assert!(json["results"][0]["error"].is_string());
    assert_eq!(json["results"][1]["report"]["added"], 1);
    assert_eq!(
        *server.job.calls.lock().unwrap(),
        vec![SourceKind::Youtube, SourceKind::Spotify]
    );
    assert!(server.state.updater.last_update().is_some());
}

#[tokio::test]
async fn test_trigger_while_running_is_conflict() {
    let gate = Arc::new(Notify::new());
    let server = TestServer::new(FakeJob {
        gate: Some(gate.clone()),
        ..FakeJob::default()
    });

    let updater = server.state.updater.clone();
    let in_flight = tokio::spawn(async move { updater.trigger().await });
    while !server.state.updater.is_running() {
        tokio::task::yield_now().await;
    }

    let response = server
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/update/trigger")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // One permit per configured source
    gate.notify_one();
    while server.job.calls.lock().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    gate.notify_one();
    in_flight.await.unwrap();

    assert!(!server.state.updater.is_running());
    assert_eq!(server.job.calls.lock().unwrap().len(), 2);
}

fn playlist_updated_at(last_updated: chrono::DateTime<chrono::Utc>) -> Playlist {
    Playlist {
        last_updated: cmtv_common::time::to_iso_string(last_updated),
        source: "test".into(),
        songs: vec![song(1, "id1")],
    }
}

#[tokio::test]
async fn test_initial_check_runs_one_cycle_without_playlist() {
    let server = TestServer::new(FakeJob::default());

    let outcome = server.state.updater.run_initial_check().await;

    assert!(matches!(outcome, Some(UpdateOutcome::Ran { .. })));
    assert_eq!(
        *server.job.calls.lock().unwrap(),
        vec![SourceKind::Youtube, SourceKind::Spotify]
    );
}

#[tokio::test]
async fn test_initial_check_runs_one_cycle_for_stale_playlist() {
    let server = TestServer::new(FakeJob::default());
    server
        .state
        .store
        .save(&playlist_updated_at(chrono::Utc::now() - chrono::Duration::hours(30)))
        .unwrap();

    let outcome = server.state.updater.run_initial_check().await;

    assert!(matches!(outcome, Some(UpdateOutcome::Ran { .. })));
    assert_eq!(server.job.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_initial_check_skips_fresh_playlist() {
    let server = TestServer::new(FakeJob::default());
    server
        .state
        .store
        .save(&playlist_updated_at(chrono::Utc::now() - chrono::Duration::hours(2)))
        .unwrap();

    let outcome = server.state.updater.run_initial_check().await;

    assert!(outcome.is_none());
    assert!(server.job.calls.lock().unwrap().is_empty());
    assert!(server.state.updater.last_update().is_none());
}
