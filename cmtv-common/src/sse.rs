//! Server-Sent Events (SSE) utilities

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Heartbeat interval for SSE connections
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Stream a `watch` value as named SSE events
///
/// Sends the current value on connect, then one event per change. A comment
/// heartbeat keeps idle connections open. The stream ends when the sender is
/// dropped.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     cmtv_common::sse::watch_sse_stream("viewerCount", state.viewers.subscribe())
/// }
/// ```
pub fn watch_sse_stream<T>(
    event_name: &'static str,
    mut rx: watch::Receiver<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: ToString + Clone + Send + Sync + 'static,
{
    info!("New SSE client subscribed to {} events", event_name);

    let stream = async_stream::stream! {
        let initial = rx.borrow_and_update().clone();
        yield Ok(Event::default().event(event_name).data(initial.to_string()));

        while rx.changed().await.is_ok() {
            let value = rx.borrow_and_update().clone();
            debug!("SSE: sending {} = {}", event_name, value.to_string());
            yield Ok(Event::default().event(event_name).data(value.to_string()));
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
