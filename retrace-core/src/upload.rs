//! Best-effort delivery of finished captures
//!
//! The coordinator materializes a capture into a wire payload and posts
//! it to the collector. Delivery is fire and forget: a failed upload is
//! an accepted loss, logged and dropped, never surfaced to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::buffer::{lock, SharedBuffer};
use crate::collector::CollectorClient;
use crate::config::PageContext;
use crate::event::RecordedEvent;
use crate::gate::PendingCapture;
use crate::window::{WindowSelector, WindowSlice};

/// Wire artifact posted to the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPayload {
    /// Correlation id joining the replay to its error reports
    pub replay_id: String,

    /// Timestamp of the first included event
    pub started_at: DateTime<Utc>,

    /// End of the captured interval
    pub ended_at: DateTime<Utc>,

    /// When the triggering error occurred
    pub error_at: DateTime<Utc>,

    /// Full page URL
    pub url: String,

    /// Path component of the page URL
    pub path: String,

    /// Browser user agent string
    pub user_agent: String,

    /// The captured event stream
    pub events: Vec<RecordedEvent>,
}

/// Schedules and performs delivery of finished captures
pub struct UploadCoordinator {
    collector: Arc<dyn CollectorClient>,
    page: PageContext,
    max_events: usize,
}

impl UploadCoordinator {
    /// Create a coordinator posting through `collector`.
    pub fn new(collector: Arc<dyn CollectorClient>, page: PageContext, max_events: usize) -> Self {
        Self {
            collector,
            page,
            max_events,
        }
    }

    /// Flush a capture: select its window slice and post the payload.
    ///
    /// Synchronous up to the point the POST task is spawned. The
    /// page-hide path calls this while the page is tearing down, so
    /// nothing may be awaited before the network call is issued. Taking
    /// the capture out of its slot before calling makes a second flush
    /// of the same capture impossible.
    pub fn flush(&self, buffer: &SharedBuffer, mut capture: PendingCapture) {
        capture.cancel_timer();

        let events = lock(buffer).snapshot();
        let slice = WindowSelector::select(&events, capture.window, self.max_events);
        if !slice.anchored {
            tracing::debug!(
                replay_id = %capture.replay_id,
                "no full snapshot available; uploading unanchored slice"
            );
        }

        let payload = self.build_payload(&capture, slice);
        let collector = Arc::clone(&self.collector);
        tokio::spawn(async move {
            if let Err(err) = collector.upload(&payload).await {
                tracing::debug!(replay_id = %payload.replay_id, error = %err, "replay upload dropped");
            }
        });
    }

    fn build_payload(&self, capture: &PendingCapture, slice: WindowSlice) -> ReplayPayload {
        // A late flush never extends the capture past its window.
        let ended_at_ms = Utc::now().timestamp_millis().min(capture.window.end_ms);

        ReplayPayload {
            replay_id: capture.replay_id.clone(),
            started_at: datetime_from_ms(slice.started_at_ms),
            ended_at: datetime_from_ms(ended_at_ms),
            error_at: datetime_from_ms(capture.error_at_ms),
            url: self.page.url.clone(),
            path: self.page.path.clone(),
            user_agent: self.page.user_agent.clone(),
            events: slice.events,
        }
    }
}

fn datetime_from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}
