//! Error correlation gate
//!
//! The gate wraps the host transport and watches outgoing records. Error
//! reports are tagged with a replay id so the backend can join the error
//! to its replay, and the first error while no capture is armed opens a
//! pending capture with a delayed flush. The gate is itself a
//! [`Transport`], so wiring is explicit composition rather than any
//! runtime patching of the inner transport.

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use async_trait::async_trait;

use crate::buffer::{lock, SharedBuffer};
use crate::config::ReplayConfig;
use crate::error::Result;
use crate::transport::{TelemetryRecord, Transport};
use crate::upload::UploadCoordinator;
use crate::window::ReplayWindow;

/// Shared slot holding the at-most-one pending capture
pub type PendingSlot = Arc<Mutex<Option<PendingCapture>>>;

/// An armed capture awaiting flush.
///
/// At most one exists per browsing context at any time. Whoever takes it
/// out of the slot owns the flush.
#[derive(Debug)]
pub struct PendingCapture {
    /// Correlation id minted for this capture
    pub replay_id: String,

    /// When the triggering error occurred, milliseconds since the epoch
    pub error_at_ms: i64,

    /// Capture window around the error
    pub window: ReplayWindow,

    /// Armed delayed-flush timer, absent once the timer itself flushes
    pub(crate) flush_timer: Option<JoinHandle<()>>,
}

impl PendingCapture {
    /// Cancel the delayed flush timer if it is still armed.
    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.flush_timer.take() {
            timer.abort();
        }
    }
}

/// Transport wrapper correlating error reports with replay captures
pub struct ErrorCorrelationGate {
    inner: Arc<dyn Transport>,
    buffer: SharedBuffer,
    coordinator: Arc<UploadCoordinator>,
    pending: PendingSlot,
    before_error_ms: i64,
    after_error: std::time::Duration,
}

impl ErrorCorrelationGate {
    /// Wrap `inner`, correlating errors against `buffer` and flushing
    /// through `coordinator`.
    pub fn new(
        inner: Arc<dyn Transport>,
        buffer: SharedBuffer,
        coordinator: Arc<UploadCoordinator>,
        config: &ReplayConfig,
    ) -> Self {
        Self {
            inner,
            buffer,
            coordinator,
            pending: Arc::new(Mutex::new(None)),
            before_error_ms: config.before_error_ms(),
            after_error: config.after_error(),
        }
    }

    /// Handle to the pending capture slot, shared with the engine for
    /// the page-hide flush path.
    pub fn pending_slot(&self) -> PendingSlot {
        Arc::clone(&self.pending)
    }

    /// Replay id for an error observed at `error_at_ms`, opening a new
    /// capture when none is armed.
    fn correlate(&self, error_at_ms: i64) -> String {
        let mut slot = lock(&self.pending);
        if let Some(capture) = slot.as_ref() {
            return capture.replay_id.clone();
        }

        let replay_id = Uuid::new_v4().to_string();
        let window = ReplayWindow::around(
            error_at_ms,
            self.before_error_ms,
            self.after_error.as_millis() as i64,
        );
        tracing::debug!(replay_id = %replay_id, error_at_ms, "opening replay capture");

        *slot = Some(PendingCapture {
            replay_id: replay_id.clone(),
            error_at_ms,
            window,
            flush_timer: Some(self.arm_flush_timer()),
        });
        replay_id
    }

    /// Spawn the delayed flush for the capture being opened.
    fn arm_flush_timer(&self) -> JoinHandle<()> {
        let pending = Arc::clone(&self.pending);
        let buffer = Arc::clone(&self.buffer);
        let coordinator = Arc::clone(&self.coordinator);
        let delay = self.after_error;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // An earlier page-hide flush leaves the slot empty.
            let capture = lock(&pending).take();
            if let Some(mut capture) = capture {
                capture.flush_timer = None;
                coordinator.flush(&buffer, capture);
            }
        })
    }
}

#[async_trait]
impl Transport for ErrorCorrelationGate {
    async fn send(&self, mut record: TelemetryRecord) -> Result<()> {
        if record.is_error() {
            record.replay_id = Some(self.correlate(record.occurred_at_ms));
        }
        self.inner.send(record).await
    }
}
