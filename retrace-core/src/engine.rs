//! Engine bootstrap and lifecycle
//!
//! The engine owns the capture wiring for one page load: it resolves the
//! application id from the DSN, asks the remote config whether capture is
//! enabled, and if so starts the recorder into the event buffer and
//! installs the correlation gate around the host transport. Every
//! disabling condition is terminal for the page load; telemetry keeps
//! flowing through the raw transport either way.

use std::sync::{Arc, Mutex};

use crate::buffer::{lock, EventBuffer, SharedBuffer};
use crate::collector::{CollectorClient, Dsn, HttpCollector};
use crate::config::ReplayOptions;
use crate::error::{Result, RetraceError};
use crate::gate::{ErrorCorrelationGate, PendingSlot};
use crate::recorder::{EventSink, Recorder};
use crate::transport::Transport;
use crate::upload::UploadCoordinator;

/// Builder wiring a [`ReplayEngine`] by explicit dependency injection
#[derive(Default)]
pub struct ReplayEngineBuilder {
    transport: Option<Arc<dyn Transport>>,
    recorder: Option<Arc<dyn Recorder>>,
    dsn: Option<String>,
    options: ReplayOptions,
    collector: Option<Arc<dyn CollectorClient>>,
}

impl ReplayEngineBuilder {
    /// Host transport the gate will wrap
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// UI mutation recorder feeding the buffer
    pub fn recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// DSN-like collector endpoint carrying the application id
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = Some(dsn.into());
        self
    }

    /// Capture options
    pub fn options(mut self, options: ReplayOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the collector client. Defaults to an HTTP client built
    /// from the DSN.
    pub fn collector(mut self, collector: Arc<dyn CollectorClient>) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Query the remote config and bring the engine up.
    ///
    /// Errors only on wiring mistakes (missing dependency, bad DSN). A
    /// failed or negative config fetch and a recorder that will not start
    /// yield a disabled engine, not an error.
    pub async fn start(self) -> Result<ReplayEngine> {
        let transport = self
            .transport
            .ok_or_else(|| RetraceError::Configuration("transport is required".to_string()))?;
        let recorder = self
            .recorder
            .ok_or_else(|| RetraceError::Configuration("recorder is required".to_string()))?;
        let dsn = Dsn::parse(
            self.dsn
                .as_deref()
                .ok_or_else(|| RetraceError::Configuration("dsn is required".to_string()))?,
        )?;

        let collector: Arc<dyn CollectorClient> = self
            .collector
            .unwrap_or_else(|| Arc::new(HttpCollector::new(dsn.clone())));

        // Config is fetched once per page load; no retry on any failure.
        let settings = match collector.fetch_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(
                    app_id = %dsn.app_id(),
                    error = %err,
                    "replay config fetch failed; capture disabled"
                );
                return Ok(ReplayEngine::disabled(transport));
            }
        };
        if !settings.replay_enabled {
            tracing::debug!(app_id = %dsn.app_id(), "replay capture disabled by remote config");
            return Ok(ReplayEngine::disabled(transport));
        }

        let config = self.options.normalized();
        let buffer: SharedBuffer = Arc::new(Mutex::new(EventBuffer::new(
            config.buffer_ms(),
            config.max_events(),
        )));
        let coordinator = Arc::new(UploadCoordinator::new(
            collector,
            self.options.page.clone(),
            config.max_events(),
        ));
        let gate = Arc::new(ErrorCorrelationGate::new(
            transport.clone(),
            Arc::clone(&buffer),
            Arc::clone(&coordinator),
            &config,
        ));
        let pending = gate.pending_slot();

        let sink_buffer = Arc::clone(&buffer);
        let sink: EventSink = Arc::new(move |event| {
            lock(&sink_buffer).push(event);
        });
        if let Err(err) = recorder.start(sink) {
            tracing::warn!(error = %err, "recorder failed to start; capture disabled");
            return Ok(ReplayEngine::disabled(transport));
        }

        tracing::debug!(app_id = %dsn.app_id(), "replay capture armed");
        Ok(ReplayEngine {
            transport: gate,
            active: Some(ActiveCapture {
                buffer,
                pending,
                coordinator,
                recorder,
            }),
        })
    }
}

struct ActiveCapture {
    buffer: SharedBuffer,
    pending: PendingSlot,
    coordinator: Arc<UploadCoordinator>,
    recorder: Arc<dyn Recorder>,
}

/// Session-replay capture engine for one page load
pub struct ReplayEngine {
    transport: Arc<dyn Transport>,
    active: Option<ActiveCapture>,
}

impl ReplayEngine {
    /// Start building an engine
    pub fn builder() -> ReplayEngineBuilder {
        ReplayEngineBuilder::default()
    }

    fn disabled(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            active: None,
        }
    }

    /// The transport the host should send telemetry through: the
    /// correlation gate while capture is armed, the raw transport
    /// otherwise.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Whether capture is currently armed
    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    /// Flush any pending capture immediately.
    ///
    /// The host calls this from its page-hide signal, racing browser
    /// teardown; the flush path awaits nothing before the upload is
    /// issued. With no pending capture this is a no-op.
    pub fn handle_page_hide(&self) {
        let Some(active) = &self.active else {
            return;
        };

        let capture = lock(&active.pending).take();
        if let Some(capture) = capture {
            tracing::debug!(replay_id = %capture.replay_id, "page hiding; flushing capture early");
            active.coordinator.flush(&active.buffer, capture);
        }
    }

    /// Tear the engine down: cancel the flush timer, disconnect the
    /// recorder, and drop the buffered events. Any pending capture is
    /// abandoned without an upload.
    pub fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let capture = lock(&active.pending).take();
        if let Some(mut capture) = capture {
            capture.cancel_timer();
        }
        active.recorder.stop();
        lock(&active.buffer).clear();
        tracing::debug!("replay capture stopped");
    }
}

impl Drop for ReplayEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
