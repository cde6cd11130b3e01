//! # Retrace - Session-Replay Capture Engine
//!
//! Retrace is the capture side of session replay for a telemetry SDK:
//! it continuously records a bounded window of UI mutation events and,
//! the moment an error report passes through the host transport, carves
//! out the slice around the error and ships it to a collector.
//!
//! - **Bounded recording**: the event buffer is limited both by
//!   wall-clock span and by event count; eviction is the only
//!   backpressure the engine needs.
//! - **Self-contained replays**: every uploaded slice starts at a full
//!   state checkpoint, so the player never needs state from before the
//!   captured stream.
//! - **Error correlation**: error reports are tagged with the replay id
//!   of the capture they fall into; one capture is armed at a time.
//! - **Best-effort delivery**: uploads are fire and forget. No failure
//!   in this crate ever reaches the host application.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use retrace_core::prelude::*;
//!
//! let engine = ReplayEngine::builder()
//!     .transport(transport)
//!     .recorder(recorder)
//!     .dsn("https://collect.example.com/apps/app42")
//!     .options(ReplayOptions::default())
//!     .start()
//!     .await?;
//!
//! // Send all telemetry through the gated transport.
//! engine.transport().send(record).await?;
//!
//! // Wire the host's page-hide signal for early flush.
//! engine.handle_page_hide();
//! ```
//!
//! ## Architecture
//!
//! The recorder feeds the [`buffer::EventBuffer`]; the
//! [`gate::ErrorCorrelationGate`] wraps the host [`transport::Transport`]
//! and arms a pending capture when an error flows through; on flush the
//! [`window::WindowSelector`] extracts a replayable slice and the
//! [`upload::UploadCoordinator`] posts it. [`engine::ReplayEngine`] owns
//! the wiring and the start/stop lifecycle.

pub mod buffer;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod gate;
pub mod recorder;
pub mod transport;
pub mod upload;
pub mod window;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buffer::{EventBuffer, SharedBuffer};
    pub use crate::collector::{CollectorClient, Dsn, HttpCollector, ReplaySettings};
    pub use crate::config::{PageContext, ReplayConfig, ReplayOptions};
    pub use crate::engine::{ReplayEngine, ReplayEngineBuilder};
    pub use crate::error::{Result, RetraceError};
    pub use crate::event::{EventKind, RecordedEvent};
    pub use crate::gate::{ErrorCorrelationGate, PendingCapture, PendingSlot};
    pub use crate::recorder::{EventSink, Recorder};
    pub use crate::transport::{RecordKind, TelemetryRecord, Transport};
    pub use crate::upload::{ReplayPayload, UploadCoordinator};
    pub use crate::window::{ReplayWindow, WindowSelector, WindowSlice};
}
