//! Recorder seam
//!
//! The UI mutation recorder is an external black box. Once started it
//! pushes a continuous sequence of timestamped snapshot and mutation
//! events into the supplied sink, beginning with a full snapshot and
//! emitting further checkpoints at its own cadence.

use std::sync::Arc;

use crate::error::Result;
use crate::event::RecordedEvent;

/// Callback receiving each event the recorder emits
pub type EventSink = Arc<dyn Fn(RecordedEvent) + Send + Sync>;

/// A DOM/UI mutation recorder
pub trait Recorder: Send + Sync {
    /// Begin recording, delivering events to `sink` until stopped.
    fn start(&self, sink: EventSink) -> Result<()>;

    /// Disconnect the recorder. The sink is not invoked afterwards.
    fn stop(&self);
}
