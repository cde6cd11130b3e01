//! Telemetry transport seam
//!
//! The host SDK delivers all of its telemetry through a [`Transport`].
//! The capture engine never talks to the collector for ordinary records;
//! it only wraps the transport to observe error reports on their way out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Kind of outgoing telemetry record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// An error report
    Error,

    /// A performance sample
    Performance,

    /// Host-defined telemetry
    Custom,
}

/// A telemetry record on its way to the collector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    /// Record kind
    pub kind: RecordKind,

    /// When the reported incident occurred, milliseconds since the epoch
    pub occurred_at_ms: i64,

    /// Original report fields, opaque to the capture engine
    pub payload: Value,

    /// Replay correlation tag, present while a capture is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_id: Option<String>,
}

impl TelemetryRecord {
    /// Create a new untagged record
    pub fn new(kind: RecordKind, occurred_at_ms: i64, payload: Value) -> Self {
        Self {
            kind,
            occurred_at_ms,
            payload,
            replay_id: None,
        }
    }

    /// Create an error report record
    pub fn error(occurred_at_ms: i64, payload: Value) -> Self {
        Self::new(RecordKind::Error, occurred_at_ms, payload)
    }

    /// Whether this record is an error report
    pub fn is_error(&self) -> bool {
        self.kind == RecordKind::Error
    }
}

/// Delivery capability for telemetry records
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a record to the collector. Best effort; implementations
    /// decide their own buffering and failure policy.
    async fn send(&self, record: TelemetryRecord) -> Result<()>;
}
