//! Recorded UI event types
//!
//! Events are produced by an external DOM/UI mutation recorder and treated
//! as opaque payloads with a kind and a timestamp. A replay stream is only
//! renderable when it begins with a full state checkpoint, so the kind
//! distinguishes checkpoints from deltas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of event emitted by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Complete serialized UI state checkpoint
    FullSnapshot,

    /// Delta mutation since the last checkpoint
    Incremental,

    /// Viewport or page metadata emitted by the recorder
    Meta,

    /// Recorder-defined auxiliary event
    Custom,
}

/// A single timestamped event emitted by the recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Event kind
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,

    /// Opaque recorder payload
    pub data: Value,
}

impl RecordedEvent {
    /// Create a new event
    pub fn new(kind: EventKind, timestamp_ms: i64, data: Value) -> Self {
        Self {
            kind,
            timestamp_ms,
            data,
        }
    }

    /// Create a full snapshot event
    pub fn full_snapshot(timestamp_ms: i64, data: Value) -> Self {
        Self::new(EventKind::FullSnapshot, timestamp_ms, data)
    }

    /// Create an incremental mutation event
    pub fn incremental(timestamp_ms: i64, data: Value) -> Self {
        Self::new(EventKind::Incremental, timestamp_ms, data)
    }

    /// Whether this event is a full state checkpoint
    pub fn is_full_snapshot(&self) -> bool {
        self.kind == EventKind::FullSnapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        let snapshot = RecordedEvent::full_snapshot(1_000, serde_json::json!({"node": 1}));
        assert!(snapshot.is_full_snapshot());
        assert_eq!(snapshot.timestamp_ms, 1_000);

        let delta = RecordedEvent::incremental(2_000, Value::Null);
        assert!(!delta.is_full_snapshot());
        assert_eq!(delta.kind, EventKind::Incremental);
    }

    #[test]
    fn test_event_wire_format() {
        let event = RecordedEvent::full_snapshot(5_000, serde_json::json!({"html": "<div/>"}));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "full_snapshot");
        assert_eq!(json["timestamp"], 5_000);
        assert_eq!(json["data"]["html"], "<div/>");

        let parsed: RecordedEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind, EventKind::FullSnapshot);
        assert_eq!(parsed.timestamp_ms, 5_000);
    }
}
