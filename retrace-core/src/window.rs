//! Window selection: extracting a self-contained replayable slice
//!
//! A replay stream cannot reference UI state from before its first event,
//! so selection anchors every slice at a full snapshot. The anchor is the
//! most recent checkpoint at or before the window start; everything from
//! the anchor through the window end is collected, and the output is
//! re-anchored so that its first event is a checkpoint.

use serde::{Deserialize, Serialize};

use crate::event::RecordedEvent;

/// Time interval around an error used to slice the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayWindow {
    /// Start of the interval, milliseconds since the Unix epoch
    pub start_ms: i64,

    /// End of the interval, inclusive
    pub end_ms: i64,
}

impl ReplayWindow {
    /// Compute the capture window around an error timestamp.
    pub fn around(error_at_ms: i64, before_ms: i64, after_ms: i64) -> Self {
        Self {
            start_ms: error_at_ms.saturating_sub(before_ms).max(0),
            end_ms: error_at_ms.saturating_add(after_ms),
        }
    }
}

/// Result of selecting a window out of the buffer
#[derive(Debug, Clone)]
pub struct WindowSlice {
    /// Timestamp of the first included event; at or before the window
    /// start whenever an anchor was found
    pub started_at_ms: i64,

    /// The selected events, first event is a full snapshot when `anchored`
    pub events: Vec<RecordedEvent>,

    /// Whether the slice begins with a full snapshot. An unanchored slice
    /// may not be playable; it is degraded output, not an error.
    pub anchored: bool,
}

/// Extracts self-contained replay slices from a buffer snapshot
pub struct WindowSelector;

impl WindowSelector {
    /// Select the events for `window`, capped at `max_events`.
    ///
    /// The anchor is the most recent full snapshot at or before the window
    /// start, falling back to the earliest full snapshot anywhere. With no
    /// full snapshot at all, the raw trailing slice inside the window is
    /// returned unanchored.
    pub fn select(
        events: &[RecordedEvent],
        window: ReplayWindow,
        max_events: usize,
    ) -> WindowSlice {
        let anchor_idx = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_full_snapshot() && e.timestamp_ms <= window.start_ms)
            .map(|(i, _)| i)
            .next_back()
            .or_else(|| events.iter().position(RecordedEvent::is_full_snapshot));

        anchor_idx
            .and_then(|idx| Self::anchored_slice(&events[idx..], window, max_events))
            .unwrap_or_else(|| Self::trailing_slice(events, window, max_events))
    }

    fn anchored_slice(
        events: &[RecordedEvent],
        window: ReplayWindow,
        max_events: usize,
    ) -> Option<WindowSlice> {
        let mut collected: Vec<RecordedEvent> = events
            .iter()
            .filter(|e| e.timestamp_ms <= window.end_ms)
            .cloned()
            .collect();

        // Events before the first checkpoint in the slice cannot be
        // rendered and are dropped. An anchor past the window end leaves
        // no checkpoint in the slice at all.
        let first_snapshot = collected.iter().position(RecordedEvent::is_full_snapshot)?;
        collected.drain(..first_snapshot);

        // Tail truncation keeps the anchor plus the most recent events;
        // the anchor itself is never dropped.
        if collected.len() > max_events {
            let keep_tail = max_events.saturating_sub(1);
            let tail_start = collected.len() - keep_tail;
            let mut kept = Vec::with_capacity(max_events);
            kept.push(collected[0].clone());
            kept.extend_from_slice(&collected[tail_start..]);
            collected = kept;
        }

        let slice = WindowSlice {
            started_at_ms: collected
                .first()
                .map_or(window.start_ms, |e| e.timestamp_ms),
            anchored: collected.first().is_some_and(RecordedEvent::is_full_snapshot),
            events: collected,
        };
        Some(slice)
    }

    fn trailing_slice(
        events: &[RecordedEvent],
        window: ReplayWindow,
        max_events: usize,
    ) -> WindowSlice {
        let mut collected: Vec<RecordedEvent> = events
            .iter()
            .filter(|e| e.timestamp_ms >= window.start_ms && e.timestamp_ms <= window.end_ms)
            .cloned()
            .collect();

        if collected.len() > max_events {
            collected.drain(..collected.len() - max_events);
        }

        WindowSlice {
            started_at_ms: collected
                .first()
                .map_or(window.start_ms, |e| e.timestamp_ms),
            anchored: false,
            events: collected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn snapshot(ts: i64) -> RecordedEvent {
        RecordedEvent::full_snapshot(ts, Value::Null)
    }

    fn incremental(ts: i64) -> RecordedEvent {
        RecordedEvent::incremental(ts, Value::Null)
    }

    #[test]
    fn test_anchor_is_most_recent_snapshot_at_or_before_start() {
        let events = vec![
            snapshot(0),
            incremental(1_000),
            snapshot(4_000),
            incremental(6_000),
            incremental(8_000),
        ];

        let slice = WindowSelector::select(
            &events,
            ReplayWindow {
                start_ms: 5_000,
                end_ms: 10_000,
            },
            100,
        );

        assert!(slice.anchored);
        assert_eq!(slice.started_at_ms, 4_000);
        assert!(slice.events[0].is_full_snapshot());
        assert_eq!(slice.events.len(), 3);
    }

    #[test]
    fn test_anchor_falls_back_to_earliest_snapshot() {
        // No checkpoint at or before the window start; the earliest one
        // anywhere in the buffer anchors the slice instead.
        let events = vec![
            incremental(1_000),
            incremental(3_000),
            snapshot(8_000),
            incremental(9_000),
        ];

        let slice = WindowSelector::select(
            &events,
            ReplayWindow {
                start_ms: 5_000,
                end_ms: 10_000,
            },
            100,
        );

        assert!(slice.anchored);
        assert_eq!(slice.started_at_ms, 8_000);
        assert_eq!(slice.events.len(), 2);
    }

    #[test]
    fn test_no_snapshot_returns_unanchored_trailing_slice() {
        let events = vec![
            incremental(1_000),
            incremental(6_000),
            incremental(9_000),
            incremental(12_000),
        ];

        let slice = WindowSelector::select(
            &events,
            ReplayWindow {
                start_ms: 5_000,
                end_ms: 10_000,
            },
            100,
        );

        assert!(!slice.anchored);
        assert_eq!(slice.started_at_ms, 6_000);
        assert_eq!(slice.events.len(), 2);
        assert_eq!(slice.events.last().unwrap().timestamp_ms, 9_000);
    }

    #[test]
    fn test_window_containment() {
        let events = vec![
            snapshot(2_000),
            incremental(4_000),
            incremental(9_000),
            incremental(11_000),
        ];
        let window = ReplayWindow {
            start_ms: 5_000,
            end_ms: 10_000,
        };

        let slice = WindowSelector::select(&events, window, 100);

        assert!(slice.started_at_ms <= window.start_ms);
        assert!(slice.events.last().unwrap().timestamp_ms <= window.end_ms);
    }

    #[test]
    fn test_tail_truncation_never_drops_anchor() {
        let mut events = vec![snapshot(0)];
        for ts in 1..=10 {
            events.push(incremental(ts * 1_000));
        }

        let slice = WindowSelector::select(
            &events,
            ReplayWindow {
                start_ms: 0,
                end_ms: 20_000,
            },
            5,
        );

        assert_eq!(slice.events.len(), 5);
        assert!(slice.events[0].is_full_snapshot());
        // Anchor plus the four most recent events.
        assert_eq!(slice.events[1].timestamp_ms, 7_000);
        assert_eq!(slice.events[4].timestamp_ms, 10_000);
    }

    #[test]
    fn test_error_window_scenario() {
        // Checkpoint at t=0, one incremental per second through t=20s,
        // error at t=20s with a 15s/10s window.
        let mut events = vec![snapshot(0)];
        for ts in 1..=20 {
            events.push(incremental(ts * 1_000));
        }

        let window = ReplayWindow::around(20_000, 15_000, 10_000);
        assert_eq!(window.start_ms, 5_000);
        assert_eq!(window.end_ms, 30_000);

        let slice = WindowSelector::select(&events, window, 3_000);

        assert!(slice.anchored);
        assert_eq!(slice.started_at_ms, 0);
        assert_eq!(slice.events.len(), 21);
    }

    #[test]
    fn test_window_start_clamps_at_zero() {
        let window = ReplayWindow::around(4_000, 15_000, 10_000);
        assert_eq!(window.start_ms, 0);
        assert_eq!(window.end_ms, 14_000);
    }

    #[test]
    fn test_events_after_window_end_are_excluded() {
        let events = vec![snapshot(0), incremental(5_000), incremental(31_000)];

        let slice = WindowSelector::select(
            &events,
            ReplayWindow {
                start_ms: 1_000,
                end_ms: 30_000,
            },
            100,
        );

        assert_eq!(slice.events.len(), 2);
        assert_eq!(slice.events.last().unwrap().timestamp_ms, 5_000);
    }

    #[test]
    fn test_anchor_past_window_end_degrades_to_unanchored() {
        // The only checkpoint sits after the window end, so it cannot
        // anchor the slice and the in-window events ship unanchored.
        let events = vec![incremental(6_000), incremental(9_000), snapshot(31_000)];

        let slice = WindowSelector::select(
            &events,
            ReplayWindow {
                start_ms: 5_000,
                end_ms: 30_000,
            },
            100,
        );

        assert!(!slice.anchored);
        assert_eq!(slice.events.len(), 2);
        assert_eq!(slice.started_at_ms, 6_000);
    }

    #[test]
    fn test_empty_buffer() {
        let slice = WindowSelector::select(
            &[],
            ReplayWindow {
                start_ms: 5_000,
                end_ms: 10_000,
            },
            100,
        );

        assert!(!slice.anchored);
        assert!(slice.events.is_empty());
        assert_eq!(slice.started_at_ms, 5_000);
    }
}
