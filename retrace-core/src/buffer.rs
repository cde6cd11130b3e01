//! Bounded in-memory event buffer
//!
//! The buffer retains a rolling window of recorded events, bounded both by
//! wall-clock span (long idle sessions) and by absolute count (mutation
//! storms). Eviction only ever removes from the oldest end; arrival order
//! is preserved and events are never re-sorted.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::RecordedEvent;

/// Shared handle to the page-session event buffer
pub type SharedBuffer = Arc<Mutex<EventBuffer>>;

/// Locks a shared mutex, recovering the data if a holder panicked.
///
/// Capture must keep working inside a host page; a poisoned lock is
/// treated as still usable rather than propagated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bounded, time- and count-limited sequence of recorded events
#[derive(Debug)]
pub struct EventBuffer {
    events: VecDeque<RecordedEvent>,
    buffer_ms: i64,
    max_events: usize,
    newest_ts: i64,
}

impl EventBuffer {
    /// Create a buffer retaining at most `max_events` events within the
    /// trailing `buffer_ms` window.
    pub fn new(buffer_ms: i64, max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            buffer_ms,
            max_events,
            newest_ts: i64::MIN,
        }
    }

    /// Append an event and evict anything that fell out of bounds.
    ///
    /// Cannot fail: falling out of the retention window is silent data
    /// loss, not an error.
    pub fn push(&mut self, event: RecordedEvent) {
        // Watermark is monotone so a late, out-of-order event never
        // widens the retention window.
        self.newest_ts = self.newest_ts.max(event.timestamp_ms);
        self.events.push_back(event);

        let horizon = self.newest_ts.saturating_sub(self.buffer_ms);
        while self
            .events
            .front()
            .is_some_and(|front| front.timestamp_ms < horizon)
        {
            self.events.pop_front();
        }
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    /// Owned copy of the currently retained events, in arrival order.
    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.events.iter().cloned().collect()
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the newest event observed, if any
    pub fn newest_timestamp_ms(&self) -> Option<i64> {
        (self.newest_ts != i64::MIN).then_some(self.newest_ts)
    }

    /// Drop all retained events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
