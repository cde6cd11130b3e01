//! Capture configuration
//!
//! Options follow the layered loading the rest of the stack uses: coded
//! defaults, overridden by `RETRACE_*` environment variables. Floors are
//! resolved once into a [`ReplayConfig`] so every component sees the same
//! effective values.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, RetraceError};

/// Floor for the derived retention horizon
pub const MIN_BUFFER: Duration = Duration::from_secs(90);

/// Slack added on top of the error window when deriving the horizon
pub const BUFFER_SLACK: Duration = Duration::from_secs(10);

/// Floor for the retained event count cap
pub const MIN_MAX_EVENTS: usize = 500;

/// Default retained event count cap
pub const DEFAULT_MAX_EVENTS: usize = 3_000;

/// Default pre-error capture span
pub const DEFAULT_BEFORE_ERROR: Duration = Duration::from_secs(15);

/// Default post-error capture span
pub const DEFAULT_AFTER_ERROR: Duration = Duration::from_secs(10);

/// Page-level context stamped onto every uploaded payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    /// Full page URL
    pub url: String,

    /// Path component of the page URL
    pub path: String,

    /// Browser user agent string
    pub user_agent: String,
}

/// Tunable knobs for the capture engine, all optional with defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Wall-clock span of retained events. Derived from the error window
    /// plus slack when unset; explicit values below that are raised.
    #[serde(with = "humantime_serde")]
    pub buffer: Option<Duration>,

    /// Hard cap on retained event count
    pub max_events: usize,

    /// Capture span before an observed error
    #[serde(with = "humantime_serde")]
    pub before_error: Duration,

    /// Capture span after an observed error
    #[serde(with = "humantime_serde")]
    pub after_error: Duration,

    /// Page context stamped onto payloads
    pub page: PageContext,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            buffer: None,
            max_events: DEFAULT_MAX_EVENTS,
            before_error: DEFAULT_BEFORE_ERROR,
            after_error: DEFAULT_AFTER_ERROR,
            page: PageContext::default(),
        }
    }
}

impl ReplayOptions {
    /// Load options from `RETRACE_*` environment variables over defaults.
    ///
    /// Durations accept humantime strings, e.g. `RETRACE_BEFORE_ERROR=20s`.
    pub fn from_env() -> Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("RETRACE_"))
            .extract()
            .map_err(|e| RetraceError::Configuration(e.to_string()))
    }

    /// Resolve defaults and floors into the effective configuration.
    ///
    /// The retention horizon always covers the full error window plus
    /// slack, whatever was requested.
    pub fn normalized(&self) -> ReplayConfig {
        let span = self.before_error + self.after_error + BUFFER_SLACK;
        let buffer = match self.buffer {
            Some(requested) => requested.max(span),
            None => span.max(MIN_BUFFER),
        };

        ReplayConfig {
            buffer,
            max_events: self.max_events.max(MIN_MAX_EVENTS),
            before_error: self.before_error,
            after_error: self.after_error,
        }
    }
}

/// Effective, floor-enforced capture configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    buffer: Duration,
    max_events: usize,
    before_error: Duration,
    after_error: Duration,
}

impl ReplayConfig {
    /// Retention horizon in milliseconds
    pub fn buffer_ms(&self) -> i64 {
        self.buffer.as_millis() as i64
    }

    /// Retained event count cap
    pub fn max_events(&self) -> usize {
        self.max_events
    }

    /// Pre-error capture span in milliseconds
    pub fn before_error_ms(&self) -> i64 {
        self.before_error.as_millis() as i64
    }

    /// Post-error capture span
    pub fn after_error(&self) -> Duration {
        self.after_error
    }

    /// Post-error capture span in milliseconds
    pub fn after_error_ms(&self) -> i64 {
        self.after_error.as_millis() as i64
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayOptions::default().normalized()
    }
}
