//! Collector endpoints
//!
//! The engine talks to the collector over two HTTP calls: a one-shot
//! config GET deciding whether capture is enabled for the application,
//! and a fire-and-forget POST delivering a finished replay. Both live
//! behind [`CollectorClient`] so the engine stays wired by composition.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Result, RetraceError};
use crate::upload::ReplayPayload;

/// Parsed DSN-like collector endpoint.
///
/// The DSN carries the collector base path with the application id as its
/// last path segment, e.g. `https://collect.example.com/v1/apps/app42`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    base_url: String,
    app_id: String,
}

impl Dsn {
    /// Parse a DSN string into its base URL and application id.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');

        let scheme_end = trimmed
            .find("://")
            .map(|idx| idx + 3)
            .filter(|_| trimmed.starts_with("http://") || trimmed.starts_with("https://"))
            .ok_or_else(|| RetraceError::Dsn("expected an http(s) URL".to_string()))?;

        let rest = &trimmed[scheme_end..];
        let (base_path, app_id) = rest
            .rsplit_once('/')
            .ok_or_else(|| RetraceError::Dsn("missing application id segment".to_string()))?;

        if base_path.is_empty() || app_id.is_empty() {
            return Err(RetraceError::Dsn(
                "missing application id segment".to_string(),
            ));
        }

        Ok(Self {
            base_url: format!("{}{}", &trimmed[..scheme_end], base_path),
            app_id: app_id.to_string(),
        })
    }

    /// Application identifier
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Collector base URL, without the application id segment
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Remote config endpoint for this application
    pub fn config_endpoint(&self) -> String {
        format!(
            "{}/replay/config?appId={}",
            self.base_url,
            urlencoding::encode(&self.app_id)
        )
    }

    /// Replay upload endpoint
    pub fn upload_endpoint(&self) -> String {
        format!("{}/replay/upload", self.base_url)
    }
}

/// Replay switch returned by the remote config endpoint.
///
/// An absent field decodes as disabled.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplaySettings {
    /// Whether replay capture is enabled for the application
    pub replay_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigResponse {
    data: ReplaySettings,
}

/// Client for the collector's replay endpoints
#[async_trait]
pub trait CollectorClient: Send + Sync {
    /// Fetch the replay settings for the application. Called once per
    /// page load; a failure leaves capture disabled.
    async fn fetch_settings(&self) -> Result<ReplaySettings>;

    /// Deliver a finished replay payload. Best effort, no retry.
    async fn upload(&self, payload: &ReplayPayload) -> Result<()>;
}

/// HTTP collector client
pub struct HttpCollector {
    client: reqwest::Client,
    dsn: Dsn,
}

impl HttpCollector {
    /// Create a client for the collector behind `dsn`.
    pub fn new(dsn: Dsn) -> Self {
        Self {
            client: reqwest::Client::new(),
            dsn,
        }
    }

    /// The DSN this client talks to
    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }
}

#[async_trait]
impl CollectorClient for HttpCollector {
    async fn fetch_settings(&self) -> Result<ReplaySettings> {
        let response = self.client.get(self.dsn.config_endpoint()).send().await?;

        // Non-2xx means disabled, not an error worth surfacing.
        if !response.status().is_success() {
            return Ok(ReplaySettings::default());
        }

        let body: ConfigResponse = response.json().await?;
        Ok(body.data)
    }

    async fn upload(&self, payload: &ReplayPayload) -> Result<()> {
        self.client
            .post(self.dsn.upload_endpoint())
            .json(payload)
            .send()
            .await?;
        Ok(())
    }
}
