//! Outbound automation webhooks.
//!
//! SYSTEM CONTEXT
//! ==============
//! The external workflow platform reacts to operator decisions (launch an
//! approved campaign, pause it on the ad platform, ingest an uploaded PDF).
//! Each concern has its own webhook URL. Lifecycle events go through the
//! bounded [`queue::Notifier`]; the upload pipeline delivers its final
//! notification directly so a failure can be reported on the upload job.

pub mod event;
pub mod queue;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ErrorCode;
use crate::model::{EntityKind, FileCategory};

pub use event::Event;
pub use queue::{Notifier, QueueStats};

pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_WEBHOOK_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_WEBHOOK_QUEUE_CAPACITY: usize = 1024;

// =============================================================================
// TARGETS
// =============================================================================

/// One configured webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookTarget {
    GoogleAds,
    LinkedinAds,
    Content,
    ContactEnrichment,
    RulesUpload,
}

impl WebhookTarget {
    pub const ALL: &'static [Self] =
        &[Self::GoogleAds, Self::LinkedinAds, Self::Content, Self::ContactEnrichment, Self::RulesUpload];

    /// Environment variable holding this target's URL.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Self::GoogleAds => "WEBHOOK_GOOGLE_ADS_URL",
            Self::LinkedinAds => "WEBHOOK_LINKEDIN_ADS_URL",
            Self::Content => "WEBHOOK_CONTENT_URL",
            Self::ContactEnrichment => "WEBHOOK_CONTACT_ENRICHMENT_URL",
            Self::RulesUpload => "WEBHOOK_RULES_UPLOAD_URL",
        }
    }

    /// Target for lifecycle events of an entity. Files route by category.
    #[must_use]
    pub fn for_entity(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::GoogleAdVariation => Some(Self::GoogleAds),
            EntityKind::LinkedinCampaign => Some(Self::LinkedinAds),
            EntityKind::BlogPost | EntityKind::LinkedinPost => Some(Self::Content),
            EntityKind::File => None,
        }
    }

    #[must_use]
    pub fn for_category(category: FileCategory) -> Self {
        match category {
            FileCategory::ContactEnrichmentPdf => Self::ContactEnrichment,
            FileCategory::RulesUploadPdf => Self::RulesUpload,
        }
    }
}

impl std::fmt::Display for WebhookTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GoogleAds => "google_ads",
            Self::LinkedinAds => "linkedin_ads",
            Self::Content => "content",
            Self::ContactEnrichment => "contact_enrichment",
            Self::RulesUpload => "rules_upload",
        };
        f.write_str(name)
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub routes: HashMap<WebhookTarget, String>,
    pub timeout_secs: u64,
    pub queue_capacity: usize,
}

impl WebhookConfig {
    #[must_use]
    pub fn url(&self, target: WebhookTarget) -> Option<&str> {
        self.routes.get(&target).map(String::as_str)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
            timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
            queue_capacity: DEFAULT_WEBHOOK_QUEUE_CAPACITY,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("no webhook URL configured for {0}")]
    NotConfigured(WebhookTarget),

    #[error("webhook request failed: {0}")]
    Request(String),

    #[error("webhook responded with status {status}")]
    Status { status: u16, body: String },

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for WebhookError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "E_WEBHOOK_NOT_CONFIGURED",
            Self::Request(_) => "E_WEBHOOK_REQUEST",
            Self::Status { .. } => "E_WEBHOOK_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Something that can POST an event to a URL.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn post(&self, url: &str, event: &Event) -> Result<(), WebhookError>;
}

/// `reqwest`-backed sink. One attempt per call; any 2xx counts as delivered.
pub struct WebhookClient {
    http: reqwest::Client,
}

impl WebhookClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_WEBHOOK_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| WebhookError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WebhookSink for WebhookClient {
    async fn post(&self, url: &str, event: &Event) -> Result<(), WebhookError> {
        let response = self
            .http
            .post(url)
            .json(event)
            .send()
            .await
            .map_err(|e| WebhookError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(WebhookError::Status { status: status.as_u16(), body })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
