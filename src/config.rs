//! Service configuration parsed from environment variables.
//!
//! `main` loads `.env` (if present) before calling [`AppConfig::from_env`].
//! Optional integrations stay `None` when their variables are absent; the
//! matching endpoints then answer 503 instead of failing startup.

use std::collections::HashMap;

use crate::assets::{AssetStoreConfig, DEFAULT_ASSET_FOLDER, DEFAULT_UPLOAD_URL_TTL_SECS};
use crate::error::ErrorCode;
use crate::webhook::{DEFAULT_WEBHOOK_QUEUE_CAPACITY, DEFAULT_WEBHOOK_TIMEOUT_SECS, WebhookConfig, WebhookTarget};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_UPLOAD_JOB_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_MAX_RETAINED_UPLOAD_BYTES: usize = 4 * DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("asset store config incomplete: {0} not set")]
    IncompleteAssetStore(&'static str),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
            Self::IncompleteAssetStore(_) => "E_CONFIG_ASSET_STORE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// When set, `/api` requests must carry `Authorization: Bearer <token>`.
    pub operator_token: Option<String>,
    pub webhooks: WebhookConfig,
    pub asset_store: Option<AssetStoreConfig>,
    pub max_upload_bytes: usize,
    /// Succeeded upload jobs are dropped from the registry after this long.
    pub upload_job_ttl_secs: u64,
    /// Total file bytes kept for failed jobs awaiting retry. Oldest failed
    /// jobs are evicted past this.
    pub max_retained_upload_bytes: usize,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` is missing, a numeric value does
    /// not parse, or the asset store is only partially configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let max_upload_bytes = parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let upload_job_ttl_secs = parse_or(&get, "UPLOAD_JOB_TTL_SECS", DEFAULT_UPLOAD_JOB_TTL_SECS)?;
        let max_retained_upload_bytes =
            parse_or(&get, "MAX_RETAINED_UPLOAD_BYTES", DEFAULT_MAX_RETAINED_UPLOAD_BYTES)?;

        let routes: HashMap<WebhookTarget, String> = WebhookTarget::ALL
            .iter()
            .filter_map(|target| get(target.env_var()).map(|url| (*target, url)))
            .collect();
        let webhooks = WebhookConfig {
            routes,
            timeout_secs: parse_or(&get, "WEBHOOK_TIMEOUT_SECS", DEFAULT_WEBHOOK_TIMEOUT_SECS)?,
            queue_capacity: parse_or(&get, "WEBHOOK_QUEUE_CAPACITY", DEFAULT_WEBHOOK_QUEUE_CAPACITY)?,
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            operator_token: get("OPERATOR_API_TOKEN"),
            webhooks,
            asset_store: asset_store_config(&get)?,
            max_upload_bytes,
            upload_job_ttl_secs,
            max_retained_upload_bytes,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn asset_store_config(get: &impl Fn(&str) -> Option<String>) -> Result<Option<AssetStoreConfig>, ConfigError> {
    const REQUIRED: [&str; 3] = ["ASSET_STORE_UPLOAD_URL", "ASSET_STORE_API_KEY", "ASSET_STORE_API_SECRET"];

    let [upload_url, api_key, api_secret] = REQUIRED.map(|key| get(key));
    if upload_url.is_none() && api_key.is_none() && api_secret.is_none() {
        return Ok(None);
    }
    let require = |value: Option<String>, key: &'static str| value.ok_or(ConfigError::IncompleteAssetStore(key));

    Ok(Some(AssetStoreConfig {
        upload_url: require(upload_url, REQUIRED[0])?,
        api_key: require(api_key, REQUIRED[1])?,
        api_secret: require(api_secret, REQUIRED[2])?,
        folder: get("ASSET_STORE_FOLDER").unwrap_or_else(|| DEFAULT_ASSET_FOLDER.to_owned()),
        url_ttl_secs: parse_or(get, "UPLOAD_URL_TTL_SECS", DEFAULT_UPLOAD_URL_TTL_SECS)?,
    }))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
