//! Hosted asset store: signed upload credentials and multipart uploads.
//!
//! SYSTEM CONTEXT
//! ==============
//! Files never live on this service's disk. Browser clients upload directly
//! with a credential from [`CredentialSource`]; server-side uploads go through
//! [`AssetStore`]. Both seams are traits so the upload pipeline can be tested
//! without the network.

pub mod signer;
pub mod store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ErrorCode;

pub use signer::UploadSigner;
pub use store::HttpAssetStore;

pub const DEFAULT_ASSET_FOLDER: &str = "uploads";
pub const DEFAULT_UPLOAD_URL_TTL_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetStoreConfig {
    pub upload_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub url_ttl_secs: u64,
}

/// Fields a client must send with the upload, signature included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCredential {
    pub upload_url: String,
    pub api_key: String,
    pub timestamp: i64,
    pub signature: String,
    pub folder: String,
    pub public_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// A file held in memory, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBody {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the asset store reports after accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub secure_url: String,
    pub public_id: String,
    pub bytes: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not issue upload credential: {0}")]
    Credential(String),

    #[error("upload credential cannot be signed: {0}")]
    Signing(String),

    #[error("asset store request failed: {0}")]
    Request(String),

    #[error("asset store rejected upload: status {status}")]
    Status { status: u16, body: String },

    #[error("asset store response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Credential(_) => "E_UPLOAD_CREDENTIAL",
            Self::Signing(_) => "E_UPLOAD_SIGNING",
            Self::Request(_) => "E_ASSET_STORE_REQUEST",
            Self::Status { .. } => "E_ASSET_STORE_RESPONSE",
            Self::Parse(_) => "E_ASSET_STORE_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

/// Issues signed upload credentials.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn issue(&self, public_id: &str) -> Result<UploadCredential, UploadError>;
}

/// Accepts file bytes under a previously issued credential.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, credential: &UploadCredential, file: &FileBody) -> Result<StoredAsset, UploadError>;
}
