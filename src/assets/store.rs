//! Multipart upload client for the hosted asset store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::{AssetStore, FileBody, StoredAsset, UploadCredential, UploadError};

const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct HttpAssetStore {
    http: reqwest::Client,
}

impl HttpAssetStore {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

fn build_form(credential: &UploadCredential, file: &FileBody) -> Result<Form, UploadError> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(&file.content_type)
        .map_err(|e| UploadError::Request(format!("invalid content type: {e}")))?;

    Ok(Form::new()
        .text("api_key", credential.api_key.clone())
        .text("timestamp", credential.timestamp.to_string())
        .text("signature", credential.signature.clone())
        .text("folder", credential.folder.clone())
        .text("public_id", credential.public_id.clone())
        .part("file", part))
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(&self, credential: &UploadCredential, file: &FileBody) -> Result<StoredAsset, UploadError> {
        let form = build_form(credential, file)?;
        let response = self
            .http
            .post(&credential.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(UploadError::Status { status, body: text });
        }

        parse_upload_response(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(serde::Deserialize)]
struct ApiResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
    #[serde(default)]
    bytes: i64,
    error: Option<ApiErrorMessage>,
}

#[derive(serde::Deserialize)]
struct ApiErrorMessage {
    message: String,
}

/// Parse the store's JSON reply. A 2xx body carrying `error` is a failure.
pub fn parse_upload_response(json: &str) -> Result<StoredAsset, UploadError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| UploadError::Parse(e.to_string()))?;

    if let Some(err) = api.error {
        return Err(UploadError::Parse(err.message));
    }

    let (Some(secure_url), Some(public_id)) = (api.secure_url, api.public_id) else {
        return Err(UploadError::Parse("response missing secure_url or public_id".into()));
    };

    Ok(StoredAsset { secure_url, public_id, bytes: api.bytes })
}
