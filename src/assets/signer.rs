//! Upload signing.
//!
//! The signature is the hex SHA-256 of the signed params, sorted by name and
//! joined as `k=v` pairs with `&`, with the API secret appended. The asset
//! store recomputes it, so the param set here must match the fields sent.

use std::collections::BTreeMap;
use std::fmt::Write;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use super::{AssetStoreConfig, CredentialSource, UploadCredential, UploadError};

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Canonical `k=v&k=v` string. `BTreeMap` keeps keys sorted.
#[must_use]
pub fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[must_use]
pub fn sign_params(params: &BTreeMap<&str, String>, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(secret.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Signs credentials locally with the configured API secret.
pub struct UploadSigner {
    config: AssetStoreConfig,
}

impl UploadSigner {
    #[must_use]
    pub fn new(config: AssetStoreConfig) -> Self {
        Self { config }
    }

    /// Build a credential for a fixed instant.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret is empty or `public_id` is blank.
    pub fn credential_at(&self, public_id: &str, now: OffsetDateTime) -> Result<UploadCredential, UploadError> {
        if self.config.api_secret.is_empty() {
            return Err(UploadError::Signing("API secret is empty".into()));
        }
        if public_id.trim().is_empty() {
            return Err(UploadError::Signing("public_id is required".into()));
        }

        let timestamp = now.unix_timestamp();
        let mut params = BTreeMap::new();
        params.insert("folder", self.config.folder.clone());
        params.insert("public_id", public_id.to_owned());
        params.insert("timestamp", timestamp.to_string());

        let ttl = i64::try_from(self.config.url_ttl_secs).unwrap_or(i64::MAX);
        Ok(UploadCredential {
            upload_url: self.config.upload_url.clone(),
            api_key: self.config.api_key.clone(),
            timestamp,
            signature: sign_params(&params, &self.config.api_secret),
            folder: self.config.folder.clone(),
            public_id: public_id.to_owned(),
            expires_at: now.saturating_add(Duration::seconds(ttl)),
        })
    }
}

#[async_trait]
impl CredentialSource for UploadSigner {
    async fn issue(&self, public_id: &str) -> Result<UploadCredential, UploadError> {
        self.credential_at(public_id, OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
#[path = "signer_test.rs"]
mod tests;
