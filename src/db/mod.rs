//! Datastore access: pool setup, migrations, and repository traits.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool and enforce schema
//! migrations before accepting API traffic. Services never see the pool; they
//! go through the repository traits so tests can swap in an in-memory store.
//!
//! TRADE-OFFS
//! ==========
//! Status writes are plain `UPDATE ... WHERE id = $1`. There is no version
//! column or compare-and-set, so two operators acting on the same row race
//! and the last write wins.

pub mod pg;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::model::{
    AdFieldsPatch, AdStatus, AdStatusPatch, AdVariation, ApprovalStatus, ContentItem, ContentKind, ContentStatus,
    ContentStatusPatch, EntityKind, FileCategory, LinkedInCampaign, LinkedInCampaignStatus, LinkedInFieldsPatch,
    LinkedInStatusPatch, UploadStatus, UploadedFile,
};

pub use pg::PgStore;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unreadable row: {0}")]
    Decode(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
            Self::Decode(_) => "E_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

// =============================================================================
// FILTERS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdFilter {
    pub status: Option<AdStatus>,
    pub approval_status: Option<ApprovalStatus>,
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkedInFilter {
    pub approval_status: Option<ApprovalStatus>,
    pub linkedin_campaign_status: Option<LinkedInCampaignStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFilter {
    pub status: Option<ContentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileFilter {
    pub category: Option<FileCategory>,
}

// =============================================================================
// REPOSITORIES
// =============================================================================

/// Google Ads ad variations (`google_ad_variations`).
#[async_trait]
pub trait AdVariationRepo: Send + Sync {
    async fn list_ad_variations(&self, filter: &AdFilter) -> Result<Vec<AdVariation>, StoreError>;

    async fn get_ad_variation(&self, id: Uuid) -> Result<Option<AdVariation>, StoreError>;

    /// Write status and audit fields together in one statement.
    async fn update_ad_status(&self, id: Uuid, patch: &AdStatusPatch) -> Result<AdVariation, StoreError>;

    async fn update_ad_fields(&self, id: Uuid, patch: &AdFieldsPatch) -> Result<AdVariation, StoreError>;

    /// Permanently remove the row.
    async fn delete_ad_variation(&self, id: Uuid) -> Result<(), StoreError>;
}

/// LinkedIn Ads campaigns (`linkedin_campaigns`).
#[async_trait]
pub trait LinkedInCampaignRepo: Send + Sync {
    async fn list_linkedin_campaigns(&self, filter: &LinkedInFilter) -> Result<Vec<LinkedInCampaign>, StoreError>;

    async fn get_linkedin_campaign(&self, id: Uuid) -> Result<Option<LinkedInCampaign>, StoreError>;

    async fn update_linkedin_status(
        &self,
        id: Uuid,
        patch: &LinkedInStatusPatch,
    ) -> Result<LinkedInCampaign, StoreError>;

    async fn update_linkedin_fields(
        &self,
        id: Uuid,
        patch: &LinkedInFieldsPatch,
    ) -> Result<LinkedInCampaign, StoreError>;

    async fn delete_linkedin_campaign(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Blog posts (`blog_content`) and LinkedIn posts (`linkedin_posts`).
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn list_content(&self, kind: ContentKind, filter: &ContentFilter) -> Result<Vec<ContentItem>, StoreError>;

    async fn get_content(&self, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: Uuid,
        patch: &ContentStatusPatch,
    ) -> Result<ContentItem, StoreError>;

    async fn delete_content(&self, kind: ContentKind, id: Uuid) -> Result<(), StoreError>;
}

/// Uploaded file metadata (`uploaded_files`).
#[async_trait]
pub trait FileRepo: Send + Sync {
    /// Insert, or overwrite the row with the same id (upload retries reuse it).
    async fn upsert_file(&self, file: &UploadedFile) -> Result<UploadedFile, StoreError>;

    async fn list_files(&self, filter: &FileFilter) -> Result<Vec<UploadedFile>, StoreError>;

    async fn get_file(&self, id: Uuid) -> Result<Option<UploadedFile>, StoreError>;

    async fn set_file_status(
        &self,
        id: Uuid,
        status: UploadStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn delete_file(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Every repository the service needs, as one injectable object.
pub trait Store: AdVariationRepo + LinkedInCampaignRepo + ContentRepo + FileRepo {}

impl<T> Store for T where T: AdVariationRepo + LinkedInCampaignRepo + ContentRepo + FileRepo {}
