//! `PostgreSQL` implementation of the repository traits.
//!
//! Status columns are TEXT holding the enum wire form; arrays are TEXT[].
//! Every status write is a single `UPDATE ... RETURNING` so the caller gets
//! the row exactly as stored.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{
    AdFilter, AdVariationRepo, ContentFilter, ContentRepo, FileFilter, FileRepo, LinkedInCampaignRepo, LinkedInFilter,
    StoreError,
};
use crate::model::{
    AdFieldsPatch, AdStatus, AdStatusPatch, AdVariation, ApprovalStatus, ContentItem, ContentKind, ContentStatus,
    ContentStatusPatch, EntityKind, FileCategory, LinkedInCampaign, LinkedInCampaignStatus, LinkedInFieldsPatch,
    LinkedInStatusPatch, UploadStatus, UploadedFile,
};

const AD_COLUMNS: &str = "id, campaign_id, campaign_name, ad_group_id, ad_group_name, headlines, descriptions, \
     final_url, daily_budget, status, approval_status, approved_by, approved_at, created_at, updated_at";

const LINKEDIN_COLUMNS: &str = "id, campaign_name, objective, ad_headline, ad_text, call_to_action, \
     landing_page_url, image_url, daily_budget, total_budget, currency, start_date, end_date, target_locations, \
     target_industries, target_job_titles, target_company_sizes, approval_status, linkedin_campaign_status, \
     linkedin_campaign_id, automation_status, automation_error, approved_by, approved_at, created_at, updated_at";

const CONTENT_COLUMNS: &str = "id, title, body, tags, image_url, status, reviewed_by, reviewed_at, created_at, updated_at";

const FILE_COLUMNS: &str = "id, filename, category, file_url, public_id, content_type, size_bytes, upload_status, \
     error_message, uploaded_by, created_at, updated_at";

/// Repository implementation backed by a shared SQLx pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// ROW DECODING
// =============================================================================

fn decode_enum<T>(row: &PgRow, column: &str, parse: fn(&str) -> Option<T>) -> Result<T, StoreError> {
    let raw: String = row.try_get(column)?;
    parse(&raw).ok_or_else(|| StoreError::Decode(format!("{column}: unexpected value '{raw}'")))
}

fn ad_from_row(row: &PgRow) -> Result<AdVariation, StoreError> {
    Ok(AdVariation {
        id: row.try_get("id")?,
        campaign_id: row.try_get("campaign_id")?,
        campaign_name: row.try_get("campaign_name")?,
        ad_group_id: row.try_get("ad_group_id")?,
        ad_group_name: row.try_get("ad_group_name")?,
        headlines: row.try_get("headlines")?,
        descriptions: row.try_get("descriptions")?,
        final_url: row.try_get("final_url")?,
        daily_budget: row.try_get("daily_budget")?,
        status: decode_enum(row, "status", AdStatus::parse)?,
        approval_status: decode_enum(row, "approval_status", ApprovalStatus::parse)?,
        approved_by: row.try_get("approved_by")?,
        approved_at: row.try_get("approved_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn linkedin_from_row(row: &PgRow) -> Result<LinkedInCampaign, StoreError> {
    Ok(LinkedInCampaign {
        id: row.try_get("id")?,
        campaign_name: row.try_get("campaign_name")?,
        objective: row.try_get("objective")?,
        ad_headline: row.try_get("ad_headline")?,
        ad_text: row.try_get("ad_text")?,
        call_to_action: row.try_get("call_to_action")?,
        landing_page_url: row.try_get("landing_page_url")?,
        image_url: row.try_get("image_url")?,
        daily_budget: row.try_get("daily_budget")?,
        total_budget: row.try_get("total_budget")?,
        currency: row.try_get("currency")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        target_locations: row.try_get("target_locations")?,
        target_industries: row.try_get("target_industries")?,
        target_job_titles: row.try_get("target_job_titles")?,
        target_company_sizes: row.try_get("target_company_sizes")?,
        approval_status: decode_enum(row, "approval_status", ApprovalStatus::parse)?,
        linkedin_campaign_status: decode_enum(row, "linkedin_campaign_status", LinkedInCampaignStatus::parse)?,
        linkedin_campaign_id: row.try_get("linkedin_campaign_id")?,
        automation_status: row.try_get("automation_status")?,
        automation_error: row.try_get("automation_error")?,
        approved_by: row.try_get("approved_by")?,
        approved_at: row.try_get("approved_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn content_from_row(kind: ContentKind, row: &PgRow) -> Result<ContentItem, StoreError> {
    Ok(ContentItem {
        id: row.try_get("id")?,
        kind,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        tags: row.try_get("tags")?,
        image_url: row.try_get("image_url")?,
        status: decode_enum(row, "status", ContentStatus::parse)?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn file_from_row(row: &PgRow) -> Result<UploadedFile, StoreError> {
    Ok(UploadedFile {
        id: row.try_get("id")?,
        filename: row.try_get("filename")?,
        category: decode_enum(row, "category", FileCategory::parse)?,
        file_url: row.try_get("file_url")?,
        public_id: row.try_get("public_id")?,
        content_type: row.try_get("content_type")?,
        size_bytes: row.try_get("size_bytes")?,
        upload_status: decode_enum(row, "upload_status", UploadStatus::parse)?,
        error_message: row.try_get("error_message")?,
        uploaded_by: row.try_get("uploaded_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn content_table(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::BlogPost => "blog_content",
        ContentKind::LinkedinPost => "linkedin_posts",
    }
}

fn ensure_affected(rows_affected: u64, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound { kind, id });
    }
    Ok(())
}

// =============================================================================
// GOOGLE ADS
// =============================================================================

#[async_trait]
impl AdVariationRepo for PgStore {
    async fn list_ad_variations(&self, filter: &AdFilter) -> Result<Vec<AdVariation>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {AD_COLUMNS} FROM google_ad_variations WHERE TRUE"));
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(approval_status) = filter.approval_status {
            builder
                .push(" AND approval_status = ")
                .push_bind(approval_status.as_str());
        }
        if let Some(campaign_id) = &filter.campaign_id {
            builder.push(" AND campaign_id = ").push_bind(campaign_id.clone());
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(ad_from_row).collect()
    }

    async fn get_ad_variation(&self, id: Uuid) -> Result<Option<AdVariation>, StoreError> {
        let row = sqlx::query(&format!("SELECT {AD_COLUMNS} FROM google_ad_variations WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(ad_from_row).transpose()
    }

    async fn update_ad_status(&self, id: Uuid, patch: &AdStatusPatch) -> Result<AdVariation, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE google_ad_variations
             SET status = $2, approval_status = $3, approved_by = $4, approved_at = $5, updated_at = now()
             WHERE id = $1
             RETURNING {AD_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.status.as_str())
        .bind(patch.approval_status.as_str())
        .bind(patch.approved_by.as_deref())
        .bind(patch.approved_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { kind: EntityKind::GoogleAdVariation, id })?;
        ad_from_row(&row)
    }

    async fn update_ad_fields(&self, id: Uuid, patch: &AdFieldsPatch) -> Result<AdVariation, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE google_ad_variations
             SET headlines = COALESCE($2, headlines),
                 descriptions = COALESCE($3, descriptions),
                 final_url = COALESCE($4, final_url),
                 daily_budget = COALESCE($5, daily_budget),
                 updated_at = now()
             WHERE id = $1
             RETURNING {AD_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.headlines.clone())
        .bind(patch.descriptions.clone())
        .bind(patch.final_url.as_deref())
        .bind(patch.daily_budget)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { kind: EntityKind::GoogleAdVariation, id })?;
        ad_from_row(&row)
    }

    async fn delete_ad_variation(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM google_ad_variations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), EntityKind::GoogleAdVariation, id)
    }
}

// =============================================================================
// LINKEDIN CAMPAIGNS
// =============================================================================

#[async_trait]
impl LinkedInCampaignRepo for PgStore {
    async fn list_linkedin_campaigns(&self, filter: &LinkedInFilter) -> Result<Vec<LinkedInCampaign>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {LINKEDIN_COLUMNS} FROM linkedin_campaigns WHERE TRUE"));
        if let Some(approval_status) = filter.approval_status {
            builder
                .push(" AND approval_status = ")
                .push_bind(approval_status.as_str());
        }
        if let Some(status) = filter.linkedin_campaign_status {
            builder
                .push(" AND linkedin_campaign_status = ")
                .push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(linkedin_from_row).collect()
    }

    async fn get_linkedin_campaign(&self, id: Uuid) -> Result<Option<LinkedInCampaign>, StoreError> {
        let row = sqlx::query(&format!("SELECT {LINKEDIN_COLUMNS} FROM linkedin_campaigns WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(linkedin_from_row).transpose()
    }

    async fn update_linkedin_status(
        &self,
        id: Uuid,
        patch: &LinkedInStatusPatch,
    ) -> Result<LinkedInCampaign, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE linkedin_campaigns
             SET approval_status = $2, linkedin_campaign_status = $3, automation_status = $4,
                 automation_error = $5, approved_by = $6, approved_at = $7, updated_at = now()
             WHERE id = $1
             RETURNING {LINKEDIN_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.approval_status.as_str())
        .bind(patch.linkedin_campaign_status.as_str())
        .bind(patch.automation_status.as_deref())
        .bind(patch.automation_error.as_deref())
        .bind(patch.approved_by.as_deref())
        .bind(patch.approved_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { kind: EntityKind::LinkedinCampaign, id })?;
        linkedin_from_row(&row)
    }

    async fn update_linkedin_fields(
        &self,
        id: Uuid,
        patch: &LinkedInFieldsPatch,
    ) -> Result<LinkedInCampaign, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE linkedin_campaigns
             SET ad_headline = COALESCE($2, ad_headline),
                 ad_text = COALESCE($3, ad_text),
                 call_to_action = COALESCE($4, call_to_action),
                 landing_page_url = COALESCE($5, landing_page_url),
                 daily_budget = COALESCE($6, daily_budget),
                 total_budget = COALESCE($7, total_budget),
                 start_date = COALESCE($8, start_date),
                 end_date = COALESCE($9, end_date),
                 target_locations = COALESCE($10, target_locations),
                 target_industries = COALESCE($11, target_industries),
                 target_job_titles = COALESCE($12, target_job_titles),
                 target_company_sizes = COALESCE($13, target_company_sizes),
                 updated_at = now()
             WHERE id = $1
             RETURNING {LINKEDIN_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.ad_headline.as_deref())
        .bind(patch.ad_text.as_deref())
        .bind(patch.call_to_action.as_deref())
        .bind(patch.landing_page_url.as_deref())
        .bind(patch.daily_budget)
        .bind(patch.total_budget)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.target_locations.clone())
        .bind(patch.target_industries.clone())
        .bind(patch.target_job_titles.clone())
        .bind(patch.target_company_sizes.clone())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { kind: EntityKind::LinkedinCampaign, id })?;
        linkedin_from_row(&row)
    }

    async fn delete_linkedin_campaign(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM linkedin_campaigns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), EntityKind::LinkedinCampaign, id)
    }
}

// =============================================================================
// CONTENT
// =============================================================================

#[async_trait]
impl ContentRepo for PgStore {
    async fn list_content(&self, kind: ContentKind, filter: &ContentFilter) -> Result<Vec<ContentItem>, StoreError> {
        let table = content_table(kind);
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {CONTENT_COLUMNS} FROM {table} WHERE TRUE"));
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(|row| content_from_row(kind, row)).collect()
    }

    async fn get_content(&self, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let table = content_table(kind);
        let row = sqlx::query(&format!("SELECT {CONTENT_COLUMNS} FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(|row| content_from_row(kind, row)).transpose()
    }

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: Uuid,
        patch: &ContentStatusPatch,
    ) -> Result<ContentItem, StoreError> {
        let table = content_table(kind);
        let row = sqlx::query(&format!(
            "UPDATE {table}
             SET status = $2, reviewed_by = $3, reviewed_at = $4, updated_at = now()
             WHERE id = $1
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.status.as_str())
        .bind(patch.reviewed_by.as_deref())
        .bind(patch.reviewed_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound { kind: kind.entity_kind(), id })?;
        content_from_row(kind, &row)
    }

    async fn delete_content(&self, kind: ContentKind, id: Uuid) -> Result<(), StoreError> {
        let table = content_table(kind);
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), kind.entity_kind(), id)
    }
}

// =============================================================================
// FILES
// =============================================================================

#[async_trait]
impl FileRepo for PgStore {
    async fn upsert_file(&self, file: &UploadedFile) -> Result<UploadedFile, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO uploaded_files
                (id, filename, category, file_url, public_id, content_type, size_bytes,
                 upload_status, error_message, uploaded_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now())
             ON CONFLICT (id) DO UPDATE SET
                filename = EXCLUDED.filename,
                category = EXCLUDED.category,
                file_url = EXCLUDED.file_url,
                public_id = EXCLUDED.public_id,
                content_type = EXCLUDED.content_type,
                size_bytes = EXCLUDED.size_bytes,
                upload_status = EXCLUDED.upload_status,
                error_message = EXCLUDED.error_message,
                uploaded_by = EXCLUDED.uploaded_by,
                updated_at = now()
             RETURNING {FILE_COLUMNS}"
        ))
        .bind(file.id)
        .bind(&file.filename)
        .bind(file.category.as_str())
        .bind(file.file_url.as_deref())
        .bind(file.public_id.as_deref())
        .bind(file.content_type.as_deref())
        .bind(file.size_bytes)
        .bind(file.upload_status.as_str())
        .bind(file.error_message.as_deref())
        .bind(file.uploaded_by.as_deref())
        .bind(file.created_at)
        .fetch_one(&self.pool)
        .await?;
        file_from_row(&row)
    }

    async fn list_files(&self, filter: &FileFilter) -> Result<Vec<UploadedFile>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {FILE_COLUMNS} FROM uploaded_files WHERE TRUE"));
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(file_from_row).collect()
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<UploadedFile>, StoreError> {
        let row = sqlx::query(&format!("SELECT {FILE_COLUMNS} FROM uploaded_files WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(file_from_row).transpose()
    }

    async fn set_file_status(
        &self,
        id: Uuid,
        status: UploadStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE uploaded_files SET upload_status = $2, error_message = $3, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .bind(error_message)
                .execute(&self.pool)
                .await?;
        ensure_affected(result.rows_affected(), EntityKind::File, id)
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM uploaded_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        ensure_affected(result.rows_affected(), EntityKind::File, id)
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "pg_test.rs"]
mod tests;
