//! Entity types mirroring the externally-owned tables.
//!
//! DESIGN
//! ======
//! Rows are created by the automation platform and only mutated here through
//! operator actions. Audit timestamps serialize as RFC 3339; schedule dates as
//! `YYYY-MM-DD`.

pub mod status;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub use status::{AdStatus, ApprovalStatus, ContentStatus, FileCategory, LinkedInCampaignStatus, UploadStatus};

// =============================================================================
// ENTITY KIND
// =============================================================================

/// Which table an entity lives in. Also the prefix of webhook event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    GoogleAdVariation,
    LinkedinCampaign,
    BlogPost,
    LinkedinPost,
    File,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoogleAdVariation => "google_ad_variation",
            Self::LinkedinCampaign => "linkedin_campaign",
            Self::BlogPost => "blog_post",
            Self::LinkedinPost => "linkedin_post",
            Self::File => "file",
        }
    }

    /// Human-readable noun for prompts and error messages.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::GoogleAdVariation => "Google ad variation",
            Self::LinkedinCampaign => "LinkedIn campaign",
            Self::BlogPost => "blog post",
            Self::LinkedinPost => "LinkedIn post",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GOOGLE ADS
// =============================================================================

/// A single Google Ads creative tracked for approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdVariation {
    pub id: Uuid,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub ad_group_id: Option<String>,
    pub ad_group_name: Option<String>,
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub final_url: Option<String>,
    pub daily_budget: Option<f64>,
    pub status: AdStatus,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub approved_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Full status write for an ad variation. Applied as one UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct AdStatusPatch {
    pub status: AdStatus,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<OffsetDateTime>,
}

/// Operator-editable fields of an ad variation. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdFieldsPatch {
    pub headlines: Option<Vec<String>>,
    pub descriptions: Option<Vec<String>>,
    pub final_url: Option<String>,
    pub daily_budget: Option<f64>,
}

// =============================================================================
// LINKEDIN CAMPAIGNS
// =============================================================================

/// A LinkedIn Ads campaign with creative, budget, schedule and targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInCampaign {
    pub id: Uuid,
    pub campaign_name: String,
    pub objective: Option<String>,
    pub ad_headline: Option<String>,
    pub ad_text: Option<String>,
    pub call_to_action: Option<String>,
    pub landing_page_url: Option<String>,
    pub image_url: Option<String>,
    pub daily_budget: Option<f64>,
    pub total_budget: Option<f64>,
    pub currency: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub target_locations: Vec<String>,
    pub target_industries: Vec<String>,
    pub target_job_titles: Vec<String>,
    pub target_company_sizes: Vec<String>,
    pub approval_status: ApprovalStatus,
    pub linkedin_campaign_status: LinkedInCampaignStatus,
    pub linkedin_campaign_id: Option<String>,
    pub automation_status: Option<String>,
    pub automation_error: Option<String>,
    pub approved_by: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub approved_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl LinkedInCampaign {
    #[must_use]
    pub fn has_targeting(&self) -> bool {
        !(self.target_locations.is_empty()
            && self.target_industries.is_empty()
            && self.target_job_titles.is_empty()
            && self.target_company_sizes.is_empty())
    }
}

/// Full status write for a LinkedIn campaign. Applied as one UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedInStatusPatch {
    pub approval_status: ApprovalStatus,
    pub linkedin_campaign_status: LinkedInCampaignStatus,
    pub automation_status: Option<String>,
    pub automation_error: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<OffsetDateTime>,
}

/// Operator-editable fields of a LinkedIn campaign. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinkedInFieldsPatch {
    pub ad_headline: Option<String>,
    pub ad_text: Option<String>,
    pub call_to_action: Option<String>,
    pub landing_page_url: Option<String>,
    pub daily_budget: Option<f64>,
    pub total_budget: Option<f64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub target_locations: Option<Vec<String>>,
    pub target_industries: Option<Vec<String>>,
    pub target_job_titles: Option<Vec<String>>,
    pub target_company_sizes: Option<Vec<String>>,
}

// =============================================================================
// CONTENT
// =============================================================================

/// Which content table an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    BlogPost,
    LinkedinPost,
}

impl ContentKind {
    #[must_use]
    pub fn entity_kind(self) -> EntityKind {
        match self {
            Self::BlogPost => EntityKind::BlogPost,
            Self::LinkedinPost => EntityKind::LinkedinPost,
        }
    }
}

/// A generated blog post or LinkedIn post awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: ContentKind,
    pub title: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub status: ContentStatus,
    pub reviewed_by: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentStatusPatch {
    pub status: ContentStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<OffsetDateTime>,
}

// =============================================================================
// FILES
// =============================================================================

/// Metadata for a file stored in the asset store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: Uuid,
    pub filename: String,
    pub category: FileCategory,
    pub file_url: Option<String>,
    pub public_id: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub upload_status: UploadStatus,
    pub error_message: Option<String>,
    pub uploaded_by: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
