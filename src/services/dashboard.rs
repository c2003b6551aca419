//! Dashboard summary: per-status counts for every entity family.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ServiceError;
use crate::db::{AdFilter, ContentFilter, FileFilter, LinkedInFilter};
use crate::model::{AdStatus, ApprovalStatus, ContentKind, ContentStatus, LinkedInCampaignStatus, UploadStatus};
use crate::state::AppState;

/// Count per wire value, with every value present (zero when absent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl StatusCounts {
    fn tally<I>(all: &[&'static str], values: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        let mut by_status: BTreeMap<&'static str, usize> = all.iter().map(|v| (*v, 0)).collect();
        let mut total = 0;
        for value in values {
            *by_status.entry(value).or_default() += 1;
            total += 1;
        }
        Self { total, by_status }
    }
}

fn wire<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(|v| as_str(*v)).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub google_ads: StatusCounts,
    pub google_ads_approval: StatusCounts,
    pub linkedin_campaigns: StatusCounts,
    pub linkedin_campaigns_approval: StatusCounts,
    pub blog_posts: StatusCounts,
    pub linkedin_posts: StatusCounts,
    pub files: StatusCounts,
}

pub async fn summary(state: &AppState) -> Result<DashboardSummary, ServiceError> {
    let store = &state.store;
    let ad_filter = AdFilter::default();
    let campaign_filter = LinkedInFilter::default();
    let content_filter = ContentFilter::default();
    let file_filter = FileFilter::default();
    let (ads, campaigns, blog, posts, files) = futures::try_join!(
        store.list_ad_variations(&ad_filter),
        store.list_linkedin_campaigns(&campaign_filter),
        store.list_content(ContentKind::BlogPost, &content_filter),
        store.list_content(ContentKind::LinkedinPost, &content_filter),
        store.list_files(&file_filter),
    )?;

    let approval = wire(ApprovalStatus::ALL, ApprovalStatus::as_str);
    let content = wire(ContentStatus::ALL, ContentStatus::as_str);

    Ok(DashboardSummary {
        google_ads: StatusCounts::tally(&wire(AdStatus::ALL, AdStatus::as_str), ads.iter().map(|a| a.status.as_str())),
        google_ads_approval: StatusCounts::tally(&approval, ads.iter().map(|a| a.approval_status.as_str())),
        linkedin_campaigns: StatusCounts::tally(
            &wire(LinkedInCampaignStatus::ALL, LinkedInCampaignStatus::as_str),
            campaigns.iter().map(|c| c.linkedin_campaign_status.as_str()),
        ),
        linkedin_campaigns_approval: StatusCounts::tally(
            &approval,
            campaigns.iter().map(|c| c.approval_status.as_str()),
        ),
        blog_posts: StatusCounts::tally(&content, blog.iter().map(|c| c.status.as_str())),
        linkedin_posts: StatusCounts::tally(&content, posts.iter().map(|c| c.status.as_str())),
        files: StatusCounts::tally(
            &wire(UploadStatus::ALL, UploadStatus::as_str),
            files.iter().map(|f| f.upload_status.as_str()),
        ),
    })
}
