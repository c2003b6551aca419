//! In-memory store for tests. Counts writes so tests can assert that a
//! refused action never reached the store, and can be told to fail writes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    AdFilter, AdVariationRepo, ContentFilter, ContentRepo, FileFilter, FileRepo, LinkedInCampaignRepo, LinkedInFilter,
    StoreError,
};
use crate::model::{
    AdFieldsPatch, AdStatusPatch, AdVariation, ContentItem, ContentKind, ContentStatusPatch, EntityKind,
    LinkedInCampaign, LinkedInFieldsPatch, LinkedInStatusPatch, UploadStatus, UploadedFile,
};

#[derive(Default)]
pub struct MemoryStore {
    ads: Mutex<HashMap<Uuid, AdVariation>>,
    campaigns: Mutex<HashMap<Uuid, LinkedInCampaign>>,
    content: Mutex<HashMap<(ContentKind, Uuid), ContentItem>>,
    files: Mutex<HashMap<Uuid, UploadedFile>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_ad(&self, ad: AdVariation) -> Uuid {
        let id = ad.id;
        self.ads.lock().unwrap().insert(id, ad);
        id
    }

    pub fn seed_campaign(&self, campaign: LinkedInCampaign) -> Uuid {
        let id = campaign.id;
        self.campaigns.lock().unwrap().insert(id, campaign);
        id
    }

    pub fn seed_content(&self, item: ContentItem) -> Uuid {
        let id = item.id;
        self.content.lock().unwrap().insert((item.kind, id), item);
        id
    }

    /// Number of mutating calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl AdVariationRepo for MemoryStore {
    async fn list_ad_variations(&self, filter: &AdFilter) -> Result<Vec<AdVariation>, StoreError> {
        let rows: Vec<_> = self
            .ads
            .lock()
            .unwrap()
            .values()
            .filter(|ad| filter.status.is_none_or(|s| ad.status == s))
            .filter(|ad| filter.approval_status.is_none_or(|s| ad.approval_status == s))
            .filter(|ad| {
                filter
                    .campaign_id
                    .as_ref()
                    .is_none_or(|c| ad.campaign_id.as_ref() == Some(c))
            })
            .cloned()
            .collect();
        Ok(newest_first(rows, |ad: &AdVariation| ad.created_at))
    }

    async fn get_ad_variation(&self, id: Uuid) -> Result<Option<AdVariation>, StoreError> {
        Ok(self.ads.lock().unwrap().get(&id).cloned())
    }

    async fn update_ad_status(&self, id: Uuid, patch: &AdStatusPatch) -> Result<AdVariation, StoreError> {
        self.begin_write()?;
        let mut ads = self.ads.lock().unwrap();
        let ad = ads
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: EntityKind::GoogleAdVariation, id })?;
        ad.status = patch.status;
        ad.approval_status = patch.approval_status;
        ad.approved_by.clone_from(&patch.approved_by);
        ad.approved_at = patch.approved_at;
        ad.updated_at = OffsetDateTime::now_utc();
        Ok(ad.clone())
    }

    async fn update_ad_fields(&self, id: Uuid, patch: &AdFieldsPatch) -> Result<AdVariation, StoreError> {
        self.begin_write()?;
        let mut ads = self.ads.lock().unwrap();
        let ad = ads
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: EntityKind::GoogleAdVariation, id })?;
        if let Some(headlines) = &patch.headlines {
            ad.headlines.clone_from(headlines);
        }
        if let Some(descriptions) = &patch.descriptions {
            ad.descriptions.clone_from(descriptions);
        }
        if let Some(final_url) = &patch.final_url {
            ad.final_url = Some(final_url.clone());
        }
        if let Some(daily_budget) = patch.daily_budget {
            ad.daily_budget = Some(daily_budget);
        }
        ad.updated_at = OffsetDateTime::now_utc();
        Ok(ad.clone())
    }

    async fn delete_ad_variation(&self, id: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        self.ads
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: EntityKind::GoogleAdVariation, id })
    }
}

#[async_trait]
impl LinkedInCampaignRepo for MemoryStore {
    async fn list_linkedin_campaigns(&self, filter: &LinkedInFilter) -> Result<Vec<LinkedInCampaign>, StoreError> {
        let rows: Vec<_> = self
            .campaigns
            .lock()
            .unwrap()
            .values()
            .filter(|c| filter.approval_status.is_none_or(|s| c.approval_status == s))
            .filter(|c| {
                filter
                    .linkedin_campaign_status
                    .is_none_or(|s| c.linkedin_campaign_status == s)
            })
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &LinkedInCampaign| c.created_at))
    }

    async fn get_linkedin_campaign(&self, id: Uuid) -> Result<Option<LinkedInCampaign>, StoreError> {
        Ok(self.campaigns.lock().unwrap().get(&id).cloned())
    }

    async fn update_linkedin_status(
        &self,
        id: Uuid,
        patch: &LinkedInStatusPatch,
    ) -> Result<LinkedInCampaign, StoreError> {
        self.begin_write()?;
        let mut campaigns = self.campaigns.lock().unwrap();
        let campaign = campaigns
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: EntityKind::LinkedinCampaign, id })?;
        campaign.approval_status = patch.approval_status;
        campaign.linkedin_campaign_status = patch.linkedin_campaign_status;
        campaign.automation_status.clone_from(&patch.automation_status);
        campaign.automation_error.clone_from(&patch.automation_error);
        campaign.approved_by.clone_from(&patch.approved_by);
        campaign.approved_at = patch.approved_at;
        campaign.updated_at = OffsetDateTime::now_utc();
        Ok(campaign.clone())
    }

    async fn update_linkedin_fields(
        &self,
        id: Uuid,
        patch: &LinkedInFieldsPatch,
    ) -> Result<LinkedInCampaign, StoreError> {
        self.begin_write()?;
        let mut campaigns = self.campaigns.lock().unwrap();
        let campaign = campaigns
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: EntityKind::LinkedinCampaign, id })?;
        let patch = patch.clone();
        campaign.ad_headline = patch.ad_headline.or(campaign.ad_headline.take());
        campaign.ad_text = patch.ad_text.or(campaign.ad_text.take());
        campaign.call_to_action = patch.call_to_action.or(campaign.call_to_action.take());
        campaign.landing_page_url = patch.landing_page_url.or(campaign.landing_page_url.take());
        campaign.daily_budget = patch.daily_budget.or(campaign.daily_budget);
        campaign.total_budget = patch.total_budget.or(campaign.total_budget);
        campaign.start_date = patch.start_date.or(campaign.start_date);
        campaign.end_date = patch.end_date.or(campaign.end_date);
        if let Some(v) = patch.target_locations {
            campaign.target_locations = v;
        }
        if let Some(v) = patch.target_industries {
            campaign.target_industries = v;
        }
        if let Some(v) = patch.target_job_titles {
            campaign.target_job_titles = v;
        }
        if let Some(v) = patch.target_company_sizes {
            campaign.target_company_sizes = v;
        }
        campaign.updated_at = OffsetDateTime::now_utc();
        Ok(campaign.clone())
    }

    async fn delete_linkedin_campaign(&self, id: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        self.campaigns
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: EntityKind::LinkedinCampaign, id })
    }
}

#[async_trait]
impl ContentRepo for MemoryStore {
    async fn list_content(&self, kind: ContentKind, filter: &ContentFilter) -> Result<Vec<ContentItem>, StoreError> {
        let rows: Vec<_> = self
            .content
            .lock()
            .unwrap()
            .values()
            .filter(|item| item.kind == kind)
            .filter(|item| filter.status.is_none_or(|s| item.status == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |item: &ContentItem| item.created_at))
    }

    async fn get_content(&self, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.content.lock().unwrap().get(&(kind, id)).cloned())
    }

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: Uuid,
        patch: &ContentStatusPatch,
    ) -> Result<ContentItem, StoreError> {
        self.begin_write()?;
        let mut content = self.content.lock().unwrap();
        let item = content
            .get_mut(&(kind, id))
            .ok_or(StoreError::NotFound { kind: kind.entity_kind(), id })?;
        item.status = patch.status;
        item.reviewed_by.clone_from(&patch.reviewed_by);
        item.reviewed_at = patch.reviewed_at;
        item.updated_at = OffsetDateTime::now_utc();
        Ok(item.clone())
    }

    async fn delete_content(&self, kind: ContentKind, id: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        self.content
            .lock()
            .unwrap()
            .remove(&(kind, id))
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: kind.entity_kind(), id })
    }
}

#[async_trait]
impl FileRepo for MemoryStore {
    async fn upsert_file(&self, file: &UploadedFile) -> Result<UploadedFile, StoreError> {
        self.begin_write()?;
        let mut stored = file.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        self.files.lock().unwrap().insert(file.id, stored.clone());
        Ok(stored)
    }

    async fn list_files(&self, filter: &FileFilter) -> Result<Vec<UploadedFile>, StoreError> {
        let rows: Vec<_> = self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| filter.category.is_none_or(|c| f.category == c))
            .cloned()
            .collect();
        Ok(newest_first(rows, |f: &UploadedFile| f.created_at))
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<UploadedFile>, StoreError> {
        Ok(self.files.lock().unwrap().get(&id).cloned())
    }

    async fn set_file_status(
        &self,
        id: Uuid,
        status: UploadStatus,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut files = self.files.lock().unwrap();
        let file = files
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: EntityKind::File, id })?;
        file.upload_status = status;
        file.error_message = error_message.map(str::to_owned);
        Ok(())
    }

    async fn delete_file(&self, id: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        self.files
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: EntityKind::File, id })
    }
}
