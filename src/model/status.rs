//! Status enums and their badge presentation.
//!
//! DESIGN
//! ======
//! Every status column is stored as text in the datastore. Each enum owns its
//! wire form (`as_str` / `parse`) so repository code never matches on raw
//! strings, and its badge (`label` / `tone`) so every client renders the same
//! colors for the same state.

use serde::{Deserialize, Serialize};

/// Color class used by status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

/// Rendered badge for one status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub value: &'static str,
    pub label: &'static str,
    pub tone: Tone,
}

macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($wire:literal, $label:literal, $tone:ident)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            #[must_use]
            pub fn tone(self) -> Tone {
                match self {
                    $(Self::$variant => Tone::$tone,)+
                }
            }

            #[must_use]
            pub fn badge(self) -> Badge {
                Badge { value: self.as_str(), label: self.label(), tone: self.tone() }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_enum! {
    /// Delivery status of a Google Ads ad variation.
    AdStatus {
        Pending => ("PENDING", "Pending", Warning),
        Approved => ("APPROVED", "Approved", Info),
        Active => ("ACTIVE", "Active", Success),
        Paused => ("PAUSED", "Paused", Neutral),
        Deleted => ("DELETED", "Deleted", Danger),
    }
}

status_enum! {
    /// Operator approval workflow state, distinct from platform delivery status.
    ApprovalStatus {
        Pending => ("PENDING", "Awaiting approval", Warning),
        Approved => ("APPROVED", "Approved", Success),
        Rejected => ("REJECTED", "Declined", Danger),
        Cancelled => ("CANCELLED", "Cancelled", Neutral),
    }
}

status_enum! {
    /// Platform-side status of a LinkedIn campaign.
    LinkedInCampaignStatus {
        Draft => ("DRAFT", "Draft", Neutral),
        PendingReview => ("PENDING_REVIEW", "In review", Info),
        Active => ("ACTIVE", "Active", Success),
        Paused => ("PAUSED", "Paused", Warning),
        Archived => ("ARCHIVED", "Archived", Neutral),
        Cancelled => ("CANCELLED", "Cancelled", Danger),
    }
}

status_enum! {
    /// Review state of generated content.
    ContentStatus {
        Unused => ("UNUSED", "Unreviewed", Warning),
        Approved => ("APPROVED", "Approved", Success),
        Rejected => ("REJECTED", "Rejected", Danger),
    }
}

status_enum! {
    /// Kind of file forwarded to the automation platform.
    FileCategory {
        ContactEnrichmentPdf => ("contact_enrichment_pdf", "Contact enrichment", Info),
        RulesUploadPdf => ("rules_upload_pdf", "Rules upload", Info),
    }
}

status_enum! {
    /// Progress of a file through the upload pipeline.
    UploadStatus {
        Pending => ("pending", "Queued", Neutral),
        Uploading => ("uploading", "Uploading", Info),
        Success => ("success", "Uploaded", Success),
        Error => ("error", "Failed", Danger),
    }
}

/// All badges of one status family, for the badge catalog endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeGroup {
    pub field: &'static str,
    pub badges: Vec<Badge>,
}

/// Badge catalog for every status family.
#[must_use]
pub fn badge_catalog() -> Vec<BadgeGroup> {
    vec![
        BadgeGroup { field: "ad_status", badges: AdStatus::ALL.iter().map(|s| s.badge()).collect() },
        BadgeGroup { field: "approval_status", badges: ApprovalStatus::ALL.iter().map(|s| s.badge()).collect() },
        BadgeGroup {
            field: "linkedin_campaign_status",
            badges: LinkedInCampaignStatus::ALL.iter().map(|s| s.badge()).collect(),
        },
        BadgeGroup { field: "content_status", badges: ContentStatus::ALL.iter().map(|s| s.badge()).collect() },
        BadgeGroup { field: "file_category", badges: FileCategory::ALL.iter().map(|s| s.badge()).collect() },
        BadgeGroup { field: "upload_status", badges: UploadStatus::ALL.iter().map(|s| s.badge()).collect() },
    ]
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
