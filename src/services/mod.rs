//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and collaborator calls so route
//! handlers stay focused on protocol translation and operator identity.
//! Every mutating operation follows the same shape: load, plan, write once,
//! then enqueue a webhook event. The event is never allowed to fail the call.

pub mod ads;
pub mod content;
pub mod dashboard;
pub mod files;
pub mod health;
pub mod linkedin;
pub mod upload;

use uuid::Uuid;

use crate::assets::UploadError;
use crate::db::StoreError;
use crate::error::ErrorCode;
use crate::model::EntityKind;
use crate::state::AppState;
use crate::webhook::{Event, WebhookTarget};
use crate::workflow::TransitionError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ServiceError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::Store(StoreError::NotFound { kind, id })
    }
}

impl ErrorCode for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Transition(e) => e.error_code(),
            Self::Upload(e) => e.error_code(),
            Self::Validation(_) => "E_VALIDATION",
            Self::Conflict(_) => "E_CONFLICT",
            Self::NotConfigured(_) => "E_NOT_CONFIGURED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.retryable(),
            Self::Upload(e) => e.retryable(),
            Self::Transition(_) | Self::Validation(_) | Self::Conflict(_) | Self::NotConfigured(_) => false,
        }
    }
}

/// Enqueue a lifecycle event for the entity's webhook, if it has one.
pub(crate) fn notify(state: &AppState, event: Event) {
    let Some(target) = WebhookTarget::for_entity(event.entity_kind) else {
        return;
    };
    state.notifier.enqueue(target, event);
}

pub(crate) fn require_non_negative(field: &str, value: Option<f64>) -> Result<(), ServiceError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ServiceError::Validation(format!("{field} must be a non-negative number"))),
        _ => Ok(()),
    }
}
