//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Every collaborator sits behind a trait object so tests swap in the
//! in-memory store and recording mocks. The upload-job registry is the only
//! mutable in-process state; everything else of record lives in the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assets::{AssetStore, CredentialSource};
use crate::config::AppConfig;
use crate::db::Store;
use crate::services::upload::UploadJob;
use crate::webhook::Notifier;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub notifier: Notifier,
    /// `None` when the asset store is not configured.
    pub credentials: Option<Arc<dyn CredentialSource>>,
    pub assets: Option<Arc<dyn AssetStore>>,
    /// Server-side upload jobs keyed by file id.
    pub uploads: Arc<RwLock<HashMap<Uuid, UploadJob>>>,
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        notifier: Notifier,
        credentials: Option<Arc<dyn CredentialSource>>,
        assets: Option<Arc<dyn AssetStore>>,
    ) -> Self {
        Self {
            store,
            notifier,
            credentials,
            assets,
            uploads: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
