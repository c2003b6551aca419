mod assets;
mod config;
mod db;
mod error;
mod model;
mod routes;
mod services;
mod state;
mod webhook;
mod workflow;

use std::sync::Arc;

use assets::{AssetStore, CredentialSource, HttpAssetStore, UploadSigner};
use webhook::{Notifier, WebhookClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");
    let store = Arc::new(db::PgStore::new(pool));

    let client = WebhookClient::new(config.webhooks.timeout_secs).expect("webhook client build failed");
    let (notifier, _webhook_worker) = Notifier::spawn(config.webhooks.clone(), Arc::new(client));
    for target in webhook::WebhookTarget::ALL {
        if !notifier.is_configured(*target) {
            tracing::warn!(%target, "webhook not configured; events will be skipped");
        }
    }

    let (credentials, assets) = match config.asset_store.clone() {
        Some(asset_config) => {
            let signer: Arc<dyn CredentialSource> = Arc::new(UploadSigner::new(asset_config));
            let store: Arc<dyn AssetStore> = Arc::new(HttpAssetStore::new().expect("asset store client build failed"));
            (Some(signer), Some(store))
        }
        None => {
            tracing::warn!("asset store not configured; uploads are disabled");
            (None, None)
        }
    };

    let port = config.port;
    let state = state::AppState::new(config, store, notifier, credentials, assets);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "adops listening");
    axum::serve(listener, app).await.expect("server failed");
}
