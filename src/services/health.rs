//! System health: synthetic service metrics plus real queue counters.
//!
//! The per-service numbers are placeholders drawn from plausible bands and
//! flagged `synthetic: true`; nothing here checks the real services. Webhook
//! and upload counters are real.

use rand::Rng;
use serde::Serialize;

use crate::model::UploadStatus;
use crate::state::AppState;
use crate::webhook::QueueStats;

const SERVICES: [&str; 4] = ["api", "database", "automation", "asset_store"];
const DEGRADED_LATENCY_MS: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceMetric {
    pub name: &'static str,
    pub status: ServiceStatus,
    pub latency_ms: u32,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub uptime_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UploadCounts {
    pub pending: usize,
    pub uploading: usize,
    pub success: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub synthetic: bool,
    pub uptime_secs: u64,
    pub services: Vec<ServiceMetric>,
    pub webhooks: QueueStats,
    pub uploads: UploadCounts,
}

/// One synthetic sample. Latency occasionally spikes into the degraded band.
pub fn synthetic_metric(name: &'static str, rng: &mut impl Rng) -> ServiceMetric {
    let latency_ms = if rng.random_bool(0.1) { rng.random_range(400..900) } else { rng.random_range(20..250) };
    let status = if latency_ms >= DEGRADED_LATENCY_MS { ServiceStatus::Degraded } else { ServiceStatus::Healthy };
    ServiceMetric {
        name,
        status,
        latency_ms,
        cpu_percent: round1(rng.random_range(5.0..85.0)),
        memory_percent: round1(rng.random_range(20.0..90.0)),
        uptime_percent: round1(rng.random_range(99.0..100.0)),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub async fn snapshot(state: &AppState) -> SystemHealth {
    let services = {
        let mut rng = rand::rng();
        SERVICES.iter().map(|name| synthetic_metric(*name, &mut rng)).collect()
    };

    let mut uploads = UploadCounts::default();
    for job in state.uploads.read().await.values() {
        match job.status {
            UploadStatus::Pending => uploads.pending += 1,
            UploadStatus::Uploading => uploads.uploading += 1,
            UploadStatus::Success => uploads.success += 1,
            UploadStatus::Error => uploads.error += 1,
        }
    }

    SystemHealth {
        synthetic: true,
        uptime_secs: state.started_at.elapsed().as_secs(),
        services,
        webhooks: state.notifier.stats(),
        uploads,
    }
}
