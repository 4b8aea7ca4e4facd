use crate::config::QuotaConfig;
use crate::services::notifier::QuotaNotifier;
use crate::services::quota::classify;
use crate::services::usage::{UsageError, UsageReporter};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};

const CHECK_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Periodically polls Cloudinary usage and writes quota notifications.
/// Failures are logged and swallowed so the loop never dies.
pub struct QuotaWorker {
    db: DatabaseConnection,
    usage: Arc<dyn UsageReporter>,
    quota: QuotaConfig,
    shutdown: watch::Receiver<bool>,
}

impl QuotaWorker {
    pub fn new(
        db: DatabaseConnection,
        usage: Arc<dyn UsageReporter>,
        quota: QuotaConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            usage,
            quota,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("🚀 Quota worker started");

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Quota worker shutting down");
                    break;
                }
                _ = sleep(CHECK_INTERVAL) => {
                    self.check_quota().await;
                }
            }
        }
    }

    async fn check_quota(&self) {
        let used_bytes = match self.usage.storage_used_bytes().await {
            Ok(bytes) => bytes,
            Err(UsageError::Shape(msg)) => {
                tracing::warn!("quota check skipped, no storage info: {}", msg);
                return;
            }
            Err(e) => {
                tracing::error!("quota check failed: {}", e);
                return;
            }
        };

        let sample = classify(used_bytes, self.quota.capacity_bytes);
        tracing::info!(
            percent = sample.percent,
            tier = sample.tier.label(),
            "storage usage checked"
        );

        match QuotaNotifier::notify_if_needed(&self.db, &sample, Utc::now().date_naive()).await {
            Ok(Some(n)) => tracing::info!("quota notification created: {}", n.title),
            Ok(None) => {}
            Err(e) => tracing::error!("failed to write quota notification: {}", e),
        }
    }
}
