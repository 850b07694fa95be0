use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::application::ports::{StagingStore, StagingStoreError};

/// Evicts artifacts older than `max_age` from the staging store.
pub struct RetentionSweeper {
    staging_store: Arc<dyn StagingStore>,
    max_age: Duration,
}

impl RetentionSweeper {
    pub fn new(staging_store: Arc<dyn StagingStore>, max_age: Duration) -> Self {
        Self {
            staging_store,
            max_age,
        }
    }

    /// Returns the number of artifacts deleted.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<usize, StagingStoreError> {
        let max_age = chrono::Duration::from_std(self.max_age)
            .unwrap_or_else(|_| chrono::Duration::MAX);
        let mut evicted = 0;

        for object in self.staging_store.list().await? {
            if now - object.last_modified < max_age {
                continue;
            }
            match self.staging_store.delete(&object.path).await {
                Ok(()) => evicted += 1,
                Err(e) => {
                    tracing::warn!(error = %e, path = %object.path, "Failed to evict artifact")
                }
            }
        }

        Ok(evicted)
    }

    pub async fn run(self, interval: Duration) {
        tracing::info!(
            max_age_secs = self.max_age.as_secs(),
            interval_secs = interval.as_secs(),
            "Retention sweeper started"
        );
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.sweep_once(Utc::now()).await {
                Ok(0) => {}
                Ok(evicted) => tracing::info!(evicted, "Expired artifacts evicted"),
                Err(e) => tracing::error!(error = %e, "Retention sweep failed"),
            }
        }
    }
}
