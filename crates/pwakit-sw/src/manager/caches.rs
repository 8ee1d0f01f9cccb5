//! Cache storage introspection.

use super::PwaManager;
use crate::error::{PlatformError, PwaError, PwaResult};
use crate::platform::CacheStorage;
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Summary of one named cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub name: String,
    pub entry_count: usize,
}

impl PwaManager {
    /// Snapshot of every cache and its entry count, in storage order.
    ///
    /// Empty when cache storage is unsupported or cannot be read.
    pub async fn get_cache_info(&self) -> Vec<CacheInfo> {
        let Some(storage) = self.capabilities.caches.as_deref() else {
            return Vec::new();
        };

        match collect_cache_info(storage).await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "Failed to get cache info");
                Vec::new()
            }
        }
    }

    /// Delete every cache. Each delete is issued even if another fails;
    /// the first failure is reported and nothing is rolled back.
    pub async fn clear_all_caches(&self) -> PwaResult<()> {
        let Some(storage) = self.capabilities.caches.as_deref() else {
            return Ok(());
        };

        let result: Result<usize, PlatformError> = async {
            let names = storage.keys().await?;
            join_all(names.iter().map(move |name| storage.delete(name)))
                .await
                .into_iter()
                .find_map(Result::err)
                .map_or(Ok(names.len()), Err)
        }
        .await;

        match result {
            Ok(count) => {
                info!(count, "All caches cleared");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to clear caches");
                Err(PwaError::CacheClear(e))
            }
        }
    }
}

async fn collect_cache_info(storage: &dyn CacheStorage) -> Result<Vec<CacheInfo>, PlatformError> {
    let names = storage.keys().await?;
    try_join_all(names.into_iter().map(move |name| async move {
        let cache = storage.open(&name).await?;
        let entry_count = cache.keys().await?.len();
        Ok::<_, PlatformError>(CacheInfo { name, entry_count })
    }))
    .await
}
