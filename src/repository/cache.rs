use crate::error::{Result, VersionsError};
use crate::repository::{Coordinate, RepositoryClient};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, Semaphore};
use tracing::debug;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Remembers the versions fetched for each coordinate for the lifetime of a
/// run and bounds how many lookups hit the network at once.
///
/// Concurrent requests for the same coordinate share a single fetch.
pub struct CachedRepositoryClient {
    inner: Arc<dyn RepositoryClient>,
    cache: Mutex<HashMap<Coordinate, Arc<OnceCell<Vec<String>>>>>,
    permits: Semaphore,
}

impl CachedRepositoryClient {
    pub fn new(inner: Arc<dyn RepositoryClient>, concurrency: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    async fn cell_for(&self, coordinate: &Coordinate) -> Arc<OnceCell<Vec<String>>> {
        let mut cache = self.cache.lock().await;
        cache
            .entry(coordinate.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

#[async_trait]
impl RepositoryClient for CachedRepositoryClient {
    async fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        let cell = self.cell_for(coordinate).await;
        let versions = cell
            .get_or_try_init(|| async {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|e| VersionsError::Repository(e.to_string()))?;
                debug!(%coordinate, "querying repositories");
                self.inner.fetch_available_versions(coordinate).await
            })
            .await?;
        Ok(versions.clone())
    }
}
