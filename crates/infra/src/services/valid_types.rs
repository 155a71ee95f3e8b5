//! Valid working-type providers
//!
//! - [`StaticValidTypeProvider`]: fixed list from `reporting.valid_types`
//! - [`CachedValidTypeProvider`]: TTL cache in front of any other provider
//!
//! The cache only stores successful lookups; a failing backing provider is
//! retried on the next call.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use patrolarc_core::ValidTypeProvider;
use patrolarc_domain::{PatrolArcError, Result};
use tracing::{debug, info};

/// Allow-list fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticValidTypeProvider {
    types: HashSet<String>,
}

impl StaticValidTypeProvider {
    pub fn new<I>(types: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self { types: types.into_iter().map(Into::into).collect() }
    }
}

#[async_trait]
impl ValidTypeProvider for StaticValidTypeProvider {
    async fn active_valid_types(&self) -> Result<HashSet<String>> {
        Ok(self.types.clone())
    }
}

/// Caches another provider's allow-list for `ttl`.
pub struct CachedValidTypeProvider {
    inner: Arc<dyn ValidTypeProvider>,
    cache: Cache<(), Arc<HashSet<String>>>,
}

impl CachedValidTypeProvider {
    pub fn new(inner: Arc<dyn ValidTypeProvider>, ttl: Duration) -> Self {
        info!(ttl_seconds = ttl.as_secs(), "valid type cache configured");
        Self { inner, cache: Cache::builder().max_capacity(1).time_to_live(ttl).build() }
    }
}

#[async_trait]
impl ValidTypeProvider for CachedValidTypeProvider {
    async fn active_valid_types(&self) -> Result<HashSet<String>> {
        let inner = Arc::clone(&self.inner);
        self.cache
            .try_get_with((), async move {
                let types = inner.active_valid_types().await?;
                debug!(count = types.len(), "valid type list loaded");
                Ok::<_, PatrolArcError>(Arc::new(types))
            })
            .await
            .map(|types| types.as_ref().clone())
            .map_err(|err| err.as_ref().clone())
    }

    async fn refresh(&self) -> Result<()> {
        self.cache.invalidate(&()).await;
        self.inner.refresh().await
    }
}
