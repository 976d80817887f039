use crate::core::cache::Cache;
use crate::core::{ProviderError, RateQuery, RateResult, RateSource};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Wraps a rate source and remembers its successful answers for a while.
///
/// Failures are never cached so the next request retries the source.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    cache: Cache<String, RateResult>,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::new(ttl),
        }
    }
}

#[async_trait]
impl<T: RateSource> RateSource for CachingRateSource<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch_rate(&self, query: &RateQuery) -> Result<RateResult, ProviderError> {
        let key = format!("{}:{}", self.inner.name(), query);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }
        debug!("Cache miss for rate: {}", key);
        let result = self.inner.fetch_rate(query).await?;
        self.cache.put(key, result.clone()).await;
        Ok(result)
    }
}
