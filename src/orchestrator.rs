//! Tries rate sources in priority order until one answers.

use crate::core::config::AppConfig;
use crate::core::{FetchOutcome, ProviderError, RateQuery, RateSource};
use crate::providers::util::build_client;
use crate::providers::{CachingRateSource, FreeCurrencyProvider, MockRateSource, SpotRateProvider};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub struct RateFetchOrchestrator {
    sources: Vec<Arc<dyn RateSource>>,
}

impl RateFetchOrchestrator {
    /// Sources are tried in the given order.
    pub fn new(sources: Vec<Arc<dyn RateSource>>) -> Self {
        RateFetchOrchestrator { sources }
    }

    /// Builds the chain described by the config: the mock source alone in
    /// mock mode, otherwise the primary then the secondary provider.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.mock_mode {
            info!("Mock mode enabled, upstream providers will not be called");
            let mock: Arc<dyn RateSource> = Arc::new(MockRateSource);
            return Ok(Self::new(vec![mock]));
        }

        let client = build_client(config.request_timeout()).context("Failed to build HTTP client")?;
        let ttl = config.cache_ttl();
        let mut sources: Vec<Arc<dyn RateSource>> = Vec::new();

        if let Some(primary) = &config.providers.primary {
            if primary.api_key.is_empty() {
                warn!("Primary provider has no API key configured");
            }
            sources.push(with_cache(
                FreeCurrencyProvider::new(primary, client.clone()),
                ttl,
            ));
        }
        if let Some(secondary) = &config.providers.secondary {
            sources.push(with_cache(SpotRateProvider::new(secondary, client), ttl));
        }

        if sources.is_empty() {
            bail!("No rate providers configured");
        }
        Ok(Self::new(sources))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Never errors: each failing source is logged and the next one tried.
    /// When all fail the outcome is a `Failure` naming every reason.
    #[instrument(name = "FetchRate", skip(self), fields(pair = %query))]
    pub async fn fetch_rate(&self, query: &RateQuery) -> FetchOutcome {
        let mut reasons = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.fetch_rate(query).await {
                Ok(result) => {
                    info!(
                        source = source.name(),
                        rate = result.regular_rate,
                        points = result.history.len(),
                        "Rate fetched"
                    );
                    return FetchOutcome::Success(result);
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        kind = failure_kind(&e),
                        error = %e,
                        "Rate source failed, trying next"
                    );
                    reasons.push(e.to_string());
                }
            }
        }

        error!("All rate sources failed for {}", query);
        FetchOutcome::Failure(reasons.join("; "))
    }
}

fn failure_kind(error: &ProviderError) -> &'static str {
    if error.is_unavailable() {
        "unreachable"
    } else {
        "unusable payload"
    }
}

fn with_cache<T: RateSource + 'static>(
    source: T,
    ttl: Option<std::time::Duration>,
) -> Arc<dyn RateSource> {
    match ttl {
        Some(ttl) => Arc::new(CachingRateSource::new(source, ttl)),
        None => Arc::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        name: &'static str,
        rate: Option<f64>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn ok(name: &'static str, rate: f64) -> Arc<Self> {
            Arc::new(Self {
                name,
                rate: Some(rate),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                rate: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RateSource for FixedSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_rate(&self, _query: &RateQuery) -> Result<RateResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.rate {
                Some(rate) => RateResult::from_provider(self.name, rate, None, vec![]),
                None => Err(ProviderError::malformed(self.name, "boom")),
            }
        }
    }

    fn query() -> RateQuery {
        RateQuery::new("USD".parse().unwrap(), "EUR".parse().unwrap())
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = FixedSource::ok("primary", 0.85);
        let secondary = FixedSource::ok("secondary", 0.88);
        let sources: Vec<Arc<dyn RateSource>> = vec![primary.clone(), secondary.clone()];
        let orchestrator = RateFetchOrchestrator::new(sources);

        let outcome = orchestrator.fetch_rate(&query()).await;
        assert_eq!(outcome.into_result().regular_rate, 0.85);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary() {
        let primary = FixedSource::failing("primary");
        let secondary = FixedSource::ok("secondary", 0.88);
        let sources: Vec<Arc<dyn RateSource>> = vec![primary.clone(), secondary.clone()];
        let orchestrator = RateFetchOrchestrator::new(sources);

        let outcome = orchestrator.fetch_rate(&query()).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.into_result().regular_rate, 0.88);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_total_failure() {
        let sources: Vec<Arc<dyn RateSource>> = vec![
            FixedSource::failing("primary"),
            FixedSource::failing("secondary"),
        ];
        let orchestrator = RateFetchOrchestrator::new(sources);

        let outcome = orchestrator.fetch_rate(&query()).await;
        match &outcome {
            FetchOutcome::Failure(reason) => {
                assert!(reason.contains("primary returned a malformed response: boom"));
                assert!(reason.contains("secondary returned a malformed response: boom"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        let result = outcome.into_result();
        assert_eq!(result.regular_rate, 1.0);
        assert_eq!(result.inverse_rate, 1.0);
        assert!(result.history.is_empty());
    }

    #[test]
    fn test_failure_kind() {
        let status = ProviderError::Status {
            provider: "primary",
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
        };
        assert_eq!(failure_kind(&status), "unreachable");
        assert_eq!(
            failure_kind(&ProviderError::malformed("primary", "missing key EUR")),
            "unusable payload"
        );
        let degenerate = ProviderError::DegenerateRate {
            provider: "secondary",
            rate: 0.0,
        };
        assert_eq!(failure_kind(&degenerate), "unusable payload");
    }

    #[test]
    fn test_from_config_order() {
        let orchestrator = RateFetchOrchestrator::from_config(&AppConfig::default()).unwrap();
        assert_eq!(orchestrator.source_names(), vec!["freecurrency", "spot-rate"]);

        let config = AppConfig {
            mock_mode: true,
            ..AppConfig::default()
        };
        let orchestrator = RateFetchOrchestrator::from_config(&config).unwrap();
        assert_eq!(orchestrator.source_names(), vec!["mock"]);
    }

    #[test]
    fn test_from_config_without_providers() {
        let mut config = AppConfig::default();
        config.providers.primary = None;
        config.providers.secondary = None;
        assert!(RateFetchOrchestrator::from_config(&config).is_err());
    }
}
