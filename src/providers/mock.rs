use crate::core::{ProviderError, RateQuery, RateResult, RateSource};
use crate::providers::spot_rate::decode_spot_history;
use async_trait::async_trait;
use tracing::debug;

const NAME: &str = "mock";

/// Sample spot rate history for USD/EUR, served for every pair.
const SAMPLE: &str = include_str!("fixtures/spot_rate_usd_eur.json");

/// Development source that never touches the network.
#[derive(Debug, Default)]
pub struct MockRateSource;

#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch_rate(&self, query: &RateQuery) -> Result<RateResult, ProviderError> {
        debug!("Serving sample USD-EUR data for {}", query);
        decode_spot_history(NAME, SAMPLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_payload_decodes() {
        let query = RateQuery::new("GBP".parse().unwrap(), "JPY".parse().unwrap());
        let result = MockRateSource.fetch_rate(&query).await.unwrap();

        assert_eq!(result.regular_rate, 0.8851);
        assert!((result.inverse_rate - 1.0 / 0.8851).abs() < 1e-12);
        assert_eq!(result.history.len(), 30);
        assert!(
            result
                .history
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
    }
}
