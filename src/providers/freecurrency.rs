use crate::core::config::{MAX_HISTORY_DAYS, PrimaryProviderConfig};
use crate::core::{ProviderError, RatePoint, RateQuery, RateResult, RateSource};
use crate::providers::util::{decode_json, past_utc_days, send};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

const NAME: &str = "freecurrency";

/// Primary provider: one GET for the latest rate, one GET per past day.
pub struct FreeCurrencyProvider {
    base_url: String,
    api_key: String,
    history_days: u32,
    client: reqwest::Client,
}

/// `{"data": {"EUR": 0.85}}`
#[derive(Debug, Deserialize)]
struct LatestResponse {
    data: HashMap<String, f64>,
}

/// `{"data": {"2024-01-01": {"EUR": 0.85}}}`
#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    data: HashMap<String, HashMap<String, f64>>,
}

impl FreeCurrencyProvider {
    pub fn new(config: &PrimaryProviderConfig, client: reqwest::Client) -> Self {
        FreeCurrencyProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            history_days: config.history_days.min(MAX_HISTORY_DAYS),
            client,
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ProviderError> {
        let mut all_params = vec![("apikey", self.api_key.as_str())];
        all_params.extend_from_slice(params);
        Url::parse_with_params(&format!("{}/{}", self.base_url, path), &all_params).map_err(|e| {
            ProviderError::InvalidEndpoint {
                provider: NAME,
                detail: e.to_string(),
            }
        })
    }

    async fn latest_rate(&self, query: &RateQuery) -> Result<f64, ProviderError> {
        let url = self.endpoint(
            "latest",
            &[
                ("base_currency", query.from.as_str()),
                ("currencies", query.to.as_str()),
            ],
        )?;
        debug!("Requesting latest rate for {}", query);

        let response = send(NAME, self.client.get(url)).await?;
        let latest: LatestResponse = decode_json(NAME, response).await?;
        latest
            .data
            .get(query.to.as_str())
            .copied()
            .ok_or_else(|| ProviderError::malformed(NAME, format!("missing key {}", query.to)))
    }

    async fn historical_rate(
        &self,
        query: &RateQuery,
        date: NaiveDate,
    ) -> Result<RatePoint, ProviderError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let url = self.endpoint(
            "historical",
            &[
                ("date", date_str.as_str()),
                ("base_currency", query.from.as_str()),
                ("currencies", query.to.as_str()),
            ],
        )?;

        let response = send(NAME, self.client.get(url)).await?;
        let historical: HistoricalResponse = decode_json(NAME, response).await?;
        let rate = historical
            .data
            .get(&date_str)
            .and_then(|rates| rates.get(query.to.as_str()))
            .copied()
            .ok_or_else(|| {
                ProviderError::malformed(NAME, format!("missing {} for {}", query.to, date_str))
            })?;

        RatePoint::from_date(date, rate)
            .ok_or_else(|| ProviderError::malformed(NAME, format!("invalid date {date_str}")))
    }

    /// Same as [`RateSource::fetch_rate`] with an explicit "today".
    pub(crate) async fn fetch_rate_on(
        &self,
        query: &RateQuery,
        today: NaiveDate,
    ) -> Result<RateResult, ProviderError> {
        // Without a current rate the history is worthless; bail before it.
        let rate = self.latest_rate(query).await?;

        let days = past_utc_days(today, self.history_days);
        let lookups = days.iter().map(|day| self.historical_rate(query, *day));
        let history: Vec<RatePoint> = join_all(lookups)
            .await
            .into_iter()
            .zip(&days)
            .filter_map(|(result, day)| match result {
                Ok(point) => Some(point),
                Err(e) => {
                    warn!(error = %e, date = %day, "Historical request failed, skipping day");
                    None
                }
            })
            .collect();

        debug!(
            "Fetched latest rate {} and {}/{} history days for {}",
            rate,
            history.len(),
            days.len(),
            query
        );
        RateResult::from_provider(NAME, rate, None, history)
    }
}

#[async_trait]
impl RateSource for FreeCurrencyProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "FreeCurrencyFetch", skip(self), fields(pair = %query))]
    async fn fetch_rate(&self, query: &RateQuery) -> Result<RateResult, ProviderError> {
        self.fetch_rate_on(query, Utc::now().date_naive()).await
    }
}
