use crate::core::config::{HistoryPeriod, SecondaryProviderConfig};
use crate::core::{ProviderError, RatePoint, RateQuery, RateResult, RateSource};
use crate::providers::util::send;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

const NAME: &str = "spot-rate";

/// Secondary provider: a single POST returning rate, inverse and history.
pub struct SpotRateProvider {
    url: String,
    period: HistoryPeriod,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SpotRateRequest<'a> {
    method: &'static str,
    data: SpotRatePayload<'a>,
}

#[derive(Debug, Serialize)]
struct SpotRatePayload<'a> {
    base: &'a str,
    term: &'a str,
    period: HistoryPeriod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpotRateHistory {
    current_interbank_rate: Option<f64>,
    #[serde(alias = "InverseInterbankRate")]
    current_inverse_interbank_rate: Option<f64>,
    /// Kept raw so one bad point does not sink the whole payload.
    #[serde(default)]
    historical_points: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoricalPoint {
    point_in_time: i64,
    interbank_rate: f64,
}

/// Decodes a spot rate history payload, with or without the `data` wrapper.
pub fn decode_spot_history(provider: &'static str, body: &str) -> Result<RateResult, ProviderError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(provider, format!("failed to parse JSON: {e}")))?;

    // Arrays and scalars are rejected here.
    let payload = match value {
        Value::Object(mut outer) => match outer.remove("data") {
            Some(Value::Object(inner)) => inner,
            Some(_) => return Err(ProviderError::malformed(provider, "data is not an object")),
            None => outer,
        },
        _ => return Err(ProviderError::malformed(provider, "expected a JSON object")),
    };
    let history: SpotRateHistory = serde_json::from_value(Value::Object(payload))
        .map_err(|e| ProviderError::malformed(provider, e.to_string()))?;

    let rate = history
        .current_interbank_rate
        .ok_or_else(|| ProviderError::malformed(provider, "missing CurrentInterbankRate"))?;

    let total = history.historical_points.len();
    let points: Vec<RatePoint> = history
        .historical_points
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<HistoricalPoint>(raw).ok())
        .filter_map(|p| RatePoint::from_millis(p.point_in_time, p.interbank_rate))
        .collect();
    if points.len() < total {
        debug!(
            "Dropped {} unreadable history points from {}",
            total - points.len(),
            provider
        );
    }

    RateResult::from_provider(provider, rate, history.current_inverse_interbank_rate, points)
}

impl SpotRateProvider {
    pub fn new(config: &SecondaryProviderConfig, client: reqwest::Client) -> Self {
        SpotRateProvider {
            url: config.url.clone(),
            period: config.period,
            client,
        }
    }
}

#[async_trait]
impl RateSource for SpotRateProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "SpotRateFetch", skip(self), fields(pair = %query))]
    async fn fetch_rate(&self, query: &RateQuery) -> Result<RateResult, ProviderError> {
        let request = SpotRateRequest {
            method: "spotRateHistory",
            data: SpotRatePayload {
                base: query.from.as_str(),
                term: query.to.as_str(),
                period: self.period,
            },
        };
        debug!("Requesting spot rate history from {}", self.url);

        let response = send(NAME, self.client.post(&self.url).json(&request)).await?;
        let body = response
            .text()
            .await
            .map_err(|source| ProviderError::Unavailable {
                provider: NAME,
                source,
            })?;

        decode_spot_history(NAME, &body)
    }
}
