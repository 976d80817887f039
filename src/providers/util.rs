use crate::core::ProviderError;
use chrono::{Days, NaiveDate};
use std::time::Duration;

/// Builds the HTTP client shared by the providers.
///
/// Every request is bounded by `timeout`; an expired request surfaces as
/// `ProviderError::Unavailable` like any other transport failure.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent("fxconv/1.0")
        .timeout(timeout)
        .build()
}

/// The `count` UTC calendar days before `today`, newest first.
///
/// Yesterday is the most recent day providers always have data for.
pub fn past_utc_days(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (1..=u64::from(count))
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .collect()
}

/// Sends a request and maps transport failures and non-success statuses.
pub async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Unavailable { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status { provider, status });
    }
    Ok(response)
}

/// Reads a response body and decodes it as JSON.
pub async fn decode_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let text = response
        .text()
        .await
        .map_err(|source| ProviderError::Unavailable { provider, source })?;

    serde_json::from_str(&text)
        .map_err(|e| ProviderError::malformed(provider, format!("failed to parse JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_past_days_start_yesterday() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let days = past_utc_days(today, 4);
        let expected: Vec<NaiveDate> = [(3, 1), (2, 29), (2, 28), (2, 27)]
            .iter()
            .map(|(m, d)| NaiveDate::from_ymd_opt(2024, *m, *d).unwrap())
            .collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn test_past_days_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert!(past_utc_days(today, 0).is_empty());
    }
}
