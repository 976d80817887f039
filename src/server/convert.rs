//! `POST /api/convert`

use super::{AppState, ErrorBody};
use crate::core::{CurrencyCode, FetchOutcome, RateQuery};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const UNAVAILABLE_MESSAGE: &str = "Internal API issue, try again later";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    #[serde(alias = "FROM_CURRENCY_CODE")]
    pub from_currency_code: String,
    #[serde(alias = "TO_CURRENCY_CODE")]
    pub to_currency_code: String,
    #[serde(default = "default_with_history")]
    pub with_history: bool,
}

fn default_with_history() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Unix milliseconds.
    #[serde(rename = "PointInTime")]
    pub point_in_time: i64,
    #[serde(rename = "InterbankRate")]
    pub interbank_rate: f64,
}

/// Wire shape shared with the existing web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionInfo {
    #[serde(rename = "REGULAR_RATE")]
    pub regular_rate: f64,
    #[serde(rename = "INVERSE_RATE")]
    pub inverse_rate: f64,
    #[serde(
        rename = "HISTORY_DATA",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub history_data: Option<Vec<HistoryPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConversionInfo {
    /// Total failure is reported as a 1:1 rate plus a message.
    pub fn unavailable() -> Self {
        ConversionInfo {
            regular_rate: 1.0,
            inverse_rate: 1.0,
            history_data: None,
            message: Some(UNAVAILABLE_MESSAGE.to_string()),
        }
    }

    pub fn from_outcome(outcome: FetchOutcome, with_history: bool) -> Self {
        let result = match outcome {
            FetchOutcome::Success(result) => result,
            FetchOutcome::Failure(_) => return Self::unavailable(),
        };

        let history_data = with_history.then(|| {
            result
                .history
                .iter()
                .map(|p| HistoryPoint {
                    point_in_time: p.timestamp.timestamp_millis(),
                    interbank_rate: p.rate,
                })
                .collect()
        });

        ConversionInfo {
            regular_rate: result.regular_rate,
            inverse_rate: result.inverse_rate,
            history_data,
            message: None,
        }
    }
}

fn parse_query(request: &ConversionRequest) -> Result<RateQuery, String> {
    let from: CurrencyCode = request
        .from_currency_code
        .parse()
        .map_err(|e: anyhow::Error| e.to_string())?;
    let to: CurrencyCode = request
        .to_currency_code
        .parse()
        .map_err(|e: anyhow::Error| e.to_string())?;
    Ok(RateQuery::new(from, to))
}

/// The body is parsed by hand so every malformed request is a plain 400,
/// whatever its content type.
pub async fn convert(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ConversionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejecting malformed conversion request");
            return ErrorBody::bad_request(format!("Malformed request body: {e}"));
        }
    };

    let query = match parse_query(&request) {
        Ok(query) => query,
        Err(message) => {
            warn!("{}", message);
            return ErrorBody::bad_request(message);
        }
    };
    debug!(pair = %query, with_history = request.with_history, "Conversion requested");

    let outcome = state.service.convert(&query).await;
    let info = ConversionInfo::from_outcome(outcome, request.with_history);
    (StatusCode::OK, Json(info)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RatePoint, RateResult};

    #[test]
    fn test_request_accepts_both_field_styles() {
        let request: ConversionRequest =
            serde_json::from_str(r#"{"fromCurrencyCode": "USD", "toCurrencyCode": "EUR"}"#)
                .unwrap();
        assert_eq!(request.from_currency_code, "USD");
        assert!(request.with_history);

        let request: ConversionRequest = serde_json::from_str(
            r#"{"FROM_CURRENCY_CODE": "GBP", "TO_CURRENCY_CODE": "JPY", "withHistory": false}"#,
        )
        .unwrap();
        assert_eq!(request.to_currency_code, "JPY");
        assert!(!request.with_history);
    }

    #[test]
    fn test_sentinel_body() {
        let info = ConversionInfo::from_outcome(FetchOutcome::Failure("down".into()), true);
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({
                "REGULAR_RATE": 1.0,
                "INVERSE_RATE": 1.0,
                "message": "Internal API issue, try again later"
            })
        );
    }

    #[test]
    fn test_history_mapping_and_omission() {
        let result = RateResult::from_provider(
            "test",
            0.88,
            None,
            vec![RatePoint::from_millis(1_610_064_000_000, 0.816).unwrap()],
        )
        .unwrap();

        let info = ConversionInfo::from_outcome(FetchOutcome::Success(result.clone()), true);
        assert_eq!(
            info.history_data,
            Some(vec![HistoryPoint {
                point_in_time: 1_610_064_000_000,
                interbank_rate: 0.816
            }])
        );
        assert!(info.message.is_none());

        let info = ConversionInfo::from_outcome(FetchOutcome::Success(result), false);
        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("HISTORY_DATA").is_none());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_parse_query_rejects_unknown_codes() {
        let request = ConversionRequest {
            from_currency_code: "USD".into(),
            to_currency_code: "BTC".into(),
            with_history: true,
        };
        assert_eq!(
            parse_query(&request).unwrap_err(),
            "Unsupported currency code: BTC"
        );
    }
}
