//! Exchange rate abstractions and core types

use crate::core::currency::CurrencyCode;
use crate::core::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Display;

/// Relative slack allowed between a provider supplied inverse and `1 / rate`.
/// Providers round both figures to four decimals.
const INVERSE_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateQuery {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl RateQuery {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        RateQuery { from, to }
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl Display for RateQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// One historical observation of the regular rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub timestamp: DateTime<Utc>,
    pub rate: f64,
}

impl RatePoint {
    pub fn from_millis(millis: i64, rate: f64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|timestamp| RatePoint { timestamp, rate })
    }

    /// Point at midnight UTC of the given calendar day.
    pub fn from_date(date: NaiveDate, rate: f64) -> Option<Self> {
        date.and_hms_opt(0, 0, 0).map(|naive| RatePoint {
            timestamp: naive.and_utc(),
            rate,
        })
    }

    fn is_usable(&self) -> bool {
        self.rate.is_finite() && self.rate > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateResult {
    pub regular_rate: f64,
    pub inverse_rate: f64,
    pub history: Vec<RatePoint>,
}

impl RateResult {
    /// Builds a result from raw provider figures.
    ///
    /// Rejects zero, negative and non-finite rates. A provider inverse is kept
    /// only when it agrees with `1 / regular`; otherwise it is recomputed.
    pub fn from_provider(
        provider: &'static str,
        regular_rate: f64,
        inverse_hint: Option<f64>,
        history: Vec<RatePoint>,
    ) -> Result<Self, ProviderError> {
        if !regular_rate.is_finite() || regular_rate <= 0.0 {
            return Err(ProviderError::DegenerateRate {
                provider,
                rate: regular_rate,
            });
        }

        let computed = 1.0 / regular_rate;
        let inverse_rate = match inverse_hint {
            Some(hint)
                if hint.is_finite()
                    && computed.is_finite()
                    && ((hint - computed) / computed).abs() <= INVERSE_TOLERANCE =>
            {
                hint
            }
            _ if computed.is_finite() => computed,
            _ => 1.0,
        };

        Ok(RateResult {
            regular_rate,
            inverse_rate,
            history: normalize_history(history),
        })
    }

    /// Result for a pair whose two sides are the same currency.
    pub fn identity() -> Self {
        RateResult {
            regular_rate: 1.0,
            inverse_rate: 1.0,
            history: Vec::new(),
        }
    }
}

/// Drops unusable points, then sorts ascending by timestamp keeping the
/// first point seen for a given instant.
pub fn normalize_history(mut points: Vec<RatePoint>) -> Vec<RatePoint> {
    points.retain(RatePoint::is_usable);
    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);
    points
}

/// What one orchestrator run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(RateResult),
    Failure(String),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Collapses the outcome into a result, using `1:1` with no history for
    /// failures.
    pub fn into_result(self) -> RateResult {
        match self {
            FetchOutcome::Success(result) => result,
            FetchOutcome::Failure(_) => RateResult::identity(),
        }
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn fetch_rate(&self, query: &RateQuery) -> Result<RateResult, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(millis: i64, rate: f64) -> RatePoint {
        RatePoint::from_millis(millis, rate).unwrap()
    }

    #[test]
    fn test_inverse_is_computed() {
        let result = RateResult::from_provider("test", 0.85, None, vec![]).unwrap();
        assert_eq!(result.regular_rate, 0.85);
        assert!((result.inverse_rate - 1.0 / 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_provider_inverse_kept_when_consistent() {
        let result = RateResult::from_provider("test", 0.8825, Some(1.1331), vec![]).unwrap();
        assert_eq!(result.inverse_rate, 1.1331);
    }

    #[test]
    fn test_provider_inverse_replaced_when_inconsistent() {
        let result = RateResult::from_provider("test", 0.5, Some(7.0), vec![]).unwrap();
        assert_eq!(result.inverse_rate, 2.0);

        let result = RateResult::from_provider("test", 0.5, Some(f64::NAN), vec![]).unwrap();
        assert_eq!(result.inverse_rate, 2.0);
    }

    #[test]
    fn test_degenerate_rates_rejected() {
        for rate in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let result = RateResult::from_provider("test", rate, None, vec![]);
            assert!(
                matches!(result, Err(ProviderError::DegenerateRate { .. })),
                "rate {rate} should be rejected"
            );
        }
    }

    #[test]
    fn test_tiny_rate_falls_back_to_unit_inverse() {
        let result = RateResult::from_provider("test", f64::MIN_POSITIVE / 4.0, None, vec![])
            .unwrap();
        assert_eq!(result.inverse_rate, 1.0);
    }

    #[test]
    fn test_history_normalization() {
        let history = vec![
            point(3_000, 0.9),
            point(1_000, f64::NAN),
            point(2_000, 0.8),
            point(4_000, 0.0),
            point(2_000, 0.7),
            point(500, f64::INFINITY),
        ];
        let normalized = normalize_history(history);
        let rates: Vec<f64> = normalized.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![0.8, 0.9]);
        assert!(normalized.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_point_from_date_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 8).unwrap();
        let p = RatePoint::from_date(date, 0.816).unwrap();
        assert_eq!(p.timestamp.timestamp_millis(), 1_610_064_000_000);
    }

    #[test]
    fn test_failure_outcome_collapses_to_unit_rate() {
        let outcome = FetchOutcome::Failure("all sources failed".to_string());
        assert!(!outcome.is_success());
        assert_eq!(outcome.into_result(), RateResult::identity());
    }

    #[test]
    fn test_query_identity() {
        let usd: CurrencyCode = "USD".parse().unwrap();
        let eur: CurrencyCode = "EUR".parse().unwrap();
        assert!(RateQuery::new(usd, usd).is_identity());
        let query = RateQuery::new(usd, eur);
        assert!(!query.is_identity());
        assert_eq!(query.to_string(), "USD-EUR");
    }
}
