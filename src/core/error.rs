//! Errors raised by upstream rate sources

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or timeout talking to the provider.
    #[error("{provider} unavailable: {source}")]
    Unavailable {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },

    /// The provider answered but the payload lacks what we need.
    #[error("{provider} returned a malformed response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} returned an unusable rate: {rate}")]
    DegenerateRate { provider: &'static str, rate: f64 },

    #[error("{provider} endpoint is invalid: {detail}")]
    InvalidEndpoint {
        provider: &'static str,
        detail: String,
    },
}

impl ProviderError {
    pub fn malformed(provider: &'static str, detail: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            detail: detail.into(),
        }
    }

    /// True for transport level failures, false when the provider answered.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ProviderError::Unavailable { .. } | ProviderError::Status { .. }
        )
    }
}
