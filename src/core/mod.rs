//! Core business logic abstractions

pub mod amount;
pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use currency::CurrencyCode;
pub use error::ProviderError;
pub use rate::{FetchOutcome, RatePoint, RateQuery, RateResult, RateSource};
