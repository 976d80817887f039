use crate::core::{FetchOutcome, RateQuery, RateResult};
use crate::orchestrator::RateFetchOrchestrator;
use tracing::debug;

/// Entry point used by the HTTP routes and the CLI.
pub struct ConversionService {
    orchestrator: RateFetchOrchestrator,
}

impl ConversionService {
    pub fn new(orchestrator: RateFetchOrchestrator) -> Self {
        ConversionService { orchestrator }
    }

    /// Converting a currency into itself needs no upstream call.
    pub async fn convert(&self, query: &RateQuery) -> FetchOutcome {
        if query.is_identity() {
            debug!("Identical currencies {}, skipping upstream lookup", query.from);
            return FetchOutcome::Success(RateResult::identity());
        }
        self.orchestrator.fetch_rate(query).await
    }
}
