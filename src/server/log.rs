//! `POST /api/log`: browser log lines re-emitted through tracing.

use super::ErrorBody;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLog {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub message: String,
    pub timestamp: Option<String>,
    pub stack: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub context: Option<serde_json::Value>,
}

impl ClientLog {
    fn emit(&self) {
        let timestamp = self.timestamp.as_deref().unwrap_or_default();
        let url = self.url.as_deref().unwrap_or_default();
        let user_agent = self.user_agent.as_deref().unwrap_or_default();
        let stack = self.stack.as_deref().unwrap_or_default();
        let context = self
            .context
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();

        match self.level.as_deref().map(str::to_lowercase).as_deref() {
            Some("error") => error!(
                target: "fxconv::client",
                timestamp, url, user_agent, stack, context, "{}", self.message
            ),
            Some("warn") => warn!(
                target: "fxconv::client",
                timestamp, url, user_agent, stack, context, "{}", self.message
            ),
            Some("debug") => debug!(
                target: "fxconv::client",
                timestamp, url, user_agent, stack, context, "{}", self.message
            ),
            _ => info!(
                target: "fxconv::client",
                timestamp, url, user_agent, stack, context, "{}", self.message
            ),
        }
    }
}

pub async fn ingest(body: Bytes) -> Response {
    match serde_json::from_slice::<ClientLog>(&body) {
        Ok(log) => {
            log.emit();
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => ErrorBody::bad_request(format!("Malformed log payload: {e}")),
    }
}
