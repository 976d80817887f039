pub mod convert;
pub mod log;

use crate::core::config::ServerConfig;
use crate::core::currency::{SelectOption, select_options};
use crate::service::ConversionService;
use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversionService>,
}

impl AppState {
    pub fn new(service: ConversionService) -> Self {
        AppState {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    message: String,
}

impl ErrorBody {
    pub(crate) fn bad_request(message: impl Into<String>) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                message: message.into(),
            }),
        )
            .into_response()
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method Not Allowed",
    )
        .into_response()
}

async fn currencies() -> Json<Vec<SelectOption>> {
    Json(select_options())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/convert",
            post(convert::convert).fallback(method_not_allowed),
        )
        .route("/api/log", post(log::ingest).fallback(method_not_allowed))
        .route("/api/currencies", get(currencies))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
