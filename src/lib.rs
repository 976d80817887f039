pub mod cli;
pub mod core;
pub mod orchestrator;
pub mod providers;
pub mod server;
pub mod service;

use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, RateQuery};
use crate::orchestrator::RateFetchOrchestrator;
use crate::service::ConversionService;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Convert {
        from: String,
        to: String,
        amount: Option<String>,
        with_history: bool,
    },
    Currencies,
}

/// Loads the config from `config_path` or the default location, then applies
/// `FXCONV_*` environment overrides.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    config.with_env_overrides()
}

fn build_service(config: &AppConfig) -> Result<ConversionService> {
    let orchestrator = RateFetchOrchestrator::from_config(config)?;
    info!(sources = ?orchestrator.source_names(), "Rate sources ready");
    Ok(ConversionService::new(orchestrator))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Currencies => {
            cli::currencies::run();
            Ok(())
        }
        AppCommand::Serve => {
            let config = load_config(config_path)?;
            debug!("Loaded config: {config:#?}");
            let service = build_service(&config)?;
            server::serve(&config.server, server::AppState::new(service)).await
        }
        AppCommand::Convert {
            from,
            to,
            amount,
            with_history,
        } => {
            let from: CurrencyCode = from.parse()?;
            let to: CurrencyCode = to.parse()?;
            let config = load_config(config_path)?;
            debug!("Loaded config: {config:#?}");
            let service = build_service(&config)?;
            cli::convert::run(
                &service,
                &RateQuery::new(from, to),
                amount.as_deref(),
                with_history,
            )
            .await
        }
    }
}
