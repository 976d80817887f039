use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Sets up the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the crate logs at info, or debug with
/// `verbose`, and dependencies stay at warn.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(build_filter(rust_log.as_deref(), verbose))
        .init();
}

/// Filter from explicit directives, or the crate defaults when they are
/// absent or unparsable.
pub fn build_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(verbose)))
}

fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,fxconv={level},tower_http={level}")
}
