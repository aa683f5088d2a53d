//! Diagnostics logging for the plugins
//!
//! Check agents parse stdout, so everything here is written to stderr.
//! The agent stores that stream verbatim, so it carries no ANSI colour codes.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

/// Install a stderr `tracing` subscriber, filtered by `RUST_LOG`
///
/// Calling this twice is harmless: the second subscriber is rejected and
/// the first one stays in place.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = build(env_filter, std::io::stderr);

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logger initialization failed: {}", error);
    }
}

fn build<W>(env_filter: EnvFilter, make_writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .finish()
}
