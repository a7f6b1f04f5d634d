//! Tracing subscriber setup shared by the binaries
//!
//! Config loading logs before the configured subscriber can exist, so it runs
//! under [`with_bootstrap`], a scoped stderr subscriber. [`init`] then installs
//! the global one.

use crate::config::LoggingConfig;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Install the global subscriber writing to `writer`. `RUST_LOG` wins over
/// the configured level.
pub fn init<W>(config: &LoggingConfig, writer: W) -> Result<(), TryInitError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    build(config, writer).try_init()
}

/// Run `f` with a stderr subscriber at `level` active on this thread
pub fn with_bootstrap<T>(level: &str, f: impl FnOnce() -> T) -> T {
    bootstrap_to(level, std::io::stderr, f)
}

pub(crate) fn bootstrap_to<W, T>(level: &str, writer: W, f: impl FnOnce() -> T) -> T
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

fn build<W>(config: &LoggingConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter(&config.level));

    if config.is_json() {
        Box::new(registry.with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(writer),
        ))
    } else {
        Box::new(registry.with(tracing_subscriber::fmt::layer().with_writer(writer)))
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: &str) -> String {
    format!("imulog={level},tower_http={level}")
}
