use crate::config::Config;
use crate::layer::EnrichLayer;
use crate::output::Output;
use crate::sink::LogSink;
use crate::writer_sink::WriterSink;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Build the subscriber used by [`init_tracing_with_sink`]: a
/// [`Registry`], the configured level threshold, then an [`EnrichLayer`].
///
/// Exposed so tests and applications can install it with
/// `tracing::subscriber::with_default` instead of globally.
pub fn subscriber(config: &Config, sink: Arc<dyn LogSink>) -> impl tracing::Subscriber + Send + Sync {
    let level = config.level_filter().unwrap_or_else(|e| {
        eprintln!("{e}, logging at info");
        LevelFilter::INFO
    });
    Registry::default()
        .with(level)
        .with(EnrichLayer::new(config, sink))
}

/// Install a global `tracing` subscriber that enriches every event
/// according to `config` and delivers it to `sink`.
///
/// **Effects**
///
/// All `tracing` events in the process pass through the enrichment
/// pipeline afterwards. Installing twice returns [`InitError::SetGlobal`].
pub fn init_tracing_with_sink(config: &Config, sink: Arc<dyn LogSink>) -> Result<(), InitError> {
    tracing::subscriber::set_global_default(subscriber(config, sink))?;
    Ok(())
}

/// Install a global `tracing` subscriber writing plain-text lines to the
/// destination named by `config`.
///
/// **Behavior**
///
/// The destination is resolved like [`Logger::new`](crate::logger::Logger::new):
/// an unusable file falls back to stderr with one diagnostic line.
pub fn init_tracing(config: &Config) -> Result<(), InitError> {
    let (output, fallback) = Output::resolve(config);
    if let Some(e) = fallback {
        eprintln!("log output unavailable, writing to stderr instead: {e}");
    }
    init_tracing_with_sink(config, Arc::new(WriterSink::from_output(output)))
}
