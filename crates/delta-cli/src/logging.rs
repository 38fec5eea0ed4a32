use crate::config::{LogConfig, LogFormat};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Initializes the process-global subscriber once (spec §4.12): compact
/// text when attached to a terminal or when `format` is `Human`, otherwise
/// newline-delimited JSON suited to log aggregation.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = config.format == LogFormat::Json || !atty::is(atty::Stream::Stdout);

    if use_json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
