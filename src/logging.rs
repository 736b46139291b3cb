use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "streamscout.log";

/// Initialize structured logging based on configuration
///
/// `RUST_LOG` wins over the configured level. When a log directory is set,
/// output goes to a daily rolling file and the returned guard must be kept
/// alive until shutdown so buffered lines are flushed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = build_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let (writer, guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    if config.format.as_str() == "json" {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_line_number(true);

        match writer {
            Some(writer) => registry.with(json_layer.with_writer(writer)).try_init()?,
            None => registry.with(json_layer).try_init()?,
        }
    } else {
        let pretty_layer = fmt::layer()
            .pretty()
            .with_target(true)
            .with_line_number(true)
            .with_file(false);

        match writer {
            Some(writer) => registry
                .with(pretty_layer.with_ansi(false).with_writer(writer))
                .try_init()?,
            None => registry.with(pretty_layer).try_init()?,
        }
    }

    Ok(guard)
}

fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    // "streamscout=debug,reqwest=warn" style directives pass through as-is
    if level.contains('=') {
        return EnvFilter::try_new(level).map_err(|e| anyhow::anyhow!("Invalid log filter: {e}"));
    }

    Ok(EnvFilter::new(parse_log_level(level)?.to_string()))
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> anyhow::Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(anyhow::anyhow!("Invalid log level: {level}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(parse_log_level("trace").is_ok());
        assert!(parse_log_level("WARNING").is_ok());
        assert!(parse_log_level("error").is_ok());
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter("streamscout=debug,reqwest=warn").is_ok());
    }
}
