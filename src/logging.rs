//! Structured logging and tracing for OnAir
//!
//! Console and daily-rolling file output through `tracing-subscriber`, with
//! optional per-layer levels and JSON formatting.

use crate::config::LoggingConfig;
use crate::error::{OnAirError, Result};
use std::path::Path;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod level;
mod state;
mod structured;

pub use level::{level_rank, min_level, parse_log_level, resolve_level};
pub use structured::{LogContext, StructuredLogger, get_logger, get_logger_with_context};

use state::{INIT_ERROR, INIT_ONCE, LOG_GUARD};

/// Environment variable that forces console-only logging
pub const DISABLE_FILE_LOG_ENV: &str = "ONAIR_DISABLE_FILE_LOG";

/// Initialize logging system based on configuration. Later calls are no-ops
/// that report the first call's outcome.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let base_level = parse_log_level(&config.level)?;
            let console_level = resolve_level(config.console_level.as_deref(), base_level);
            let file_level = resolve_level(config.file_level.as_deref(), base_level);

            // Most verbose level so layer-specific filters can down-filter
            let filter = build_env_filter(min_level(console_level, file_level));

            if should_use_console_only() {
                init_console_only_logging(filter, config.json_format, console_level);
                return Ok(());
            }

            init_file_logging(config, filter, console_level, file_level)
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(OnAirError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("onair={},tower_http=info", level).into())
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os(DISABLE_FILE_LOG_ENV).is_some()
}

fn console_layer<S>(json_format: bool, level: Level) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json_format {
        layer
            .json()
            .with_filter(LevelFilter::from_level(level))
            .boxed()
    } else {
        layer.with_filter(LevelFilter::from_level(level)).boxed()
    }
}

fn init_console_only_logging(filter: EnvFilter, json_format: bool, console_level: Level) {
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(json_format, console_level))
        .try_init();

    // Another subscriber (e.g. a test harness) may already be installed
    if result.is_ok() {
        info!(
            "Logging initialized - console_level: {:?}, console-only",
            console_level
        );
    }
}

/// Directory that receives the rolling files: the parent of a file path, or
/// the path itself when it has no extension
fn log_directory(file: &str) -> &Path {
    let p = Path::new(file);
    if p.extension().is_some() {
        p.parent().unwrap_or(p)
    } else {
        p
    }
}

fn init_file_logging(
    config: &LoggingConfig,
    filter: EnvFilter,
    console_level: Level,
    file_level: Level,
) -> Result<()> {
    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("onair")
        .filename_suffix("log")
        .max_log_files(usize::try_from(config.backup_count.max(1)).unwrap_or(usize::MAX))
        .build(log_directory(&config.file))
        .map_err(|e| OnAirError::io(format!("Failed to create log file appender: {}", e)))?;

    let (non_blocking_appender, guard) = non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let file_layer = {
        let base = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_ansi(false);
        if config.json_format {
            base.json()
                .with_filter(LevelFilter::from_level(file_level))
                .boxed()
        } else {
            base.with_filter(LevelFilter::from_level(file_level))
                .boxed()
        }
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);

    if config.console_output {
        subscriber
            .with(console_layer(config.json_format, console_level))
            .try_init()
            .map_err(|e| OnAirError::config(format!("Failed to install subscriber: {}", e)))?;
    } else {
        subscriber
            .try_init()
            .map_err(|e| OnAirError::config(format!("Failed to install subscriber: {}", e)))?;
    }

    info!(
        "Logging initialized - console_level: {:?}, file_level: {:?}, file: {}",
        console_level, file_level, config.file
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn layer_overrides_fall_back_to_base() {
        assert_eq!(resolve_level(Some("debug"), Level::INFO), Level::DEBUG);
        assert_eq!(resolve_level(Some("bogus"), Level::WARN), Level::WARN);
        assert_eq!(resolve_level(None, Level::ERROR), Level::ERROR);
        assert_eq!(min_level(Level::WARN, Level::DEBUG), Level::DEBUG);
    }

    #[test]
    fn log_directory_uses_parent_of_file() {
        assert_eq!(log_directory("/var/log/onair.log"), Path::new("/var/log"));
        assert_eq!(log_directory("/var/log/onair"), Path::new("/var/log/onair"));
    }

    #[test]
    fn test_log_context() {
        let context = LogContext::new("test")
            .with_timezone("Asia/Colombo")
            .with_field("day", "monday".to_string());

        assert_eq!(context.component, "test");
        assert_eq!(context.timezone.as_deref(), Some("Asia/Colombo"));
        assert_eq!(context.extra_fields.get("day"), Some(&"monday".to_string()));

        let logger = get_logger_with_context(context);
        assert_eq!(
            logger.format_fields(),
            "component=test,timezone=Asia/Colombo,day=monday"
        );
    }

    #[test]
    fn test_structured_logger() {
        init_logging(&LoggingConfig::default()).ok();

        let logger = get_logger("test_component");
        assert_eq!(logger.context.component, "test_component");

        // These should not panic
        logger.info("Test info message");
        logger.debug("Test debug message");
        logger.warn("Test warning message");
        logger.error("Test error message");
    }
}
