use onair::config::LoggingConfig;
use onair::logging::{
    DISABLE_FILE_LOG_ENV, LogContext, get_logger_with_context, init_logging, parse_log_level,
};

#[test]
fn init_is_idempotent_in_console_mode() {
    // SAFETY: set before the subscriber reads the environment
    unsafe { std::env::set_var(DISABLE_FILE_LOG_ENV, "1") };
    let cfg = LoggingConfig {
        level: "debug".to_string(),
        ..LoggingConfig::default()
    };
    assert!(init_logging(&cfg).is_ok());
    assert!(init_logging(&cfg).is_ok());

    let logger = get_logger_with_context(LogContext::new("it").with_timezone("UTC"));
    logger.info("integration logging works");
}

#[test]
fn level_names_parse() {
    assert!(parse_log_level("LOUD").is_err());
    assert_eq!(parse_log_level("warning").unwrap(), tracing::Level::WARN);
    assert_eq!(parse_log_level("Trace").unwrap(), tracing::Level::TRACE);
}
