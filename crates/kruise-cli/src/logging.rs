//! Subscriber setup from the manifest `logger` block

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use kruise_core::LoggerConfig;

use crate::error::{CliError, Result};

const DEFAULT_LEVEL: &str = "warn";

/// Filter directive when `RUST_LOG` is not set
///
/// `--debug` beats the manifest, the manifest beats the default.
pub fn default_directive(logger: &LoggerConfig, debug: bool) -> Result<&'static str> {
    let configured = logger.level_directive()?;
    if debug {
        return Ok("debug");
    }
    Ok(configured.unwrap_or(DEFAULT_LEVEL))
}

/// Install the global subscriber, writing to stderr
pub fn init(logger: &LoggerConfig, debug: bool) -> Result<()> {
    let directive = default_directive(logger, debug)?;
    let pattern = logger.time_pattern()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(logger.enable_caller)
        .with_line_number(logger.enable_caller);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match (logger.enable_timestamp, pattern) {
        (false, _) => fmt.without_time().boxed(),
        (true, Some(pattern)) => fmt.with_timer(ChronoLocal::new(pattern.to_string())).boxed(),
        (true, None) => fmt.with_timer(ChronoLocal::rfc_3339()).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| CliError::internal(format!("failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(level: Option<&str>) -> LoggerConfig {
        LoggerConfig {
            level: level.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_directive_precedence() {
        assert_eq!(default_directive(&logger(None), false).unwrap(), "warn");
        assert_eq!(default_directive(&logger(Some("info")), false).unwrap(), "info");
        assert_eq!(default_directive(&logger(Some("ERROR")), false).unwrap(), "error");
        assert_eq!(default_directive(&logger(Some("info")), true).unwrap(), "debug");
    }

    #[test]
    fn test_bad_level_is_config_error() {
        let err = default_directive(&logger(Some("loud")), true).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("loud"));
    }
}
