//! Logging setup
//!
//! Console output always; JSON files rolled daily when a log directory is
//! configured. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix of the rolling log files
pub const LOG_FILE_PREFIX: &str = "rollcall.log";

pub type LoggingResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Build the level filter: `RUST_LOG` if set, the configured level otherwise
pub fn filter(config: &LoggingConfig) -> LoggingResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer when dropped, so keep it
/// alive for as long as the process logs.
pub fn init(config: &LoggingConfig) -> LoggingResult<Option<WorkerGuard>> {
    let env_filter = filter(config)?;

    let (console_text, console_json) = if config.json {
        let layer = fmt::layer().json().with_writer(io::stderr);
        (None, Some(layer))
    } else {
        let layer = fmt::layer().with_target(true).with_writer(io::stderr);
        (Some(layer), None)
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_thread_ids(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .try_init()?;

    tracing::debug!("Logging initialized - level: {}", config.level);
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_builds_filter() {
        let config = LoggingConfig {
            level: "rollcall_controller=debug,kube=warn".to_string(),
            ..Default::default()
        };
        assert!(filter(&config).is_ok());
    }

    #[test]
    fn test_default_logging_is_console_only() {
        let config = LoggingConfig::default();
        assert!(config.log_dir.is_none());
        assert!(!config.json);
    }
}
