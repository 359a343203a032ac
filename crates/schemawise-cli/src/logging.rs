//! Tracing setup for the schemawise binary
//!
//! Logs always go to stderr so `--json` output on stdout stays parseable.
//! `RUST_LOG` takes precedence over the configured filter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "info,schemawise=debug";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset and `--verbose` is off
    pub default_filter: String,
    /// Emit stderr logs as JSON lines
    pub json: bool,
    /// Also write daily-rotated JSON logs into this directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn,schemawise=info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Filter directive in effect when `RUST_LOG` is unset
    pub fn effective_filter(&self, verbose: bool) -> &str {
        if verbose {
            VERBOSE_FILTER
        } else {
            &self.default_filter
        }
    }
}

/// Installs the global subscriber
///
/// The returned guard flushes the file writer; keep it alive until exit.
pub fn init(config: &LoggingConfig, verbose: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_filter(verbose)));

    let text_layer = (!config.json).then(|| {
        fmt::layer()
            .with_target(verbose)
            .with_writer(std::io::stderr)
    });
    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
    });

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "schemawise.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(
        json = config.json,
        log_dir = ?config.log_dir,
        "logging initialized"
    );
    Ok(guard)
}
