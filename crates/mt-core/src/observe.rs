//! Structured logging setup on top of `tracing-subscriber`.
//!
//! Library code only emits `tracing` events; binaries and test harnesses
//! call [`init_logging`] once to install a subscriber.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing_subscriber::{fmt as tfmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    /// Directive string, e.g. "mt_core=trace,mt_types=debug".
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub source_location: bool,
}

impl LogConfig {
    /// Verbose preset for adjoint debugging: every mapping call is traced.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Trace,
            format: LogFormat::Pretty,
            source_location: true,
            ..Default::default()
        }
    }

    /// The filter to install, plus the parse error of a rejected `filter`.
    fn env_filter(&self) -> (EnvFilter, Option<String>) {
        let fallback = || EnvFilter::new(self.level.to_string());
        match &self.filter {
            Some(custom) => match EnvFilter::try_new(custom) {
                Ok(filter) => (filter, None),
                Err(e) => (fallback(), Some(format!("{custom:?}: {e}"))),
            },
            None => (
                EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
                None,
            ),
        }
    }
}

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init_logging(config: &LogConfig) -> bool {
    let (filter, rejected) = config.env_filter();
    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tfmt::layer()
                    .json()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tfmt::layer()
                    .pretty()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tfmt::layer()
                    .compact()
                    .with_file(config.source_location)
                    .with_line_number(config.source_location),
            )
            .try_init(),
    };
    let installed = result.is_ok();
    if let Some(reason) = rejected {
        tracing::warn!(
            level = %config.level,
            "ignoring invalid log filter {reason}; using the level filter"
        );
    }
    installed
}
