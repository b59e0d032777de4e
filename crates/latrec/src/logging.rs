//! Structured logging for applications built on latrec
//!
//! The numeric crates only emit `tracing` events: construction and
//! convergence at `debug`, every iteration at `trace`, and exhausted
//! iteration budgets at `warn`. This module installs a `tracing-subscriber`
//! formatter that makes them visible.
//!
//! # Example
//!
//! ```no_run
//! use latrec::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_filter("latrec_latent=debug,warn"),
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default `latrec_latent=info,warn`)
//! - `LATREC_LOG_FORMAT`: `pretty`, `compact` or `json` (default `pretty`)

use anyhow::Result;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Environment variable selecting the output format
pub const FORMAT_ENV: &str = "LATREC_LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "latrec_latent=info,warn";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to `Pretty` for anything unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `latrec_latent=trace`
    pub filter: String,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_file: bool,
    pub with_line_number: bool,
}

impl Default for LoggingConfig {
    /// Settings from `LATREC_LOG_FORMAT` and `RUST_LOG`
    fn default() -> Self {
        let format = std::env::var(FORMAT_ENV)
            .map(|s| LogFormat::parse(&s))
            .unwrap_or_default();
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

        Self {
            format,
            filter,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_file: false,
            with_line_number: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_ansi(mut self, with_ansi: bool) -> Self {
        self.with_ansi = with_ansi;
        self
    }

    /// Include source file and line in every event
    pub fn with_location(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self.with_line_number = enabled;
        self
    }
}

/// Formatting layer for `config`, filtered by its directive
///
/// # Errors
///
/// Fails if the filter directive does not parse.
pub fn build_layer(config: &LoggingConfig) -> Result<Box<dyn Layer<Registry> + Send + Sync>> {
    let filter = EnvFilter::try_new(&config.filter)?;
    let base = fmt::layer()
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids)
        .with_file(config.with_file)
        .with_line_number(config.with_line_number);

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().with_ansi(config.with_ansi).boxed(),
        LogFormat::Compact => base.compact().with_ansi(config.with_ansi).boxed(),
        LogFormat::Json => base.json().boxed(),
    };
    Ok(layer.with_filter(filter).boxed())
}

/// Install the global subscriber described by `config`
///
/// # Errors
///
/// Fails if the filter directive does not parse or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let layer = build_layer(&config)?;
    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

/// [`init_logging`] with settings taken from the environment
pub fn init_from_env() -> Result<()> {
    init_logging(LoggingConfig::default())
}
