#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! # Structured Logging for Capability Generation
//!
//! Generation runs inside build scripts and orchestration tools, so it
//! never installs a subscriber on its own. Tools that want output call
//! [`init_tracing`]; the `RUST_LOG` filter syntax applies on top of the
//! configured default level.

use std::time::{Duration, Instant};

use tracing::{Level, Span, debug, info, span, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logging configuration for generation tools
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default level when `RUST_LOG` does not say otherwise
    pub log_level: Level,
    /// Include the event target (module path) in output
    pub with_target: bool,
    /// Write to stderr instead of stdout
    ///
    /// Build scripts must keep stdout free for `cargo::` directives.
    pub to_stderr: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self { log_level: Level::INFO, with_target: true, to_stderr: true }
    }
}

impl TracingConfig {
    /// Debug-level logging
    #[must_use]
    pub fn debug() -> Self {
        Self { log_level: Level::DEBUG, ..Default::default() }
    }

    /// Set the default level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Send output to stdout
    #[must_use]
    pub fn to_stdout(mut self) -> Self {
        self.to_stderr = false;
        self
    }
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a global subscriber was already set, in which case
/// the existing one is left in place.
///
/// ```no_run
/// use tlscaps_build::logging::{TracingConfig, init_tracing};
///
/// init_tracing(&TracingConfig::debug());
/// ```
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter =
        EnvFilter::builder().with_default_directive(config.log_level.into()).from_env_lossy();

    let installed = if config.to_stderr {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(config.with_target).with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(config.with_target))
            .with(filter)
            .try_init()
    };
    installed.is_ok()
}

/// Timed span around one generation step
#[derive(Debug)]
pub struct StepSpan {
    span: Span,
    start_time: Instant,
}

impl StepSpan {
    /// Span for writing an artifact to `path`
    pub fn generate(path: &std::path::Path) -> Self {
        let span = span!(Level::INFO, "tlscaps_generate", path = %path.display());
        span.in_scope(|| debug!("resolving capability set"));
        Self { span, start_time: Instant::now() }
    }

    /// Span for loading an artifact from `path`
    pub fn load(path: &std::path::Path) -> Self {
        let span = span!(Level::INFO, "tlscaps_load", path = %path.display());
        span.in_scope(|| debug!("loading capability artifact"));
        Self { span, start_time: Instant::now() }
    }

    /// Time since the span was opened
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Run `f` inside the span
    pub fn in_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.span.in_scope(f)
    }

    /// Close the span successfully
    pub fn complete(self, summary: &str) {
        let elapsed = self.start_time.elapsed();
        self.span.in_scope(|| {
            info!(elapsed_us = elapsed.as_micros() as u64, "{summary}");
        });
    }

    /// Close the span with an error
    pub fn error<E>(self, error: &E)
    where
        E: std::error::Error,
    {
        let elapsed = self.start_time.elapsed();
        self.span.in_scope(|| {
            warn!(error = %error, elapsed_us = elapsed.as_micros() as u64, "capability step failed");
        });
    }
}
