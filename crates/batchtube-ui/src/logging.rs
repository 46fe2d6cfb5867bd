//! Structured logging for the browser client.
//!
//! Uses `tracing-subscriber`'s fmt layer with a writer that forwards each
//! formatted line to the browser console at the matching console level.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{MakeWriter, format::FmtSpan};
use tracing_subscriber::util::SubscriberInitExt;

/// Crates whose events pass the filter at the configured level.
const OWN_TARGETS: [&str; 2] = ["batchtube_core", "batchtube_ui"];

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Maximum level for our own crates (a `tracing` level name).
    pub level: String,
    /// Maximum level for everything else.
    pub dependency_level: Level,
    /// Whether to include the target module in each line.
    pub include_target: bool,
    /// Whether to include file/line info in each line.
    pub include_file_line: bool,
    /// Whether to log span events (enter/exit).
    pub log_span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose configuration for debug builds.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            dependency_level: Level::INFO,
            include_target: true,
            include_file_line: true,
            log_span_events: true,
        }
    }

    /// Quiet configuration for release builds.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            dependency_level: Level::WARN,
            include_target: false,
            include_file_line: false,
            log_span_events: false,
        }
    }

    /// Detect configuration based on build type.
    #[must_use]
    pub fn auto() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Set the level for our own crates.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Filter directive built from this configuration.
    pub fn directive(&self) -> String {
        let mut directive = level_to_directive(self.dependency_level).to_string();
        for target in OWN_TARGETS {
            directive.push_str(&format!(",{target}={}", self.level.trim()));
        }
        directive
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level could not be turned into a filter.
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Install the console subscriber.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let directive = config.directive();
    let filter = EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.clone(),
        reason: e.to_string(),
    })?;

    let span_events = if config.log_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    // No clock on wasm32-unknown-unknown, and the console does not render ANSI.
    tracing_subscriber::fmt()
        .with_writer(ConsoleWriter)
        .without_time()
        .with_ansi(false)
        .with_level(false)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(span_events)
        .with_env_filter(filter)
        .finish()
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

const fn level_to_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Makes one [`ConsoleLine`] per event.
#[derive(Debug, Clone, Copy)]
struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(*meta.level())
    }
}

/// Buffers one formatted event and hands it to the console on drop.
struct ConsoleLine {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleLine {
    const fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if line.is_empty() {
            return;
        }
        let value = wasm_bindgen::JsValue::from_str(line);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&value),
            Level::WARN => web_sys::console::warn_1(&value),
            Level::INFO => web_sys::console::info_1(&value),
            Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&value),
        }
    }
}
