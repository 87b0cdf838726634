//! `tracing-subscriber` setup.
//!
//! The subscriber is driven by a [`LoggingConfig`]. `RUST_LOG`, when set,
//! replaces the configured base level; per-target `filters` always apply on
//! top of it.
//!
//! ```rust,ignore
//! use qbot_runtime::{config::load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! Or without a config file:
//!
//! ```rust,ignore
//! use qbot_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("qbot_openapi=debug")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

const DEFAULT_LOG_FILE: &str = "qbot.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Alias used by the builder API.
pub type SpanEvents = SpanEventConfig;

fn fmt_span(events: SpanEvents) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
}

/// Installs the global subscriber described by `config`.
///
/// A subscriber that is already installed is left in place.
pub fn init_from_config(config: &LoggingConfig) {
    LoggingBuilder::from_config(config).init();
}

/// Assembles a filter, a formatter and a writer into a global subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    span_events: SpanEvents,
    extra_directives: Vec<String>,
    with_target: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Compact output to stdout at `info`.
    pub fn new() -> Self {
        Self::from_config(&LoggingConfig::default())
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            span_events: config.span_events,
            config: config.clone(),
            extra_directives: Vec::new(),
            with_target: true,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Adds a raw `EnvFilter` directive, e.g. `qbot_core=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.extra_directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    /// Writes to `path`, rotated by `rotation`.
    pub fn to_file(mut self, path: impl Into<PathBuf>, rotation: LogRotation) -> Self {
        self.config.output = LogOutput::File;
        self.config.file_path = Some(path.into());
        self.config.rotation = rotation;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.config.thread_ids = enabled;
        self
    }

    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.config.file_location = enabled;
        self
    }

    /// Base level first, then configured filters sorted by target, then
    /// directives added on the builder.
    fn filter_directives(&self) -> Vec<String> {
        let mut filters: Vec<_> = self.config.filters.iter().collect();
        filters.sort_by(|a, b| a.0.cmp(b.0));

        std::iter::once(self.config.level.as_str().to_string())
            .chain(filters.into_iter().map(|(target, level)| format!("{target}={level}")))
            .chain(self.extra_directives.iter().cloned())
            .collect()
    }

    fn build_filter(&self) -> EnvFilter {
        let mut directives = self.filter_directives().into_iter();
        let base = directives.next().unwrap_or_default();

        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));
        for directive in directives {
            match directive.parse() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(e) => warn!(%directive, error = %e, "Ignoring invalid log directive"),
            }
        }
        filter
    }

    fn make_writer(&self) -> BoxMakeWriter {
        match (self.config.output, self.config.file_path.as_deref()) {
            (LogOutput::Stdout, _) | (LogOutput::File, None) => BoxMakeWriter::new(std::io::stdout),
            (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
            (LogOutput::File, Some(path)) => {
                BoxMakeWriter::new(file_appender(path, self.config.rotation))
            }
        }
    }

    fn fmt_layer(&self) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(self.make_writer())
            .with_span_events(fmt_span(self.span_events))
            .with_target(self.with_target)
            .with_thread_ids(self.config.thread_ids)
            .with_file(self.config.file_location)
            .with_line_number(self.config.file_location);

        match self.config.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
        }
    }

    /// Installs the subscriber unless one is already set.
    pub fn init(self) {
        let _ = self.try_init();
    }

    pub fn try_init(self) -> Result<(), TryInitError> {
        let result = tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(self.build_filter())
            .try_init();

        if self.config.output == LogOutput::File && self.config.file_path.is_none() {
            warn!("File output requested without a path, logging to stdout instead");
        }
        result
    }
}

fn file_appender(path: &Path, rotation: LogRotation) -> RollingFileAppender {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));

    match rotation {
        LogRotation::Never => rolling::never(dir, name),
        LogRotation::Hourly => rolling::hourly(dir, name),
        LogRotation::Daily => rolling::daily(dir, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_event_flags() {
        assert_eq!(fmt_span(SpanEvents::NONE), FmtSpan::NONE);
        assert_eq!(
            fmt_span(SpanEvents::LIFECYCLE),
            FmtSpan::NEW | FmtSpan::CLOSE
        );
        assert_eq!(fmt_span(SpanEvents::FULL), FmtSpan::FULL);

        let exit_only = SpanEvents {
            exit: true,
            ..SpanEvents::NONE
        };
        assert_eq!(fmt_span(exit_only), FmtSpan::EXIT);
    }

    #[test]
    fn test_builder_from_config() {
        let mut config = LoggingConfig {
            level: LogLevel::Debug,
            output: LogOutput::Stderr,
            thread_ids: true,
            ..Default::default()
        };
        config.filters.insert("qbot_openapi".into(), LogLevel::Warn);
        config.filters.insert("qbot_core".into(), LogLevel::Trace);
        config.span_events.close = true;

        let builder = LoggingBuilder::from_config(&config).directive("hyper=off");
        assert_eq!(
            builder.filter_directives(),
            vec!["debug", "qbot_core=trace", "qbot_openapi=warn", "hyper=off"]
        );
        assert_eq!(builder.config.output, LogOutput::Stderr);
        assert!(builder.config.thread_ids);
        assert!(builder.with_target);
        assert_eq!(
            builder.span_events,
            SpanEvents {
                close: true,
                ..SpanEvents::NONE
            }
        );
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(LoggingBuilder::new().filter_directives(), vec!["info"]);
    }

    #[test]
    fn test_to_file() {
        let builder = LoggingBuilder::new().to_file("logs/bot.log", LogRotation::Daily);
        assert_eq!(builder.config.output, LogOutput::File);
        assert_eq!(builder.config.rotation, LogRotation::Daily);
        assert_eq!(
            builder.config.file_path.as_deref(),
            Some(Path::new("logs/bot.log"))
        );
    }
}
