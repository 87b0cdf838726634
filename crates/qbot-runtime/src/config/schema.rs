//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use qbot_openapi::Token;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QbotConfig {
    /// Logging settings.
    pub logging: LoggingConfig,

    /// Bot credentials and API endpoint.
    pub bot: BotConfig,

    /// Event loop settings.
    pub dispatch: DispatchConfig,
}

// =============================================================================
// Bot
// =============================================================================

/// Bot credentials and API endpoint selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Application ID.
    pub app_id: String,

    /// Bot secret token.
    pub token: String,

    /// Use the sandbox endpoint.
    pub sandbox: bool,

    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            token: String::new(),
            sandbox: false,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30000
}

impl BotConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Credentials for the `Authorization` header.
    pub fn credentials(&self) -> Token {
        Token::bot(&self.app_id, &self.token)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Event loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Envelopes dispatched at the same time; 1 keeps arrival order.
    pub concurrency: usize,

    /// Log every envelope that has no route.
    pub log_unhandled: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            log_unhandled: false,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowercase name, as used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// When a log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
///
/// Every envelope is dispatched inside a `dispatch` span, so
/// [`SpanEventConfig::LIFECYCLE`] gives one open and one close line per
/// envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEventConfig {
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    /// Creation and close.
    pub const LIFECYCLE: Self = Self {
        new: true,
        close: true,
        ..Self::NONE
    };

    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level when `RUST_LOG` is not set.
    pub level: LogLevel,

    /// Line layout.
    pub format: LogFormat,

    /// Destination.
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    pub file_path: Option<PathBuf>,

    /// Log file rotation.
    pub rotation: LogRotation,

    /// Per-target levels, e.g. `qbot_core = "trace"`.
    pub filters: HashMap<String, LogLevel>,

    /// Span lifecycle events.
    pub span_events: SpanEventConfig,

    /// Include thread IDs.
    pub thread_ids: bool,

    /// Include file names and line numbers.
    pub file_location: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QbotConfig::default();
        assert_eq!(config.dispatch.concurrency, 1);
        assert!(!config.dispatch.log_unhandled);
        assert_eq!(config.bot.timeout(), Duration::from_secs(30));
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.output, LogOutput::Stdout);
    }

    #[test]
    fn test_credentials() {
        let bot = BotConfig {
            app_id: "101".into(),
            token: "secret".into(),
            ..Default::default()
        };
        assert_eq!(bot.credentials().authorization(), "Bot 101.secret");
    }
}
