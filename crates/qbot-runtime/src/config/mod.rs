//! Configuration for the qbot runtime.
//!
//! Layered loading with figment (defaults, files, environment, overrides)
//! followed by validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    QbotConfig, SpanEventConfig,
};
pub use validation::validate_config;
