//! qbot Runtime - configuration, logging and the event loop.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `QbotConfig`)
//! - Logging setup (`LoggingBuilder`)
//! - The event loop feeding envelopes into a dispatcher (`EventLoop`)
//! - `QbotRuntime`, which wires the above together with the message API client
//!
//! ```ignore
//! use qbot_core::HandlerRegistry;
//! use qbot_runtime::QbotRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = QbotRuntime::new();
//!
//!     let mut registry = HandlerRegistry::new();
//!     registry.on_at_message(|_, msg| async move {
//!         tracing::info!("{}", msg.content_without_mentions());
//!         Ok(())
//!     });
//!
//!     // `envelopes` is any Stream<Item = Envelope>, e.g. from a gateway client.
//!     let stats = runtime.run(registry, envelopes).await?;
//!     tracing::info!(%stats, "Done");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, DispatchConfig, LoggingConfig, QbotConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{EventLoop, QbotRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
