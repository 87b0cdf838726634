//! # qbot
//!
//! Typed event dispatch for QQ bot gateway clients.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │  EventLoop  │────▶│ Dispatcher │────▶│ routing table │────▶│ typed handler    │──▶ MessageApi
//! │  (runtime)  │     │            │     └───────────────┘     │ (per category)   │
//! └─────────────┘     └─────┬──────┘                           └──────────────────┘
//!                           └──────▶ plain handler (frames with no route)
//! ```
//!
//! - **core**: envelope, partial decoder, event records, routing table,
//!   handler registry, dispatcher
//! - **openapi**: outbound message endpoints
//! - **runtime**: configuration, logging and the event loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use qbot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = QbotRuntime::new();
//!     let api: Arc<dyn MessageApi> = Arc::new(runtime.api()?);
//!
//!     let mut registry = HandlerRegistry::new();
//!     registry.on_at_message(move |_, msg| {
//!         let api = Arc::clone(&api);
//!         async move {
//!             let reply = MessageToCreate::text("pong").reply_to(&msg.id);
//!             api.post_message(&msg.channel_id, &reply).await?;
//!             Ok(())
//!         }
//!     });
//!
//!     runtime.run(registry, envelopes).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log format

pub use qbot_core as core;
pub use qbot_openapi as openapi;
pub use qbot_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use qbot::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use qbot_runtime::{EventLoop, QbotConfig, QbotRuntime, RuntimeStats};

    // Dispatch
    pub use qbot_core::prelude::*;

    // Outbound API
    pub use qbot_openapi::{ApiError, HttpMessageApi, MessageApi, MessageToCreate, Token};
}
