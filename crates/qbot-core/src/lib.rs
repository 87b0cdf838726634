//! # qbot Core
//!
//! Inbound event dispatch for the qbot client.
//!
//! The gateway delivers frames of the form `{ op, s, t, id, d }`. This crate
//! classifies each frame by `(op, t)`, decodes `d` into the record shape that
//! tag is known to carry, and hands the record to whichever callback the
//! application registered for that category.
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌───────────────┐    ┌─────────────────┐
//! │ Envelope │───▶│ Dispatcher │───▶│ routing table │───▶│ decode_payload  │
//! └──────────┘    └─────┬──────┘    └───────────────┘    └────────┬────────┘
//!                       │ no route                                 ▼
//!                       ▼                                 ┌─────────────────┐
//!                 plain handler                           │ HandlerRegistry │
//!                 (or dropped)                            │     slot        │
//!                                                         └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use qbot_core::{Dispatcher, Envelope, HandlerRegistry};
//!
//! # futures::executor::block_on(async {
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//!
//! let mut registry = HandlerRegistry::new();
//! registry.on_message(move |_envelope, msg| {
//!     let counter = Arc::clone(&counter);
//!     async move {
//!         assert_eq!(msg.content, "hi");
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//! });
//!
//! let dispatcher = Dispatcher::new(registry);
//! let frame = br#"{"op":0,"s":1,"t":"MESSAGE_CREATE","d":{"id":"m1","content":"hi"}}"#;
//! dispatcher
//!     .dispatch(Envelope::from_frame(&frame[..]).unwrap())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! # });
//! ```

pub mod decode;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod model;
pub mod registry;
pub mod routing;

pub use decode::{PAYLOAD_FIELD, decode_field, decode_payload};
pub use dispatcher::Dispatcher;
pub use envelope::{Envelope, EventType, OpCode};
pub use error::{DecodeError, DecodeResult, DispatchError, DispatchResult, HandlerResult};
pub use registry::{Handler, HandlerRegistry, PlainHandler, into_handler};
pub use routing::{Route, lookup, routed_event_types};

/// Prelude for common imports.
pub mod prelude {
    pub use super::model::*;
    pub use super::{
        DispatchError, DispatchResult, Dispatcher, Envelope, EventType, HandlerRegistry,
        HandlerResult, OpCode,
    };
}
