//! Envelope dispatcher.
//!
//! [`Dispatcher::dispatch`] is the single entry point for inbound frames:
//!
//! 1. look up `(op, event_type)` in the [routing table](crate::routing);
//! 2. if there is a route, run it and return its result unchanged;
//! 3. otherwise hand the frame to the `plain` fallback if one is registered;
//! 4. otherwise drop it and return `Ok(())`.
//!
//! ```rust,ignore
//! use qbot_core::{Dispatcher, Envelope, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.on_message(|_, msg| async move {
//!     println!("{}: {}", msg.id, msg.content);
//!     Ok(())
//! });
//!
//! let dispatcher = Dispatcher::new(registry);
//! dispatcher.dispatch(Envelope::from_frame(frame)?).await?;
//! ```

use std::sync::Arc;

use tracing::{Instrument, debug_span, trace};

use crate::envelope::Envelope;
use crate::error::{DispatchError, DispatchResult};
use crate::registry::HandlerRegistry;
use crate::routing;

/// Routes envelopes to the handlers of a [`HandlerRegistry`].
///
/// The registry is frozen when the dispatcher is built. Cloning a dispatcher
/// is cheap, and clones may dispatch concurrently.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher that owns `registry`.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Returns the registry this dispatcher reads from.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatches one envelope.
    ///
    /// Decode failures and handler errors are returned to the caller; an
    /// envelope nobody handles is `Ok(())`.
    pub async fn dispatch(&self, envelope: Envelope) -> DispatchResult {
        let span = debug_span!(
            "dispatch",
            op = %envelope.op,
            event_type = %envelope.event_type,
            seq = ?envelope.seq,
        );

        self.dispatch_inner(Arc::new(envelope)).instrument(span).await
    }

    async fn dispatch_inner(&self, envelope: Arc<Envelope>) -> DispatchResult {
        if let Some(route) = routing::lookup(envelope.op, &envelope.event_type) {
            trace!(category = route.category(), "Routing envelope");
            return route.call(&self.registry, envelope).await;
        }

        match self.registry.plain() {
            Some(plain) => {
                trace!("No route, passing frame to plain handler");
                let raw = Arc::clone(&envelope.raw);
                plain(envelope, raw).await.map_err(DispatchError::Handler)
            }
            None => {
                trace!("No route and no plain handler, dropping envelope");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{EventType, OpCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let c = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&c), c)
    }

    #[tokio::test]
    async fn test_dispatch_empty_registry() {
        let dispatcher = Dispatcher::new(HandlerRegistry::new());
        let envelope = Envelope::new(
            OpCode::Dispatch,
            EventType::GuildCreate,
            br#"{"d":{"id":"g1"}}"#.to_vec(),
        );
        assert!(dispatcher.dispatch(envelope).await.is_ok());
    }

    #[tokio::test]
    async fn test_routed_envelope_skips_plain() {
        let (guild_calls, guild_seen) = counter();
        let (plain_calls, plain_seen) = counter();

        let mut registry = HandlerRegistry::new();
        registry
            .on_guild(move |_, guild| {
                let c = Arc::clone(&guild_calls);
                async move {
                    assert_eq!(guild.id, "g1");
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .on_plain(move |_, _| {
                let c = Arc::clone(&plain_calls);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            });

        let dispatcher = Dispatcher::new(registry);
        let envelope = Envelope::new(
            OpCode::Dispatch,
            EventType::GuildUpdate,
            br#"{"d":{"id":"g1","name":"dice"}}"#.to_vec(),
        );
        dispatcher.dispatch(envelope).await.unwrap();

        assert_eq!(guild_seen.load(Ordering::SeqCst), 1);
        assert_eq!(plain_seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_routed_without_handler_does_not_fall_back() {
        let (plain_calls, plain_seen) = counter();

        let mut registry = HandlerRegistry::new();
        registry.on_plain(move |_, _| {
            let c = Arc::clone(&plain_calls);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let dispatcher = Dispatcher::new(registry);
        let envelope = Envelope::new(
            OpCode::Dispatch,
            EventType::AudioStart,
            br#"{"d":{"guild_id":"g1"}}"#.to_vec(),
        );
        dispatcher.dispatch(envelope).await.unwrap();

        assert_eq!(plain_seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let (calls, seen) = counter();

        let mut registry = HandlerRegistry::new();
        registry.on_channel(move |_, _| {
            let c = Arc::clone(&calls);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let dispatcher = Dispatcher::new(registry);
        let clone = dispatcher.clone();
        let frame = br#"{"d":{"id":"c1"}}"#;

        dispatcher
            .dispatch(Envelope::new(
                OpCode::Dispatch,
                EventType::ChannelCreate,
                frame.to_vec(),
            ))
            .await
            .unwrap();
        clone
            .dispatch(Envelope::new(
                OpCode::Dispatch,
                EventType::ChannelDelete,
                frame.to_vec(),
            ))
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
