//! Handler registry: one optional callback per event category.
//!
//! The embedding application builds a [`HandlerRegistry`], fills in the
//! categories it cares about, and moves it into a
//! [`Dispatcher`](crate::Dispatcher). Categories left empty are decoded and
//! then dropped silently. The `plain` slot receives every frame that has no
//! route at all.
//!
//! ```rust,ignore
//! let mut registry = HandlerRegistry::new();
//! registry
//!     .on_at_message(|envelope, msg| async move {
//!         tracing::info!(id = %msg.id, "at-message: {}", msg.content_without_mentions());
//!         Ok(())
//!     })
//!     .on_plain(|envelope, raw| async move {
//!         tracing::debug!(event_type = %envelope.event_type, len = raw.len(), "unrouted frame");
//!         Ok(())
//!     });
//!
//! let dispatcher = Dispatcher::new(registry);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use crate::decode::decode_payload;
use crate::envelope::Envelope;
use crate::error::{DispatchError, DispatchResult, HandlerResult};
use crate::model::{
    AudioAction, Channel, ForumAuditResult, Guild, Interaction, Member, Message, MessageAudit,
    MessageDelete, MessageReaction, Post, Reply, Thread,
};

/// A registered callback for records of type `T`.
pub type Handler<T> =
    Arc<dyn Fn(Arc<Envelope>, T) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// The fallback callback. Receives the envelope and the **whole** raw frame.
pub type PlainHandler = Handler<Arc<[u8]>>;

/// Boxes a closure returning a future into a [`Handler`].
pub fn into_handler<T, F, Fut>(f: F) -> Handler<T>
where
    T: 'static,
    F: Fn(Arc<Envelope>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(
        move |envelope: Arc<Envelope>, record: T| -> BoxFuture<'static, HandlerResult> {
            Box::pin(f(envelope, record))
        },
    )
}

/// Decode `envelope.raw` into `T`, then hand it to `slot` if one is set.
///
/// A decode failure returns before the slot is looked at.
async fn run<T>(envelope: Arc<Envelope>, slot: Option<&Handler<T>>) -> DispatchResult
where
    T: DeserializeOwned + Send + 'static,
{
    let record: T = decode_payload(&envelope.raw)?;
    match slot {
        Some(handler) => handler(envelope, record)
            .await
            .map_err(DispatchError::Handler),
        None => Ok(()),
    }
}

macro_rules! handler_registry {
    ($( $(#[$doc:meta])* $slot:ident: $record:ty => $setter:ident; )*) => {
        /// Table of optional per-category callbacks plus the `plain` fallback.
        ///
        /// Every slot starts empty. Setting a slot twice keeps only the last
        /// callback.
        #[derive(Default, Clone)]
        pub struct HandlerRegistry {
            $( $slot: Option<Handler<$record>>, )*
            plain: Option<PlainHandler>,
        }

        impl HandlerRegistry {
            $(
                $(#[$doc])*
                pub fn $setter<F, Fut>(&mut self, handler: F) -> &mut Self
                where
                    F: Fn(Arc<Envelope>, $record) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = HandlerResult> + Send + 'static,
                {
                    self.$slot = Some(into_handler(handler));
                    self
                }
            )*

            /// Names of the categories that currently have a callback.
            pub fn registered(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$slot.is_some() {
                        names.push(stringify!($slot));
                    }
                )*
                if self.plain.is_some() {
                    names.push("plain");
                }
                names
            }
        }

        /// One decode-and-dispatch routine per category.
        pub(crate) mod route {
            use super::*;

            $(
                pub(crate) fn $slot<'a>(
                    registry: &'a HandlerRegistry,
                    envelope: Arc<Envelope>,
                ) -> BoxFuture<'a, DispatchResult> {
                    Box::pin(run::<$record>(envelope, registry.$slot.as_ref()))
                }
            )*
        }
    };
}

handler_registry! {
    /// `GUILD_CREATE`, `GUILD_UPDATE`, `GUILD_DELETE`.
    guild: Guild => on_guild;
    /// `CHANNEL_CREATE`, `CHANNEL_UPDATE`, `CHANNEL_DELETE`.
    channel: Channel => on_channel;
    /// `GUILD_MEMBER_ADD`, `GUILD_MEMBER_UPDATE`, `GUILD_MEMBER_REMOVE`.
    guild_member: Member => on_guild_member;
    /// `MESSAGE_CREATE` (private-domain bots only).
    message: Message => on_message;
    /// `MESSAGE_DELETE`.
    message_delete: MessageDelete => on_message_delete;
    /// `MESSAGE_REACTION_ADD`, `MESSAGE_REACTION_REMOVE`.
    message_reaction: MessageReaction => on_message_reaction;
    /// `AT_MESSAGE_CREATE`.
    at_message: Message => on_at_message;
    /// `PUBLIC_MESSAGE_DELETE`.
    public_message_delete: MessageDelete => on_public_message_delete;
    /// `DIRECT_MESSAGE_CREATE`.
    direct_message: Message => on_direct_message;
    /// `DIRECT_MESSAGE_DELETE`.
    direct_message_delete: MessageDelete => on_direct_message_delete;
    /// `AUDIO_START`, `AUDIO_FINISH`, `AUDIO_ON_MIC`, `AUDIO_OFF_MIC`.
    audio: AudioAction => on_audio;
    /// `MESSAGE_AUDIT_PASS`, `MESSAGE_AUDIT_REJECT`.
    message_audit: MessageAudit => on_message_audit;
    /// `FORUM_THREAD_CREATE`, `FORUM_THREAD_UPDATE`, `FORUM_THREAD_DELETE`.
    thread: Thread => on_thread;
    /// `FORUM_POST_CREATE`, `FORUM_POST_DELETE`.
    post: Post => on_post;
    /// `FORUM_REPLY_CREATE`, `FORUM_REPLY_DELETE`.
    reply: Reply => on_reply;
    /// `FORUM_PUBLISH_AUDIT_RESULT`.
    forum_audit: ForumAuditResult => on_forum_audit;
    /// `INTERACTION_CREATE`.
    interaction: Interaction => on_interaction;
    /// `C2C_MESSAGE_CREATE`.
    c2c_message: Message => on_c2c_message;
    /// `GROUP_AT_MESSAGE_CREATE`.
    group_at_message: Message => on_group_at_message;
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback for frames that have no route.
    ///
    /// The callback receives the whole frame, not just the `d` payload.
    pub fn on_plain<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Arc<Envelope>, Arc<[u8]>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.plain = Some(into_handler(handler));
        self
    }

    /// Returns `true` if no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.registered().is_empty()
    }

    pub(crate) fn plain(&self) -> Option<&PlainHandler> {
        self.plain.as_ref()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}
