//! Static routing table: `OpCode → EventType → Route`.
//!
//! The table is a literal, built the first time it is read and never
//! modified afterwards. Only [`OpCode::Dispatch`] frames carry events, so it
//! is the only operation code with entries; everything else (control
//! frames, unknown tags) has no route.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use futures::future::BoxFuture;

use crate::envelope::{Envelope, EventType, OpCode};
use crate::error::DispatchResult;
use crate::registry::{HandlerRegistry, route};

/// Signature of a decode-and-dispatch routine.
pub type RouteFn =
    for<'a> fn(&'a HandlerRegistry, Arc<Envelope>) -> BoxFuture<'a, DispatchResult>;

/// A routing table entry: the handler category and its routine.
#[derive(Clone, Copy)]
pub struct Route {
    category: &'static str,
    run: RouteFn,
}

impl Route {
    /// Name of the handler category this route feeds (e.g. `"at_message"`).
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Decodes the envelope and invokes the category's handler, if any.
    pub fn call<'a>(
        &self,
        registry: &'a HandlerRegistry,
        envelope: Arc<Envelope>,
    ) -> BoxFuture<'a, DispatchResult> {
        (self.run)(registry, envelope)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("category", &self.category)
            .finish()
    }
}

type RoutingTable = HashMap<OpCode, HashMap<EventType, Route>>;

static ROUTES: LazyLock<RoutingTable> =
    LazyLock::new(|| HashMap::from([(OpCode::Dispatch, dispatch_routes())]));

macro_rules! routes {
    ($( $category:ident => [$($tag:ident),+ $(,)?], )*) => {{
        let mut routes = HashMap::new();
        $($(
            routes.insert(
                EventType::$tag,
                Route {
                    category: stringify!($category),
                    run: route::$category,
                },
            );
        )+)*
        routes
    }};
}

fn dispatch_routes() -> HashMap<EventType, Route> {
    routes! {
        guild => [GuildCreate, GuildUpdate, GuildDelete],
        channel => [ChannelCreate, ChannelUpdate, ChannelDelete],
        guild_member => [GuildMemberAdd, GuildMemberUpdate, GuildMemberRemove],

        message => [MessageCreate],
        message_delete => [MessageDelete],
        message_reaction => [MessageReactionAdd, MessageReactionRemove],

        at_message => [AtMessageCreate],
        public_message_delete => [PublicMessageDelete],

        direct_message => [DirectMessageCreate],
        direct_message_delete => [DirectMessageDelete],

        audio => [AudioStart, AudioFinish, AudioOnMic, AudioOffMic],

        message_audit => [MessageAuditPass, MessageAuditReject],

        thread => [ForumThreadCreate, ForumThreadUpdate, ForumThreadDelete],
        post => [ForumPostCreate, ForumPostDelete],
        reply => [ForumReplyCreate, ForumReplyDelete],
        forum_audit => [ForumAuditResult],

        interaction => [InteractionCreate],

        c2c_message => [C2cMessageCreate],

        group_at_message => [GroupAtMessageCreate],
    }
}

/// Looks up the route for an `(op, event_type)` pair.
///
/// `None` means "no route", which is a normal outcome.
pub fn lookup(op: OpCode, event_type: &EventType) -> Option<Route> {
    ROUTES.get(&op)?.get(event_type).copied()
}

/// Every event tag that has a route under [`OpCode::Dispatch`].
pub fn routed_event_types() -> Vec<EventType> {
    ROUTES
        .get(&OpCode::Dispatch)
        .map(|routes| routes.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(tag: &str) -> Option<&'static str> {
        lookup(OpCode::Dispatch, &EventType::from(tag)).map(|r| r.category())
    }

    #[test]
    fn test_every_tag_has_its_category() {
        let expected = [
            ("GUILD_CREATE", "guild"),
            ("GUILD_UPDATE", "guild"),
            ("GUILD_DELETE", "guild"),
            ("CHANNEL_CREATE", "channel"),
            ("CHANNEL_UPDATE", "channel"),
            ("CHANNEL_DELETE", "channel"),
            ("GUILD_MEMBER_ADD", "guild_member"),
            ("GUILD_MEMBER_UPDATE", "guild_member"),
            ("GUILD_MEMBER_REMOVE", "guild_member"),
            ("MESSAGE_CREATE", "message"),
            ("MESSAGE_DELETE", "message_delete"),
            ("MESSAGE_REACTION_ADD", "message_reaction"),
            ("MESSAGE_REACTION_REMOVE", "message_reaction"),
            ("AT_MESSAGE_CREATE", "at_message"),
            ("PUBLIC_MESSAGE_DELETE", "public_message_delete"),
            ("DIRECT_MESSAGE_CREATE", "direct_message"),
            ("DIRECT_MESSAGE_DELETE", "direct_message_delete"),
            ("AUDIO_START", "audio"),
            ("AUDIO_FINISH", "audio"),
            ("AUDIO_ON_MIC", "audio"),
            ("AUDIO_OFF_MIC", "audio"),
            ("MESSAGE_AUDIT_PASS", "message_audit"),
            ("MESSAGE_AUDIT_REJECT", "message_audit"),
            ("FORUM_THREAD_CREATE", "thread"),
            ("FORUM_THREAD_UPDATE", "thread"),
            ("FORUM_THREAD_DELETE", "thread"),
            ("FORUM_POST_CREATE", "post"),
            ("FORUM_POST_DELETE", "post"),
            ("FORUM_REPLY_CREATE", "reply"),
            ("FORUM_REPLY_DELETE", "reply"),
            ("FORUM_PUBLISH_AUDIT_RESULT", "forum_audit"),
            ("INTERACTION_CREATE", "interaction"),
            ("C2C_MESSAGE_CREATE", "c2c_message"),
            ("GROUP_AT_MESSAGE_CREATE", "group_at_message"),
        ];

        for (tag, cat) in expected {
            assert_eq!(category(tag), Some(cat), "tag {tag}");
        }
        assert_eq!(routed_event_types().len(), expected.len());
    }

    #[test]
    fn test_unrouted_pairs() {
        assert!(category("READY").is_none());
        assert!(category("RESUMED").is_none());
        assert!(category("SOMETHING_NEW").is_none());
        assert!(category("").is_none());

        // Known tag under a non-dispatch op code.
        assert!(lookup(OpCode::Heartbeat, &EventType::MessageCreate).is_none());
        assert!(lookup(OpCode::Unknown(99), &EventType::GuildCreate).is_none());
    }
}
