//! Typed event records.
//!
//! One record shape per event family. Each dispatch tag decodes into exactly
//! one of these; several tags (and several handler categories) may share a
//! shape:
//!
//! ```text
//! GUILD_*                          → Guild
//! CHANNEL_*                        → Channel
//! GUILD_MEMBER_*                   → Member
//! MESSAGE_CREATE, AT_MESSAGE_CREATE,
//! DIRECT_MESSAGE_CREATE,
//! C2C_MESSAGE_CREATE,
//! GROUP_AT_MESSAGE_CREATE          → Message
//! MESSAGE_DELETE, PUBLIC_MESSAGE_DELETE,
//! DIRECT_MESSAGE_DELETE            → MessageDelete
//! MESSAGE_REACTION_*               → MessageReaction
//! MESSAGE_AUDIT_*                  → MessageAudit
//! AUDIO_*                          → AudioAction
//! FORUM_THREAD_*                   → Thread
//! FORUM_POST_*                     → Post
//! FORUM_REPLY_*                    → Reply
//! FORUM_PUBLISH_AUDIT_RESULT       → ForumAuditResult
//! INTERACTION_CREATE               → Interaction
//! ```
//!
//! Records default every field so that sparse payloads still decode. An
//! explicit `null` counts as absent; a field that is present with the wrong
//! JSON type is a decode error.

use serde::{Deserialize, Deserializer};

pub mod audio;
pub mod forum;
pub mod guild;
pub mod interaction;
pub mod message;

pub use audio::AudioAction;
pub use forum::{ForumAuditResult, Post, PostInfo, Reply, ReplyInfo, Thread, ThreadInfo};
pub use guild::{Channel, Guild, Member, User};
pub use interaction::{Interaction, InteractionData};
pub use message::{
    Embed, EmbedField, Emoji, Message, MessageAttachment, MessageAudit, MessageDelete,
    MessageReaction, MessageReference, ReactionTarget, ReactionTargetKind,
};

/// Field deserializer reading `null` as the field's default value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
