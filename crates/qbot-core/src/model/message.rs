//! Message records.
//!
//! Guild messages, @-messages, direct messages, single-user (C2C) messages and
//! group @-messages all share [`Message`]. Which one arrived is told apart by
//! the event tag, not by the record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::guild::{Member, User};
use super::nullable;

// ============================================================================
// Message
// ============================================================================

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Message ID.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Channel ID (guild and direct messages).
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    /// Guild ID (guild and direct messages).
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// Text content, with mentions encoded as `<@!user_id>`.
    #[serde(deserialize_with = "nullable")]
    pub content: String,
    /// Sent at (ISO 8601).
    #[serde(deserialize_with = "nullable")]
    pub timestamp: String,
    /// Last edited at (ISO 8601).
    #[serde(deserialize_with = "nullable")]
    pub edited_timestamp: String,
    /// Whether the message mentions everyone.
    #[serde(deserialize_with = "nullable")]
    pub mention_everyone: bool,
    /// Sender.
    pub author: Option<User>,
    /// Attachments.
    #[serde(deserialize_with = "nullable")]
    pub attachments: Vec<MessageAttachment>,
    /// Embeds.
    #[serde(deserialize_with = "nullable")]
    pub embeds: Vec<Embed>,
    /// Mentioned users.
    #[serde(deserialize_with = "nullable")]
    pub mentions: Vec<User>,
    /// Sender's guild membership.
    pub member: Option<Member>,
    /// Ark template payload, left undecoded.
    pub ark: Option<Value>,
    /// Per-channel sequence number.
    #[serde(deserialize_with = "nullable")]
    pub seq_in_channel: String,
    /// The message this one replies to.
    pub message_reference: Option<MessageReference>,
    /// Source guild of a direct message.
    #[serde(deserialize_with = "nullable")]
    pub src_guild_id: String,
    /// Whether this is a direct message.
    #[serde(deserialize_with = "nullable")]
    pub direct_message: bool,
    /// Group ID (group chat messages).
    #[serde(deserialize_with = "nullable")]
    pub group_id: String,
    /// Group open ID (group chat messages).
    #[serde(deserialize_with = "nullable")]
    pub group_openid: String,
}

impl Message {
    /// Returns `true` if `user_id` is among the mentioned users.
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|u| u.id == user_id)
    }

    /// Returns `true` for direct messages.
    pub fn is_direct(&self) -> bool {
        self.direct_message
    }

    /// Returns the content with `<@…>` / `<@!…>` mention markers removed and
    /// surrounding whitespace trimmed.
    pub fn content_without_mentions(&self) -> String {
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find("<@") {
            out.push_str(&rest[..start]);
            match rest[start..].find('>') {
                Some(end) => rest = &rest[start + end + 1..],
                None => {
                    rest = &rest[start..];
                    break;
                }
            }
        }
        out.push_str(rest);
        out.trim().to_string()
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAttachment {
    /// Download URL.
    #[serde(deserialize_with = "nullable")]
    pub url: String,
    /// MIME type.
    #[serde(deserialize_with = "nullable")]
    pub content_type: String,
    /// File name.
    #[serde(deserialize_with = "nullable")]
    pub filename: String,
    /// Size in bytes.
    #[serde(deserialize_with = "nullable")]
    pub size: i64,
    /// Image height.
    #[serde(deserialize_with = "nullable")]
    pub height: i32,
    /// Image width.
    #[serde(deserialize_with = "nullable")]
    pub width: i32,
}

/// An embed block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    /// Title.
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    /// Description.
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// Message-list preview text.
    #[serde(deserialize_with = "nullable")]
    pub prompt: String,
    /// Fields.
    #[serde(deserialize_with = "nullable")]
    pub fields: Vec<EmbedField>,
}

/// One field of an [`Embed`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedField {
    /// Field name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Field value.
    #[serde(deserialize_with = "nullable")]
    pub value: String,
}

/// Reference to a replied-to message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageReference {
    /// Referenced message ID.
    #[serde(deserialize_with = "nullable")]
    pub message_id: String,
    /// Whether to skip the error when the referenced message is gone.
    #[serde(deserialize_with = "nullable")]
    pub ignore_get_message_error: bool,
}

// ============================================================================
// Deletion
// ============================================================================

/// `MESSAGE_DELETE` / `PUBLIC_MESSAGE_DELETE` / `DIRECT_MESSAGE_DELETE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDelete {
    /// The deleted message (usually only IDs and author are populated).
    #[serde(deserialize_with = "nullable")]
    pub message: Message,
    /// Who deleted it.
    #[serde(deserialize_with = "nullable")]
    pub op_user: User,
}

impl MessageDelete {
    /// Returns `true` when the author removed their own message.
    pub fn is_self_delete(&self) -> bool {
        self.message
            .author
            .as_ref()
            .is_some_and(|author| author.id == self.op_user.id)
    }
}

// ============================================================================
// Reactions
// ============================================================================

/// `MESSAGE_REACTION_ADD` / `MESSAGE_REACTION_REMOVE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageReaction {
    /// Reacting user.
    #[serde(deserialize_with = "nullable")]
    pub user_id: String,
    /// Channel ID.
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    /// Guild ID.
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// What was reacted to.
    #[serde(deserialize_with = "nullable")]
    pub target: ReactionTarget,
    /// The emoji used.
    #[serde(deserialize_with = "nullable")]
    pub emoji: Emoji,
}

/// Target of a reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionTarget {
    /// Target ID.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Target type code, see [`ReactionTarget::kind`].
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind_code: i32,
}

impl ReactionTarget {
    /// Decodes the target type code.
    pub fn kind(&self) -> ReactionTargetKind {
        match self.kind_code {
            0 => ReactionTargetKind::Message,
            1 => ReactionTargetKind::Post,
            2 => ReactionTargetKind::Comment,
            3 => ReactionTargetKind::Reply,
            other => ReactionTargetKind::Unknown(other),
        }
    }
}

/// Kinds of reaction target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTargetKind {
    /// A chat message.
    Message,
    /// A forum post.
    Post,
    /// A comment.
    Comment,
    /// A reply.
    Reply,
    /// An unrecognised code.
    Unknown(i32),
}

/// An emoji.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emoji {
    /// Emoji ID.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// `1` for system emoji, `2` for unicode emoji.
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: i32,
}

// ============================================================================
// Audit
// ============================================================================

/// `MESSAGE_AUDIT_PASS` / `MESSAGE_AUDIT_REJECT` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAudit {
    /// Audit ID, as returned when the message was posted.
    #[serde(deserialize_with = "nullable")]
    pub audit_id: String,
    /// ID of the message once it passed audit.
    #[serde(deserialize_with = "nullable")]
    pub message_id: String,
    /// Guild ID.
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// Channel ID.
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    /// When the audit finished.
    #[serde(deserialize_with = "nullable")]
    pub audit_time: String,
    /// When the message was submitted.
    #[serde(deserialize_with = "nullable")]
    pub create_time: String,
    /// Per-channel sequence number.
    #[serde(deserialize_with = "nullable")]
    pub seq_in_channel: String,
}
