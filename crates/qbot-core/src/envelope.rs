//! The inbound gateway frame.
//!
//! Every frame pushed by the gateway has the same outer shape:
//!
//! ```json
//! { "op": 0, "s": 42, "t": "MESSAGE_CREATE", "id": "…", "d": { … } }
//! ```
//!
//! [`Envelope`] keeps the classification fields (`op`, `t`, `s`, `id`) and the
//! complete frame bytes. The event payload under `d` is left untouched here;
//! it is decoded later by the route that knows its shape.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DecodeResult;

// ============================================================================
// OpCode
// ============================================================================

/// Gateway operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum OpCode {
    /// An event pushed by the server (`0`).
    Dispatch,
    /// Client heartbeat (`1`).
    Heartbeat,
    /// Client identify (`2`).
    Identity,
    /// Client resume (`6`).
    Resume,
    /// Server asks the client to reconnect (`7`).
    Reconnect,
    /// Identify or resume parameters were rejected (`9`).
    InvalidSession,
    /// First frame after connecting, carries the heartbeat interval (`10`).
    Hello,
    /// Heartbeat acknowledged (`11`).
    HeartbeatAck,
    /// HTTP callback acknowledgement (`12`).
    HttpCallbackAck,
    /// Webhook endpoint validation (`13`).
    CallbackValidation,
    /// Any code this client does not know about.
    Unknown(u8),
}

impl From<u8> for OpCode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identity,
            6 => Self::Resume,
            7 => Self::Reconnect,
            9 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            12 => Self::HttpCallbackAck,
            13 => Self::CallbackValidation,
            other => Self::Unknown(other),
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        match op {
            OpCode::Dispatch => 0,
            OpCode::Heartbeat => 1,
            OpCode::Identity => 2,
            OpCode::Resume => 6,
            OpCode::Reconnect => 7,
            OpCode::InvalidSession => 9,
            OpCode::Hello => 10,
            OpCode::HeartbeatAck => 11,
            OpCode::HttpCallbackAck => 12,
            OpCode::CallbackValidation => 13,
            OpCode::Unknown(code) => code,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

// ============================================================================
// EventType
// ============================================================================

macro_rules! event_types {
    ($( $(#[$doc:meta])* $variant:ident => $tag:literal, )*) => {
        /// The `t` tag of a dispatch frame.
        ///
        /// Unrecognised tags are kept verbatim in [`EventType::Other`]; a frame
        /// without a `t` field carries `Other("")`.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum EventType {
            $( $(#[$doc])* $variant, )*
            /// A tag this client does not know about.
            Other(String),
        }

        impl EventType {
            /// Returns the wire tag.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $tag, )*
                    Self::Other(tag) => tag.as_str(),
                }
            }
        }

        impl From<&str> for EventType {
            fn from(tag: &str) -> Self {
                match tag {
                    $( $tag => Self::$variant, )*
                    other => Self::Other(other.to_string()),
                }
            }
        }
    };
}

event_types! {
    /// Session established.
    Ready => "READY",
    /// Session resumed.
    Resumed => "RESUMED",

    GuildCreate => "GUILD_CREATE",
    GuildUpdate => "GUILD_UPDATE",
    GuildDelete => "GUILD_DELETE",

    ChannelCreate => "CHANNEL_CREATE",
    ChannelUpdate => "CHANNEL_UPDATE",
    ChannelDelete => "CHANNEL_DELETE",

    GuildMemberAdd => "GUILD_MEMBER_ADD",
    GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
    GuildMemberRemove => "GUILD_MEMBER_REMOVE",

    MessageCreate => "MESSAGE_CREATE",
    MessageDelete => "MESSAGE_DELETE",

    MessageReactionAdd => "MESSAGE_REACTION_ADD",
    MessageReactionRemove => "MESSAGE_REACTION_REMOVE",

    /// A message that @-mentions the bot in a guild channel.
    AtMessageCreate => "AT_MESSAGE_CREATE",
    PublicMessageDelete => "PUBLIC_MESSAGE_DELETE",

    DirectMessageCreate => "DIRECT_MESSAGE_CREATE",
    DirectMessageDelete => "DIRECT_MESSAGE_DELETE",

    AudioStart => "AUDIO_START",
    AudioFinish => "AUDIO_FINISH",
    AudioOnMic => "AUDIO_ON_MIC",
    AudioOffMic => "AUDIO_OFF_MIC",

    MessageAuditPass => "MESSAGE_AUDIT_PASS",
    MessageAuditReject => "MESSAGE_AUDIT_REJECT",

    ForumThreadCreate => "FORUM_THREAD_CREATE",
    ForumThreadUpdate => "FORUM_THREAD_UPDATE",
    ForumThreadDelete => "FORUM_THREAD_DELETE",
    ForumPostCreate => "FORUM_POST_CREATE",
    ForumPostDelete => "FORUM_POST_DELETE",
    ForumReplyCreate => "FORUM_REPLY_CREATE",
    ForumReplyDelete => "FORUM_REPLY_DELETE",
    ForumAuditResult => "FORUM_PUBLISH_AUDIT_RESULT",

    InteractionCreate => "INTERACTION_CREATE",

    /// A single-user (consumer to consumer) message.
    C2cMessageCreate => "C2C_MESSAGE_CREATE",
    /// A message that @-mentions the bot in a group chat.
    GroupAtMessageCreate => "GROUP_AT_MESSAGE_CREATE",
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// One inbound frame.
///
/// `raw` always holds the **whole** frame, including the `d` wrapper.
/// Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Operation code (`op`).
    pub op: OpCode,
    /// Event tag (`t`).
    pub event_type: EventType,
    /// Sequence number (`s`), present on dispatch frames.
    pub seq: Option<u32>,
    /// Event id (`id`), used to acknowledge or reply passively.
    pub id: Option<String>,
    /// The complete frame as received.
    pub raw: Arc<[u8]>,
}

/// Outer frame fields. `d` is skipped without being interpreted.
#[derive(Deserialize)]
struct FrameHeader {
    op: OpCode,
    #[serde(default)]
    s: Option<u32>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl Envelope {
    /// Creates an envelope from already-classified parts.
    pub fn new(op: OpCode, event_type: EventType, raw: impl Into<Arc<[u8]>>) -> Self {
        Self {
            op,
            event_type,
            seq: None,
            id: None,
            raw: raw.into(),
        }
    }

    /// Reads the frame header and keeps the full bytes as the body.
    pub fn from_frame(frame: impl Into<Arc<[u8]>>) -> DecodeResult<Self> {
        let raw: Arc<[u8]> = frame.into();
        let header: FrameHeader = serde_json::from_slice(&raw)?;

        let event_type = header
            .t
            .as_deref()
            .map(EventType::from)
            .unwrap_or_else(|| EventType::Other(String::new()));

        Ok(Self {
            op: header.op,
            event_type,
            seq: header.s,
            id: header.id,
            raw,
        })
    }

    /// Returns the raw frame bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip_unknown() {
        assert_eq!(OpCode::from(0), OpCode::Dispatch);
        assert_eq!(OpCode::from(10), OpCode::Hello);
        assert_eq!(OpCode::from(42), OpCode::Unknown(42));
        assert_eq!(u8::from(OpCode::Unknown(42)), 42);
        assert_eq!(u8::from(OpCode::CallbackValidation), 13);
    }

    #[test]
    fn test_event_type_tags() {
        assert_eq!(EventType::from("MESSAGE_CREATE"), EventType::MessageCreate);
        assert_eq!(
            EventType::from("FORUM_PUBLISH_AUDIT_RESULT"),
            EventType::ForumAuditResult
        );
        assert_eq!(EventType::C2cMessageCreate.as_str(), "C2C_MESSAGE_CREATE");

        let other = EventType::from("SOMETHING_NEW");
        assert_eq!(other, EventType::Other("SOMETHING_NEW".to_string()));
        assert_eq!(other.to_string(), "SOMETHING_NEW");
    }

    #[test]
    fn test_from_frame_reads_header() {
        let frame = br#"{"op":0,"s":7,"t":"AT_MESSAGE_CREATE","id":"evt-1","d":{"id":"m1"}}"#;
        let envelope = Envelope::from_frame(&frame[..]).unwrap();

        assert_eq!(envelope.op, OpCode::Dispatch);
        assert_eq!(envelope.event_type, EventType::AtMessageCreate);
        assert_eq!(envelope.seq, Some(7));
        assert_eq!(envelope.id.as_deref(), Some("evt-1"));
        assert_eq!(envelope.raw(), &frame[..]);
    }

    #[test]
    fn test_from_frame_control_frame() {
        let frame = br#"{"op":10,"d":{"heartbeat_interval":45000}}"#;
        let envelope = Envelope::from_frame(&frame[..]).unwrap();

        assert_eq!(envelope.op, OpCode::Hello);
        assert_eq!(envelope.event_type, EventType::Other(String::new()));
        assert_eq!(envelope.seq, None);
    }

    #[test]
    fn test_from_frame_rejects_garbage() {
        assert!(Envelope::from_frame(&b"not json"[..]).is_err());
        assert!(Envelope::from_frame(&br#"{"t":"READY"}"#[..]).is_err());
    }
}
