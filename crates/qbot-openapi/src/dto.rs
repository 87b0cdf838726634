//! Request and response bodies for the message endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use qbot_core::model::{Embed, MessageReference};

// ============================================================================
// Credentials
// ============================================================================

/// Credentials sent in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Token {
    /// Static bot token: `Bot {app_id}.{token}`.
    Bot {
        /// Application ID.
        app_id: String,
        /// Bot secret token.
        token: String,
    },
    /// Short-lived access token: `QQBot {access_token}`.
    QQBot(String),
}

impl Token {
    /// Creates a static bot token.
    pub fn bot(app_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Bot {
            app_id: app_id.into(),
            token: token.into(),
        }
    }

    /// Creates an access-token credential.
    pub fn access(access_token: impl Into<String>) -> Self {
        Self::QQBot(access_token.into())
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        match self {
            Self::Bot { app_id, token } => format!("Bot {app_id}.{token}"),
            Self::QQBot(access_token) => format!("QQBot {access_token}"),
        }
    }
}

// Never print secrets.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bot { app_id, .. } => f
                .debug_struct("Bot")
                .field("app_id", app_id)
                .field("token", &"***")
                .finish(),
            Self::QQBot(_) => f.debug_tuple("QQBot").field(&"***").finish(),
        }
    }
}

// ============================================================================
// Outgoing messages
// ============================================================================

/// Body of a message send or edit.
///
/// Only set fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageToCreate {
    /// Text content.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Message type: 0 text, 2 markdown, 3 ark, 4 embed, 7 media.
    #[serde(skip_serializing_if = "is_zero")]
    pub msg_type: u8,
    /// Embed block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    /// Ark template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ark: Option<Value>,
    /// Markdown payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<Value>,
    /// Keyboard payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Value>,
    /// Image URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Media uploaded through a file endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
    /// ID of the message being replied to (passive reply).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub msg_id: String,
    /// ID of the event being replied to (passive reply).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_id: String,
    /// Sequence number for several replies to the same message.
    #[serde(skip_serializing_if = "is_zero")]
    pub msg_seq: u32,
    /// Quoted message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

impl MessageToCreate {
    /// A plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Marks this message as a reply to `msg_id`.
    pub fn reply_to(mut self, msg_id: impl Into<String>) -> Self {
        self.msg_id = msg_id.into();
        self
    }
}

fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Reference to uploaded media, used in [`MessageToCreate::media`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaInfo {
    /// Opaque file info returned by the upload.
    pub file_info: String,
}

/// Kind of uploaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FileType {
    /// Image (png/jpg).
    Image,
    /// Video (mp4).
    Video,
    /// Voice (silk).
    Voice,
    /// Generic file.
    File,
}

impl From<FileType> for u8 {
    fn from(kind: FileType) -> Self {
        match kind {
            FileType::Image => 1,
            FileType::Video => 2,
            FileType::Voice => 3,
            FileType::File => 4,
        }
    }
}

impl TryFrom<u8> for FileType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Image),
            2 => Ok(Self::Video),
            3 => Ok(Self::Voice),
            4 => Ok(Self::File),
            other => Err(format!("unknown file type {other}")),
        }
    }
}

/// Body of a C2C or group file upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaToCreate {
    /// Media kind.
    pub file_type: FileType,
    /// Where the platform fetches the media from.
    pub url: String,
    /// Send immediately instead of only uploading.
    pub srv_send_msg: bool,
}

impl MediaToCreate {
    /// Upload-only request for `url`.
    pub fn upload(file_type: FileType, url: impl Into<String>) -> Self {
        Self {
            file_type,
            url: url.into(),
            srv_send_msg: false,
        }
    }
}

/// Response of a file upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaMessage {
    /// File UUID.
    pub file_uuid: String,
    /// File info to put in [`MediaInfo`].
    pub file_info: String,
    /// Seconds the upload stays valid; 0 means forever.
    pub ttl: u64,
    /// Message ID when the upload was sent directly.
    pub id: String,
}

impl MediaMessage {
    /// The [`MediaInfo`] that references this upload.
    pub fn media_info(&self) -> MediaInfo {
        MediaInfo {
            file_info: self.file_info.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SettingGuideToCreate {
    pub content: String,
}

impl SettingGuideToCreate {
    pub(crate) fn mentioning<S: AsRef<str>>(user_ids: &[S]) -> Self {
        let content = user_ids
            .iter()
            .map(|id| format!("<@{}>", id.as_ref()))
            .collect();
        Self { content }
    }
}

// ============================================================================
// Paging and options
// ============================================================================

/// Direction of a message history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerKind {
    /// Messages around the anchor.
    Around,
    /// Messages before the anchor.
    Before,
    /// Messages after the anchor.
    After,
}

impl PagerKind {
    /// Query parameter name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Around => "around",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Paging for [`MessageApi::messages`](crate::MessageApi::messages).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagesPager {
    /// Direction relative to `id`.
    pub kind: Option<PagerKind>,
    /// Anchor message ID.
    pub id: Option<String>,
    /// Page size.
    pub limit: Option<u32>,
}

impl MessagesPager {
    /// A page of `limit` messages in direction `kind` from `id`.
    pub fn new(kind: PagerKind, id: impl Into<String>, limit: u32) -> Self {
        Self {
            kind: Some(kind),
            id: Some(id.into()),
            limit: Some(limit),
        }
    }

    /// Query parameters for this page.
    ///
    /// The direction is only sent when both `kind` and `id` are set.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let (Some(kind), Some(id)) = (self.kind, self.id.as_deref())
            && !id.is_empty()
        {
            params.push((kind.as_str(), id.to_string()));
        }
        params
    }
}

/// Options for [`MessageApi::retract_message`](crate::MessageApi::retract_message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractOption {
    /// Hide the "message retracted" notice.
    HideTip,
}

impl RetractOption {
    pub(crate) fn query_param(self) -> (&'static str, &'static str) {
        match self {
            Self::HideTip => ("hidetip", "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_authorization() {
        assert_eq!(Token::bot("101", "secret").authorization(), "Bot 101.secret");
        assert_eq!(Token::access("abc").authorization(), "QQBot abc");
    }

    #[test]
    fn test_token_debug_hides_secret() {
        let debug = format!("{:?}", Token::bot("101", "secret"));
        assert!(debug.contains("101"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_pager_params() {
        let pager = MessagesPager::new(PagerKind::Before, "m9", 20);
        assert_eq!(
            pager.query_params(),
            vec![("limit", "20".to_string()), ("before", "m9".to_string())]
        );

        let limit_only = MessagesPager {
            limit: Some(5),
            kind: Some(PagerKind::After),
            id: None,
        };
        assert_eq!(limit_only.query_params(), vec![("limit", "5".to_string())]);

        let anchor_only = MessagesPager {
            kind: Some(PagerKind::Around),
            id: Some("m1".into()),
            limit: None,
        };
        assert_eq!(anchor_only.query_params(), vec![("around", "m1".to_string())]);

        assert!(MessagesPager::default().query_params().is_empty());
    }

    #[test]
    fn test_message_to_create_skips_empty_fields() {
        let body = serde_json::to_value(MessageToCreate::text("hi").reply_to("m1")).unwrap();
        assert_eq!(body, json!({ "content": "hi", "msg_id": "m1" }));
    }

    #[test]
    fn test_media_serialization() {
        let body = serde_json::to_value(MediaToCreate::upload(
            FileType::Image,
            "https://example.com/a.png",
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({
                "file_type": 1,
                "url": "https://example.com/a.png",
                "srv_send_msg": false
            })
        );
    }

    #[test]
    fn test_setting_guide_content() {
        let guide = SettingGuideToCreate::mentioning(&["u1", "u2"]);
        assert_eq!(guide.content, "<@u1><@u2>");
        assert!(SettingGuideToCreate::mentioning::<&str>(&[]).content.is_empty());
    }
}
