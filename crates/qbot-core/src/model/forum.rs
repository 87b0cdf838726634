//! Forum records.
//!
//! ```text
//! Thread { thread_info }           ← FORUM_THREAD_*
//! Post   { post_info }             ← FORUM_POST_*
//! Reply  { reply_info }            ← FORUM_REPLY_*
//! ForumAuditResult                 ← FORUM_PUBLISH_AUDIT_RESULT
//! ```

use serde::{Deserialize, Serialize};

use super::nullable;

/// `FORUM_THREAD_CREATE` / `FORUM_THREAD_UPDATE` / `FORUM_THREAD_DELETE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thread {
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    #[serde(deserialize_with = "nullable")]
    pub author_id: String,
    #[serde(deserialize_with = "nullable")]
    pub thread_info: ThreadInfo,
}

/// Thread body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadInfo {
    #[serde(deserialize_with = "nullable")]
    pub thread_id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    /// Rich-text content, serialized JSON.
    #[serde(deserialize_with = "nullable")]
    pub content: String,
    #[serde(deserialize_with = "nullable")]
    pub date_time: String,
}

/// `FORUM_POST_CREATE` / `FORUM_POST_DELETE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    #[serde(deserialize_with = "nullable")]
    pub author_id: String,
    #[serde(deserialize_with = "nullable")]
    pub post_info: PostInfo,
}

/// Post body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInfo {
    #[serde(deserialize_with = "nullable")]
    pub thread_id: String,
    #[serde(deserialize_with = "nullable")]
    pub post_id: String,
    #[serde(deserialize_with = "nullable")]
    pub content: String,
    #[serde(deserialize_with = "nullable")]
    pub date_time: String,
}

/// `FORUM_REPLY_CREATE` / `FORUM_REPLY_DELETE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reply {
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    #[serde(deserialize_with = "nullable")]
    pub author_id: String,
    #[serde(deserialize_with = "nullable")]
    pub reply_info: ReplyInfo,
}

/// Reply body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyInfo {
    #[serde(deserialize_with = "nullable")]
    pub thread_id: String,
    #[serde(deserialize_with = "nullable")]
    pub post_id: String,
    #[serde(deserialize_with = "nullable")]
    pub reply_id: String,
    #[serde(deserialize_with = "nullable")]
    pub content: String,
    #[serde(deserialize_with = "nullable")]
    pub date_time: String,
}

/// `FORUM_PUBLISH_AUDIT_RESULT` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumAuditResult {
    #[serde(deserialize_with = "nullable")]
    pub task_id: String,
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    #[serde(deserialize_with = "nullable")]
    pub author_id: String,
    #[serde(deserialize_with = "nullable")]
    pub thread_id: String,
    #[serde(deserialize_with = "nullable")]
    pub post_id: String,
    #[serde(deserialize_with = "nullable")]
    pub reply_id: String,
    /// What was published: `1` thread, `2` post, `3` reply.
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub publish_type: u32,
    /// `0` passed, `1` rejected.
    #[serde(deserialize_with = "nullable")]
    pub result: u32,
    #[serde(rename = "err_msg", deserialize_with = "nullable")]
    pub error_message: String,
    #[serde(deserialize_with = "nullable")]
    pub date_time: String,
}

impl ForumAuditResult {
    /// Returns `true` if the content passed audit.
    pub fn passed(&self) -> bool {
        self.result == 0
    }
}
