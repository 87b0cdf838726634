//! Guild, channel and member records.

use serde::{Deserialize, Serialize};

use super::nullable;

/// A user account (bot or human).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// User ID.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "nullable")]
    pub username: String,
    /// Avatar URL.
    #[serde(deserialize_with = "nullable")]
    pub avatar: String,
    /// Whether this account is a bot.
    #[serde(deserialize_with = "nullable")]
    pub bot: bool,
    /// Linked open-platform ID.
    #[serde(deserialize_with = "nullable")]
    pub union_openid: String,
    /// Linked open-platform account.
    #[serde(deserialize_with = "nullable")]
    pub union_user_account: String,
    /// Per-group member ID (group chat events only).
    #[serde(deserialize_with = "nullable")]
    pub member_openid: String,
    /// Per-bot user ID (single-user chat events only).
    #[serde(deserialize_with = "nullable")]
    pub user_openid: String,
}

/// `GUILD_CREATE` / `GUILD_UPDATE` / `GUILD_DELETE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guild {
    /// Guild ID.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Guild name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Icon URL.
    #[serde(deserialize_with = "nullable")]
    pub icon: String,
    /// Owner's user ID.
    #[serde(deserialize_with = "nullable")]
    pub owner_id: String,
    /// Whether the bot itself owns the guild.
    #[serde(deserialize_with = "nullable")]
    pub owner: bool,
    /// Current member count.
    #[serde(deserialize_with = "nullable")]
    pub member_count: i64,
    /// Member limit.
    #[serde(deserialize_with = "nullable")]
    pub max_members: i64,
    /// Description.
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// When the bot joined (ISO 8601).
    #[serde(deserialize_with = "nullable")]
    pub joined_at: String,
    /// Operator that triggered the event.
    #[serde(deserialize_with = "nullable")]
    pub op_user_id: String,
}

/// `CHANNEL_CREATE` / `CHANNEL_UPDATE` / `CHANNEL_DELETE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    /// Channel ID.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Owning guild.
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// Channel name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Channel type (text, voice, category, live, app, forum).
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: i32,
    /// Channel sub-type.
    #[serde(deserialize_with = "nullable")]
    pub sub_type: i32,
    /// Ordering position.
    #[serde(deserialize_with = "nullable")]
    pub position: i64,
    /// Parent category ID.
    #[serde(deserialize_with = "nullable")]
    pub parent_id: String,
    /// Creator's user ID.
    #[serde(deserialize_with = "nullable")]
    pub owner_id: String,
    /// Privacy setting.
    #[serde(deserialize_with = "nullable")]
    pub private_type: i32,
    /// Speak permission setting.
    #[serde(deserialize_with = "nullable")]
    pub speak_permission: i32,
    /// Application ID for app channels.
    #[serde(deserialize_with = "nullable")]
    pub application_id: String,
    /// Operator that triggered the event.
    #[serde(deserialize_with = "nullable")]
    pub op_user_id: String,
}

/// `GUILD_MEMBER_ADD` / `GUILD_MEMBER_UPDATE` / `GUILD_MEMBER_REMOVE` payload.
///
/// Also embedded in messages as the author's guild membership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    /// Guild ID.
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// When the member joined (ISO 8601).
    #[serde(deserialize_with = "nullable")]
    pub joined_at: String,
    /// Guild nickname.
    #[serde(deserialize_with = "nullable")]
    pub nick: String,
    /// The member's account.
    pub user: Option<User>,
    /// Role IDs.
    #[serde(deserialize_with = "nullable")]
    pub roles: Vec<String>,
    /// Operator that triggered the event.
    #[serde(deserialize_with = "nullable")]
    pub op_user_id: String,
}

impl Member {
    /// Returns the guild nickname, or the account name when no nickname is set.
    pub fn display_name(&self) -> &str {
        if !self.nick.is_empty() {
            return &self.nick;
        }
        self.user.as_ref().map_or("", |u| u.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_display_name() {
        let mut member: Member =
            serde_json::from_str(r#"{"guild_id":"g1","user":{"id":"u1","username":"alice"}}"#)
                .unwrap();
        assert_eq!(member.display_name(), "alice");

        member.nick = "Al".to_string();
        assert_eq!(member.display_name(), "Al");
    }

    #[test]
    fn test_channel_type_field() {
        let channel: Channel = serde_json::from_str(r#"{"id":"c1","type":10007}"#).unwrap();
        assert_eq!(channel.kind, 10007);
        assert!(serde_json::from_str::<Channel>(r#"{"type":"text"}"#).is_err());
    }
}
