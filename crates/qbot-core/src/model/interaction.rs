//! Interaction records (button clicks, callback actions).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::nullable;

/// `INTERACTION_CREATE` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    /// Interaction ID, needed to acknowledge it.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    /// Application ID.
    #[serde(deserialize_with = "nullable")]
    pub application_id: String,
    /// Interaction type.
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: u32,
    /// Interaction data.
    pub data: Option<InteractionData>,
    /// Guild ID (guild scene).
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// Channel ID (guild scene).
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    /// Group open ID (group scene).
    #[serde(deserialize_with = "nullable")]
    pub group_openid: String,
    /// User open ID (single-user scene).
    #[serde(deserialize_with = "nullable")]
    pub user_openid: String,
    /// `0` guild, `1` group, `2` single-user.
    #[serde(deserialize_with = "nullable")]
    pub chat_type: u32,
    /// Scene name (`guild`, `group`, `c2c`).
    #[serde(deserialize_with = "nullable")]
    pub scene: String,
    /// Event time.
    #[serde(deserialize_with = "nullable")]
    pub timestamp: String,
    /// Interaction protocol version.
    #[serde(deserialize_with = "nullable")]
    pub version: u32,
}

/// The data carried by an interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionData {
    /// Interaction name.
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    /// Data type.
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: u32,
    /// Resolved data, shape depends on `kind`.
    pub resolved: Value,
}

impl Interaction {
    /// Returns the `button_data` string of a button click, if any.
    pub fn button_data(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .resolved
            .get("button_data")
            .and_then(Value::as_str)
    }
}
