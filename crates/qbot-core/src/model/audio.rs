//! Audio channel records.

use serde::{Deserialize, Serialize};

use super::nullable;

/// `AUDIO_START` / `AUDIO_FINISH` / `AUDIO_ON_MIC` / `AUDIO_OFF_MIC` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioAction {
    /// Guild ID.
    #[serde(deserialize_with = "nullable")]
    pub guild_id: String,
    /// Audio channel ID.
    #[serde(deserialize_with = "nullable")]
    pub channel_id: String,
    /// Audio source URL (start events).
    #[serde(deserialize_with = "nullable")]
    pub audio_url: String,
    /// Status text shown in the channel.
    #[serde(deserialize_with = "nullable")]
    pub text: String,
}
