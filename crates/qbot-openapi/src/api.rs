//! The message API boundary.

use async_trait::async_trait;

use qbot_core::model::Message;

use crate::dto::{MediaMessage, MediaToCreate, MessageToCreate, MessagesPager, RetractOption};
use crate::error::ApiResult;

/// Message endpoints of the bot OpenAPI.
///
/// Handlers usually hold an `Arc<dyn MessageApi>` so tests can swap in a fake.
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// Fetches one channel message.
    async fn message(&self, channel_id: &str, message_id: &str) -> ApiResult<Message>;

    /// Fetches a page of channel history.
    async fn messages(&self, channel_id: &str, pager: &MessagesPager) -> ApiResult<Vec<Message>>;

    /// Sends a message to a channel.
    async fn post_message(&self, channel_id: &str, msg: &MessageToCreate) -> ApiResult<Message>;

    /// Edits a channel message.
    async fn patch_message(
        &self,
        channel_id: &str,
        message_id: &str,
        msg: &MessageToCreate,
    ) -> ApiResult<Message>;

    /// Retracts a channel message.
    async fn retract_message(
        &self,
        channel_id: &str,
        message_id: &str,
        options: &[RetractOption],
    ) -> ApiResult<()>;

    /// Sends a settings guide that mentions each of `user_ids`.
    async fn post_setting_guide(&self, channel_id: &str, user_ids: &[String])
    -> ApiResult<Message>;

    /// Sends a single-user (C2C) message.
    async fn post_c2c_message(&self, openid: &str, msg: &MessageToCreate) -> ApiResult<Message>;

    /// Sends a group message.
    async fn post_group_message(
        &self,
        group_openid: &str,
        msg: &MessageToCreate,
    ) -> ApiResult<Message>;

    /// Uploads media for a single-user chat.
    async fn post_c2c_file(&self, openid: &str, media: &MediaToCreate) -> ApiResult<MediaMessage>;

    /// Uploads media for a group chat.
    async fn post_group_file(
        &self,
        group_openid: &str,
        media: &MediaToCreate,
    ) -> ApiResult<MediaMessage>;
}
