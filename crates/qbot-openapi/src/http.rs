//! `reqwest` implementation of [`MessageApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use qbot_core::decode_field;
use qbot_core::model::Message;

use crate::api::MessageApi;
use crate::dto::{
    MediaMessage, MediaToCreate, MessageToCreate, MessagesPager, RetractOption,
    SettingGuideToCreate, Token,
};
use crate::error::{ApiError, ApiResult};

/// Production endpoint.
pub const API_BASE_URL: &str = "https://api.sgroup.qq.com";

/// Sandbox endpoint.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.sgroup.qq.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Field holding the real message when a fetched body is wrapped.
const WRAPPED_MESSAGE_FIELD: &str = "message";

/// HTTP client for the message endpoints.
#[derive(Debug, Clone)]
pub struct HttpMessageApi {
    client: Client,
    base_url: String,
    token: Token,
}

impl HttpMessageApi {
    /// Creates a client for the production endpoint with a 30 second timeout.
    pub fn new(token: Token) -> ApiResult<Self> {
        Self::with_timeout(token, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(token: Token, timeout: Duration) -> ApiResult<Self> {
        let client = ClientBuilder::new().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            token,
        })
    }

    /// Switches between the sandbox and production endpoints.
    pub fn sandbox(mut self, enabled: bool) -> Self {
        let base = if enabled { SANDBOX_BASE_URL } else { API_BASE_URL };
        self.base_url = base.to_string();
        self
    }

    /// Points the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The endpoint requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `segments` onto the base URL, percent-encoding each one so an
    /// id can never add path segments or a query string.
    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> ApiResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<RequestBuilder> {
        let url = self.url(segments, query)?;
        debug!(%method, %url, "Calling OpenAPI");

        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, self.token.authorization()))
    }

    /// Sends the request and returns the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "OpenAPI call failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, segments, &[])?.json(body);
        self.fetch(request).await
    }
}

#[async_trait]
impl MessageApi for HttpMessageApi {
    async fn message(&self, channel_id: &str, message_id: &str) -> ApiResult<Message> {
        let path = ["channels", channel_id, "messages", message_id];
        let body = self
            .execute(self.request(Method::GET, &path, &[])?)
            .await?;

        let message: Message = serde_json::from_slice(&body)?;
        if !message.id.is_empty() {
            return Ok(message);
        }
        // Some deployments wrap the record as `{"message": {...}}`.
        Ok(decode_field(&body, WRAPPED_MESSAGE_FIELD)?)
    }

    async fn messages(&self, channel_id: &str, pager: &MessagesPager) -> ApiResult<Vec<Message>> {
        let path = ["channels", channel_id, "messages"];
        let request = self.request(Method::GET, &path, &pager.query_params())?;
        self.fetch(request).await
    }

    async fn post_message(&self, channel_id: &str, msg: &MessageToCreate) -> ApiResult<Message> {
        self.post(&["channels", channel_id, "messages"], msg).await
    }

    async fn patch_message(
        &self,
        channel_id: &str,
        message_id: &str,
        msg: &MessageToCreate,
    ) -> ApiResult<Message> {
        let path = ["channels", channel_id, "messages", message_id];
        let request = self.request(Method::PATCH, &path, &[])?.json(msg);
        self.fetch(request).await
    }

    async fn retract_message(
        &self,
        channel_id: &str,
        message_id: &str,
        options: &[RetractOption],
    ) -> ApiResult<()> {
        let path = ["channels", channel_id, "messages", message_id];
        let query: Vec<(&str, String)> = options
            .iter()
            .map(|option| {
                let (key, value) = option.query_param();
                (key, value.to_string())
            })
            .collect();

        self.execute(self.request(Method::DELETE, &path, &query)?)
            .await?;
        Ok(())
    }

    async fn post_setting_guide(
        &self,
        channel_id: &str,
        user_ids: &[String],
    ) -> ApiResult<Message> {
        let guide = SettingGuideToCreate::mentioning(user_ids);
        self.post(&["channels", channel_id, "settingguide"], &guide)
            .await
    }

    async fn post_c2c_message(&self, openid: &str, msg: &MessageToCreate) -> ApiResult<Message> {
        self.post(&["v2", "users", openid, "messages"], msg).await
    }

    async fn post_group_message(
        &self,
        group_openid: &str,
        msg: &MessageToCreate,
    ) -> ApiResult<Message> {
        self.post(&["v2", "groups", group_openid, "messages"], msg)
            .await
    }

    async fn post_c2c_file(&self, openid: &str, media: &MediaToCreate) -> ApiResult<MediaMessage> {
        self.post(&["v2", "users", openid, "files"], media).await
    }

    async fn post_group_file(
        &self,
        group_openid: &str,
        media: &MediaToCreate,
    ) -> ApiResult<MediaMessage> {
        self.post(&["v2", "groups", group_openid, "files"], media)
            .await
    }
}
