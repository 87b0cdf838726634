//! # qbot OpenAPI
//!
//! Outbound side of the qbot client: the message endpoints of the bot
//! OpenAPI behind the [`MessageApi`] trait, with a `reqwest` implementation
//! in [`HttpMessageApi`].
//!
//! ```rust,ignore
//! use qbot_openapi::{HttpMessageApi, MessageApi, MessageToCreate, Token};
//!
//! let api = HttpMessageApi::new(Token::bot(app_id, token))?.sandbox(true);
//! api.post_message("channel", &MessageToCreate::text("hello")).await?;
//! ```

pub mod api;
pub mod dto;
pub mod error;
pub mod http;

pub use api::MessageApi;
pub use dto::{
    FileType, MediaInfo, MediaMessage, MediaToCreate, MessageToCreate, MessagesPager, PagerKind,
    RetractOption, Token,
};
pub use error::{ApiError, ApiResult};
pub use http::{API_BASE_URL, HttpMessageApi, SANDBOX_BASE_URL};
