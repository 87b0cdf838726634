//! Error types for envelope decoding and dispatch.

use thiserror::Error;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors raised while decoding a frame or its payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The wrapped field was absent or `null`.
    #[error("missing field '{0}' in frame")]
    MissingField(&'static str),

    /// The frame or the payload was not valid JSON for the target shape.
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors surfaced by [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).
///
/// "No handler registered" is not an error; it is `Ok(())`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The envelope body did not decode into the category's record.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A registered handler returned an error. It is carried as-is.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl DispatchError {
    /// Returns `true` if this is a decode failure.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Returns the handler's own error, if this is a handler failure.
    pub fn into_handler_error(self) -> Option<anyhow::Error> {
        match self {
            Self::Handler(err) => Some(err),
            Self::Decode(_) => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for a single dispatch.
pub type DispatchResult = Result<(), DispatchError>;

/// Result type returned by registered handlers.
pub type HandlerResult = anyhow::Result<()>;
