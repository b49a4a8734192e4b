//! Error types for the Kick chat client.

use thiserror::Error;

/// Errors that can occur when using the Kick chat client.
#[derive(Debug, Error)]
pub enum KickChatError {
    /// Channel resolution failed: the channel name could not be mapped to
    /// channel metadata (unknown channel, API failure, network error).
    #[error("channel resolution failed: {0}")]
    ChannelResolution(String),

    /// Failed to open a connection to the chatroom stream.
    #[error("transport connect error: {0}")]
    TransportConnect(String),

    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed unexpectedly.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a wire payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Attempted an operation that requires an authenticated session and a
    /// resolved channel identity, but at least one is missing.
    #[error("not logged in or channel info not available")]
    NotAuthenticated,

    /// The background initialization task stopped before reporting a result.
    #[error("initialization task aborted before completing")]
    InitAborted,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for Kick chat client operations.
pub type Result<T> = std::result::Result<T, KickChatError>;
