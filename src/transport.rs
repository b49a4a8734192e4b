//! Transport abstraction for the Kick chatroom stream.
//!
//! [`ChatTransport`] is a bidirectional text frame channel between the
//! client and the chat stream. Kick's protocol uses JSON text frames, so
//! every implementation must handle message framing internally (WebSocket
//! frames for the built-in transport).
//!
//! Connection setup lives in [`ChatroomConnector`] rather than on the
//! transport itself: the client only knows the chatroom id it wants to
//! join, while the connector knows how to turn that routing key into a
//! connected stream (endpoint URL, subscription handshake, TLS, proxies).
//!
//! # Implementing a custom transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use kick_chat_client::error::Result;
//! use kick_chat_client::transport::{ChatTransport, ChatroomConnector};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl ChatTransport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<()> {
//!         // Send one JSON text frame
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String>> {
//!         // Receive the next JSON text frame;
//!         // return None when the stream closed cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<()> {
//!         todo!()
//!     }
//! }
//!
//! struct MyConnector;
//!
//! #[async_trait]
//! impl ChatroomConnector for MyConnector {
//!     type Transport = MyTransport;
//!
//!     async fn open_chatroom(&self, chatroom_id: u64) -> Result<MyTransport> {
//!         // Connect and subscribe to the chatroom's stream
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::Result;

/// A bidirectional text frame transport for one chatroom stream.
///
/// # Cancel Safety
///
/// [`recv`](ChatTransport::recv) **MUST** be cancel-safe: the client's
/// dispatch loop may poll it inside `tokio::select!` in the future, and a
/// cancelled `recv` must not lose frames. Channel-backed implementations
/// are naturally cancel-safe.
#[async_trait]
pub trait ChatTransport: Send + 'static {
    /// Send one JSON text frame to the stream.
    ///
    /// # Errors
    ///
    /// Returns [`KickChatError::TransportSend`](crate::KickChatError::TransportSend)
    /// if the frame could not be sent.
    async fn send(&mut self, message: String) -> Result<()>;

    /// Receive the next raw text frame from the stream.
    ///
    /// Returns:
    /// - `Some(Ok(text))` — a complete frame was received
    /// - `Some(Err(e))` — a transport error occurred
    /// - `None` — the stream was closed cleanly
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Close the transport gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails; implementations should
    /// still release resources in that case.
    async fn close(&mut self) -> Result<()>;
}

/// Opens a connected [`ChatTransport`] for a chatroom.
///
/// The chatroom id is the transport-level routing key obtained from channel
/// resolution; everything else about the connection (endpoint, handshake,
/// subscription frames) is the connector's concern.
#[async_trait]
pub trait ChatroomConnector: Send + Sync + 'static {
    /// Transport type produced by this connector.
    type Transport: ChatTransport;

    /// Open a duplex connection to the chatroom's realtime stream.
    ///
    /// # Errors
    ///
    /// Returns [`KickChatError::TransportConnect`](crate::KickChatError::TransportConnect)
    /// (or [`Io`](crate::KickChatError::Io)) when the stream cannot be opened.
    async fn open_chatroom(&self, chatroom_id: u64) -> Result<Self::Transport>;
}
