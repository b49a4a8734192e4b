//! # Kick Chat Client
//!
//! Async Rust client for Kick.com channel chatrooms.
//!
//! The client resolves a channel name to channel metadata, opens a
//! persistent connection to the channel's realtime chat stream, decodes
//! incoming frames into typed events and republishes them to subscribers
//! through a simple named-event interface.
//!
//! ## Features
//!
//! - **Pluggable collaborators** — channel metadata lookup
//!   ([`ChannelResolver`]) and the realtime stream ([`ChatroomConnector`] /
//!   [`ChatTransport`]) are traits; bring your own HTTP stack or test
//!   fixtures
//! - **WebSocket built-in** — the default `transport-websocket` feature
//!   ships a connector for Kick's Pusher endpoint
//! - **Plain-text emotes** — `[emote:<id>:<name>]` markers in chat messages
//!   are rewritten to `<name>` (configurable)
//! - **Non-blocking construction** — [`KickChatClient::create`] returns
//!   immediately; an [`InitHandle`] makes initialization failure observable
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use kick_chat_client::{KickChatClient, KickChatConfig, WebSocketConnector, EVENT_READY};
//!
//! let (client, init) = KickChatClient::create(
//!     my_resolver,
//!     WebSocketConnector::new(),
//!     "xqc",
//!     KickChatConfig::default().with_logger(true),
//! );
//!
//! client.on(EVENT_READY, |event| {
//!     println!("ready: {:?}", event.user());
//! });
//! client.on("ChatMessage", |event| {
//!     println!("chat: {:?}", event.frame_data());
//! });
//!
//! init.wait().await?;
//! ```

pub mod channel;
pub mod client;
pub mod emote;
pub mod error;
pub mod event;
pub mod protocol;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use channel::{ChannelIdentity, ChannelResolver, UserIdentity};
pub use client::{InitHandle, KickChatClient, KickChatConfig, SessionCredentials};
pub use emote::replace_emote_tags;
pub use error::KickChatError;
pub use event::{KickChatEvent, EVENT_DISCONNECT, EVENT_READY};
pub use protocol::{parse_frame, ChatMessageData, EventEnvelope};
pub use transport::{ChatTransport, ChatroomConnector};

#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
