//! Channel identity types and the channel resolution interface.
//!
//! A Kick channel is addressed by a human-readable name (its URL slug).
//! Before the chat stream can be joined, that name must be resolved to a
//! [`ChannelIdentity`] carrying the numeric channel id and — crucially —
//! the chatroom id used as the routing key for the realtime stream.
//!
//! Resolution itself is an external capability: the metadata lives behind
//! Kick's HTTP API, which this crate does not call directly. Implement
//! [`ChannelResolver`] for whatever HTTP stack (or fixture) fits your
//! application and hand it to `KickChatClient::create`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Resolved identity of a Kick channel.
///
/// Fetched once per client during initialization and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelIdentity {
    /// Numeric channel id.
    pub id: u64,
    /// URL slug of the channel (e.g. `"xqc"`).
    pub slug: String,
    /// Routing key for the channel's realtime chat stream.
    pub chatroom_id: u64,
    /// Username of the streamer who owns the channel.
    pub streamer_username: String,
}

/// Read-only identity view derived from a [`ChannelIdentity`].
///
/// Recomputed on demand — it has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Numeric channel id.
    pub id: u64,
    /// Channel slug.
    pub username: String,
    /// Streamer username.
    pub tag: String,
}

impl From<&ChannelIdentity> for UserIdentity {
    fn from(channel: &ChannelIdentity) -> Self {
        Self {
            id: channel.id,
            username: channel.slug.clone(),
            tag: channel.streamer_username.clone(),
        }
    }
}

/// Maps a channel name to its [`ChannelIdentity`].
///
/// Implementations typically call Kick's channels API; tests use fixtures.
///
/// # Errors
///
/// `fetch_channel_info` fails with
/// [`KickChatError::ChannelResolution`](crate::KickChatError::ChannelResolution)
/// when the channel is unknown or the lookup cannot be performed.
#[async_trait]
pub trait ChannelResolver: Send + Sync + 'static {
    /// Resolve `channel_name` to channel metadata.
    async fn fetch_channel_info(&self, channel_name: &str) -> Result<ChannelIdentity>;
}
