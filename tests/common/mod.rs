#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Shared test utilities for Kick chat client integration tests.
//!
//! Provides a scripted [`FixtureResolver`] / [`ScriptedConnector`] pair and
//! helpers for building raw Pusher-style frames the way Kick emits them
//! (application payloads double-encoded in the `data` field).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use kick_chat_client::error::Result;
use kick_chat_client::{ChannelIdentity, ChannelResolver, ChatTransport, ChatroomConnector, KickChatError};

/// Install a tracing subscriber for test debugging (idempotent; honors
/// `RUST_LOG`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default channel fixture used across the suites.
pub fn test_channel() -> ChannelIdentity {
    ChannelIdentity {
        id: 42,
        slug: "examplechannel".into(),
        chatroom_id: 99,
        streamer_username: "ExampleStreamer".into(),
    }
}

/// Build a raw `ChatMessageEvent` frame with the given content,
/// double-encoded like the live stream.
pub fn chat_frame(content: &str) -> String {
    let data = serde_json::json!({
        "id": "0b4c5f2a",
        "chatroom_id": 99,
        "content": content,
        "type": "message",
        "created_at": "2024-01-01T00:00:00+00:00",
        "sender": {"id": 7, "username": "Viewer", "slug": "viewer"}
    })
    .to_string();
    serde_json::json!({
        "event": "App\\Events\\ChatMessageEvent",
        "data": data,
        "channel": "chatrooms.99.v2"
    })
    .to_string()
}

/// Build a raw frame for an arbitrary namespaced event type.
pub fn event_frame(wire_event: &str, payload: serde_json::Value) -> String {
    serde_json::json!({
        "event": wire_event,
        "data": payload.to_string(),
        "channel": "chatrooms.99.v2"
    })
    .to_string()
}

// ── FixtureResolver ─────────────────────────────────────────────────

/// A resolver that answers from a fixture, or fails for unknown names.
pub struct FixtureResolver {
    channel: ChannelIdentity,
}

impl FixtureResolver {
    pub fn new(channel: ChannelIdentity) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl ChannelResolver for FixtureResolver {
    async fn fetch_channel_info(&self, channel_name: &str) -> Result<ChannelIdentity> {
        if channel_name == self.channel.slug {
            Ok(self.channel.clone())
        } else {
            Err(KickChatError::ChannelResolution(format!(
                "unknown channel: {channel_name}"
            )))
        }
    }
}

// ── ScriptedConnector / ScriptedTransport ───────────────────────────

/// Transport that replays scripted frames, then hangs until dropped.
///
/// A scripted `None` entry signals a clean close; `Some(Err(_))` delivers a
/// transport error mid-stream.
pub struct ScriptedTransport {
    incoming: VecDeque<Option<Result<String>>>,
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&mut self, _message: String) -> Result<()> {
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        if let Some(item) = self.incoming.pop_front() {
            item
        } else {
            // Keep the stream open so the dispatch loop stays alive.
            std::future::pending().await
        }
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Connector that hands out one [`ScriptedTransport`] and records the
/// chatroom id it was asked to open.
pub struct ScriptedConnector {
    transport: StdMutex<Option<ScriptedTransport>>,
    pub opened: Arc<StdMutex<Option<u64>>>,
}

impl ScriptedConnector {
    pub fn new(incoming: Vec<Option<Result<String>>>) -> (Self, Arc<StdMutex<Option<u64>>>) {
        let opened = Arc::new(StdMutex::new(None));
        let connector = Self {
            transport: StdMutex::new(Some(ScriptedTransport {
                incoming: VecDeque::from(incoming),
            })),
            opened: Arc::clone(&opened),
        };
        (connector, opened)
    }
}

#[async_trait]
impl ChatroomConnector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn open_chatroom(&self, chatroom_id: u64) -> Result<ScriptedTransport> {
        *self.opened.lock().unwrap() = Some(chatroom_id);
        self.transport
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| KickChatError::TransportConnect("no scripted transport".into()))
    }
}
