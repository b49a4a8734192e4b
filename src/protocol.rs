//! Wire frame decoding for the Kick chat stream.
//!
//! Kick chat rides on a Pusher-style websocket protocol. Each text frame is
//! an outer envelope:
//!
//! ```json
//! {"event":"App\\Events\\ChatMessageEvent","data":"{\"content\":\"hi\"}","channel":"chatrooms.99.v2"}
//! ```
//!
//! The `data` field is usually a JSON **string** that must be decoded a
//! second time to reach the actual payload. [`parse_frame`] performs both
//! decodes and shortens the namespaced event name to the downstream event
//! type (`App\Events\ChatMessageEvent` → `ChatMessage`). Malformed frames
//! yield `None` and are dropped by the client — they are expected transport
//! noise, not errors.

use serde::{Deserialize, Serialize};

/// Event type under which chat messages are delivered to subscribers.
pub const CHAT_MESSAGE_EVENT: &str = "ChatMessage";

/// Outer shape of a raw Pusher frame. `data` is kept as a raw value because
/// Kick double-encodes application payloads but Pusher-internal events do
/// not always do so.
#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decoded form of one inbound frame: the downstream event type plus its
/// payload. The payload shape depends on the event type and is opaque here.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    /// Downstream event name, e.g. `"ChatMessage"`.
    pub event_type: String,
    /// Decoded payload.
    pub data: serde_json::Value,
}

/// Decode a raw text frame into an [`EventEnvelope`].
///
/// Returns `None` for anything that is not a well-formed frame: invalid
/// JSON, a missing event name, an inner `data` string that is not itself
/// valid JSON, or a payload that is not a JSON object. Never panics.
pub fn parse_frame(raw: &str) -> Option<EventEnvelope> {
    let frame: RawFrame = serde_json::from_str(raw).ok()?;

    // Kick application events carry their payload double-encoded; tolerate
    // already-decoded objects for Pusher-internal events.
    let data = match frame.data {
        serde_json::Value::String(inner) => serde_json::from_str(&inner).ok()?,
        other => other,
    };

    // Every envelope payload is an object; anything else is noise.
    if !data.is_object() {
        return None;
    }

    Some(EventEnvelope {
        event_type: short_event_name(&frame.event),
        data,
    })
}

/// Shorten a namespaced wire event name to its downstream event type.
///
/// Takes the last `\`-separated segment and strips a trailing `Event`
/// suffix. Names without a namespace or suffix pass through unchanged, so
/// arbitrary frame types still become usable event names.
fn short_event_name(event: &str) -> String {
    let tail = event.rsplit('\\').next().unwrap_or(event);
    tail.strip_suffix("Event").unwrap_or(tail).to_string()
}

// ── Typed payloads ──────────────────────────────────────────────────

/// Sender block of a [`ChatMessageData`] payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageSender {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub slug: String,
}

/// Typed view of the `ChatMessage` payload.
///
/// Only `content` is guaranteed by the stream; the remaining fields default
/// when absent so that wire drift does not break deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageData {
    /// Message id.
    #[serde(default)]
    pub id: String,
    /// Chatroom the message was posted in.
    #[serde(default)]
    pub chatroom_id: u64,
    /// Message text, subject to emote-tag normalization.
    pub content: String,
    /// Wire message kind (`"message"` for regular chat lines).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Creation timestamp as reported by the server.
    #[serde(default)]
    pub created_at: String,
    /// Message author.
    #[serde(default)]
    pub sender: MessageSender,
}

impl ChatMessageData {
    /// Deserialize a `ChatMessage` payload from an envelope's `data` value.
    ///
    /// # Errors
    ///
    /// Returns [`KickChatError::Serialization`](crate::KickChatError::Serialization)
    /// if the value does not have the expected shape.
    pub fn from_value(data: &serde_json::Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(data.clone())?)
    }
}
