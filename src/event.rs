//! Typed events delivered to subscribers.
//!
//! Two event names are reserved and emitted by the client itself:
//! [`EVENT_READY`] and [`EVENT_DISCONNECT`]. Every other event name is
//! pass-through — whatever type a parsed frame carries becomes the event
//! name (e.g. `"ChatMessage"`), with the payload delivered as a
//! [`KickChatEvent::Frame`].

use crate::channel::UserIdentity;

/// Reserved event name: the client connected to the chatroom stream.
/// Carries the [`UserIdentity`] snapshot of the resolved channel.
pub const EVENT_READY: &str = "ready";

/// Reserved event name: the chatroom stream closed. No payload.
pub const EVENT_DISCONNECT: &str = "disconnect";

/// Event payload handed to registered listeners.
#[derive(Debug, Clone)]
pub enum KickChatEvent {
    /// The chatroom connection opened (reserved event `"ready"`).
    Ready {
        /// Identity snapshot of the resolved channel.
        user: UserIdentity,
    },
    /// The chatroom connection closed (reserved event `"disconnect"`).
    Disconnect,
    /// A parsed frame, delivered under its own event type.
    Frame {
        /// Decoded payload of the frame.
        data: serde_json::Value,
    },
}

impl KickChatEvent {
    /// Returns the frame payload for pass-through events, `None` otherwise.
    pub fn frame_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Frame { data } => Some(data),
            _ => None,
        }
    }

    /// Returns the user identity for `ready` events, `None` otherwise.
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::Ready { user } => Some(user),
            _ => None,
        }
    }
}
