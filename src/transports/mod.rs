//! Transport implementations for the Kick chatroom stream.
//!
//! Concrete [`ChatTransport`](crate::transport::ChatTransport) and
//! [`ChatroomConnector`](crate::transport::ChatroomConnector)
//! implementations live here behind feature gates:
//!
//! | Feature                | Types                                          |
//! |------------------------|------------------------------------------------|
//! | `transport-websocket`  | [`WebSocketTransport`], [`WebSocketConnector`] |

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::{WebSocketConnector, WebSocketTransport};
