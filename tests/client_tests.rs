#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Integration tests for the Kick chat client.
//!
//! Drives `KickChatClient` end-to-end through the public API with scripted
//! resolver/connector fixtures from `tests/common`, covering the full
//! lifecycle: resolution, ready, frame delivery, normalization and
//! disconnect.

mod common;

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use kick_chat_client::{
    KickChatClient, KickChatConfig, KickChatError, KickChatEvent, EVENT_DISCONNECT, EVENT_READY,
};
use tokio::sync::mpsc;

use common::{chat_frame, event_frame, init_tracing, test_channel, FixtureResolver, ScriptedConnector};

/// Register a listener that forwards cloned events into a channel.
fn capture(client: &KickChatClient, event_name: &str) -> mpsc::UnboundedReceiver<KickChatEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    client.on(event_name, move |event| {
        let _ = tx.send(event.clone());
    });
    rx
}

async fn recv_timeout(rx: &mut mpsc::UnboundedReceiver<KickChatEvent>) -> KickChatEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

// ════════════════════════════════════════════════════════════════════
// Full lifecycle
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_lifecycle_ready_messages_disconnect() {
    init_tracing();

    let (connector, opened) = ScriptedConnector::new(vec![
        Some(Ok(chat_frame("[emote:1:A] one"))),
        Some(Ok(chat_frame("two"))),
        None, // clean close
    ]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default().with_logger(true),
    );

    let mut ready = capture(&client, EVENT_READY);
    let mut messages = capture(&client, "ChatMessage");
    let mut disconnect = capture(&client, EVENT_DISCONNECT);

    init.wait().await.expect("initialization");

    // Ready fires with the identity derived from the fixture channel.
    let event = recv_timeout(&mut ready).await;
    let user = event.user().expect("user snapshot");
    assert_eq!(user.id, 42);
    assert_eq!(user.username, "examplechannel");
    assert_eq!(user.tag, "ExampleStreamer");

    // Messages arrive in order, emotes normalized by default.
    let first = recv_timeout(&mut messages).await;
    assert_eq!(first.frame_data().unwrap()["content"], "A one");
    let second = recv_timeout(&mut messages).await;
    assert_eq!(second.frame_data().unwrap()["content"], "two");

    // The clean close fires disconnect with no payload.
    let event = recv_timeout(&mut disconnect).await;
    assert!(matches!(event, KickChatEvent::Disconnect));
    assert!(!client.is_connected());

    // The connector was keyed by the resolved chatroom id.
    assert_eq!(*opened.lock().unwrap(), Some(99));

    // The handle stays valid after disconnect.
    assert!(client.user().is_some());
    let _late = capture(&client, "ChatMessage");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn late_ready_subscription_still_observes_the_event() {
    let (connector, _opened) = ScriptedConnector::new(vec![]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default(),
    );

    // Subscribe well after the background task has fired `ready`.
    init.wait().await.expect("initialization");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut ready = capture(&client, EVENT_READY);
    let event = recv_timeout(&mut ready).await;
    assert_eq!(event.user().expect("user snapshot").tag, "ExampleStreamer");
}

#[tokio::test]
async fn unknown_channel_fails_initialization() {
    let (connector, opened) = ScriptedConnector::new(vec![]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "someoneelse",
        KickChatConfig::default(),
    );

    let err = init.wait().await.unwrap_err();
    match err {
        KickChatError::ChannelResolution(message) => {
            assert!(message.contains("someoneelse"));
        }
        other => panic!("expected ChannelResolution, got {other:?}"),
    }

    assert!(client.user().is_none());
    assert!(opened.lock().unwrap().is_none());
}

// ════════════════════════════════════════════════════════════════════
// Frame handling
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn noise_frames_are_dropped_without_breaking_the_stream() {
    let (connector, _opened) = ScriptedConnector::new(vec![
        Some(Ok("\u{1}\u{2} binary-ish junk".into())),
        Some(Ok("{\"event\":".into())),
        Some(Ok(event_frame(
            "pusher:connection_established",
            serde_json::json!({"socket_id": "1.1"}),
        ))),
        Some(Ok(chat_frame("still alive"))),
    ]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default(),
    );
    let mut messages = capture(&client, "ChatMessage");
    let mut pusher = capture(&client, "pusher:connection_established");

    init.wait().await.expect("initialization");

    // Pusher-internal frames pass through under their own name.
    let event = recv_timeout(&mut pusher).await;
    assert_eq!(event.frame_data().unwrap()["socket_id"], "1.1");

    // The malformed frames were dropped; the stream kept flowing.
    let event = recv_timeout(&mut messages).await;
    assert_eq!(event.frame_data().unwrap()["content"], "still alive");
    assert!(client.is_connected());
}

#[tokio::test]
async fn arbitrary_frame_types_become_event_names() {
    let (connector, _opened) = ScriptedConnector::new(vec![Some(Ok(event_frame(
        "App\\Events\\StreamerIsLiveEvent",
        serde_json::json!({"livestream": {"id": 1234}}),
    )))]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default(),
    );
    let mut live = capture(&client, "StreamerIsLive");

    init.wait().await.expect("initialization");

    let event = recv_timeout(&mut live).await;
    assert_eq!(event.frame_data().unwrap()["livestream"]["id"], 1234);
}

#[tokio::test]
async fn emote_normalization_respects_configuration() {
    for (plain_emote, expected) in [(true, "AB"), (false, "[emote:1:A][emote:2:B]")] {
        let (connector, _opened) =
            ScriptedConnector::new(vec![Some(Ok(chat_frame("[emote:1:A][emote:2:B]")))]);
        let (client, init) = KickChatClient::create(
            FixtureResolver::new(test_channel()),
            connector,
            "examplechannel",
            KickChatConfig::default().with_plain_emote(plain_emote),
        );
        let mut messages = capture(&client, "ChatMessage");

        init.wait().await.expect("initialization");

        let event = recv_timeout(&mut messages).await;
        assert_eq!(event.frame_data().unwrap()["content"], expected);
    }
}

// ════════════════════════════════════════════════════════════════════
// Subscription semantics
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn listeners_fire_in_registration_order_without_dedup() {
    let (connector, _opened) = ScriptedConnector::new(vec![Some(Ok(chat_frame("hi")))]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default(),
    );

    let order = Arc::new(StdMutex::new(Vec::new()));
    for tag in ["first", "second", "first"] {
        let order = Arc::clone(&order);
        client.on("ChatMessage", move |_event| {
            order.lock().unwrap().push(tag);
        });
    }

    init.wait().await.expect("initialization");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "first"]);
}

#[tokio::test]
async fn disconnect_listener_is_invoked_exactly_once() {
    let (connector, _opened) = ScriptedConnector::new(vec![None]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default(),
    );

    let count = Arc::new(StdMutex::new(0u32));
    {
        let count = Arc::clone(&count);
        client.on(EVENT_DISCONNECT, move |_event| {
            *count.lock().unwrap() += 1;
        });
    }

    init.wait().await.expect("initialization");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*count.lock().unwrap(), 1);
}

// ════════════════════════════════════════════════════════════════════
// send_message precondition
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn send_message_fails_fast_without_credentials() {
    let (connector, _opened) = ScriptedConnector::new(vec![]);
    let (client, init) = KickChatClient::create(
        FixtureResolver::new(test_channel()),
        connector,
        "examplechannel",
        KickChatConfig::default(),
    );
    init.wait().await.expect("initialization");

    let err = client.send_message("hi").await.unwrap_err();
    assert!(matches!(err, KickChatError::NotAuthenticated));
    assert_eq!(
        err.to_string(),
        "not logged in or channel info not available"
    );
}
