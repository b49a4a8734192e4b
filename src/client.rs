//! Async client for a Kick channel chatroom.
//!
//! [`KickChatClient::create`] returns immediately and runs initialization in
//! a background task: the channel name is resolved to a [`ChannelIdentity`],
//! a chatroom stream is opened through the supplied
//! [`ChatroomConnector`], and every inbound frame is parsed, normalized and
//! delivered to listeners registered with [`KickChatClient::on`].
//!
//! # Example
//!
//! ```rust,ignore
//! let (client, init) = KickChatClient::create(
//!     resolver,
//!     WebSocketConnector::new(),
//!     "xqc",
//!     KickChatConfig::default(),
//! );
//!
//! client.on(EVENT_READY, |event| {
//!     if let Some(user) = event.user() {
//!         println!("joined as {}", user.username);
//!     }
//! });
//! client.on("ChatMessage", |event| {
//!     if let Some(data) = event.frame_data() {
//!         println!("chat: {data}");
//!     }
//! });
//!
//! // Awaiting the handle is optional; it surfaces resolution failures.
//! init.wait().await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::channel::{ChannelIdentity, ChannelResolver, UserIdentity};
use crate::emote::replace_emote_tags;
use crate::error::{KickChatError, Result};
use crate::event::{KickChatEvent, EVENT_DISCONNECT, EVENT_READY};
use crate::protocol::{parse_frame, CHAT_MESSAGE_EVENT};
use crate::transport::{ChatTransport, ChatroomConnector};

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`KickChatClient`].
///
/// An immutable snapshot taken at construction time.
///
/// # Example
///
/// ```
/// use kick_chat_client::KickChatConfig;
///
/// let config = KickChatConfig::default()
///     .with_plain_emote(false)
///     .with_logger(true);
/// assert!(!config.plain_emote);
/// assert!(config.logger);
/// ```
#[derive(Debug, Clone)]
pub struct KickChatConfig {
    /// Rewrite `[emote:<id>:<name>]` markers in chat message content to
    /// plain `<name>` text before delivery. Defaults to **true**.
    pub plain_emote: bool,
    /// Log connect/disconnect notices at `info` level. Defaults to **false**.
    pub logger: bool,
}

impl Default for KickChatConfig {
    fn default() -> Self {
        Self {
            plain_emote: true,
            logger: false,
        }
    }
}

impl KickChatConfig {
    /// Enable or disable emote-tag-to-plain-text rewriting.
    #[must_use]
    pub fn with_plain_emote(mut self, plain_emote: bool) -> Self {
        self.plain_emote = plain_emote;
        self
    }

    /// Enable or disable connect/disconnect notices.
    #[must_use]
    pub fn with_logger(mut self, logger: bool) -> Self {
        self.logger = logger;
        self
    }
}

// ── Credentials placeholder ─────────────────────────────────────────

/// Credentials for an authenticated Kick session.
///
/// No login flow exists yet, so nothing constructs these today;
/// [`KickChatClient::send_message`] keeps the precondition contract in
/// place for when one lands.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    /// Bearer / XSRF token.
    pub token: String,
    /// Session cookie header value.
    pub cookies: String,
}

// ── Shared state ────────────────────────────────────────────────────

/// A registered event listener.
type Listener = Arc<dyn Fn(&KickChatEvent) + Send + Sync + 'static>;

/// Listener registry plus the `ready` replay snapshot.
///
/// Both live under one lock so a listener registered while `ready` fires is
/// delivered the event exactly once: it is either in the list the
/// dispatcher cloned, or it observes the recorded snapshot and replays.
struct Registry {
    listeners: HashMap<String, Vec<Listener>>,
    ready_user: Option<UserIdentity>,
}

/// State shared between the client handle and the dispatch task.
///
/// All mutation happens either at registration time (`on`) or from the
/// single dispatch task, so plain std mutexes held only for non-awaiting
/// critical sections are sufficient.
struct ClientState {
    channel: StdMutex<Option<ChannelIdentity>>,
    registry: StdMutex<Registry>,
    credentials: StdMutex<Option<SessionCredentials>>,
    connected: AtomicBool,
}

impl ClientState {
    fn new() -> Self {
        Self {
            channel: StdMutex::new(None),
            registry: StdMutex::new(Registry {
                listeners: HashMap::new(),
                ready_user: None,
            }),
            credentials: StdMutex::new(None),
            connected: AtomicBool::new(false),
        }
    }
}

// ── Initialization handle ───────────────────────────────────────────

/// Handle to the background initialization started by
/// [`KickChatClient::create`].
///
/// Construction never blocks; this handle is how a caller observes whether
/// initialization succeeded. Dropping it is allowed — initialization keeps
/// running either way.
#[must_use = "awaiting the handle is the only way to observe initialization failure"]
#[derive(Debug)]
pub struct InitHandle {
    rx: oneshot::Receiver<Result<()>>,
}

impl InitHandle {
    /// Wait for initialization to finish.
    ///
    /// Resolves with `Ok(())` once the chatroom stream is open and the
    /// `ready` event has fired.
    ///
    /// # Errors
    ///
    /// Propagates the resolution or connection error, or
    /// [`KickChatError::InitAborted`] if the client was dropped before
    /// initialization completed.
    pub async fn wait(self) -> Result<()> {
        self.rx.await.unwrap_or(Err(KickChatError::InitAborted))
    }
}

// ── Client handle ───────────────────────────────────────────────────

/// Handle to one channel's chat stream.
///
/// Created via [`KickChatClient::create`]. Listeners can be registered at
/// any time, including after the stream has disconnected; the handle stays
/// valid (and [`user`](KickChatClient::user) keeps answering) for its whole
/// lifetime. There is no reconnect: the only termination path is the
/// transport closing, after which the reserved `disconnect` event fires.
pub struct KickChatClient {
    channel_name: String,
    state: Arc<ClientState>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl KickChatClient {
    /// Create a client for `channel_name` and start initialization in the
    /// background.
    ///
    /// Returns immediately with the client handle and an [`InitHandle`] the
    /// caller may await (to observe failure) or drop (fire-and-forget).
    /// `channel_name` should be non-empty; what an empty or unknown name
    /// does is up to the resolver's failure contract.
    pub fn create<R, C>(
        resolver: R,
        connector: C,
        channel_name: impl Into<String>,
        config: KickChatConfig,
    ) -> (Self, InitHandle)
    where
        R: ChannelResolver,
        C: ChatroomConnector,
    {
        let channel_name = channel_name.into();
        let state = Arc::new(ClientState::new());
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        let task = tokio::spawn(run_client(
            resolver,
            connector,
            channel_name.clone(),
            config,
            Arc::clone(&state),
            init_tx,
        ));

        let client = Self {
            channel_name,
            state,
            task: Some(task),
        };

        (client, InitHandle { rx: init_rx })
    }

    /// Register a listener for a named event.
    ///
    /// Any string is accepted: the reserved names
    /// [`EVENT_READY`](crate::event::EVENT_READY) and
    /// [`EVENT_DISCONNECT`](crate::event::EVENT_DISCONNECT), plus whatever
    /// types parsed frames carry (e.g. `"ChatMessage"`). Listeners fire in
    /// registration order; registering the same listener twice means it
    /// runs twice per matching event.
    ///
    /// A `ready` listener registered after the stream connected is invoked
    /// immediately with the recorded identity snapshot, so observing
    /// `ready` does not depend on registration racing the background task.
    pub fn on<F>(&self, event_name: impl Into<String>, listener: F)
    where
        F: Fn(&KickChatEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let replay = match self.state.registry.lock() {
            Ok(mut registry) => {
                let event_name = event_name.into();
                let replay = if event_name == EVENT_READY {
                    registry.ready_user.clone()
                } else {
                    None
                };
                registry
                    .listeners
                    .entry(event_name)
                    .or_default()
                    .push(Arc::clone(&listener));
                replay
            }
            Err(_) => {
                warn!("listener registry poisoned; listener not registered");
                return;
            }
        };

        // `ready` fired before this registration completed: replay it.
        if let Some(user) = replay {
            listener(&KickChatEvent::Ready { user });
        }
    }

    /// The identity of the joined channel, viewed as a user.
    ///
    /// `None` until channel resolution completes, then a stable value for
    /// the lifetime of the client. Recomputed from the channel identity on
    /// each call; never panics.
    pub fn user(&self) -> Option<UserIdentity> {
        self.state
            .channel
            .lock()
            .ok()?
            .as_ref()
            .map(UserIdentity::from)
    }

    /// The channel name this client was created for.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Returns `true` while the chatroom stream is believed to be open.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    /// Post a chat message to the channel.
    ///
    /// Requires an authenticated session and a resolved channel identity.
    /// No login flow exists yet, so the precondition can never be satisfied
    /// and this always fails with [`KickChatError::NotAuthenticated`]
    /// without performing any I/O — a deliberate placeholder contract for
    /// future authentication work.
    ///
    /// # Errors
    ///
    /// [`KickChatError::NotAuthenticated`] when the session credentials or
    /// the channel identity are missing.
    pub async fn send_message(&self, content: &str) -> Result<()> {
        let has_credentials = self
            .state
            .credentials
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        let has_channel = self
            .state
            .channel
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);

        if !has_credentials || !has_channel {
            return Err(KickChatError::NotAuthenticated);
        }

        // TODO: POST {content, type: "message"} to the per-channel messages
        // endpoint (bearer + XSRF token + session cookie) once a login flow
        // exists. The precondition above cannot pass until then.
        let _ = content;
        Ok(())
    }
}

impl std::fmt::Debug for KickChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KickChatClient")
            .field("channel_name", &self.channel_name)
            .field("connected", &self.is_connected())
            .field("resolved", &self.user().is_some())
            .finish()
    }
}

impl Drop for KickChatClient {
    fn drop(&mut self) {
        // `Drop` is synchronous, so the only safe action is to abort the
        // background task; there is no executor context to drive a graceful
        // transport close here.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Background task ─────────────────────────────────────────────────

/// Initialization plus dispatch loop, run once per client.
///
/// Resolution or connection failure is logged and reported through
/// `init_tx`, then the task exits — there is no retry. After a successful
/// connect the loop runs until the transport closes.
async fn run_client<R, C>(
    resolver: R,
    connector: C,
    channel_name: String,
    config: KickChatConfig,
    state: Arc<ClientState>,
    init_tx: oneshot::Sender<Result<()>>,
) where
    R: ChannelResolver,
    C: ChatroomConnector,
{
    debug!(channel = %channel_name, "resolving channel");

    let identity = match resolver.fetch_channel_info(&channel_name).await {
        Ok(identity) => identity,
        Err(e) => {
            error!(channel = %channel_name, "channel resolution failed: {e}");
            let _ = init_tx.send(Err(e));
            return;
        }
    };

    // Snapshot the user view before the identity moves into shared state.
    let user = UserIdentity::from(&identity);
    let chatroom_id = identity.chatroom_id;
    if let Ok(mut slot) = state.channel.lock() {
        *slot = Some(identity);
    }

    let mut transport = match connector.open_chatroom(chatroom_id).await {
        Ok(transport) => transport,
        Err(e) => {
            error!(channel = %channel_name, chatroom_id, "failed to open chatroom stream: {e}");
            let _ = init_tx.send(Err(e));
            return;
        }
    };

    state.connected.store(true, Ordering::Release);
    if config.logger {
        info!(channel = %channel_name, "connected to channel");
    }
    dispatch_ready(&state, user);
    let _ = init_tx.send(Ok(()));

    while let Some(incoming) = transport.recv().await {
        match incoming {
            Ok(raw) => handle_frame(&state, &config, &raw),
            Err(e) => {
                // Logging-only passthrough: the stream either recovers or
                // ends with `None` on a subsequent poll.
                error!(channel = %channel_name, "transport error: {e}");
            }
        }
    }

    state.connected.store(false, Ordering::Release);
    if config.logger {
        info!(channel = %channel_name, "disconnected from channel");
    }
    dispatch(&state, EVENT_DISCONNECT, &KickChatEvent::Disconnect);

    debug!(channel = %channel_name, "dispatch loop exited");
}

/// Parse one raw frame and deliver it to subscribers.
///
/// Undecodable frames are expected transport noise and are dropped without
/// surfacing an error. `ChatMessage` content is normalized in place when
/// `plain_emote` is on; normalization always completes before delivery.
fn handle_frame(state: &ClientState, config: &KickChatConfig, raw: &str) {
    let Some(mut envelope) = parse_frame(raw) else {
        debug!("dropping undecodable frame");
        return;
    };

    if config.plain_emote && envelope.event_type == CHAT_MESSAGE_EVENT {
        if let Some(content) = envelope.data.get_mut("content") {
            if let Some(text) = content.as_str() {
                *content = serde_json::Value::String(replace_emote_tags(text));
            }
        }
    }

    let event_type = envelope.event_type;
    let event = KickChatEvent::Frame {
        data: envelope.data,
    };
    dispatch(state, &event_type, &event);
}

/// Record the `ready` snapshot and deliver the event to already-registered
/// listeners.
///
/// Recording the snapshot and cloning the listener list happen under one
/// registry lock, so a concurrent [`KickChatClient::on`] either lands in the
/// cloned list or observes the snapshot and replays. Exactly one of the two
/// happens.
fn dispatch_ready(state: &ClientState, user: UserIdentity) {
    let listeners: Vec<Listener> = match state.registry.lock() {
        Ok(mut registry) => {
            registry.ready_user = Some(user.clone());
            registry
                .listeners
                .get(EVENT_READY)
                .cloned()
                .unwrap_or_default()
        }
        Err(_) => {
            warn!("listener registry poisoned; dropping ready event");
            return;
        }
    };

    let event = KickChatEvent::Ready { user };
    for listener in &listeners {
        listener(&event);
    }
}

/// Invoke every listener registered under `event_name`, in registration
/// order. Listeners run to completion before the next event is dispatched.
fn dispatch(state: &ClientState, event_name: &str, event: &KickChatEvent) {
    let listeners: Vec<Listener> = match state.registry.lock() {
        Ok(registry) => registry.listeners.get(event_name).cloned().unwrap_or_default(),
        // A poisoned registry means a listener panicked during `on`; skip
        // delivery rather than take the whole task down.
        Err(_) => {
            warn!(event_name, "listener registry poisoned; dropping event");
            return;
        }
    };

    for listener in &listeners {
        listener(event);
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::mpsc;

    // ── Mocks ───────────────────────────────────────────────────────

    /// Scripted resolver. An optional gate holds resolution open until the
    /// test releases it.
    struct MockResolver {
        response: StdMutex<Option<Result<ChannelIdentity>>>,
        gate: StdMutex<Option<oneshot::Receiver<()>>>,
    }

    impl MockResolver {
        fn ok(identity: ChannelIdentity) -> Self {
            Self {
                response: StdMutex::new(Some(Ok(identity))),
                gate: StdMutex::new(None),
            }
        }

        fn err(message: &str) -> Self {
            Self {
                response: StdMutex::new(Some(Err(KickChatError::ChannelResolution(
                    message.into(),
                )))),
                gate: StdMutex::new(None),
            }
        }

        fn gated(identity: ChannelIdentity) -> (Self, oneshot::Sender<()>) {
            let (tx, rx) = oneshot::channel();
            let resolver = Self {
                response: StdMutex::new(Some(Ok(identity))),
                gate: StdMutex::new(Some(rx)),
            };
            (resolver, tx)
        }
    }

    #[async_trait]
    impl ChannelResolver for MockResolver {
        async fn fetch_channel_info(&self, _channel_name: &str) -> Result<ChannelIdentity> {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(KickChatError::ChannelResolution("exhausted".into())))
        }
    }

    /// Scripted transport: yields `incoming` in order, then hangs so the
    /// dispatch loop stays alive unless a `None` (clean close) is scripted.
    struct MockTransport {
        incoming: VecDeque<Option<Result<String>>>,
    }

    #[async_trait]
    impl ChatTransport for MockTransport {
        async fn send(&mut self, _message: String) -> Result<()> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String>> {
            if let Some(item) = self.incoming.pop_front() {
                item
            } else {
                std::future::pending().await
            }
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Hands out a single scripted transport and records the chatroom id.
    struct MockConnector {
        transport: StdMutex<Option<MockTransport>>,
        opened: Arc<StdMutex<Option<u64>>>,
    }

    impl MockConnector {
        fn new(incoming: Vec<Option<Result<String>>>) -> (Self, Arc<StdMutex<Option<u64>>>) {
            let opened = Arc::new(StdMutex::new(None));
            let connector = Self {
                transport: StdMutex::new(Some(MockTransport {
                    incoming: VecDeque::from(incoming),
                })),
                opened: Arc::clone(&opened),
            };
            (connector, opened)
        }

        fn failing() -> Self {
            Self {
                transport: StdMutex::new(None),
                opened: Arc::new(StdMutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl ChatroomConnector for MockConnector {
        type Transport = MockTransport;

        async fn open_chatroom(&self, chatroom_id: u64) -> Result<MockTransport> {
            *self.opened.lock().unwrap() = Some(chatroom_id);
            self.transport
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| KickChatError::TransportConnect("scripted failure".into()))
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn identity() -> ChannelIdentity {
        ChannelIdentity {
            id: 42,
            slug: "examplechannel".into(),
            chatroom_id: 99,
            streamer_username: "ExampleStreamer".into(),
        }
    }

    fn chat_frame(content: &str) -> String {
        let data = serde_json::json!({
            "id": "m1",
            "chatroom_id": 99,
            "content": content,
            "type": "message",
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

    /// Register a listener that forwards cloned events to a channel.
    fn capture(
        client: &KickChatClient,
        event_name: &str,
    ) -> mpsc::UnboundedReceiver<KickChatEvent> {
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

    // ── Lifecycle ───────────────────────────────────────────────────

    #[tokio::test]
    async fn ready_carries_resolved_user_identity() {
        let (connector, opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        let mut ready = capture(&client, EVENT_READY);

        init.wait().await.unwrap();

        let event = recv_timeout(&mut ready).await;
        let user = event.user().expect("ready carries a user");
        assert_eq!(user.id, 42);
        assert_eq!(user.username, "examplechannel");
        assert_eq!(user.tag, "ExampleStreamer");

        // The transport was keyed by the resolved chatroom id.
        assert_eq!(*opened.lock().unwrap(), Some(99));
        assert!(client.is_connected());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn ready_is_replayed_to_listeners_registered_after_connect() {
        let (connector, _opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );

        // Let the background task connect and fire `ready` before any
        // listener exists.
        init.wait().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut ready = capture(&client, EVENT_READY);
        let event = recv_timeout(&mut ready).await;
        let user = event.user().expect("replayed ready carries a user");
        assert_eq!(user.id, 42);
        assert_eq!(user.username, "examplechannel");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn early_ready_listener_is_invoked_exactly_once() {
        let (connector, _opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );

        // Registration races the background task's dispatch here; either
        // path must deliver exactly one `ready`.
        let count = Arc::new(StdMutex::new(0u32));
        {
            let count = Arc::clone(&count);
            client.on(EVENT_READY, move |_event| {
                *count.lock().unwrap() += 1;
            });
        }

        init.wait().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn user_is_none_before_resolution_and_stable_after() {
        let (resolver, gate) = MockResolver::gated(identity());
        let (connector, _opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            resolver,
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );

        assert!(client.user().is_none());

        gate.send(()).unwrap();
        init.wait().await.unwrap();

        let first = client.user().expect("resolved");
        let second = client.user().expect("still resolved");
        assert_eq!(first, second);
        assert_eq!(first.id, 42);
    }

    #[tokio::test]
    async fn resolution_failure_surfaces_through_init_handle() {
        let (connector, opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            MockResolver::err("unknown channel"),
            connector,
            "nosuchchannel",
            KickChatConfig::default(),
        );

        let err = init.wait().await.unwrap_err();
        assert!(matches!(err, KickChatError::ChannelResolution(_)));

        // Resolution never happened, so no identity and no connection.
        assert!(client.user().is_none());
        assert!(!client.is_connected());
        assert!(opened.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn connect_failure_surfaces_through_init_handle() {
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            MockConnector::failing(),
            "examplechannel",
            KickChatConfig::default(),
        );

        let err = init.wait().await.unwrap_err();
        assert!(matches!(err, KickChatError::TransportConnect(_)));

        // Identity resolved before the connect attempt, so `user` works.
        assert!(client.user().is_some());
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn init_handle_reports_abort_when_client_is_dropped() {
        let (resolver, _gate) = MockResolver::gated(identity());
        let (connector, _opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            resolver,
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );

        // Dropping the gate sender and the client aborts the task while it
        // is still waiting on the resolver.
        drop(client);

        let err = init.wait().await.unwrap_err();
        assert!(matches!(err, KickChatError::InitAborted));
    }

    // ── Frame delivery ──────────────────────────────────────────────

    #[tokio::test]
    async fn chat_messages_are_delivered_in_arrival_order() {
        let (connector, _opened) = MockConnector::new(vec![
            Some(Ok(chat_frame("first"))),
            Some(Ok(chat_frame("second"))),
        ]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        let mut messages = capture(&client, "ChatMessage");

        init.wait().await.unwrap();

        let first = recv_timeout(&mut messages).await;
        assert_eq!(first.frame_data().unwrap()["content"], "first");
        let second = recv_timeout(&mut messages).await;
        assert_eq!(second.frame_data().unwrap()["content"], "second");
    }

    #[tokio::test]
    async fn undecodable_frames_are_dropped_silently() {
        let (connector, _opened) = MockConnector::new(vec![
            Some(Ok("garbage not json".into())),
            Some(Ok(r#"{"event":"App\\Events\\ChatMessageEvent","data":"not json"}"#.into())),
            Some(Ok(chat_frame("survivor"))),
        ]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        let mut messages = capture(&client, "ChatMessage");

        init.wait().await.unwrap();

        // Only the well-formed frame arrives; the loop survived the noise.
        let event = recv_timeout(&mut messages).await;
        assert_eq!(event.frame_data().unwrap()["content"], "survivor");
        assert!(client.is_connected());
    }

    #[tokio::test]
    async fn transport_errors_are_logged_and_do_not_stop_the_loop() {
        let (connector, _opened) = MockConnector::new(vec![
            Some(Err(KickChatError::TransportReceive("blip".into()))),
            Some(Ok(chat_frame("after error"))),
        ]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        let mut messages = capture(&client, "ChatMessage");

        init.wait().await.unwrap();

        let event = recv_timeout(&mut messages).await;
        assert_eq!(event.frame_data().unwrap()["content"], "after error");
    }

    #[tokio::test]
    async fn dynamic_event_names_pass_through() {
        let raw = serde_json::json!({
            "event": "App\\Events\\UserBannedEvent",
            "data": serde_json::json!({"user": {"id": 7}}).to_string(),
        })
        .to_string();

        let (connector, _opened) = MockConnector::new(vec![Some(Ok(raw))]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        let mut banned = capture(&client, "UserBanned");

        init.wait().await.unwrap();

        let event = recv_timeout(&mut banned).await;
        assert_eq!(event.frame_data().unwrap()["user"]["id"], 7);
    }

    // ── Normalization ───────────────────────────────────────────────

    #[tokio::test]
    async fn plain_emote_rewrites_chat_content() {
        let (connector, _opened) =
            MockConnector::new(vec![Some(Ok(chat_frame("[emote:123:PogChamp] hello")))]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        let mut messages = capture(&client, "ChatMessage");

        init.wait().await.unwrap();

        let event = recv_timeout(&mut messages).await;
        assert_eq!(event.frame_data().unwrap()["content"], "PogChamp hello");
    }

    #[tokio::test]
    async fn plain_emote_disabled_leaves_content_unchanged() {
        let (connector, _opened) =
            MockConnector::new(vec![Some(Ok(chat_frame("[emote:123:PogChamp] hello")))]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default().with_plain_emote(false),
        );
        let mut messages = capture(&client, "ChatMessage");

        init.wait().await.unwrap();

        let event = recv_timeout(&mut messages).await;
        assert_eq!(
            event.frame_data().unwrap()["content"],
            "[emote:123:PogChamp] hello"
        );
    }

    // ── Subscription semantics ──────────────────────────────────────

    #[tokio::test]
    async fn duplicate_listener_registration_is_invoked_twice() {
        let (connector, _opened) = MockConnector::new(vec![Some(Ok(chat_frame("hi")))]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );

        let count = Arc::new(StdMutex::new(0u32));
        for _ in 0..2 {
            let count = Arc::clone(&count);
            client.on("ChatMessage", move |_event| {
                *count.lock().unwrap() += 1;
            });
        }

        init.wait().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn disconnect_fires_exactly_once_on_transport_close() {
        let (connector, _opened) =
            MockConnector::new(vec![Some(Ok(chat_frame("bye"))), None]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );

        let count = Arc::new(StdMutex::new(0u32));
        {
            let count = Arc::clone(&count);
            client.on(EVENT_DISCONNECT, move |event| {
                assert!(matches!(event, KickChatEvent::Disconnect));
                *count.lock().unwrap() += 1;
            });
        }

        init.wait().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(!client.is_connected());
        // The handle stays usable after disconnect.
        assert!(client.user().is_some());
    }

    // ── send_message ────────────────────────────────────────────────

    #[tokio::test]
    async fn send_message_always_fails_unauthenticated() {
        let (connector, _opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        init.wait().await.unwrap();

        let err = client.send_message("hi").await.unwrap_err();
        assert!(matches!(err, KickChatError::NotAuthenticated));
    }

    // ── Config ──────────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = KickChatConfig::default();
        assert!(config.plain_emote);
        assert!(!config.logger);
    }

    #[tokio::test]
    async fn debug_impl_for_client() {
        let (connector, _opened) = MockConnector::new(vec![]);
        let (client, init) = KickChatClient::create(
            MockResolver::ok(identity()),
            connector,
            "examplechannel",
            KickChatConfig::default(),
        );
        init.wait().await.unwrap();

        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("KickChatClient"));
        assert!(debug_str.contains("examplechannel"));
    }
}
