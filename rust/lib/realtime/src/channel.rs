//! Realtime notification channel: STOMP over WebSocket.
//!
//! One background task owns the socket. It connects, subscribes to the
//! configured topics, dispatches every MESSAGE as a [`Notification`], keeps
//! heart-beats flowing both ways, and after a dropped session waits a flat
//! `reconnect_delay` before trying again. [`NotificationChannel::disconnect`]
//! stops it.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use shopfront_client::CredentialStore;
use shopfront_core::{ConfigError, ServiceConfig};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::model::Notification;
use crate::stomp::{Command, Frame, FrameDecoder, HeartBeat, Inbound, StompError};

/// Time allowed between opening the socket and receiving CONNECTED.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("stomp: {0}")]
    Stomp(#[from] StompError),

    #[error("server error: {0}")]
    Server(String),

    #[error("malformed notification: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("no heart-beat from server for {0:?}")]
    HeartBeatTimeout(Duration),

    #[error("no CONNECTED frame from server")]
    Handshake,
}

pub type MessageHandler = Arc<dyn Fn(&str, Notification) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(&ChannelError) + Send + Sync>;
pub type LifecycleHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default, Clone)]
struct Handlers {
    message: Vec<MessageHandler>,
    error: Vec<ErrorHandler>,
    connect: Vec<LifecycleHandler>,
    close: Vec<LifecycleHandler>,
}

type SharedHandlers = Arc<RwLock<Handlers>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// `ws://` or `wss://` URL of the STOMP endpoint.
    pub url: String,
    /// Value of the CONNECT `host` header.
    pub host: String,
    pub topics: Vec<String>,
    pub reconnect_delay: Duration,
    /// What this client offers in CONNECT; the server's answer is
    /// negotiated against it.
    pub heart_beat: HeartBeat,
}

impl ChannelConfig {
    pub fn from_service(config: &ServiceConfig, topics: Vec<String>) -> Result<Self, ConfigError> {
        let url = config.websocket_url()?;
        let host = url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split(['/', ':']).next())
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            url,
            host,
            topics,
            reconnect_delay: config.realtime.reconnect_delay(),
            heart_beat: HeartBeat::new(
                config.realtime.heartbeat_outgoing_ms,
                config.realtime.heartbeat_incoming_ms,
            ),
        })
    }
}

struct Session {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct NotificationChannel {
    config: ChannelConfig,
    credentials: Arc<CredentialStore>,
    handlers: SharedHandlers,
    session: Mutex<Option<Session>>,
}

impl NotificationChannel {
    pub fn new(config: ChannelConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            config,
            credentials,
            handlers: Arc::new(RwLock::new(Handlers::default())),
            session: Mutex::new(None),
        }
    }

    /// Called once per inbound notification with the topic it arrived on.
    pub fn on_message<F>(&self, handler: F) -> &Self
    where
        F: Fn(&str, Notification) + Send + Sync + 'static,
    {
        self.write_handlers().message.push(Arc::new(handler));
        self
    }

    /// Session failures and undecodable messages.
    pub fn on_error<F>(&self, handler: F) -> &Self
    where
        F: Fn(&ChannelError) + Send + Sync + 'static,
    {
        self.write_handlers().error.push(Arc::new(handler));
        self
    }

    /// Fired after CONNECTED and the topic subscriptions.
    pub fn on_connect<F>(&self, handler: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.write_handlers().connect.push(Arc::new(handler));
        self
    }

    /// Fired whenever an established session ends.
    pub fn on_close<F>(&self, handler: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.write_handlers().close.push(Arc::new(handler));
        self
    }

    fn write_handlers(&self) -> std::sync::RwLockWriteGuard<'_, Handlers> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the session task. No-op while a session is running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.as_ref().is_some_and(|s| !s.task.is_finished()) {
            debug!(url = %self.config.url, "realtime channel already running");
            return;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(
            self.config.clone(),
            Arc::clone(&self.credentials),
            Arc::clone(&self.handlers),
            shutdown_rx,
        ));
        *session = Some(Session { shutdown, task });
    }

    pub fn is_running(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    /// Stop the session task and wait for it to exit. Safe to call when not
    /// connected.
    pub async fn disconnect(&self) {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(session) = session else {
            return;
        };
        let _ = session.shutdown.send(true);
        if let Err(e) = session.task.await {
            warn!(error = %e, "realtime task ended abnormally");
        }
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        let session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            let _ = session.shutdown.send(true);
        }
    }
}

// ── Session task ────────────────────────────────────────────────────

enum SessionEnd {
    Shutdown,
    Dropped,
}

async fn run(
    config: ChannelConfig,
    credentials: Arc<CredentialStore>,
    handlers: SharedHandlers,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut attempt: u64 = 0;
    loop {
        if *shutdown.borrow() {
            break;
        }
        attempt += 1;

        let mut connected = false;
        let result = run_session(&config, &credentials, &handlers, &mut shutdown, &mut connected).await;
        let stop = matches!(result, Ok(SessionEnd::Shutdown));
        match result {
            Ok(SessionEnd::Shutdown) => info!(url = %config.url, "realtime channel closed"),
            Ok(SessionEnd::Dropped) => info!(url = %config.url, attempt, "realtime session dropped"),
            Err(e) => {
                warn!(url = %config.url, attempt, error = %e, "realtime session failed");
                emit_error(&handlers, &e);
            }
        }
        if connected {
            attempt = 0;
            emit_close(&handlers);
        }
        if stop {
            break;
        }

        tokio::select! {
            _ = sleep(config.reconnect_delay) => {}
            _ = shutdown.changed() => break,
        }
    }
}

async fn run_session(
    config: &ChannelConfig,
    credentials: &CredentialStore,
    handlers: &SharedHandlers,
    shutdown: &mut watch::Receiver<bool>,
    connected: &mut bool,
) -> Result<SessionEnd, ChannelError> {
    let (ws, _) = tokio::select! {
        res = tokio_tungstenite::connect_async(config.url.as_str()) => res?,
        _ = shutdown.changed() => return Ok(SessionEnd::Shutdown),
    };
    let (mut sink, mut stream) = ws.split();

    let bearer = credentials.get();
    let connect = Frame::connect(&config.host, config.heart_beat, bearer.as_deref());
    sink.send(to_message(&connect)).await?;

    let mut decoder = FrameDecoder::new();
    let mut beat = HeartBeat::default();
    let opened = Instant::now();
    let mut last_seen = Instant::now();
    // Both timers stay disabled until CONNECTED negotiates a non-zero interval.
    let mut next_ping: Option<Instant> = None;

    loop {
        let watchdog = if !*connected {
            Some(opened + CONNECT_TIMEOUT)
        } else if beat.incoming > 0 {
            Some(last_seen + Duration::from_millis(beat.incoming * 2))
        } else {
            None
        };

        tokio::select! {
            _ = shutdown.changed() => {
                let _ = sink.send(to_message(&Frame::disconnect())).await;
                let _ = sink.close().await;
                return Ok(SessionEnd::Shutdown);
            }
            _ = sleep_until(next_ping.unwrap_or_else(Instant::now)), if next_ping.is_some() => {
                sink.send(Message::Text("\n".to_string())).await?;
                next_ping = ping_deadline(beat);
            }
            _ = sleep_until(watchdog.unwrap_or_else(Instant::now)), if watchdog.is_some() => {
                if !*connected {
                    return Err(ChannelError::Handshake);
                }
                return Err(ChannelError::HeartBeatTimeout(Duration::from_millis(beat.incoming * 2)));
            }
            msg = stream.next() => {
                let Some(msg) = msg else {
                    return Ok(SessionEnd::Dropped);
                };
                last_seen = Instant::now();
                let inbound = match msg? {
                    Message::Text(text) => decoder.feed(text.as_bytes())?,
                    Message::Binary(bytes) => decoder.feed(&bytes)?,
                    Message::Close(_) => return Ok(SessionEnd::Dropped),
                    _ => continue,
                };

                for item in inbound {
                    let Inbound::Frame(frame) = item else {
                        continue;
                    };
                    match frame.command {
                        Command::Connected => {
                            let server = frame
                                .header("heart-beat")
                                .map(HeartBeat::parse)
                                .transpose()?
                                .unwrap_or_default();
                            beat = config.heart_beat.negotiate(server);
                            for (i, topic) in config.topics.iter().enumerate() {
                                let sub = Frame::subscribe(&format!("sub-{}", i), topic);
                                sink.send(to_message(&sub)).await?;
                            }
                            *connected = true;
                            next_ping = ping_deadline(beat);
                            info!(
                                url = %config.url,
                                topics = ?config.topics,
                                heart_beat = %beat.to_header(),
                                "realtime channel connected"
                            );
                            emit_connect(handlers);
                        }
                        Command::Message => dispatch(handlers, &frame),
                        Command::Error => {
                            let message = frame
                                .header("message")
                                .map(str::to_string)
                                .unwrap_or_else(|| frame.body_text());
                            return Err(ChannelError::Server(message));
                        }
                        other => debug!(command = %other, "ignoring frame"),
                    }
                }
            }
        }
    }
}

/// Next client heart-beat, or `None` when outgoing beats are off.
fn ping_deadline(beat: HeartBeat) -> Option<Instant> {
    (beat.outgoing > 0).then(|| Instant::now() + Duration::from_millis(beat.outgoing))
}

fn to_message(frame: &Frame) -> Message {
    Message::Text(String::from_utf8_lossy(&frame.encode()).into_owned())
}

fn snapshot(handlers: &SharedHandlers) -> Handlers {
    handlers
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn dispatch(handlers: &SharedHandlers, frame: &Frame) {
    let topic = frame.header("destination").unwrap_or_default();
    match serde_json::from_slice::<Notification>(&frame.body) {
        Ok(item) => {
            debug!(topic, id = item.id, "notification received");
            for handler in snapshot(handlers).message {
                handler(topic, item.clone());
            }
        }
        Err(e) => {
            warn!(topic, error = %e, "dropping undecodable notification");
            emit_error(handlers, &ChannelError::Payload(e));
        }
    }
}

fn emit_error(handlers: &SharedHandlers, err: &ChannelError) {
    for handler in snapshot(handlers).error {
        handler(err);
    }
}

fn emit_connect(handlers: &SharedHandlers) {
    for handler in snapshot(handlers).connect {
        handler();
    }
}

fn emit_close(handlers: &SharedHandlers) {
    for handler in snapshot(handlers).close {
        handler();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_tungstenite::WebSocketStream;

    type ServerSocket = WebSocketStream<TcpStream>;

    const WAIT: Duration = Duration::from_secs(5);

    fn config(url: String) -> ChannelConfig {
        ChannelConfig {
            url,
            host: "127.0.0.1".into(),
            topics: vec!["/topic/admin/orders".into(), "/user/queue/orders".into()],
            reconnect_delay: Duration::from_millis(50),
            heart_beat: HeartBeat::new(0, 0),
        }
    }

    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        (listener, url)
    }

    async fn accept(listener: &TcpListener) -> ServerSocket {
        let (tcp, _) = listener.accept().await.unwrap();
        tokio_tungstenite::accept_async(tcp).await.unwrap()
    }

    /// Next frame from the client, skipping heart-beats.
    async fn read_frame(ws: &mut ServerSocket) -> Frame {
        let mut decoder = FrameDecoder::new();
        loop {
            let msg = ws.next().await.unwrap().unwrap();
            let data = match msg {
                Message::Text(t) => t.into_bytes(),
                Message::Binary(b) => b,
                _ => continue,
            };
            for item in decoder.feed(&data).unwrap() {
                if let Inbound::Frame(f) = item {
                    return f;
                }
            }
        }
    }

    async fn send_raw(ws: &mut ServerSocket, raw: &str) {
        ws.send(Message::Text(raw.to_string())).await.unwrap();
    }

    /// CONNECT → CONNECTED, then consume the subscriptions.
    async fn handshake(ws: &mut ServerSocket, server_beat: &str) -> (Frame, Vec<String>) {
        let connect = read_frame(ws).await;
        send_raw(ws, &format!("CONNECTED\nversion:1.2\nheart-beat:{}\n\n\0", server_beat)).await;
        let mut destinations = Vec::new();
        for _ in 0..2 {
            let sub = read_frame(ws).await;
            assert_eq!(sub.command, Command::Subscribe);
            destinations.push(sub.header("destination").unwrap().to_string());
        }
        (connect, destinations)
    }

    fn message_frame(topic: &str, body: &str) -> String {
        format!("MESSAGE\ndestination:{}\nsubscription:sub-0\nmessage-id:1\n\n{}\0", topic, body)
    }

    fn collect_messages(channel: &NotificationChannel) -> mpsc::UnboundedReceiver<(String, Notification)> {
        let (tx, rx) = mpsc::unbounded_channel();
        channel.on_message(move |topic, item| {
            let _ = tx.send((topic.to_string(), item));
        });
        rx
    }

    #[tokio::test]
    async fn connects_subscribes_and_delivers() {
        let (listener, url) = listen().await;
        let credentials = Arc::new(CredentialStore::in_memory());
        credentials.set("tok-9").unwrap();
        let channel = NotificationChannel::new(config(url), credentials);
        let mut rx = collect_messages(&channel);

        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            let (connect, destinations) = handshake(&mut ws, "0,0").await;
            send_raw(
                &mut ws,
                &message_frame("/topic/admin/orders", r#"{"id":5,"title":"New order","isRead":false}"#),
            )
            .await;
            let last = read_frame(&mut ws).await;
            let _ = done_tx.send(last.command);
            (connect, destinations)
        });

        channel.connect();
        let (topic, item) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(topic, "/topic/admin/orders");
        assert_eq!(item.id, 5);
        assert_eq!(item.title, "New order");

        channel.disconnect().await;
        assert!(!channel.is_running());
        assert_eq!(timeout(WAIT, done_rx).await.unwrap().unwrap(), Command::Disconnect);

        let (connect, destinations) = server.await.unwrap();
        assert_eq!(connect.command, Command::Connect);
        assert_eq!(connect.header("Authorization"), Some("Bearer tok-9"));
        assert_eq!(connect.header("accept-version"), Some("1.2"));
        assert_eq!(destinations, vec!["/topic/admin/orders", "/user/queue/orders"]);
    }

    #[tokio::test]
    async fn reconnects_after_drop() {
        let (listener, url) = listen().await;
        let channel = NotificationChannel::new(config(url), Arc::new(CredentialStore::in_memory()));
        let mut rx = collect_messages(&channel);
        let connects = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let connects = connects.clone();
            channel.on_connect(move || {
                connects.fetch_add(1, Ordering::SeqCst);
            });
            let closes = closes.clone();
            channel.on_close(move || {
                closes.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::spawn(async move {
            // First session: handshake, then drop the socket.
            let mut ws = accept(&listener).await;
            handshake(&mut ws, "0,0").await;
            let _ = ws.close(None).await;
            drop(ws);

            // Second session delivers.
            let mut ws = accept(&listener).await;
            handshake(&mut ws, "0,0").await;
            send_raw(&mut ws, &message_frame("/user/queue/orders", r#"{"id":8}"#)).await;
            // Keep the socket open until the client leaves.
            while let Some(Ok(_)) = ws.next().await {}
        });

        channel.connect();
        let (_, item) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(item.id, 8);
        assert_eq!(connects.load(Ordering::SeqCst), 2);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        channel.disconnect().await;
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bad_payload_reports_error_and_keeps_session() {
        let (listener, url) = listen().await;
        let channel = NotificationChannel::new(config(url), Arc::new(CredentialStore::in_memory()));
        let mut rx = collect_messages(&channel);
        let (err_tx, mut err_rx) = mpsc::unbounded_channel();
        channel.on_error(move |e| {
            let _ = err_tx.send(e.to_string());
        });

        tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            handshake(&mut ws, "0,0").await;
            send_raw(&mut ws, &message_frame("/topic/admin/orders", "not json")).await;
            send_raw(&mut ws, &message_frame("/topic/admin/orders", r#"{"id":2}"#)).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        channel.connect();
        let err = timeout(WAIT, err_rx.recv()).await.unwrap().unwrap();
        assert!(err.starts_with("malformed notification"), "got: {}", err);
        let (_, item) = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(item.id, 2);

        channel.disconnect().await;
    }

    #[tokio::test]
    async fn silent_server_trips_heartbeat_watchdog() {
        let (listener, url) = listen().await;
        let mut cfg = config(url);
        cfg.heart_beat = HeartBeat::new(0, 50);
        cfg.reconnect_delay = Duration::from_secs(60);
        let channel = NotificationChannel::new(cfg, Arc::new(CredentialStore::in_memory()));
        let (err_tx, mut err_rx) = mpsc::unbounded_channel();
        channel.on_error(move |e| {
            let _ = err_tx.send(matches!(e, ChannelError::HeartBeatTimeout(_)));
        });

        tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            handshake(&mut ws, "50,0").await;
            // Say nothing more.
            while let Some(Ok(_)) = ws.next().await {}
        });

        channel.connect();
        assert!(timeout(WAIT, err_rx.recv()).await.unwrap().unwrap());
        channel.disconnect().await;
    }

    #[tokio::test]
    async fn client_sends_heartbeats() {
        let (listener, url) = listen().await;
        let mut cfg = config(url);
        cfg.heart_beat = HeartBeat::new(30, 0);
        let channel = NotificationChannel::new(cfg, Arc::new(CredentialStore::in_memory()));

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            handshake(&mut ws, "0,30").await;
            let mut beats = 0;
            while beats < 2 {
                if let Some(Ok(Message::Text(t))) = ws.next().await {
                    if t == "\n" {
                        beats += 1;
                    }
                }
            }
            beats
        });

        channel.connect();
        assert_eq!(timeout(WAIT, server).await.unwrap().unwrap(), 2);
        channel.disconnect().await;
    }

    #[test]
    fn ping_deadline_disabled_without_outgoing() {
        assert_eq!(ping_deadline(HeartBeat::new(0, 30)), None);
        assert!(ping_deadline(HeartBeat::new(30, 0)).is_some());
    }

    #[tokio::test]
    async fn no_heartbeats_when_negotiated_off() {
        let (listener, url) = listen().await;
        let channel = NotificationChannel::new(config(url), Arc::new(CredentialStore::in_memory()));
        let mut rx = collect_messages(&channel);
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
        let (go_tx, go_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            handshake(&mut ws, "0,0").await;
            let _ = ready_tx.send(());
            let _ = go_rx.await;
            send_raw(&mut ws, &message_frame("/user/queue/orders", r#"{"id":3}"#)).await;
            let mut beats = 0;
            while let Some(Ok(msg)) = ws.next().await {
                match msg {
                    Message::Text(t) if t == "\n" => beats += 1,
                    Message::Text(t) if t.starts_with("DISCONNECT") => break,
                    _ => {}
                }
            }
            beats
        });

        channel.connect();
        timeout(WAIT, ready_rx).await.unwrap().unwrap();

        // A full day passes on an idle session.
        tokio::time::pause();
        tokio::time::advance(Duration::from_secs(25 * 60 * 60)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        go_tx.send(()).unwrap();

        let (_, item) = rx.recv().await.unwrap();
        assert_eq!(item.id, 3);
        channel.disconnect().await;
        assert_eq!(server.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn error_frame_ends_session() {
        let (listener, url) = listen().await;
        let mut cfg = config(url);
        cfg.reconnect_delay = Duration::from_secs(60);
        let channel = NotificationChannel::new(cfg, Arc::new(CredentialStore::in_memory()));
        let (err_tx, mut err_rx) = mpsc::unbounded_channel();
        channel.on_error(move |e| {
            let _ = err_tx.send(e.to_string());
        });

        tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            let _connect = read_frame(&mut ws).await;
            send_raw(&mut ws, "ERROR\nmessage:Access denied\n\n\0").await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        channel.connect();
        let err = timeout(WAIT, err_rx.recv()).await.unwrap().unwrap();
        assert_eq!(err, "server error: Access denied");
        channel.disconnect().await;
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let channel = NotificationChannel::new(
            config("ws://127.0.0.1:1/ws".into()),
            Arc::new(CredentialStore::in_memory()),
        );
        channel.disconnect().await;
        channel.disconnect().await;
        assert!(!channel.is_running());
    }

    #[test]
    fn config_from_service() {
        let service = ServiceConfig::for_server("https://shop.example.com:8443");
        let cfg = ChannelConfig::from_service(&service, vec!["/topic/admin/orders".into()]).unwrap();
        assert_eq!(cfg.url, "wss://shop.example.com:8443/ws");
        assert_eq!(cfg.host, "shop.example.com");
        assert_eq!(cfg.reconnect_delay, Duration::from_secs(5));
        assert_eq!(cfg.heart_beat, HeartBeat::new(4000, 4000));
    }
}
