//! Chat Client
//!
//! Connects the player to a shared chat room hosted on a Supabase-style
//! backend:
//!
//! - History comes from one REST fetch of the newest messages, sorted
//!   ascending by id.
//! - New messages arrive over a realtime websocket channel. They are
//!   appended in arrival order, without re-sorting.
//! - Sending is a single REST POST.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──join──▶ Online ──error/close──▶ Offline ──backoff──▶ Connecting
//!      └──────────────────────── stop ────────────────────────────────▶ Stopped
//! ```
//!
//! The connection runs in one background task that owns the message log.
//! The UI only sees [`ChatEvent`]s carrying full snapshots of the log.

mod config;
mod message;
pub mod protocol;
mod rest;
mod sanitize;

pub use config::{realtime_url_for, ChatConfig};
pub use message::{Message, MessageLog};
pub use rest::RestClient;
pub use sanitize::sanitize;

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message as Frame};
use tracing::{debug, info, warn};

/// How long `stop` waits for the connection task to wind down
const STOP_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

// =============================================================================
// Events and Errors
// =============================================================================

/// Events emitted by the chat client
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    /// The full current message log, oldest first
    NewMessages(Vec<Message>),
    /// History or realtime connection unavailable
    Offline,
}

/// Chat failures
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport-level HTTP failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Websocket failure
    #[error("realtime connection failed: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server closed the realtime connection
    #[error("realtime connection closed by server")]
    Closed,
}

// =============================================================================
// Client
// =============================================================================

/// Handle to the chat connection.
pub struct ChatClient {
    config: Arc<ChatConfig>,
    rest: RestClient,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let config = Arc::new(config);
        let rest = RestClient::new(Arc::clone(&config))?;
        let (stop_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            rest,
            stop_tx,
            task: None,
        })
    }

    /// Load history and keep a realtime connection open until [`stop`].
    ///
    /// Must be called within a tokio runtime. Calling it twice is a no-op.
    ///
    /// [`stop`]: Self::stop
    pub fn start(&mut self, events: mpsc::Sender<ChatEvent>) {
        if self.task.is_some() {
            warn!("chat client already started");
            return;
        }
        self.stop_tx.send_replace(false);

        let connection = Connection {
            config: Arc::clone(&self.config),
            rest: self.rest.clone(),
            log: MessageLog::new(self.config.buffer_size),
            history_loaded: false,
            events,
        };
        let stop = self.stop_tx.subscribe();
        self.task = Some(tokio::spawn(connection.run(stop)));
    }

    /// Close the connection and end the reconnect loop.
    pub async fn stop(&mut self) {
        self.stop_tx.send_replace(true);
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(STOP_GRACE, &mut task).await.is_err() {
                warn!("chat task did not stop in time, aborting");
                task.abort();
            }
        }
    }

    /// Post a message in the background. Failures are logged, not retried.
    pub fn send_message(&self, name: String, text: String) -> JoinHandle<()> {
        let rest = self.rest.clone();
        tokio::spawn(async move {
            match rest.send(&name, &text).await {
                Ok(()) => debug!(name = %name, "chat message sent"),
                Err(e) => warn!(error = %e, "failed to send chat message"),
            }
        })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

// =============================================================================
// Connection Task
// =============================================================================

/// Resolves once a stop was requested or the client handle is gone.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stop| *stop).await;
}

struct Connection {
    config: Arc<ChatConfig>,
    rest: RestClient,
    log: MessageLog,
    history_loaded: bool,
    events: mpsc::Sender<ChatEvent>,
}

impl Connection {
    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let loaded = tokio::select! {
            () = stopped(&mut stop) => return,
            loaded = self.load_history() => loaded,
        };
        if !loaded {
            self.emit(ChatEvent::Offline).await;
        }

        loop {
            match self.session(&mut stop).await {
                Ok(()) => break,
                Err(e) => {
                    warn!(error = %e, "realtime connection lost");
                    self.emit(ChatEvent::Offline).await;
                }
            }

            tokio::select! {
                () = stopped(&mut stop) => break,
                () = tokio::time::sleep(self.config.reconnect_backoff) => {}
            }
        }
        debug!("chat connection task finished");
    }

    async fn emit(&self, event: ChatEvent) {
        // A closed receiver means the UI is gone; nothing left to notify.
        let _ = self.events.send(event).await;
    }

    async fn emit_snapshot(&self) {
        self.emit(ChatEvent::NewMessages(self.log.snapshot())).await;
    }

    /// Fetch history into the log. Returns false if the fetch failed.
    async fn load_history(&mut self) -> bool {
        match self.rest.fetch_recent(self.config.history_limit).await {
            Ok(history) => {
                info!(count = history.len(), "loaded chat history");
                self.log.replace(history);
                self.history_loaded = true;
                self.emit_snapshot().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to load chat history");
                false
            }
        }
    }

    /// One realtime connection. `Ok` means a stop was requested.
    async fn session(&mut self, stop: &mut watch::Receiver<bool>) -> Result<(), ChatError> {
        let connected = tokio::select! {
            () = stopped(stop) => return Ok(()),
            result = connect_async(self.config.realtime_url.as_str()) => result,
        };
        let (socket, _) = connected?;
        let (mut write, mut read) = socket.split();

        let topic = self.config.topic();
        let mut next_ref: u64 = 1;
        write
            .send(Frame::Text(
                protocol::join(&topic, &self.config.table, next_ref).to_json(),
            ))
            .await?;
        next_ref += 1;
        info!(topic = %topic, "joined chat channel");

        if !self.history_loaded {
            tokio::select! {
                () = stopped(stop) => {
                    let _ = write.send(Frame::Close(None)).await;
                    return Ok(());
                }
                _ = self.load_history() => {}
            }
        }
        self.emit_snapshot().await;

        let period = self.config.heartbeat_interval;
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = stopped(stop) => {
                    let _ = write.send(Frame::Close(None)).await;
                    return Ok(());
                }
                _ = heartbeat.tick() => {
                    write
                        .send(Frame::Text(protocol::heartbeat(next_ref).to_json()))
                        .await?;
                    next_ref += 1;
                }
                frame = read.next() => match frame {
                    Some(Ok(Frame::Text(text))) => self.on_text(&text, &topic).await,
                    Some(Ok(Frame::Close(_))) | None => return Err(ChatError::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
            }
        }
    }

    async fn on_text(&mut self, text: &str, topic: &str) {
        let Some(message) = protocol::parse_insert(text, topic) else {
            return;
        };
        debug!(id = message.id, "chat message received");
        self.log.push(message);
        self.emit_snapshot().await;
    }
}
