//! App Events
//!
//! Everything the event loop reacts to, from every source, as one closed
//! enum. Component events are converted at the channel boundary so the
//! dispatcher matches exhaustively.

use std::time::Duration;

use crossterm::event::KeyEvent;
use dopogoto_core::{ChatEvent, Message, PlayerEvent};

#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    // === Player ===
    Buffering { title: String },
    TrackStarted { title: String, duration: Duration },
    Progress { position: Duration, length: Duration },
    TrackEnded,
    Error { message: String },

    // === Chat ===
    NewMessages(Vec<Message>),
    Offline,

    // === Terminal ===
    WindowResized { width: u16, height: u16 },
    KeyInput(KeyEvent),
    Tick,

    // === Internal ===
    UpdateAvailable { version: String },
    /// Skip after a failed track; stale when `generation` no longer matches.
    AutoSkip { generation: u64 },
}

impl From<PlayerEvent> for AppEvent {
    fn from(event: PlayerEvent) -> Self {
        match event {
            PlayerEvent::Buffering { title } => Self::Buffering { title },
            PlayerEvent::TrackStarted { title, duration } => Self::TrackStarted { title, duration },
            PlayerEvent::Progress { position, length } => Self::Progress { position, length },
            PlayerEvent::TrackEnded => Self::TrackEnded,
            PlayerEvent::Error { message } => Self::Error { message },
        }
    }
}

impl From<ChatEvent> for AppEvent {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::NewMessages(messages) => Self::NewMessages(messages),
            ChatEvent::Offline => Self::Offline,
        }
    }
}
