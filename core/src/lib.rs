//! Dopogoto Core - Headless engine for the dopogoto terminal player
//!
//! Everything that does not touch the terminal: the ASCII video codec and
//! its renderer, the looping backdrop, MP3 streaming, the realtime chat
//! client, the track catalog and small bits of persisted configuration.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     dopogoto (tui crate)                      │
//! │            single event loop: input, ticks, render            │
//! └──────┬───────────────────┬────────────────────┬───────────────┘
//!        │ tick / render     │ PlayerEvent        │ ChatEvent
//! ┌──────┴──────┐   ┌────────┴────────┐   ┌───────┴────────┐
//! │  Backdrop   │   │     Player      │   │   ChatClient   │
//! │ Decoder +   │   │ download/decode │   │ REST history + │
//! │ Renderer    │   │ task, poller    │   │ realtime task  │
//! └─────────────┘   └─────────────────┘   └────────────────┘
//! ```
//!
//! Background components never call into the UI. They post typed events on
//! their own channel and the event loop drains them.
//!
//! # Module Overview
//!
//! - [`color`]: RGB / HSL / xterm-256 conversions
//! - [`video`]: container decoding, frame buffer, ANSI rendering, clip loading
//! - [`playback`]: the shuffled, self-looping video backdrop
//! - [`player`]: HTTP MP3 streaming into the audio output
//! - [`chat`]: chat history, realtime channel and message sending
//! - [`catalog`]: the built-in album catalog
//! - [`config`]: environment settings and the nickname file
//! - [`update`]: latest-release lookup
//!
//! # No TUI Dependencies
//!
//! This crate does not depend on ratatui or crossterm.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod catalog;
pub mod chat;
pub mod color;
pub mod config;
pub mod playback;
pub mod player;
pub mod update;
pub mod video;

// Re-exports for convenience
pub use catalog::{format_duration, Album, Catalog, CatalogError, Track};
pub use chat::{sanitize, ChatClient, ChatConfig, ChatError, ChatEvent, Message};
pub use config::{generate_anon_name, AppConfig, ConfigError, NicknameStore};
pub use playback::{Backdrop, PlaybackError};
pub use player::{AudioOutput, Player, PlayerConfig, PlayerError, PlayerEvent};
pub use update::{UpdateChecker, UpdateError};
pub use video::{Clip, ColorRun, DecodeError, Decoder, RenderMode};
