//! Dopogoto TUI - Terminal front end for the dopogoto player
//!
//! One full-screen view: the ASCII video backdrop and chat on the left,
//! albums and songs on the right, transport controls and key hints along
//! the bottom.
//!
//! # Architecture
//!
//! - **App**: owns every component and runs the single event loop
//! - **Events**: the closed set of events the loop dispatches
//! - **Layout**: panel areas for a terminal size
//! - **Queue**: what plays next (sequential, shuffle, repeat)
//! - **Theme**: the color schemes cycled with `t`
//! - **Widgets**: the panels, drawn as ratatui widgets
//!
//! Decoding, audio and networking all live in `dopogoto_core`.

pub mod app;
pub mod events;
pub mod layout;
pub mod queue;
pub mod theme;
pub mod widgets;

pub use app::App;
