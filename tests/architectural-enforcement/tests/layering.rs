//! Integration Test: Layering
//!
//! The terminal front end drives the backdrop, the player and the chat
//! client through their public handles only. Frame decoding, color
//! rendering, audio decoding and the realtime socket stay inside the core
//! crate, and the core crate knows nothing about the terminal.

use architectural_enforcement::{assert_none, find, production_lines};

#[test]
fn test_tui_does_not_touch_codec_or_renderer() {
    let lines = production_lines("tui/src");
    assert_none(
        "tui reaches into video internals",
        &find(&lines, &["Decoder", "Renderer", "video::decoder", "video::renderer"]),
    );
}

#[test]
fn test_tui_does_not_touch_audio_or_socket_internals() {
    let lines = production_lines("tui/src");
    assert_none(
        "tui reaches into audio or network internals",
        &find(&lines, &["rodio", "symphonia", "tungstenite", "reqwest"]),
    );
}

#[test]
fn test_core_has_no_terminal_dependencies() {
    let lines = production_lines("core/src");
    assert_none(
        "core depends on the terminal",
        &find(&lines, &["ratatui", "crossterm"]),
    );
}
