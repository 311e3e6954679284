//! Panels
//!
//! Each panel is a short-lived widget borrowing app state and the current
//! theme for one frame. State that outlives a frame (cursors, chat input,
//! transport display) lives in the plain structs exported here.

mod albums;
mod chat;
mod controls;
mod help;
mod list;
mod panel;
mod too_small;
mod tracks;
mod video;

pub use albums::AlbumList;
pub use chat::{ChatPanel, ChatView, MAX_INPUT_CHARS};
pub use controls::{Controls, ControlsView, PlayState, CONTROLS_HEIGHT};
pub use help::HelpBar;
pub use list::ListCursor;
pub use panel::{gradient_title, Panel, FADE_CELLS};
pub use too_small::TooSmall;
pub use tracks::TrackList;
pub use video::VideoPanel;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten `text` to at most `max_width` columns, ending in `...` when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let (room, ellipsis) = if max_width > 3 {
        (max_width - 3, "...")
    } else {
        (max_width, "")
    };
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > room {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}
