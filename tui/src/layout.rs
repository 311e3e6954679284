//! Screen Layout
//!
//! ```text
//! ┌──────────────┬──────────┐
//! │ video        │ albums   │
//! ├──────────────┤          │
//! │ chat         ├──────────┤
//! │              │ songs    │
//! ├──────────────┴──────────┤
//! │ controls                │
//! ├─────────────────────────┤
//! │ help bar                │
//! └─────────────────────────┘
//! ```
//!
//! The video column is as wide as the current clip plus its frame; the
//! right column takes the rest.

use ratatui::layout::Rect;

use crate::widgets::CONTROLS_HEIGHT;

/// Smallest terminal the full layout is drawn in
pub const MIN_WIDTH: u16 = 120;
pub const MIN_HEIGHT: u16 = 40;

const ALBUMS_HEIGHT: u16 = 17;
const HELP_HEIGHT: u16 = 1;

/// Panel areas for one terminal size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    pub video: Rect,
    pub chat: Rect,
    pub albums: Rect,
    pub tracks: Rect,
    pub controls: Rect,
    pub help: Rect,
}

impl Screen {
    /// Lay out `area` around a clip of `video` columns by rows.
    ///
    /// `None` when the terminal is below the minimum size.
    pub fn compute(area: Rect, video: (u16, u16)) -> Option<Self> {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            return None;
        }
        let body_h = area.height - CONTROLS_HEIGHT - HELP_HEIGHT;

        let video_w = video.0.saturating_add(2).min(area.width);
        let right_w = area.width - video_w;
        let video_h = video.1.saturating_add(2).min(body_h);
        let albums_h = ALBUMS_HEIGHT.min(body_h);

        let (x, y) = (area.x, area.y);
        Some(Self {
            video: Rect::new(x, y, video_w, video_h),
            chat: Rect::new(x, y + video_h, video_w, body_h - video_h),
            albums: Rect::new(x + video_w, y, right_w, albums_h),
            tracks: Rect::new(x + video_w, y + albums_h, right_w, body_h - albums_h),
            controls: Rect::new(x, y + body_h, area.width, CONTROLS_HEIGHT),
            help: Rect::new(x, y + body_h + CONTROLS_HEIGHT, area.width, HELP_HEIGHT),
        })
    }

    /// Rows inside a bordered list panel.
    pub fn list_rows(area: Rect) -> usize {
        usize::from(area.height.saturating_sub(2)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_below_minimum_is_none() {
        assert_eq!(Screen::compute(Rect::new(0, 0, 119, 50), (64, 18)), None);
        assert_eq!(Screen::compute(Rect::new(0, 0, 200, 39), (64, 18)), None);
    }

    #[test]
    fn test_minimum_size_layout() {
        let screen = Screen::compute(Rect::new(0, 0, 120, 40), (64, 18)).unwrap();
        assert_eq!(screen.video, Rect::new(0, 0, 66, 20));
        assert_eq!(screen.chat, Rect::new(0, 20, 66, 16));
        assert_eq!(screen.albums, Rect::new(66, 0, 54, 17));
        assert_eq!(screen.tracks, Rect::new(66, 17, 54, 19));
        assert_eq!(screen.controls, Rect::new(0, 36, 120, 3));
        assert_eq!(screen.help, Rect::new(0, 39, 120, 1));
    }

    #[test]
    fn test_oversized_clip_is_clamped() {
        let screen = Screen::compute(Rect::new(0, 0, 120, 40), (300, 100)).unwrap();
        assert_eq!(screen.video, Rect::new(0, 0, 120, 36));
        assert_eq!(screen.chat.height, 0);
        assert_eq!(screen.albums.width, 0);
    }

    #[test]
    fn test_list_rows() {
        assert_eq!(Screen::list_rows(Rect::new(0, 0, 10, 17)), 15);
        assert_eq!(Screen::list_rows(Rect::new(0, 0, 10, 1)), 1);
    }
}
