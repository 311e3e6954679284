//! Transport Controls
//!
//! One line: the track title and `[position/duration]`, centered over a
//! timeline whose played part is shaded.

use std::time::Duration;

use dopogoto_core::format_duration;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Widget;

use super::{gradient_title, truncate, Panel};
use crate::theme::Theme;

/// Fixed panel height: two border rows and one content row
pub const CONTROLS_HEIGHT: u16 = 3;

/// Placeholder title when nothing has been picked yet
const IDLE_TITLE: &str = "Choose a Song";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Stopped,
    Buffering,
    Playing,
    Paused,
}

/// What the controls panel shows
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub state: PlayState,
    pub title: String,
    pub position: Duration,
    pub duration: Duration,
    /// Display volume, 0-10
    pub volume: u8,
    /// Color of the playing album, for the played part of the timeline
    pub album_color: Option<Color>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            state: PlayState::Stopped,
            title: String::new(),
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 7,
            album_color: None,
        }
    }
}

impl Controls {
    /// Columns of `width` that count as played.
    pub fn filled(&self, width: usize) -> usize {
        if self.duration.is_zero() {
            return 0;
        }
        let ratio = self.position.as_secs_f64() / self.duration.as_secs_f64();
        ((width as f64 * ratio) as usize).min(width)
    }

    pub fn timer(&self) -> String {
        format!(
            "[{}/{}]",
            format_duration(self.position),
            format_duration(self.duration)
        )
    }
}

pub struct ControlsView<'a> {
    controls: &'a Controls,
    theme: &'a Theme,
}

impl<'a> ControlsView<'a> {
    pub fn new(controls: &'a Controls, theme: &'a Theme) -> Self {
        Self { controls, theme }
    }
}

impl Widget for ControlsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let title = Line::from(gradient_title("Now Playing", theme.title));
        let inner = Panel::new(title, theme.inactive).draw(area, buf);
        if inner.width < 3 || inner.height == 0 {
            return;
        }
        // One column of padding on each side.
        let x0 = inner.x + 1;
        let width = (inner.width - 2) as usize;

        let timer = self.controls.timer();
        let timer_len = timer.chars().count();
        let name = if self.controls.title.is_empty() {
            IDLE_TITLE
        } else {
            &self.controls.title
        };
        let name = truncate(name, width.saturating_sub(timer_len + 1).max(5));
        let name_len = name.chars().count();
        let display: Vec<char> = format!("{name} {timer}").chars().collect();
        let start = width.saturating_sub(display.len()) / 2;
        let filled = self.controls.filled(width);

        let played_fg = self.controls.album_color.unwrap_or(theme.played_default);
        for i in 0..width {
            let played = i < filled;
            let mut style = Style::default();
            if played {
                style = style.bg(theme.played_bg);
            }
            let glyph = match i.checked_sub(start).and_then(|j| display.get(j).map(|&c| (j, c))) {
                Some((j, c)) => {
                    let fg = if j > name_len {
                        theme.text_dim
                    } else if played {
                        played_fg
                    } else {
                        theme.text
                    };
                    style = style.fg(fg);
                    c
                }
                None => ' ',
            };
            let x = x0 + i as u16;
            if x >= inner.right() {
                break;
            }
            buf[(x, inner.y)].set_char(glyph).set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;
    use pretty_assertions::assert_eq;

    fn content(buf: &Buffer) -> String {
        (2..buf.area.width - 2).map(|x| buf[(x, 1)].symbol()).collect()
    }

    #[test]
    fn test_idle_shows_placeholder() {
        let registry = ThemeRegistry::new();
        let controls = Controls::default();
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        ControlsView::new(&controls, registry.current()).render(area, &mut buf);
        assert_eq!(content(&buf).trim(), "Choose a Song [0:00/0:00]");
    }

    #[test]
    fn test_played_portion_shaded() {
        let registry = ThemeRegistry::new();
        let theme = registry.current();
        let controls = Controls {
            state: PlayState::Playing,
            title: "Song".into(),
            position: Duration::from_secs(30),
            duration: Duration::from_secs(60),
            ..Controls::default()
        };
        let area = Rect::new(0, 0, 24, 3);
        let mut buf = Buffer::empty(area);
        ControlsView::new(&controls, theme).render(area, &mut buf);

        // 20 content columns, half of them played.
        assert_eq!(controls.filled(20), 10);
        assert_eq!(buf[(2, 1)].bg, theme.played_bg);
        assert_eq!(buf[(11, 1)].bg, theme.played_bg);
        assert_ne!(buf[(12, 1)].bg, theme.played_bg);
        assert_eq!(content(&buf), "  Song [0:30/1:00]  ");
    }

    #[test]
    fn test_filled_clamped() {
        let controls = Controls {
            position: Duration::from_secs(90),
            duration: Duration::from_secs(60),
            ..Controls::default()
        };
        assert_eq!(controls.filled(50), 50);
        assert_eq!(Controls::default().filled(50), 0);
    }
}
