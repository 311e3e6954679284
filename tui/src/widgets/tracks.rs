//! Track list panel
//!
//! The playing track swaps its number for a two-bar equalizer that the app
//! animates through `anim_tick`.

use dopogoto_core::Album;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::{gradient_title, truncate, ListCursor, Panel};
use crate::theme::{Theme, SELECTION_FG};

const SPIN_FRAMES: [char; 6] = ['▁', '▃', '▅', '▇', '▅', '▃'];

/// Equalizer glyphs for animation step `tick`.
pub fn spinner(tick: u64) -> [char; 2] {
    let n = SPIN_FRAMES.len() as u64;
    [
        SPIN_FRAMES[((tick * 7) % n) as usize],
        SPIN_FRAMES[((tick * 7 + 3) % n) as usize],
    ]
}

pub struct TrackList<'a> {
    album: Option<&'a Album>,
    list: &'a ListCursor,
    playing: Option<usize>,
    anim_tick: u64,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> TrackList<'a> {
    pub fn new(album: Option<&'a Album>, list: &'a ListCursor, theme: &'a Theme) -> Self {
        Self {
            album,
            list,
            playing: None,
            anim_tick: 0,
            focused: false,
            theme,
        }
    }

    pub fn playing(mut self, track: Option<usize>, anim_tick: u64) -> Self {
        self.playing = track;
        self.anim_tick = anim_tick;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TrackList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let title = Line::from(gradient_title("Songs", theme.title));
        let inner = Panel::new(title, theme.borders(self.focused)).draw(area, buf);
        let Some(album) = self.album else {
            return;
        };
        let width = inner.width as usize;

        for (row, index) in self.list.visible_range().enumerate() {
            let Some(track) = album.tracks.get(index) else {
                break;
            };
            if row >= inner.height as usize {
                break;
            }
            let y = inner.y + row as u16;
            let title = truncate(&track.title, width.saturating_sub(5));
            let playing = self.playing == Some(index);
            let selected = self.focused && index == self.list.cursor();

            let marker = if playing {
                spinner(self.anim_tick).iter().collect()
            } else {
                format!("{:02}", index + 1)
            };

            let line = if selected {
                let style = Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg);
                buf.set_string(inner.x, y, " ".repeat(width), style);
                Line::from(vec![
                    Span::styled("  ", style),
                    Span::styled(format!("{marker} "), style),
                    Span::styled(title, style),
                ])
            } else {
                let title_color = if playing { SELECTION_FG } else { theme.text };
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!("{marker} "), Style::default().fg(theme.text_dim)),
                    Span::styled(title, Style::default().fg(title_color)),
                ])
            };
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}
