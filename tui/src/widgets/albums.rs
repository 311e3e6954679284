//! Album list panel

use dopogoto_core::Album;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Widget;

use super::{gradient_title, truncate, ListCursor, Panel};
use crate::theme::Theme;

pub struct AlbumList<'a> {
    albums: &'a [Album],
    list: &'a ListCursor,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> AlbumList<'a> {
    pub fn new(albums: &'a [Album], list: &'a ListCursor, theme: &'a Theme) -> Self {
        Self {
            albums,
            list,
            focused: false,
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for AlbumList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let title = Line::from(gradient_title("Albums", theme.title));
        let inner = Panel::new(title, theme.borders(self.focused)).draw(area, buf);
        let width = inner.width as usize;

        for (row, index) in self.list.visible_range().enumerate() {
            let Some(album) = self.albums.get(index) else {
                break;
            };
            if row >= inner.height as usize {
                break;
            }
            let y = inner.y + row as u16;
            let title = truncate(&album.title, width.saturating_sub(3));
            if index == self.list.cursor() {
                let style = Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg);
                buf.set_string(inner.x, y, " ".repeat(width), style);
                buf.set_string(inner.x + 2, y, title, style);
            } else {
                buf.set_string(inner.x + 2, y, title, Style::default().fg(theme.text));
            }
        }
    }
}
