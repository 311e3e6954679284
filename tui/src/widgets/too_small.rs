//! "Terminal too small" screen: the built-in clip in color, the current
//! size and the size needed, centered.

use dopogoto_core::{Backdrop, RenderMode};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::video::draw_runs;
use crate::theme::{Theme, SELECTION_FG, WARNING_YELLOW};

pub struct TooSmall<'a> {
    backdrop: &'a mut Backdrop,
    theme: &'a Theme,
    required: (u16, u16),
}

impl<'a> TooSmall<'a> {
    pub fn new(backdrop: &'a mut Backdrop, theme: &'a Theme, required: (u16, u16)) -> Self {
        Self {
            backdrop,
            theme,
            required,
        }
    }
}

impl Widget for TooSmall<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self
            .backdrop
            .render_runs(self.backdrop.width(), self.backdrop.height(), RenderMode::Normal);
        let video_w = self.backdrop.width() as u16;

        let (need_w, need_h) = self.required;
        let text = vec![
            Line::default(),
            Line::default(),
            Line::styled(
                "Resize your terminal to continue",
                Style::default().fg(self.theme.active.corner),
            ),
            Line::default(),
            Line::from(vec![
                Span::styled(
                    format!("{}x{}", area.width, area.height),
                    Style::default().fg(WARNING_YELLOW),
                ),
                Span::styled(format!(" → {need_w}x{need_h}"), Style::default().fg(SELECTION_FG)),
            ]),
        ];

        let total = (rows.len() + text.len()) as u16;
        let top = area.y + area.height.saturating_sub(total) / 2;

        let video_x = area.x + area.width.saturating_sub(video_w) / 2;
        let video_h = (rows.len() as u16).min(area.bottom().saturating_sub(top));
        let video_area = Rect::new(
            video_x,
            top,
            video_w.min(area.right().saturating_sub(video_x)),
            video_h,
        );
        draw_runs(&rows, video_area, buf);

        for (i, line) in text.iter().enumerate() {
            let y = top + rows.len() as u16 + i as u16;
            if y >= area.bottom() {
                break;
            }
            let w = line.width() as u16;
            let x = area.x + area.width.saturating_sub(w) / 2;
            buf.set_line(x, y, line, area.right().saturating_sub(x));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;
    use dopogoto_core::Clip;

    #[test]
    fn test_shows_current_and_required_size() {
        let mut backdrop = Backdrop::new(vec![Clip::builtin().unwrap()]).unwrap();
        let registry = ThemeRegistry::new();
        let area = Rect::new(0, 0, 100, 60);
        let mut buf = Buffer::empty(area);
        TooSmall::new(&mut backdrop, registry.current(), (120, 40)).render(area, &mut buf);

        let screen: Vec<String> = (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect())
            .collect();
        assert!(screen.iter().any(|l| l.trim() == "Resize your terminal to continue"));
        assert!(screen.iter().any(|l| l.trim() == "100x60 → 120x40"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut backdrop = Backdrop::new(vec![Clip::builtin().unwrap()]).unwrap();
        let registry = ThemeRegistry::new();
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        TooSmall::new(&mut backdrop, registry.current(), (120, 40)).render(area, &mut buf);
    }
}
