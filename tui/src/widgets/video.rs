//! Video panel: the backdrop's current frame inside a titled frame.

use dopogoto_core::{Backdrop, ColorRun};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::{gradient_title, Panel};
use crate::theme::Theme;

pub struct VideoPanel<'a> {
    backdrop: &'a mut Backdrop,
    theme: &'a Theme,
}

impl<'a> VideoPanel<'a> {
    pub fn new(backdrop: &'a mut Backdrop, theme: &'a Theme) -> Self {
        Self { backdrop, theme }
    }

    fn title(&self) -> Line<'static> {
        let colors = self.theme.title;
        let spans: Vec<Span<'static>> = ["You're listening to ", "Dopo ", "Goto"]
            .into_iter()
            .flat_map(|word| gradient_title(word, colors))
            .collect();
        Line::from(spans)
    }
}

impl Widget for VideoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = Panel::new(self.title(), self.theme.inactive).draw(area, buf);
        if inner.area() == 0 {
            return;
        }
        let rows = self.backdrop.render_runs(
            usize::from(inner.width),
            usize::from(inner.height),
            self.theme.video,
        );
        draw_runs(&rows, inner, buf);
    }
}

/// Paint rendered color runs into `area`, one row per line.
pub fn draw_runs(rows: &[Vec<ColorRun>], area: Rect, buf: &mut Buffer) {
    for (dy, runs) in rows.iter().enumerate().take(usize::from(area.height)) {
        let y = area.y + dy as u16;
        let mut x = area.x;
        for run in runs {
            if x >= area.right() {
                break;
            }
            let style = match run.color {
                Some(code) => Style::default().fg(Color::Indexed(code)),
                None => Style::default(),
            };
            let (next_x, _) = buf.set_stringn(x, y, &run.text, usize::from(area.right() - x), style);
            x = next_x;
        }
    }
}
