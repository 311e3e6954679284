//! Panel Frame
//!
//! Rounded border with a centered gradient title. The two border cells next
//! to each corner are drawn in the fade color.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme::BorderColors;

/// How many border cells near a corner use the fade color
pub const FADE_CELLS: u16 = 2;

/// A bordered frame; call [`Panel::draw`] and fill the returned inner area.
pub struct Panel<'a> {
    title: Line<'a>,
    colors: BorderColors,
}

impl<'a> Panel<'a> {
    pub fn new(title: impl Into<Line<'a>>, colors: BorderColors) -> Self {
        Self {
            title: title.into(),
            colors,
        }
    }

    /// Draw the frame and return the area inside it.
    pub fn draw(&self, area: Rect, buf: &mut Buffer) -> Rect {
        if area.width < 2 || area.height < 2 {
            return Rect::new(area.x, area.y, 0, 0);
        }
        let inner_w = area.width - 2;
        let inner_h = area.height - 2;
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;
        let corner = Style::default().fg(self.colors.corner);

        // ╭── title ──╮
        buf.set_string(area.x, area.y, "╭", corner);
        let title_w = match self.title.width() {
            0 => 0,
            w => (w as u16 + 2).min(inner_w),
        };
        let remaining = inner_w - title_w;
        let left_pad = remaining / 2;
        let mut x = area.x + 1;
        x = self.dashes(buf, x, area.y, left_pad, '─');
        if title_w > 0 {
            let border = Style::default().fg(self.colors.border);
            buf.set_string(x, area.y, " ", border);
            buf.set_line(x + 1, area.y, &self.title, title_w.saturating_sub(2));
            buf.set_string(x + title_w - 1, area.y, " ", border);
            x += title_w;
        }
        self.dashes(buf, x, area.y, remaining - left_pad, '─');
        buf.set_string(right, area.y, "╮", corner);

        for row in 0..inner_h {
            let style = Style::default().fg(self.side_color(row, inner_h));
            buf.set_string(area.x, area.y + 1 + row, "│", style);
            buf.set_string(right, area.y + 1 + row, "│", style);
        }

        // ╰──────────╯
        buf.set_string(area.x, bottom, "╰", corner);
        self.dashes(buf, area.x + 1, bottom, inner_w, '─');
        buf.set_string(right, bottom, "╯", corner);

        Rect::new(area.x + 1, area.y + 1, inner_w, inner_h)
    }

    /// Horizontal divider `├────┤` across the frame at inner row `row`.
    pub fn divider(&self, area: Rect, row: u16, buf: &mut Buffer) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let inner_h = area.height - 2;
        if row >= inner_h {
            return;
        }
        let y = area.y + 1 + row;
        let style = Style::default().fg(self.side_color(row, inner_h));
        buf.set_string(area.x, y, "├", style);
        self.dashes(buf, area.x + 1, y, area.width - 2, '─');
        buf.set_string(area.right() - 1, y, "┤", style);
    }

    /// Side cells within `FADE_CELLS` of the top or bottom fade.
    fn side_color(&self, row: u16, rows: u16) -> ratatui::style::Color {
        if row < FADE_CELLS || row + FADE_CELLS >= rows {
            self.colors.fade
        } else {
            self.colors.border
        }
    }

    /// Draw `n` border glyphs starting at `x`, faded at both ends.
    fn dashes(&self, buf: &mut Buffer, x: u16, y: u16, n: u16, glyph: char) -> u16 {
        for i in 0..n {
            let faded = n <= FADE_CELLS * 2 || i < FADE_CELLS || i >= n - FADE_CELLS;
            let color = if faded {
                self.colors.fade
            } else {
                self.colors.border
            };
            buf[(x + i, y)].set_char(glyph).set_fg(color);
        }
        x + n
    }
}

/// Title with the standard gradient: first char, second char, the rest.
pub fn gradient_title(text: &str, colors: [ratatui::style::Color; 3]) -> Vec<Span<'static>> {
    let mut chars = text.chars();
    let mut spans = Vec::with_capacity(3);
    if let Some(c) = chars.next() {
        spans.push(Span::styled(c.to_string(), Style::default().fg(colors[0])));
    }
    if let Some(c) = chars.next() {
        spans.push(Span::styled(c.to_string(), Style::default().fg(colors[1])));
    }
    let rest: String = chars.collect();
    if !rest.is_empty() {
        spans.push(Span::styled(rest, Style::default().fg(colors[2])));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;

    fn colors() -> BorderColors {
        BorderColors {
            border: Color::Indexed(238),
            fade: Color::Indexed(243),
            corner: Color::Indexed(248),
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_frame_with_centered_title() {
        let area = Rect::new(0, 0, 14, 3);
        let mut buf = Buffer::empty(area);
        let panel = Panel::new("Chat", colors());
        let inner = panel.draw(area, &mut buf);

        assert_eq!(inner, Rect::new(1, 1, 12, 1));
        assert_eq!(row(&buf, 0), "╭─── Chat ───╮");
        assert_eq!(row(&buf, 1), "│            │");
        assert_eq!(row(&buf, 2), "╰────────────╯");
    }

    #[test]
    fn test_border_fades_near_corners() {
        let area = Rect::new(0, 0, 12, 8);
        let mut buf = Buffer::empty(area);
        Panel::new("", colors()).draw(area, &mut buf);

        let bottom = 7;
        assert_eq!(buf[(1, bottom)].fg, Color::Indexed(243));
        assert_eq!(buf[(2, bottom)].fg, Color::Indexed(243));
        assert_eq!(buf[(3, bottom)].fg, Color::Indexed(238));
        assert_eq!(buf[(10, bottom)].fg, Color::Indexed(243));
        assert_eq!(buf[(0, bottom)].fg, Color::Indexed(248));

        // Side rows: 6 inner rows, the middle two use the plain border.
        assert_eq!(buf[(0, 1)].fg, Color::Indexed(243));
        assert_eq!(buf[(0, 3)].fg, Color::Indexed(238));
        assert_eq!(buf[(0, 4)].fg, Color::Indexed(238));
        assert_eq!(buf[(0, 5)].fg, Color::Indexed(243));
    }

    #[test]
    fn test_divider_spans_frame() {
        let area = Rect::new(0, 0, 6, 5);
        let mut buf = Buffer::empty(area);
        let panel = Panel::new("", colors());
        panel.draw(area, &mut buf);
        panel.divider(area, 1, &mut buf);
        assert_eq!(row(&buf, 2), "├────┤");
    }

    #[test]
    fn test_tiny_area_draws_nothing() {
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        let inner = Panel::new("x", colors()).draw(area, &mut buf);
        assert_eq!(inner.area(), 0);
    }

    #[test]
    fn test_gradient_title_spans() {
        let colors = [Color::Indexed(1), Color::Indexed(2), Color::Indexed(3)];
        let spans = gradient_title("Songs", colors);
        let parts: Vec<_> = spans.iter().map(|s| (s.content.as_ref(), s.style.fg)).collect();
        assert_eq!(
            parts,
            vec![
                ("S", Some(Color::Indexed(1))),
                ("o", Some(Color::Indexed(2))),
                ("ngs", Some(Color::Indexed(3))),
            ]
        );
        assert_eq!(gradient_title("", colors).len(), 0);
    }
}
