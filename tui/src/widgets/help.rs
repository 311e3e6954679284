//! Help bar: key hints on the left, theme and volume meter on the right.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::controls::PlayState;
use crate::theme::{Theme, SELECTION_FG};

const METER: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub struct HelpBar<'a> {
    theme: &'a Theme,
    state: PlayState,
    shuffle: bool,
    repeat: bool,
    volume: u8,
}

impl<'a> HelpBar<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            state: PlayState::Stopped,
            shuffle: false,
            repeat: false,
            volume: 0,
        }
    }

    pub fn state(mut self, state: PlayState) -> Self {
        self.state = state;
        self
    }

    pub fn modes(mut self, shuffle: bool, repeat: bool) -> Self {
        self.shuffle = shuffle;
        self.repeat = repeat;
        self
    }

    pub fn volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }

    /// `[A/B]`
    fn keys(&self, keys: &[&str]) -> Vec<Span<'static>> {
        let t = self.theme;
        let bracket = Style::default().fg(t.help_bracket);
        let mut spans = vec![Span::styled("[", bracket)];
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("/", bracket));
            }
            spans.push(Span::styled((*key).to_string(), Style::default().fg(t.help_key)));
        }
        spans.push(Span::styled("]", bracket));
        spans
    }

    /// `[KEY] LABEL`, with `+` appended when the mode is on
    fn hint(&self, keys: &[&str], label: &str, on: bool) -> Vec<Span<'static>> {
        let mut spans = self.keys(keys);
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            label.to_string(),
            Style::default().fg(self.theme.help_label),
        ));
        if on {
            spans.push(Span::styled("+", Style::default().fg(SELECTION_FG)));
        }
        spans
    }

    fn left(&self) -> Line<'static> {
        let pause = if self.state == PlayState::Paused {
            "RESUME"
        } else {
            "PAUSE"
        };
        let hints = [
            self.hint(&["TAB"], "SWITCH", false),
            self.hint(&["ENTER"], "PLAY", false),
            self.hint(&["SPACE"], pause, false),
            self.hint(&["←", "→"], "SEEK", false),
            self.hint(&["S"], "SHUFFLE", self.shuffle),
            self.hint(&["R"], "REPEAT", self.repeat),
        ];
        let mut spans = vec![Span::raw(" ")];
        for (i, hint) in hints.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.extend(hint);
        }
        Line::from(spans)
    }

    fn right(&self) -> Line<'static> {
        let t = self.theme;
        let mut spans = self.hint(&["T"], "THEME", false);
        spans.push(Span::raw(" "));
        spans.extend(self.keys(&["-", "+"]));
        spans.push(Span::raw(" "));
        let lit = usize::from(self.volume) * METER.len() / 10;
        for (i, bar) in METER.iter().enumerate() {
            let color = if i < lit { t.text } else { t.unplayed };
            spans.push(Span::styled(bar.to_string(), Style::default().fg(color)));
        }
        spans.push(Span::raw(" "));
        Line::from(spans)
    }
}

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let left = self.left();
        let right = self.right();
        buf.set_line(area.x, area.y, &left, area.width);
        let right_w = right.width() as u16;
        let min_x = area.x + (left.width() as u16 + 1).min(area.width);
        let x = area.right().saturating_sub(right_w).max(min_x);
        buf.set_line(x, area.y, &right, area.right().saturating_sub(x));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;
    use pretty_assertions::assert_eq;

    fn render(bar: HelpBar<'_>, width: u16) -> Buffer {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buf
    }

    fn text(buf: &Buffer) -> String {
        (0..buf.area.width).map(|x| buf[(x, 0)].symbol()).collect()
    }

    #[test]
    fn test_hints_and_meter_layout() {
        let registry = ThemeRegistry::new();
        let buf = render(HelpBar::new(registry.current()).volume(10), 140);
        let line = text(&buf);
        assert!(line.starts_with(
            " [TAB] SWITCH  [ENTER] PLAY  [SPACE] PAUSE  [←/→] SEEK  [S] SHUFFLE  [R] REPEAT"
        ));
        assert!(line.ends_with("[T] THEME [-/+] ▁▂▃▄▅▆▇█ "));
    }

    #[test]
    fn test_mode_markers_and_resume_label() {
        let registry = ThemeRegistry::new();
        let bar = HelpBar::new(registry.current())
            .state(PlayState::Paused)
            .modes(true, false);
        let line = text(&render(bar, 140));
        assert!(line.contains("[SPACE] RESUME"));
        assert!(line.contains("SHUFFLE+"));
        assert!(!line.contains("REPEAT+"));
    }

    #[test]
    fn test_meter_lit_by_volume() {
        let registry = ThemeRegistry::new();
        let theme = registry.current();
        let buf = render(HelpBar::new(theme).volume(5), 140);
        // Meter occupies the 8 cells before the trailing space.
        let start = 140 - 9;
        let lit: Vec<bool> = (start..start + 8)
            .map(|x| buf[(x, 0)].fg == theme.text)
            .collect();
        assert_eq!(lit, vec![true, true, true, true, false, false, false, false]);
    }
}
