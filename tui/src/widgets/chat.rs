//! Chat Panel
//!
//! Message history above a one-line input. Remote names and texts are
//! sanitized before they reach the screen; long texts wrap under their
//! name with a hanging indent.

use std::borrow::Cow;

use dopogoto_core::{sanitize, Message};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::{gradient_title, Panel};
use crate::theme::Theme;

/// Longest input the panel accepts
pub const MAX_INPUT_CHARS: usize = 280;

/// Remote names are clipped so the text keeps room on narrow panels
const MAX_NAME_CHARS: usize = 16;

/// Shown instead of the reserved system names
const SYSTEM_FACE: &str = "(◕‿◕)";

const PLACEHOLDER: &str = "> type a message...";

/// Message names with special rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Normal,
    /// `[system]`: dimmed notices
    System,
    /// `[update]`: release notice in the selection color
    Update,
    /// Placeholder text for an empty or offline chat
    Notice,
}

/// One screen row of the message area
#[derive(Clone, Debug, PartialEq, Eq)]
struct Row {
    kind: Kind,
    /// Set on the first row of a message
    name: Option<String>,
    /// Hanging indent for continuation rows
    indent: usize,
    text: String,
}

/// History, input line and scroll position of the chat panel
#[derive(Debug)]
pub struct ChatPanel {
    messages: Vec<Message>,
    local: Vec<Message>,
    input: String,
    offline: bool,
    /// Rows scrolled up from the newest message
    scroll: usize,
    /// Message area size
    width: usize,
    rows: usize,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            local: Vec::new(),
            input: String::new(),
            offline: false,
            scroll: 0,
            width: 6,
            rows: 1,
        }
    }
}

impl ChatPanel {
    /// Replace the history with a fresh snapshot and jump to the newest.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.scroll = 0;
    }

    /// Show a message that is never sent; it stays below the history.
    pub fn add_local(&mut self, name: &str, text: &str) {
        self.local.push(Message::local(name, text));
    }

    pub fn local_messages(&self) -> &[Message] {
        &self.local
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Size of the whole panel, borders included.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = usize::from(width).saturating_sub(4).max(6);
        self.rows = usize::from(height).saturating_sub(4).max(1);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn insert_char(&mut self, c: char) {
        if self.input.chars().count() < MAX_INPUT_CHARS {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Take the input, leaving it empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_up(&mut self) {
        self.scroll = (self.scroll + 1).min(self.max_scroll());
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Oldest message
    pub fn scroll_top(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Newest message
    pub fn scroll_bottom(&mut self) {
        self.scroll = 0;
    }

    fn max_scroll(&self) -> usize {
        self.wrap().len().saturating_sub(self.rows)
    }

    /// Lay the messages out into rows of at most `width` columns.
    fn wrap(&self) -> Vec<Row> {
        if self.offline {
            return vec![
                notice("CHAT OFFLINE"),
                notice("No internet connection"),
            ];
        }
        if self.messages.is_empty() && self.local.is_empty() {
            return vec![notice("No messages yet")];
        }

        let mut rows = Vec::new();
        for message in self.messages.iter().chain(&self.local) {
            let name = sanitize(&message.name);
            let (kind, name) = match name.as_str() {
                "[system]" => (Kind::System, SYSTEM_FACE.to_string()),
                "[update]" => (Kind::Update, SYSTEM_FACE.to_string()),
                _ => (Kind::Normal, name.chars().take(MAX_NAME_CHARS).collect()),
            };
            let prefix = name.chars().count() + if kind == Kind::Normal { 2 } else { 1 };
            let available = self.width.saturating_sub(prefix).clamp(1, self.width);

            let text = sanitize(&message.text);
            let mut lines = textwrap::wrap(&text, available).into_iter();
            let first = lines.next().map(Cow::into_owned).unwrap_or_default();
            rows.push(Row {
                kind,
                name: Some(name),
                indent: 0,
                text: first,
            });
            rows.extend(lines.map(|line| Row {
                kind,
                name: None,
                indent: prefix,
                text: line.into_owned(),
            }));
        }
        rows
    }
}

fn notice(text: &str) -> Row {
    Row {
        kind: Kind::Notice,
        name: None,
        indent: 0,
        text: text.to_string(),
    }
}

impl Row {
    fn to_line(&self, theme: &Theme) -> Line<'static> {
        let (name_color, text_color): (Color, Color) = match self.kind {
            Kind::Normal => (theme.chat_name, theme.text),
            Kind::Notice => (theme.chat_offline, theme.chat_offline),
            Kind::System => (theme.text_dim, theme.text_dim),
            Kind::Update => (theme.selection_bg, theme.selection_bg),
        };
        let mut spans = Vec::with_capacity(3);
        match &self.name {
            Some(name) if self.kind == Kind::Normal => {
                spans.push(Span::styled(format!("{name}:"), Style::default().fg(name_color)));
                spans.push(Span::raw(" "));
            }
            Some(name) => {
                spans.push(Span::styled(format!("{name} "), Style::default().fg(name_color)));
            }
            None => spans.push(Span::raw(" ".repeat(self.indent))),
        }
        spans.push(Span::styled(self.text.clone(), Style::default().fg(text_color)));
        Line::from(spans)
    }
}

/// Chat panel widget
pub struct ChatView<'a> {
    panel: &'a ChatPanel,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ChatView<'a> {
    pub fn new(panel: &'a ChatPanel, theme: &'a Theme) -> Self {
        Self {
            panel,
            focused: false,
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn input_line(&self, width: usize) -> Line<'static> {
        let theme = self.theme;
        if !self.focused {
            let placeholder: String = PLACEHOLDER.chars().take(width).collect();
            return Line::styled(placeholder, Style::default().fg(theme.text_dim));
        }
        let chars: Vec<char> = self.panel.input.chars().collect();
        let shown = width.saturating_sub(1);
        let tail: String = chars[chars.len().saturating_sub(shown)..].iter().collect();
        Line::from(vec![
            Span::styled(tail, Style::default().fg(theme.text)),
            Span::styled("█", Style::default().fg(theme.chat_input)),
        ])
    }
}

impl Widget for ChatView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let title = if self.panel.offline { "Chat Offline" } else { "Chat" };
        let panel = Panel::new(Line::from(gradient_title(title, theme.title)), theme.borders(self.focused));
        let inner = panel.draw(area, buf);
        if inner.height < 3 || inner.width < 3 {
            return;
        }
        let x = inner.x + 1;
        let width = inner.width - 2;
        let rows = usize::from(inner.height - 2);

        let lines = self.panel.wrap();
        let start = lines.len().saturating_sub(rows + self.panel.scroll);
        for (i, row) in lines.iter().skip(start).take(rows).enumerate() {
            let line = row.to_line(theme);
            buf.set_line(x, inner.y + i as u16, &line, width);
        }

        panel.divider(area, inner.height - 2, buf);
        let input = self.input_line(usize::from(width));
        buf.set_line(x, inner.bottom() - 1, &input, width);
    }
}
