//! Scrolling list cursor shared by the album and track panels.

/// Cursor and scroll offset over a list of `len` items, `visible` rows tall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListCursor {
    cursor: usize,
    offset: usize,
    len: usize,
    visible: usize,
}

impl Default for ListCursor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ListCursor {
    pub fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            len,
            visible: 1,
        }
    }

    /// New contents: back to the top.
    pub fn reset(&mut self, len: usize) {
        *self = Self {
            visible: self.visible,
            ..Self::new(len)
        };
    }

    /// Panel height changed; keep the cursor on screen.
    pub fn set_visible(&mut self, rows: usize) {
        self.visible = rows.max(1);
        self.scroll_into_view();
    }

    pub fn up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.scroll_into_view();
        }
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.len {
            self.cursor += 1;
            self.scroll_into_view();
        }
    }

    pub fn top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn bottom(&mut self) {
        if self.len == 0 {
            return;
        }
        self.cursor = self.len - 1;
        self.offset = self.len.saturating_sub(self.visible);
    }

    /// Jump to `index` (clamped) and scroll it into view.
    pub fn select(&mut self, index: usize) {
        self.cursor = index.min(self.len.saturating_sub(1));
        self.scroll_into_view();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of the rows on screen.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        self.offset..(self.offset + self.visible).min(self.len)
    }

    fn scroll_into_view(&mut self) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.visible {
            self.offset = self.cursor + 1 - self.visible;
        }
    }
}
