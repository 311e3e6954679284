//! Themes and Colors
//!
//! Every theme is a set of xterm-256 colors. The registry is owned by the
//! app and cycled with `t`; panels borrow the current theme while drawing.
//!
//! Borders fade: the two dashes nearest each corner use `fade`, the rest
//! use `border`, and corners get their own color. Focused panels swap in
//! the `active_*` trio.

use dopogoto_core::RenderMode;
use ratatui::style::Color;

// ============================================================================
// Fixed Colors
// ============================================================================

/// Default text on a selection background
pub const SELECTION_FG: Color = Color::Indexed(231);

/// Current size on the "too small" screen
pub const WARNING_YELLOW: Color = Color::Indexed(220);

/// Album colors shared by every theme, brightest first
const ALBUM_RAMP: [u8; 15] = [
    231, 255, 254, 253, 252, 251, 250, 249, 248, 247, 246, 245, 244, 243, 242,
];

// ============================================================================
// Theme
// ============================================================================

/// Colors for one border state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderColors {
    pub border: Color,
    pub fade: Color,
    pub corner: Color,
}

/// A complete UI color scheme
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,

    /// Screen background
    pub bg: Color,

    pub inactive: BorderColors,
    pub active: BorderColors,

    /// Title gradient, brightest first
    pub title: [Color; 3],

    pub selection_bg: Color,
    pub selection_fg: Color,

    /// Body text (album names, chat messages)
    pub text: Color,
    /// Dimmed body text (track numbers, timer)
    pub text_dim: Color,
    /// Accent for nicknames
    pub chat_name: Color,
    /// Chat input cursor
    pub chat_input: Color,
    pub chat_offline: Color,

    pub help_bracket: Color,
    pub help_key: Color,
    pub help_label: Color,

    /// Played part of the timeline when no album color applies
    pub played_default: Color,
    pub played_bg: Color,
    pub unplayed: Color,

    pub album_colors: Vec<Color>,

    /// How the backdrop video is drawn
    pub video: RenderMode,
}

impl Theme {
    pub fn borders(&self, focused: bool) -> BorderColors {
        if focused {
            self.active
        } else {
            self.inactive
        }
    }

    /// Color for the album at `index`, falling back to body text.
    pub fn album_color(&self, index: usize) -> Color {
        self.album_colors.get(index).copied().unwrap_or(self.text)
    }
}

/// The mono family shares borders, titles and album ramp; the builder
/// starts from plain "Mono" and each variant overrides its accents.
fn mono_base() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "Mono",
        bg: c(16),
        inactive: BorderColors {
            border: c(238),
            fade: c(243),
            corner: c(248),
        },
        active: BorderColors {
            border: c(250),
            fade: c(253),
            corner: c(231),
        },
        title: [c(231), c(253), c(250)],
        selection_bg: c(235),
        selection_fg: SELECTION_FG,
        text: c(250),
        text_dim: c(240),
        chat_name: c(231),
        chat_input: c(231),
        chat_offline: c(240),
        help_bracket: c(240),
        help_key: c(231),
        help_label: c(250),
        played_default: c(250),
        played_bg: c(235),
        unplayed: c(235),
        album_colors: ALBUM_RAMP.iter().map(|&i| c(i)).collect(),
        video: RenderMode::Grayscale,
    }
}

fn mono_plus() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "mono-plus",
        selection_bg: c(220),
        selection_fg: c(16),
        played_bg: c(235),
        chat_name: c(196),
        chat_input: c(196),
        help_key: c(220),
        video: RenderMode::Normal,
        ..mono_base()
    }
}

fn mono_pink() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "mono-pink",
        selection_bg: c(218),
        selection_fg: c(16),
        played_bg: c(235),
        chat_name: c(141),
        chat_input: c(141),
        help_key: c(218),
        video: RenderMode::Normal,
        ..mono_base()
    }
}

fn mono_violet() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "mono-violet",
        bg: c(17),
        selection_bg: c(135),
        played_bg: c(63),
        chat_name: c(63),
        chat_input: c(63),
        help_key: c(135),
        unplayed: c(63),
        video: RenderMode::Normal,
        ..mono_base()
    }
}

fn mono_blush() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "mono-blush",
        bg: c(18),
        selection_bg: c(175),
        played_bg: c(17),
        text_dim: c(246),
        chat_name: c(51),
        chat_input: c(51),
        help_key: c(175),
        help_label: c(231),
        unplayed: c(17),
        video: RenderMode::Normal,
        ..mono_base()
    }
}

fn mono_mint() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "mono-mint",
        bg: c(233),
        selection_bg: c(192),
        selection_fg: c(16),
        played_bg: c(235),
        text_dim: c(246),
        chat_name: c(78),
        chat_input: c(78),
        help_bracket: c(78),
        help_key: c(192),
        help_label: c(231),
        video: RenderMode::Tint {
            hue: 100.0,
            saturation: 70.0,
        },
        ..mono_base()
    }
}

fn mono_ember() -> Theme {
    let c = Color::Indexed;
    Theme {
        name: "mono-ember",
        bg: c(232),
        selection_bg: c(220),
        selection_fg: c(16),
        played_bg: c(233),
        text_dim: c(246),
        chat_name: c(208),
        chat_input: c(220),
        help_bracket: c(208),
        help_key: c(220),
        help_label: c(231),
        unplayed: c(233),
        video: RenderMode::Tint {
            hue: 20.0,
            saturation: 45.0,
        },
        ..mono_base()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// The theme list and the current selection
#[derive(Debug)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
    current: usize,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeRegistry {
    /// All built-in themes, starting at "mono-plus"
    pub fn new() -> Self {
        Self {
            themes: vec![
                mono_plus(),
                mono_pink(),
                mono_violet(),
                mono_blush(),
                mono_mint(),
                mono_ember(),
                mono_base(),
            ],
            current: 0,
        }
    }

    pub fn current(&self) -> &Theme {
        &self.themes[self.current]
    }

    /// Advance to the next theme, wrapping around.
    pub fn cycle(&mut self) -> &Theme {
        self.current = (self.current + 1) % self.themes.len();
        tracing::debug!(theme = self.current().name, "theme changed");
        self.current()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
