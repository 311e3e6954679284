//! Video Renderer
//!
//! Turns a decoder's frame buffer into colored terminal text.
//!
//! Each palette entry is quantized to the 256-color palette up front, once
//! directly and once by luminance onto the gray ramp. The tinted table maps
//! luminance onto a dim single-hue ramp (lightness 0-55%) and is rebuilt only
//! when the requested hue or saturation changes.

use std::fmt::Write;

use crate::color;

use super::decoder::Decoder;

/// Reset all SGR attributes.
pub const RESET: &str = "\x1b[0m";

/// Upper bound of the tinted lightness ramp, in percent.
const TINT_MAX_LIGHTNESS: f64 = 55.0;

/// How palette colors are transformed on output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RenderMode {
    /// Palette colors as authored
    #[default]
    Normal,
    /// Luminance on the gray ramp
    Grayscale,
    /// Luminance on a single-hue phosphor ramp
    Tint { hue: f64, saturation: f64 },
}

/// A horizontal stretch of cells sharing one foreground color.
///
/// `color` is `None` until the first in-range palette color of the frame,
/// meaning the terminal's default foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorRun {
    pub color: Option<u8>,
    pub text: String,
}

/// Palette tables for one clip.
#[derive(Debug)]
pub struct Renderer {
    rgb: Vec<(u8, u8, u8)>,
    direct: Vec<u8>,
    gray: Vec<u8>,
    tint: Vec<u8>,
    tint_key: Option<(f64, f64)>,
}

impl Renderer {
    /// Precompute the direct and grayscale tables for a `#rrggbb` palette.
    pub fn new(palette: &[String]) -> Self {
        let rgb: Vec<_> = palette.iter().map(|hex| color::parse_hex(hex)).collect();
        let direct = rgb.iter().map(|&(r, g, b)| color::rgb_to_256(r, g, b)).collect();
        let gray = rgb
            .iter()
            .map(|&(r, g, b)| {
                let lum = color::luminance(r, g, b) as u8;
                color::rgb_to_256(lum, lum, lum)
            })
            .collect();

        Self {
            rgb,
            direct,
            gray,
            tint: Vec::new(),
            tint_key: None,
        }
    }

    /// Make sure the tint table matches `(hue, saturation)`.
    ///
    /// Returns `true` if the table had to be rebuilt.
    pub fn ensure_tint(&mut self, hue: f64, saturation: f64) -> bool {
        if self.tint_key == Some((hue, saturation)) {
            return false;
        }
        self.tint = self
            .rgb
            .iter()
            .map(|&(r, g, b)| {
                let lightness = color::luminance(r, g, b) / 255.0 * TINT_MAX_LIGHTNESS;
                color::hsl_to_256(hue, saturation, lightness)
            })
            .collect();
        self.tint_key = Some((hue, saturation));
        true
    }

    /// 256-color code for a palette index under `mode`.
    ///
    /// Tint lookups use whatever table [`ensure_tint`](Self::ensure_tint)
    /// built last.
    pub fn color_code(&self, mode: RenderMode, color_idx: u32) -> Option<u8> {
        self.table(mode).get(color_idx as usize).copied()
    }

    fn table(&self, mode: RenderMode) -> &[u8] {
        match mode {
            RenderMode::Normal => &self.direct,
            RenderMode::Grayscale => &self.gray,
            RenderMode::Tint { .. } => &self.tint,
        }
    }

    fn prepare(&mut self, mode: RenderMode) {
        if let RenderMode::Tint { hue, saturation } = mode {
            self.ensure_tint(hue, saturation);
        }
    }

    /// Render the decoder's buffer as ANSI text.
    ///
    /// Output is clamped to `max_width` x `max_height` (zero means no limit).
    /// A color escape is written only when the cell's color index differs
    /// from the previous cell's, across row boundaries too. Rows are joined by
    /// `\n` with no trailing newline, and the output ends with a reset.
    pub fn render(
        &mut self,
        decoder: &Decoder,
        max_width: usize,
        max_height: usize,
        mode: RenderMode,
    ) -> String {
        self.prepare(mode);
        let table = self.table(mode);
        let (width, height) = clamp(decoder, max_width, max_height);

        let mut out = String::with_capacity(width * height * 12);
        let mut last_idx = None;
        for y in 0..height {
            if y > 0 {
                out.push('\n');
            }
            let row = &decoder.buffer()[y * decoder.width()..][..width];
            for cell in row {
                if last_idx != Some(cell.color_idx) {
                    if let Some(code) = table.get(cell.color_idx as usize) {
                        let _ = write!(out, "\x1b[38;5;{code}m");
                    }
                    last_idx = Some(cell.color_idx);
                }
                out.push(decoder.glyph(cell.char_idx));
            }
        }
        out.push_str(RESET);
        out
    }

    /// Render the buffer as rows of color runs, for widget-based drawing.
    ///
    /// Follows the same color-change rules as [`render`](Self::render): an
    /// out-of-range color keeps whatever color was active before it.
    pub fn render_runs(
        &mut self,
        decoder: &Decoder,
        max_width: usize,
        max_height: usize,
        mode: RenderMode,
    ) -> Vec<Vec<ColorRun>> {
        self.prepare(mode);
        let table = self.table(mode);
        let (width, height) = clamp(decoder, max_width, max_height);

        let mut active: Option<u8> = None;
        let mut last_idx = None;
        let mut rows = Vec::with_capacity(height);
        for y in 0..height {
            let mut runs: Vec<ColorRun> = Vec::new();
            let row = &decoder.buffer()[y * decoder.width()..][..width];
            for cell in row {
                if last_idx != Some(cell.color_idx) {
                    if let Some(&code) = table.get(cell.color_idx as usize) {
                        active = Some(code);
                    }
                    last_idx = Some(cell.color_idx);
                }
                let glyph = decoder.glyph(cell.char_idx);
                match runs.last_mut() {
                    Some(run) if run.color == active => run.text.push(glyph),
                    _ => runs.push(ColorRun {
                        color: active,
                        text: glyph.to_string(),
                    }),
                }
            }
            rows.push(runs);
        }
        rows
    }
}

fn clamp(decoder: &Decoder, max_width: usize, max_height: usize) -> (usize, usize) {
    let limit = |native: usize, max: usize| if max == 0 { native } else { native.min(max) };
    (
        limit(decoder.width(), max_width),
        limit(decoder.height(), max_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clip(w: usize, h: usize, palette: &str, frame: &str) -> Decoder {
        let doc = format!(
            r#"{{"v":1,"w":{w},"h":{h},"fps":1,"chars":"ab","palette":{palette},"frames":[{frame}]}}"#
        );
        let mut d = Decoder::from_bytes(doc.as_bytes()).expect("valid clip");
        d.apply_frame(0);
        d
    }

    fn palette(hexes: &[&str]) -> Vec<String> {
        hexes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_escape_only_on_color_change() {
        let d = clip(3, 2, r##"["#ff0000","#00ff00"]"##, "[1,0,0,4,1,1,2]");
        let mut r = Renderer::new(d.palette());
        let out = r.render(&d, 0, 0, RenderMode::Normal);
        assert_eq!(out, "\x1b[38;5;196maaa\na\x1b[38;5;46mbb\x1b[0m");
    }

    #[test]
    fn test_clamps_to_viewport() {
        let d = clip(3, 2, r##"["#ff0000"]"##, "[1,0,0,6]");
        let mut r = Renderer::new(d.palette());
        let out = r.render(&d, 2, 1, RenderMode::Normal);
        assert_eq!(out, "\x1b[38;5;196maa\x1b[0m");
    }

    #[test]
    fn test_never_upsamples() {
        let d = clip(1, 1, r##"["#ff0000"]"##, "[1,1,0,1]");
        let mut r = Renderer::new(d.palette());
        let out = r.render(&d, 80, 40, RenderMode::Normal);
        assert_eq!(out, "\x1b[38;5;196mb\x1b[0m");
    }

    #[test]
    fn test_out_of_range_color_emits_nothing() {
        let d = clip(2, 1, r##"["#ff0000"]"##, "[1,0,0,1,0,5,1]");
        let mut r = Renderer::new(d.palette());
        let out = r.render(&d, 0, 0, RenderMode::Normal);
        assert_eq!(out, "\x1b[38;5;196maa\x1b[0m");
    }

    #[test]
    fn test_grayscale_uses_luminance() {
        let r = Renderer::new(&palette(&["#ff0000", "#ffffff", "#000000"]));
        // 0.299 * 255 = 76.2 -> gray 76
        assert_eq!(r.color_code(RenderMode::Grayscale, 0), Some(color::rgb_to_256(76, 76, 76)));
        assert_eq!(r.color_code(RenderMode::Grayscale, 1), Some(231));
        assert_eq!(r.color_code(RenderMode::Grayscale, 2), Some(16));
    }

    #[test]
    fn test_tint_cache_rebuilds_only_on_change() {
        let mut r = Renderer::new(&palette(&["#ffffff", "#808080"]));
        assert!(r.ensure_tint(100.0, 70.0));
        assert!(!r.ensure_tint(100.0, 70.0));
        assert!(r.ensure_tint(20.0, 45.0));
        assert!(!r.ensure_tint(20.0, 45.0));
    }

    #[test]
    fn test_tint_maps_white_to_top_of_ramp() {
        let mut r = Renderer::new(&palette(&["#ffffff"]));
        r.ensure_tint(100.0, 70.0);
        let mode = RenderMode::Tint {
            hue: 100.0,
            saturation: 70.0,
        };
        let white = color::luminance(255, 255, 255) / 255.0 * 55.0;
        assert_eq!(r.color_code(mode, 0), Some(color::hsl_to_256(100.0, 70.0, white)));
    }

    #[test]
    fn test_render_tint_builds_table() {
        let d = clip(1, 1, r##"["#ffffff"]"##, "[1,0,0,1]");
        let mut r = Renderer::new(d.palette());
        let mode = RenderMode::Tint {
            hue: 20.0,
            saturation: 45.0,
        };
        let white = color::luminance(255, 255, 255) / 255.0 * 55.0;
        let code = color::hsl_to_256(20.0, 45.0, white);
        assert_eq!(r.render(&d, 0, 0, mode), format!("\x1b[38;5;{code}ma\x1b[0m"));
        assert!(!r.ensure_tint(20.0, 45.0));
    }

    #[test]
    fn test_runs_follow_color_changes() {
        let d = clip(3, 2, r##"["#ff0000","#00ff00"]"##, "[1,0,0,4,1,1,2]");
        let mut r = Renderer::new(d.palette());
        let rows = r.render_runs(&d, 0, 0, RenderMode::Normal);
        assert_eq!(
            rows,
            vec![
                vec![ColorRun {
                    color: Some(196),
                    text: "aaa".into()
                }],
                vec![
                    ColorRun {
                        color: Some(196),
                        text: "a".into()
                    },
                    ColorRun {
                        color: Some(46),
                        text: "bb".into()
                    },
                ],
            ]
        );
    }
}
