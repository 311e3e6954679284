//! Color Math
//!
//! Conversions between RGB, HSL and the xterm 256-color palette.
//!
//! The 256-color index space is laid out as:
//! - 16..=231: a 6x6x6 color cube
//! - 232..=255: a 24-step grayscale ramp
//!
//! All functions here are pure and allocation-free.

/// Quantize an RGB triple to the nearest 256-color index.
///
/// True grays use the grayscale ramp, snapping to the cube corners
/// (16 and 231) at the extremes. Everything else lands in the color cube.
pub fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        let step = ((f64::from(r) - 8.0) / 247.0 * 24.0).round() as u8;
        return 232 + step;
    }

    let level = |c: u8| (f64::from(c) / 255.0 * 5.0).round() as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Convert HSL to RGB using the chroma / hue-sector decomposition.
///
/// Hue wraps at 360. Channels are rounded to the nearest integer.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let s = s / 100.0;
    let l = l / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r1, g1, b1) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r1), channel(g1), channel(b1))
}

/// Convert HSL straight to a 256-color index.
pub fn hsl_to_256(h: f64, s: f64, l: f64) -> u8 {
    let (r, g, b) = hsl_to_rgb(h, s, l);
    rgb_to_256(r, g, b)
}

/// Parse a `#rrggbb` color. Anything malformed reads as black.
pub fn parse_hex(hex: &str) -> (u8, u8, u8) {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return (0, 0, 0);
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).unwrap_or(0);
    (channel(0..2), channel(2..4), channel(4..6))
}

/// Perceptual luminance (ITU-R BT.601 weights), 0.0-255.0.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}
