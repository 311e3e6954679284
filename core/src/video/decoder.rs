//! Video Decoder
//!
//! Parses an ASCII-video container and maintains the frame buffer that
//! keyframes and deltas are applied to.
//!
//! # Container
//!
//! The container is a JSON document, optionally gzip- or brotli-compressed:
//!
//! ```json
//! { "v": 2, "w": 64, "h": 18, "fps": 12,
//!   "chars": " .:-=+*#%@", "palette": ["#05060a", "..."],
//!   "frames": ["K...", "D..."] }
//! ```
//!
//! `chars` may also be an array of one-character strings. Version 1 frames are
//! integer arrays `[type, a, b, c, a, b, c, ...]` where `type == 1` marks a
//! keyframe; version 2 frames are base-93 strings (see [`super::base93`]).
//! Both converge to [`Frame`].

use std::io::Read;

use flate2::read::GzDecoder;
use serde::Deserialize;
use thiserror::Error;

use super::base93;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BROTLI_BUFFER_SIZE: usize = 4096;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while loading a video container
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input carried a gzip header but did not inflate
    #[error("gzip: {0}")]
    Gzip(#[source] std::io::Error),

    /// The (decompressed) document is not a valid container
    #[error("decode video json: {0}")]
    Json(#[from] serde_json::Error),

    /// Version 2 packs char and color with a division by the charset size
    #[error("version 2 video has an empty character set")]
    EmptyCharset,

    /// Zero width, zero height or no frames
    #[error("invalid video data: w={width} h={height} frames={frames}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        frames: usize,
    },

    /// `w * h` does not fit in memory
    #[error("video dimensions {width}x{height} are too large")]
    TooLarge { width: usize, height: usize },
}

// =============================================================================
// Frame Model
// =============================================================================

/// One character cell: an index into the charset and one into the palette.
///
/// Indices are not validated against the clip; out-of-range values render
/// as a blank and leave the current color untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub char_idx: u32,
    pub color_idx: u32,
}

impl Cell {
    pub const fn new(char_idx: u32, color_idx: u32) -> Self {
        Self {
            char_idx,
            color_idx,
        }
    }

    /// Build a cell from raw container integers. Negative indices can never be
    /// valid, so they saturate to a value that is always out of range.
    fn from_raw(char_idx: i64, color_idx: i64) -> Self {
        let index = |v: i64| u32::try_from(v).unwrap_or(u32::MAX);
        Self::new(index(char_idx), index(color_idx))
    }
}

/// A keyframe run: `count` consecutive cells set to `cell`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub cell: Cell,
    pub count: usize,
}

/// A delta update: overwrite the cell at `pos`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellUpdate {
    pub pos: usize,
    pub cell: Cell,
}

/// A decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Full frame, run-length encoded in row-major order
    Keyframe(Vec<Run>),
    /// Sparse changes relative to the previous frame
    Delta(Vec<CellUpdate>),
}

impl Frame {
    pub fn is_keyframe(&self) -> bool {
        matches!(self, Frame::Keyframe(_))
    }

    /// Convert a version-1 integer frame.
    ///
    /// A trailing partial triplet is ignored. Negative run lengths count as
    /// zero and delta updates with a negative position are dropped.
    pub fn from_triplets(raw: &[i64]) -> Self {
        let Some((&kind, body)) = raw.split_first() else {
            return Frame::Delta(Vec::new());
        };
        let triplets = body.chunks_exact(3);

        if kind == 1 {
            Frame::Keyframe(
                triplets
                    .map(|t| Run {
                        cell: Cell::from_raw(t[0], t[1]),
                        count: usize::try_from(t[2]).unwrap_or(0),
                    })
                    .collect(),
            )
        } else {
            Frame::Delta(
                triplets
                    .filter_map(|t| {
                        let pos = usize::try_from(t[0]).ok()?;
                        Some(CellUpdate {
                            pos,
                            cell: Cell::from_raw(t[1], t[2]),
                        })
                    })
                    .collect(),
            )
        }
    }
}

// =============================================================================
// Container Parsing
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Charset {
    Joined(String),
    Split(Vec<String>),
}

impl Charset {
    fn into_chars(self) -> Vec<char> {
        match self {
            Charset::Joined(s) => s.chars().collect(),
            Charset::Split(parts) => parts.iter().flat_map(|p| p.chars()).collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawVideo {
    #[serde(default)]
    v: u32,
    #[serde(default)]
    w: usize,
    #[serde(default)]
    h: usize,
    #[serde(default)]
    fps: u32,
    chars: Charset,
    #[serde(default)]
    palette: Vec<String>,
    frames: serde_json::Value,
}

/// Undo any transport compression.
///
/// Gzip is recognised by its magic number and must inflate cleanly. Brotli
/// has no magic number, so it is attempted and the input is treated as raw
/// JSON when that fails or yields nothing. Returns the brotli output only when
/// it was produced, so the caller can still fall back to the raw bytes.
fn decompress(data: &[u8]) -> Result<Option<Vec<u8>>, DecodeError> {
    if data.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(DecodeError::Gzip)?;
        return Ok(Some(out));
    }

    let mut out = Vec::new();
    match brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE).read_to_end(&mut out) {
        Ok(_) if !out.is_empty() => Ok(Some(out)),
        _ => Ok(None),
    }
}

fn parse_document(data: &[u8]) -> Result<RawVideo, DecodeError> {
    let is_gzip = data.starts_with(&GZIP_MAGIC);
    match decompress(data)? {
        Some(inflated) if is_gzip => Ok(serde_json::from_slice(&inflated)?),
        // Brotli happily "decodes" some plain text, so a parse failure here
        // retries the input as-is.
        Some(inflated) => serde_json::from_slice(&inflated)
            .or_else(|_| serde_json::from_slice(data))
            .map_err(DecodeError::from),
        None => Ok(serde_json::from_slice(data)?),
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Owns a clip's frames and the mutable frame buffer.
#[derive(Debug)]
pub struct Decoder {
    width: usize,
    height: usize,
    fps: u32,
    chars: Vec<char>,
    palette: Vec<String>,
    frames: Vec<Frame>,
    keyframes: Vec<usize>,
    buffer: Vec<Cell>,
}

impl Decoder {
    /// Load a container from raw (possibly compressed) bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let raw = parse_document(data)?;
        let chars = raw.chars.into_chars();

        let frames: Vec<Frame> = if raw.v == 2 {
            let encoded: Vec<String> = serde_json::from_value(raw.frames)?;
            if chars.is_empty() {
                return Err(DecodeError::EmptyCharset);
            }
            encoded
                .iter()
                .map(|s| base93::decode_frame(s, chars.len()))
                .collect()
        } else {
            let literal: Vec<Vec<i64>> = serde_json::from_value(raw.frames)?;
            literal.iter().map(|f| Frame::from_triplets(f)).collect()
        };

        if raw.w == 0 || raw.h == 0 || frames.is_empty() {
            return Err(DecodeError::InvalidDimensions {
                width: raw.w,
                height: raw.h,
                frames: frames.len(),
            });
        }
        let cells = raw.w.checked_mul(raw.h).ok_or(DecodeError::TooLarge {
            width: raw.w,
            height: raw.h,
        })?;

        let keyframes = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_keyframe())
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            width: raw.w,
            height: raw.h,
            fps: raw.fps,
            chars,
            palette: raw.palette,
            frames,
            keyframes,
            buffer: vec![Cell::default(); cells],
        })
    }

    /// Apply one frame to the buffer. Out-of-range indices are ignored.
    ///
    /// Keyframes overwrite the buffer from the start and stop at its end even
    /// if the runs claim more cells. Deltas only touch the cells they name, so
    /// they are only meaningful when applied in order after their keyframe.
    pub fn apply_frame(&mut self, index: usize) {
        let Some(frame) = self.frames.get(index) else {
            return;
        };

        match frame {
            Frame::Keyframe(runs) => {
                let mut cursor: usize = 0;
                for run in runs {
                    let end = cursor.saturating_add(run.count).min(self.buffer.len());
                    self.buffer[cursor..end].fill(run.cell);
                    cursor = end;
                    if cursor == self.buffer.len() {
                        break;
                    }
                }
            }
            Frame::Delta(updates) => {
                for update in updates {
                    if let Some(cell) = self.buffer.get_mut(update.pos) {
                        *cell = update.cell;
                    }
                }
            }
        }
    }

    /// Reconstruct frame `target` from the nearest keyframe at or before it.
    pub fn seek_to(&mut self, target: usize) {
        let Some(last) = self.frames.len().checked_sub(1) else {
            return;
        };
        let target = target.min(last);
        let start = self
            .keyframes
            .iter()
            .copied()
            .take_while(|&k| k <= target)
            .last()
            .unwrap_or(0);

        for index in start..=target {
            self.apply_frame(index);
        }
    }

    /// Glyph for a charset index; blank when out of range.
    pub fn glyph(&self, char_idx: u32) -> char {
        self.chars.get(char_idx as usize).copied().unwrap_or(' ')
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    pub fn buffer(&self) -> &[Cell] {
        &self.buffer
    }

    /// Ascending indices of every keyframe.
    pub fn keyframe_index(&self) -> &[usize] {
        &self.keyframes
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v1(w: usize, h: usize, frames: &str) -> Decoder {
        let doc = format!(
            r##"{{"v":1,"w":{w},"h":{h},"fps":10,"chars":" .#","palette":["#000000","#ff0000","#00ff00"],"frames":{frames}}}"##
        );
        Decoder::from_bytes(doc.as_bytes()).expect("valid clip")
    }

    fn colors(d: &Decoder) -> Vec<u32> {
        d.buffer().iter().map(|c| c.color_idx).collect()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn test_charset_string_and_array_are_equivalent() {
        let joined = br#"{"v":1,"w":1,"h":1,"chars":"ab","frames":[[1,1,0,1]]}"#;
        let split = br#"{"v":1,"w":1,"h":1,"chars":["a","b"],"frames":[[1,1,0,1]]}"#;
        let a = Decoder::from_bytes(joined).unwrap();
        let b = Decoder::from_bytes(split).unwrap();
        assert_eq!(a.glyph(0), b.glyph(0));
        assert_eq!(a.glyph(1), 'b');
        assert_eq!(b.glyph(1), 'b');
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let doc = br#"{"v":1,"w":0,"h":4,"chars":"a","frames":[[1]]}"#;
        assert!(matches!(
            Decoder::from_bytes(doc),
            Err(DecodeError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn test_no_frames_rejected() {
        let doc = br#"{"v":1,"w":2,"h":2,"chars":"a","frames":[]}"#;
        assert!(matches!(
            Decoder::from_bytes(doc),
            Err(DecodeError::InvalidDimensions { frames: 0, .. })
        ));
    }

    #[test]
    fn test_v2_empty_charset_rejected() {
        let doc = br#"{"v":2,"w":2,"h":2,"chars":"","frames":["K!!!!"]}"#;
        assert!(matches!(
            Decoder::from_bytes(doc),
            Err(DecodeError::EmptyCharset)
        ));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(
            Decoder::from_bytes(b"not a video"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_broken_gzip_is_an_error() {
        let data = [0x1f, 0x8b, 0x00, 0x01, 0x02];
        assert!(matches!(
            Decoder::from_bytes(&data),
            Err(DecodeError::Gzip(_))
        ));
    }

    #[test]
    fn test_keyframe_index() {
        let d = v1(2, 1, "[[1,1,1,2],[0,0,2,2],[1,2,2,2],[0],[1,0,0,2]]");
        assert_eq!(d.keyframe_index(), &[0, 2, 4]);
    }

    // ========================================================================
    // apply_frame
    // ========================================================================

    #[test]
    fn test_keyframe_then_delta() {
        let mut d = v1(2, 2, "[[1,0,1,4],[0,0,0,2]]");
        d.apply_frame(0);
        d.apply_frame(1);
        assert_eq!(colors(&d), vec![2, 1, 1, 1]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut d = v1(3, 2, "[[1,1,1,2,2,2,4],[0,5,0,0]]");
        d.apply_frame(0);
        let once = d.buffer().to_vec();
        d.apply_frame(0);
        assert_eq!(d.buffer(), once.as_slice());

        d.apply_frame(1);
        let after_delta = d.buffer().to_vec();
        d.apply_frame(1);
        assert_eq!(d.buffer(), after_delta.as_slice());
    }

    #[test]
    fn test_keyframe_overflow_stops_at_buffer_end() {
        let mut d = v1(2, 1, "[[1,1,1,50,2,2,3]]");
        d.apply_frame(0);
        assert_eq!(colors(&d), vec![1, 1]);
    }

    #[test]
    fn test_delta_out_of_bounds_ignored() {
        let mut d = v1(2, 1, "[[1,1,1,2],[0,9,2,2,-1,2,2,1,0,2]]");
        d.apply_frame(0);
        d.apply_frame(1);
        assert_eq!(colors(&d), vec![1, 2]);
    }

    #[test]
    fn test_out_of_range_frame_is_noop() {
        let mut d = v1(2, 1, "[[1,1,1,2]]");
        d.apply_frame(7);
        assert_eq!(colors(&d), vec![0, 0]);
    }

    #[test]
    fn test_misaligned_triplets_tolerated() {
        let mut d = v1(2, 1, "[[1,1,1,1,2,2]]");
        d.apply_frame(0);
        assert_eq!(colors(&d), vec![1, 0]);
    }

    #[test]
    fn test_negative_indices_saturate() {
        let mut d = v1(1, 1, "[[1,-1,-4,1]]");
        d.apply_frame(0);
        assert_eq!(d.buffer()[0], Cell::new(u32::MAX, u32::MAX));
        assert_eq!(d.glyph(u32::MAX), ' ');
    }

    // ========================================================================
    // seek_to
    // ========================================================================

    #[test]
    fn test_seek_matches_sequential_playback() {
        let frames = "[[1,1,1,6],[0,0,2,2],[0,3,0,0,5,2,1],[1,2,2,3,1,1,3],[0,1,0,0],[0,4,1,2,0,2,2]]";
        for target in 0..6 {
            let mut sequential = v1(3, 2, frames);
            for i in 0..=target {
                sequential.apply_frame(i);
            }
            let mut seeked = v1(3, 2, frames);
            seeked.seek_to(target);
            assert_eq!(seeked.buffer(), sequential.buffer(), "target {target}");
        }
    }

    #[test]
    fn test_seek_past_end_clamps() {
        let mut d = v1(1, 1, "[[1,1,1,1],[0,0,0,2]]");
        d.seek_to(99);
        assert_eq!(colors(&d), vec![2]);
    }
}
