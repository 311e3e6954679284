//! Base-93 frame strings (container version 2)
//!
//! The alphabet is printable ASCII 32..=126 minus `"` (34) and `\` (92),
//! which leaves 93 symbols that never need escaping inside a JSON string.
//!
//! A frame string starts with a sentinel (`K` for keyframes, anything else
//! for deltas) followed by groups of four symbols. Each group holds two
//! two-digit base-93 numbers `a` and `b`:
//!
//! - keyframe: `a` packs `(char, color)` as `char + color * chars`, `b` is the run length
//! - delta: `a` is the cell position, `b` packs `(char, color)` the same way

use super::decoder::{Cell, CellUpdate, Frame, Run};

/// Number of symbols in the alphabet.
pub const RADIX: u32 = 93;

/// Sentinel that marks a keyframe string.
pub const KEYFRAME_SENTINEL: u8 = b'K';

const INVALID: u8 = u8::MAX;

/// ASCII byte -> digit value, `INVALID` for bytes outside the alphabet.
static DECODE_TABLE: [u8; 128] = build_decode_table();

const fn build_decode_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut c = 32;
    let mut digit = 0;
    while c <= 126 {
        if c != b'"' as usize && c != b'\\' as usize {
            table[c] = digit;
            digit += 1;
        }
        c += 1;
    }
    table
}

/// Digit value of a single symbol, or `None` if it is not in the alphabet.
pub fn digit(symbol: u8) -> Option<u32> {
    DECODE_TABLE
        .get(symbol as usize)
        .copied()
        .filter(|&d| d != INVALID)
        .map(u32::from)
}

/// Iterate the alphabet in digit order.
pub fn alphabet() -> impl Iterator<Item = u8> {
    (32u8..=126).filter(|&c| c != b'"' && c != b'\\')
}

/// Digit value used while decoding frames. ASCII outside the alphabet reads
/// as 0; non-ASCII bytes have no value.
fn lenient_digit(symbol: u8) -> Option<u32> {
    symbol.is_ascii().then(|| digit(symbol).unwrap_or(0))
}

/// Decode a two-symbol number.
fn pair(hi: u8, lo: u8) -> Option<u32> {
    Some(lenient_digit(hi)? * RADIX + lenient_digit(lo)?)
}

/// Decode one version-2 frame string.
///
/// `char_count` must be non-zero; the decoder rejects empty charsets before
/// calling this. Symbols outside the alphabet count as digit 0. Groups that
/// contain a non-ASCII byte are skipped, as is a trailing partial group.
pub fn decode_frame(encoded: &str, char_count: usize) -> Frame {
    let bytes = encoded.as_bytes();
    let Some((&sentinel, body)) = bytes.split_first() else {
        return Frame::Delta(Vec::new());
    };
    let char_count = char_count.max(1) as u32;
    let split = |packed: u32| Cell::new(packed % char_count, packed / char_count);

    let groups = body
        .chunks_exact(4)
        .filter_map(|g| Some((pair(g[0], g[1])?, pair(g[2], g[3])?)));

    if sentinel == KEYFRAME_SENTINEL {
        Frame::Keyframe(
            groups
                .map(|(a, b)| Run {
                    cell: split(a),
                    count: b as usize,
                })
                .collect(),
        )
    } else {
        Frame::Delta(
            groups
                .map(|(a, b)| CellUpdate {
                    pos: a as usize,
                    cell: split(b),
                })
                .collect(),
        )
    }
}
