//! Terminal-safe text
//!
//! Remote names and messages are shown verbatim in the chat panel, so
//! anything that could move the cursor or break the column layout is removed.

use unicode_width::UnicodeWidthChar;

/// First code point of the emoji/pictograph ranges
const WIDE_START: char = '\u{2600}';

/// Invisible modifiers left over once emoji are removed
const INVISIBLE: [char; 4] = ['\u{FE0E}', '\u{FE0F}', '\u{200D}', '\u{20E3}'];

/// Strip control characters, emoji and wide characters from `text`.
///
/// Printable ASCII is kept. Other characters are kept only when they sit
/// below U+2600 and occupy exactly one terminal column.
pub fn sanitize(text: &str) -> String {
    if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return text.to_string();
    }
    text.chars().filter(|&c| keep(c)).collect()
}

fn keep(c: char) -> bool {
    if c.is_ascii() {
        return (' '..='~').contains(&c);
    }
    if INVISIBLE.contains(&c) || c >= WIDE_START {
        return false;
    }
    !c.is_whitespace() && c.width() == Some(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_ascii_unchanged() {
        assert_eq!(sanitize("hello world ~!"), "hello world ~!");
    }

    #[test]
    fn test_escape_sequences_lose_their_escape() {
        assert_eq!(sanitize("hello\x1b[2Jworld"), "hello[2Jworld");
        assert_eq!(sanitize("bell\x07del\x7f"), "belldel");
    }

    #[test]
    fn test_tabs_and_newlines_removed() {
        assert_eq!(sanitize("a\tb\nc\r"), "abc");
    }

    #[test]
    fn test_emoji_removed() {
        assert_eq!(sanitize("hi 👋 there"), "hi  there");
        assert_eq!(sanitize("❤️ok"), "ok");
        assert_eq!(sanitize("1️⃣"), "1");
        assert_eq!(sanitize("👨\u{200D}👩"), "");
    }

    #[test]
    fn test_cjk_removed() {
        assert_eq!(sanitize("abc日本語"), "abc");
    }

    #[test]
    fn test_narrow_unicode_kept() {
        assert_eq!(sanitize("привет"), "привет");
        assert_eq!(sanitize("café ñ αβγ"), "café ñ αβγ");
    }
}
