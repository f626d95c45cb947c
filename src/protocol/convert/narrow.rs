//! Narrow (8-bit) text to UTF-8.

use std::collections::TryReserveError;

use crate::protocol::constants::REPLACEMENT_CHAR;

use super::{replacement_fallback, sanitize, Length};

/// Convert a narrow client string to UTF-8.
///
/// Input is validated against UTF-8 grammar. Each invalid lead byte and each
/// truncated or ill-formed multi-byte sequence contributes one U+FFFD and
/// scanning resumes at the next byte. NUL and disallowed controls are
/// replaced as well.
///
/// With `trim_trailing_null`, an explicitly sized string ending in NUL loses
/// that one NUL first.
pub fn narrow_to_utf8(src: &[u8], length: Length, trim_trailing_null: bool) -> String {
    let mut units = length.bound(src);
    if trim_trailing_null && matches!(length, Length::Chars(_)) {
        if let Some((&0, rest)) = units.split_last() {
            units = rest;
        }
    }
    if units.is_empty() {
        return String::new();
    }

    match utf8_lossy(units, true) {
        Ok(text) => text,
        Err(_) => replacement_fallback(units.len()),
    }
}

/// Validate `src` as UTF-8, replacing every invalid sequence.
///
/// With `sanitize_controls`, NUL and disallowed C0 controls are replaced too.
pub(crate) fn utf8_lossy(src: &[u8], sanitize_controls: bool) -> Result<String, TryReserveError> {
    let mut out = String::new();
    out.try_reserve(src.len())?;

    let mut i = 0;
    while i < src.len() {
        let lead = src[i];
        if lead < 0x80 {
            let c = lead as char;
            out.push(if sanitize_controls { sanitize(c) } else { c });
            i += 1;
            continue;
        }

        let width = sequence_width(lead);
        let decoded = src
            .get(i..i + width)
            .filter(|_| width > 0)
            .and_then(|seq| std::str::from_utf8(seq).ok());
        match decoded {
            Some(s) => {
                out.push_str(s);
                i += width;
            }
            None => {
                out.push(REPLACEMENT_CHAR);
                i += 1;
            }
        }
    }

    Ok(out)
}

/// Sequence length announced by a lead byte in 0x80..=0xFF; 0 if it cannot
/// start a sequence.
fn sequence_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_and_multibyte() {
        assert_eq!(narrow_to_utf8(b"hello", Length::NullTerminated, false), "hello");
        let text = "Grüße, 世界 😀";
        assert_eq!(narrow_to_utf8(text.as_bytes(), Length::Chars(text.len()), false), text);
    }

    #[test]
    fn test_null_terminated_and_explicit() {
        assert_eq!(narrow_to_utf8(b"ab\0cd", Length::NullTerminated, false), "ab");
        assert_eq!(narrow_to_utf8(b"ab\0cd", Length::Chars(5), false), "ab\u{FFFD}cd");
        assert_eq!(narrow_to_utf8(b"abcd", Length::Chars(0), false), "");
        assert_eq!(narrow_to_utf8(b"", Length::NullTerminated, false), "");
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(
            narrow_to_utf8(b"a\tb\nc\rd\x01e\x1f", Length::Chars(10), false),
            "a\tb\nc\rd\u{FFFD}e\u{FFFD}"
        );
    }

    #[test]
    fn test_invalid_lead_bytes() {
        assert_eq!(narrow_to_utf8(b"a\x80b", Length::Chars(3), false), "a\u{FFFD}b");
        assert_eq!(narrow_to_utf8(b"\xFF\xFE", Length::Chars(2), false), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_truncated_sequences() {
        // "é" is C3 A9; drop the continuation byte.
        assert_eq!(narrow_to_utf8(b"caf\xC3", Length::Chars(4), false), "caf\u{FFFD}");
        // 3-byte lead followed by ASCII: the lead is replaced, ASCII survives.
        assert_eq!(narrow_to_utf8(b"\xE4\xB8x", Length::Chars(3), false), "\u{FFFD}\u{FFFD}x");
    }

    #[test]
    fn test_ill_formed_sequences() {
        // Overlong NUL, encoded surrogate, beyond U+10FFFF.
        assert_eq!(narrow_to_utf8(b"\xC0\x80", Length::Chars(2), false), "\u{FFFD}\u{FFFD}");
        assert_eq!(
            narrow_to_utf8(b"\xED\xA0\x80", Length::Chars(3), false),
            "\u{FFFD}\u{FFFD}\u{FFFD}"
        );
        assert_eq!(
            narrow_to_utf8(b"\xF5\x80\x80\x80", Length::Chars(4), false),
            "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}"
        );
    }

    #[test]
    fn test_trim_trailing_null() {
        assert_eq!(narrow_to_utf8(b"abc\0", Length::Chars(4), true), "abc");
        assert_eq!(narrow_to_utf8(b"abc\0", Length::Chars(4), false), "abc\u{FFFD}");
        // Only one NUL is trimmed.
        assert_eq!(narrow_to_utf8(b"ab\0\0", Length::Chars(4), true), "ab\u{FFFD}");
        assert_eq!(narrow_to_utf8(b"\0", Length::Chars(1), true), "");
    }

    #[test]
    fn test_utf8_lossy_keeps_controls() {
        assert_eq!(utf8_lossy(b"a\x01\xFFb", false).unwrap(), "a\x01\u{FFFD}b");
    }
}
