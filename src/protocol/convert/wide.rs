//! 16-bit, 32-bit and platform-wide text to UTF-8.

use std::collections::TryReserveError;

use crate::protocol::constants::REPLACEMENT_CHAR;

use super::{replacement_fallback, sanitize, Length, WideChar};

/// Convert UTF-16 code units to UTF-8.
///
/// Each unpaired surrogate becomes one U+FFFD.
pub fn utf16_to_utf8(src: &[u16], length: Length) -> String {
    let units = length.bound(src);
    if units.is_empty() {
        return String::new();
    }
    convert_or_fallback(units.len(), || {
        let mut out = String::new();
        out.try_reserve(units.len())?;
        out.extend(
            char::decode_utf16(units.iter().copied())
                .map(|r| sanitize(r.unwrap_or(REPLACEMENT_CHAR))),
        );
        Ok(out)
    })
}

/// Convert UTF-32 code points to UTF-8.
///
/// Values above U+10FFFF and in the surrogate range are not scalar values
/// and become U+FFFD.
pub fn utf32_to_utf8(src: &[u32], length: Length) -> String {
    let units = length.bound(src);
    if units.is_empty() {
        return String::new();
    }
    convert_or_fallback(units.len(), || {
        let mut out = String::new();
        out.try_reserve(units.len())?;
        out.extend(
            units
                .iter()
                .map(|&cp| char::from_u32(cp).map_or(REPLACEMENT_CHAR, sanitize)),
        );
        Ok(out)
    })
}

/// Convert platform `wchar_t` text to UTF-8.
#[cfg(windows)]
pub fn wide_to_utf8(src: &[WideChar], length: Length) -> String {
    utf16_to_utf8(src, length)
}

/// Convert platform `wchar_t` text to UTF-8.
#[cfg(not(windows))]
pub fn wide_to_utf8(src: &[WideChar], length: Length) -> String {
    utf32_to_utf8(src, length)
}

fn convert_or_fallback<F>(positions: usize, convert: F) -> String
where
    F: FnOnce() -> Result<String, TryReserveError>,
{
    convert().unwrap_or_else(|_| replacement_fallback(positions))
}
