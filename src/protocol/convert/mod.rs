//! Unicode conversion between UTF-8 and client character widths.
//!
//! All text crosses the driver boundary through UTF-8. Client buffers come in
//! one of a closed set of widths:
//!
//! | Width | Unit | Interpretation |
//! |-------|------|----------------|
//! | `Narrow` | `u8` | UTF-8 |
//! | `Utf16` | `u16` | UTF-16 code units |
//! | `Utf32` | `u32` | Unicode scalar values |
//! | `Wide` | `WideChar` | platform `wchar_t` (UTF-16 on Windows, UTF-32 elsewhere) |
//!
//! Conversions never fail. Invalid sequences, unpaired surrogates,
//! out-of-range code points and control characters other than TAB, LF and CR
//! are replaced one-for-one with U+FFFD.

mod context;
mod narrow;
mod wide;

pub use context::{ConversionContext, Decoded, DEFAULT_STRING_POOL_CAPACITY};
pub use narrow::narrow_to_utf8;
pub use wide::{utf16_to_utf8, utf32_to_utf8, wide_to_utf8};

use crate::config::DriverConfig;
use crate::protocol::constants::{REPLACEMENT_CHAR, SQL_NTS};

/// Platform `wchar_t`.
#[cfg(windows)]
pub type WideChar = u16;
/// Platform `wchar_t`.
#[cfg(not(windows))]
pub type WideChar = u32;

/// Character width of a client buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharWidth {
    Narrow,
    Utf16,
    Utf32,
    Wide,
}

impl CharWidth {
    /// Size of one code unit in bytes.
    pub const fn unit_size(&self) -> usize {
        match self {
            CharWidth::Narrow => 1,
            CharWidth::Utf16 => 2,
            CharWidth::Utf32 => 4,
            CharWidth::Wide => std::mem::size_of::<WideChar>(),
        }
    }

    /// The fixed width `Wide` stands for on this platform.
    pub const fn resolve(&self) -> CharWidth {
        match self {
            CharWidth::Wide if std::mem::size_of::<WideChar>() == 2 => CharWidth::Utf16,
            CharWidth::Wide => CharWidth::Utf32,
            other => *other,
        }
    }
}

/// Length of a client buffer, in code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// The buffer ends at the first zero unit (or at the end of the slice).
    NullTerminated,
    /// Exactly this many units, clamped to the slice.
    Chars(usize),
}

impl Length {
    /// Interpret an ODBC length argument.
    ///
    /// `SQL_NTS` means null-terminated; any other non-positive value means an
    /// empty string.
    pub fn from_sqllen(len: i64) -> Self {
        match len {
            SQL_NTS => Length::NullTerminated,
            n if n > 0 => Length::Chars(usize::try_from(n).unwrap_or(usize::MAX)),
            _ => Length::Chars(0),
        }
    }

    /// The part of `src` this length covers.
    pub fn bound<'a, T: Copy + Default + PartialEq>(&self, src: &'a [T]) -> &'a [T] {
        match *self {
            Length::NullTerminated => {
                let zero = T::default();
                let end = src.iter().position(|u| *u == zero).unwrap_or(src.len());
                &src[..end]
            }
            Length::Chars(n) => &src[..n.min(src.len())],
        }
    }
}

/// A client buffer of a declared width.
#[derive(Debug, Clone, Copy)]
pub enum SourceBuffer<'a> {
    Narrow(&'a [u8]),
    Utf16(&'a [u16]),
    Utf32(&'a [u32]),
    Wide(&'a [WideChar]),
}

impl SourceBuffer<'_> {
    /// Declared width of the buffer.
    pub fn width(&self) -> CharWidth {
        match self {
            SourceBuffer::Narrow(_) => CharWidth::Narrow,
            SourceBuffer::Utf16(_) => CharWidth::Utf16,
            SourceBuffer::Utf32(_) => CharWidth::Utf32,
            SourceBuffer::Wide(_) => CharWidth::Wide,
        }
    }
}

/// Convert a client buffer to UTF-8.
pub fn encode(src: SourceBuffer<'_>, length: Length, config: &DriverConfig) -> String {
    match src {
        SourceBuffer::Narrow(units) => narrow_to_utf8(units, length, config.trim_trailing_null),
        SourceBuffer::Utf16(units) => utf16_to_utf8(units, length),
        SourceBuffer::Utf32(units) => utf32_to_utf8(units, length),
        SourceBuffer::Wide(units) => wide_to_utf8(units, length),
    }
}

/// Convert raw native-endian client memory of a runtime-declared width to
/// UTF-8.
///
/// `length` counts code units, not bytes. A trailing partial unit counts as
/// one invalid unit.
pub fn encode_bytes(bytes: &[u8], width: CharWidth, length: Length, config: &DriverConfig) -> String {
    match width.resolve() {
        CharWidth::Narrow => narrow_to_utf8(bytes, length, config.trim_trailing_null),
        CharWidth::Utf16 => {
            let (units, partial) = units_from_bytes(bytes, u16::from_ne_bytes);
            let mut text = utf16_to_utf8(&units, length);
            if partial && covers_tail(&units, length) {
                text.push(REPLACEMENT_CHAR);
            }
            text
        }
        _ => {
            let (units, partial) = units_from_bytes(bytes, u32::from_ne_bytes);
            let mut text = utf32_to_utf8(&units, length);
            if partial && covers_tail(&units, length) {
                text.push(REPLACEMENT_CHAR);
            }
            text
        }
    }
}

/// Convert UTF-8 bytes to a buffer of the requested width.
///
/// Buffers come from, and may be returned to, the context's pool.
pub fn decode(src: &[u8], width: CharWidth, context: &mut ConversionContext) -> Decoded {
    context.decode(src, width)
}

fn units_from_bytes<T, const N: usize>(bytes: &[u8], from_ne: fn([u8; N]) -> T) -> (Vec<T>, bool) {
    let chunks = bytes.chunks_exact(N);
    let partial = !chunks.remainder().is_empty();
    let units = chunks
        .map(|chunk| {
            let mut unit = [0u8; N];
            unit.copy_from_slice(chunk);
            from_ne(unit)
        })
        .collect();
    (units, partial)
}

/// Whether `length` reaches past the last whole unit.
fn covers_tail<T: Copy + Default + PartialEq>(units: &[T], length: Length) -> bool {
    match length {
        Length::NullTerminated => !units.contains(&T::default()),
        Length::Chars(n) => n > units.len(),
    }
}

/// Map a decoded character to what crosses the boundary.
///
/// NUL and C0 controls other than TAB, LF and CR become U+FFFD.
pub(crate) fn sanitize(c: char) -> char {
    match c {
        '\t' | '\n' | '\r' => c,
        c if (c as u32) < 0x20 => REPLACEMENT_CHAR,
        c => c,
    }
}

/// Last-resort result: one replacement marker per input position.
pub(crate) fn replacement_fallback(positions: usize) -> String {
    tracing::warn!(positions, "unicode conversion fell back to replacement characters");
    let mut out = String::new();
    match positions
        .checked_mul(REPLACEMENT_CHAR.len_utf8())
        .map(|size| out.try_reserve_exact(size))
    {
        Some(Ok(())) => {
            out.extend(std::iter::repeat(REPLACEMENT_CHAR).take(positions));
            out
        }
        _ => REPLACEMENT_CHAR.to_string(),
    }
}
