//! Reusable conversion context.

use bytes::BytesMut;

use crate::config::ResourceLimits;

use super::narrow::utf8_lossy;
use super::{replacement_fallback, CharWidth};

/// Number of buffers of each width a context keeps for reuse.
pub const DEFAULT_STRING_POOL_CAPACITY: usize = 10;

/// Text decoded from UTF-8 into a client width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// UTF-8 bytes.
    Narrow(BytesMut),
    /// UTF-16 code units.
    Utf16(Vec<u16>),
    /// Unicode scalar values.
    Utf32(Vec<u32>),
}

impl Decoded {
    /// Width of the decoded units.
    pub fn width(&self) -> CharWidth {
        match self {
            Decoded::Narrow(_) => CharWidth::Narrow,
            Decoded::Utf16(_) => CharWidth::Utf16,
            Decoded::Utf32(_) => CharWidth::Utf32,
        }
    }

    /// Number of code units.
    pub fn len(&self) -> usize {
        match self {
            Decoded::Narrow(b) => b.len(),
            Decoded::Utf16(v) => v.len(),
            Decoded::Utf32(v) => v.len(),
        }
    }

    /// Check if no units were produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// UTF-8 bytes, for `Narrow`.
    pub fn as_narrow(&self) -> Option<&[u8]> {
        match self {
            Decoded::Narrow(b) => Some(&b[..]),
            _ => None,
        }
    }

    /// UTF-16 units, for `Utf16`.
    pub fn as_utf16(&self) -> Option<&[u16]> {
        match self {
            Decoded::Utf16(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Scalar values, for `Utf32`.
    pub fn as_utf32(&self) -> Option<&[u32]> {
        match self {
            Decoded::Utf32(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// Caller-owned conversion state: pools of reusable output buffers.
///
/// A context is meant for one logical conversion session (one statement, one
/// fetch loop). Every conversion takes it by `&mut`, so a single instance is
/// never used from two threads at once; threads that convert concurrently
/// each own a context.
///
/// # Example
///
/// ```
/// use clickhouse_odbc_core::config::ResourceLimits;
/// use clickhouse_odbc_core::protocol::convert::{CharWidth, ConversionContext};
///
/// let mut ctx = ConversionContext::new(&ResourceLimits::default());
/// let decoded = ctx.decode("héllo".as_bytes(), CharWidth::Utf16);
/// assert_eq!(decoded.len(), 5);
/// ctx.recycle(decoded);
/// ```
#[derive(Debug)]
pub struct ConversionContext {
    narrow_pool: Vec<BytesMut>,
    utf16_pool: Vec<Vec<u16>>,
    utf32_pool: Vec<Vec<u32>>,
    pool_capacity: usize,
    max_buffer_size: usize,
    buffer_increment: usize,
}

impl ConversionContext {
    /// Create a context sized by `limits`.
    pub fn new(limits: &ResourceLimits) -> Self {
        Self::with_pool_capacity(limits, DEFAULT_STRING_POOL_CAPACITY)
    }

    /// Create a context keeping at most `pool_capacity` buffers per width.
    pub fn with_pool_capacity(limits: &ResourceLimits, pool_capacity: usize) -> Self {
        Self {
            narrow_pool: Vec::new(),
            utf16_pool: Vec::new(),
            utf32_pool: Vec::new(),
            pool_capacity: pool_capacity.min(limits.memory_pool_size),
            max_buffer_size: limits.max_buffer_size,
            buffer_increment: limits.buffer_increment.max(1),
        }
    }

    /// Number of buffers currently pooled, over all widths.
    pub fn pooled(&self) -> usize {
        self.narrow_pool.len() + self.utf16_pool.len() + self.utf32_pool.len()
    }

    /// Convert UTF-8 bytes to `width`.
    ///
    /// Invalid UTF-8 degrades to U+FFFD per invalid sequence; `Wide` resolves
    /// to the platform width.
    pub fn decode(&mut self, src: &[u8], width: CharWidth) -> Decoded {
        match width.resolve() {
            CharWidth::Narrow => Decoded::Narrow(self.to_narrow(src)),
            CharWidth::Utf16 => Decoded::Utf16(self.to_utf16(src)),
            _ => Decoded::Utf32(self.to_utf32(src)),
        }
    }

    /// Validated UTF-8 bytes.
    pub fn to_narrow(&mut self, src: &[u8]) -> BytesMut {
        let mut buf = self.narrow_pool.pop().unwrap_or_default();
        buf.clear();
        match std::str::from_utf8(src) {
            Ok(_) => {
                buf.reserve(self.rounded(src.len()));
                buf.extend_from_slice(src);
            }
            Err(_) => {
                let text = lossy_text(src);
                buf.reserve(self.rounded(text.len()));
                buf.extend_from_slice(text.as_bytes());
            }
        }
        buf
    }

    /// UTF-16 code units.
    pub fn to_utf16(&mut self, src: &[u8]) -> Vec<u16> {
        let mut buf = self.utf16_pool.pop().unwrap_or_default();
        buf.clear();
        let text = text_of(src);
        buf.reserve(self.rounded(text.len()));
        buf.extend(text.encode_utf16());
        buf
    }

    /// Unicode scalar values.
    pub fn to_utf32(&mut self, src: &[u8]) -> Vec<u32> {
        let mut buf = self.utf32_pool.pop().unwrap_or_default();
        buf.clear();
        let text = text_of(src);
        buf.reserve(self.rounded(text.len()));
        buf.extend(text.chars().map(u32::from));
        buf
    }

    /// Return a buffer to the pool.
    ///
    /// Buffers over the `max_buffer_size` limit, or beyond the pool capacity,
    /// are dropped.
    pub fn recycle(&mut self, decoded: Decoded) {
        match decoded {
            Decoded::Narrow(buf) => {
                let size = buf.capacity();
                keep(&mut self.narrow_pool, buf, size, self.pool_capacity, self.max_buffer_size)
            }
            Decoded::Utf16(buf) => {
                let size = buf.capacity() * 2;
                keep(&mut self.utf16_pool, buf, size, self.pool_capacity, self.max_buffer_size)
            }
            Decoded::Utf32(buf) => {
                let size = buf.capacity() * 4;
                keep(&mut self.utf32_pool, buf, size, self.pool_capacity, self.max_buffer_size)
            }
        }
    }

    /// Round a capacity request up to the growth increment.
    fn rounded(&self, n: usize) -> usize {
        n.div_ceil(self.buffer_increment)
            .saturating_mul(self.buffer_increment)
    }
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::new(&ResourceLimits::default())
    }
}

fn keep<T>(pool: &mut Vec<T>, buf: T, size: usize, capacity: usize, max_size: usize) {
    if pool.len() < capacity && size <= max_size {
        pool.push(buf);
    }
}

fn text_of(src: &[u8]) -> std::borrow::Cow<'_, str> {
    match std::str::from_utf8(src) {
        Ok(text) => text.into(),
        Err(_) => lossy_text(src).into(),
    }
}

fn lossy_text(src: &[u8]) -> String {
    utf8_lossy(src, false).unwrap_or_else(|_| replacement_fallback(src.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_widths() {
        let mut ctx = ConversionContext::default();
        let text = "a€😀";

        assert_eq!(
            ctx.decode(text.as_bytes(), CharWidth::Utf16).as_utf16(),
            Some(&[0x61, 0x20AC, 0xD83D, 0xDE00][..])
        );
        assert_eq!(
            ctx.decode(text.as_bytes(), CharWidth::Utf32).as_utf32(),
            Some(&[0x61, 0x20AC, 0x1F600][..])
        );
        assert_eq!(
            ctx.decode(text.as_bytes(), CharWidth::Narrow).as_narrow(),
            Some(text.as_bytes())
        );
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut ctx = ConversionContext::default();
        let decoded = ctx.decode(b"ok\xFF\xC3", CharWidth::Utf32);
        assert_eq!(decoded.as_utf32(), Some(&[0x6F, 0x6B, 0xFFFD, 0xFFFD][..]));

        let narrow = ctx.decode(b"\x80x", CharWidth::Narrow);
        assert_eq!(narrow.as_narrow(), Some("\u{FFFD}x".as_bytes()));
    }

    #[test]
    fn test_pool_reuse() {
        let mut ctx = ConversionContext::default();
        let first = ctx.decode(b"pooled", CharWidth::Utf16);
        ctx.recycle(first);
        assert_eq!(ctx.pooled(), 1);

        let second = ctx.decode(b"again", CharWidth::Utf16);
        assert_eq!(ctx.pooled(), 0);
        assert_eq!(second.as_utf16().map(<[u16]>::len), Some(5));
    }

    #[test]
    fn test_pool_limits() {
        let limits = ResourceLimits::constrained();
        let mut ctx = ConversionContext::with_pool_capacity(&limits, 2);

        for _ in 0..5 {
            ctx.recycle(Decoded::Utf32(Vec::with_capacity(4)));
        }
        assert_eq!(ctx.pooled(), 2);

        let mut big = ConversionContext::new(&limits);
        big.recycle(Decoded::Narrow(BytesMut::with_capacity(limits.max_buffer_size + 1)));
        assert_eq!(big.pooled(), 0);
    }
}
