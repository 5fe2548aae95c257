//! Register link contract
//!
//! Everything that talks to the graphics controller goes through a
//! [`RegisterLink`]: single register reads and writes, each in its own
//! chip-select assertion, plus a bulk write that streams a byte range and
//! trailing zero padding under one assertion.

use core::ops::Range;

/// A source of bytes for a bulk transfer
///
/// Implemented for plain byte slices and for [`Text`], which appends the
/// NUL terminator the co-processor expects after string arguments.
pub trait Payload {
    /// Total number of bytes this payload produces
    fn len(&self) -> usize;

    /// Copy `out.len()` bytes starting at `offset` into `out`
    fn copy_to(&self, offset: usize, out: &mut [u8]);

    /// Borrow `range` as at most two contiguous slices
    fn segments(&self, range: Range<usize>) -> (&[u8], &'static [u8]);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Payload for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self[offset..offset + out.len()]);
    }

    fn segments(&self, range: Range<usize>) -> (&[u8], &'static [u8]) {
        (&self[range], &[])
    }
}

/// A string payload, written with its NUL terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text<'a>(pub &'a str);

impl Payload for Text<'_> {
    fn len(&self) -> usize {
        self.0.len() + 1
    }

    fn copy_to(&self, offset: usize, out: &mut [u8]) {
        let bytes = self.0.as_bytes();
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = bytes.get(offset + i).copied().unwrap_or(0);
        }
    }

    fn segments(&self, range: Range<usize>) -> (&[u8], &'static [u8]) {
        let bytes = self.0.as_bytes();
        let end = range.end.min(bytes.len());
        let start = range.start.min(end);
        let nul: &'static [u8] = if range.end > bytes.len() { &[0] } else { &[] };
        (&bytes[start..end], nul)
    }
}

/// Byte-level access to the controller's address space
pub trait RegisterLink {
    /// Bus error type
    type Error;

    fn read8(&mut self, addr: u32) -> Result<u8, Self::Error>;
    fn read16(&mut self, addr: u32) -> Result<u16, Self::Error>;
    fn read32(&mut self, addr: u32) -> Result<u32, Self::Error>;

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Self::Error>;
    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Self::Error>;
    fn write32(&mut self, addr: u32, value: u32) -> Result<(), Self::Error>;

    /// Write `payload[range]` followed by `padding` zero bytes at `addr`
    fn write_bulk<P: Payload + ?Sized>(
        &mut self,
        addr: u32,
        payload: &P,
        range: Range<usize>,
        padding: usize,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_payload() {
        let data: &[u8] = &[1, 2, 3, 4, 5];
        assert_eq!(Payload::len(data), 5);
        let mut out = [0u8; 3];
        data.copy_to(2, &mut out);
        assert_eq!(out, [3, 4, 5]);
    }

    #[test]
    fn test_text_payload_terminator() {
        let text = Text("OK");
        assert_eq!(text.len(), 3);
        let mut out = [0xAAu8; 3];
        text.copy_to(0, &mut out);
        assert_eq!(out, [b'O', b'K', 0]);

        let mut tail = [0xAAu8; 2];
        text.copy_to(1, &mut tail);
        assert_eq!(tail, [b'K', 0]);
    }

    #[test]
    fn test_empty_text_is_just_nul() {
        let text = Text("");
        assert_eq!(text.len(), 1);
        assert!(!text.is_empty());
    }

    #[test]
    fn test_segments() {
        let data: &[u8] = &[1, 2, 3, 4];
        assert_eq!(data.segments(1..3), (&[2u8, 3][..], &[][..]));

        let text = Text("abc");
        assert_eq!(text.segments(0..4), (&b"abc"[..], &[0u8][..]));
        assert_eq!(text.segments(1..2), (&b"b"[..], &[][..]));
        assert_eq!(text.segments(3..4), (&[][..], &[0u8][..]));
    }
}
