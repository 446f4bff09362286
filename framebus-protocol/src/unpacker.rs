//! Sequential extraction of payload fields from a byte span
//!
//! An [`Unpacker`] walks a borrowed byte span (typically a packet's data),
//! yielding fixed-width values, raw spans, and length-prefixed strings.
//! Every extraction checks the remaining length first and returns `None`
//! without advancing on shortfall. Extracted spans and strings are views
//! into the source buffer: they cost nothing but must not outlive the
//! packet's next mutation.

use crate::packet::Packet;

/// Cursor-style reader over a payload byte span
#[derive(Debug, Clone)]
pub struct Unpacker<'a> {
    data: &'a [u8],
}

impl<'a> Unpacker<'a> {
    /// Wraps a byte span for sequential extraction
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Wraps a packet's data
    pub fn from_packet<const N: usize>(packet: &'a Packet<N>) -> Self {
        Self {
            data: packet.data(),
        }
    }

    /// Returns the number of bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Extracts a raw byte span of the requested size
    pub fn unpack_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let span = self.data.get(..len)?;
        self.data = &self.data[len..];
        Some(span)
    }

    /// Extracts a `u8`
    pub fn unpack_u8(&mut self) -> Option<u8> {
        let span = self.unpack_bytes(1)?;
        Some(span[0])
    }

    /// Extracts a `u16`, little-endian
    pub fn unpack_u16(&mut self) -> Option<u16> {
        let span = self.unpack_bytes(2)?;
        Some(u16::from_le_bytes([span[0], span[1]]))
    }

    /// Extracts a `u32`, little-endian
    pub fn unpack_u32(&mut self) -> Option<u32> {
        let span = self.unpack_bytes(4)?;
        Some(u32::from_le_bytes([span[0], span[1], span[2], span[3]]))
    }

    /// Extracts a `u64`, little-endian
    pub fn unpack_u64(&mut self) -> Option<u64> {
        let span = self.unpack_bytes(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(span);
        Some(u64::from_le_bytes(bytes))
    }

    /// Extracts a length-prefixed string
    ///
    /// The length byte counts the payload including its terminating NUL.
    /// Returns `None` without consuming anything if the span is short, the
    /// NUL is missing, or the bytes are not valid UTF-8.
    pub fn unpack_str(&mut self) -> Option<&'a str> {
        let &len = self.data.first()?;
        let len = len as usize;
        if len == 0 {
            return None;
        }
        let body = self.data.get(1..1 + len)?;
        let (&nul, text) = body.split_last()?;
        if nul != 0 {
            return None;
        }
        let text = core::str::from_utf8(text).ok()?;
        self.data = &self.data[1 + len..];
        Some(text)
    }
}
