//! Sequential packing of payload fields into a packet
//!
//! A [`Packer`] wraps a packet and appends fixed-width values, raw byte
//! spans, and length-prefixed strings in order. Every operation checks the
//! available space first and fails without partial mutation, so a packet is
//! never left holding half a field.

use crate::error::Error;
use crate::packet::{Packet, MAX_DATA_SIZE};

/// Cursor-style writer appending payload fields to a [`Packet`]
pub struct Packer<'a, const N: usize = MAX_DATA_SIZE> {
    packet: &'a mut Packet<N>,
}

impl<'a, const N: usize> Packer<'a, N> {
    /// Wraps a packet for sequential appends
    pub fn new(packet: &'a mut Packet<N>) -> Self {
        Self { packet }
    }

    /// Packs a `u8`
    pub fn pack_u8(&mut self, value: u8) -> Result<(), Error> {
        self.packet.append_u8(value)
    }

    /// Packs a `u16`, little-endian
    pub fn pack_u16(&mut self, value: u16) -> Result<(), Error> {
        self.packet.append_u16(value)
    }

    /// Packs a `u32`, little-endian
    pub fn pack_u32(&mut self, value: u32) -> Result<(), Error> {
        self.packet.append_u32(value)
    }

    /// Packs a `u64`, little-endian
    pub fn pack_u64(&mut self, value: u64) -> Result<(), Error> {
        self.packet.append_u64(value)
    }

    /// Packs a raw byte span
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.packet.append_data(bytes)
    }

    /// Packs a length-prefixed string
    ///
    /// Refuses strings whose encoded length (including the terminating NUL)
    /// exceeds 255 bytes, and strings that don't fit in the remaining
    /// space; neither failure writes anything.
    pub fn pack_str(&mut self, s: &str) -> Result<(), Error> {
        self.packet.append_str(s)
    }
}
