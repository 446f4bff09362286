//! Container for one packet of data
//!
//! A [`Packet`] is a fixed-capacity byte buffer plus a command byte and a
//! CRC byte. The capacity is chosen at construction (const generic) and the
//! packet never grows beyond it: callers size packets to match the largest
//! payload the link is expected to carry, and an append that would exceed
//! the capacity fails without touching the buffer.

use heapless::Vec;

use crate::checksum::crc8;
use crate::error::Error;

/// Start/end of frame marker
pub const END: u8 = 0xC0;
/// Next byte is escaped
pub const ESC: u8 = 0xDB;
/// Escaped substitute for an END byte
pub const ESC_END: u8 = 0xDC;
/// Escaped substitute for an ESC byte
pub const ESC_ESC: u8 = 0xDD;

/// Default data capacity in bytes
pub const MAX_DATA_SIZE: usize = 256;

/// One command/response packet
///
/// While receiving, the CRC arrives as the last data byte because the frame
/// length is not known up front; [`Packet::extract_crc`] moves it into the
/// `crc` field once the closing END is seen.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<const N: usize = MAX_DATA_SIZE> {
    command: u8,
    data: Vec<u8, N>,
    crc: u8,
}

impl<const N: usize> Default for Packet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Packet<N> {
    /// Create an empty packet with command 0
    pub const fn new() -> Self {
        Self {
            command: 0,
            data: Vec::new(),
            crc: 0,
        }
    }

    /// Create a packet with the given command and no data
    pub fn with_command(command: u8) -> Self {
        Self {
            command,
            data: Vec::new(),
            crc: 0,
        }
    }

    /// Returns the command byte
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Sets the command byte
    pub fn set_command(&mut self, command: u8) {
        self.command = command;
    }

    /// Returns the data portion of the packet
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of data bytes currently in the packet
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Returns the maximum number of data bytes the packet can hold
    pub fn capacity(&self) -> usize {
        N
    }

    /// Returns how many more data bytes fit in the packet
    pub fn space_remaining(&self) -> usize {
        N - self.data.len()
    }

    /// Resets the packet to command 0 with no data
    pub fn clear(&mut self) {
        self.command = 0;
        self.data.clear();
        self.crc = 0;
    }

    /// Empties the packet data, leaving the command untouched
    pub fn clear_data(&mut self) {
        self.data.clear();
    }

    /// Replaces the packet data
    ///
    /// Fails with [`Error::TooMuchData`] if `data` exceeds the capacity;
    /// the previous content is cleared either way.
    pub fn set_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.data.clear();
        self.append_data(data)
    }

    /// Appends bytes to the packet data
    ///
    /// Space is checked up front: on overflow nothing is written.
    pub fn append_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.data
            .extend_from_slice(data)
            .map_err(|()| Error::TooMuchData)
    }

    /// Appends a single byte to the packet data
    pub fn append_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.data.push(byte).map_err(|_| Error::TooMuchData)
    }

    /// Appends a `u8`
    pub fn append_u8(&mut self, value: u8) -> Result<(), Error> {
        self.append_byte(value)
    }

    /// Appends a `u16`, little-endian
    pub fn append_u16(&mut self, value: u16) -> Result<(), Error> {
        self.append_data(&value.to_le_bytes())
    }

    /// Appends a `u32`, little-endian
    pub fn append_u32(&mut self, value: u32) -> Result<(), Error> {
        self.append_data(&value.to_le_bytes())
    }

    /// Appends a `u64`, little-endian
    pub fn append_u64(&mut self, value: u64) -> Result<(), Error> {
        self.append_data(&value.to_le_bytes())
    }

    /// Appends a length-prefixed string
    ///
    /// The length byte counts the payload bytes *including* a terminating
    /// NUL, so the longest encodable string is 254 bytes. Fails without
    /// writing anything if the string is too long or does not fit.
    pub fn append_str(&mut self, s: &str) -> Result<(), Error> {
        let encoded_len = s.len() + 1;
        if encoded_len > u8::MAX as usize {
            return Err(Error::TooMuchData);
        }
        if self.space_remaining() < 1 + encoded_len {
            return Err(Error::TooMuchData);
        }
        self.append_byte(encoded_len as u8)?;
        self.append_data(s.as_bytes())?;
        self.append_byte(0)
    }

    /// Returns the CRC stored in the packet
    pub fn crc(&self) -> u8 {
        self.crc
    }

    /// Computes the CRC over the command byte and the data bytes
    pub fn calc_crc(&self) -> u8 {
        crc8(self.command, &self.data)
    }

    /// Computes the CRC and stores it in the packet
    pub fn calc_and_store_crc(&mut self) {
        self.crc = self.calc_crc();
    }

    /// Moves the trailing data byte into the CRC field
    ///
    /// Used during decode, where the CRC arrives as the last data byte.
    /// Calling this on a packet with no data is a caller bug.
    pub fn extract_crc(&mut self) -> Result<u8, Error> {
        debug_assert!(self.data_len() >= 1, "extract_crc on empty packet");
        match self.data.pop() {
            Some(crc) => {
                self.crc = crc;
                Ok(crc)
            }
            None => Err(Error::TooSmall),
        }
    }

    /// Logs the packet contents under the given label
    pub fn dump(&self, label: &str) {
        log::info!(
            "{}: cmd=0x{:02x} len={} crc=0x{:02x} data={:02x?}",
            label,
            self.command,
            self.data_len(),
            self.crc,
            self.data()
        );
    }
}
