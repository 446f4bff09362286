//! In-memory loopback transport
//!
//! Test-harness backend: bytes injected with [`LoopbackTransport::inject`]
//! come back out of `read_byte`, and everything the bus writes is captured
//! for inspection. Also usable no_std, so device-side code can exercise a
//! full bus without hardware.

use framebus_protocol::Error;
use heapless::Deque;

use super::ByteTransport;

/// Default queue capacity in bytes
pub const LOOPBACK_CAPACITY: usize = 512;

/// Byte transport backed by two in-memory queues
#[derive(Debug)]
pub struct LoopbackTransport<const CAP: usize = LOOPBACK_CAPACITY> {
    /// Bytes waiting to be read by the bus
    rx: Deque<u8, CAP>,
    /// Bytes the bus has written
    tx: Deque<u8, CAP>,
}

impl<const CAP: usize> Default for LoopbackTransport<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> LoopbackTransport<CAP> {
    /// Create a transport with empty queues
    pub const fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Deque::new(),
        }
    }

    /// Queues bytes for the bus to read
    ///
    /// Fails with [`Error::TooMuchData`] once the receive queue is full;
    /// bytes before the overflow stay queued.
    pub fn inject(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.rx.push_back(byte).map_err(|_| Error::TooMuchData)?;
        }
        Ok(())
    }

    /// Takes the oldest byte the bus has written
    pub fn pop_written(&mut self) -> Option<u8> {
        self.tx.pop_front()
    }

    /// Returns how many written bytes are waiting to be inspected
    pub fn written_len(&self) -> usize {
        self.tx.len()
    }
}

impl<const CAP: usize> ByteTransport for LoopbackTransport<CAP> {
    fn is_data_available(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn is_space_available(&mut self) -> bool {
        !self.tx.is_full()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        // A full capture queue counts as a transport fault.
        self.tx.push_back(byte).map_err(|_| Error::Os)
    }
}
