//! Adapter for `embedded-io` byte-stream peripherals
//!
//! Bridges any peripheral implementing the `embedded-io` read/write traits
//! (UART drivers, USB CDC classes) onto [`ByteTransport`]. The
//! `ReadReady`/`WriteReady` probes map directly onto the bus's availability
//! checks, which keeps the whole stack non-blocking.

use embedded_io::{Read, ReadReady, Write, WriteReady};
use framebus_protocol::Error;

use super::ByteTransport;

/// Wraps an `embedded-io` peripheral as a bus transport
#[derive(Debug)]
pub struct EmbeddedIoTransport<T> {
    inner: T,
}

impl<T> EmbeddedIoTransport<T> {
    /// Wraps a peripheral
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns the wrapped peripheral
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> ByteTransport for EmbeddedIoTransport<T>
where
    T: Read + Write + ReadReady + WriteReady,
{
    fn is_data_available(&mut self) -> bool {
        self.inner.read_ready().unwrap_or(false)
    }

    fn read_byte(&mut self) -> Option<u8> {
        if !self.inner.read_ready().unwrap_or(false) {
            return None;
        }
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(1..) => Some(buf[0]),
            Ok(0) => None,
            Err(_) => None,
        }
    }

    fn is_space_available(&mut self) -> bool {
        self.inner.write_ready().unwrap_or(false)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        match self.inner.write(&[byte]) {
            Ok(0) => Err(Error::Os),
            Ok(_) => Ok(()),
            Err(_) => Err(Error::Os),
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.inner.flush().map_err(|_| Error::Os)
    }
}
