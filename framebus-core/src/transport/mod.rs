//! Byte-level transport abstraction
//!
//! A bus drives its transport exclusively through [`ByteTransport`], so the
//! dispatch layer works unchanged over a UART, a TCP socket, a USB CDC
//! endpoint, or the in-memory loopback used by tests. Implementations must
//! never block: "nothing to read" and "no room to write" are answered
//! through the probes, and the bus's poll loop comes back later.

use framebus_protocol::Error;

pub mod loopback;

#[cfg(feature = "embedded-io")]
pub mod embedded_io;

pub use loopback::LoopbackTransport;

#[cfg(feature = "embedded-io")]
pub use self::embedded_io::EmbeddedIoTransport;

/// Capability a byte-oriented transport backend provides to a bus
///
/// All methods are required to return immediately.
pub trait ByteTransport {
    /// Returns true if at least one byte can be read right now
    fn is_data_available(&mut self) -> bool;

    /// Reads one byte, or `None` when nothing is pending
    fn read_byte(&mut self) -> Option<u8>;

    /// Returns true if at least one byte can be written right now
    fn is_space_available(&mut self) -> bool;

    /// Writes one byte
    ///
    /// Transport-level failures surface as [`Error::Os`].
    fn write_byte(&mut self, byte: u8) -> Result<(), Error>;

    /// Pushes out any buffered output (no-op by default)
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Returns true while the peer is reachable (always, by default)
    fn is_connected(&self) -> bool {
        true
    }
}
