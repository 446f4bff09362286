//! TCP socket transport
//!
//! Wraps a non-blocking [`std::net::TcpStream`] in the [`ByteTransport`]
//! capability so a [`framebus_core::Bus`] can run over a socket. Both ends of
//! a link are covered: [`TcpTransport::connect`] for the host side and
//! [`TcpTransport::listen`] for a device simulated on the same machine.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};

use framebus_core::ByteTransport;
use framebus_protocol::Error;

/// Byte transport over one TCP connection
///
/// The stream is switched to non-blocking mode at construction, matching the
/// transport contract: probes and reads return immediately, and only
/// `write_byte` spins (yielding) until the kernel buffer drains. A peer
/// hangup is remembered and reported through `is_connected`.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    connected: bool,
}

impl TcpTransport {
    /// Connects to a listening peer (the host role)
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr).map_err(os_error)?;
        Self::from_stream(stream)
    }

    /// Binds to `addr` and waits for exactly one peer (the device role)
    ///
    /// Blocks until a connection arrives; the accepted stream is then
    /// non-blocking like any other transport.
    pub fn listen<A: ToSocketAddrs>(addr: A) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).map_err(os_error)?;
        let (stream, peer) = listener.accept().map_err(os_error)?;
        log::info!("accepted connection from {peer}");
        Self::from_stream(stream)
    }

    /// Wraps an already-established stream
    pub fn from_stream(stream: TcpStream) -> Result<Self, Error> {
        stream.set_nonblocking(true).map_err(os_error)?;
        stream.set_nodelay(true).map_err(os_error)?;
        Ok(Self {
            stream,
            connected: true,
        })
    }
}

fn os_error(err: io::Error) -> Error {
    log::error!("tcp transport: {err}");
    Error::Os
}

impl ByteTransport for TcpTransport {
    fn is_data_available(&mut self) -> bool {
        let mut probe = [0u8; 1];
        match self.stream.peek(&mut probe) {
            // A readable socket with zero bytes means the peer closed.
            Ok(0) => {
                self.connected = false;
                false
            }
            Ok(_) => true,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => false,
            Err(err) => {
                log::error!("tcp peek: {err}");
                self.connected = false;
                false
            }
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.stream.read(&mut byte) {
            Ok(0) => {
                self.connected = false;
                None
            }
            Ok(_) => Some(byte[0]),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => None,
            Err(err) => {
                log::error!("tcp read: {err}");
                self.connected = false;
                None
            }
        }
    }

    fn is_space_available(&mut self) -> bool {
        self.connected
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        loop {
            match self.stream.write(&[byte]) {
                Ok(0) => {
                    log::error!("tcp write: connection closed");
                    self.connected = false;
                    return Err(Error::Os);
                }
                Ok(_) => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::yield_now();
                }
                Err(err) => {
                    self.connected = false;
                    return Err(os_error(err));
                }
            }
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.stream.flush().map_err(os_error)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
