//! Send a command, wait for the response
//!
//! A device can emit asynchronous LOG packets at any time, including between
//! a command and its response. [`wait_for_response`] therefore forwards LOG
//! records into the `log` facade and keeps waiting; the first non-LOG packet
//! is the response.

use std::time::{Duration, Instant};

use framebus_core::{commands, Bus, ByteTransport};
use framebus_protocol::{Error, Packet, Unpacker};

/// Writes `command` to the bus and waits for the matching response
///
/// Returns [`Error::Timeout`] when no response decodes within `timeout`.
pub fn transact<T: ByteTransport, const N: usize>(
    bus: &mut Bus<'_, T, N>,
    command: &mut Packet<N>,
    timeout: Duration,
) -> Result<Packet<N>, Error> {
    bus.write_packet(command)?;
    wait_for_response(bus, timeout)
}

/// Pumps the bus until a non-LOG packet decodes or the deadline passes
///
/// LOG packets carry a level byte followed by a length-prefixed string; they
/// are routed to the `log` facade under the device's level and do not count
/// as the response. Frames the decoder rejects (CRC mismatch, size errors)
/// are logged and skipped: the decoder resynchronizes on the next frame
/// boundary, so the response can still arrive before the deadline. Only a
/// transport fault ends the wait early.
pub fn wait_for_response<T: ByteTransport, const N: usize>(
    bus: &mut Bus<'_, T, N>,
    timeout: Duration,
) -> Result<Packet<N>, Error> {
    let deadline = Instant::now() + timeout;
    loop {
        match bus.process_byte() {
            Ok(true) => {
                let packet = bus.command_packet();
                if packet.command() == commands::LOG {
                    forward_log(packet);
                } else {
                    return Ok(packet.clone());
                }
            }
            Ok(false) => {
                if Instant::now() >= deadline {
                    log::error!("timeout waiting for response");
                    return Err(Error::Timeout);
                }
                std::thread::yield_now();
            }
            Err(Error::Os) => return Err(Error::Os),
            Err(err) => log::warn!("discarding corrupted frame: {err:?}"),
        }
    }
}

fn forward_log<const N: usize>(packet: &Packet<N>) {
    let mut unpacker = Unpacker::from_packet(packet);
    match (unpacker.unpack_u8(), unpacker.unpack_str()) {
        (Some(level), Some(message)) => {
            log::log!(level_from_wire(level), "device: {message}");
        }
        _ => log::warn!("malformed log packet: {:02x?}", packet.data()),
    }
}

/// Maps a device log level byte (0=NONE, 1=FATAL, 2=ERROR, 3=WARNING,
/// 4=INFO, 5=DEBUG) onto the `log` facade; unknown levels report as errors
fn level_from_wire(level: u8) -> log::Level {
    match level {
        0 => log::Level::Trace,
        1 | 2 => log::Level::Error,
        3 => log::Level::Warn,
        4 => log::Level::Info,
        5 => log::Level::Debug,
        _ => log::Level::Error,
    }
}
