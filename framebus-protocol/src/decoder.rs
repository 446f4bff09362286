//! Decodes packets from their over-the-wire format
//!
//! The decoder consumes one wire byte per call, building the frame directly
//! into a caller-supplied [`Packet`] and verifying the trailing CRC when the
//! closing END arrives. Idle's only job is to find a frame boundary, which
//! is what lets the decoder resynchronize after garbage, a partial frame, or
//! a decode error: from any failure the next unescaped END opens a fresh
//! frame.

use crate::error::Error;
use crate::packet::{Packet, END, ESC, ESC_END, ESC_ESC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for a frame boundary
    Idle,
    /// Frame open, next byte is the command
    Command,
    /// Accumulating data bytes until the closing END
    Data,
}

/// State machine turning framed, escaped wire bytes back into a [`Packet`]
#[derive(Debug)]
pub struct PacketDecoder {
    state: State,
    escape: bool,
    debug: bool,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    /// Create a decoder waiting for the first frame boundary
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            escape: false,
            debug: false,
        }
    }

    /// Sets whether decoded packets get dumped to the log
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Returns the debug-dump flag
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Abandons any frame in progress and waits for the next boundary
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.escape = false;
    }

    /// Feeds one wire byte to the decoder
    ///
    /// Returns `Ok(true)` once a complete packet (command, data, verified
    /// CRC) is available in `packet`, `Ok(false)` while the frame is still
    /// in progress. Protocol errors are reported per byte and leave the
    /// decoder ready to pick up the next frame:
    ///
    /// - [`Error::TooSmall`]: the frame ended with no payload before the
    ///   CRC byte.
    /// - [`Error::Crc`]: checksum mismatch over command + data.
    /// - [`Error::TooMuchData`]: the payload exceeds `packet`'s capacity.
    pub fn decode_byte<const N: usize>(
        &mut self,
        packet: &mut Packet<N>,
        byte: u8,
    ) -> Result<bool, Error> {
        // Escape resolution happens before state dispatch so each state can
        // tell a literal END/ESC byte that arrived escaped apart from a
        // genuine frame boundary.
        let (byte, escaped) = match self.resolve(byte) {
            Some(resolved) => resolved,
            // The ESC marker itself carries no content.
            None => return Ok(false),
        };

        match self.state {
            State::Idle => {
                // Ignore everything until a frame boundary shows up.
                if byte == END {
                    self.state = State::Command;
                }
                Ok(false)
            }

            State::Command => {
                if byte == END && !escaped {
                    // Two ENDs in a row: an empty frame, silently ignored.
                    return Ok(false);
                }
                packet.set_command(byte);
                packet.clear_data();
                self.state = State::Data;
                Ok(false)
            }

            State::Data => {
                if byte == END && !escaped {
                    return self.end_of_frame(packet);
                }
                if packet.space_remaining() == 0 {
                    if self.debug {
                        packet.dump("2big");
                    }
                    // Drop the rest of this frame; resync on the next END.
                    self.state = State::Idle;
                    return Err(Error::TooMuchData);
                }
                packet.append_byte(byte)?;
                Ok(false)
            }
        }
    }

    /// Substitutes an escaped byte, or swallows the ESC marker
    ///
    /// Returns the effective byte value and whether it arrived escaped.
    /// Escaping is not recognized in Idle because framing has not started.
    fn resolve(&mut self, byte: u8) -> Option<(u8, bool)> {
        if self.state == State::Idle {
            return Some((byte, false));
        }
        if self.escape {
            self.escape = false;
            let value = match byte {
                ESC_END => END,
                ESC_ESC => ESC,
                other => other,
            };
            return Some((value, true));
        }
        if byte == ESC {
            self.escape = true;
            return None;
        }
        Some((byte, false))
    }

    /// Handles the unescaped END that closes a frame
    fn end_of_frame<const N: usize>(&mut self, packet: &mut Packet<N>) -> Result<bool, Error> {
        // This END doubles as the opening boundary of the next frame, so
        // errors leave the decoder in Command rather than Idle.
        self.state = State::Command;

        if packet.data_len() == 0 {
            // A packet needs at minimum the CRC byte beyond the command.
            return Err(Error::TooSmall);
        }

        let received = packet.extract_crc()?;
        let expected = packet.calc_crc();
        if received != expected {
            log::error!(
                "CRC error: received 0x{:02x} expected 0x{:02x}",
                received,
                expected
            );
            if self.debug {
                packet.dump("crc");
            }
            return Err(Error::Crc { received, expected });
        }

        self.state = State::Idle;
        if self.debug {
            packet.dump("rcvd");
        }
        Ok(true)
    }
}
