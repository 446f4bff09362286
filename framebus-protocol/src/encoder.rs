//! Encodes packets into their over-the-wire format
//!
//! The encoder produces one wire byte per call so the driving loop can pace
//! output to whatever the transport accepts. A frame is started with
//! [`PacketEncoder::start`], then [`PacketEncoder::encode_byte`] is called
//! until it reports completion.

use crate::error::Error;
use crate::packet::{Packet, END, ESC, ESC_END, ESC_ESC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No frame in flight
    Idle,
    /// Emit the opening END
    Start,
    /// Emit the command byte
    Command,
    /// Emit data bytes, then the CRC, then the closing END
    Data,
    /// Emit the substitute code for an escaped byte
    Escape,
    /// Closing END has been emitted; report completion
    Finished,
}

/// State machine turning a [`Packet`] into framed, escaped wire bytes
#[derive(Debug)]
pub struct PacketEncoder {
    state: State,
    escape_byte: u8,
    index: usize,
    debug: bool,
}

impl Default for PacketEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketEncoder {
    /// Create an idle encoder
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            escape_byte: 0,
            index: 0,
            debug: false,
        }
    }

    /// Sets whether encoded packets get dumped to the log
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Returns the debug-dump flag
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Begins encoding a packet
    ///
    /// Computes and stores the packet's CRC. Any frame already in flight is
    /// abandoned.
    pub fn start<const N: usize>(&mut self, packet: &mut Packet<N>) {
        packet.calc_and_store_crc();
        if self.debug {
            packet.dump("sent");
        }
        self.state = State::Start;
        self.index = 0;
    }

    /// Produces the next wire byte of the current frame
    ///
    /// Returns `Ok(Some(byte))` for each wire byte (the closing END is the
    /// last one), then `Ok(None)` once the frame is complete. Calling this
    /// with no frame started is a caller bug and reports
    /// [`Error::BadState`].
    pub fn encode_byte<const N: usize>(&mut self, packet: &Packet<N>) -> Result<Option<u8>, Error> {
        match self.state {
            State::Idle => Err(Error::BadState),

            State::Start => {
                self.state = State::Command;
                Ok(Some(END))
            }

            State::Command => {
                self.index = 0;
                Ok(Some(self.escape_into(State::Data, packet.command())))
            }

            State::Data => {
                let data = packet.data();
                if self.index < data.len() {
                    let byte = data[self.index];
                    self.index += 1;
                    return Ok(Some(self.escape_into(State::Data, byte)));
                }
                if self.index == data.len() {
                    // All data sent; the CRC is escaped by the same rule.
                    self.index += 1;
                    return Ok(Some(self.escape_into(State::Data, packet.crc())));
                }
                self.state = State::Finished;
                Ok(Some(END))
            }

            State::Escape => {
                self.state = State::Data;
                Ok(Some(self.escape_byte))
            }

            State::Finished => {
                self.state = State::Idle;
                Ok(None)
            }
        }
    }

    /// Emits `byte`, escaping it when it collides with a frame marker
    ///
    /// A reserved byte emits ESC now and parks the substitute code for the
    /// next call; anything else passes through and moves to `next`.
    fn escape_into(&mut self, next: State, byte: u8) -> u8 {
        match byte {
            END => {
                self.escape_byte = ESC_END;
                self.state = State::Escape;
                ESC
            }
            ESC => {
                self.escape_byte = ESC_ESC;
                self.state = State::Escape;
                ESC
            }
            _ => {
                self.state = next;
                byte
            }
        }
    }
}
