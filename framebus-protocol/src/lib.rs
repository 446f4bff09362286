//! Framebus wire-format codec
//!
//! This crate implements the framing layer of the Framebus protocol: a
//! SLIP-style escaped byte stream carrying discrete command/response packets
//! with an appended CRC-8. It assumes nothing of the transport beyond ordered
//! byte delivery.
//!
//! # Wire format
//!
//! ```text
//! ┌─────┬─────────┬────────────┬─────┬─────┐
//! │ END │ COMMAND │ DATA       │ CRC │ END │
//! │ 1B  │ 1B      │ 0–N bytes  │ 1B  │ 1B  │
//! └─────┴─────────┴────────────┴─────┴─────┘
//! ```
//!
//! Any occurrence of `END` (0xC0) or `ESC` (0xDB) inside the command, data,
//! or CRC is replaced by the two-byte sequences `ESC ESC_END` / `ESC ESC_ESC`
//! so that a bare `END` only ever appears at frame boundaries. The CRC-8 is
//! computed over the command byte followed by the data bytes.
//!
//! Both the encoder and the decoder are byte-at-a-time state machines: they
//! do O(1) work per byte, never block, and hold no buffer beyond the
//! destination [`Packet`] itself. "More bytes needed" is expressed through
//! the return value, never by waiting.

#![no_std]
#![deny(unsafe_code)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod packer;
pub mod packet;
pub mod unpacker;

mod checksum;

pub use decoder::PacketDecoder;
pub use encoder::PacketEncoder;
pub use error::Error;
pub use packer::Packer;
pub use packet::{Packet, END, ESC, ESC_END, ESC_ESC, MAX_DATA_SIZE};
pub use unpacker::Unpacker;
