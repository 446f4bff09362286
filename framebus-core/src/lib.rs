//! Framebus dispatch layer
//!
//! This crate binds the wire-format codec to a byte-level transport and a
//! registry of command handlers:
//!
//! - [`transport::ByteTransport`]: the capability a transport backend must
//!   provide (non-blocking byte in/out, availability probes)
//! - [`bus::Bus`]: owns one decoder, one encoder, the command/response
//!   packet storage, and the ordered handler registry
//! - [`handler::PacketHandler`]: the contract a command handler implements
//! - [`core_handler::CoreHandler`]: the built-in diagnostic handler (ping,
//!   debug toggle, memory statistics)
//!
//! Everything is single-threaded and cooperative: the owning loop calls
//! [`bus::Bus::process_byte`] once per available byte and
//! [`bus::Bus::handle_packet`] when a full packet has arrived. No operation
//! suspends or blocks.

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod commands;
pub mod core_handler;
pub mod handler;
pub mod transport;

pub use bus::{Bus, BusContext, MAX_HANDLERS};
pub use core_handler::CoreHandler;
pub use handler::PacketHandler;
pub use transport::ByteTransport;
