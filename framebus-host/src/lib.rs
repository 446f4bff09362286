//! Host-side pieces of Framebus
//!
//! Everything in this crate assumes std: a non-blocking TCP transport (both
//! the connecting and the listening role) and [`transact`], the
//! send-command-await-response helper a host program drives a device with.

pub mod tcp;
pub mod transact;

pub use tcp::TcpTransport;
pub use transact::{transact, wait_for_response};
