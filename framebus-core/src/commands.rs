//! Core command codes
//!
//! Command 0 is reserved: a response packet whose command is still 0 after
//! dispatch means "no response". Devices layer their own commands on top of
//! these; codes below 0x10 are considered core.

/// Checks whether the device is alive; any payload is echoed back
pub const PING: u8 = 0x01;
/// Sets the bus debug-dump flag (u32 flags, bit 0)
pub const DEBUG: u8 = 0x02;
/// Asynchronous log record sent device → host
pub const LOG: u8 = 0x03;
/// Reports stack statistics (three u32 values)
pub const STACK_INFO: u8 = 0x04;
/// Reports heap statistics (five u32 values)
pub const HEAP_INFO: u8 = 0x05;
