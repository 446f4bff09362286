//! CRC-8 used to protect each frame
//!
//! The checksum is the standard CRC-8 (SMBus variant: polynomial 0x07,
//! init 0x00, no reflection, no final XOR), computed over the command byte
//! followed by the data bytes. The CRC byte itself is excluded.

use crc::{Crc, CRC_8_SMBUS};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Computes the CRC-8 over a command byte and its payload.
pub(crate) fn crc8(command: u8, data: &[u8]) -> u8 {
    let mut digest = CRC8.digest();
    digest.update(&[command]);
    digest.update(data);
    digest.finalize()
}
