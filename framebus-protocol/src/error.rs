//! Protocol error codes
//!
//! One enumeration covers the codec, the dispatch layer, and the transports
//! so that every layer of a bus reports failures in the same vocabulary.
//! Progress ("frame incomplete, feed me more bytes") is not an error and is
//! expressed through `Result`/`Option` shapes instead.

/// Errors reported by the codec, the bus, or a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Received CRC did not match the CRC computed over command + data
    Crc {
        /// CRC byte taken from the frame
        received: u8,
        /// CRC computed over the decoded command and data
        expected: u8,
    },
    /// Payload does not fit in the destination packet's data buffer
    TooMuchData,
    /// Frame ended before a CRC byte arrived (command alone is not a packet)
    TooSmall,
    /// Codec driven while no frame was in flight
    BadState,
    /// No response arrived within the deadline (host side only)
    Timeout,
    /// Transport-level I/O failure
    Os,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_comparable() {
        let err = Error::Crc {
            received: 0x12,
            expected: 0x34,
        };
        assert_eq!(
            err,
            Error::Crc {
                received: 0x12,
                expected: 0x34
            }
        );
        assert_ne!(err, Error::TooMuchData);
    }
}
