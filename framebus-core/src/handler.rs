//! Packet handler contract
//!
//! Handlers are registered with a bus in priority order; the first handler
//! that claims an incoming command is authoritative for it.

use framebus_protocol::{Packet, MAX_DATA_SIZE};

use crate::bus::BusContext;

/// A registered consumer of decoded command packets
pub trait PacketHandler<const N: usize = MAX_DATA_SIZE> {
    /// Offers an incoming packet to this handler
    ///
    /// Returns true if the handler claims the command. A claiming handler
    /// may populate `rsp`; setting a nonzero response command makes the bus
    /// transmit it. `ctx` is a borrowed view of the owning bus, valid for
    /// this call only, through which a handler can reach bus-level controls
    /// such as the debug-dump toggle.
    fn handle_packet(
        &mut self,
        ctx: &mut BusContext<'_>,
        cmd: &Packet<N>,
        rsp: &mut Packet<N>,
    ) -> bool;

    /// Returns a human-readable name for a command code, if this handler
    /// knows it
    fn command_name(&self, command: u8) -> Option<&'static str> {
        let _ = command;
        None
    }
}
