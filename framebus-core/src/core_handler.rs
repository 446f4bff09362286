//! Built-in diagnostic handler
//!
//! Answers the core commands every device is expected to support: PING for
//! liveness, DEBUG to toggle the bus's packet dumps, and the memory
//! statistics queries. Registered like any other handler, typically first.

use framebus_protocol::{Packer, Packet, Unpacker};

use crate::bus::BusContext;
use crate::commands;
use crate::handler::PacketHandler;

/// Handler for the core command set
#[derive(Debug, Default)]
pub struct CoreHandler;

impl CoreHandler {
    /// Creates the handler
    pub const fn new() -> Self {
        Self
    }

    fn handle_ping<const N: usize>(cmd: &Packet<N>, rsp: &mut Packet<N>) {
        rsp.set_command(commands::PING);
        // Echo back whatever payload came with the ping.
        if rsp.set_data(cmd.data()).is_err() {
            log::error!("ping payload exceeds response capacity");
        }
    }

    fn handle_debug<const N: usize>(
        ctx: &mut BusContext<'_>,
        cmd: &Packet<N>,
        rsp: &mut Packet<N>,
    ) {
        let flags = Unpacker::new(cmd.data()).unpack_u32().unwrap_or(0);
        ctx.set_debug(flags & 0x01 != 0);

        rsp.set_command(commands::DEBUG);
        if Packer::new(rsp).pack_u32(flags).is_err() {
            log::error!("debug response does not fit");
        }
    }

    fn handle_stack_info<const N: usize>(rsp: &mut Packet<N>) {
        rsp.set_command(commands::STACK_INFO);
        // stackSize, stackUsed, stackUnused. No stack introspection on the
        // supported targets; zeros keep the wire shape.
        let mut packer = Packer::new(rsp);
        if (0..3).try_for_each(|_| packer.pack_u32(0)).is_err() {
            log::error!("stack info response does not fit");
        }
    }

    fn handle_heap_info<const N: usize>(rsp: &mut Packet<N>) {
        rsp.set_command(commands::HEAP_INFO);
        // heapSize, heapAllocated, heapFree, heapFreeBlocks,
        // heapGrowthPotential.
        let mut packer = Packer::new(rsp);
        if (0..5).try_for_each(|_| packer.pack_u32(0)).is_err() {
            log::error!("heap info response does not fit");
        }
    }
}

impl<const N: usize> PacketHandler<N> for CoreHandler {
    fn handle_packet(
        &mut self,
        ctx: &mut BusContext<'_>,
        cmd: &Packet<N>,
        rsp: &mut Packet<N>,
    ) -> bool {
        match cmd.command() {
            commands::PING => {
                Self::handle_ping(cmd, rsp);
                true
            }
            commands::DEBUG => {
                Self::handle_debug(ctx, cmd, rsp);
                true
            }
            commands::STACK_INFO => {
                Self::handle_stack_info(rsp);
                true
            }
            commands::HEAP_INFO => {
                Self::handle_heap_info(rsp);
                true
            }
            _ => false,
        }
    }

    fn command_name(&self, command: u8) -> Option<&'static str> {
        match command {
            commands::PING => Some("PING"),
            commands::DEBUG => Some("DEBUG"),
            commands::LOG => Some("LOG"),
            commands::STACK_INFO => Some("STACK_INFO"),
            commands::HEAP_INFO => Some("HEAP_INFO"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framebus_protocol::{PacketDecoder, PacketEncoder};

    fn with_context<R>(f: impl FnOnce(&mut BusContext<'_>) -> R) -> (R, bool) {
        let mut decoder = PacketDecoder::new();
        let mut encoder = PacketEncoder::new();
        let mut ctx = BusContext::new(&mut decoder, &mut encoder);
        let result = f(&mut ctx);
        (result, decoder.debug())
    }

    #[test]
    fn test_ping_echoes_payload() {
        let mut cmd: Packet<32> = Packet::with_command(commands::PING);
        cmd.set_data(&[0xDE, 0xAD]).unwrap();
        let mut rsp: Packet<32> = Packet::new();

        let (claimed, _) = with_context(|ctx| {
            CoreHandler::new().handle_packet(ctx, &cmd, &mut rsp)
        });
        assert!(claimed);
        assert_eq!(rsp.command(), commands::PING);
        assert_eq!(rsp.data(), &[0xDE, 0xAD]);
    }

    #[test]
    fn test_debug_sets_flag_and_echoes() {
        let mut cmd: Packet<32> = Packet::with_command(commands::DEBUG);
        cmd.append_u32(0x0000_0001).unwrap();
        let mut rsp: Packet<32> = Packet::new();

        let (claimed, debug) = with_context(|ctx| {
            CoreHandler::new().handle_packet(ctx, &cmd, &mut rsp)
        });
        assert!(claimed);
        assert!(debug);
        assert_eq!(rsp.command(), commands::DEBUG);
        assert_eq!(rsp.data(), &[0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_debug_clear_flag() {
        let mut cmd: Packet<32> = Packet::with_command(commands::DEBUG);
        cmd.append_u32(0).unwrap();
        let mut rsp: Packet<32> = Packet::new();

        let (_, debug) = with_context(|ctx| {
            CoreHandler::new().handle_packet(ctx, &cmd, &mut rsp)
        });
        assert!(!debug);
    }

    #[test]
    fn test_stack_info_shape() {
        let cmd: Packet<32> = Packet::with_command(commands::STACK_INFO);
        let mut rsp: Packet<32> = Packet::new();

        with_context(|ctx| CoreHandler::new().handle_packet(ctx, &cmd, &mut rsp));
        assert_eq!(rsp.command(), commands::STACK_INFO);
        assert_eq!(rsp.data_len(), 12);
        assert!(rsp.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_heap_info_shape() {
        let cmd: Packet<32> = Packet::with_command(commands::HEAP_INFO);
        let mut rsp: Packet<32> = Packet::new();

        with_context(|ctx| CoreHandler::new().handle_packet(ctx, &cmd, &mut rsp));
        assert_eq!(rsp.command(), commands::HEAP_INFO);
        assert_eq!(rsp.data_len(), 20);
    }

    #[test]
    fn test_unknown_command_is_not_claimed() {
        let cmd: Packet<32> = Packet::with_command(0x77);
        let mut rsp: Packet<32> = Packet::new();

        let (claimed, _) = with_context(|ctx| {
            CoreHandler::new().handle_packet(ctx, &cmd, &mut rsp)
        });
        assert!(!claimed);
        assert_eq!(rsp.command(), 0);
    }

    #[test]
    fn test_command_names() {
        let handler = CoreHandler::new();
        assert_eq!(
            <CoreHandler as PacketHandler<32>>::command_name(&handler, commands::PING),
            Some("PING")
        );
        assert_eq!(
            <CoreHandler as PacketHandler<32>>::command_name(&handler, 0x77),
            None
        );
    }
}
