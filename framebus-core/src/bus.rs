//! Bus: byte pump and packet dispatch
//!
//! A [`Bus`] ties one transport to one decoder/encoder pair and an ordered
//! handler registry. The owning poll loop feeds it a byte at a time through
//! [`Bus::process_byte`]; once a full packet has decoded,
//! [`Bus::handle_packet`] walks the registry and writes back at most one
//! response.

use heapless::Vec;

use framebus_protocol::{Error, Packet, PacketDecoder, PacketEncoder, MAX_DATA_SIZE};

use crate::handler::PacketHandler;
use crate::transport::ByteTransport;

/// Maximum number of handlers a bus can hold
pub const MAX_HANDLERS: usize = 8;

/// Borrowed view of bus internals handed to handlers during dispatch
///
/// Scoped to a single `handle_packet` call; handlers that need to reach
/// bus-level controls (currently the debug-dump toggle) do so through this
/// context instead of keeping a reference back to the bus.
pub struct BusContext<'a> {
    decoder: &'a mut PacketDecoder,
    encoder: &'a mut PacketEncoder,
}

impl<'a> BusContext<'a> {
    pub(crate) fn new(decoder: &'a mut PacketDecoder, encoder: &'a mut PacketEncoder) -> Self {
        Self { decoder, encoder }
    }

    /// Sets the debug-dump flag on both directions of the codec
    pub fn set_debug(&mut self, debug: bool) {
        self.decoder.set_debug(debug);
        self.encoder.set_debug(debug);
    }

    /// Returns the debug-dump flag
    pub fn debug(&self) -> bool {
        self.decoder.debug()
    }
}

/// Orchestrator binding codec, transport, and handler registry
///
/// Owns the command packet (decode destination) and the response packet.
/// Handlers are registered by reference and must outlive the bus.
pub struct Bus<'h, T: ByteTransport, const N: usize = MAX_DATA_SIZE> {
    transport: T,
    cmd_packet: Packet<N>,
    rsp_packet: Packet<N>,
    decoder: PacketDecoder,
    encoder: PacketEncoder,
    handlers: Vec<&'h mut dyn PacketHandler<N>, MAX_HANDLERS>,
}

impl<'h, T: ByteTransport, const N: usize> Bus<'h, T, N> {
    /// Creates a bus over the given transport with no handlers
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cmd_packet: Packet::new(),
            rsp_packet: Packet::new(),
            decoder: PacketDecoder::new(),
            encoder: PacketEncoder::new(),
            handlers: Vec::new(),
        }
    }

    /// Returns the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns the most recently decoded command packet
    pub fn command_packet(&self) -> &Packet<N> {
        &self.cmd_packet
    }

    /// Returns true while the transport considers its peer reachable
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Appends a handler to the registry
    ///
    /// Registration order is priority order and is permanent. Returns false
    /// (and logs) if the registry is full.
    pub fn add(&mut self, handler: &'h mut dyn PacketHandler<N>) -> bool {
        if self.handlers.push(handler).is_err() {
            log::error!("handler registry full ({} max)", MAX_HANDLERS);
            return false;
        }
        true
    }

    /// Sets the debug-dump flag on both encoder and decoder
    pub fn set_debug(&mut self, debug: bool) {
        self.decoder.set_debug(debug);
        self.encoder.set_debug(debug);
    }

    /// Returns the debug-dump flag
    pub fn debug(&self) -> bool {
        self.decoder.debug()
    }

    /// Reads one byte from the transport and feeds it to the decoder
    ///
    /// Non-blocking: returns `Ok(false)` immediately when no byte is
    /// pending. Returns `Ok(true)` once a complete packet is available in
    /// [`Bus::command_packet`], and the decoder's protocol errors
    /// unchanged.
    pub fn process_byte(&mut self) -> Result<bool, Error> {
        if !self.transport.is_data_available() {
            return Ok(false);
        }
        match self.transport.read_byte() {
            Some(byte) => self.decoder.decode_byte(&mut self.cmd_packet, byte),
            None => Ok(false),
        }
    }

    /// Encodes a packet and writes every wire byte to the transport
    ///
    /// Computes and stores the packet's CRC as a side effect, then flushes
    /// the transport.
    pub fn write_packet(&mut self, packet: &mut Packet<N>) -> Result<(), Error> {
        write_frame(&mut self.transport, &mut self.encoder, packet)
    }

    /// Dispatches the decoded command packet through the handler registry
    ///
    /// The first handler to claim the command is authoritative: if it set a
    /// nonzero response command the response is transmitted; response data
    /// without a command is a usage error and is dropped with a log
    /// message. Returns false when no handler claims the command.
    pub fn handle_packet(&mut self) -> bool {
        self.rsp_packet.clear();

        let mut claimed = false;
        for handler in self.handlers.iter_mut() {
            let mut ctx = BusContext::new(&mut self.decoder, &mut self.encoder);
            if handler.handle_packet(&mut ctx, &self.cmd_packet, &mut self.rsp_packet) {
                claimed = true;
                break;
            }
        }

        if !claimed {
            log::error!("unhandled command: 0x{:02x}", self.cmd_packet.command());
            return false;
        }

        if self.rsp_packet.command() != 0 {
            if let Err(err) =
                write_frame(&mut self.transport, &mut self.encoder, &mut self.rsp_packet)
            {
                log::error!("error writing response: {:?}", err);
            }
        } else if self.rsp_packet.data_len() > 0 {
            log::warn!(
                "response has {} data bytes but no command; dropping",
                self.rsp_packet.data_len()
            );
        }
        true
    }

    /// Returns a human-readable name for a command code
    ///
    /// Handlers are consulted in registration order; `"???"` when none of
    /// them knows the code.
    pub fn command_name(&self, command: u8) -> &'static str {
        self.handlers
            .iter()
            .find_map(|handler| handler.command_name(command))
            .unwrap_or("???")
    }
}

/// Drives the encoder until a whole frame has been written out
fn write_frame<T: ByteTransport, const N: usize>(
    transport: &mut T,
    encoder: &mut PacketEncoder,
    packet: &mut Packet<N>,
) -> Result<(), Error> {
    encoder.start(packet);
    while let Some(byte) = encoder.encode_byte(packet)? {
        transport.write_byte(byte)?;
    }
    transport.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;

    /// Handler that claims one command and records being consulted
    struct TestHandler {
        claims: u8,
        respond_with: u8,
        consulted: bool,
        handled: bool,
    }

    impl TestHandler {
        fn new(claims: u8, respond_with: u8) -> Self {
            Self {
                claims,
                respond_with,
                consulted: false,
                handled: false,
            }
        }
    }

    impl PacketHandler<16> for TestHandler {
        fn handle_packet(
            &mut self,
            _ctx: &mut BusContext<'_>,
            cmd: &Packet<16>,
            rsp: &mut Packet<16>,
        ) -> bool {
            self.consulted = true;
            if cmd.command() != self.claims {
                return false;
            }
            self.handled = true;
            rsp.set_command(self.respond_with);
            true
        }

        fn command_name(&self, command: u8) -> Option<&'static str> {
            (command == self.claims).then_some("CLAIMED")
        }
    }

    /// Encodes a frame for injection
    fn frame(command: u8, data: &[u8]) -> heapless::Vec<u8, 64> {
        let mut pkt: Packet<16> = Packet::with_command(command);
        pkt.set_data(data).unwrap();
        let mut encoder = PacketEncoder::new();
        encoder.start(&mut pkt);
        let mut wire = heapless::Vec::new();
        while let Some(byte) = encoder.encode_byte(&pkt).unwrap() {
            wire.push(byte).unwrap();
        }
        wire
    }

    /// Pumps the bus until a packet decodes
    fn pump(bus: &mut Bus<'_, LoopbackTransport<64>, 16>) {
        loop {
            if bus.process_byte().unwrap() {
                return;
            }
        }
    }

    /// Collects and decodes the frame the bus wrote back
    fn written_packet(bus: &mut Bus<'_, LoopbackTransport<64>, 16>) -> Option<Packet<16>> {
        if bus.transport_mut().written_len() == 0 {
            return None;
        }
        let mut pkt: Packet<16> = Packet::new();
        let mut decoder = PacketDecoder::new();
        while let Some(byte) = bus.transport_mut().pop_written() {
            if decoder.decode_byte(&mut pkt, byte).unwrap() {
                return Some(pkt);
            }
        }
        None
    }

    #[test]
    fn test_process_byte_decodes_a_frame() {
        let mut transport: LoopbackTransport<64> = LoopbackTransport::new();
        transport.inject(&frame(0x42, &[1, 2, 3])).unwrap();

        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        pump(&mut bus);
        assert_eq!(bus.command_packet().command(), 0x42);
        assert_eq!(bus.command_packet().data(), &[1, 2, 3]);
    }

    #[test]
    fn test_process_byte_without_data_is_not_done() {
        let transport: LoopbackTransport<64> = LoopbackTransport::new();
        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        assert_eq!(bus.process_byte(), Ok(false));
    }

    #[test]
    fn test_first_claiming_handler_wins() {
        let mut first = TestHandler::new(0x42, 0x51);
        let mut second = TestHandler::new(0x42, 0x52);

        let mut transport: LoopbackTransport<64> = LoopbackTransport::new();
        transport.inject(&frame(0x42, &[])).unwrap();

        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        bus.add(&mut first);
        bus.add(&mut second);
        pump(&mut bus);
        assert!(bus.handle_packet());

        let rsp = written_packet(&mut bus).expect("response frame");
        assert_eq!(rsp.command(), 0x51);

        drop(bus);
        assert!(first.handled);
        assert!(!second.consulted);
    }

    #[test]
    fn test_dispatch_falls_through_to_later_handler() {
        let mut first = TestHandler::new(0x10, 0x11);
        let mut second = TestHandler::new(0x42, 0x52);

        let mut transport: LoopbackTransport<64> = LoopbackTransport::new();
        transport.inject(&frame(0x42, &[])).unwrap();

        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        bus.add(&mut first);
        bus.add(&mut second);
        pump(&mut bus);
        assert!(bus.handle_packet());

        let rsp = written_packet(&mut bus).expect("response frame");
        assert_eq!(rsp.command(), 0x52);

        drop(bus);
        assert!(first.consulted);
        assert!(!first.handled);
        assert!(second.handled);
    }

    #[test]
    fn test_unhandled_command_writes_nothing() {
        let mut handler = TestHandler::new(0x10, 0x11);

        let mut transport: LoopbackTransport<64> = LoopbackTransport::new();
        transport.inject(&frame(0x42, &[])).unwrap();

        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        bus.add(&mut handler);
        pump(&mut bus);
        assert!(!bus.handle_packet());
        assert_eq!(bus.transport_mut().written_len(), 0);
    }

    #[test]
    fn test_response_data_without_command_is_dropped() {
        /// Claims everything, fills in data, never sets a response command
        struct Mute;
        impl PacketHandler<16> for Mute {
            fn handle_packet(
                &mut self,
                _ctx: &mut BusContext<'_>,
                _cmd: &Packet<16>,
                rsp: &mut Packet<16>,
            ) -> bool {
                rsp.append_data(&[1, 2, 3]).unwrap();
                true
            }
        }

        let mut handler = Mute;
        let mut transport: LoopbackTransport<64> = LoopbackTransport::new();
        transport.inject(&frame(0x42, &[])).unwrap();

        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        bus.add(&mut handler);
        pump(&mut bus);
        assert!(bus.handle_packet());
        assert_eq!(bus.transport_mut().written_len(), 0);
    }

    #[test]
    fn test_write_packet_produces_reference_frame() {
        let transport: LoopbackTransport<64> = LoopbackTransport::new();
        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);

        let mut pkt: Packet<16> = Packet::with_command(0x01);
        bus.write_packet(&mut pkt).unwrap();

        let mut wire: heapless::Vec<u8, 16> = heapless::Vec::new();
        while let Some(byte) = bus.transport_mut().pop_written() {
            wire.push(byte).unwrap();
        }
        assert_eq!(wire.as_slice(), &[0xC0, 0x01, 0x07, 0xC0]);
    }

    #[test]
    fn test_command_name_walks_registry() {
        let mut handler = TestHandler::new(0x42, 0x51);
        let transport: LoopbackTransport<64> = LoopbackTransport::new();
        let mut bus: Bus<'_, LoopbackTransport<64>, 16> = Bus::new(transport);
        bus.add(&mut handler);

        assert_eq!(bus.command_name(0x42), "CLAIMED");
        assert_eq!(bus.command_name(0x99), "???");
    }
}
