//! Localhost end-to-end exercise: a simulated device on one thread, the
//! host on the test thread, talking over a real TCP socket.

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use framebus_core::{commands, Bus, CoreHandler};
use framebus_host::{transact, TcpTransport};
use framebus_protocol::Packet;

/// Serves core commands until the peer disconnects
fn run_device(listener: TcpListener) {
    let (stream, _) = listener.accept().unwrap();
    let transport = TcpTransport::from_stream(stream).unwrap();

    let mut core = CoreHandler::new();
    let mut bus: Bus<'_, TcpTransport, 64> = Bus::new(transport);
    bus.add(&mut core);

    while bus.is_connected() {
        match bus.process_byte() {
            Ok(true) => {
                bus.handle_packet();
            }
            Ok(false) => thread::yield_now(),
            Err(err) => panic!("device decode error: {err:?}"),
        }
    }
}

#[test]
fn test_core_commands_over_localhost() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let device = thread::spawn(move || run_device(listener));

    let transport = TcpTransport::connect(addr).unwrap();
    let mut bus: Bus<'_, TcpTransport, 64> = Bus::new(transport);

    // Payload deliberately contains both reserved wire bytes.
    let mut ping: Packet<64> = Packet::with_command(commands::PING);
    ping.set_data(&[0xC0, 0xDB, 0x42]).unwrap();
    let rsp = transact(&mut bus, &mut ping, Duration::from_secs(5)).unwrap();
    assert_eq!(rsp.command(), commands::PING);
    assert_eq!(rsp.data(), &[0xC0, 0xDB, 0x42]);

    let mut stack: Packet<64> = Packet::with_command(commands::STACK_INFO);
    let rsp = transact(&mut bus, &mut stack, Duration::from_secs(5)).unwrap();
    assert_eq!(rsp.command(), commands::STACK_INFO);
    assert_eq!(rsp.data_len(), 12);

    let mut heap: Packet<64> = Packet::with_command(commands::HEAP_INFO);
    let rsp = transact(&mut bus, &mut heap, Duration::from_secs(5)).unwrap();
    assert_eq!(rsp.command(), commands::HEAP_INFO);
    assert_eq!(rsp.data_len(), 20);

    drop(bus);
    device.join().unwrap();
}
