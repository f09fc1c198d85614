//! Socket-level round trips against scripted peers on the loopback
//! interface: a fake RouterOS device on TCP and a fake RADIUS server on
//! UDP.

use std::net::{Ipv4Addr, TcpListener, TcpStream, UdpSocket};
use std::thread;
use std::time::Duration;

use tikrad::routeros::{sentence, InterfaceStatus, ManagementSession};
use tikrad::radius::RadiusClient;
use tikrad::Error;

const CHALLENGE_HEX: &str = "98514567bd28de9af7a0b9b9c47c7f34";
const TIMEOUT: Duration = Duration::from_secs(2);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn expect_command(stream: &mut TcpStream, command: &str) -> Vec<String> {
    let words = sentence::read_sentence(stream).expect("device failed to read a sentence");
    assert_eq!(words.first().map(String::as_str), Some(command));
    words
}

/// Serve the login handshake: challenge on the bare `/login`, `!done` on a
/// well-formed response word.
fn serve_login(stream: &mut TcpStream) {
    expect_command(stream, "/login");
    let ret = format!("=ret={}", CHALLENGE_HEX);
    sentence::write_sentence(stream, &["!done", ret.as_str()]).unwrap();

    let words = expect_command(stream, "/login");
    assert!(words.iter().any(|w| w == "=name=admin"));
    let response = words
        .iter()
        .find_map(|w| w.strip_prefix("=response="))
        .expect("no response word");
    assert!(response.starts_with("00"));
    assert_eq!(response.len(), 34);
    sentence::write_sentence(stream, &["!done"]).unwrap();
}

#[test]
fn management_session_full_exchange() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        serve_login(&mut stream);

        expect_command(&mut stream, "/system/resource/print");
        sentence::write_sentence(
            &mut stream,
            &[
                "!re",
                "=uptime=2w3d",
                "=cpu-load=7",
                "=free-memory=52428800",
                "=version=6.48.6",
                "=board-name=RB450G",
                "=architecture-name=mipsbe",
            ],
        )
        .unwrap();
        sentence::write_sentence(&mut stream, &["!done"]).unwrap();

        let words = expect_command(&mut stream, "/interface/print");
        assert!(words.iter().any(|w| w == "=stats"));
        sentence::write_sentence(
            &mut stream,
            &[
                "!re",
                "=name=ether1",
                "=rx-byte=100",
                "=tx-byte=50",
                "=rx-packet=10",
                "=tx-packet=5",
                "=running=true",
            ],
        )
        .unwrap();
        sentence::write_sentence(
            &mut stream,
            &["!re", "=name=ether2", "=rx-byte=200", "=running=false"],
        )
        .unwrap();
        sentence::write_sentence(&mut stream, &["!done"]).unwrap();

        expect_command(&mut stream, "/ppp/active/print");
        sentence::write_sentence(
            &mut stream,
            &[
                "!re",
                "=name=user001",
                "=caller-id=AA:BB:CC:DD:EE:FF",
                "=address=10.5.0.2",
                "=uptime=1h2m",
                "=bytes-in=123456",
                "=bytes-out=654321",
                "=service=pppoe",
            ],
        )
        .unwrap();
        sentence::write_sentence(&mut stream, &["!done"]).unwrap();

        expect_command(&mut stream, "/queue/simple/print");
        sentence::write_sentence(&mut stream, &["!trap", "=message=no such command"]).unwrap();
        sentence::write_sentence(&mut stream, &["!done"]).unwrap();
    });

    let mut session = ManagementSession::connect("127.0.0.1", port, TIMEOUT).unwrap();
    session.login("admin", "routerpass").unwrap();

    let resource = session.system_resources().unwrap();
    assert_eq!(resource.cpu_load, 7.0);
    assert_eq!(resource.free_memory, 52_428_800);
    assert_eq!(resource.board_name, "RB450G");

    let interfaces = session.interfaces().unwrap();
    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[0].name, "ether1");
    assert_eq!(interfaces[0].rx_bytes, 100);
    assert_eq!(interfaces[0].status, InterfaceStatus::Running);
    assert_eq!(interfaces[1].name, "ether2");
    assert_eq!(interfaces[1].status, InterfaceStatus::Stopped);

    let sessions = session.ppp_active().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].name, "user001");
    assert_eq!(sessions[0].bytes_in, 123_456);

    let err = session.query("/queue/simple/print", &[]).unwrap_err();
    match err {
        Error::Device(message) => assert_eq!(message, "no such command"),
        other => panic!("expected a device error, got {:?}", other),
    }

    session.disconnect();
    device.join().unwrap();
}

#[test]
fn login_without_challenge_is_an_authentication_error() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        expect_command(&mut stream, "/login");
        // `!done` but no `=ret=` word.
        sentence::write_sentence(&mut stream, &["!done", "=unexpected=1"]).unwrap();
    });

    let mut session = ManagementSession::connect("127.0.0.1", port, TIMEOUT).unwrap();
    let err = session.login("admin", "routerpass").unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));

    session.disconnect();
    device.join().unwrap();
}

#[test]
fn rejected_credentials_are_an_authentication_error() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let device = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        expect_command(&mut stream, "/login");
        let ret = format!("=ret={}", CHALLENGE_HEX);
        sentence::write_sentence(&mut stream, &["!done", ret.as_str()]).unwrap();
        expect_command(&mut stream, "/login");
        sentence::write_sentence(&mut stream, &["!trap", "=message=cannot log in"]).unwrap();
    });

    let mut session = ManagementSession::connect("127.0.0.1", port, TIMEOUT).unwrap();
    let err = session.login("admin", "wrongpass").unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));

    session.disconnect();
    device.join().unwrap();
}

#[test]
fn connect_to_closed_port_is_a_connection_error() {
    init_logging();
    // Bind then drop to find a port with no listener.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = ManagementSession::connect("127.0.0.1", port, TIMEOUT).unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
}

/// Reply to one request with the given response code, echoing the request
/// identifier.
fn radius_reply(server: &UdpSocket, expect_code: u8, reply_code: u8) {
    let mut buf = [0u8; 1024];
    let (received, peer) = server.recv_from(&mut buf).unwrap();
    assert!(received >= 20);
    assert_eq!(buf[0], expect_code);
    let mut reply = vec![reply_code, buf[1], 0, 20];
    reply.extend_from_slice(&[0u8; 16]);
    server.send_to(&reply, peer).unwrap();
}

fn radius_pair() -> (RadiusClient, UdpSocket) {
    let server = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = server.local_addr().unwrap().port();
    let client = RadiusClient::new("127.0.0.1", "testing123")
        .with_ports(port, port)
        .with_timeout(TIMEOUT);
    (client, server)
}

#[test]
fn authenticate_accepts_and_rejects() {
    init_logging();
    let (mut client, server) = radius_pair();
    let handle = thread::spawn(move || {
        radius_reply(&server, 1, 2); // Access-Accept
        radius_reply(&server, 1, 3); // Access-Reject
    });

    assert!(client.authenticate("alice", "wonderland"));
    assert!(!client.authenticate("alice", "badpass"));
    handle.join().unwrap();
}

#[test]
fn accounting_round_trips() {
    init_logging();
    let (mut client, server) = radius_pair();
    let handle = thread::spawn(move || {
        radius_reply(&server, 4, 5); // Accounting-Response
        radius_reply(&server, 4, 5);
    });

    let nas = Ipv4Addr::new(10, 0, 0, 1);
    assert!(client.accounting_start("bob", "S-1001", nas));
    assert!(client.accounting_stop("bob", "S-1001", nas, 3600, 1_000_000, 2_000_000));
    handle.join().unwrap();
}

#[test]
fn silent_server_times_out_to_false() {
    init_logging();
    // The server socket exists but never answers.
    let server = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = server.local_addr().unwrap().port();
    let mut client = RadiusClient::new("127.0.0.1", "testing123")
        .with_ports(port, port)
        .with_timeout(Duration::from_millis(200));

    assert!(!client.authenticate("alice", "wonderland"));
}

#[test]
fn unexpected_response_code_is_false() {
    init_logging();
    let (mut client, server) = radius_pair();
    let handle = thread::spawn(move || {
        radius_reply(&server, 1, 5); // Accounting-Response to an auth request
    });

    assert!(!client.authenticate("alice", "wonderland"));
    handle.join().unwrap();
}
