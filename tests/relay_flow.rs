//! End-to-end relay scenarios over loopback UDP.
//!
//! Each test stands up a full controller with peer sockets standing in for
//! the GCS and the flight controller, then drives real datagrams through the
//! activation handshake and both forwarding paths.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use mavlink::common::*;
use mavlink::MavHeader;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use mavlink_relay::codec;
use mavlink_relay::relay::RelayController;
use mavlink_relay::transport::{EndpointRole, UdpEndpoint};
use mavlink_relay::utils::RelayMetrics;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const QUIET_TIMEOUT: Duration = Duration::from_millis(300);

struct Harness {
    /// Address the relay listens on for first GCS contact
    listen_addr: SocketAddr,
    /// Socket standing in for the flight controller
    fc_peer: UdpSocket,
    /// Socket standing in for the GCS reply endpoint
    gcs_peer: UdpSocket,
    metrics: Arc<RelayMetrics>,
}

async fn start_relay() -> Harness {
    let fc_peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let gcs_peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let gcs_in = UdpEndpoint::bind(EndpointRole::GcsIn, "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let gcs_out = UdpEndpoint::connect(EndpointRole::GcsOut, gcs_peer.local_addr().unwrap())
        .await
        .unwrap();
    let fc = UdpEndpoint::connect(EndpointRole::Fc, fc_peer.local_addr().unwrap())
        .await
        .unwrap();

    let controller = RelayController::new(gcs_in, gcs_out, fc);
    let listen_addr = controller.listen_addr().unwrap();
    let metrics = controller.metrics();
    tokio::spawn(controller.run());

    Harness {
        listen_addr,
        fc_peer,
        gcs_peer,
        metrics,
    }
}

fn header(sequence: u8) -> MavHeader {
    MavHeader {
        system_id: 255,
        component_id: 0,
        sequence,
    }
}

fn heartbeat_bytes(sequence: u8) -> Vec<u8> {
    let msg = MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype: MavType::MAV_TYPE_GCS,
        autopilot: MavAutopilot::MAV_AUTOPILOT_INVALID,
        base_mode: MavModeFlag::empty(),
        system_status: MavState::MAV_STATE_ACTIVE,
        mavlink_version: 3,
    });
    codec::encode(header(sequence), &msg).unwrap()
}

fn command_ack_bytes(sequence: u8) -> Vec<u8> {
    let msg = MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
        command: MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
        result: MavResult::MAV_RESULT_ACCEPTED,
    });
    codec::encode(header(sequence), &msg).unwrap()
}

fn command_long_bytes(sequence: u8) -> Vec<u8> {
    let msg = MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        param1: 1.0,
        param2: 0.0,
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
        command: MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
        target_system: 1,
        target_component: 1,
        confirmation: 0,
    });
    codec::encode(header(sequence), &msg).unwrap()
}

async fn recv_datagram(socket: &UdpSocket) -> (Vec<u8>, SocketAddr) {
    let mut buf = vec![0u8; 2048];
    let (n, from) = timeout(RECV_TIMEOUT, socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .unwrap();
    buf.truncate(n);
    (buf, from)
}

async fn expect_quiet(socket: &UdpSocket) {
    let mut buf = vec![0u8; 2048];
    let res = timeout(QUIET_TIMEOUT, socket.recv_from(&mut buf)).await;
    assert!(res.is_err(), "expected no datagram, got one");
}

#[tokio::test]
async fn first_heartbeat_activates_and_reaches_fc() {
    let h = start_relay().await;
    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let hb = heartbeat_bytes(0);
    qgc.send_to(&hb, h.listen_addr).await.unwrap();

    let (forwarded, _) = recv_datagram(&h.fc_peer).await;
    assert_eq!(forwarded, hb, "first forward must be byte-identical");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.metrics.to_fc_datagrams.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn empty_datagram_does_not_activate() {
    let h = start_relay().await;
    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    // Zero-length datagram is a no-op receipt
    qgc.send_to(&[], h.listen_addr).await.unwrap();
    expect_quiet(&h.fc_peer).await;
    assert_eq!(h.metrics.to_fc_datagrams.load(Ordering::Relaxed), 0);
    assert!(h.metrics.empty_receipts.load(Ordering::Relaxed) >= 1);

    // The next real message still activates normally
    let hb = heartbeat_bytes(1);
    qgc.send_to(&hb, h.listen_addr).await.unwrap();
    let (forwarded, _) = recv_datagram(&h.fc_peer).await;
    assert_eq!(forwarded, hb);
}

#[tokio::test]
async fn fc_traffic_is_echoed_to_gcs_after_activation() {
    let h = start_relay().await;
    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    qgc.send_to(&heartbeat_bytes(0), h.listen_addr)
        .await
        .unwrap();
    let (_, relay_fc_addr) = recv_datagram(&h.fc_peer).await;

    // FC sends a COMMAND_ACK back through the relay
    let ack = command_ack_bytes(5);
    h.fc_peer.send_to(&ack, relay_fc_addr).await.unwrap();

    let (echoed, _) = recv_datagram(&h.gcs_peer).await;
    assert_eq!(echoed, ack, "worker A must forward byte-identical");

    // Counter is bumped just after the send; give the worker task a beat
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.metrics.to_gcs_datagrams.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn gcs_commands_are_forwarded_to_fc() {
    let h = start_relay().await;
    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    qgc.send_to(&heartbeat_bytes(0), h.listen_addr)
        .await
        .unwrap();
    let (_, relay_fc_addr) = recv_datagram(&h.fc_peer).await;

    // Prime worker A so the GCS peer learns the relay's gcs-out address
    h.fc_peer
        .send_to(&command_ack_bytes(1), relay_fc_addr)
        .await
        .unwrap();
    let (_, relay_gcs_addr) = recv_datagram(&h.gcs_peer).await;

    // GCS issues an arm command over the reply path
    let cmd = command_long_bytes(2);
    h.gcs_peer.send_to(&cmd, relay_gcs_addr).await.unwrap();

    let (forwarded, _) = recv_datagram(&h.fc_peer).await;
    assert_eq!(forwarded, cmd, "worker B must forward byte-identical");
}

#[tokio::test]
async fn post_activation_listen_receipts_are_inert() {
    let h = start_relay().await;
    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    qgc.send_to(&heartbeat_bytes(0), h.listen_addr)
        .await
        .unwrap();
    let _ = recv_datagram(&h.fc_peer).await;

    // More traffic on the listen socket is consumed but never forwarded
    qgc.send_to(&heartbeat_bytes(1), h.listen_addr)
        .await
        .unwrap();
    expect_quiet(&h.fc_peer).await;

    assert_eq!(h.metrics.to_fc_datagrams.load(Ordering::Relaxed), 1);
    assert_eq!(h.metrics.inert_receipts.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn undecodable_bytes_are_forwarded_verbatim() {
    let h = start_relay().await;
    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    qgc.send_to(&heartbeat_bytes(0), h.listen_addr)
        .await
        .unwrap();
    let (_, relay_fc_addr) = recv_datagram(&h.fc_peer).await;

    // Not MAVLink at all; the relay must still pass it through
    let junk = vec![0x01, 0x02, 0x03, 0xAA, 0x55];
    h.fc_peer.send_to(&junk, relay_fc_addr).await.unwrap();

    let (echoed, _) = recv_datagram(&h.gcs_peer).await;
    assert_eq!(echoed, junk);
}

#[tokio::test]
async fn activation_returns_two_live_workers() {
    let fc_peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let gcs_peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let gcs_in = UdpEndpoint::bind(EndpointRole::GcsIn, "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let gcs_out = UdpEndpoint::connect(EndpointRole::GcsOut, gcs_peer.local_addr().unwrap())
        .await
        .unwrap();
    let fc = UdpEndpoint::connect(EndpointRole::Fc, fc_peer.local_addr().unwrap())
        .await
        .unwrap();

    let mut controller = RelayController::new(gcs_in, gcs_out, fc);
    let listen_addr = controller.listen_addr().unwrap();

    let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    qgc.send_to(&heartbeat_bytes(0), listen_addr).await.unwrap();

    let workers = timeout(RECV_TIMEOUT, controller.wait_for_activation())
        .await
        .expect("activation should complete")
        .unwrap();

    // The transition yields exactly one pair of long-lived pumps
    assert!(!workers.fc_to_gcs.is_finished());
    assert!(!workers.gcs_to_fc.is_finished());

    // And the first datagram already reached the FC
    let (forwarded, _) = recv_datagram(&fc_peer).await;
    assert_eq!(forwarded, heartbeat_bytes(0));
}

#[tokio::test]
async fn activation_rule_is_deterministic_across_sessions() {
    for _ in 0..2 {
        let h = start_relay().await;
        let qgc = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        qgc.send_to(&[], h.listen_addr).await.unwrap();
        qgc.send_to(&heartbeat_bytes(0), h.listen_addr)
            .await
            .unwrap();
        qgc.send_to(&command_long_bytes(1), h.listen_addr)
            .await
            .unwrap();

        // Same fixture, same decisions: exactly one controller forward
        let _ = recv_datagram(&h.fc_peer).await;
        expect_quiet(&h.fc_peer).await;
        assert_eq!(h.metrics.to_fc_datagrams.load(Ordering::Relaxed), 1);
        assert_eq!(h.metrics.inert_receipts.load(Ordering::Relaxed), 1);
    }
}
