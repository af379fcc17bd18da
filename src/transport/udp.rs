//! UDP transport for MAVLink forwarding.
//!
//! Mirrors the two connection styles of a MAVLink ground segment: a listen
//! socket (`udpin`) that accepts traffic from any sender, and outbound
//! sockets (`udpout`) bound to an ephemeral port and connected to a fixed
//! peer so that replies flow back on the same five-tuple.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::info;

use crate::error::{RelayError, Result};
use crate::transport::EndpointRole;

/// Largest datagram the relay ever expects to receive.
///
/// A MAVLink v2 frame tops out at 280 bytes; one datagram may carry several
/// frames, so leave generous headroom.
pub const MAX_DATAGRAM: usize = 2048;

/// A role-tagged UDP channel to one relay peer.
///
/// Cloning shares the underlying socket, which is what allows one task to
/// read an endpoint while another writes it.
#[derive(Debug, Clone)]
pub struct UdpEndpoint {
    socket: Arc<UdpSocket>,
    role: EndpointRole,
    peer: Option<SocketAddr>,
}

impl UdpEndpoint {
    /// Bind a listen endpoint (`udpin`) on `addr`.
    ///
    /// A bound endpoint receives from any sender and cannot send.
    pub async fn bind(role: EndpointRole, addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| RelayError::Transport { role, source })?;
        info!(%role, addr = %socket.local_addr()?, "listening");

        Ok(Self {
            socket: Arc::new(socket),
            role,
            peer: None,
        })
    }

    /// Create an outbound endpoint (`udpout`) connected to `peer`.
    ///
    /// Binds an ephemeral local port; receives are filtered to the connected
    /// peer by the OS.
    pub async fn connect(role: EndpointRole, peer: SocketAddr) -> Result<Self> {
        let local = SocketAddr::new(
            if peer.is_ipv4() {
                std::net::Ipv4Addr::UNSPECIFIED.into()
            } else {
                std::net::Ipv6Addr::UNSPECIFIED.into()
            },
            0,
        );

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| RelayError::Transport { role, source })?;
        socket
            .connect(peer)
            .await
            .map_err(|source| RelayError::Transport { role, source })?;
        info!(%role, %peer, local = %socket.local_addr()?, "connected");

        Ok(Self {
            socket: Arc::new(socket),
            role,
            peer: Some(peer),
        })
    }

    /// The peer role this endpoint is tagged with.
    pub fn role(&self) -> EndpointRole {
        self.role
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Block until one datagram arrives; returns the number of bytes read.
    ///
    /// Zero-length datagrams are legal UDP and are returned as `Ok(0)`; the
    /// caller treats them as empty receipts.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        let res = match self.peer {
            Some(_) => self.socket.recv(buf).await,
            None => self.socket.recv_from(buf).await.map(|(n, _)| n),
        };
        res.map_err(|source| RelayError::Transport {
            role: self.role,
            source,
        })
    }

    /// Send one datagram to the connected peer.
    pub async fn send(&self, buf: &[u8]) -> Result<usize> {
        if self.peer.is_none() {
            return Err(RelayError::NoPeer(self.role));
        }
        self.socket
            .send(buf)
            .await
            .map_err(|source| RelayError::Transport {
                role: self.role,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[tokio::test]
    async fn bind_assigns_local_port() {
        let ep = UdpEndpoint::bind(EndpointRole::GcsIn, loopback(0))
            .await
            .unwrap();
        assert_ne!(ep.local_addr().unwrap().port(), 0);
        assert_eq!(ep.role(), EndpointRole::GcsIn);
    }

    #[tokio::test]
    async fn send_on_bound_endpoint_is_rejected() {
        let ep = UdpEndpoint::bind(EndpointRole::GcsIn, loopback(0))
            .await
            .unwrap();
        let err = ep.send(b"x").await.unwrap_err();
        assert!(matches!(err, RelayError::NoPeer(EndpointRole::GcsIn)));
    }

    #[tokio::test]
    async fn connected_endpoint_round_trips() {
        let listener = UdpEndpoint::bind(EndpointRole::GcsIn, loopback(0))
            .await
            .unwrap();
        let out = UdpEndpoint::connect(EndpointRole::Fc, listener.local_addr().unwrap())
            .await
            .unwrap();

        out.send(b"ping").await.unwrap();

        let mut buf = [0u8; 16];
        let n = listener.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
    }
}
