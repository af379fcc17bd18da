//! # Endpoint Transports
//!
//! UDP datagram channels for the three relay peers.
//!
//! ## Components
//! - **UdpEndpoint**: a role-tagged wrapper over a tokio UDP socket, either
//!   bound (listen, receive from anyone) or connected (fixed peer)
//!
//! Each endpoint is read by exactly one task and written by at most one task;
//! endpoints are cheap to clone (the socket is behind an `Arc`) so a single
//! socket can be split between a reading task and a writing task.

pub mod udp;

pub use udp::UdpEndpoint;

use std::fmt;

/// Which of the three relay peers an endpoint talks to.
///
/// Carried on every transport error and diagnostic log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    /// Local listen socket the GCS sends its first traffic to.
    GcsIn,
    /// Outbound socket connected to the GCS address.
    GcsOut,
    /// Outbound socket connected to the flight controller.
    Fc,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointRole::GcsIn => "gcs-in",
            EndpointRole::GcsOut => "gcs-out",
            EndpointRole::Fc => "fc",
        };
        f.write_str(name)
    }
}
