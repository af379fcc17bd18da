//! Relay controller and activation state machine.
//!
//! The controller owns all three endpoints and runs the startup phase: it
//! blocks on the listen socket until the GCS sends its first datagram,
//! forwards that datagram to the FC, and hands the forwarding paths to two
//! spawned workers. The activation transition happens exactly once, as
//! control flow rather than a shared flag: `wait_for_activation` consumes
//! the pre-activation phase and returns the worker handles.
//!
//! After activation the primary loop keeps consuming the listen socket
//! without forwarding. The GCS keeps addressing this socket even though
//! replies now flow over the connected gcs-out socket, so draining it keeps
//! the kernel buffer from filling; those receipts are counted and dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::codec;
use crate::config::RelayConfig;
use crate::error::Result;
use crate::inspect;
use crate::relay::worker;
use crate::transport::udp::MAX_DATAGRAM;
use crate::transport::{EndpointRole, UdpEndpoint};
use crate::utils::{BootClock, RelayMetrics};

/// Handles of the two forwarding workers, returned by the activation
/// transition. Exactly one pair exists per relay session.
pub struct RelayWorkers {
    pub fc_to_gcs: JoinHandle<Result<()>>,
    pub gcs_to_fc: JoinHandle<Result<()>>,
}

/// Owns the three endpoints and the activation state machine.
pub struct RelayController {
    gcs_in: UdpEndpoint,
    gcs_out: UdpEndpoint,
    fc: UdpEndpoint,
    clock: BootClock,
    metrics: Arc<RelayMetrics>,
}

impl RelayController {
    /// Build the three endpoints from configuration.
    pub async fn from_config(config: &RelayConfig) -> Result<Self> {
        let gcs_in = UdpEndpoint::bind(EndpointRole::GcsIn, config.listen.socket_addr()?).await?;
        let gcs_out = UdpEndpoint::connect(EndpointRole::GcsOut, config.gcs.socket_addr()?).await?;
        let fc = UdpEndpoint::connect(EndpointRole::Fc, config.fc.socket_addr()?).await?;

        Ok(Self::new(gcs_in, gcs_out, fc))
    }

    /// Assemble a controller from pre-built endpoints.
    pub fn new(gcs_in: UdpEndpoint, gcs_out: UdpEndpoint, fc: UdpEndpoint) -> Self {
        Self {
            gcs_in,
            gcs_out,
            fc,
            clock: BootClock::start(),
            metrics: Arc::new(RelayMetrics::new()),
        }
    }

    /// Shared counters for this relay session.
    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Address of the listen socket (useful when bound to port 0).
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.gcs_in.local_addr()
    }

    /// Run the relay forever.
    ///
    /// Returns only on an unrecoverable transport failure on the primary
    /// loop's own socket.
    pub async fn run(mut self) -> Result<()> {
        let workers = self.wait_for_activation().await?;
        self.drain(workers).await
    }

    /// Block until the first non-empty GCS datagram, forward it to the FC,
    /// and start the two forwarding workers.
    ///
    /// This is the one and only activation transition: the workers are
    /// spawned on the single return path, so spawn-once is structural.
    pub async fn wait_for_activation(&mut self) -> Result<RelayWorkers> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let n = self.gcs_in.recv(&mut buf).await?;
            if n == 0 {
                self.metrics.record_empty();
                continue;
            }

            let datagram = &buf[..n];
            for frame in codec::decode_all(datagram) {
                inspect::log_activation_receipt(self.clock.elapsed_micros(), &frame);
            }

            self.fc.send(datagram).await?;
            self.metrics.record_to_fc(n);

            info!(t_us = self.clock.elapsed_micros(), "relay activated");
            return Ok(self.spawn_workers());
        }
    }

    fn spawn_workers(&self) -> RelayWorkers {
        let fc_to_gcs = tokio::spawn(worker::pump_fc_to_gcs(
            self.fc.clone(),
            self.gcs_out.clone(),
            self.clock,
            Arc::clone(&self.metrics),
        ));
        let gcs_to_fc = tokio::spawn(worker::pump_gcs_to_fc(
            self.gcs_out.clone(),
            self.fc.clone(),
            self.clock,
            Arc::clone(&self.metrics),
        ));

        RelayWorkers {
            fc_to_gcs,
            gcs_to_fc,
        }
    }

    /// Post-activation primary loop: consume listen-socket receipts without
    /// forwarding. Holding `workers` here keeps ownership of the forwarding
    /// tasks with the controller for the life of the session.
    async fn drain(&mut self, workers: RelayWorkers) -> Result<()> {
        let _workers = workers;
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let n = match self.gcs_in.recv(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.metrics.log_summary();
                    return Err(e);
                }
            };
            if n == 0 {
                self.metrics.record_empty();
                continue;
            }
            self.metrics.record_inert();
            debug!(bytes = n, "gcs-in receipt after activation, not forwarded");
        }
    }
}
