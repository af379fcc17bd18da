//! Forwarding workers.
//!
//! Two independent pumps, one per direction, each blocking only on its
//! source endpoint's receive. Forwarding is always the verbatim datagram;
//! decoding happens on the side for diagnostics.
//!
//! A transport failure is fatal to the pump that hits it: logged, then
//! propagated as the task's error. There is no retry and no supervisor, so
//! one dead pump silently halves the relay while the process keeps running.

use std::sync::Arc;

use tracing::error;

use crate::codec;
use crate::error::Result;
use crate::inspect::{self, Source};
use crate::transport::udp::MAX_DATAGRAM;
use crate::transport::UdpEndpoint;
use crate::utils::{BootClock, RelayMetrics};

/// Relay FC traffic to the GCS, logging command acknowledgments.
pub async fn pump_fc_to_gcs(
    fc: UdpEndpoint,
    gcs_out: UdpEndpoint,
    clock: BootClock,
    metrics: Arc<RelayMetrics>,
) -> Result<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let n = match fc.recv(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, direction = "fc->gcs", "forwarding stopped");
                return Err(e);
            }
        };
        if n == 0 {
            metrics.record_empty();
            continue;
        }

        let datagram = &buf[..n];
        for frame in codec::decode_all(datagram) {
            inspect::log_forwarded(Source::Fc, clock.elapsed_micros(), &frame);
        }

        if let Err(e) = gcs_out.send(datagram).await {
            error!(error = %e, direction = "fc->gcs", "forwarding stopped");
            return Err(e);
        }
        metrics.record_to_gcs(n);
    }
}

/// Relay GCS traffic to the FC, logging command details.
pub async fn pump_gcs_to_fc(
    gcs_out: UdpEndpoint,
    fc: UdpEndpoint,
    clock: BootClock,
    metrics: Arc<RelayMetrics>,
) -> Result<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let n = match gcs_out.recv(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, direction = "gcs->fc", "forwarding stopped");
                return Err(e);
            }
        };
        if n == 0 {
            metrics.record_empty();
            continue;
        }

        let datagram = &buf[..n];
        for frame in codec::decode_all(datagram) {
            inspect::log_forwarded(Source::Gcs, clock.elapsed_micros(), &frame);
        }

        if let Err(e) = fc.send(datagram).await {
            error!(error = %e, direction = "gcs->fc", "forwarding stopped");
            return Err(e);
        }
        metrics.record_to_fc(n);
    }
}
