//! # mavlink-relay
//!
//! Transparent MAVLink relay between a ground control station and a flight
//! controller, with diagnostic logging of command traffic.
//!
//! The relay sits between the two ends of a MAVLink session and forwards
//! every datagram verbatim. Startup is single-direction: the controller
//! waits on a listen socket for the first GCS datagram, forwards it to the
//! FC, and only then spawns the two workers that own full-duplex forwarding
//! for the rest of the session.
//!
//! ## Modules
//! - [`relay`]: activation state machine and the two forwarding workers
//! - [`transport`]: role-tagged UDP endpoints for the three peers
//! - [`codec`]: MAVLink frame decode/encode boundary
//! - [`inspect`]: which forwarded frames get logged, and with what fields
//! - [`config`]: three-peer configuration from TOML/JSON
//! - [`error`]: error taxonomy
//! - [`utils`]: boot clock, logging setup, relay counters
//!
//! ## Example
//! ```no_run
//! use mavlink_relay::config::RelayConfig;
//! use mavlink_relay::relay::RelayController;
//!
//! #[tokio::main]
//! async fn main() -> mavlink_relay::error::Result<()> {
//!     let config = RelayConfig::from_file("relay.toml")?;
//!     let controller = RelayController::from_config(&config).await?;
//!     controller.run().await
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod inspect;
pub mod relay;
pub mod transport;
pub mod utils;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use relay::{RelayController, RelayWorkers};
pub use transport::{EndpointRole, UdpEndpoint};
