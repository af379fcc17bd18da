//! # Relay Engine
//!
//! The bypass engine: activation state machine, primary loop, and the two
//! forwarding workers.
//!
//! ## Components
//! - **Controller**: owns the three endpoints, performs the one-time
//!   activation handoff, then drains the listen socket
//! - **Workers**: the two long-lived one-way forwarding pumps

pub mod controller;
pub mod worker;

pub use controller::{RelayController, RelayWorkers};
