//! # Utility Modules
//!
//! Supporting utilities for timing, logging, and metrics.
//!
//! ## Components
//! - **Time**: boot reference clock for relative event timestamps
//! - **Logging**: structured logging configuration
//! - **Metrics**: thread-safe relay counters

pub mod logging;
pub mod metrics;
pub mod time;

pub use metrics::RelayMetrics;
pub use time::BootClock;
