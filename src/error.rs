//! # Error Types
//!
//! Error handling for the relay.
//!
//! This module defines all error variants that can occur while running the
//! relay, from socket failures to configuration problems.
//!
//! ## Error Categories
//! - **I/O Errors**: Socket bind/connect failures
//! - **Transport Errors**: Send/receive failures, tagged with the endpoint role
//! - **Codec Errors**: MAVLink serialization failures
//! - **Configuration Errors**: Missing or invalid configuration
//!
//! A datagram that fails to *parse* is not an error anywhere in the relay:
//! undecodable bytes are still forwarded verbatim and simply skip the
//! diagnostic logging branches.

use std::io;
use thiserror::Error;

use crate::transport::EndpointRole;

/// RelayError is the primary error type for all relay operations
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("transport error on {role}: {source}")]
    Transport {
        role: EndpointRole,
        #[source]
        source: io::Error,
    },

    #[error("endpoint {0} has no peer to send to")]
    NoPeer(EndpointRole),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
