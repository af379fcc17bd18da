//! # Diagnostic Inspection
//!
//! Selection logic and field extraction for forwarded messages.
//!
//! The relay forwards everything verbatim; this module decides which
//! forwarded frames deserve a log line and what fields that line carries.
//!
//! ## Selection Rules
//! - FC direction: only COMMAND_ACK is logged
//! - GCS direction: everything except HEARTBEAT is logged; COMMAND_LONG and
//!   COMMAND_INT additionally get their full field set dumped
//!
//! Extracted values are logged verbatim — no validation, no clamping — so a
//! trace faithfully reflects whatever the GCS actually sent, including
//! out-of-spec values.

use std::fmt;

use mavlink::common::{MavMessage, COMMAND_INT_DATA, COMMAND_LONG_DATA};
use tracing::info;

use crate::codec::{Frame, MessageKind};

/// Which side of the relay a forwarded frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Fc,
    Gcs,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Fc => f.write_str("FC"),
            Source::Gcs => f.write_str("GCS"),
        }
    }
}

/// Whether a forwarded frame of this kind gets a type log line.
pub fn should_log(source: Source, kind: MessageKind) -> bool {
    match source {
        Source::Fc => kind == MessageKind::CommandAck,
        Source::Gcs => !kind.is_heartbeat(),
    }
}

/// Fixed extraction profile for COMMAND_LONG.
#[derive(Debug, Clone, PartialEq)]
pub struct LongCommandRecord {
    pub command: u32,
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub param5: f32,
    pub param6: f32,
    pub param7: f32,
    pub target_system: u8,
    pub target_component: u8,
    pub confirmation: u8,
}

impl From<&COMMAND_LONG_DATA> for LongCommandRecord {
    fn from(data: &COMMAND_LONG_DATA) -> Self {
        Self {
            command: data.command as u32,
            param1: data.param1,
            param2: data.param2,
            param3: data.param3,
            param4: data.param4,
            param5: data.param5,
            param6: data.param6,
            param7: data.param7,
            target_system: data.target_system,
            target_component: data.target_component,
            confirmation: data.confirmation,
        }
    }
}

/// Fixed extraction profile for COMMAND_INT.
#[derive(Debug, Clone, PartialEq)]
pub struct IntCommandRecord {
    pub command: u32,
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    /// Latitude or local X, per the frame field
    pub x: i32,
    /// Longitude or local Y
    pub y: i32,
    /// Altitude or local Z
    pub z: f32,
    pub target_system: u8,
    pub target_component: u8,
    pub frame: u32,
    pub current: u8,
    pub autocontinue: u8,
}

impl From<&COMMAND_INT_DATA> for IntCommandRecord {
    fn from(data: &COMMAND_INT_DATA) -> Self {
        Self {
            command: data.command as u32,
            param1: data.param1,
            param2: data.param2,
            param3: data.param3,
            param4: data.param4,
            x: data.x,
            y: data.y,
            z: data.z,
            target_system: data.target_system,
            target_component: data.target_component,
            frame: data.frame as u32,
            current: data.current,
            autocontinue: data.autocontinue,
        }
    }
}

/// Log one forwarded frame according to the selection rules.
pub fn log_forwarded(source: Source, elapsed_us: u64, frame: &Frame) {
    let kind = frame.kind();
    if !should_log(source, kind) {
        return;
    }

    info!(source = %source, t_us = elapsed_us, kind = %kind, "forwarded");

    if source != Source::Gcs {
        return;
    }

    match &frame.message {
        MavMessage::COMMAND_LONG(data) => {
            let r = LongCommandRecord::from(data);
            info!(
                command = r.command,
                param1 = ?r.param1,
                param2 = ?r.param2,
                param3 = ?r.param3,
                param4 = ?r.param4,
                param5 = ?r.param5,
                param6 = ?r.param6,
                param7 = ?r.param7,
                target_system = r.target_system,
                target_component = r.target_component,
                confirmation = r.confirmation,
                "COMMAND_LONG received"
            );
        }
        MavMessage::COMMAND_INT(data) => {
            let r = IntCommandRecord::from(data);
            info!(
                command = r.command,
                param1 = ?r.param1,
                param2 = ?r.param2,
                param3 = ?r.param3,
                param4 = ?r.param4,
                x = r.x,
                y = r.y,
                z = ?r.z,
                target_system = r.target_system,
                target_component = r.target_component,
                frame = r.frame,
                current = r.current,
                autocontinue = r.autocontinue,
                "COMMAND_INT received"
            );
        }
        _ => {}
    }
}

/// Log the first GCS message that activates the relay.
///
/// Heartbeats still activate but are suppressed from the type log, matching
/// the forwarding-path rule for GCS traffic.
pub fn log_activation_receipt(elapsed_us: u64, frame: &Frame) {
    let kind = frame.kind();
    if kind.is_heartbeat() {
        return;
    }
    info!(t_us = elapsed_us, kind = %kind, "first gcs message");
}
