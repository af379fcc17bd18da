//! # MAVLink Codec Boundary
//!
//! Decodes raw datagrams into typed MAVLink frames for inspection, and
//! re-encodes typed messages back to raw bytes.
//!
//! The relay never re-encodes what it forwards — forwarding is always the
//! verbatim datagram — so decoding here serves the diagnostic path only.
//! Bytes that do not parse produce no frames and no errors.
//!
//! ## Wire Format
//! A datagram holds one or more MAVLink frames, v1 (magic `0xFE`) or v2
//! (magic `0xFD`), each `[magic][len][...][payload][crc]`, with an optional
//! 13-byte signature on v2 frames.

use std::fmt;
use std::io::Cursor;

use mavlink::common::MavMessage;
use mavlink::peek_reader::PeekReader;
use mavlink::{MavHeader, Message};

use crate::error::{RelayError, Result};

/// MAVLink v1 frame start byte.
pub const MAGIC_V1: u8 = 0xFE;
/// MAVLink v2 frame start byte.
pub const MAGIC_V2: u8 = 0xFD;

/// The type discriminant the diagnostic selection keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Periodic liveness message, excluded from verbose logging
    Heartbeat,
    /// Confirmation of a prior command
    CommandAck,
    /// Free-form command with seven numeric parameters
    CommandLong,
    /// Positional command with x/y/z framing
    CommandInt,
    /// Any other message, carried by numeric id
    Other(u32),
}

impl MessageKind {
    /// Classify a decoded message.
    pub fn of(message: &MavMessage) -> Self {
        match message {
            MavMessage::HEARTBEAT(_) => MessageKind::Heartbeat,
            MavMessage::COMMAND_ACK(_) => MessageKind::CommandAck,
            MavMessage::COMMAND_LONG(_) => MessageKind::CommandLong,
            MavMessage::COMMAND_INT(_) => MessageKind::CommandInt,
            other => MessageKind::Other(other.message_id()),
        }
    }

    /// Keep-alive traffic is suppressed from type logging.
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, MessageKind::Heartbeat)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Heartbeat => f.write_str("HEARTBEAT"),
            MessageKind::CommandAck => f.write_str("COMMAND_ACK"),
            MessageKind::CommandLong => f.write_str("COMMAND_LONG"),
            MessageKind::CommandInt => f.write_str("COMMAND_INT"),
            MessageKind::Other(id) => write!(f, "MSG_{id}"),
        }
    }
}

/// One decoded MAVLink frame.
///
/// Transient — built on receipt for inspection and discarded after the
/// datagram is forwarded.
#[derive(Debug, Clone)]
pub struct Frame {
    pub header: MavHeader,
    pub message: MavMessage,
}

impl Frame {
    pub fn kind(&self) -> MessageKind {
        MessageKind::of(&self.message)
    }
}

/// Decode every parseable frame from one datagram.
///
/// Scans for frame magic bytes, sizes each candidate from its header, and
/// parses it with rust-mavlink. A candidate that fails to parse (bad CRC,
/// unknown id, stray magic byte inside another frame) is skipped by
/// resynchronizing one byte past the false start.
pub fn decode_all(data: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut rest = data;

    while let Some(pos) = rest.iter().position(|&b| b == MAGIC_V1 || b == MAGIC_V2) {
        rest = &rest[pos..];
        if rest.len() < 2 {
            break;
        }

        let magic = rest[0];
        let payload_len = rest[1] as usize;
        let frame_size = if magic == MAGIC_V2 {
            let base = 12 + payload_len;
            // v2 signed: incompat_flags bit 0 adds a 13-byte signature
            if rest.len() >= 3 && (rest[2] & 0x01) != 0 {
                base + 13
            } else {
                base
            }
        } else {
            8 + payload_len
        };

        if rest.len() < frame_size {
            rest = &rest[1..];
            continue;
        }

        let candidate = &rest[..frame_size];
        let mut reader = PeekReader::new(Cursor::new(candidate));
        let parsed = if magic == MAGIC_V2 {
            mavlink::read_v2_msg::<MavMessage, _>(&mut reader)
        } else {
            mavlink::read_v1_msg::<MavMessage, _>(&mut reader)
        };

        match parsed {
            Ok((header, message)) => {
                frames.push(Frame { header, message });
                rest = &rest[frame_size..];
            }
            Err(_) => {
                rest = &rest[1..];
            }
        }
    }

    frames
}

/// Serialize one message as a MAVLink v2 frame.
pub fn encode(header: MavHeader, message: &MavMessage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::with_capacity(280));
    mavlink::write_v2_msg(&mut buf, header, message)
        .map_err(|e| RelayError::Codec(format!("{e:?}")))?;
    Ok(buf.into_inner())
}
