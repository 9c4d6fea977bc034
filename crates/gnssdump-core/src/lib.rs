//! Core decoding library for mixed GNSS receiver streams.
//!
//! A receiver capture interleaves three framed protocols: ASCII NMEA
//! sentences, the binary UBX protocol (class/id/length framing), and RTCM3
//! correction messages. This crate implements the offline decoding pipeline
//! used by the CLI: a byte source feeds the stream framer, which slices the
//! stream into [`RawPacket`]s and hands them to protocol decoders
//! (layout/reader/parser) that produce structured, physically scaled
//! [`DecodedRecord`]s. Parsing is byte-oriented and side-effect free; all
//! I/O is isolated in the `source` module. Wire-format conventions are
//! captured in per-protocol readers so parsers stay minimal.
//!
//! Invariants:
//! - The framer consumes exactly one packet's byte span per call, even when
//!   the packet's checksum fails or its type is unrecognized.
//! - Compiled field layouts are immutable and shared; nested decodes extend
//!   a copy, never the cached layout.
//! - Repeating-block row counts divide the payload exactly; a remainder is
//!   a layout error, never a silent truncation.
//!
//! # Examples
//! ```
//! use gnssdump_core::{Framed, Framer, Protocol, ReaderSource};
//!
//! // UBX-NAV-EOE: sync, class 0x01, id 0x61, 4-byte payload, checksum.
//! let bytes = [
//!     0xb5u8, 0x62, 0x01, 0x61, 0x04, 0x00, 0x10, 0x27, 0x00, 0x00, 0x9d, 0x7c,
//! ];
//! let mut framer = Framer::new(ReaderSource::new(&bytes[..]));
//! let framed = framer.next_packet()?.expect("one packet");
//! match framed {
//!     Framed::Packet(packet) => assert_eq!(packet.protocol, Protocol::Ubx),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # Ok::<(), gnssdump_core::FramerError>(())
//! ```

use std::sync::Arc;

use serde::Serialize;

mod framer;
pub mod protocols;
mod source;

pub use framer::{Framed, Framer, FramerError, Validators, crc24q, ubx_checksum};
pub use source::{ByteSource, FileSource, ReaderSource, SourceError};

pub use protocols::ubx::CompiledLayout;

/// Framed wire protocol of a [`RawPacket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Protocol {
    /// ASCII NMEA 0183 sentence (`$...*hh\r\n`).
    Nmea,
    /// UBX receiver-binary packet (`0xB5 0x62` sync, class/id/length).
    Ubx,
    /// RTCM 3.x correction message (`0xD3` preamble, CRC-24Q trailer).
    Rtcm3,
}

/// One framed packet, exactly as it appeared on the wire.
///
/// Created by the framer, consumed by exactly one decoder. `bytes` holds the
/// complete span including sync bytes and checksum; [`RawPacket::payload`]
/// slices out the protocol payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawPacket {
    pub protocol: Protocol,
    pub bytes: Vec<u8>,
    /// UBX message class, when the protocol carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<u8>,
    /// UBX message id, when the protocol carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u8>,
}

impl RawPacket {
    /// Protocol payload: the framed bytes minus sync/header/checksum.
    pub fn payload(&self) -> &[u8] {
        match self.protocol {
            Protocol::Nmea => &self.bytes,
            Protocol::Ubx => &self.bytes[6..self.bytes.len() - 2],
            Protocol::Rtcm3 => &self.bytes[3..self.bytes.len() - 3],
        }
    }

    /// NMEA sentence text, trimmed of the trailing terminator.
    ///
    /// Only meaningful for [`Protocol::Nmea`] packets; bytes outside ASCII
    /// are replaced rather than rejected, since framing already validated
    /// the sentence shape.
    pub fn sentence(&self) -> String {
        String::from_utf8_lossy(&self.bytes).trim_end().to_string()
    }
}

/// A decoded scalar value with its physical scaling applied.
///
/// # Examples
/// ```
/// use gnssdump_core::Value;
///
/// assert_eq!(Value::Int(42).as_i64(), Some(42));
/// assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Enumerated value mapped through a per-field symbol table.
    Symbol(&'static str),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// A named, scaled value with an optional physical unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub name: &'static str,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

/// All values of one repeating-block field, in row order.
///
/// The wire layout is row-major; the in-memory representation is
/// column-major so all values of one field can be read together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub values: Vec<Value>,
}

/// Catalogue key of a decoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum MessageKey {
    Ubx { class: u8, id: u8 },
    Rtcm { msg_num: u16 },
}

/// A fully decoded message: fixed header fields, an optional N-row
/// columnar block, and optional footer fields.
///
/// Lookup is by field name, never by position: which fields exist is a
/// runtime property of the compiled layout, not a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    /// Human-readable message name, e.g. `UBX-NAV-PVT` or `RTCM-1005`.
    pub message: String,
    pub key: MessageKey,
    /// Number of repeating-block rows (0 when the message has no block).
    pub n_rows: usize,
    pub header: Vec<FieldValue>,
    pub block: Vec<Column>,
    pub footer: Vec<FieldValue>,
    /// Raw payload kept for re-decoding and hex-dump rendering.
    #[serde(skip)]
    pub raw_payload: Vec<u8>,
    /// The layout this record was decoded with, when one exists.
    #[serde(skip)]
    pub layout: Option<Arc<CompiledLayout>>,
}

impl DecodedRecord {
    /// Look up a header or footer value by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.header
            .iter()
            .chain(self.footer.iter())
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// Look up a repeating-block column by field name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.block.iter().find(|c| c.name == name)
    }
}

/// One decoded GPS L1 C/A navigation subframe (subframes 1-3).
///
/// Each subframe yields exactly one flat record; there is no repeating
/// block inside a subframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedSubframe {
    pub subframe: u8,
    pub fields: Vec<FieldValue>,
}

impl DecodedSubframe {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubx_payload_strips_framing() {
        let packet = RawPacket {
            protocol: Protocol::Ubx,
            bytes: vec![0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x02, 0x03, 0x0d, 0x32],
            class: Some(0x05),
            id: Some(0x01),
        };
        assert_eq!(packet.payload(), &[0x02, 0x03]);
    }

    #[test]
    fn rtcm_payload_strips_header_and_crc() {
        let packet = RawPacket {
            protocol: Protocol::Rtcm3,
            bytes: vec![0xd3, 0x00, 0x02, 0xaa, 0xbb, 0x01, 0x02, 0x03],
            class: None,
            id: None,
        };
        assert_eq!(packet.payload(), &[0xaa, 0xbb]);
    }

    #[test]
    fn record_lookup_by_name() {
        let record = DecodedRecord {
            message: "UBX-NAV-EOE".to_string(),
            key: MessageKey::Ubx {
                class: 0x01,
                id: 0x61,
            },
            n_rows: 0,
            header: vec![FieldValue {
                name: "iTOW",
                value: Value::Int(10_000),
                unit: Some("ms"),
            }],
            block: vec![],
            footer: vec![],
            raw_payload: vec![],
            layout: None,
        };
        assert_eq!(record.get("iTOW"), Some(&Value::Int(10_000)));
        assert_eq!(record.get("missing"), None);
        assert!(record.column("iTOW").is_none());
    }
}
