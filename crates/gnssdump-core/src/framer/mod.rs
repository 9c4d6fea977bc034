//! Stream framer: classifies and slices one packet per call.
//!
//! The framer peeks a single byte to classify the next packet, then consumes
//! exactly that packet's byte span. Consumption is exact even when the
//! checksum fails or the bytes are unrecognized; mis-consumption would
//! desynchronize all subsequent framing. There is no pushback: a stray sync
//! byte immediately before a real packet causes that packet to be skipped.

mod checksum;

pub use checksum::{Validators, crc24q, ubx_checksum};

use thiserror::Error;
use tracing::{debug, warn};

use crate::source::{ByteSource, SourceError};
use crate::{Protocol, RawPacket};

/// UBX sync bytes.
const UBX_SYNC1: u8 = 0xb5;
const UBX_SYNC2: u8 = 0x62;
/// RTCM3 frame preamble.
const RTCM_PREAMBLE: u8 = 0xd3;
/// NMEA sentence start.
const NMEA_START: u8 = b'$';
/// Upper bound on an NMEA sentence span; anything longer is garbage.
const NMEA_MAX_LEN: usize = 512;

/// Outcome of one framing step.
///
/// Checksum failures and unrecognized bytes are per-packet outcomes, not
/// errors: the stream position is already past them and framing continues.
#[derive(Debug, Clone, PartialEq)]
pub enum Framed {
    /// A complete, checksum-valid packet.
    Packet(RawPacket),
    /// A complete packet whose checksum failed; its bytes are consumed.
    ChecksumFailed { protocol: Protocol, bytes: Vec<u8> },
    /// Bytes that match no known framing; `consumed` bytes were skipped.
    Unrecognized { consumed: usize },
}

#[derive(Debug, Error)]
pub enum FramerError {
    /// End of stream in the middle of a packet. Fatal to the stream.
    #[error("truncated {0:?} packet at end of stream")]
    Truncated(Protocol),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

/// Pull-based packet framer over a [`ByteSource`].
///
/// # Examples
/// ```
/// use gnssdump_core::{Framed, Framer, ReaderSource};
///
/// let mut framer = Framer::new(ReaderSource::new(&[0xffu8][..]));
/// let framed = framer.next_packet().unwrap().unwrap();
/// assert_eq!(framed, Framed::Unrecognized { consumed: 1 });
/// assert!(framer.next_packet().unwrap().is_none());
/// ```
pub struct Framer<S: ByteSource> {
    source: S,
    validators: Validators,
}

impl<S: ByteSource> Framer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            validators: Validators::default(),
        }
    }

    /// Replace the per-protocol checksum hooks.
    pub fn with_validators(source: S, validators: Validators) -> Self {
        Self { source, validators }
    }

    /// Frame the next packet, or `None` at a clean end of stream.
    ///
    /// # Errors
    /// [`FramerError::Truncated`] when the stream ends mid-packet; source
    /// failures are passed through. Both are fatal to the stream.
    pub fn next_packet(&mut self) -> Result<Option<Framed>, FramerError> {
        let Some(first) = self.source.next_byte()? else {
            return Ok(None);
        };
        match first {
            NMEA_START => self.frame_nmea().map(Some),
            UBX_SYNC1 => self.frame_ubx().map(Some),
            RTCM_PREAMBLE => self.frame_rtcm().map(Some),
            other => {
                debug!(byte = format_args!("{other:#04x}"), "unrecognized sync byte");
                Ok(Some(Framed::Unrecognized { consumed: 1 }))
            }
        }
    }

    fn frame_nmea(&mut self) -> Result<Framed, FramerError> {
        let mut bytes = vec![NMEA_START];
        // Read up to and including the '*' that ends the sentence body.
        loop {
            let byte = self.must_byte(Protocol::Nmea)?;
            bytes.push(byte);
            if byte == b'*' {
                break;
            }
            if bytes.len() > NMEA_MAX_LEN {
                warn!(len = bytes.len(), "overlong NMEA sentence, skipping");
                return Ok(Framed::Unrecognized {
                    consumed: bytes.len(),
                });
            }
        }
        // Either the CR/LF terminator or two checksum hex digits.
        let mut tail = [0u8; 2];
        self.must_exact(&mut tail, Protocol::Nmea)?;
        bytes.extend_from_slice(&tail);
        let has_checksum = tail != [b'\r', b'\n'];
        if has_checksum {
            self.must_exact(&mut tail, Protocol::Nmea)?;
            bytes.extend_from_slice(&tail);
        }
        if !(self.validators.nmea)(&bytes, has_checksum) {
            warn!("NMEA checksum failed, sentence discarded");
            return Ok(Framed::ChecksumFailed {
                protocol: Protocol::Nmea,
                bytes,
            });
        }
        Ok(Framed::Packet(RawPacket {
            protocol: Protocol::Nmea,
            bytes,
            class: None,
            id: None,
        }))
    }

    fn frame_ubx(&mut self) -> Result<Framed, FramerError> {
        let sync2 = self.must_byte(Protocol::Ubx)?;
        if sync2 != UBX_SYNC2 {
            // Two bytes are gone; a real packet hiding behind a stray 0xb5
            // is skipped. See the module docs.
            debug!("0xb5 not followed by 0x62, skipping 2 bytes");
            return Ok(Framed::Unrecognized { consumed: 2 });
        }
        let mut header = [0u8; 4];
        self.must_exact(&mut header, Protocol::Ubx)?;
        let length = u16::from_le_bytes([header[2], header[3]]) as usize;

        let mut bytes = vec![UBX_SYNC1, UBX_SYNC2];
        bytes.extend_from_slice(&header);
        let mut rest = vec![0u8; length + 2];
        self.must_exact(&mut rest, Protocol::Ubx)?;
        bytes.extend_from_slice(&rest);

        if !(self.validators.ubx)(&bytes) {
            warn!(
                class = format_args!("{:#04x}", header[0]),
                id = format_args!("{:#04x}", header[1]),
                "UBX checksum failed, packet discarded"
            );
            return Ok(Framed::ChecksumFailed {
                protocol: Protocol::Ubx,
                bytes,
            });
        }
        Ok(Framed::Packet(RawPacket {
            protocol: Protocol::Ubx,
            bytes,
            class: Some(header[0]),
            id: Some(header[1]),
        }))
    }

    fn frame_rtcm(&mut self) -> Result<Framed, FramerError> {
        let mut header = [0u8; 2];
        self.must_exact(&mut header, Protocol::Rtcm3)?;
        // Length is the low 10 bits of the big-endian u16.
        let length = (u16::from_be_bytes(header) & 0x03ff) as usize;

        let mut bytes = vec![RTCM_PREAMBLE, header[0], header[1]];
        let mut rest = vec![0u8; length + 3];
        self.must_exact(&mut rest, Protocol::Rtcm3)?;
        bytes.extend_from_slice(&rest);

        if !(self.validators.rtcm)(&bytes) {
            warn!(len = length, "RTCM CRC failed, message discarded");
            return Ok(Framed::ChecksumFailed {
                protocol: Protocol::Rtcm3,
                bytes,
            });
        }
        Ok(Framed::Packet(RawPacket {
            protocol: Protocol::Rtcm3,
            bytes,
            class: None,
            id: None,
        }))
    }

    fn must_byte(&mut self, protocol: Protocol) -> Result<u8, FramerError> {
        self.source
            .next_byte()?
            .ok_or(FramerError::Truncated(protocol))
    }

    fn must_exact(&mut self, buf: &mut [u8], protocol: Protocol) -> Result<(), FramerError> {
        self.source.read_exact(buf).map_err(|err| match err {
            SourceError::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                FramerError::Truncated(protocol)
            }
            other => FramerError::Source(other),
        })
    }
}
