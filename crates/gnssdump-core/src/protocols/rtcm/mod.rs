//! RTCM 3.x correction message decoding.

mod error;
mod layout;
mod parser;
mod reader;

pub use error::RtcmError;
pub use parser::{decode_packet, decode_payload};
pub use reader::{BitReader, get_bits, get_bits_u64};
