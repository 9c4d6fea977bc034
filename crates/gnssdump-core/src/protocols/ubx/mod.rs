//! UBX receiver-binary protocol: catalogue-driven packet decoding.

mod error;
mod reader;

pub mod catalog;
pub mod layout;
pub mod parser;

pub use error::UbxError;
pub use layout::{CompiledLayout, FieldDef, Prim, Scale, compile};
pub use parser::{decode_packet, decode_with_layout};
pub use reader::UbxReader;
