//! GPS L1 C/A navigation message decoding (subframes 1-3).

mod error;
mod layout;
mod parser;
mod reader;

pub use error::L1caError;
pub use parser::decode_subframe;
pub use reader::{WORDS_PER_SUBFRAME, get_bits, get_multi_bits};
