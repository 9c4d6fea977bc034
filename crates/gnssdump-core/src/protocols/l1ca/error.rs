use thiserror::Error;

/// Errors returned by navigation-word bitfield access and subframe decoding.
#[derive(Debug, Error)]
pub enum L1caError {
    #[error("subframe needs 10 navigation words, got {actual}")]
    WordCount { actual: usize },
    #[error("bit range {b0}..={b1} is invalid for {words} 30-bit words")]
    BitRange { b0: u16, b1: u16, words: usize },
}
