//! Bitfield access over 30-bit GPS navigation words.
//!
//! Bit numbering follows the interface-control convention: bit 1 is the
//! most significant data bit of `words[0]`, bit 31 of `words[1]`, and so
//! on. Each word carries 30 significant bits in its low bits; the top two
//! bits of the carrier word are ignored. Fields never cross a word
//! boundary, because parity delimits every word.

use super::error::L1caError;

pub const WORDS_PER_SUBFRAME: usize = 10;

const BITS_PER_WORD: u16 = 30;
const WORD_MASK: u32 = (1 << BITS_PER_WORD) - 1;

/// Extract the inclusive 1-indexed bit range `b0..=b1` from one word.
pub fn get_bits(words: &[u32], b0: u16, b1: u16) -> Result<u32, L1caError> {
    let out_of_range = || L1caError::BitRange {
        b0,
        b1,
        words: words.len(),
    };
    if b0 == 0 || b1 < b0 {
        return Err(out_of_range());
    }
    let word_index = usize::from((b0 - 1) / BITS_PER_WORD);
    let rel0 = b0 - word_index as u16 * BITS_PER_WORD;
    let rel1 = b1 - word_index as u16 * BITS_PER_WORD;
    if rel1 > BITS_PER_WORD {
        // A range crossing a word boundary has no wire meaning.
        return Err(out_of_range());
    }
    let word = words.get(word_index).copied().ok_or_else(out_of_range)? & WORD_MASK;
    let width = rel1 - rel0 + 1;
    let shift = BITS_PER_WORD - rel1;
    let mask = if width >= BITS_PER_WORD {
        WORD_MASK
    } else {
        (1u32 << width) - 1
    };
    Ok((word >> shift) & mask)
}

/// Concatenate discontiguous parts MSB-first, then sign-extend over the
/// total concatenated width when `signed`.
pub fn get_multi_bits(
    words: &[u32],
    parts: &[(u16, u16)],
    signed: bool,
) -> Result<i64, L1caError> {
    let mut result: i64 = 0;
    let mut width: u32 = 0;
    for &(b0, b1) in parts {
        // get_bits validates the range, so the width cannot underflow.
        let part = get_bits(words, b0, b1)?;
        let part_width = u32::from(b1 - b0 + 1);
        result = (result << part_width) | i64::from(part);
        width += part_width;
    }
    if signed && width > 0 {
        let cutoff = 1i64 << (width - 1);
        if result >= cutoff {
            result -= 2 * cutoff;
        }
    }
    Ok(result)
}
