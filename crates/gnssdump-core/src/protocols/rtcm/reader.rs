//! Big-endian arbitrary-width bitfield access over an RTCM payload.
//!
//! Bit 0 is the most significant bit of byte 0. Fields may span byte
//! boundaries; extraction accumulates byte-at-a-time, masking partial bits
//! at both ends. Signed fields are two's complement over the field width.

use super::error::RtcmError;

/// Extract `width` bits starting at `bit0` as an unsigned value.
pub fn get_bits_u64(payload: &[u8], bit0: usize, width: u32) -> Result<u64, RtcmError> {
    if width == 0 || width > 64 {
        return Err(RtcmError::Width(width));
    }
    let last = bit0 + width as usize - 1;
    if last / 8 >= payload.len() {
        return Err(RtcmError::OutOfRange {
            bit: bit0,
            width,
            bits: payload.len() * 8,
        });
    }
    let mut raw: u64 = 0;
    let mut b0 = bit0;
    loop {
        let byte0 = b0 / 8;
        let bb0 = b0 % 8;
        let bb1 = if last / 8 > byte0 { 7 } else { last % 8 };
        let w = bb1 - bb0 + 1;
        let mask = (1u64 << w) - 1;
        let shift = 7 - bb1;
        raw = (raw << w) | ((u64::from(payload[byte0]) >> shift) & mask);
        b0 = (byte0 + 1) * 8;
        if b0 > last {
            break;
        }
    }
    Ok(raw)
}

/// Extract `width` bits starting at `bit0`, optionally sign-extended.
pub fn get_bits(payload: &[u8], bit0: usize, width: u32, signed: bool) -> Result<i64, RtcmError> {
    let raw = get_bits_u64(payload, bit0, width)?;
    if signed {
        let shift = 64 - width;
        Ok(((raw << shift) as i64) >> shift)
    } else {
        Ok(raw as i64)
    }
}

/// Cursor over a payload's bitstream; advances strictly left to right.
pub struct BitReader<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn take_u64(&mut self, width: u32) -> Result<u64, RtcmError> {
        let raw = get_bits_u64(self.payload, self.pos, width)?;
        self.pos += width as usize;
        Ok(raw)
    }

    pub fn take(&mut self, width: u32, signed: bool) -> Result<i64, RtcmError> {
        let raw = get_bits(self.payload, self.pos, width, signed)?;
        self.pos += width as usize;
        Ok(raw)
    }

    /// Skip reserved bits without decoding them.
    pub fn skip(&mut self, width: u32) -> Result<(), RtcmError> {
        self.take_u64(width).map(|_| ())
    }
}
