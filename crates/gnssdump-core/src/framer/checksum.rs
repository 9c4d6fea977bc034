//! Per-protocol integrity checks.
//!
//! The framer calls these through [`Validators`] so callers can swap in
//! their own hooks (for instance, an always-true validator when replaying
//! known-corrupt captures). Each function takes the complete framed byte
//! span, sync bytes and trailer included.

/// Swappable per-protocol checksum hooks used by the framer.
#[derive(Debug, Clone, Copy)]
pub struct Validators {
    /// Full UBX frame, including sync and the 2-byte checksum.
    pub ubx: fn(&[u8]) -> bool,
    /// Full NMEA sentence span; the flag says whether a checksum is present.
    pub nmea: fn(&[u8], bool) -> bool,
    /// Full RTCM3 frame, including header and the 3-byte CRC.
    pub rtcm: fn(&[u8]) -> bool,
}

impl Default for Validators {
    fn default() -> Self {
        Self {
            ubx: ubx_valid,
            nmea: nmea_valid,
            rtcm: rtcm_valid,
        }
    }
}

impl Validators {
    /// Validators that accept everything, for replaying corrupt captures.
    pub fn permissive() -> Self {
        Self {
            ubx: |_| true,
            nmea: |_, _| true,
            rtcm: |_| true,
        }
    }
}

/// 8-bit Fletcher checksum over the class/id/length/payload span.
pub fn ubx_checksum(body: &[u8]) -> (u8, u8) {
    let mut ck_a = 0u8;
    let mut ck_b = 0u8;
    for &byte in body {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    (ck_a, ck_b)
}

fn ubx_valid(frame: &[u8]) -> bool {
    if frame.len() < 8 {
        return false;
    }
    let body_end = frame.len() - 2;
    let (ck_a, ck_b) = ubx_checksum(&frame[2..body_end]);
    frame[body_end] == ck_a && frame[body_end + 1] == ck_b
}

/// XOR checksum of the bytes between `$` and `*`, exclusive.
fn nmea_valid(sentence: &[u8], has_checksum: bool) -> bool {
    if !has_checksum {
        return true;
    }
    let Some(star) = sentence.iter().rposition(|&b| b == b'*') else {
        return false;
    };
    if sentence.len() < star + 3 {
        return false;
    }
    let mut xor = 0u8;
    for &byte in &sentence[1..star] {
        xor ^= byte;
    }
    let digits = &sentence[star + 1..star + 3];
    match std::str::from_utf8(digits)
        .ok()
        .and_then(|s| u8::from_str_radix(s, 16).ok())
    {
        Some(expected) => xor == expected,
        None => false,
    }
}

/// CRC-24Q (polynomial 0x1864CFB), as specified for RTCM 3.x frames.
pub fn crc24q(data: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in data {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= 0x0186_4cfb;
            }
        }
    }
    crc & 0x00ff_ffff
}

fn rtcm_valid(frame: &[u8]) -> bool {
    if frame.len() < 6 {
        return false;
    }
    let crc_start = frame.len() - 3;
    let expected = (u32::from(frame[crc_start]) << 16)
        | (u32::from(frame[crc_start + 1]) << 8)
        | u32::from(frame[crc_start + 2]);
    crc24q(&frame[..crc_start]) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known-good UBX-ACK-ACK frame; checksum bytes are 0x0d 0x32.
    const ACK_ACK: [u8; 10] = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x02, 0x03, 0x0d, 0x32];

    #[test]
    fn ubx_fletcher_matches_receiver_output() {
        assert!(ubx_valid(&ACK_ACK));
        let mut corrupt = ACK_ACK;
        corrupt[7] ^= 0x01;
        assert!(!ubx_valid(&corrupt));
    }

    #[test]
    fn nmea_xor_checksum() {
        let sentence = b"$GPGLL,4916.45,N,12311.12,W,225444,A,*1D\r\n";
        assert!(nmea_valid(sentence, true));
        let bad = b"$GPGLL,4916.45,N,12311.12,W,225444,A,*1E\r\n";
        assert!(!nmea_valid(bad, true));
    }

    #[test]
    fn nmea_without_checksum_passes() {
        assert!(nmea_valid(b"$GPTXT,hello*\r\n", false));
    }

    #[test]
    fn crc24q_check_value() {
        // Check value for the ASCII string "123456789" with zero init.
        assert_eq!(crc24q(b"123456789"), 0xcde703);
        assert_eq!(crc24q(b""), 0);
    }

    #[test]
    fn rtcm_frame_roundtrip() {
        let mut frame = vec![0xd3, 0x00, 0x04, 0x3e, 0xd0, 0x00, 0x03];
        let crc = crc24q(&frame);
        frame.extend_from_slice(&[(crc >> 16) as u8, (crc >> 8) as u8, crc as u8]);
        assert!(rtcm_valid(&frame));
        frame[4] ^= 0x40;
        assert!(!rtcm_valid(&frame));
    }
}
