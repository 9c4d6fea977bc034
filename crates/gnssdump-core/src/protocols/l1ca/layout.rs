//! GPS L1 C/A navigation message bitfield catalogue (subframes 1-3).
//!
//! Bit positions use the interface-control convention (bit 1 is the MSB of
//! word 0, inclusive ranges). Discontiguous fields list their parts most
//! significant first. Subframes 4 and 5 (almanac) are not catalogued.

use crate::protocols::common::Scale;

/// One navigation message field: bit parts, signedness, scaling.
#[derive(Debug, Clone, Copy)]
pub struct BitField {
    pub name: &'static str,
    pub parts: &'static [(u16, u16)],
    pub signed: bool,
    pub scale: Scale,
    /// Decode as a boolean flag instead of an integer.
    pub flag: bool,
    pub unit: Option<&'static str>,
}

impl BitField {
    pub const fn new(name: &'static str, parts: &'static [(u16, u16)]) -> Self {
        Self {
            name,
            parts,
            signed: false,
            scale: Scale::Identity,
            flag: false,
            unit: None,
        }
    }

    pub const fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub const fn scale(mut self, k: f64) -> Self {
        self.scale = Scale::Linear(k);
        self
    }

    pub const fn func(mut self, f: fn(f64) -> f64) -> Self {
        self.scale = Scale::Func(f);
        self
    }

    pub const fn flag(mut self) -> Self {
        self.flag = true;
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }
}

const P2_5: f64 = 1.0 / (1u64 << 5) as f64;
const P2_19: f64 = 1.0 / (1u64 << 19) as f64;
const P2_29: f64 = 1.0 / (1u64 << 29) as f64;
const P2_31: f64 = 1.0 / (1u64 << 31) as f64;
const P2_33: f64 = 1.0 / (1u64 << 33) as f64;
const P2_43: f64 = 1.0 / (1u64 << 43) as f64;
const P2_55: f64 = 1.0 / (1u64 << 55) as f64;

/// Nominal user-range accuracy for the 4-bit URA index.
///
/// Odd low indices have tabulated values; even indices follow 2^(1+N/2),
/// higher indices 2^(N-2), and 15 means "use at own risk".
pub fn ura_nom(index: f64) -> f64 {
    let n = index as i64;
    match n {
        1 => 2.8,
        3 => 5.7,
        5 => 11.3,
        15 => f64::INFINITY,
        _ if n <= 6 => 2f64.powf(1.0 + n as f64 / 2.0),
        _ => 2f64.powi(n as i32 - 2),
    }
}

/// Semi-major axis from the broadcast square root (scaled 2^-19 m^0.5).
fn semi_major_axis(sqrt_a: f64) -> f64 {
    let root = sqrt_a * P2_19;
    root * root
}

pub const SUBFRAME_ID_BITS: (u16, u16) = (50, 52);

/// Telemetry and handover word fields, common to every subframe.
pub static TLM_HOW: &[BitField] = &[
    BitField::new("preamble", &[(1, 8)]),
    BitField::new("tlm", &[(9, 22)]),
    BitField::new("integ_stat", &[(24, 24)]),
    BitField::new("tow_count", &[(31, 47)]),
    BitField::new("alert", &[(48, 48)]).flag(),
    BitField::new("antispoof", &[(49, 49)]).flag(),
    BitField::new("subframe", &[(50, 52)]),
];

/// Subframe 1: clock correction and accuracy/health.
pub static SUBFRAME1: &[BitField] = &[
    BitField::new("wn", &[(61, 70)]).unit("week"),
    BitField::new("msg_on_l2", &[(71, 72)]),
    BitField::new("ura", &[(73, 76)]).func(ura_nom),
    BitField::new("sv_health", &[(77, 82)]),
    BitField::new("iodc", &[(83, 84), (211, 218)]),
    BitField::new("t_gd", &[(197, 204)]).signed().scale(P2_31).unit("s"),
    BitField::new("t_oc", &[(219, 234)]).scale(16.0).unit("s"),
    BitField::new("a_f2", &[(241, 248)]).signed().scale(P2_55).unit("s/s^2"),
    BitField::new("a_f1", &[(249, 264)]).signed().scale(P2_43).unit("s/s"),
    BitField::new("a_f0", &[(271, 292)]).signed().scale(P2_31).unit("s"),
];

/// Subframe 2: first half of the ephemeris.
pub static SUBFRAME2: &[BitField] = &[
    BitField::new("iode", &[(61, 68)]),
    BitField::new("c_rs", &[(69, 84)]).signed().scale(P2_5).unit("m"),
    BitField::new("delta_n", &[(91, 106)]).signed().scale(P2_43).unit("semicircle/s"),
    BitField::new("M_0", &[(107, 114), (121, 144)]).signed().scale(P2_31).unit("semicircle"),
    BitField::new("c_uc", &[(151, 166)]).signed().scale(P2_29).unit("rad"),
    BitField::new("e", &[(167, 174), (181, 204)]).scale(P2_33),
    BitField::new("c_us", &[(211, 226)]).signed().scale(P2_29).unit("rad"),
    BitField::new("A", &[(227, 234), (241, 264)]).func(semi_major_axis).unit("m"),
    BitField::new("t_oe", &[(271, 286)]).scale(16.0).unit("s"),
    BitField::new("fit", &[(287, 287)]),
    BitField::new("aodo", &[(288, 292)]).scale(900.0).unit("s"),
];

/// Subframe 3: second half of the ephemeris.
pub static SUBFRAME3: &[BitField] = &[
    BitField::new("c_ic", &[(61, 76)]).signed().scale(P2_29).unit("rad"),
    BitField::new("Omega_0", &[(77, 84), (91, 114)]).signed().scale(P2_31).unit("semicircle"),
    BitField::new("c_is", &[(121, 136)]).signed().scale(P2_29).unit("rad"),
    BitField::new("i_0", &[(137, 144), (151, 174)]).signed().scale(P2_31).unit("semicircle"),
    BitField::new("c_rc", &[(181, 196)]).signed().scale(P2_5).unit("m"),
    BitField::new("omega", &[(197, 204), (211, 234)]).scale(P2_33),
    BitField::new("Omegad", &[(241, 264)]).signed().scale(P2_29).unit("semicircle/s"),
    BitField::new("iode", &[(271, 278)]),
    BitField::new("idot", &[(279, 292)]).scale(P2_43).unit("s"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ura_lookup_matches_tabulated_points() {
        assert_eq!(ura_nom(1.0), 2.8);
        assert_eq!(ura_nom(3.0), 5.7);
        assert_eq!(ura_nom(5.0), 11.3);
        assert_eq!(ura_nom(15.0), f64::INFINITY);
        assert_eq!(ura_nom(2.0), 4.0);
        assert_eq!(ura_nom(6.0), 16.0);
        assert_eq!(ura_nom(9.0), 128.0);
    }

    #[test]
    fn no_catalogued_part_crosses_a_word_boundary() {
        for field in TLM_HOW
            .iter()
            .chain(SUBFRAME1)
            .chain(SUBFRAME2)
            .chain(SUBFRAME3)
        {
            for &(b0, b1) in field.parts {
                assert!(b0 >= 1 && b1 >= b0, "{}", field.name);
                assert_eq!((b0 - 1) / 30, (b1 - 1) / 30, "{}", field.name);
                assert!(b1 <= 300, "{}", field.name);
            }
        }
    }
}
