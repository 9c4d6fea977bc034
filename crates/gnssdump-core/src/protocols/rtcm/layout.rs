//! RTCM data-field (DF) catalogue and message structure tables.
//!
//! Every decodable quantity is a numbered data field with a fixed width,
//! signedness, and scaling. Message tables are ordered DF-id lists; a
//! negative id marks that many reserved bits to skip. MSM7 messages share
//! one header/satellite/signal structure and differ only in their time
//! fields, satellite extension fields, and signal-id symbol table.

use crate::protocols::common::Scale;

/// One RTCM data field definition.
#[derive(Debug, Clone, Copy)]
pub struct DfEntry {
    pub name: &'static str,
    pub bits: u32,
    pub signed: bool,
    pub scale: Scale,
    /// Decode as a boolean flag instead of an integer.
    pub flag: bool,
    pub symbols: Option<&'static [(i64, &'static str)]>,
    pub unit: Option<&'static str>,
}

impl DfEntry {
    const fn new(name: &'static str, bits: u32) -> Self {
        Self {
            name,
            bits,
            signed: false,
            scale: Scale::Identity,
            flag: false,
            symbols: None,
            unit: None,
        }
    }

    const fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    const fn scale(mut self, k: f64) -> Self {
        self.scale = Scale::Linear(k);
        self
    }

    const fn flag(mut self) -> Self {
        self.flag = true;
        self
    }

    const fn symbols(mut self, symbols: &'static [(i64, &'static str)]) -> Self {
        self.symbols = Some(symbols);
        self
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }
}

const P2_4: f64 = 1.0 / (1u64 << 4) as f64;
const P2_10: f64 = 1.0 / (1u64 << 10) as f64;
const P2_29: f64 = 1.0 / (1u64 << 29) as f64;
const P2_31: f64 = 1.0 / (1u64 << 31) as f64;

/// GLONASS day of week; 3-bit value 7 means unknown.
pub const GLO_DOW: &[(i64, &'static str)] = &[
    (0, "SUN"),
    (1, "MON"),
    (2, "TUE"),
    (3, "WED"),
    (4, "THU"),
    (5, "FRI"),
    (6, "SAT"),
    (7, "UNK"),
];

static DF_TABLE: &[(u16, DfEntry)] = &[
    (1, DfEntry::new("res", 1)),
    (2, DfEntry::new("msgNum", 12)),
    (3, DfEntry::new("staId", 12)),
    (4, DfEntry::new("gpsTow", 30).unit("ms")),
    (21, DfEntry::new("ITRFyear", 6)),
    (22, DfEntry::new("GPSind", 1).flag()),
    (23, DfEntry::new("GLOind", 1).flag()),
    (24, DfEntry::new("GALind", 1).flag()),
    (25, DfEntry::new("ecefX", 38).signed().scale(0.0001).unit("m")),
    (26, DfEntry::new("ecefY", 38).signed().scale(0.0001).unit("m")),
    (27, DfEntry::new("ecefZ", 38).signed().scale(0.0001).unit("m")),
    (34, DfEntry::new("glotk", 27).unit("ms")),
    (141, DfEntry::new("refind", 1).flag()),
    (142, DfEntry::new("SROscInd", 1).flag()),
    (248, DfEntry::new("galTow", 30).unit("ms")),
    (364, DfEntry::new("qcind", 2)),
    (393, DfEntry::new("mult_msg", 1).flag()),
    (394, DfEntry::new("satmask", 64)),
    (395, DfEntry::new("sigmask", 32)),
    (397, DfEntry::new("roughrangeint", 8).unit("ms")),
    (398, DfEntry::new("roughrangesub", 10).scale(P2_10).unit("ms")),
    (399, DfEntry::new("roughdphr", 14).signed().unit("m/s")),
    (404, DfEntry::new("finedPhR", 15).signed().scale(0.0001).unit("m/s")),
    (405, DfEntry::new("finePRext", 20).signed().scale(P2_29).unit("ms")),
    (406, DfEntry::new("finePhRext", 24).signed().scale(P2_31).unit("ms")),
    (407, DfEntry::new("lockTime", 10)),
    (408, DfEntry::new("CNRext", 10).scale(P2_4).unit("dbHz")),
    (409, DfEntry::new("iods", 3)),
    (411, DfEntry::new("cksteerind", 2)),
    (412, DfEntry::new("extckind", 2)),
    (416, DfEntry::new("glodow", 3).symbols(GLO_DOW)),
    (417, DfEntry::new("dfsmoothind", 1).flag()),
    (418, DfEntry::new("gnsssmoothind", 3)),
    (419, DfEntry::new("glocha", 4)),
    (420, DfEntry::new("hcAmbFlag", 1).flag()),
];

/// Look up a data-field definition by DF number.
pub fn df(id: u16) -> Option<&'static DfEntry> {
    DF_TABLE
        .iter()
        .find(|(df_id, _)| *df_id == id)
        .map(|(_, entry)| entry)
}

/// GPS signal identifiers (MSM signal mask bit positions).
pub const GPS_SIG: &[(i64, &'static str)] = &[
    (2, "L1CA"),
    (3, "L1P"),
    (4, "L1Z"),
    (8, "L2CA"),
    (9, "L2P"),
    (10, "L2Z"),
    (15, "L2CM"),
    (16, "L2CL"),
    (17, "L2CML"),
    (22, "L5I"),
    (23, "L5Q"),
    (24, "L5IQ"),
];

/// GLONASS signal identifiers.
pub const GLO_SIG: &[(i64, &'static str)] = &[
    (2, "G1CA"),
    (3, "G1P"),
    (8, "G2CA"),
    (9, "G2P"),
];

/// Galileo signal identifiers.
pub const GAL_SIG: &[(i64, &'static str)] = &[
    (2, "E1C"),
    (3, "E1A"),
    (4, "E1B"),
    (5, "E1BC"),
    (6, "E1ABC"),
    (8, "E6C"),
    (9, "E6A"),
    (10, "E6B"),
    (11, "E6BC"),
    (12, "E6ABC"),
    (14, "E5BI"),
    (15, "E5BQ"),
    (16, "E5BIQ"),
    (18, "E5ABI"),
    (19, "E5ABQ"),
    (20, "E5ABIQ"),
    (22, "E5AI"),
    (23, "E5AQ"),
    (24, "E5AIQ"),
];

/// MSM header before the constellation-specific time fields.
pub static MSM_HEADER_PREFIX: &[i16] = &[2, 3];
/// MSM header after the time fields, through the signal mask.
pub static MSM_HEADER_SUFFIX: &[i16] = &[393, 409, -7, 411, 412, 417, 418, 394, 395];

/// Per-satellite fields before the extension fields.
pub static MSM7_SAT_RANGE_INT: &[i16] = &[397];
/// Per-satellite fields after the extension fields.
pub static MSM7_SAT_RANGE_FINE: &[i16] = &[398, 399];
/// Per-cell signal fields, in cell order.
pub static MSM7_SIG_RECORD: &[i16] = &[405, 406, 407, 420, 408, 404];

/// One MSM7 message variant: constellation-specific pieces only.
#[derive(Debug, Clone, Copy)]
pub struct Msm7Def {
    pub msg_num: u16,
    /// Time field(s) between station id and the multi-message flag.
    pub times: &'static [i16],
    /// Per-satellite extension fields between the rough range parts.
    pub sat_ext: &'static [i16],
    pub signals: &'static [(i64, &'static str)],
}

pub static MSM7_MESSAGES: &[Msm7Def] = &[
    Msm7Def {
        msg_num: 1077,
        times: &[4],
        sat_ext: &[-4],
        signals: GPS_SIG,
    },
    Msm7Def {
        msg_num: 1087,
        times: &[416, 34],
        sat_ext: &[419],
        signals: GLO_SIG,
    },
    Msm7Def {
        msg_num: 1097,
        times: &[248],
        sat_ext: &[-4],
        signals: GAL_SIG,
    },
];

pub fn msm7(msg_num: u16) -> Option<&'static Msm7Def> {
    MSM7_MESSAGES.iter().find(|def| def.msg_num == msg_num)
}

/// A fixed-structure message: one flat DF list.
#[derive(Debug, Clone, Copy)]
pub struct FixedDef {
    pub msg_num: u16,
    pub dfs: &'static [i16],
}

pub static FIXED_MESSAGES: &[FixedDef] = &[
    // Stationary RTK reference station ARP.
    FixedDef {
        msg_num: 1005,
        dfs: &[2, 3, 21, 22, 23, 24, 141, 25, 142, -1, 26, 364, 27],
    },
];

pub fn fixed(msg_num: u16) -> Option<&'static FixedDef> {
    FIXED_MESSAGES.iter().find(|def| def.msg_num == msg_num)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_referenced_df_is_catalogued() {
        let lists = [
            MSM_HEADER_PREFIX,
            MSM_HEADER_SUFFIX,
            MSM7_SAT_RANGE_INT,
            MSM7_SAT_RANGE_FINE,
            MSM7_SIG_RECORD,
        ];
        let msm_lists = MSM7_MESSAGES
            .iter()
            .flat_map(|def| [def.times, def.sat_ext]);
        let fixed_lists = FIXED_MESSAGES.iter().map(|def| def.dfs);
        for list in lists.into_iter().chain(msm_lists).chain(fixed_lists) {
            for &id in list {
                if id >= 0 {
                    assert!(df(id as u16).is_some(), "DF{id:03} missing");
                }
            }
        }
    }

    #[test]
    fn mask_widths_fit_the_extractor() {
        assert_eq!(df(394).unwrap().bits, 64);
        assert_eq!(df(395).unwrap().bits, 32);
    }
}
