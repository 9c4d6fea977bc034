//! Static UBX message catalogue and the compiled-layout registry.
//!
//! The catalogue is data, not logic: each entry is a declared field table
//! keyed by (class, id). Layouts are compiled once, on first use, and
//! shared behind `Arc` across every decode of that message type. Entries
//! that fail to compile are logged and skipped, never silently kept.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::error;

use super::layout::{CompiledLayout, FieldDef, Prim, compile};

/// One catalogue entry: a named message and its declared field table.
#[derive(Debug, Clone, Copy)]
pub struct MessageDef {
    pub name: &'static str,
    pub class: u8,
    pub id: u8,
    pub fields: &'static [FieldDef],
}

/// GNSS constellation identifiers (UBX `gnssId` convention).
pub const GNSS_ID: &[(i64, &'static str)] = &[
    (0, "GPS"),
    (1, "SBAS"),
    (2, "GAL"),
    (3, "BDS"),
    (4, "IMES"),
    (5, "QZSS"),
    (6, "GLO"),
    (7, "NavIC"),
];

/// NAV-PVT position fix types.
pub const FIX_TYPE: &[(i64, &'static str)] = &[
    (0, "none"),
    (1, "DR"),
    (2, "2D"),
    (3, "3D"),
    (4, "GNSS+DR"),
    (5, "time"),
];

const P2_32: f64 = 1.0 / 4_294_967_296.0;

/// The `RXM-SFRBX` key; its payload relays raw navigation words and
/// triggers the nested subframe decode.
pub const SFRBX: (u8, u8) = (0x02, 0x13);

pub static MESSAGES: &[MessageDef] = &[
    MessageDef {
        name: "UBX-NAV-PVT",
        class: 0x01,
        id: 0x07,
        fields: &[
            FieldDef::new("iTOW", Prim::U4).unit("ms"),
            FieldDef::new("year", Prim::U2),
            FieldDef::new("month", Prim::U1),
            FieldDef::new("day", Prim::U1),
            FieldDef::new("hour", Prim::U1),
            FieldDef::new("min", Prim::U1),
            FieldDef::new("sec", Prim::U1),
            FieldDef::new("valid", Prim::U1),
            FieldDef::new("tAcc", Prim::U4).unit("ns"),
            FieldDef::new("nano", Prim::I4).unit("ns"),
            FieldDef::new("fixType", Prim::U1).symbols(FIX_TYPE),
            FieldDef::new("flags", Prim::U1),
            FieldDef::new("flags2", Prim::U1),
            FieldDef::new("numSV", Prim::U1),
            FieldDef::new("lon", Prim::I4).scale(1e-7).unit("deg"),
            FieldDef::new("lat", Prim::I4).scale(1e-7).unit("deg"),
            FieldDef::new("height", Prim::I4).scale(1e-3).unit("m"),
            FieldDef::new("hMSL", Prim::I4).scale(1e-3).unit("m"),
            FieldDef::new("hAcc", Prim::U4).scale(1e-3).unit("m"),
            FieldDef::new("vAcc", Prim::U4).scale(1e-3).unit("m"),
            FieldDef::new("velN", Prim::I4).scale(1e-3).unit("m/s"),
            FieldDef::new("velE", Prim::I4).scale(1e-3).unit("m/s"),
            FieldDef::new("velD", Prim::I4).scale(1e-3).unit("m/s"),
            FieldDef::new("gSpeed", Prim::I4).scale(1e-3).unit("m/s"),
            FieldDef::new("headMot", Prim::I4).scale(1e-5).unit("deg"),
            FieldDef::new("sAcc", Prim::U4).scale(1e-3).unit("m/s"),
            FieldDef::new("headAcc", Prim::U4).scale(1e-5).unit("deg"),
            FieldDef::new("pDOP", Prim::U2).scale(0.01),
            FieldDef::new("flags3", Prim::U1),
            FieldDef::new("reserved0", Prim::U1),
            FieldDef::new("reserved1", Prim::U4),
            FieldDef::new("headVeh", Prim::I4).scale(1e-5).unit("deg"),
            FieldDef::new("magDec", Prim::I2).scale(1e-2).unit("deg"),
            FieldDef::new("magAcc", Prim::U2).scale(1e-2).unit("deg"),
        ],
    },
    MessageDef {
        name: "UBX-NAV-HPPOSLLH",
        class: 0x01,
        id: 0x14,
        fields: &[
            FieldDef::new("version", Prim::U1),
            FieldDef::new("reserved0", Prim::U2),
            FieldDef::new("flags", Prim::U1),
            FieldDef::new("iTOW", Prim::U4).unit("ms"),
            FieldDef::new("lon", Prim::I4).scale(1e-7).unit("deg"),
            FieldDef::new("lat", Prim::I4).scale(1e-7).unit("deg"),
            FieldDef::new("height", Prim::I4).scale(1e-3).unit("m"),
            FieldDef::new("hMSL", Prim::I4).scale(1e-3).unit("m"),
            FieldDef::new("lonHp", Prim::I1).scale(1e-9).unit("deg"),
            FieldDef::new("latHp", Prim::I1).scale(1e-9).unit("deg"),
            FieldDef::new("heightHp", Prim::I1).scale(1e-4).unit("m"),
            FieldDef::new("hMSLHp", Prim::I1).scale(1e-4).unit("m"),
            FieldDef::new("hAcc", Prim::U4).scale(1e-4).unit("m"),
            FieldDef::new("vAcc", Prim::U4).scale(1e-4).unit("m"),
        ],
    },
    MessageDef {
        name: "UBX-NAV-EOE",
        class: 0x01,
        id: 0x61,
        fields: &[FieldDef::new("iTOW", Prim::U4).unit("ms")],
    },
    MessageDef {
        name: "UBX-RXM-SFRBX",
        class: SFRBX.0,
        id: SFRBX.1,
        fields: &[
            FieldDef::new("gnssId", Prim::U1).symbols(GNSS_ID),
            FieldDef::new("svId", Prim::U1),
            FieldDef::new("sigId", Prim::U1),
            FieldDef::new("freqId", Prim::U1),
            FieldDef::new("numWords", Prim::U1),
            FieldDef::new("chn", Prim::U1),
            FieldDef::new("version", Prim::U1),
            FieldDef::new("reserved0", Prim::U1),
            FieldDef::new("dwrd", Prim::U4).width(8).per_row(),
        ],
    },
    MessageDef {
        name: "UBX-RXM-RAWX",
        class: 0x02,
        id: 0x15,
        fields: &[
            FieldDef::new("rcvTow", Prim::R8).unit("s"),
            FieldDef::new("week", Prim::U2),
            FieldDef::new("leapS", Prim::I1).unit("s"),
            FieldDef::new("numMeas", Prim::U1),
            FieldDef::new("recStat", Prim::U1),
            FieldDef::new("version", Prim::U1),
            FieldDef::new("reserved0", Prim::U2),
            FieldDef::new("prMes", Prim::R8).unit("m").per_row(),
            FieldDef::new("cpMes", Prim::R8).unit("cycles").per_row(),
            FieldDef::new("doMes", Prim::R4).unit("Hz").per_row(),
            FieldDef::new("gnssId", Prim::U1).symbols(GNSS_ID).per_row(),
            FieldDef::new("svId", Prim::U1).per_row(),
            FieldDef::new("sigId", Prim::U1).per_row(),
            FieldDef::new("freqId", Prim::U1).per_row(),
            FieldDef::new("lockTime", Prim::U2).unit("ms").per_row(),
            FieldDef::new("cno", Prim::U1).unit("dBHz").per_row(),
            FieldDef::new("prStdev", Prim::U1).per_row(),
            FieldDef::new("cpStdev", Prim::U1).per_row(),
            FieldDef::new("doStdev", Prim::U1).per_row(),
            FieldDef::new("trkStat", Prim::U1).per_row(),
            FieldDef::new("reserved1", Prim::U1).per_row(),
        ],
    },
    MessageDef {
        name: "UBX-ACK-NAK",
        class: 0x05,
        id: 0x00,
        fields: &[
            FieldDef::new("clsID", Prim::U1),
            FieldDef::new("msgID", Prim::U1),
        ],
    },
    MessageDef {
        name: "UBX-ACK-ACK",
        class: 0x05,
        id: 0x01,
        fields: &[
            FieldDef::new("clsID", Prim::U1),
            FieldDef::new("msgID", Prim::U1),
        ],
    },
    MessageDef {
        name: "UBX-MON-VER",
        class: 0x0a,
        id: 0x04,
        fields: &[
            FieldDef::new("swVersion", Prim::Ch(30)),
            FieldDef::new("hwVersion", Prim::Ch(10)),
            FieldDef::new("extension", Prim::Ch(30)).per_row(),
        ],
    },
    MessageDef {
        name: "UBX-TIM-TP",
        class: 0x0d,
        id: 0x01,
        fields: &[
            FieldDef::new("towMS", Prim::U4).unit("ms"),
            FieldDef::new("towSubMS", Prim::U4).scale(P2_32).unit("ms"),
            FieldDef::new("qErr", Prim::I4).unit("ps"),
            FieldDef::new("week", Prim::U2),
            FieldDef::new("flags", Prim::U1),
            FieldDef::new("refInfo", Prim::U1),
        ],
    },
    // ESF-MEAS carries its calibration timetag after the repeating block
    // only when flags bit 3 (calibTtagValid) is set.
    MessageDef {
        name: "UBX-ESF-MEAS",
        class: 0x10,
        id: 0x02,
        fields: &[
            FieldDef::new("timeTag", Prim::U4),
            FieldDef::new("flags", Prim::U2),
            FieldDef::new("id", Prim::U2),
            FieldDef::new("data", Prim::U4).width(8).per_row(),
            FieldDef::new("calibTtag", Prim::U4)
                .unit("ms")
                .present_if("flags", 3),
        ],
    },
    MessageDef {
        name: "UBX-NAV-HPPOSECEF",
        class: 0x01,
        id: 0x13,
        fields: &[
            FieldDef::new("version", Prim::U1),
            FieldDef::new("reserved0", Prim::U1),
            FieldDef::new("reserved1", Prim::U2),
            FieldDef::new("iTOW", Prim::U4).unit("ms"),
            FieldDef::new("ecefX", Prim::I4).scale(1e-2).unit("m"),
            FieldDef::new("ecefY", Prim::I4).scale(1e-2).unit("m"),
            FieldDef::new("ecefZ", Prim::I4).scale(1e-2).unit("m"),
            FieldDef::new("ecefXHp", Prim::I1).scale(1e-4).unit("m"),
            FieldDef::new("ecefYHp", Prim::I1).scale(1e-4).unit("m"),
            FieldDef::new("ecefZHp", Prim::I1).scale(1e-4).unit("m"),
            FieldDef::new("flags", Prim::U1),
            FieldDef::new("pAcc", Prim::U4).scale(1e-4).unit("m"),
        ],
    },
    MessageDef {
        name: "UBX-KWAN-ICM2",
        class: 0x4b,
        id: 0x02,
        fields: KWAN_IMU_FIELDS,
    },
    MessageDef {
        name: "UBX-KWAN-MAG",
        class: 0x4b,
        id: 0x03,
        fields: &[
            FieldDef::new("t", Prim::U4).unit("ticks"),
            FieldDef::new("st1", Prim::U1),
            FieldDef::new("bx", Prim::I2),
            FieldDef::new("by", Prim::I2),
            FieldDef::new("bz", Prim::I2),
            FieldDef::new("st2", Prim::U1),
        ],
    },
    MessageDef {
        name: "UBX-KWAN-TP",
        class: 0x4b,
        id: 0x04,
        fields: &[
            FieldDef::new("pulseCount", Prim::U4),
            FieldDef::new("tc", Prim::U4).scale(TICK).unit("s"),
            FieldDef::new("dtc", Prim::U4).scale(TICK).unit("s"),
        ],
    },
    MessageDef {
        name: "UBX-KWAN-PRES",
        class: 0x4b,
        id: 0x06,
        fields: &[
            FieldDef::new("tp0", Prim::U4).unit("ticks"),
            FieldDef::new("tp1", Prim::U4).unit("ticks"),
            FieldDef::new("pst", Prim::U1),
            FieldDef::new("rP", Prim::U4),
            FieldDef::new("rT", Prim::U4),
            FieldDef::new("rh", Prim::U2),
            FieldDef::new("P", Prim::R4).unit("Pa"),
            FieldDef::new("T", Prim::R4).unit("degC"),
            FieldDef::new("h", Prim::R4).unit("%"),
        ],
    },
    MessageDef {
        name: "UBX-KWAN-PCAL",
        class: 0x4b,
        id: 0x07,
        fields: &[
            FieldDef::new("par_t1", Prim::U2),
            FieldDef::new("par_t2", Prim::I2),
            FieldDef::new("par_t3", Prim::I1),
            FieldDef::new("par_p1", Prim::U2),
            FieldDef::new("par_p2", Prim::I2),
            FieldDef::new("par_p3", Prim::I1),
            FieldDef::new("par_p4", Prim::I2),
            FieldDef::new("par_p5", Prim::I2),
            FieldDef::new("par_p6", Prim::I1),
            FieldDef::new("par_p7", Prim::I1),
            FieldDef::new("par_p8", Prim::I2),
            FieldDef::new("par_p9", Prim::I2),
            FieldDef::new("par_p10", Prim::U1),
            FieldDef::new("par_h1", Prim::U2),
            FieldDef::new("par_h2", Prim::U2),
            FieldDef::new("par_h3", Prim::I1),
            FieldDef::new("par_h4", Prim::I1),
            FieldDef::new("par_h5", Prim::I1),
            FieldDef::new("par_h6", Prim::U1),
            FieldDef::new("par_h7", Prim::I1),
        ],
    },
    MessageDef {
        name: "UBX-KWAN-LSM",
        class: 0x4b,
        id: 0x08,
        fields: KWAN_IMU_FIELDS,
    },
    MessageDef {
        name: "UBX-KWAN-LOOP",
        class: 0x4b,
        id: 0x09,
        fields: &[
            FieldDef::new("t", Prim::U4).unit("ticks"),
            FieldDef::new("clickCount", Prim::U8),
        ],
    },
];

/// Vendor timer tick length in seconds (60 MHz counter).
const TICK: f64 = 1.0 / 60_000_000.0;

/// Shared table for the two vendor IMU messages (ICM2 and LSM report the
/// same raw axes).
const KWAN_IMU_FIELDS: &[FieldDef] = &[
    FieldDef::new("t", Prim::U4).unit("ticks"),
    FieldDef::new("ax", Prim::I2),
    FieldDef::new("ay", Prim::I2),
    FieldDef::new("az", Prim::I2),
    FieldDef::new("gx", Prim::I2),
    FieldDef::new("gy", Prim::I2),
    FieldDef::new("gz", Prim::I2),
    FieldDef::new("T", Prim::I2),
];

/// UBX class names for messages without a catalogue entry.
pub fn class_name(class: u8) -> Option<&'static str> {
    match class {
        0x01 => Some("NAV"),
        0x02 => Some("RXM"),
        0x05 => Some("ACK"),
        0x0a => Some("MON"),
        0x0d => Some("TIM"),
        0x10 => Some("ESF"),
        0x29 => Some("NAV2"),
        0x4b => Some("KWAN"),
        _ => None,
    }
}

static REGISTRY: OnceLock<HashMap<(u8, u8), Arc<CompiledLayout>>> = OnceLock::new();

/// Look up the compiled layout for a message type, if catalogued.
pub fn layout(class: u8, id: u8) -> Option<Arc<CompiledLayout>> {
    REGISTRY
        .get_or_init(build_registry)
        .get(&(class, id))
        .cloned()
}

fn build_registry() -> HashMap<(u8, u8), Arc<CompiledLayout>> {
    let mut map = HashMap::new();
    for def in MESSAGES {
        match compile(def.name, def.class, def.id, def.fields) {
            Ok(compiled) => {
                map.insert((def.class, def.id), Arc::new(compiled));
            }
            Err(err) => error!(message = def.name, %err, "invalid catalogue entry"),
        }
    }
    map
}
