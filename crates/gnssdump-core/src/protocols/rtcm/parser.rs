//! RTCM message decoding: fixed DF-list messages and MSM7.
//!
//! MSM7 output is flattened to one row per (satellite, signal) cell:
//! per-satellite fields are replicated onto each of that satellite's
//! cells, so the record reads as a single aligned measurement table. The
//! wire is still decoded strictly left to right, field-major.

use tracing::debug;

use crate::{Column, DecodedRecord, FieldValue, MessageKey, RawPacket, Value};

use super::error::RtcmError;
use super::layout::{self, DfEntry, FixedDef, Msm7Def};
use super::reader::{BitReader, get_bits};

/// Decode a framed RTCM message.
///
/// Returns `Ok(None)` for message numbers without a catalogue entry; the
/// caller keeps the raw packet.
pub fn decode_packet(packet: &RawPacket) -> Result<Option<DecodedRecord>, RtcmError> {
    decode_payload(packet.payload())
}

/// Decode an RTCM payload (framing and CRC already stripped).
pub fn decode_payload(payload: &[u8]) -> Result<Option<DecodedRecord>, RtcmError> {
    let msg_num = get_bits(payload, 0, 12, false)? as u16;
    if let Some(def) = layout::msm7(msg_num) {
        return decode_msm7(payload, def).map(Some);
    }
    if let Some(def) = layout::fixed(msg_num) {
        return decode_fixed(payload, def).map(Some);
    }
    debug!(msg_num, "no catalogue entry for RTCM message");
    Ok(None)
}

fn decode_field(reader: &mut BitReader<'_>, entry: &DfEntry) -> Result<Value, RtcmError> {
    let raw = reader.take(entry.bits, entry.signed)?;
    if entry.flag {
        return Ok(Value::Bool(raw != 0));
    }
    if let Some(table) = entry.symbols {
        return table
            .iter()
            .find(|(k, _)| *k == raw)
            .map(|&(_, sym)| Value::Symbol(sym))
            .ok_or(RtcmError::EnumMapping {
                field: entry.name,
                value: raw,
            });
    }
    Ok(entry.scale.apply(Value::Int(raw)))
}

/// Decode an ordered DF list into named values; negative ids skip
/// that many reserved bits.
fn decode_df_list(
    reader: &mut BitReader<'_>,
    dfs: &[i16],
    out: &mut Vec<FieldValue>,
) -> Result<(), RtcmError> {
    for &id in dfs {
        if id < 0 {
            reader.skip(-id as u32)?;
            continue;
        }
        let entry = layout::df(id as u16).ok_or(RtcmError::UnknownField(id as u16))?;
        let value = decode_field(reader, entry)?;
        out.push(FieldValue {
            name: entry.name,
            value,
            unit: entry.unit,
        });
    }
    Ok(())
}

/// 1-based positions of set bits, least significant first.
fn enum_bits(mut mask: u64) -> Vec<i64> {
    let mut out = Vec::new();
    let mut pos: i64 = 1;
    while mask != 0 {
        if mask & 1 != 0 {
            out.push(pos);
        }
        mask >>= 1;
        pos += 1;
    }
    out
}

fn header_mask(header: &[FieldValue], name: &str) -> u64 {
    header
        .iter()
        .find(|f| f.name == name)
        .and_then(|f| f.value.as_i64())
        .unwrap_or(0) as u64
}

fn symbol_or_int(table: &'static [(i64, &'static str)], id: i64) -> Value {
    table
        .iter()
        .find(|(k, _)| *k == id)
        .map(|&(_, sym)| Value::Symbol(sym))
        .unwrap_or(Value::Int(id))
}

/// Decode one field for every satellite, in satellite order.
fn decode_sat_fields(
    reader: &mut BitReader<'_>,
    dfs: &[i16],
    n_sat: usize,
    out: &mut Vec<(&'static DfEntry, Vec<Value>)>,
) -> Result<(), RtcmError> {
    for &id in dfs {
        if id < 0 {
            for _ in 0..n_sat {
                reader.skip(-id as u32)?;
            }
            continue;
        }
        let entry = layout::df(id as u16).ok_or(RtcmError::UnknownField(id as u16))?;
        let mut values = Vec::with_capacity(n_sat);
        for _ in 0..n_sat {
            values.push(decode_field(reader, entry)?);
        }
        out.push((entry, values));
    }
    Ok(())
}

fn decode_msm7(payload: &[u8], def: &Msm7Def) -> Result<DecodedRecord, RtcmError> {
    let mut reader = BitReader::new(payload);
    let mut header = Vec::new();
    decode_df_list(&mut reader, layout::MSM_HEADER_PREFIX, &mut header)?;
    decode_df_list(&mut reader, def.times, &mut header)?;
    decode_df_list(&mut reader, layout::MSM_HEADER_SUFFIX, &mut header)?;

    let sats = enum_bits(header_mask(&header, "satmask"));
    let sigs = enum_bits(header_mask(&header, "sigmask"));
    let n_sig = sigs.len() as u32;

    // Cell mask: one row of Nsig bits per satellite, immediately after the
    // header. Row bit i selects the i-th enumerated signal.
    let mut cells: Vec<(usize, i64)> = Vec::new();
    for sat_index in 0..sats.len() {
        let row = if n_sig == 0 {
            0
        } else {
            reader.take_u64(n_sig)?
        };
        for (i, &sig) in sigs.iter().enumerate() {
            if row >> i & 1 != 0 {
                cells.push((sat_index, sig));
            }
        }
    }

    let mut sat_columns: Vec<(&'static DfEntry, Vec<Value>)> = Vec::new();
    decode_sat_fields(&mut reader, layout::MSM7_SAT_RANGE_INT, sats.len(), &mut sat_columns)?;
    decode_sat_fields(&mut reader, def.sat_ext, sats.len(), &mut sat_columns)?;
    decode_sat_fields(&mut reader, layout::MSM7_SAT_RANGE_FINE, sats.len(), &mut sat_columns)?;

    let mut sig_columns: Vec<(&'static DfEntry, Vec<Value>)> = Vec::new();
    for &id in layout::MSM7_SIG_RECORD {
        let entry = layout::df(id as u16).ok_or(RtcmError::UnknownField(id as u16))?;
        let mut values = Vec::with_capacity(cells.len());
        for _ in &cells {
            values.push(decode_field(&mut reader, entry)?);
        }
        sig_columns.push((entry, values));
    }

    let mut block = Vec::with_capacity(2 + sat_columns.len() + sig_columns.len());
    block.push(Column {
        name: "prn",
        unit: None,
        values: cells.iter().map(|&(i, _)| Value::Int(sats[i])).collect(),
    });
    block.push(Column {
        name: "sig",
        unit: None,
        values: cells
            .iter()
            .map(|&(_, sig)| symbol_or_int(def.signals, sig))
            .collect(),
    });
    for (entry, values) in sat_columns {
        block.push(Column {
            name: entry.name,
            unit: entry.unit,
            values: cells.iter().map(|&(i, _)| values[i].clone()).collect(),
        });
    }
    for (entry, values) in sig_columns {
        block.push(Column {
            name: entry.name,
            unit: entry.unit,
            values,
        });
    }

    Ok(DecodedRecord {
        message: format!("RTCM-{}", def.msg_num),
        key: MessageKey::Rtcm {
            msg_num: def.msg_num,
        },
        n_rows: cells.len(),
        header,
        block,
        footer: Vec::new(),
        raw_payload: payload.to_vec(),
        layout: None,
    })
}

fn decode_fixed(payload: &[u8], def: &FixedDef) -> Result<DecodedRecord, RtcmError> {
    let mut reader = BitReader::new(payload);
    let mut header = Vec::new();
    decode_df_list(&mut reader, def.dfs, &mut header)?;
    Ok(DecodedRecord {
        message: format!("RTCM-{}", def.msg_num),
        key: MessageKey::Rtcm {
            msg_num: def.msg_num,
        },
        n_rows: 0,
        header,
        block: Vec::new(),
        footer: Vec::new(),
        raw_payload: payload.to_vec(),
        layout: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BitWriter {
        bytes: Vec<u8>,
        bit: usize,
    }

    impl BitWriter {
        fn new() -> Self {
            Self {
                bytes: Vec::new(),
                bit: 0,
            }
        }

        fn push(&mut self, value: u64, width: u32) {
            for i in (0..width).rev() {
                if self.bit % 8 == 0 {
                    self.bytes.push(0);
                }
                if value >> i & 1 != 0 {
                    let idx = self.bit / 8;
                    self.bytes[idx] |= 1 << (7 - self.bit % 8);
                }
                self.bit += 1;
            }
        }

        fn finish(self) -> Vec<u8> {
            self.bytes
        }
    }

    fn msm7_1077_payload() -> Vec<u8> {
        let mut w = BitWriter::new();
        w.push(1077, 12); // msgNum
        w.push(42, 12); // staId
        w.push(123_456, 30); // gpsTow
        w.push(0, 1); // mult_msg
        w.push(0, 3); // iods
        w.push(0, 7); // reserved
        w.push(0, 2); // cksteerind
        w.push(0, 2); // extckind
        w.push(0, 1); // dfsmoothind
        w.push(0, 3); // gnsssmoothind
        w.push(0b101, 64); // satmask: positions 1 and 3
        w.push(0b011, 32); // sigmask: positions 1 and 2
        w.push(0b01, 2); // cell row, satellite 1
        w.push(0b11, 2); // cell row, satellite 3
        w.push(10, 8); // roughrangeint per satellite
        w.push(20, 8);
        w.push(0, 4); // reserved extension per satellite
        w.push(0, 4);
        w.push(512, 10); // roughrangesub per satellite
        w.push(0, 10);
        w.push(0, 14); // roughdphr per satellite
        w.push(0x3fff, 14); // raw -1
        for v in [1u64, 2, 3] {
            w.push(v, 20); // finePRext per cell
        }
        for _ in 0..3 {
            w.push(0, 24); // finePhRext
        }
        for v in [100u64, 200, 300] {
            w.push(v, 10); // lockTime
        }
        for v in [1u64, 0, 1] {
            w.push(v, 1); // hcAmbFlag
        }
        for v in [800u64, 640, 720] {
            w.push(v, 10); // CNRext
        }
        for _ in 0..3 {
            w.push(0, 15); // finedPhR
        }
        w.finish()
    }

    #[test]
    fn msm7_cell_enumeration_orders_satellite_then_signal() {
        let record = decode_payload(&msm7_1077_payload()).unwrap().unwrap();
        assert_eq!(record.message, "RTCM-1077");
        assert_eq!(record.key, MessageKey::Rtcm { msg_num: 1077 });
        assert_eq!(record.n_rows, 3);

        let prn = record.column("prn").unwrap();
        assert_eq!(
            prn.values,
            vec![Value::Int(1), Value::Int(3), Value::Int(3)]
        );
        let sig = record.column("sig").unwrap();
        // Signal id 1 has no symbol; 2 is L1CA.
        assert_eq!(
            sig.values,
            vec![Value::Int(1), Value::Int(1), Value::Symbol("L1CA")]
        );
    }

    #[test]
    fn msm7_satellite_fields_replicate_per_cell() {
        let record = decode_payload(&msm7_1077_payload()).unwrap().unwrap();
        let rough = record.column("roughrangeint").unwrap();
        assert_eq!(
            rough.values,
            vec![Value::Int(10), Value::Int(20), Value::Int(20)]
        );
        let sub = record.column("roughrangesub").unwrap();
        assert_eq!(
            sub.values,
            vec![Value::Float(0.5), Value::Float(0.0), Value::Float(0.0)]
        );
        let dphr = record.column("roughdphr").unwrap();
        assert_eq!(
            dphr.values,
            vec![Value::Int(0), Value::Int(-1), Value::Int(-1)]
        );
    }

    #[test]
    fn msm7_signal_fields_follow_cell_order() {
        let record = decode_payload(&msm7_1077_payload()).unwrap().unwrap();
        assert_eq!(record.get("staId"), Some(&Value::Int(42)));
        assert_eq!(record.get("gpsTow"), Some(&Value::Int(123_456)));

        let lock = record.column("lockTime").unwrap();
        assert_eq!(
            lock.values,
            vec![Value::Int(100), Value::Int(200), Value::Int(300)]
        );
        let amb = record.column("hcAmbFlag").unwrap();
        assert_eq!(
            amb.values,
            vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]
        );
        let cnr = record.column("CNRext").unwrap();
        assert_eq!(
            cnr.values,
            vec![Value::Float(50.0), Value::Float(40.0), Value::Float(45.0)]
        );
        let fine = record.column("finePRext").unwrap();
        let p2_29 = 1.0 / (1u64 << 29) as f64;
        assert_eq!(
            fine.values,
            vec![
                Value::Float(p2_29),
                Value::Float(2.0 * p2_29),
                Value::Float(3.0 * p2_29)
            ]
        );
    }

    #[test]
    fn decodes_stationary_reference_message() {
        let mut w = BitWriter::new();
        w.push(1005, 12); // msgNum
        w.push(7, 12); // staId
        w.push(0, 6); // ITRFyear
        w.push(1, 1); // GPSind
        w.push(1, 1); // GLOind
        w.push(0, 1); // GALind
        w.push(0, 1); // refind
        w.push(-123_456i64 as u64 & ((1u64 << 38) - 1), 38); // ecefX
        w.push(0, 1); // SROscInd
        w.push(0, 1); // reserved
        w.push(40_000_000, 38); // ecefY
        w.push(0, 2); // qcind
        w.push(0, 38); // ecefZ
        let record = decode_payload(&w.finish()).unwrap().unwrap();

        assert_eq!(record.message, "RTCM-1005");
        assert_eq!(record.n_rows, 0);
        assert_eq!(record.get("staId"), Some(&Value::Int(7)));
        assert_eq!(record.get("GPSind"), Some(&Value::Bool(true)));
        assert_eq!(record.get("GALind"), Some(&Value::Bool(false)));
        assert_eq!(record.get("ecefX"), Some(&Value::Float(-123_456.0 * 0.0001)));
        assert_eq!(record.get("ecefY"), Some(&Value::Float(40_000_000.0 * 0.0001)));
    }

    #[test]
    fn glonass_day_of_week_seven_is_unknown() {
        let entry = layout::df(416).unwrap();
        let payload = [0b1110_0000u8];
        let mut reader = BitReader::new(&payload);
        assert_eq!(decode_field(&mut reader, entry).unwrap(), Value::Symbol("UNK"));
    }

    #[test]
    fn uncatalogued_message_numbers_decode_to_none() {
        let mut w = BitWriter::new();
        w.push(1001, 12);
        w.push(0, 20);
        assert!(decode_payload(&w.finish()).unwrap().is_none());
    }
}
