use crate::{DecodedSubframe, FieldValue, Value};

use super::error::L1caError;
use super::layout::{self, SUBFRAME_ID_BITS};
use super::reader::{WORDS_PER_SUBFRAME, get_bits, get_multi_bits};

/// Decode one navigation subframe from its ten 30-bit words.
///
/// Subframes 1 through 3 decode to a flat record of telemetry, handover,
/// and ephemeris/clock fields. Subframes 4 and 5 return `Ok(None)`.
pub fn decode_subframe(words: &[u32]) -> Result<Option<DecodedSubframe>, L1caError> {
    if words.len() != WORDS_PER_SUBFRAME {
        return Err(L1caError::WordCount {
            actual: words.len(),
        });
    }
    let subframe = get_bits(words, SUBFRAME_ID_BITS.0, SUBFRAME_ID_BITS.1)? as u8;
    let table = match subframe {
        1 => layout::SUBFRAME1,
        2 => layout::SUBFRAME2,
        3 => layout::SUBFRAME3,
        _ => return Ok(None),
    };

    let mut fields = Vec::with_capacity(layout::TLM_HOW.len() + table.len());
    for field in layout::TLM_HOW.iter().chain(table) {
        let raw = get_multi_bits(words, field.parts, field.signed)?;
        let value = if field.flag {
            Value::Bool(raw != 0)
        } else {
            field.scale.apply(Value::Int(raw))
        };
        fields.push(FieldValue {
            name: field.name,
            value,
            unit: field.unit,
        });
    }
    Ok(Some(DecodedSubframe { subframe, fields }))
}
