//! Generic UBX packet decoding driven by compiled layouts.
//!
//! The parser owns no per-message logic: it walks a [`CompiledLayout`]'s
//! header, repeating block, and footer, scaling and symbol-mapping each
//! value. The lone special case is `RXM-SFRBX` carrying GPS L1 C/A words,
//! which triggers a nested subframe decode whose fields join the header.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::protocols::l1ca;
use crate::{Column, DecodedRecord, FieldValue, MessageKey, RawPacket, Value};

use super::catalog::{self, SFRBX};
use super::error::UbxError;
use super::layout::{CompiledField, CompiledLayout, FieldDef};
use super::reader::UbxReader;

/// Decode a framed UBX packet.
///
/// Catalogued message types decode through their compiled layout; unknown
/// types still produce a record (name, key, raw payload) so the stream
/// summary stays complete.
pub fn decode_packet(packet: &RawPacket) -> Result<DecodedRecord, UbxError> {
    let class = packet.class.unwrap_or_default();
    let id = packet.id.unwrap_or_default();
    let payload = packet.payload();

    match catalog::layout(class, id) {
        Some(layout) => {
            let mut record = decode_with_layout(payload, &layout)?;
            record.layout = Some(Arc::clone(&layout));
            if (class, id) == SFRBX {
                attach_subframe(&mut record, &layout);
            }
            Ok(record)
        }
        None => Ok(minimal_record(class, id, payload)),
    }
}

/// Decode a payload against one compiled layout.
///
/// The row count is derived from the payload length and must divide
/// exactly; any remainder is a [`UbxError::LayoutMismatch`]. Footer fields
/// gated on a header flag bit drop out of the length equation when the bit
/// is clear, so the header decodes first.
pub fn decode_with_layout(
    payload: &[u8],
    layout: &CompiledLayout,
) -> Result<DecodedRecord, UbxError> {
    let reader = UbxReader::new(payload);

    if payload.len() < layout.header_size {
        return Err(layout_mismatch(layout, payload));
    }
    let mut header = Vec::with_capacity(layout.header.len());
    for field in &layout.header {
        header.push(read_field(&reader, field.offset, field)?);
    }

    let mut footer_fields = Vec::with_capacity(layout.footer.len());
    let mut footer_size = 0;
    for field in &layout.footer {
        if footer_present(&header, &field.def) {
            footer_fields.push((footer_size, field));
            footer_size += field.size;
        }
    }

    let fixed = layout.header_size + footer_size;
    let n_rows = if layout.block_size == 0 {
        if payload.len() != fixed {
            return Err(layout_mismatch(layout, payload));
        }
        0
    } else {
        match payload.len().checked_sub(fixed) {
            Some(rest) if rest % layout.block_size == 0 => rest / layout.block_size,
            _ => return Err(layout_mismatch(layout, payload)),
        }
    };

    let mut block = Vec::with_capacity(layout.block.len());
    for field in &layout.block {
        let mut values = Vec::with_capacity(n_rows);
        for row in 0..n_rows {
            let base = layout.header_size + row * layout.block_size;
            values.push(read_field(&reader, base + field.offset, field)?.value);
        }
        block.push(Column {
            name: field.def.name,
            unit: field.def.unit,
            values,
        });
    }

    let footer_base = payload.len() - footer_size;
    let mut footer = Vec::with_capacity(footer_fields.len());
    for (offset, field) in footer_fields {
        footer.push(read_field(&reader, footer_base + offset, field)?);
    }

    Ok(DecodedRecord {
        message: layout.name.to_string(),
        key: MessageKey::Ubx {
            class: layout.class,
            id: layout.id,
        },
        n_rows,
        header,
        block,
        footer,
        raw_payload: payload.to_vec(),
        layout: None,
    })
}

fn footer_present(header: &[FieldValue], def: &FieldDef) -> bool {
    match def.presence {
        None => true,
        Some((flag, bit)) => header
            .iter()
            .find(|f| f.name == flag)
            .and_then(|f| f.value.as_i64())
            .is_some_and(|v| v & (1 << bit) != 0),
    }
}

fn read_field(
    reader: &UbxReader<'_>,
    offset: usize,
    field: &CompiledField,
) -> Result<FieldValue, UbxError> {
    let raw = reader.read(offset, field.def.prim)?;
    let value = match (field.def.symbols, raw.as_i64()) {
        (Some(table), Some(raw_int)) => table
            .iter()
            .find(|(k, _)| *k == raw_int)
            .map(|&(_, sym)| Value::Symbol(sym))
            .ok_or(UbxError::EnumMapping {
                field: field.def.name,
                value: raw_int,
            })?,
        _ => field.def.scale.apply(raw),
    };
    Ok(FieldValue {
        name: field.def.name,
        value,
        unit: field.def.unit,
    })
}

fn layout_mismatch(layout: &CompiledLayout, payload: &[u8]) -> UbxError {
    let dump: String = payload.iter().map(|b| format!("{b:02x}")).collect();
    debug!(
        message = layout.name,
        payload = %dump,
        "payload length does not fit layout"
    );
    UbxError::LayoutMismatch {
        message: layout.name,
        payload: payload.len(),
        header: layout.header_size,
        block: layout.block_size,
        footer: layout.footer_size,
    }
}

fn minimal_record(class: u8, id: u8, payload: &[u8]) -> DecodedRecord {
    let message = match catalog::class_name(class) {
        Some(name) => format!("UBX-{name}-0x{id:02x}"),
        None => format!("UBX-0x{class:02x}-0x{id:02x}"),
    };
    DecodedRecord {
        message,
        key: MessageKey::Ubx { class, id },
        n_rows: 0,
        header: Vec::new(),
        block: Vec::new(),
        footer: Vec::new(),
        raw_payload: payload.to_vec(),
        layout: None,
    }
}

/// Nested decode for `RXM-SFRBX` relaying GPS L1 C/A words.
///
/// Only gnssId GPS with sigId 0 carries L1 C/A; other constellations and
/// signals keep their raw words. Decoded subframe fields join the record's
/// header, and the attached layout is a copy extended the same way.
fn attach_subframe(record: &mut DecodedRecord, layout: &Arc<CompiledLayout>) {
    let is_gps = matches!(record.get("gnssId"), Some(Value::Symbol("GPS")));
    let is_l1ca = matches!(record.get("sigId"), Some(Value::Int(0)));
    if !is_gps || !is_l1ca {
        return;
    }
    let Some(column) = record.column("dwrd") else {
        return;
    };
    let words: Vec<u32> = column
        .values
        .iter()
        .filter_map(|v| v.as_i64())
        .map(|v| v as u32)
        .collect();
    if words.len() != column.values.len() {
        return;
    }

    match l1ca::decode_subframe(&words) {
        Ok(Some(subframe)) => {
            let mut extra: Vec<(&'static str, Option<&'static str>)> = vec![("subframe", None)];
            extra.extend(subframe.fields.iter().map(|f| (f.name, f.unit)));
            let extended = layout.with_nested_header(&extra);

            record.header.push(FieldValue {
                name: "subframe",
                value: Value::Int(i64::from(subframe.subframe)),
                unit: None,
            });
            record.header.extend(subframe.fields);
            record.layout = Some(Arc::new(extended));
        }
        Ok(None) => debug!(sv = ?record.get("svId"), "subframe id outside 1..=3, kept raw"),
        Err(err) => warn!(%err, "subframe decode failed, kept raw words"),
    }
}
