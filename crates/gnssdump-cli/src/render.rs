//! Text rendering: record tables and the hex-dump fallback.

use std::fmt::Write;

use gnssdump_core::{Column, DecodedRecord, Value};

pub fn fmt_value(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => format!("{v}"),
        Value::Bool(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::Symbol(v) => (*v).to_string(),
    }
}

fn label(name: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{name} [{unit}]"),
        None => name.to_string(),
    }
}

/// Column width: the compiled layout's width when the record carries one,
/// widened if an actual value or the label needs more room.
fn column_width(record: &DecodedRecord, column: &Column) -> usize {
    let compiled = record
        .layout
        .as_ref()
        .and_then(|layout| layout.block.iter().find(|f| f.def.name == column.name))
        .map_or(0, |f| f.col_width);
    let data = column
        .values
        .iter()
        .map(|v| fmt_value(v).len())
        .max()
        .unwrap_or(0);
    compiled.max(data).max(label(column.name, column.unit).len())
}

/// Render one decoded record: message name, named header/footer fields,
/// then the repeating block as an aligned table.
pub fn render_text(record: &DecodedRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.message);
    for field in record.header.iter().chain(record.footer.iter()) {
        let _ = writeln!(
            out,
            "  {} = {}",
            label(field.name, field.unit),
            fmt_value(&field.value)
        );
    }
    if record.n_rows > 0 && !record.block.is_empty() {
        let widths: Vec<usize> = record
            .block
            .iter()
            .map(|column| column_width(record, column))
            .collect();
        out.push_str("  ");
        for (column, width) in record.block.iter().zip(&widths) {
            let _ = write!(
                out,
                "{:>width$}  ",
                label(column.name, column.unit),
                width = width
            );
        }
        out.push('\n');
        for row in 0..record.n_rows {
            out.push_str("  ");
            for (column, width) in record.block.iter().zip(&widths) {
                let _ = write!(
                    out,
                    "{:>width$}  ",
                    fmt_value(&column.values[row]),
                    width = width
                );
            }
            out.push('\n');
        }
    }
    out
}

/// Classic offset / hex / ASCII dump, 16 bytes per line.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if (0x20..0x7f).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        let _ = writeln!(out, "  {:04x}  {:<47}  {ascii}", i * 16, hex.join(" "));
    }
    out
}

pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
