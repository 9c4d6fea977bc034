//! Declarative UBX field tables and their compiled byte layouts.
//!
//! A message is described as an ordered list of [`FieldDef`]s. Fields
//! belong to the fixed header until the first per-row field, to the
//! repeating block until a non-repeating field reappears, and to the fixed
//! footer after that. Regions are contiguous in declaration order, which is
//! the wire order; [`compile`] rejects tables that violate this.

use super::error::UbxError;

pub use crate::protocols::common::Scale;

/// Wire primitive types. All multi-byte primitives are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    U1,
    U2,
    U4,
    U8,
    I1,
    I2,
    I4,
    /// IEEE 754 single precision.
    R4,
    /// IEEE 754 double precision.
    R8,
    /// Fixed-width ASCII, NUL-padded.
    Ch(usize),
}

impl Prim {
    pub fn size(self) -> usize {
        match self {
            Prim::U1 | Prim::I1 => 1,
            Prim::U2 | Prim::I2 => 2,
            Prim::U4 | Prim::I4 | Prim::R4 => 4,
            Prim::U8 | Prim::R8 => 8,
            Prim::Ch(n) => n,
        }
    }

    /// Default display width for a decoded value of this type.
    fn display_width(self) -> usize {
        match self {
            Prim::U1 => 3,
            Prim::I1 => 4,
            Prim::U2 => 5,
            Prim::I2 => 6,
            Prim::U4 => 10,
            Prim::I4 => 11,
            Prim::U8 => 20,
            Prim::R4 => 13,
            Prim::R8 => 18,
            Prim::Ch(n) => n,
        }
    }
}

/// One declared message field.
///
/// Built with the `const` builder methods so catalogue tables stay terse:
///
/// ```
/// use gnssdump_core::protocols::ubx::layout::{FieldDef, Prim};
///
/// const LON: FieldDef = FieldDef::new("lon", Prim::I4).scale(1e-7).unit("deg");
/// assert_eq!(LON.prim.size(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub prim: Prim,
    pub scale: Scale,
    pub unit: Option<&'static str>,
    /// Explicit display width; `None` auto-sizes at compile time.
    pub width: Option<usize>,
    /// Marks the field as belonging to the repeating block.
    pub per_row: bool,
    /// Symbol table for enumerated fields; lookup failures are decode
    /// errors, never silently-kept integers.
    pub symbols: Option<&'static [(i64, &'static str)]>,
    /// Footer fields only: present on the wire when the named header
    /// field has this bit set.
    pub presence: Option<(&'static str, u8)>,
}

impl FieldDef {
    pub const fn new(name: &'static str, prim: Prim) -> Self {
        Self {
            name,
            prim,
            scale: Scale::Identity,
            unit: None,
            width: None,
            per_row: false,
            symbols: None,
            presence: None,
        }
    }

    pub const fn scale(mut self, k: f64) -> Self {
        self.scale = Scale::Linear(k);
        self
    }

    pub const fn func(mut self, f: fn(f64) -> f64) -> Self {
        self.scale = Scale::Func(f);
        self
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub const fn per_row(mut self) -> Self {
        self.per_row = true;
        self
    }

    pub const fn symbols(mut self, symbols: &'static [(i64, &'static str)]) -> Self {
        self.symbols = Some(symbols);
        self
    }

    pub const fn present_if(mut self, flag: &'static str, bit: u8) -> Self {
        self.presence = Some((flag, bit));
        self
    }
}

/// A field with its resolved byte position and display width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompiledField {
    pub def: FieldDef,
    /// Byte offset within the field's region.
    pub offset: usize,
    pub size: usize,
    /// Column display width: wide enough for the value, the field name,
    /// and the unit annotation. Presentation data, fixed at compile time.
    pub col_width: usize,
}

impl CompiledField {
    fn from_def(def: FieldDef, offset: usize) -> Self {
        let label = def.name.len() + def.unit.map_or(0, |u| u.len() + 3);
        let data = def.width.unwrap_or_else(|| def.prim.display_width());
        Self {
            def,
            offset,
            size: def.prim.size(),
            col_width: data.max(label),
        }
    }
}

/// Immutable byte layout of one message type.
///
/// Compiled once per catalogue entry and shared thereafter; never mutated.
/// A nested decode that enriches the header goes through
/// [`CompiledLayout::with_nested_header`], which builds a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledLayout {
    pub name: &'static str,
    pub class: u8,
    pub id: u8,
    pub header_size: usize,
    /// Size of one repeating row; 0 when the message has no block.
    pub block_size: usize,
    pub footer_size: usize,
    pub header: Vec<CompiledField>,
    pub block: Vec<CompiledField>,
    pub footer: Vec<CompiledField>,
}

impl CompiledLayout {
    /// Copy-on-extend for nested decodes: appends extra named header
    /// fields (decoded elsewhere, so they carry no byte span) and drops
    /// the repeating block. The original layout is untouched.
    pub fn with_nested_header(&self, extra: &[(&'static str, Option<&'static str>)]) -> Self {
        let mut layout = self.clone();
        for &(name, unit) in extra {
            let mut def = FieldDef::new(name, Prim::U4);
            def.unit = unit;
            layout.header.push(CompiledField {
                def,
                offset: layout.header_size,
                size: 0,
                col_width: 0,
            });
        }
        layout.block.clear();
        layout.block_size = 0;
        layout
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Region {
    Header,
    Block,
    Footer,
}

/// Compile a declared field table into byte offsets and region sizes.
///
/// # Errors
/// [`UbxError::RegionOrder`] when a per-row field appears after the footer
/// has started; regions must be contiguous in declaration order.
/// [`UbxError::Conditional`] when a presence-gated field lands outside the
/// footer; the header and block have fixed byte positions.
pub fn compile(
    name: &'static str,
    class: u8,
    id: u8,
    fields: &[FieldDef],
) -> Result<CompiledLayout, UbxError> {
    let mut layout = CompiledLayout {
        name,
        class,
        id,
        header_size: 0,
        block_size: 0,
        footer_size: 0,
        header: Vec::new(),
        block: Vec::new(),
        footer: Vec::new(),
    };
    let mut region = Region::Header;

    for def in fields {
        let next = match (region, def.per_row) {
            (Region::Header, false) => Region::Header,
            (Region::Header, true) | (Region::Block, true) => Region::Block,
            (Region::Block, false) | (Region::Footer, false) => Region::Footer,
            (Region::Footer, true) => {
                return Err(UbxError::RegionOrder {
                    message: name,
                    field: def.name,
                });
            }
        };
        region = next;
        if def.presence.is_some() && region != Region::Footer {
            return Err(UbxError::Conditional {
                message: name,
                field: def.name,
            });
        }
        match region {
            Region::Header => {
                layout
                    .header
                    .push(CompiledField::from_def(*def, layout.header_size));
                layout.header_size += def.prim.size();
            }
            Region::Block => {
                layout
                    .block
                    .push(CompiledField::from_def(*def, layout.block_size));
                layout.block_size += def.prim.size();
            }
            Region::Footer => {
                layout
                    .footer
                    .push(CompiledField::from_def(*def, layout.footer_size));
                layout.footer_size += def.prim.size();
            }
        }
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_are_assigned_in_declaration_order() {
        let fields = [
            FieldDef::new("count", Prim::U1),
            FieldDef::new("ticks", Prim::U4),
            FieldDef::new("data", Prim::U4).per_row(),
            FieldDef::new("tail", Prim::U4),
        ];
        let layout = compile("TEST", 0xff, 0x01, &fields).unwrap();
        assert_eq!(layout.header_size, 5);
        assert_eq!(layout.block_size, 4);
        assert_eq!(layout.footer_size, 4);
        assert_eq!(layout.header[1].offset, 1);
        assert_eq!(layout.footer[0].offset, 0);
    }

    #[test]
    fn per_row_after_footer_is_rejected() {
        let fields = [
            FieldDef::new("data", Prim::U4).per_row(),
            FieldDef::new("tail", Prim::U4),
            FieldDef::new("late", Prim::U4).per_row(),
        ];
        let err = compile("TEST", 0xff, 0x02, &fields).unwrap_err();
        assert!(matches!(err, UbxError::RegionOrder { field: "late", .. }));
    }

    #[test]
    fn conditional_field_outside_footer_is_rejected() {
        let fields = [
            FieldDef::new("flags", Prim::U2).present_if("flags", 0),
            FieldDef::new("data", Prim::U4).per_row(),
        ];
        let err = compile("TEST", 0xff, 0x06, &fields).unwrap_err();
        assert!(matches!(err, UbxError::Conditional { field: "flags", .. }));
    }

    #[test]
    fn column_width_covers_name_and_unit() {
        let fields = [FieldDef::new("prMes", Prim::R8).unit("m").per_row()];
        let layout = compile("TEST", 0xff, 0x03, &fields).unwrap();
        // R8 default width (18) beats "prMes [m]" (9).
        assert_eq!(layout.block[0].col_width, 18);

        let fields = [FieldDef::new("gnssId", Prim::U1).per_row()];
        let layout = compile("TEST", 0xff, 0x04, &fields).unwrap();
        // Name (6) beats the U1 default (3).
        assert_eq!(layout.block[0].col_width, 6);
    }

    #[test]
    fn nested_header_extension_copies() {
        let fields = [
            FieldDef::new("gnssId", Prim::U1),
            FieldDef::new("dwrd", Prim::U4).per_row(),
        ];
        let base = compile("TEST", 0xff, 0x05, &fields).unwrap();
        let extended = base.with_nested_header(&[("tow_count", None)]);
        assert_eq!(base.block.len(), 1);
        assert!(extended.block.is_empty());
        assert_eq!(extended.block_size, 0);
        assert_eq!(extended.header.last().unwrap().def.name, "tow_count");
    }
}
