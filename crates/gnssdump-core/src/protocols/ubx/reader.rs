use crate::Value;

use super::error::UbxError;
use super::layout::Prim;

/// Safe little-endian primitive access over a UBX payload.
pub struct UbxReader<'a> {
    payload: &'a [u8],
}

impl<'a> UbxReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Read the raw (unscaled) value of one primitive at a byte offset.
    pub fn read(&self, offset: usize, prim: Prim) -> Result<Value, UbxError> {
        let bytes = self.slice(offset, prim.size())?;
        let value = match prim {
            Prim::U1 => Value::Int(i64::from(bytes[0])),
            Prim::I1 => Value::Int(i64::from(bytes[0] as i8)),
            Prim::U2 => Value::Int(i64::from(u16::from_le_bytes([bytes[0], bytes[1]]))),
            Prim::I2 => Value::Int(i64::from(i16::from_le_bytes([bytes[0], bytes[1]]))),
            Prim::U4 => Value::Int(i64::from(u32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))),
            Prim::I4 => Value::Int(i64::from(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))),
            Prim::R4 => Value::Float(f64::from(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))),
            Prim::U8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Value::Int(u64::from_le_bytes(raw) as i64)
            }
            Prim::R8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Value::Float(f64::from_le_bytes(raw))
            }
            Prim::Ch(_) => {
                let text = String::from_utf8_lossy(bytes);
                Value::Text(text.trim_end_matches('\0').to_string())
            }
        };
        Ok(value)
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], UbxError> {
        self.payload
            .get(offset..offset + len)
            .ok_or(UbxError::TooShort {
                needed: offset + len,
                actual: self.payload.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_primitives() {
        let payload = [0x10, 0x27, 0x00, 0x00, 0xff, 0xfe, 0xff];
        let reader = UbxReader::new(&payload);
        assert_eq!(reader.read(0, Prim::U4).unwrap(), Value::Int(10_000));
        assert_eq!(reader.read(4, Prim::I1).unwrap(), Value::Int(-1));
        assert_eq!(reader.read(5, Prim::I2).unwrap(), Value::Int(-2));
    }

    #[test]
    fn reads_wide_counters() {
        let payload = 5_000_000_000u64.to_le_bytes();
        let reader = UbxReader::new(&payload);
        assert_eq!(
            reader.read(0, Prim::U8).unwrap(),
            Value::Int(5_000_000_000)
        );
    }

    #[test]
    fn reads_floats() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&2.5f32.to_le_bytes());
        payload.extend_from_slice(&(-1.25f64).to_le_bytes());
        let reader = UbxReader::new(&payload);
        assert_eq!(reader.read(0, Prim::R4).unwrap(), Value::Float(2.5));
        assert_eq!(reader.read(4, Prim::R8).unwrap(), Value::Float(-1.25));
    }

    #[test]
    fn reads_nul_padded_text() {
        let payload = b"ROM CORE 3.01\0\0\0";
        let reader = UbxReader::new(payload);
        assert_eq!(
            reader.read(0, Prim::Ch(16)).unwrap(),
            Value::Text("ROM CORE 3.01".to_string())
        );
    }

    #[test]
    fn out_of_range_read_errors() {
        let reader = UbxReader::new(&[0u8; 3]);
        let err = reader.read(0, Prim::U4).unwrap_err();
        assert!(matches!(
            err,
            UbxError::TooShort {
                needed: 4,
                actual: 3
            }
        ));
    }
}
