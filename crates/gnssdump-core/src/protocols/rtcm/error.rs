use thiserror::Error;

/// Errors returned by RTCM bitfield access and message decoding.
#[derive(Debug, Error)]
pub enum RtcmError {
    #[error("bit range at {bit} width {width} exceeds payload of {bits} bits")]
    OutOfRange { bit: usize, width: u32, bits: usize },
    #[error("unsupported bitfield width {0}")]
    Width(u32),
    #[error("no data-field entry for DF{0:03}")]
    UnknownField(u16),
    #[error("field {field}: no symbol for raw value {value}")]
    EnumMapping { field: &'static str, value: i64 },
}
