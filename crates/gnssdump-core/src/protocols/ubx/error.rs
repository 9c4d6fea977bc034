use thiserror::Error;

/// Errors returned by UBX layout compilation and packet decoding.
#[derive(Debug, Error)]
pub enum UbxError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error(
        "{message}: payload length {payload} does not fit \
         header {header} + k*{block} + footer {footer}"
    )]
    LayoutMismatch {
        message: &'static str,
        payload: usize,
        header: usize,
        block: usize,
        footer: usize,
    },
    #[error("field {field}: no symbol for raw value {value}")]
    EnumMapping { field: &'static str, value: i64 },
    #[error("{message}: field {field} declared out of region order")]
    RegionOrder {
        message: &'static str,
        field: &'static str,
    },
    #[error("{message}: conditional field {field} outside the footer")]
    Conditional {
        message: &'static str,
        field: &'static str,
    },
}
