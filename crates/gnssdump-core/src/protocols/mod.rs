//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: field tables, offsets, and catalogue data (source of truth)
//! - `reader`: safe byte/bit access and wire conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; the framer and the caller's read
//! loop handle stream access. Catalogue tables are static data: swapping a
//! table swaps the decodable message set without touching decode logic.

pub(crate) mod common;
pub mod l1ca;
pub mod rtcm;
pub mod ubx;
