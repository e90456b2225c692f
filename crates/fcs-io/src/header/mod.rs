//! FCS header parsing and building.
//!
//! The header is the fixed-layout ASCII prefix of every FCS file:
//! - Version string (bytes 0-9)
//! - TEXT, DATA and ANALYSIS start/end offsets (six 8-byte fields, bytes 10-57)
//! - Optional OTHER segment descriptors between byte 58 and the TEXT start
//!
//! The header is transient: it is parsed to locate segments and rebuilt by the
//! writer, never stored on a [`Document`](crate::Document).

pub mod range;
pub mod record;

pub use range::ByteRange;
pub use record::{
    Header, HEADER_LEN, MAX_HEADER_OFFSET, OFFSET_FIELD_LEN, OTHER_FIELD_LEN, SUPPORTED_VERSIONS,
    VERSION_FIELD_LEN, build_header, parse_header,
};
