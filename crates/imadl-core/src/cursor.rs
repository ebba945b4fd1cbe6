//! Pagination cursor codec.
//!
//! The listing API takes an opaque base64 token. It is a one-field protobuf
//! message: tag byte `0x08` (field 1, varint) followed by the offset as a
//! base-128 varint. Offset 0 is sent as an empty string, which the server
//! reads as "first page".

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Field 1, wire type 0.
const OFFSET_FIELD_TAG: u8 = 0x08;

/// Encodes a local item offset into the cursor token expected by the listing API.
pub fn encode_cursor(offset: u64) -> String {
    if offset == 0 {
        return String::new();
    }
    let mut buf = Vec::with_capacity(11);
    buf.push(OFFSET_FIELD_TAG);
    push_varint(&mut buf, offset);
    STANDARD.encode(&buf)
}

/// Appends `value` as little-endian base-128 groups, continuation bit on all but the last.
fn push_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}
