//! `imadl cursor <offset>` – print the listing cursor for an offset.

use imadl_core::cursor::encode_cursor;

pub fn run_cursor(offset: u64) {
    let token = encode_cursor(offset);
    if token.is_empty() {
        println!("(empty: offset 0 requests the first page)");
    } else {
        println!("{token}");
    }
}
