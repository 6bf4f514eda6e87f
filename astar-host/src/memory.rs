//! Reads out of guest linear memory.
//!
//! Every read derives a fresh slice from the live `Memory` handle. Growth can relocate the
//! backing buffer between calls, so no view is ever kept around.

use wasmtime::{AsContext, Memory};

use crate::error::BridgeError;

/// Copy `len` bytes starting at guest offset `ptr`.
pub fn read_bytes(
    memory: Memory,
    store: impl AsContext,
    ptr: u32,
    len: u32,
) -> Result<Vec<u8>, BridgeError> {
    let data = memory.data(&store);
    let start = ptr as usize;
    let end = start.checked_add(len as usize);

    match end {
        Some(end) if end <= data.len() => Ok(data[start..end].to_vec()),
        _ => Err(BridgeError::MemoryOutOfBounds {
            ptr,
            len,
            memory_size: data.len(),
        }),
    }
}

/// Decode `len` bytes at `ptr` as UTF-8.
///
/// Decoding is permissive: invalid sequences become U+FFFD. Only an out-of-range
/// pointer/length pair is an error.
pub fn read_str(
    memory: Memory,
    store: impl AsContext,
    ptr: u32,
    len: u32,
) -> Result<String, BridgeError> {
    let bytes = read_bytes(memory, store, ptr, len)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}
