//! Text conventions of decoded RCON payloads.
//!
//! Imperative commands answer with a bare status word. List commands
//! answer with a tab-separated array: the first element is the entry
//! count and every entry, including the last, is terminated by a tab.
//! A count that exceeds the entries present means the response is
//! split across frames and the remainder is still in flight.

use crate::error::CodecError;

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FAIL: &str = "FAIL";

/// Unpack a tab array response into its entries.
///
/// Returns [`CodecError::IncompleteArray`] when the declared count
/// does not match; callers treat that as "await more frames".
pub fn unpack_array(text: &str) -> Result<Vec<String>, CodecError> {
    let mut parts: Vec<&str> = text.split('\t').collect();
    // Tab-terminated: the split leaves a trailing empty element.
    parts.pop();

    if parts.is_empty() {
        return Err(CodecError::InvalidArrayHeader(String::new()));
    }

    let head = parts.remove(0);
    let expected: usize = head
        .trim()
        .parse()
        .map_err(|_| CodecError::InvalidArrayHeader(head.to_string()))?;

    if expected != parts.len() {
        return Err(CodecError::IncompleteArray {
            expected,
            got: parts.len(),
        });
    }

    Ok(parts.into_iter().map(str::to_string).collect())
}
