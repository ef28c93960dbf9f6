//! Repeating-key XOR obfuscation.
//!
//! The first frame the game server sends after the TCP connection is
//! established carries the key; every payload after that, in both
//! directions, is combined byte-wise with the repeating key. XOR is
//! self-inverse, so encoding and decoding are the same operation.

use crate::error::CodecError;

/// The per-connection obfuscation key handed out by the game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorKey {
    bytes: Vec<u8>,
}

impl XorKey {
    /// Wrap the raw key bytes received during the handshake.
    ///
    /// An empty key would make [`XorKey::apply`] a no-op divide-by-zero
    /// hazard, so it is rejected here rather than at every call site.
    pub fn new(bytes: Vec<u8>) -> Result<Self, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::EmptyKey);
        }
        Ok(XorKey { bytes })
    }

    /// Obfuscate or deobfuscate `payload`.
    ///
    /// Pure and deterministic; `apply(apply(p)) == p` for any payload.
    pub fn apply(&self, payload: &[u8]) -> Vec<u8> {
        payload
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ self.bytes[i % self.bytes.len()])
            .collect()
    }

    /// Deobfuscate a payload and interpret it as UTF-8 text.
    pub fn apply_str(&self, payload: &[u8]) -> Result<String, CodecError> {
        String::from_utf8(self.apply(payload)).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Key length in bytes; always at least 1.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
