//! Length-prefixed framing.
//!
//! Every unit of wire data is a `u32` big-endian length followed by
//! exactly that many payload bytes. The payload is opaque at this
//! layer; obfuscation is handled separately by [`crate::XorKey`].
//!
//! [`FrameDecoder`] works incrementally over a [`BytesMut`] so the
//! connection can feed it whatever the socket yields and pull out
//! complete frames as they become available.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::CodecError;

/// Upper bound on a single frame's declared payload length.
///
/// Real responses (full player lists, log windows) stay well under
/// this; anything larger means the length prefix is garbage and the
/// stream can no longer be trusted.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Prefix `payload` with its big-endian u32 length.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + payload.len());
    out.put_u32(payload.len() as u32);
    out.extend_from_slice(payload);
    out
}

/// Incremental decoder for length-prefixed frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Declared length of the frame currently being assembled, once
    /// the 4-byte prefix has been consumed.
    pending_len: Option<usize>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder::default()
    }

    /// Try to extract one complete frame payload from `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Consumed bytes
    /// are removed from `buf`; partial frames are left in place.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Vec<u8>>, CodecError> {
        let len = match self.pending_len {
            Some(len) => len,
            None => {
                if buf.len() < 4 {
                    return Ok(None);
                }
                let len = buf.get_u32() as usize;
                if len > MAX_FRAME_LEN {
                    return Err(CodecError::FrameTooLarge(len));
                }
                self.pending_len = Some(len);
                len
            }
        };

        if buf.len() < len {
            return Ok(None);
        }

        self.pending_len = None;
        Ok(Some(buf.split_to(len).to_vec()))
    }

    /// Whether a length prefix has been read but its payload has not
    /// fully arrived yet. Used to distinguish a clean EOF from a
    /// truncated frame.
    pub fn mid_frame(&self) -> bool {
        self.pending_len.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_prefixes_length() {
        let frame = encode_frame(b"abc");
        assert_eq!(frame, vec![0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn decode_round_trip() {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(&encode_frame(b"SUCCESS")[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), Some(b"SUCCESS".to_vec()));
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_across_partial_reads() {
        let mut decoder = FrameDecoder::new();
        let wire = encode_frame(b"hello world");

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&wire[..2]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(&wire[2..9]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), None);
        assert!(decoder.mid_frame());

        buf.extend_from_slice(&wire[9..]);
        assert_eq!(
            decoder.decode(&mut buf).unwrap(),
            Some(b"hello world".to_vec())
        );
        assert!(!decoder.mid_frame());
    }

    #[test]
    fn two_frames_in_one_buffer() {
        let mut decoder = FrameDecoder::new();
        let mut wire = encode_frame(b"first");
        wire.extend_from_slice(&encode_frame(b"second"));
        let mut buf = BytesMut::from(&wire[..]);

        assert_eq!(decoder.decode(&mut buf).unwrap(), Some(b"first".to_vec()));
        assert_eq!(decoder.decode(&mut buf).unwrap(), Some(b"second".to_vec()));
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_length_rejected() {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(&u32::MAX.to_be_bytes()[..]);
        assert!(matches!(
            decoder.decode(&mut buf),
            Err(CodecError::FrameTooLarge(_))
        ));
    }

    #[test]
    fn empty_payload_frame() {
        let mut decoder = FrameDecoder::new();
        let mut buf = BytesMut::from(&encode_frame(b"")[..]);
        assert_eq!(decoder.decode(&mut buf).unwrap(), Some(Vec::new()));
    }
}
