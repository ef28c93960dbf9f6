//! rcon-protocol
//!
//! Wire-level codec for the HLL RCON protocol:
//! - XOR payload obfuscation keyed by the server-supplied key
//! - u32 big-endian length-prefixed frames
//! - tab-separated array responses and status words
//!
//! Everything here is pure and synchronous; the async connection
//! handling lives in the `rcon-client` crate.

pub mod frame;
pub mod text;
pub mod xor;

mod error;

pub use error::CodecError;
pub use frame::{encode_frame, FrameDecoder, MAX_FRAME_LEN};
pub use text::{unpack_array, STATUS_FAIL, STATUS_SUCCESS};
pub use xor::XorKey;
