// External term format implementation.
//
// Byte-level encoding and decoding of the tagged binary term format
// (version byte 131).
//
// # Modules
//
// - `tag`    : version byte and tag constants
// - `buffer` : growable big-endian output buffer
// - `cursor` : bounds-checked big-endian read cursor
// - `bignum` : sign/digit rules for big integers
// - `encoder`: Term → bytes
// - `decoder`: bytes → Term

pub mod bignum;
pub mod buffer;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod tag;

/// Default bound on container nesting, shared by encoder and decoder.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// Re-export key types for convenience.
pub use buffer::Writer;
pub use cursor::{Reader, Truncated};
pub use decoder::{DecodeError, DecodeOptions, Decoder, decode, decode_prefix};
pub use encoder::{EncodeError, EncodeOptions, Encoder, encode, encode_with_options};
pub use tag::FORMAT_VERSION;
