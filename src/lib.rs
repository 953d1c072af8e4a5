//! Earl: Erlang external term format (ETF) encoding/decoding in Rust.
//!
//! The crate provides:
//! - The wire engine (`etf`): tags, buffers, encoder and decoder
//! - The value model (`term`): `Term`, identity types and atom interning
//! - A JSON bridge (`json` feature)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use earl::{DecodeOptions, Term};
//!
//! let value = Term::Object(vec![("a".into(), Term::Integer(1))]);
//! let bytes = earl::pack(&value).unwrap();
//! assert_eq!(bytes, [131, 116, 0, 0, 0, 1, 109, 0, 0, 0, 1, 97, 97, 1]);
//!
//! let opts = DecodeOptions {
//!     map_as_object: true,
//!     ..Default::default()
//! };
//! assert_eq!(earl::unpack_with(&bytes, &opts).unwrap(), value);
//! ```

pub mod etf;
pub mod term;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "cli")]
pub mod cli;

pub use etf::{DecodeError, DecodeOptions, EncodeError, EncodeOptions};
pub use term::{Atom, Export, Function, ImproperList, Pid, Port, Reference, Term};

/// Encode `term` as a complete ETF stream.
///
/// On error nothing is returned; the partially written buffer is dropped.
pub fn pack(term: &Term) -> Result<Vec<u8>, EncodeError> {
    etf::encode(term)
}

/// Encode with explicit options (compression, depth limit).
pub fn pack_with(term: &Term, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    etf::encode_with_options(term, options)
}

/// Decode one term with default options. Trailing bytes are ignored.
pub fn unpack(data: &[u8]) -> Result<Term, DecodeError> {
    etf::decode(data, &DecodeOptions::default())
}

pub fn unpack_with(data: &[u8], options: &DecodeOptions) -> Result<Term, DecodeError> {
    etf::decode(data, options)
}

/// Decode one term and return it with the number of bytes it occupied,
/// so concatenated streams can be walked.
pub fn unpack_prefix(data: &[u8], options: &DecodeOptions) -> Result<(Term, usize), DecodeError> {
    etf::decode_prefix(data, options)
}
